//! Image support driven by declared flags

use serde::{Deserialize, Serialize};
use varia_graph::{ImageContext, ImageInterface};

/// Which images a module needs, settled at image mutator begin
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Needs {
    core: bool,
    ramdisk: bool,
    vendor_ramdisk: bool,
    debug_ramdisk: bool,
    recovery: bool,
    vendor: bool,
    product: bool,
}

/// Images a module declares with flags.
///
/// `vendor`, `recovery`, `ramdisk`, `vendor_ramdisk` and `debug_ramdisk`
/// install the module to that image only. The `*_available` flags add the
/// image next to the default one. Soc-specific and device-specific modules
/// default to the vendor image, product-specific ones to the product image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageFlags {
    pub vendor: bool,
    pub vendor_available: bool,
    pub product_available: bool,
    pub recovery: bool,
    pub recovery_available: bool,
    pub ramdisk: bool,
    pub ramdisk_available: bool,
    pub vendor_ramdisk: bool,
    pub vendor_ramdisk_available: bool,
    pub debug_ramdisk: bool,
    /// Opt out of image variants entirely
    pub unsupported: bool,
    pub extra_variations: Vec<String>,
}

/// Stock image hooks for modules that declare their images with
/// [`ImageFlags`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "ImageFlags")]
pub struct DeclaredImageVariants {
    flags: ImageFlags,
    needs: Option<Needs>,
    image_variation: Option<String>,
}

impl From<ImageFlags> for DeclaredImageVariants {
    fn from(flags: ImageFlags) -> Self {
        Self {
            flags,
            needs: None,
            image_variation: None,
        }
    }
}

impl DeclaredImageVariants {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installed to the vendor image only
    #[must_use]
    pub fn vendor_only() -> Self {
        ImageFlags {
            vendor: true,
            ..ImageFlags::default()
        }
        .into()
    }

    #[must_use]
    pub fn flags(&self) -> &ImageFlags {
        &self.flags
    }

    /// Variation this variant was created for, once set
    #[must_use]
    pub fn image_variation(&self) -> Option<&str> {
        self.image_variation.as_deref()
    }

    fn compute(&self, ctx: &ImageContext<'_>) -> Needs {
        let f = &self.flags;
        let pinned = f.vendor || f.recovery || f.ramdisk || f.vendor_ramdisk || f.debug_ramdisk;
        let vendor_kind = ctx.soc_specific() || ctx.device_specific();

        Needs {
            core: !pinned
                && !vendor_kind
                && !ctx.product_specific()
                && (ctx.platform() || ctx.system_ext_specific()),
            ramdisk: f.ramdisk || f.ramdisk_available,
            vendor_ramdisk: f.vendor_ramdisk || f.vendor_ramdisk_available,
            debug_ramdisk: f.debug_ramdisk,
            recovery: f.recovery || f.recovery_available,
            vendor: f.vendor || f.vendor_available || (vendor_kind && !pinned),
            product: f.product_available || (ctx.product_specific() && !pinned),
        }
    }

    fn needs(&self, ctx: &ImageContext<'_>) -> Needs {
        self.needs.unwrap_or_else(|| self.compute(ctx))
    }
}

impl ImageInterface for DeclaredImageVariants {
    fn image_mutator_begin(&mut self, ctx: &ImageContext<'_>) {
        let needs = self.compute(ctx);
        tracing::trace!(module = ctx.module_name(), ?needs, "image needs");
        self.needs = Some(needs);
    }

    fn image_mutator_supported(&self) -> bool {
        !self.flags.unsupported
    }

    fn core_variant_needed(&self, ctx: &ImageContext<'_>) -> bool {
        self.needs(ctx).core
    }

    fn ramdisk_variant_needed(&self, ctx: &ImageContext<'_>) -> bool {
        self.needs(ctx).ramdisk
    }

    fn vendor_ramdisk_variant_needed(&self, ctx: &ImageContext<'_>) -> bool {
        self.needs(ctx).vendor_ramdisk
    }

    fn debug_ramdisk_variant_needed(&self, ctx: &ImageContext<'_>) -> bool {
        self.needs(ctx).debug_ramdisk
    }

    fn recovery_variant_needed(&self, ctx: &ImageContext<'_>) -> bool {
        self.needs(ctx).recovery
    }

    fn vendor_variant_needed(&self, ctx: &ImageContext<'_>) -> bool {
        self.needs(ctx).vendor
    }

    fn product_variant_needed(&self, ctx: &ImageContext<'_>) -> bool {
        self.needs(ctx).product
    }

    fn extra_image_variations(&self, _ctx: &ImageContext<'_>) -> Vec<String> {
        self.flags.extra_variations.clone()
    }

    fn set_image_variation(&mut self, _ctx: &ImageContext<'_>, variation: &str) {
        self.image_variation = Some(variation.to_string());
    }

    fn clone_box(&self) -> Box<dyn ImageInterface> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use varia_config::Config;
    use varia_types::{ModuleKind, Os};

    fn needs(declared: &DeclaredImageVariants, kind: ModuleKind) -> Needs {
        let config = Config::default();
        declared.compute(&ImageContext::new("m", Os::Android, kind, &config))
    }

    #[test]
    fn test_platform_default_is_core() {
        let n = needs(&DeclaredImageVariants::new(), ModuleKind::Platform);
        assert_eq!(
            n,
            Needs {
                core: true,
                ..Needs::default()
            }
        );
    }

    #[test]
    fn test_vendor_only() {
        let n = needs(&DeclaredImageVariants::vendor_only(), ModuleKind::Platform);
        assert!(!n.core);
        assert!(n.vendor);
    }

    #[test]
    fn test_module_kind_defaults() {
        let soc = needs(&DeclaredImageVariants::new(), ModuleKind::SocSpecific);
        assert!(soc.vendor && !soc.core);

        let product = needs(&DeclaredImageVariants::new(), ModuleKind::ProductSpecific);
        assert!(product.product && !product.core);

        let system_ext = needs(&DeclaredImageVariants::new(), ModuleKind::SystemExtSpecific);
        assert!(system_ext.core);
    }

    #[test]
    fn test_available_flags_add_images() {
        let declared = DeclaredImageVariants::from(ImageFlags {
            vendor_available: true,
            recovery_available: true,
            ..ImageFlags::default()
        });
        let n = needs(&declared, ModuleKind::Platform);
        assert!(n.core && n.vendor && n.recovery);
        assert!(!n.product);
    }

    #[test]
    fn test_recovery_only_on_soc_module() {
        let declared = DeclaredImageVariants::from(ImageFlags {
            recovery: true,
            ..ImageFlags::default()
        });
        let n = needs(&declared, ModuleKind::SocSpecific);
        assert!(n.recovery);
        assert!(!n.vendor && !n.core);
    }

    #[test]
    fn test_deserialize_flags() {
        let declared: DeclaredImageVariants =
            serde_json::from_str(r#"{"vendor": true, "extra_variations": ["apex"]}"#).unwrap();
        assert!(declared.flags().vendor);
        assert!(!declared.flags().recovery);
        assert_eq!(declared.flags().extra_variations, vec!["apex".to_string()]);
        assert_eq!(declared.image_variation(), None);
    }
}
