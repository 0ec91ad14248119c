//! Image variations of a module

use varia_config::{Config, FIX_IMAGE_VARIANT_FALLBACK};
use varia_graph::Module;
use varia_types::ImageVariation;

/// Image variations `module` is split into.
///
/// Non-device modules and modules without image support get the core
/// variation only. Otherwise each predicate is asked in fixed order, then
/// extra variations are appended. Never empty.
#[must_use]
pub fn image_variations(module: &Module, config: &Config) -> Vec<String> {
    if !module.os().is_device() {
        return vec![ImageVariation::CORE.to_string()];
    }
    let Some(image) = module.image().filter(|i| i.image_mutator_supported()) else {
        return vec![ImageVariation::CORE.to_string()];
    };

    let ctx = module.image_context(config);
    let predicates = [
        (image.core_variant_needed(&ctx), ImageVariation::CORE),
        (image.ramdisk_variant_needed(&ctx), ImageVariation::RAMDISK),
        (
            image.vendor_ramdisk_variant_needed(&ctx),
            ImageVariation::VENDOR_RAMDISK,
        ),
        (
            image.debug_ramdisk_variant_needed(&ctx),
            ImageVariation::DEBUG_RAMDISK,
        ),
        (image.recovery_variant_needed(&ctx), ImageVariation::RECOVERY),
        (image.vendor_variant_needed(&ctx), ImageVariation::VENDOR),
        (image.product_variant_needed(&ctx), ImageVariation::PRODUCT),
    ];

    let mut variations: Vec<String> = predicates
        .into_iter()
        .filter(|(needed, _)| *needed)
        .map(|(_, variation)| variation.to_string())
        .collect();
    variations.extend(image.extra_image_variations(&ctx));

    if variations.is_empty() {
        variations.push(ImageVariation::CORE.to_string());
    }
    variations
}

/// Variant of `module` an incoming edge requesting `incoming` binds to
///
/// A module with a single image variation is used whatever was requested,
/// unless the fallback fix flag is set and a vendor module asks for a
/// core-only one, in which case the vendor request is kept and fails to
/// resolve.
#[must_use]
pub fn incoming_image_variation(module: &Module, config: &Config, incoming: &str) -> String {
    if !module.os().is_device() {
        return ImageVariation::CORE.to_string();
    }
    if !module.image().is_some_and(|i| i.image_mutator_supported()) {
        return ImageVariation::CORE.to_string();
    }

    let mut variations = image_variations(module, config);
    if variations.len() == 1 {
        if config.get_build_flag_bool(FIX_IMAGE_VARIANT_FALLBACK)
            && incoming == ImageVariation::VENDOR
            && variations[0] == ImageVariation::CORE
        {
            return incoming.to_string();
        }
        return variations.swap_remove(0);
    }
    incoming.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DeclaredImageVariants, ImageFlags};
    use std::sync::Arc;
    use varia_graph::ModuleTypeDescriptor;
    use varia_types::{ModuleKind, Os};

    fn module(name: &str, image: Option<DeclaredImageVariants>) -> Module {
        let descriptor = Arc::new(ModuleTypeDescriptor::new("cc_library"));
        let module = Module::new(&descriptor, name).with_os(Os::Android);
        match image {
            Some(image) => module.with_image(image),
            None => module,
        }
    }

    fn fix_flag_config() -> Config {
        let mut config = Config::default();
        config.flags.set(FIX_IMAGE_VARIANT_FALLBACK, true);
        config
    }

    #[test]
    fn test_host_module_is_core_only() {
        let host = module("host_tool", Some(DeclaredImageVariants::vendor_only())).with_os(Os::Linux);
        assert_eq!(image_variations(&host, &Config::default()), vec![""]);
        assert_eq!(
            incoming_image_variation(&host, &Config::default(), "vendor"),
            ""
        );
    }

    #[test]
    fn test_no_image_support_is_core_only() {
        let plain = module("plain", None);
        assert_eq!(image_variations(&plain, &Config::default()), vec![""]);

        let unsupported = module(
            "unsupported",
            Some(DeclaredImageVariants::from(ImageFlags {
                vendor: true,
                unsupported: true,
                ..ImageFlags::default()
            })),
        );
        assert_eq!(image_variations(&unsupported, &Config::default()), vec![""]);
    }

    #[test]
    fn test_split_order() {
        let everything = module(
            "everything",
            Some(DeclaredImageVariants::from(ImageFlags {
                vendor_available: true,
                product_available: true,
                recovery_available: true,
                ramdisk_available: true,
                vendor_ramdisk_available: true,
                extra_variations: vec!["apex".to_string()],
                ..ImageFlags::default()
            })),
        );
        assert_eq!(
            image_variations(&everything, &Config::default()),
            vec!["", "ramdisk", "vendor_ramdisk", "recovery", "vendor", "product", "apex"]
        );
    }

    #[derive(Debug, Clone)]
    struct NoImages;

    impl varia_graph::ImageInterface for NoImages {
        fn core_variant_needed(&self, _: &varia_graph::ImageContext<'_>) -> bool {
            false
        }
        fn ramdisk_variant_needed(&self, _: &varia_graph::ImageContext<'_>) -> bool {
            false
        }
        fn vendor_ramdisk_variant_needed(&self, _: &varia_graph::ImageContext<'_>) -> bool {
            false
        }
        fn debug_ramdisk_variant_needed(&self, _: &varia_graph::ImageContext<'_>) -> bool {
            false
        }
        fn recovery_variant_needed(&self, _: &varia_graph::ImageContext<'_>) -> bool {
            false
        }
        fn vendor_variant_needed(&self, _: &varia_graph::ImageContext<'_>) -> bool {
            false
        }
        fn product_variant_needed(&self, _: &varia_graph::ImageContext<'_>) -> bool {
            false
        }
        fn clone_box(&self) -> Box<dyn varia_graph::ImageInterface> {
            Box::new(self.clone())
        }
    }

    #[test]
    fn test_no_predicate_falls_back_to_core() {
        let descriptor = Arc::new(ModuleTypeDescriptor::new("phony"));
        let nothing = Module::new(&descriptor, "nothing")
            .with_os(Os::Android)
            .with_kind(ModuleKind::SocSpecific)
            .with_image(NoImages);
        assert_eq!(image_variations(&nothing, &Config::default()), vec![""]);
        assert_eq!(
            incoming_image_variation(&nothing, &Config::default(), "vendor"),
            ""
        );
    }

    #[test]
    fn test_single_variation_fallback() {
        let core_only = module("libcore", Some(DeclaredImageVariants::default()));
        let config = Config::default();
        assert_eq!(incoming_image_variation(&core_only, &config, "vendor"), "");
        assert_eq!(incoming_image_variation(&core_only, &config, "recovery"), "");

        let vendor_only = module("libvendor", Some(DeclaredImageVariants::vendor_only()));
        assert_eq!(incoming_image_variation(&vendor_only, &config, ""), "vendor");
    }

    #[test]
    fn test_vendor_fallback_disabled_by_flag() {
        let core_only = module("libcore", Some(DeclaredImageVariants::default()));
        let config = fix_flag_config();
        assert_eq!(
            incoming_image_variation(&core_only, &config, "vendor"),
            "vendor"
        );
        // Only the vendor request is kept
        assert_eq!(incoming_image_variation(&core_only, &config, "product"), "");
    }

    #[test]
    fn test_multiple_variations_keep_request() {
        let both = module(
            "libboth",
            Some(DeclaredImageVariants::from(ImageFlags {
                vendor_available: true,
                ..ImageFlags::default()
            })),
        );
        let config = Config::default();
        assert_eq!(incoming_image_variation(&both, &config, "vendor"), "vendor");
        assert_eq!(incoming_image_variation(&both, &config, ""), "");
        assert_eq!(incoming_image_variation(&both, &config, "recovery"), "recovery");
    }
}
