//! Capabilities a module may opt into
//!
//! Policies dispatch on capability presence. A module without a capability
//! gets the trivial behavior of every policy that consults it.

use std::fmt;

use varia_config::Config;
use varia_types::{ModuleKind, Os, PartitionType};

/// Role of an override module: a pseudo-module whose properties are merged
/// onto a variant of its base module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideState {
    base: String,
}

impl OverrideState {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    /// Name of the module being overridden
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }
}

/// Role of a module that override modules may target
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverridableState {
    overridden_by: String,
}

impl OverridableState {
    /// Name of the override module that produced this variant, or empty on
    /// the original variant
    #[must_use]
    pub fn overridden_by(&self) -> &str {
        &self.overridden_by
    }

    pub fn set_overridden_by(&mut self, name: impl Into<String>) {
        self.overridden_by = name.into();
    }
}

/// Prebuilt module that may stand in for a source module
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrebuiltState {
    pub use_prebuilt: bool,
}

/// View of a module handed to image hooks
#[derive(Debug, Clone, Copy)]
pub struct ImageContext<'a> {
    module: &'a str,
    os: Os,
    kind: ModuleKind,
    config: &'a Config,
}

impl<'a> ImageContext<'a> {
    #[must_use]
    pub fn new(module: &'a str, os: Os, kind: ModuleKind, config: &'a Config) -> Self {
        Self {
            module,
            os,
            kind,
            config,
        }
    }

    #[must_use]
    pub fn module_name(&self) -> &str {
        self.module
    }

    #[must_use]
    pub fn os(&self) -> Os {
        self.os
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        self.config
    }

    #[must_use]
    pub fn platform(&self) -> bool {
        self.kind == ModuleKind::Platform
    }

    #[must_use]
    pub fn device_specific(&self) -> bool {
        self.kind == ModuleKind::DeviceSpecific
    }

    #[must_use]
    pub fn soc_specific(&self) -> bool {
        self.kind == ModuleKind::SocSpecific
    }

    #[must_use]
    pub fn product_specific(&self) -> bool {
        self.kind == ModuleKind::ProductSpecific
    }

    #[must_use]
    pub fn system_ext_specific(&self) -> bool {
        self.kind == ModuleKind::SystemExtSpecific
    }
}

/// Implemented by modules that build differently for each image
pub trait ImageInterface: fmt::Debug + Send + Sync {
    /// Called before any other image hook, on device modules only
    fn image_mutator_begin(&mut self, _ctx: &ImageContext<'_>) {}

    /// When false no image variants are created
    fn image_mutator_supported(&self) -> bool {
        true
    }

    fn core_variant_needed(&self, ctx: &ImageContext<'_>) -> bool;
    fn ramdisk_variant_needed(&self, ctx: &ImageContext<'_>) -> bool;
    fn vendor_ramdisk_variant_needed(&self, ctx: &ImageContext<'_>) -> bool;
    fn debug_ramdisk_variant_needed(&self, ctx: &ImageContext<'_>) -> bool;
    fn recovery_variant_needed(&self, ctx: &ImageContext<'_>) -> bool;
    fn vendor_variant_needed(&self, ctx: &ImageContext<'_>) -> bool;
    fn product_variant_needed(&self, ctx: &ImageContext<'_>) -> bool;

    /// Additional variations appended after the fixed ones
    fn extra_image_variations(&self, _ctx: &ImageContext<'_>) -> Vec<String> {
        Vec::new()
    }

    /// Called on each new image variant with its variation
    fn set_image_variation(&mut self, _ctx: &ImageContext<'_>, _variation: &str) {}

    fn clone_box(&self) -> Box<dyn ImageInterface>;
}

impl Clone for Box<dyn ImageInterface> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Fixed capability set of a module
#[derive(Debug, Clone, Default)]
pub struct Capabilities {
    pub override_module: Option<OverrideState>,
    pub overridable: Option<OverridableState>,
    pub image: Option<Box<dyn ImageInterface>>,
    pub partition_type: Option<PartitionType>,
    pub prebuilt: Option<PrebuiltState>,
}
