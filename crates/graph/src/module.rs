//! Modules, dependency edges and per-variant state

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use varia_config::Config;
use varia_types::{
    ImageVariation, ModuleKind, Os, PartitionType, PropertyStruct, SchemaId, VariantIdentity,
};

use crate::capability::{
    Capabilities, ImageContext, ImageInterface, OverridableState, OverrideState, PrebuiltState,
};
use crate::registry::ModuleTypeDescriptor;

/// Index of a module variant in the graph arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(usize);

impl ModuleId {
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Dependency tag. Transition policies decide per tag which variant an
/// edge binds to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DepTag {
    /// Override module to the module named by its `base` property
    OverrideBase,
    /// Source module to the prebuilt that may replace it
    Prebuilt,
    /// Filesystem-image module to its contents
    Partition,
    /// Generic dependency declared by a property
    Named(String),
}

impl fmt::Display for DepTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OverrideBase => write!(f, "override_base"),
            Self::Prebuilt => write!(f, "prebuilt"),
            Self::Partition => write!(f, "partition"),
            Self::Named(name) => write!(f, "{name}"),
        }
    }
}

/// Outgoing dependency edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub tag: DepTag,
    pub target: ModuleId,
}

impl Dependency {
    #[must_use]
    pub fn new(tag: DepTag, target: ModuleId) -> Self {
        Self { tag, target }
    }
}

/// State every module carries regardless of type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleBase {
    image_variation: String,
    hide_from_make: bool,
    replaced_by_prebuilt: bool,
}

impl ModuleBase {
    #[must_use]
    pub fn image_variation(&self) -> &str {
        &self.image_variation
    }

    pub fn set_image_variation(&mut self, variation: impl Into<String>) {
        self.image_variation = variation.into();
    }

    #[must_use]
    pub fn hide_from_make(&self) -> bool {
        self.hide_from_make
    }

    pub fn set_hide_from_make(&mut self) {
        self.hide_from_make = true;
    }

    #[must_use]
    pub fn replaced_by_prebuilt(&self) -> bool {
        self.replaced_by_prebuilt
    }

    /// Mark this variant as replaced by a prebuilt, which also hides it
    pub fn set_replaced_by_prebuilt(&mut self) {
        self.replaced_by_prebuilt = true;
        self.hide_from_make = true;
    }
}

/// Transition applied to a variant, with the info it was created from
#[derive(Debug, Clone)]
pub struct AppliedTransition {
    pub mutator: String,
    pub info: Arc<dyn Any + Send + Sync>,
}

/// A node of the module graph. After a transition mutator runs, each
/// module is one variant of its base name.
#[derive(Debug, Clone)]
pub struct Module {
    name: String,
    descriptor: Arc<ModuleTypeDescriptor>,
    os: Os,
    kind: ModuleKind,
    enabled: bool,
    properties: Vec<PropertyStruct>,
    base: ModuleBase,
    identity: VariantIdentity,
    transitions: Vec<AppliedTransition>,
    deps: Vec<Dependency>,
    capabilities: Capabilities,
}

impl Module {
    pub fn new(descriptor: &Arc<ModuleTypeDescriptor>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            descriptor: Arc::clone(descriptor),
            os: Os::default(),
            kind: ModuleKind::default(),
            enabled: true,
            properties: Vec::new(),
            base: ModuleBase::default(),
            identity: VariantIdentity::new(),
            transitions: Vec::new(),
            deps: Vec::new(),
            capabilities: Capabilities::default(),
        }
    }

    #[must_use]
    pub fn with_os(mut self, os: Os) -> Self {
        self.os = os;
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: ModuleKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_properties(mut self, properties: PropertyStruct) -> Self {
        self.properties.push(properties);
        self
    }

    /// Make this an override module of `base`
    #[must_use]
    pub fn as_override(mut self, base: impl Into<String>) -> Self {
        self.capabilities.override_module = Some(OverrideState::new(base));
        self
    }

    #[must_use]
    pub fn as_overridable(mut self) -> Self {
        self.capabilities.overridable = Some(OverridableState::default());
        self
    }

    #[must_use]
    pub fn as_prebuilt(mut self, use_prebuilt: bool) -> Self {
        self.capabilities.prebuilt = Some(PrebuiltState { use_prebuilt });
        self
    }

    #[must_use]
    pub fn with_image(mut self, image: impl ImageInterface + 'static) -> Self {
        self.capabilities.image = Some(Box::new(image));
        self
    }

    #[must_use]
    pub fn with_partition_type(mut self, partition: PartitionType) -> Self {
        self.capabilities.partition_type = Some(partition);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        self.descriptor.name()
    }

    #[must_use]
    pub fn descriptor(&self) -> &ModuleTypeDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub fn os(&self) -> Os {
        self.os
    }

    #[must_use]
    pub fn kind(&self) -> ModuleKind {
        self.kind
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn properties(&self) -> &[PropertyStruct] {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut [PropertyStruct] {
        &mut self.properties
    }

    /// Property struct of the given schema, if the module declares one
    #[must_use]
    pub fn property(&self, schema: &SchemaId) -> Option<&PropertyStruct> {
        self.properties.iter().find(|p| p.schema() == schema)
    }

    pub fn property_mut(&mut self, schema: &SchemaId) -> Option<&mut PropertyStruct> {
        self.properties.iter_mut().find(|p| p.schema() == schema)
    }

    /// Property struct of the given schema, created empty if the module
    /// never set any of its fields
    pub fn property_entry(&mut self, schema: &SchemaId) -> &mut PropertyStruct {
        let index = match self.properties.iter().position(|p| p.schema() == schema) {
            Some(index) => index,
            None => {
                self.properties.push(PropertyStruct::new(schema.clone()));
                self.properties.len() - 1
            }
        };
        &mut self.properties[index]
    }

    #[must_use]
    pub fn base(&self) -> &ModuleBase {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut ModuleBase {
        &mut self.base
    }

    #[must_use]
    pub fn identity(&self) -> &VariantIdentity {
        &self.identity
    }

    /// Non-empty variations joined by `_`; empty for the default variant
    #[must_use]
    pub fn variant_name(&self) -> String {
        self.identity.name()
    }

    /// Name qualified by variant, e.g. `bar{vendor,foo_override}`
    #[must_use]
    pub fn qualified_name(&self) -> String {
        let variations: Vec<&str> = self
            .identity
            .variations()
            .iter()
            .filter(|v| !v.variation.is_empty())
            .map(|v| v.variation.as_str())
            .collect();
        if variations.is_empty() {
            self.name.clone()
        } else {
            format!("{}{{{}}}", self.name, variations.join(","))
        }
    }

    /// Record that `mutator` placed this variant in `variation`
    pub fn apply_transition(
        &mut self,
        mutator: impl Into<String>,
        variation: impl Into<String>,
        info: Arc<dyn Any + Send + Sync>,
    ) {
        let mutator = mutator.into();
        self.identity.push(mutator.clone(), variation);
        self.transitions.push(AppliedTransition { mutator, info });
    }

    #[must_use]
    pub fn applied_transition(&self, mutator: &str) -> Option<&AppliedTransition> {
        self.transitions.iter().find(|t| t.mutator == mutator)
    }

    /// Transition info `mutator` created this variant with
    #[must_use]
    pub fn transition_info<T: Any>(&self, mutator: &str) -> Option<&T> {
        self.applied_transition(mutator)
            .and_then(|t| t.info.downcast_ref::<T>())
    }

    #[must_use]
    pub fn deps(&self) -> &[Dependency] {
        &self.deps
    }

    pub fn deps_mut(&mut self) -> &mut Vec<Dependency> {
        &mut self.deps
    }

    pub fn deps_with_tag<'a>(&'a self, tag: &'a DepTag) -> impl Iterator<Item = ModuleId> + 'a {
        self.deps
            .iter()
            .filter(move |d| &d.tag == tag)
            .map(|d| d.target)
    }

    #[must_use]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn capabilities_mut(&mut self) -> &mut Capabilities {
        &mut self.capabilities
    }

    #[must_use]
    pub fn override_state(&self) -> Option<&OverrideState> {
        self.capabilities.override_module.as_ref()
    }

    #[must_use]
    pub fn overridable_state(&self) -> Option<&OverridableState> {
        self.capabilities.overridable.as_ref()
    }

    pub fn overridable_state_mut(&mut self) -> Option<&mut OverridableState> {
        self.capabilities.overridable.as_mut()
    }

    #[must_use]
    pub fn is_override(&self) -> bool {
        self.capabilities.override_module.is_some()
    }

    #[must_use]
    pub fn is_overridable(&self) -> bool {
        self.capabilities.overridable.is_some()
    }

    #[must_use]
    pub fn prebuilt(&self) -> Option<PrebuiltState> {
        self.capabilities.prebuilt
    }

    #[must_use]
    pub fn partition_type(&self) -> Option<PartitionType> {
        self.capabilities.partition_type
    }

    #[must_use]
    pub fn image(&self) -> Option<&dyn ImageInterface> {
        self.capabilities.image.as_deref()
    }

    /// Context for image hooks of this module
    #[must_use]
    pub fn image_context<'a>(&'a self, config: &'a Config) -> ImageContext<'a> {
        ImageContext::new(&self.name, self.os, self.kind, config)
    }

    /// Mutable image hooks together with their context
    pub fn image_parts_mut<'a>(
        &'a mut self,
        config: &'a Config,
    ) -> Option<(&'a mut dyn ImageInterface, ImageContext<'a>)> {
        let ctx = ImageContext::new(&self.name, self.os, self.kind, config);
        let image: &'a mut dyn ImageInterface = self.capabilities.image.as_deref_mut()?;
        Some((image, ctx))
    }

    /// Partition this variant installs to
    #[must_use]
    pub fn partition_tag(&self) -> &'static str {
        match self.base.image_variation() {
            ImageVariation::RECOVERY => "recovery",
            ImageVariation::RAMDISK => "ramdisk",
            ImageVariation::VENDOR_RAMDISK => "vendor_ramdisk",
            ImageVariation::DEBUG_RAMDISK => "debug_ramdisk",
            ImageVariation::VENDOR if self.kind != ModuleKind::DeviceSpecific => "vendor",
            ImageVariation::PRODUCT => "product",
            _ => self.kind.partition(),
        }
    }
}
