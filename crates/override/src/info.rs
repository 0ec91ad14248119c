//! Per-variant override info

use varia_graph::Provider;
use varia_transition::TransitionInfo;
use varia_types::PropertyStruct;

/// Published by `override_deps` for each override module
pub const OVERRIDE_INFO: Provider<OverrideInfo> = Provider::new("override_deps");

/// What an override module does to the variant of its base it names.
/// The default value is the un-overridden variant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideInfo {
    /// Override module name, also the variation name
    pub name: String,
    pub overriding_properties: Vec<PropertyStruct>,
    /// Some prebuilt of the override module is preferred over it
    pub use_prebuilt: bool,
    pub prebuilt_partitions: Vec<String>,
    pub prebuilt_names: Vec<String>,
}

impl OverrideInfo {
    #[must_use]
    pub fn new(name: impl Into<String>, overriding_properties: Vec<PropertyStruct>) -> Self {
        Self {
            name: name.into(),
            overriding_properties,
            ..Self::default()
        }
    }

    /// Record a prebuilt that may replace the override module
    pub fn add_prebuilt(&mut self, name: impl Into<String>, partition: impl Into<String>, preferred: bool) {
        self.use_prebuilt |= preferred;
        self.prebuilt_names.push(name.into());
        self.prebuilt_partitions.push(partition.into());
    }

    /// Prebuilts paired with the partition they install to
    pub fn prebuilts(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prebuilt_names
            .iter()
            .zip(&self.prebuilt_partitions)
            .map(|(name, partition)| (name.as_str(), partition.as_str()))
    }
}

impl TransitionInfo for OverrideInfo {
    fn variation(&self) -> &str {
        &self.name
    }
}
