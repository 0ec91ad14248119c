//! Release build flags consulted by mutator policies

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Disables the image-variation fallback from a `vendor` request to a
/// module whose only image variation is core.
pub const FIX_IMAGE_VARIANT_FALLBACK: &str = "RELEASE_FIX_IMAGE_VARIANT_FALLBACK";

/// Boolean release flags keyed by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildFlags(BTreeMap<String, bool>);

impl BuildFlags {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `name`; unset flags are false
    #[must_use]
    pub fn get_bool(&self, name: &str) -> bool {
        self.0.get(name).copied().unwrap_or(false)
    }

    pub fn set(&mut self, name: impl Into<String>, value: bool) {
        self.0.insert(name.into(), value);
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: bool) -> Self {
        self.set(name, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
