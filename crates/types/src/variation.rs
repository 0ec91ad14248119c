//! Variant identity of a module

use serde::{Deserialize, Serialize};
use std::fmt;

/// One (mutator, variation) pair applied to a module
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variation {
    pub mutator: String,
    pub variation: String,
}

impl Variation {
    pub fn new(mutator: impl Into<String>, variation: impl Into<String>) -> Self {
        Self {
            mutator: mutator.into(),
            variation: variation.into(),
        }
    }
}

/// Ordered list of variations accumulated across the transition mutators
/// that have run. Two module references denote the same module iff their
/// names and identities are equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantIdentity(Vec<Variation>);

impl VariantIdentity {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the variation chosen by `mutator`
    pub fn push(&mut self, mutator: impl Into<String>, variation: impl Into<String>) {
        self.0.push(Variation::new(mutator, variation));
    }

    /// Variation chosen by `mutator`, if it has run on this module
    #[must_use]
    pub fn get(&self, mutator: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|v| v.mutator == mutator)
            .map(|v| v.variation.as_str())
    }

    #[must_use]
    pub fn variations(&self) -> &[Variation] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Variant name: the non-empty variations joined by `_`
    #[must_use]
    pub fn name(&self) -> String {
        self.0
            .iter()
            .filter(|v| !v.variation.is_empty())
            .map(|v| v.variation.as_str())
            .collect::<Vec<_>>()
            .join("_")
    }
}

impl fmt::Display for VariantIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
