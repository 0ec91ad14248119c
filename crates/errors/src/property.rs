//! Property merge error types

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum PropertyError {
    /// A field holds values of different kinds on the two sides of a merge.
    /// `property` is the dotted path below the struct root.
    #[error("mismatched types {expected} and {found}")]
    MismatchedTypes {
        property: String,
        expected: String,
        found: String,
    },
}

impl PropertyError {
    /// Dotted path of the offending property
    #[must_use]
    pub fn property(&self) -> &str {
        match self {
            Self::MismatchedTypes { property, .. } => property,
        }
    }
}
