//! Transition mutator error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum TransitionError {
    #[error("{mutator}: split of module {module:?} returned no variations")]
    EmptySplit { mutator: String, module: String },

    #[error("{mutator}: module {module:?} has duplicate variation {variation:?}")]
    DuplicateVariation {
        mutator: String,
        module: String,
        variation: String,
    },

    #[error("{mutator}: module {module:?} does not have variant {variation:?} (requested by {dependent:?})")]
    MissingVariant {
        mutator: String,
        module: String,
        variation: String,
        dependent: String,
    },

    #[error("{mutator}: {operation} is not supported")]
    Unsupported { mutator: String, operation: String },
}

impl UserFacingError for TransitionError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::MissingVariant { .. } => {
                Some("The dependency is not built for the requested image or variant.")
            }
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::EmptySplit { .. } => "transition.empty_split",
            Self::DuplicateVariation { .. } => "transition.duplicate_variation",
            Self::MissingVariant { .. } => "transition.missing_variant",
            Self::Unsupported { .. } => "transition.unsupported",
        };
        Some(code)
    }
}
