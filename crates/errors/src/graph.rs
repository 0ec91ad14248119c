//! Module graph error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum GraphError {
    #[error("module not found: {name}")]
    UnknownModule { name: String },

    #[error("unknown module type: {name}")]
    UnknownModuleType { name: String },

    #[error("module type registered more than once: {name}")]
    DuplicateModuleType { name: String },

    #[error("module defined more than once: {name}")]
    DuplicateModule { name: String },

    #[error("dependency cycle detected: {module}")]
    DependencyCycle { module: String },

    #[error("dependency of {from:?} on {to:?} matches {candidates} variants")]
    AmbiguousDependency {
        from: String,
        to: String,
        candidates: usize,
    },

    #[error("provider {provider} already set for module {module:?}")]
    ProviderAlreadySet { provider: String, module: String },
}

impl UserFacingError for GraphError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::UnknownModule { .. } => Some("Check the dependency name for typos."),
            Self::DuplicateModule { .. } => Some("Module names must be unique in the graph."),
            Self::DependencyCycle { .. } => Some("Break the cycle by removing one of the edges."),
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::UnknownModule { .. } => "graph.unknown_module",
            Self::UnknownModuleType { .. } => "graph.unknown_module_type",
            Self::DuplicateModuleType { .. } => "graph.duplicate_module_type",
            Self::DuplicateModule { .. } => "graph.duplicate_module",
            Self::DependencyCycle { .. } => "graph.dependency_cycle",
            Self::AmbiguousDependency { .. } => "graph.ambiguous_dependency",
            Self::ProviderAlreadySet { .. } => "graph.provider_already_set",
        };
        Some(code)
    }
}
