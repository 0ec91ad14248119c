#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for the varia mutator engine
//!
//! This crate provides fine-grained error types organized by domain.
//! All error types implement Clone so diagnostics can be collected from
//! worker threads and reported after a phase completes.

use std::borrow::Cow;

use thiserror::Error;

pub mod config;
pub mod graph;
pub mod module;
pub mod property;
pub mod transition;

// Re-export all error types at the root
pub use config::ConfigError;
pub use graph::GraphError;
pub use module::{ModuleDiagnostic, ModuleErrors};
pub use property::PropertyError;
pub use transition::TransitionError;

/// Generic error type for cross-crate boundaries
#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("transition error: {0}")]
    Transition(#[from] TransitionError),

    #[error("property error: {0}")]
    Property(#[from] PropertyError),

    #[error("{0}")]
    Module(ModuleErrors),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an internal error with a message
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Diagnostics attached to modules, if this is a module error
    #[must_use]
    pub fn diagnostics(&self) -> &[ModuleDiagnostic] {
        match self {
            Self::Module(errors) => &errors.0,
            _ => &[],
        }
    }
}

impl From<ModuleErrors> for Error {
    fn from(errors: ModuleErrors) -> Self {
        Self::Module(errors)
    }
}

impl From<ModuleDiagnostic> for Error {
    fn from(diagnostic: ModuleDiagnostic) -> Self {
        Self::Module(ModuleErrors(vec![diagnostic]))
    }
}

/// Result type alias for varia operations
pub type Result<T> = std::result::Result<T, Error>;

/// Minimal interface for rendering user-facing error information.
pub trait UserFacingError {
    /// Short message suitable for terminal output.
    fn user_message(&self) -> Cow<'_, str>;

    /// Optional remediation hint.
    fn user_hint(&self) -> Option<&'static str> {
        None
    }

    /// Whether retrying the same pass is likely to succeed. Mutator passes
    /// are deterministic, so nothing is retryable by default.
    fn is_retryable(&self) -> bool {
        false
    }

    /// Stable error code for structured reporting.
    fn user_code(&self) -> Option<&'static str> {
        None
    }
}

impl UserFacingError for Error {
    fn user_message(&self) -> Cow<'_, str> {
        match self {
            Error::Config(err) => err.user_message(),
            Error::Graph(err) => err.user_message(),
            Error::Transition(err) => err.user_message(),
            _ => Cow::Owned(self.to_string()),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Error::Config(err) => err.user_hint(),
            Error::Graph(err) => err.user_hint(),
            Error::Transition(err) => err.user_hint(),
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Error::Config(err) => err.user_code(),
            Error::Graph(err) => err.user_code(),
            Error::Transition(err) => err.user_code(),
            Error::Property(_) => Some("error.property"),
            Error::Module(_) => Some("error.module"),
            Error::Internal(_) => Some("error.internal"),
        }
    }
}
