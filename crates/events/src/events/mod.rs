use serde::{Deserialize, Serialize};

use crate::EventSource;
use varia_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl FailureContext {
    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self {
            code: error.user_code().map(Into::into),
            message: error.user_message().into_owned(),
            hint: error.user_hint().map(Into::into),
        }
    }
}

pub mod general;
pub mod mutator;

pub use general::*;
pub use mutator::*;

/// Top-level event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    General(GeneralEvent),

    Mutator(MutatorEvent),
}

impl AppEvent {
    /// Identify the source domain for this event (used for metadata/logging).
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::GENERAL,
            Self::Mutator(MutatorEvent::OverrideApplied { .. })
            | Self::Mutator(MutatorEvent::DependenciesRedirected { .. }) => EventSource::OVERRIDE,
            Self::Mutator(_) => EventSource::ENGINE,
        }
    }

    /// Mutator that emitted this event, for phase-level events
    #[must_use]
    pub fn mutator(&self) -> Option<&str> {
        match self {
            Self::Mutator(
                MutatorEvent::PhaseStarted { mutator, .. }
                | MutatorEvent::PhaseCompleted { mutator, .. }
                | MutatorEvent::PhaseFailed { mutator, .. }
                | MutatorEvent::VariantsCreated { mutator, .. },
            ) => Some(mutator),
            _ => None,
        }
    }

    /// Determine the log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::General(GeneralEvent::Warning { .. }) => Level::WARN,
            Self::Mutator(MutatorEvent::PhaseFailed { .. }) => Level::ERROR,
            Self::Mutator(MutatorEvent::PhaseStarted { .. } | MutatorEvent::PhaseCompleted { .. }) => {
                Level::INFO
            }
            Self::General(GeneralEvent::DebugLog { .. })
            | Self::Mutator(
                MutatorEvent::VariantsCreated { .. }
                | MutatorEvent::OverrideApplied { .. }
                | MutatorEvent::DependenciesRedirected { .. },
            ) => Level::DEBUG,
        }
    }
}
