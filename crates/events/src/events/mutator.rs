use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Kind of a mutator phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    /// Touches only the module it is given
    Local,
    /// Reads the graph and queues edits applied after the phase
    BottomUp,
    /// Splits modules into variants and rewires edges
    Transition,
}

/// Mutator pass events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MutatorEvent {
    PhaseStarted {
        mutator: String,
        kind: PhaseKind,
        modules: usize,
    },

    PhaseCompleted {
        mutator: String,
        kind: PhaseKind,
        modules: usize,
        duration_ms: u64,
    },

    PhaseFailed {
        mutator: String,
        failure: FailureContext,
        diagnostics: usize,
    },

    /// A transition mutator expanded a module into variants
    VariantsCreated {
        mutator: String,
        module: String,
        variations: Vec<String>,
    },

    /// An override module's properties were merged into a base variant
    OverrideApplied {
        module: String,
        overridden_by: String,
        replaced_by_prebuilt: bool,
    },

    /// Edges on an override module were forwarded to the overridden variant
    DependenciesRedirected {
        from: String,
        to: String,
        variant: String,
        edges: usize,
    },
}
