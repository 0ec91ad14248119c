//! Summary of a pipeline run

use serde::Serialize;
use varia_errors::Error;
use varia_graph::ModuleGraph;

/// What a pipeline run did to the graph
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RunReport {
    /// Phases in the order they ran
    pub phases: Vec<String>,
    /// Modules handed to the first phase
    pub modules_in: usize,
    /// Module variants left after the last phase
    pub modules_out: usize,
    /// Variants hidden because a prebuilt replaces them
    pub replaced_by_prebuilt: usize,
    pub duration_ms: u64,
}

impl RunReport {
    pub(crate) fn new(
        phases: Vec<String>,
        modules_in: usize,
        graph: &ModuleGraph,
        duration_ms: u64,
    ) -> Self {
        let replaced_by_prebuilt = graph
            .modules()
            .filter(|(_, module)| module.base().replaced_by_prebuilt())
            .count();
        Self {
            phases,
            modules_in,
            modules_out: graph.len(),
            replaced_by_prebuilt,
            duration_ms,
        }
    }

    /// Convert to JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the report cannot be serialized.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::internal(format!("failed to serialize run report: {e}")))
    }
}
