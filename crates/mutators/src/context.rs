//! Context for running the default mutators

use std::time::Instant;

use tracing::info;
use varia_config::Config;
use varia_errors::Error;
use varia_events::EventSender;
use varia_graph::ModuleGraph;
use varia_transition::{Engine, Pipeline};

use crate::report::RunReport;

/// Engine plus the pipeline it runs
#[derive(Debug)]
pub struct MutatorsCtx {
    engine: Engine,
    pipeline: Pipeline,
}

impl MutatorsCtx {
    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Run the pipeline over `graph`
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing phase.
    pub fn run(&self, graph: ModuleGraph) -> Result<(ModuleGraph, RunReport), Error> {
        let start = Instant::now();
        let modules_in = graph.len();
        let graph = self.engine.run(&self.pipeline, graph)?;

        let phases = self
            .pipeline
            .names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let report = RunReport::new(phases, modules_in, &graph, duration_ms);
        info!(
            modules_in = report.modules_in,
            modules_out = report.modules_out,
            duration_ms,
            "mutators finished"
        );
        Ok((graph, report))
    }
}

/// Builder for [`MutatorsCtx`]. Unset parts fall back to the default
/// configuration and the default pipeline.
#[derive(Debug, Default)]
pub struct MutatorsContextBuilder {
    config: Option<Config>,
    pipeline: Option<Pipeline>,
    tx: Option<EventSender>,
}

impl MutatorsContextBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set configuration
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace the default pipeline
    #[must_use]
    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    /// Set event sender
    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    #[must_use]
    pub fn build(self) -> MutatorsCtx {
        let mut engine = Engine::new(self.config.unwrap_or_default());
        if let Some(tx) = self.tx {
            engine = engine.with_events(tx);
        }
        MutatorsCtx {
            engine,
            pipeline: self.pipeline.unwrap_or_else(crate::default_pipeline),
        }
    }
}
