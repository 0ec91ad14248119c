//! Mutator pipeline and the engine that runs it

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};
use varia_config::Config;
use varia_errors::Error;
use varia_events::{EventEmitter, EventSender, FailureContext, MutatorEvent, PhaseKind};
use varia_graph::ModuleGraph;

use crate::erased::{ErasedTransition, TransitionAdapter};
use crate::mutator::{BottomUpMutator, LocalMutator, TransitionMutator};
use crate::{bottom_up, local, transition};

enum Phase {
    Local(Arc<dyn LocalMutator>),
    BottomUp(Arc<dyn BottomUpMutator>),
    Transition(Arc<dyn ErasedTransition>),
}

impl Phase {
    fn name(&self) -> &str {
        match self {
            Self::Local(m) => m.name(),
            Self::BottomUp(m) => m.name(),
            Self::Transition(m) => m.name(),
        }
    }

    fn kind(&self) -> PhaseKind {
        match self {
            Self::Local(_) => PhaseKind::Local,
            Self::BottomUp(_) => PhaseKind::BottomUp,
            Self::Transition(_) => PhaseKind::Transition,
        }
    }
}

/// Ordered list of mutator phases
#[derive(Default)]
pub struct Pipeline {
    phases: Vec<Phase>,
}

impl Pipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn local<M: LocalMutator + 'static>(&mut self, mutator: M) -> &mut Self {
        self.phases.push(Phase::Local(Arc::new(mutator)));
        self
    }

    pub fn bottom_up<M: BottomUpMutator + 'static>(&mut self, mutator: M) -> &mut Self {
        self.phases.push(Phase::BottomUp(Arc::new(mutator)));
        self
    }

    pub fn transition<M: TransitionMutator + 'static>(&mut self, mutator: M) -> &mut Self {
        self.phases
            .push(Phase::Transition(Arc::new(TransitionAdapter(mutator))));
        self
    }

    /// Phase names in run order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.phases.iter().map(Phase::name).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Shared state of one phase run
pub(crate) struct PhaseEnv<'a> {
    pub config: &'a Config,
    pub events: &'a Option<EventSender>,
    pub workers: usize,
    /// Transition mutators that already ran, in order
    pub completed: &'a [Arc<dyn ErasedTransition>],
}

impl EventEmitter for PhaseEnv<'_> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.events.as_ref()
    }
}

/// Runs pipelines over module graphs
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: Config,
    events: Option<EventSender>,
}

impl Engine {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            events: None,
        }
    }

    /// Forward phase events to `sender`
    #[must_use]
    pub fn with_events(mut self, sender: EventSender) -> Self {
        self.events = Some(sender);
        self
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run every phase of `pipeline` in order. The first failing phase
    /// aborts the run with all errors it collected.
    ///
    /// # Errors
    ///
    /// Returns module diagnostics, transition errors (missing or duplicate
    /// variants) or graph errors (cycles, unknown or ambiguous dependencies).
    pub fn run(&self, pipeline: &Pipeline, mut graph: ModuleGraph) -> Result<ModuleGraph, Error> {
        let workers = self.config.worker_count();
        let mut completed: Vec<Arc<dyn ErasedTransition>> = Vec::new();

        info!(
            phases = pipeline.len(),
            modules = graph.len(),
            workers,
            "running mutators"
        );

        for phase in &pipeline.phases {
            let name = phase.name().to_string();
            let kind = phase.kind();
            let modules = graph.len();
            self.emit_mutator(MutatorEvent::PhaseStarted {
                mutator: name.clone(),
                kind,
                modules,
            });
            let start = Instant::now();

            let env = PhaseEnv {
                config: &self.config,
                events: &self.events,
                workers,
                completed: &completed,
            };
            let result = match phase {
                Phase::Local(m) => local::run(m.as_ref(), graph, &env),
                Phase::BottomUp(m) => bottom_up::run(m.as_ref(), graph, &env),
                Phase::Transition(m) => transition::run(m.as_ref(), graph, &env),
            };

            match result {
                Ok(next) => graph = next,
                Err(err) => {
                    warn!(mutator = %name, error = %err, "mutator failed");
                    self.emit_mutator(MutatorEvent::PhaseFailed {
                        mutator: name,
                        failure: FailureContext::from_error(&err),
                        diagnostics: err.diagnostics().len(),
                    });
                    return Err(err);
                }
            }

            if let Phase::Transition(m) = phase {
                completed.push(Arc::clone(m));
            }
            self.emit_mutator(MutatorEvent::PhaseCompleted {
                mutator: name,
                kind,
                modules: graph.len(),
                duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            });
        }

        Ok(graph)
    }
}

impl EventEmitter for Engine {
    fn event_sender(&self) -> Option<&EventSender> {
        self.events.as_ref()
    }
}
