//! Bottom-up mutator phases

use std::sync::Arc;

use tracing::debug;
use varia_config::Config;
use varia_errors::Error;
use varia_events::{EventEmitter, EventSender, MutatorEvent};
use varia_graph::{
    DepTag, Dependency, Diagnostics, ExecutionPlan, ExecutionStats, Module, ModuleGraph, ModuleId,
    Provider,
};
use varia_types::Variation;

use crate::mutator::BottomUpMutator;
use crate::parallel;
use crate::pipeline::PhaseEnv;
use crate::resolve;

/// Graph edit queued by a bottom-up mutator
#[derive(Debug, Clone)]
enum Action {
    AddDependency {
        tag: DepTag,
        name: String,
        variations: Vec<Variation>,
    },
    ReplaceDependencies {
        name: String,
    },
}

/// Everything a visit produced
#[derive(Debug, Default)]
struct VisitOutput {
    actions: Vec<Action>,
    diagnostics: Diagnostics,
    failures: Vec<Error>,
}

/// Read access to the graph around one module, plus a queue of edits
pub struct BottomUpContext<'a> {
    graph: &'a ModuleGraph,
    id: ModuleId,
    config: &'a Config,
    events: &'a Option<EventSender>,
    output: VisitOutput,
}

impl<'a> BottomUpContext<'a> {
    fn new(
        graph: &'a ModuleGraph,
        id: ModuleId,
        config: &'a Config,
        events: &'a Option<EventSender>,
    ) -> Self {
        Self {
            graph,
            id,
            config,
            events,
            output: VisitOutput::default(),
        }
    }

    #[must_use]
    pub fn module(&self) -> &'a Module {
        self.graph.module(self.id)
    }

    #[must_use]
    pub fn module_id(&self) -> ModuleId {
        self.id
    }

    #[must_use]
    pub fn config(&self) -> &'a Config {
        self.config
    }

    #[must_use]
    pub fn other_module(&self, id: ModuleId) -> &'a Module {
        self.graph.module(id)
    }

    #[must_use]
    pub fn other_module_exists(&self, name: &str) -> bool {
        self.graph.exists(name)
    }

    /// Direct dependencies reached over edges with `tag`
    pub fn direct_deps_with_tag<'t>(
        &self,
        tag: &'t DepTag,
    ) -> impl Iterator<Item = (ModuleId, &'a Module)> + 't
    where
        'a: 't,
    {
        let graph = self.graph;
        self.module()
            .deps_with_tag(tag)
            .map(move |id| (id, graph.module(id)))
    }

    /// Queue a dependency on `name`. The variant is picked by replaying the
    /// transitions that already ran.
    pub fn add_dependency(&mut self, tag: DepTag, name: impl Into<String>) {
        self.output.actions.push(Action::AddDependency {
            tag,
            name: name.into(),
            variations: Vec::new(),
        });
    }

    /// Queue a dependency on `name`, naming the variation explicitly for
    /// some of the transitions that already ran
    pub fn add_variation_dependency(
        &mut self,
        variations: Vec<Variation>,
        tag: DepTag,
        name: impl Into<String>,
    ) {
        self.output.actions.push(Action::AddDependency {
            tag,
            name: name.into(),
            variations,
        });
    }

    /// Queue redirection of every edge on the variant of `name` with this
    /// module's identity to this module
    pub fn replace_dependencies(&mut self, name: impl Into<String>) {
        self.output
            .actions
            .push(Action::ReplaceDependencies { name: name.into() });
    }

    /// Publish a provider value for this module
    pub fn set_provider<T: Send + Sync + 'static>(&mut self, provider: &Provider<T>, value: T) {
        if let Err(err) = self.graph.set_provider(self.id, provider, value) {
            self.output.failures.push(err.into());
        }
    }

    #[must_use]
    pub fn provider<T: Send + Sync + 'static>(
        &self,
        id: ModuleId,
        provider: &Provider<T>,
    ) -> Option<Arc<T>> {
        self.graph.provider(id, provider)
    }

    pub fn module_error(&mut self, message: impl Into<String>) {
        let module = self.module();
        self.output.diagnostics.module_error(module, message);
    }

    pub fn property_error(&mut self, property: impl Into<String>, message: impl Into<String>) {
        let module = self.module();
        self.output.diagnostics.property_error(module, property, message);
    }

    /// Report an internal inconsistency. The phase fails with it unless
    /// module errors were reported as well.
    pub fn internal_error(&mut self, message: impl Into<String>) {
        self.output.failures.push(Error::internal(message));
    }
}

impl EventEmitter for BottomUpContext<'_> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.events.as_ref()
    }
}

pub(crate) fn run(
    mutator: &dyn BottomUpMutator,
    mut graph: ModuleGraph,
    env: &PhaseEnv<'_>,
) -> Result<ModuleGraph, Error> {
    let plan = ExecutionPlan::from_graph(&graph)?;
    let stats = ExecutionStats::from_plan(&plan);
    debug!(
        mutator = mutator.name(),
        modules = stats.total_modules,
        batches = stats.batch_count,
        widest = stats.max_batch_size,
        "bottom-up plan"
    );

    let outputs = {
        let graph = &graph;
        parallel::visit_bottom_up(&plan, env.workers, |id| {
            let mut ctx = BottomUpContext::new(graph, id, env.config, env.events);
            mutator.visit(&mut ctx);
            ctx.output
        })?
    };

    let mut diagnostics = Diagnostics::new();
    let mut failures = Vec::new();
    let mut additions = Vec::new();
    let mut replacements = Vec::new();

    for (id, output) in outputs {
        diagnostics.extend(output.diagnostics);
        failures.extend(output.failures);
        for action in output.actions {
            match action {
                Action::AddDependency {
                    tag,
                    name,
                    variations,
                } => {
                    match resolve::resolve_dependency(&graph, env, id, &tag, &name, &variations) {
                        Ok(target) => additions.push((id, Dependency::new(tag, target))),
                        Err(err) => failures.push(err),
                    }
                }
                Action::ReplaceDependencies { name } => replacements.push((id, name)),
            }
        }
    }

    diagnostics.into_result()?;
    if let Some(err) = failures.into_iter().next() {
        return Err(err);
    }

    for (id, dep) in additions {
        graph.module_mut(id).deps_mut().push(dep);
    }
    for (id, name) in replacements {
        let edges = replace_dependencies(&mut graph, id, &name);
        if edges > 0 {
            let module = graph.module(id);
            env.emit_mutator(MutatorEvent::DependenciesRedirected {
                from: name,
                to: module.name().to_string(),
                variant: module.variant_name(),
                edges,
            });
        }
    }

    Ok(graph)
}

/// Point every edge on the variant of `name` whose identity equals the
/// identity of `replacement` at `replacement`. Edges leaving `replacement`
/// itself are kept. Returns the number of edges changed.
fn replace_dependencies(graph: &mut ModuleGraph, replacement: ModuleId, name: &str) -> usize {
    let identity = graph.module(replacement).identity().clone();
    let targets: Vec<ModuleId> = graph
        .variants(name)
        .iter()
        .copied()
        .filter(|id| *id != replacement && graph.module(*id).identity() == &identity)
        .collect();
    if targets.is_empty() {
        return 0;
    }

    let mut count = 0;
    for (index, module) in graph.modules_mut().iter_mut().enumerate() {
        if index == replacement.index() {
            continue;
        }
        for dep in module.deps_mut() {
            if targets.contains(&dep.target) {
                dep.target = replacement;
                count += 1;
            }
        }
    }
    count
}
