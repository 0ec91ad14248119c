//! Contexts handed to mutator callbacks

use std::sync::Arc;

use varia_config::Config;
use varia_events::{EventEmitter, EventSender};
use varia_graph::{DepTag, Diagnostics, Module, ModuleGraph, ModuleId, Provider};

/// Context of a `split` call
#[derive(Clone, Copy)]
pub struct SplitContext<'a> {
    graph: &'a ModuleGraph,
    id: ModuleId,
    config: &'a Config,
}

impl<'a> SplitContext<'a> {
    pub(crate) fn new(graph: &'a ModuleGraph, id: ModuleId, config: &'a Config) -> Self {
        Self { graph, id, config }
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

    /// Provider value published for this module
    #[must_use]
    pub fn provider<T: Send + Sync + 'static>(&self, provider: &Provider<T>) -> Option<Arc<T>> {
        self.graph.provider(self.id, provider)
    }
}

/// Context of an `outgoing_transition` call: an edge seen from its source
#[derive(Clone, Copy)]
pub struct OutgoingContext<'a> {
    graph: &'a ModuleGraph,
    source: ModuleId,
    target: ModuleId,
    tag: &'a DepTag,
    config: &'a Config,
}

impl<'a> OutgoingContext<'a> {
    pub(crate) fn new(
        graph: &'a ModuleGraph,
        source: ModuleId,
        target: ModuleId,
        tag: &'a DepTag,
        config: &'a Config,
    ) -> Self {
        Self {
            graph,
            source,
            target,
            tag,
            config,
        }
    }

    /// Module the edge starts from
    #[must_use]
    pub fn module(&self) -> &'a Module {
        self.graph.module(self.source)
    }

    /// Module the edge points at
    #[must_use]
    pub fn dependency(&self) -> &'a Module {
        self.graph.module(self.target)
    }

    #[must_use]
    pub fn tag(&self) -> &'a DepTag {
        self.tag
    }

    #[must_use]
    pub fn config(&self) -> &'a Config {
        self.config
    }

    #[must_use]
    pub fn provider<T: Send + Sync + 'static>(&self, provider: &Provider<T>) -> Option<Arc<T>> {
        self.graph.provider(self.source, provider)
    }
}

/// Context of an `incoming_transition` call: an edge seen from its target
#[derive(Clone, Copy)]
pub struct IncomingContext<'a> {
    graph: &'a ModuleGraph,
    target: ModuleId,
    source: ModuleId,
    tag: &'a DepTag,
    config: &'a Config,
}

impl<'a> IncomingContext<'a> {
    pub(crate) fn new(
        graph: &'a ModuleGraph,
        target: ModuleId,
        source: ModuleId,
        tag: &'a DepTag,
        config: &'a Config,
    ) -> Self {
        Self {
            graph,
            target,
            source,
            tag,
            config,
        }
    }

    /// Module the edge points at
    #[must_use]
    pub fn module(&self) -> &'a Module {
        self.graph.module(self.target)
    }

    /// Module the edge starts from
    #[must_use]
    pub fn dependent(&self) -> &'a Module {
        self.graph.module(self.source)
    }

    #[must_use]
    pub fn tag(&self) -> &'a DepTag {
        self.tag
    }

    #[must_use]
    pub fn config(&self) -> &'a Config {
        self.config
    }

    /// Provider value published for the target module
    #[must_use]
    pub fn provider<T: Send + Sync + 'static>(&self, provider: &Provider<T>) -> Option<Arc<T>> {
        self.graph.provider(self.target, provider)
    }
}

/// Exclusive access to one module variant
pub struct MutateContext<'a> {
    module: &'a mut Module,
    config: &'a Config,
    events: &'a Option<EventSender>,
    diagnostics: Diagnostics,
}

impl<'a> MutateContext<'a> {
    pub(crate) fn new(
        module: &'a mut Module,
        config: &'a Config,
        events: &'a Option<EventSender>,
    ) -> Self {
        Self {
            module,
            config,
            events,
            diagnostics: Diagnostics::new(),
        }
    }

    #[must_use]
    pub fn module(&self) -> &Module {
        self.module
    }

    pub fn module_mut(&mut self) -> &mut Module {
        self.module
    }

    #[must_use]
    pub fn config(&self) -> &'a Config {
        self.config
    }

    pub fn module_error(&mut self, message: impl Into<String>) {
        self.diagnostics.module_error(self.module, message);
    }

    pub fn property_error(&mut self, property: impl Into<String>, message: impl Into<String>) {
        self.diagnostics.property_error(self.module, property, message);
    }

    /// Report a property error against another module, e.g. the override
    /// module whose properties failed to merge
    pub fn other_module_property_error(
        &mut self,
        module: &str,
        property: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(varia_errors::ModuleDiagnostic::property(
            module,
            self.module.variant_name(),
            property,
            message,
        ));
    }

    pub(crate) fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }
}

impl EventEmitter for MutateContext<'_> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.events.as_ref()
    }
}
