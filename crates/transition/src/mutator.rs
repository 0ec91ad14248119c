//! Mutator traits

use std::fmt;

use varia_errors::TransitionError;

use crate::bottom_up::BottomUpContext;
use crate::context::{IncomingContext, MutateContext, OutgoingContext, SplitContext};

/// Per-variant payload of a transition mutator. The default value is the
/// empty variation.
pub trait TransitionInfo: Clone + Default + fmt::Debug + Send + Sync + 'static {
    /// Variation name this info selects
    fn variation(&self) -> &str;
}

impl TransitionInfo for String {
    fn variation(&self) -> &str {
        self
    }
}

/// Splits modules into variants and picks, for every dependency edge, the
/// variant on each side
///
/// `split`, `outgoing_transition` and `incoming_transition` must be pure;
/// the engine may call them more than once for the same module or edge.
pub trait TransitionMutator: Send + Sync {
    type Info: TransitionInfo;

    fn name(&self) -> &str;

    /// Variants `ctx.module()` is expanded into. Must not be empty and must
    /// not repeat a variation.
    fn split(&self, ctx: &SplitContext<'_>) -> Vec<Self::Info>;

    /// Variation an edge requests, given the source variant's info
    fn outgoing_transition(&self, _ctx: &OutgoingContext<'_>, _source: &Self::Info) -> Self::Info {
        Self::Info::default()
    }

    /// Variant of `ctx.module()` an edge binds to, given what the source
    /// side requested
    fn incoming_transition(&self, ctx: &IncomingContext<'_>, incoming: Self::Info) -> Self::Info;

    /// Whether an incoming variation missing from the target's split may
    /// be created on demand. Created variants keep discovery order.
    fn accepts_new_variant(&self, _ctx: &IncomingContext<'_>, _info: &Self::Info) -> bool {
        false
    }

    /// Configure one variant. Must not add dependencies.
    fn mutate(&self, ctx: &mut MutateContext<'_>, info: &Self::Info);

    /// Info for a dependency that names its variation explicitly
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::Unsupported` unless the mutator overrides it.
    fn transition_info_from_variation(&self, _variation: &str) -> Result<Self::Info, TransitionError> {
        Err(TransitionError::Unsupported {
            mutator: self.name().to_string(),
            operation: "transition_info_from_variation".to_string(),
        })
    }
}

/// Edits modules one at a time, without looking at the rest of the graph
pub trait LocalMutator: Send + Sync {
    fn name(&self) -> &str;

    fn mutate(&self, ctx: &mut MutateContext<'_>);
}

/// Visits each module after its dependencies. Graph edits are queued on
/// the context and applied after the whole graph has been visited.
pub trait BottomUpMutator: Send + Sync {
    fn name(&self) -> &str;

    fn visit(&self, ctx: &mut BottomUpContext<'_>);
}
