//! Type-erased view of a transition mutator, so a pipeline can hold
//! mutators with different info types

use std::any::Any;
use std::sync::Arc;

use varia_errors::Error;

use crate::context::{IncomingContext, MutateContext, OutgoingContext, SplitContext};
use crate::mutator::{TransitionInfo, TransitionMutator};

pub(crate) type ErasedInfo = Arc<dyn Any + Send + Sync>;

/// A variation together with the info that selects it
#[derive(Debug, Clone)]
pub(crate) struct Variant {
    pub variation: String,
    pub info: ErasedInfo,
}

impl Variant {
    fn new<I: TransitionInfo>(info: I) -> Self {
        Self {
            variation: info.variation().to_string(),
            info: Arc::new(info),
        }
    }
}

pub(crate) trait ErasedTransition: Send + Sync {
    fn name(&self) -> &str;

    fn split(&self, ctx: &SplitContext<'_>) -> Vec<Variant>;

    fn outgoing(&self, ctx: &OutgoingContext<'_>, source: &ErasedInfo) -> Result<Variant, Error>;

    fn incoming(&self, ctx: &IncomingContext<'_>, incoming: &Variant) -> Result<Variant, Error>;

    fn accepts_new_variant(&self, ctx: &IncomingContext<'_>, info: &Variant) -> Result<bool, Error>;

    fn mutate(&self, ctx: &mut MutateContext<'_>, info: &ErasedInfo) -> Result<(), Error>;

    fn from_variation(&self, variation: &str) -> Result<Variant, Error>;
}

pub(crate) struct TransitionAdapter<M>(pub M);

impl<M: TransitionMutator> TransitionAdapter<M> {
    fn downcast<'i>(&self, info: &'i ErasedInfo) -> Result<&'i M::Info, Error> {
        info.downcast_ref::<M::Info>().ok_or_else(|| {
            Error::internal(format!(
                "{}: transition info of an unexpected type",
                self.0.name()
            ))
        })
    }
}

impl<M: TransitionMutator> ErasedTransition for TransitionAdapter<M> {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn split(&self, ctx: &SplitContext<'_>) -> Vec<Variant> {
        self.0.split(ctx).into_iter().map(Variant::new).collect()
    }

    fn outgoing(&self, ctx: &OutgoingContext<'_>, source: &ErasedInfo) -> Result<Variant, Error> {
        let source = self.downcast(source)?;
        Ok(Variant::new(self.0.outgoing_transition(ctx, source)))
    }

    fn incoming(&self, ctx: &IncomingContext<'_>, incoming: &Variant) -> Result<Variant, Error> {
        let incoming = self.downcast(&incoming.info)?.clone();
        Ok(Variant::new(self.0.incoming_transition(ctx, incoming)))
    }

    fn accepts_new_variant(&self, ctx: &IncomingContext<'_>, info: &Variant) -> Result<bool, Error> {
        let info = self.downcast(&info.info)?;
        Ok(self.0.accepts_new_variant(ctx, info))
    }

    fn mutate(&self, ctx: &mut MutateContext<'_>, info: &ErasedInfo) -> Result<(), Error> {
        let info = self.downcast(info)?;
        self.0.mutate(ctx, info);
        Ok(())
    }

    fn from_variation(&self, variation: &str) -> Result<Variant, Error> {
        Ok(Variant::new(self.0.transition_info_from_variation(variation)?))
    }
}
