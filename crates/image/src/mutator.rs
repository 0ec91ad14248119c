//! Image mutators

use tracing::trace;
use varia_errors::TransitionError;
use varia_transition::{
    IncomingContext, LocalMutator, MutateContext, OutgoingContext, SplitContext, TransitionMutator,
};

use crate::variations::{image_variations, incoming_image_variation};

/// Name of the local phase that primes image hooks
pub const IMAGE_BEGIN: &str = "image_begin";

/// Name of the image transition mutator
pub const IMAGE: &str = "image";

/// Runs `image_mutator_begin` on every device module before the split
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageBeginMutator;

impl LocalMutator for ImageBeginMutator {
    fn name(&self) -> &str {
        IMAGE_BEGIN
    }

    fn mutate(&self, ctx: &mut MutateContext<'_>) {
        if !ctx.module().os().is_device() {
            return;
        }
        let config = ctx.config();
        if let Some((image, image_ctx)) = ctx.module_mut().image_parts_mut(config) {
            image.image_mutator_begin(&image_ctx);
        }
    }
}

/// Splits device modules by image
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageTransitionMutator;

impl TransitionMutator for ImageTransitionMutator {
    type Info = String;

    fn name(&self) -> &str {
        IMAGE
    }

    fn split(&self, ctx: &SplitContext<'_>) -> Vec<String> {
        image_variations(ctx.module(), ctx.config())
    }

    fn outgoing_transition(&self, ctx: &OutgoingContext<'_>, source: &String) -> String {
        match ctx.module().partition_type() {
            Some(partition) => partition.image_variation().to_string(),
            None => source.clone(),
        }
    }

    fn incoming_transition(&self, ctx: &IncomingContext<'_>, incoming: String) -> String {
        incoming_image_variation(ctx.module(), ctx.config(), &incoming)
    }

    fn mutate(&self, ctx: &mut MutateContext<'_>, variation: &String) {
        trace!(module = ctx.module().name(), variation = %variation, "image variant");
        ctx.module_mut().base_mut().set_image_variation(variation.as_str());

        let config = ctx.config();
        if let Some((image, image_ctx)) = ctx.module_mut().image_parts_mut(config) {
            image.set_image_variation(&image_ctx, variation);
        }
    }

    fn transition_info_from_variation(&self, variation: &str) -> Result<String, TransitionError> {
        Ok(variation.to_string())
    }
}

