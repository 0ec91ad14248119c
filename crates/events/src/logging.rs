//! Structured logging for events
//!
//! Every emitted event is mirrored to the tracing ecosystem at the level
//! the event declares, with the metadata as structured fields.

use crate::{AppEvent, EventMessage, GeneralEvent, MutatorEvent};
use tracing::{debug, error, info, warn};

/// Log an event using the tracing infrastructure with structured fields
pub fn log_event_with_tracing(message: &EventMessage) {
    let meta = &message.meta;
    let source = meta.source.as_str();

    match &message.event {
        AppEvent::General(GeneralEvent::Warning { message, context }) => {
            warn!(source, context = ?context, "{message}");
        }
        AppEvent::General(GeneralEvent::DebugLog { message }) => {
            debug!(source, "{message}");
        }
        AppEvent::Mutator(event) => match event {
            MutatorEvent::PhaseStarted {
                mutator,
                kind,
                modules,
            } => {
                info!(source, mutator = %mutator, kind = ?kind, modules, "mutator phase started");
            }
            MutatorEvent::PhaseCompleted {
                mutator,
                kind,
                modules,
                duration_ms,
            } => {
                info!(
                    source,
                    mutator = %mutator,
                    kind = ?kind,
                    modules,
                    duration_ms,
                    "mutator phase completed"
                );
            }
            MutatorEvent::PhaseFailed {
                mutator,
                failure,
                diagnostics,
            } => {
                error!(
                    source,
                    mutator = %mutator,
                    code = ?failure.code,
                    hint = ?failure.hint,
                    diagnostics,
                    "mutator phase failed: {}",
                    failure.message
                );
            }
            MutatorEvent::VariantsCreated {
                mutator,
                module,
                variations,
            } => {
                debug!(source, mutator = %mutator, module = %module, variations = ?variations, "variants created");
            }
            MutatorEvent::OverrideApplied {
                module,
                overridden_by,
                replaced_by_prebuilt,
            } => {
                debug!(
                    source,
                    module = %module,
                    overridden_by = %overridden_by,
                    replaced_by_prebuilt,
                    "override applied"
                );
            }
            MutatorEvent::DependenciesRedirected {
                from,
                to,
                variant,
                edges,
            } => {
                debug!(source, from = %from, to = %to, variant = %variant, edges, "dependencies redirected");
            }
        },
    }
}
