//! Resolving dependencies added after transitions have run

use varia_errors::{Error, GraphError, TransitionError};
use varia_graph::{DepTag, ModuleGraph, ModuleId};
use varia_types::Variation;

use crate::context::{IncomingContext, OutgoingContext};
use crate::pipeline::PhaseEnv;

/// Pick the variant of `name` a new edge from `from` binds to.
///
/// Every completed transition is replayed in order: the source variant's
/// info goes through the outgoing transition (or the explicitly requested
/// variation is converted to info), then through the incoming transition
/// of each remaining candidate. Candidates whose variation differs are
/// dropped; if none is left, the error names every variation the
/// candidates were asked for.
pub(crate) fn resolve_dependency(
    graph: &ModuleGraph,
    env: &PhaseEnv<'_>,
    from: ModuleId,
    tag: &DepTag,
    name: &str,
    requested: &[Variation],
) -> Result<ModuleId, Error> {
    let source = graph.module(from);
    let mut candidates = graph.variants(name).to_vec();
    if candidates.is_empty() {
        return Err(GraphError::UnknownModule {
            name: name.to_string(),
        }
        .into());
    }

    for mutator in env.completed {
        let mutator_name = mutator.name();
        let explicit = requested.iter().find(|v| v.mutator == mutator_name);
        let mut wanted: Vec<String> = Vec::new();
        let mut kept = Vec::with_capacity(candidates.len());

        for candidate in &candidates {
            let proposed = if let Some(variation) = explicit {
                mutator.from_variation(&variation.variation)?
            } else {
                let applied = source.applied_transition(mutator_name).ok_or_else(|| {
                    Error::internal(format!(
                        "{mutator_name}: module {} has no transition info",
                        source.qualified_name()
                    ))
                })?;
                mutator.outgoing(
                    &OutgoingContext::new(graph, from, *candidate, tag, env.config),
                    &applied.info,
                )?
            };
            let incoming = mutator.incoming(
                &IncomingContext::new(graph, *candidate, from, tag, env.config),
                &proposed,
            )?;

            let variation = graph.module(*candidate).identity().get(mutator_name);
            if variation == Some(incoming.variation.as_str()) {
                kept.push(*candidate);
            } else if !wanted.contains(&incoming.variation) {
                wanted.push(incoming.variation);
            }
        }

        if kept.is_empty() {
            return Err(TransitionError::MissingVariant {
                mutator: mutator_name.to_string(),
                module: name.to_string(),
                variation: wanted.join(", "),
                dependent: source.qualified_name(),
            }
            .into());
        }
        candidates = kept;
    }

    match candidates.as_slice() {
        [only] => Ok(*only),
        _ => Err(GraphError::AmbiguousDependency {
            from: source.qualified_name(),
            to: name.to_string(),
            candidates: candidates.len(),
        }
        .into()),
    }
}
