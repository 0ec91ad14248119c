//! Running a transition mutator over the whole graph

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use tracing::debug;
use varia_errors::{Error, TransitionError};
use varia_events::{EventEmitter, MutatorEvent};
use varia_graph::{DepTag, Dependency, Diagnostics, Module, ModuleGraph, ModuleId};

use crate::context::{IncomingContext, MutateContext, OutgoingContext, SplitContext};
use crate::erased::{ErasedTransition, Variant};
use crate::parallel;
use crate::pipeline::PhaseEnv;

/// Edge of a variant: tag, target module in the old graph and the index
/// of the target variant
type ResolvedEdge = (DepTag, ModuleId, usize);

/// Split every module, bind every edge to a variant of its target, build
/// the new graph of clones and mutate each clone.
pub(crate) fn run(
    mutator: &dyn ErasedTransition,
    graph: ModuleGraph,
    env: &PhaseEnv<'_>,
) -> Result<ModuleGraph, Error> {
    let name = mutator.name();
    let ids: Vec<ModuleId> = graph.ids().collect();

    let splits = parallel::map(&ids, env.workers, |id| {
        mutator.split(&SplitContext::new(&graph, *id, env.config))
    })?;
    for (id, split) in ids.iter().zip(&splits) {
        check_split(name, graph.module(*id), split)?;
    }

    let mut variants = splits;
    let edges = resolve_edges(mutator, &graph, env, &mut variants)?;

    let mut graph = build_variants(name, graph, &variants, &edges, env);

    let results = parallel::map_mut(graph.modules_mut(), env.workers, |module| {
        let info = module
            .applied_transition(name)
            .map(|t| Arc::clone(&t.info))
            .ok_or_else(|| Error::internal(format!("{name}: variant without transition info")))?;
        let mut ctx = MutateContext::new(module, env.config, env.events);
        mutator.mutate(&mut ctx, &info)?;
        Ok::<_, Error>(ctx.into_diagnostics())
    })?;

    let mut diagnostics = Diagnostics::new();
    for result in results {
        diagnostics.extend(result?);
    }
    diagnostics.into_result()?;

    Ok(graph)
}

fn check_split(mutator: &str, module: &Module, split: &[Variant]) -> Result<(), Error> {
    if split.is_empty() {
        return Err(TransitionError::EmptySplit {
            mutator: mutator.to_string(),
            module: module.qualified_name(),
        }
        .into());
    }

    let mut seen = HashSet::new();
    for variant in split {
        if !seen.insert(variant.variation.as_str()) {
            return Err(TransitionError::DuplicateVariation {
                mutator: mutator.to_string(),
                module: module.qualified_name(),
                variation: variant.variation.clone(),
            }
            .into());
        }
    }
    Ok(())
}

/// Bind every edge of every variant. Variants created on demand are
/// appended to their module's list and have their own edges resolved in
/// turn, until no new variant appears.
fn resolve_edges(
    mutator: &dyn ErasedTransition,
    graph: &ModuleGraph,
    env: &PhaseEnv<'_>,
    variants: &mut [Vec<Variant>],
) -> Result<Vec<Vec<Vec<ResolvedEdge>>>, Error> {
    let mut edges: Vec<Vec<Vec<ResolvedEdge>>> = variants
        .iter()
        .map(|v| vec![Vec::new(); v.len()])
        .collect();
    let mut queue: VecDeque<(ModuleId, usize)> = graph
        .ids()
        .flat_map(|id| (0..variants[id.index()].len()).map(move |v| (id, v)))
        .collect();

    while let Some((id, v)) = queue.pop_front() {
        let module = graph.module(id);
        let source_info = Arc::clone(&variants[id.index()][v].info);
        let mut resolved = Vec::with_capacity(module.deps().len());

        for dep in module.deps() {
            let target = dep.target;
            let outgoing = mutator.outgoing(
                &OutgoingContext::new(graph, id, target, &dep.tag, env.config),
                &source_info,
            )?;
            let in_ctx = IncomingContext::new(graph, target, id, &dep.tag, env.config);
            let incoming = mutator.incoming(&in_ctx, &outgoing)?;

            let existing = variants[target.index()]
                .iter()
                .position(|t| t.variation == incoming.variation);
            let index = match existing {
                Some(index) => index,
                None if mutator.accepts_new_variant(&in_ctx, &incoming)? => {
                    let target_variants = &mut variants[target.index()];
                    debug!(
                        mutator = mutator.name(),
                        module = %graph.module(target).qualified_name(),
                        variation = %incoming.variation,
                        "creating variant on demand"
                    );
                    target_variants.push(incoming);
                    edges[target.index()].push(Vec::new());
                    let index = target_variants.len() - 1;
                    queue.push_back((target, index));
                    index
                }
                None => {
                    return Err(TransitionError::MissingVariant {
                        mutator: mutator.name().to_string(),
                        module: graph.module(target).qualified_name(),
                        variation: incoming.variation,
                        dependent: module.qualified_name(),
                    }
                    .into())
                }
            };
            resolved.push((dep.tag.clone(), target, index));
        }

        edges[id.index()][v] = resolved;
    }

    Ok(edges)
}

/// Replace every module by one clone per variant, in module then variant
/// order, and point each edge at the clone it was bound to
fn build_variants(
    mutator: &str,
    graph: ModuleGraph,
    variants: &[Vec<Variant>],
    edges: &[Vec<Vec<ResolvedEdge>>],
    env: &PhaseEnv<'_>,
) -> ModuleGraph {
    let mut offsets = Vec::with_capacity(variants.len());
    let mut total = 0;
    for module_variants in variants {
        offsets.push(total);
        total += module_variants.len();
    }

    let (old_modules, providers) = graph.into_parts();
    let mut modules = Vec::with_capacity(total);
    let mut origin = Vec::with_capacity(total);

    for (index, module) in old_modules.into_iter().enumerate() {
        let module_variants = &variants[index];
        if module_variants.len() > 1 {
            env.emit_mutator(MutatorEvent::VariantsCreated {
                mutator: mutator.to_string(),
                module: module.qualified_name(),
                variations: module_variants
                    .iter()
                    .map(|v| v.variation.clone())
                    .collect(),
            });
        }

        for (variant, module_edges) in module_variants.iter().zip(&edges[index]) {
            let mut clone = module.clone();
            clone.apply_transition(mutator, variant.variation.clone(), Arc::clone(&variant.info));
            *clone.deps_mut() = module_edges
                .iter()
                .map(|(tag, target, v)| {
                    Dependency::new(tag.clone(), ModuleId::new(offsets[target.index()] + v))
                })
                .collect();
            modules.push(clone);
            origin.push(ModuleId::new(index));
        }
    }

    debug!(mutator, variants = modules.len(), "variants built");
    ModuleGraph::from_parts(modules, providers.fork(&origin))
}
