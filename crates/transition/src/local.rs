//! Local mutator phases

use varia_errors::Error;
use varia_graph::{Diagnostics, ModuleGraph};

use crate::context::MutateContext;
use crate::mutator::LocalMutator;
use crate::parallel;
use crate::pipeline::PhaseEnv;

pub(crate) fn run(
    mutator: &dyn LocalMutator,
    mut graph: ModuleGraph,
    env: &PhaseEnv<'_>,
) -> Result<ModuleGraph, Error> {
    let results = parallel::map_mut(graph.modules_mut(), env.workers, |module| {
        let mut ctx = MutateContext::new(module, env.config, env.events);
        mutator.mutate(&mut ctx);
        ctx.into_diagnostics()
    })?;

    let mut diagnostics = Diagnostics::new();
    for result in results {
        diagnostics.extend(result);
    }
    diagnostics.into_result()?;
    Ok(graph)
}
