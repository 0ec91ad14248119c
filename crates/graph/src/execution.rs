//! Execution plan for bottom-up mutator phases

use std::sync::atomic::{AtomicUsize, Ordering};

use varia_errors::GraphError;

use crate::{ModuleGraph, ModuleId};

/// Metadata for parallel execution
#[derive(Debug)]
pub struct NodeMeta {
    /// Number of dependencies not yet visited
    in_degree: AtomicUsize,
    /// Modules that depend on this one, once per edge
    parents: Vec<ModuleId>,
}

impl NodeMeta {
    /// Create new node metadata
    #[must_use]
    pub fn new(in_degree: usize) -> Self {
        Self {
            in_degree: AtomicUsize::new(in_degree),
            parents: Vec::new(),
        }
    }

    /// Decrement in-degree and return new value
    pub fn decrement_in_degree(&self) -> usize {
        self.in_degree
            .fetch_sub(1, Ordering::SeqCst)
            .saturating_sub(1)
    }

    /// Get current in-degree
    pub fn in_degree(&self) -> usize {
        self.in_degree.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn parents(&self) -> &[ModuleId] {
        &self.parents
    }
}

/// Modules grouped into batches; every module's dependencies are in
/// earlier batches
#[derive(Debug)]
pub struct ExecutionPlan {
    batches: Vec<Vec<ModuleId>>,
    /// Indexed by module id
    metadata: Vec<NodeMeta>,
}

impl ExecutionPlan {
    /// Create an execution plan for the current graph
    ///
    /// # Errors
    ///
    /// Returns `GraphError::DependencyCycle` if the graph has a cycle.
    pub fn from_graph(graph: &ModuleGraph) -> Result<Self, GraphError> {
        let sorted = graph.topological_sort()?;

        let mut metadata: Vec<NodeMeta> = graph
            .modules()
            .map(|(_, module)| NodeMeta::new(module.deps().len()))
            .collect();
        for (id, module) in graph.modules() {
            for dep in module.deps() {
                metadata[dep.target.index()].parents.push(id);
            }
        }

        // Depth of each module: one more than its deepest dependency
        let mut depth = vec![0usize; graph.len()];
        for id in &sorted {
            depth[id.index()] = graph
                .module(*id)
                .deps()
                .iter()
                .map(|dep| depth[dep.target.index()] + 1)
                .max()
                .unwrap_or(0);
        }

        let mut batches: Vec<Vec<ModuleId>> = Vec::new();
        for id in graph.ids() {
            let level = depth[id.index()];
            if batches.len() <= level {
                batches.resize_with(level + 1, Vec::new);
            }
            batches[level].push(id);
        }

        Ok(Self { batches, metadata })
    }

    /// Get execution batches
    #[must_use]
    pub fn batches(&self) -> &[Vec<ModuleId>] {
        &self.batches
    }

    /// Get metadata for a module
    #[must_use]
    pub fn metadata(&self, id: ModuleId) -> Option<&NodeMeta> {
        self.metadata.get(id.index())
    }

    /// Modules whose dependencies have all been visited, in arena order
    #[must_use]
    pub fn ready_modules(&self) -> Vec<ModuleId> {
        self.metadata
            .iter()
            .enumerate()
            .filter(|(_, meta)| meta.in_degree() == 0)
            .map(|(i, _)| ModuleId::new(i))
            .collect()
    }

    /// Mark module as completed and get newly ready modules
    pub fn complete_module(&self, id: ModuleId) -> Vec<ModuleId> {
        let Some(meta) = self.metadata.get(id.index()) else {
            return Vec::new();
        };

        let mut newly_ready = Vec::new();
        for parent in &meta.parents {
            if let Some(parent_meta) = self.metadata.get(parent.index()) {
                if parent_meta.decrement_in_degree() == 0 {
                    newly_ready.push(*parent);
                }
            }
        }
        newly_ready
    }

    #[must_use]
    pub fn module_count(&self) -> usize {
        self.metadata.len()
    }

    /// Check if all modules are completed
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.metadata.iter().all(|meta| meta.in_degree() == 0)
    }
}

/// Execution statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExecutionStats {
    pub total_modules: usize,
    pub batch_count: usize,
    pub max_batch_size: usize,
}

impl ExecutionStats {
    /// Calculate stats from execution plan
    #[must_use]
    pub fn from_plan(plan: &ExecutionPlan) -> Self {
        Self {
            total_modules: plan.module_count(),
            batch_count: plan.batches().len(),
            max_batch_size: plan.batches().iter().map(Vec::len).max().unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DepTag, Module, ModuleTypeDescriptor};
    use std::sync::Arc;

    #[test]
    fn test_node_meta() {
        let meta = NodeMeta::new(2);
        assert_eq!(meta.in_degree(), 2);

        assert_eq!(meta.decrement_in_degree(), 1);
        assert_eq!(meta.in_degree(), 1);

        assert_eq!(meta.decrement_in_degree(), 0);
        assert_eq!(meta.in_degree(), 0);
    }

    #[test]
    fn test_execution_plan() {
        let descriptor = Arc::new(ModuleTypeDescriptor::new("phony"));
        let mut graph = ModuleGraph::new();
        let a = graph.add_module(Module::new(&descriptor, "a")).unwrap();
        let b = graph.add_module(Module::new(&descriptor, "b")).unwrap();
        let c = graph.add_module(Module::new(&descriptor, "c")).unwrap();
        let d = graph.add_module(Module::new(&descriptor, "d")).unwrap();

        // a depends on b and d, b depends on c
        let tag = DepTag::Named("deps".into());
        graph.add_dependency(a, tag.clone(), "b").unwrap();
        graph.add_dependency(a, tag.clone(), "d").unwrap();
        graph.add_dependency(b, tag, "c").unwrap();

        let plan = ExecutionPlan::from_graph(&graph).unwrap();
        assert_eq!(plan.batches(), &[vec![c, d], vec![b], vec![a]]);
        assert_eq!(plan.ready_modules(), vec![c, d]);

        assert_eq!(plan.complete_module(c), vec![b]);
        assert!(plan.complete_module(d).is_empty());
        assert_eq!(plan.complete_module(b), vec![a]);
        assert!(plan.is_complete());

        let stats = ExecutionStats::from_plan(&plan);
        assert_eq!(stats.total_modules, 4);
        assert_eq!(stats.batch_count, 3);
        assert_eq!(stats.max_batch_size, 2);
    }
}
