//! Module arena and graph operations

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use varia_errors::{Error, GraphError};
use varia_types::VariantIdentity;

use crate::module::{DepTag, Dependency, Module, ModuleId};
use crate::provider::{Provider, ProviderTable};

/// Dependency graph of module variants
#[derive(Debug, Clone, Default)]
pub struct ModuleGraph {
    modules: Vec<Module>,
    /// Base name to every variant of that name, in arena order
    index: HashMap<String, Vec<ModuleId>>,
    providers: ProviderTable,
}

impl ModuleGraph {
    /// Create new empty graph
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a graph from an arena whose edges already point at valid ids
    #[must_use]
    pub fn from_parts(modules: Vec<Module>, providers: ProviderTable) -> Self {
        let mut index: HashMap<String, Vec<ModuleId>> = HashMap::new();
        for (i, module) in modules.iter().enumerate() {
            index
                .entry(module.name().to_string())
                .or_default()
                .push(ModuleId::new(i));
        }
        Self {
            modules,
            index,
            providers,
        }
    }

    #[must_use]
    pub fn into_parts(self) -> (Vec<Module>, ProviderTable) {
        (self.modules, self.providers)
    }

    /// Add a module to the graph
    ///
    /// # Errors
    ///
    /// Returns an error if a module of the same name exists or if its
    /// properties do not match its module type.
    pub fn add_module(&mut self, module: Module) -> Result<ModuleId, Error> {
        if self.index.contains_key(module.name()) {
            return Err(GraphError::DuplicateModule {
                name: module.name().to_string(),
            }
            .into());
        }
        module.descriptor().validate(module.properties())?;

        let id = ModuleId::new(self.modules.len());
        self.index.insert(module.name().to_string(), vec![id]);
        self.modules.push(module);
        Ok(id)
    }

    /// Add an edge to the only variant of `name`
    ///
    /// # Errors
    ///
    /// Returns an error if no module is called `name`, or if it already has
    /// more than one variant.
    pub fn add_dependency(
        &mut self,
        from: ModuleId,
        tag: DepTag,
        name: &str,
    ) -> Result<(), GraphError> {
        let target = match self.variants(name) {
            [] => {
                return Err(GraphError::UnknownModule {
                    name: name.to_string(),
                })
            }
            [only] => *only,
            candidates => {
                return Err(GraphError::AmbiguousDependency {
                    from: self.modules[from.index()].name().to_string(),
                    to: name.to_string(),
                    candidates: candidates.len(),
                })
            }
        };
        self.modules[from.index()]
            .deps_mut()
            .push(Dependency::new(tag, target));
        Ok(())
    }

    #[must_use]
    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id.index()]
    }

    pub fn module_mut(&mut self, id: ModuleId) -> &mut Module {
        &mut self.modules[id.index()]
    }

    #[must_use]
    pub fn get(&self, id: ModuleId) -> Option<&Module> {
        self.modules.get(id.index())
    }

    pub fn modules(&self) -> impl Iterator<Item = (ModuleId, &Module)> {
        self.modules
            .iter()
            .enumerate()
            .map(|(i, m)| (ModuleId::new(i), m))
    }

    pub fn modules_mut(&mut self) -> &mut [Module] {
        &mut self.modules
    }

    pub fn ids(&self) -> impl Iterator<Item = ModuleId> {
        (0..self.modules.len()).map(ModuleId::new)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Every variant of the module called `name`
    #[must_use]
    pub fn variants(&self, name: &str) -> &[ModuleId] {
        self.index.get(name).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Variant of `name` whose variant name (non-empty variations joined
    /// by `_`) equals `variant`
    #[must_use]
    pub fn find_variant(&self, name: &str, variant: &str) -> Option<ModuleId> {
        self.variants(name)
            .iter()
            .copied()
            .find(|id| self.module(*id).variant_name() == variant)
    }

    /// Variant of `name` with exactly this identity
    #[must_use]
    pub fn find(&self, name: &str, identity: &VariantIdentity) -> Option<ModuleId> {
        self.variants(name)
            .iter()
            .copied()
            .find(|id| self.module(*id).identity() == identity)
    }

    /// Modules with an edge to `id`, once per edge
    #[must_use]
    pub fn dependents(&self, id: ModuleId) -> Vec<ModuleId> {
        self.modules()
            .flat_map(|(from, m)| {
                m.deps()
                    .iter()
                    .filter(move |d| d.target == id)
                    .map(move |_| from)
            })
            .collect()
    }

    #[must_use]
    pub fn providers(&self) -> &ProviderTable {
        &self.providers
    }

    /// Publish a provider value for a module
    ///
    /// # Errors
    ///
    /// Returns `GraphError::ProviderAlreadySet` if the slot was written before.
    pub fn set_provider<T: Send + Sync + 'static>(
        &self,
        module: ModuleId,
        provider: &Provider<T>,
        value: T,
    ) -> Result<(), GraphError> {
        if self.providers.insert(module, provider, value) {
            Ok(())
        } else {
            Err(GraphError::ProviderAlreadySet {
                provider: provider.name().to_string(),
                module: self.module(module).qualified_name(),
            })
        }
    }

    #[must_use]
    pub fn provider<T: Send + Sync + 'static>(
        &self,
        module: ModuleId,
        provider: &Provider<T>,
    ) -> Option<Arc<T>> {
        self.providers.get(module, provider)
    }

    /// Order modules so that every module comes after its dependencies,
    /// using Kahn's algorithm. Ties are broken by arena order.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::DependencyCycle` naming a module on a cycle.
    pub fn topological_sort(&self) -> Result<Vec<ModuleId>, GraphError> {
        // Number of unvisited dependencies per module
        let mut pending: Vec<usize> = self.modules.iter().map(|m| m.deps().len()).collect();
        let mut dependents: Vec<Vec<ModuleId>> = vec![Vec::new(); self.modules.len()];
        for (id, module) in self.modules() {
            for dep in module.deps() {
                dependents[dep.target.index()].push(id);
            }
        }

        let mut queue: VecDeque<ModuleId> = self.ids().filter(|id| pending[id.index()] == 0).collect();
        let mut result = Vec::with_capacity(self.modules.len());

        while let Some(id) = queue.pop_front() {
            result.push(id);
            for dependent in &dependents[id.index()] {
                let count = &mut pending[dependent.index()];
                *count -= 1;
                if *count == 0 {
                    queue.push_back(*dependent);
                }
            }
        }

        if result.len() != self.modules.len() {
            let module = self
                .ids()
                .find(|id| pending[id.index()] > 0)
                .map(|id| self.module(id).qualified_name())
                .unwrap_or_default();
            return Err(GraphError::DependencyCycle { module });
        }

        Ok(result)
    }

    /// Check for dependency cycles
    #[must_use]
    pub fn has_cycles(&self) -> bool {
        self.topological_sort().is_err()
    }
}
