//! Typed side table of per-module values published by mutators
//!
//! Each slot is written once and read many times. Values published before
//! a transition mutator splits a module are visible on every variant.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use dashmap::DashMap;

use crate::ModuleId;

/// Key of a provider slot carrying values of type `T`
pub struct Provider<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Provider<T> {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for Provider<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Provider<T> {}

impl<T> fmt::Debug for Provider<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Provider").field(&self.name).finish()
    }
}

type Slot = Arc<dyn Any + Send + Sync>;

/// Provider values keyed by module and provider name
#[derive(Debug, Clone, Default)]
pub struct ProviderTable {
    slots: DashMap<(ModuleId, &'static str), Slot>,
}

impl ProviderTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a value. Returns false if the slot was already written, in
    /// which case the existing value is kept.
    pub fn insert<T: Send + Sync + 'static>(
        &self,
        module: ModuleId,
        provider: &Provider<T>,
        value: T,
    ) -> bool {
        match self.slots.entry((module, provider.name())) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(Arc::new(value));
                true
            }
        }
    }

    #[must_use]
    pub fn get<T: Send + Sync + 'static>(
        &self,
        module: ModuleId,
        provider: &Provider<T>,
    ) -> Option<Arc<T>> {
        let slot = self.slots.get(&(module, provider.name()))?;
        Arc::clone(slot.value()).downcast::<T>().ok()
    }

    #[must_use]
    pub fn contains<T>(&self, module: ModuleId, provider: &Provider<T>) -> bool {
        self.slots.contains_key(&(module, provider.name()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Table for a new arena where module `i` was cloned from `origin[i]`
    #[must_use]
    pub fn fork(&self, origin: &[ModuleId]) -> Self {
        let mut clones: HashMap<ModuleId, Vec<ModuleId>> = HashMap::new();
        for (index, old) in origin.iter().enumerate() {
            clones.entry(*old).or_default().push(ModuleId::new(index));
        }

        let forked = Self::new();
        for entry in &self.slots {
            let (old, name) = *entry.key();
            for new in clones.get(&old).into_iter().flatten() {
                forked.slots.insert((*new, name), Arc::clone(entry.value()));
            }
        }
        forked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: Provider<String> = Provider::new("name");
    const COUNT: Provider<u32> = Provider::new("count");

    #[test]
    fn test_set_once() {
        let table = ProviderTable::new();
        let id = ModuleId::new(0);

        assert!(table.insert(id, &NAME, "first".to_string()));
        assert!(!table.insert(id, &NAME, "second".to_string()));
        assert_eq!(table.get(id, &NAME).as_deref().map(String::as_str), Some("first"));
        assert!(table.get(id, &COUNT).is_none());
    }

    #[test]
    fn test_fork_copies_to_every_clone() {
        let table = ProviderTable::new();
        table.insert(ModuleId::new(0), &COUNT, 7);
        table.insert(ModuleId::new(1), &COUNT, 9);

        // Module 0 was split in two, module 1 kept a single variant
        let forked = table.fork(&[ModuleId::new(0), ModuleId::new(0), ModuleId::new(1)]);
        assert_eq!(forked.len(), 3);
        assert_eq!(forked.get(ModuleId::new(1), &COUNT).as_deref(), Some(&7));
        assert_eq!(forked.get(ModuleId::new(2), &COUNT).as_deref(), Some(&9));
    }
}
