//! In-memory resource store, one instance per resource kind.
//!
//! The map has no inherent order; [`ResourceStore::sorted_snapshot`] sorts
//! by name so that listings and page boundaries are repeatable.
//!
//! The store itself is not synchronized. The server wraps each store in its
//! own async mutex and holds it across the whole validate-backend-commit
//! sequence of a mutating request.

use std::collections::HashMap;

use crate::types::Resource;

/// Mapping from full resource name to resource object.
#[derive(Debug, Clone)]
pub struct ResourceStore<T> {
    inner: HashMap<String, T>,
}

impl<T: Resource> ResourceStore<T> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }

    /// Looks up a resource by full name.
    pub fn get(&self, name: &str) -> Option<&T> {
        self.inner.get(name)
    }

    /// Stores a resource under its own name, replacing any prior entry.
    pub fn insert(&mut self, resource: T) -> Option<T> {
        self.inner.insert(resource.name().to_string(), resource)
    }

    /// Removes and returns the resource stored under `name`.
    pub fn remove(&mut self, name: &str) -> Option<T> {
        self.inner.remove(name)
    }

    /// Returns some resource matching `predicate`, in no particular order.
    pub fn find(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<&T> {
        self.inner.values().find(|&r| predicate(r))
    }

    /// Clones every stored resource, sorted lexicographically by name.
    pub fn sorted_snapshot(&self) -> Vec<T> {
        let mut items: Vec<T> = self.inner.values().cloned().collect();
        items.sort_by(|a, b| a.name().cmp(b.name()));
        items
    }
}

impl<T: Resource> Default for ResourceStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
