//! In-run shared cache for inter-plugin data passing.
//!
//! Early plugins park derived artifacts here (a compiled template engine,
//! aggregated statistics, feed definitions) for later plugins to pick up
//! without coupling to each other directly. Entries live for exactly one
//! build; there is no eviction and no TTL.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// A build-scoped key/value store with last-writer-wins semantics.
///
/// Values are untyped at the cache boundary; callers agree on the concrete
/// type by key-name convention and type-check on [`get`](SharedCache::get).
/// A wrong-type lookup behaves exactly like an absent key.
///
/// Cloning is cheap and every clone sees the same entries, so hooks can hand
/// a clone to worker closures. Writers are expected to call `set` from the
/// sequential part of a hook, not from inside a concurrent pass.
#[derive(Clone, Default)]
pub struct SharedCache {
    entries: Arc<RwLock<HashMap<String, Arc<dyn Any + Send + Sync>>>>,
}

impl SharedCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value under a key, replacing any previous value.
    pub fn set<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T) {
        let mut entries = self.entries.write().expect("shared cache lock poisoned");
        entries.insert(key.into(), Arc::new(value));
    }

    /// Fetch a value by key, downcast to the expected type.
    ///
    /// Returns `None` when the key is absent or holds a different type.
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        let entries = self.entries.read().expect("shared cache lock poisoned");
        entries.get(key).cloned()?.downcast::<T>().ok()
    }

    /// Fetch a value without a type expectation.
    pub fn get_raw(&self, key: &str) -> Option<Arc<dyn Any + Send + Sync>> {
        let entries = self.entries.read().expect("shared cache lock poisoned");
        entries.get(key).cloned()
    }

    /// Whether a key is present (regardless of type).
    pub fn contains(&self, key: &str) -> bool {
        let entries = self.entries.read().expect("shared cache lock poisoned");
        entries.contains_key(key)
    }
}
