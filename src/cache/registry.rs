//! Cache registry - Central management for all caches.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::{CacheConfig, TypedCache};

/// Registry key: a name is scoped by the cache's key/value types, so two
/// callers asking for the same name with different types get separate caches.
type EntryKey = (String, TypeId);

struct Entry {
    cache: Box<dyn Any + Send + Sync>,
    invalidate: Box<dyn Fn() + Send + Sync>,
}

/// Central registry for named typed caches.
///
/// Repositories ask the registry for their cache by name; the first caller
/// creates it, later callers share it.
#[derive(Clone, Default)]
pub struct CacheRegistry {
    caches: Arc<RwLock<HashMap<EntryKey, Entry>>>,
}

impl CacheRegistry {
    /// Create a new empty cache registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an existing cache by name.
    pub fn get<K, V>(&self, name: &str) -> Option<TypedCache<K, V>>
    where
        K: Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let key = (name.to_string(), TypeId::of::<TypedCache<K, V>>());
        self.caches
            .read()
            .get(&key)
            .and_then(|entry| entry.cache.downcast_ref::<TypedCache<K, V>>())
            .cloned()
    }

    /// Get an existing cache or create a new one if it doesn't exist.
    pub fn get_or_create<K, V>(&self, name: &str, config: CacheConfig) -> TypedCache<K, V>
    where
        K: Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        if let Some(cache) = self.get(name) {
            return cache;
        }

        let key = (name.to_string(), TypeId::of::<TypedCache<K, V>>());
        let mut caches = self.caches.write();

        // Another thread may have won the race between the read and write lock.
        if let Some(existing) = caches
            .get(&key)
            .and_then(|entry| entry.cache.downcast_ref::<TypedCache<K, V>>())
        {
            return existing.clone();
        }

        debug!("Creating cache: {}", name);
        let cache = TypedCache::new(name, config);
        let handle = cache.clone();
        caches.insert(
            key,
            Entry {
                cache: Box::new(cache.clone()),
                invalidate: Box::new(move || handle.invalidate_all()),
            },
        );
        cache
    }

    /// Empty every registered cache.
    ///
    /// Registrations are kept, so handles taken before the call and caches
    /// requested afterwards still point at the same storage.
    pub fn clear(&self) {
        let caches = self.caches.read();
        for entry in caches.values() {
            (entry.invalidate)();
        }
        debug!("Cleared {} cache(s)", caches.len());
    }

    /// Get the number of registered caches.
    pub fn len(&self) -> usize {
        self.caches.read().len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.caches.read().is_empty()
    }
}

impl std::fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self
            .caches
            .read()
            .keys()
            .map(|(name, _)| name.clone())
            .collect();
        f.debug_struct("CacheRegistry")
            .field("cache_names", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_create_shares_cache() {
        let registry = CacheRegistry::new();
        let a: TypedCache<String, u32> = registry.get_or_create("counts", CacheConfig::default());
        let b: TypedCache<String, u32> = registry.get_or_create("counts", CacheConfig::default());

        a.insert("x".to_string(), 1);
        assert_eq!(b.get(&"x".to_string()), Some(1));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_same_name_different_types() {
        let registry = CacheRegistry::new();
        let _: TypedCache<String, u32> = registry.get_or_create("shared", CacheConfig::default());
        let _: TypedCache<u64, String> = registry.get_or_create("shared", CacheConfig::default());

        assert_eq!(registry.len(), 2);
        assert!(registry.get::<String, u32>("shared").is_some());
        assert!(registry.get::<String, String>("shared").is_none());
    }

    #[test]
    fn test_clear_empties_held_caches() {
        let registry = CacheRegistry::new();
        let held: TypedCache<u8, u8> = registry.get_or_create("tiny", CacheConfig::with_capacity(4));
        held.insert(1, 1);

        registry.clear();
        assert_eq!(held.get(&1), None);
        assert!(!registry.is_empty());

        // Caches requested after clearing still share storage with old handles.
        let later: TypedCache<u8, u8> = registry.get_or_create("tiny", CacheConfig::with_capacity(4));
        later.insert(2, 2);
        assert_eq!(held.get(&2), Some(2));
    }
}
