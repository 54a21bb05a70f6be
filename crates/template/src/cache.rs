use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    num::NonZeroUsize,
    sync::Arc,
};

use lru::LruCache;
use parking_lot::Mutex;
use rhai::AST;

/// Retention policy for compiled templates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CachePolicy {
    /// Keep every compiled template for the life of the engine.
    #[default]
    Unbounded,
    /// Keep at most this many compiled templates, evicting the least recently used.
    Lru(usize),
}

/// Content hash of a cleaned template body.
pub(crate) fn body_key(body: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    hasher.finish()
}

/// Compiled templates keyed by the hash of their cleaned body.
pub(crate) struct TemplateCache {
    policy: CachePolicy,
    map: Mutex<LruCache<u64, Arc<AST>>>,
}

impl TemplateCache {
    pub(crate) fn new(policy: CachePolicy) -> Self {
        let map = match policy {
            CachePolicy::Unbounded => LruCache::unbounded(),
            CachePolicy::Lru(cap) => LruCache::new(NonZeroUsize::new(cap).unwrap_or(NonZeroUsize::MIN)),
        };
        Self {
            policy,
            map: Mutex::new(map),
        }
    }

    pub(crate) fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Fetch the entry for `key`, compiling with `compile` on a miss.
    pub(crate) fn get_or_compile<E>(
        &self,
        key: u64,
        compile: impl FnOnce() -> Result<AST, E>,
    ) -> Result<Arc<AST>, E> {
        if let Some(found) = self.map.lock().get(&key).cloned() {
            return Ok(found);
        }

        // Compile outside the lock so slow bodies do not stall other lookups.
        let compiled = Arc::new(compile()?);

        let mut guard = self.map.lock();
        if let Some(found) = guard.get(&key).cloned() {
            return Ok(found);
        }
        guard.put(key, compiled.clone());
        Ok(compiled)
    }

    pub(crate) fn len(&self) -> usize {
        self.map.lock().len()
    }

    pub(crate) fn clear(&self) {
        self.map.lock().clear();
    }
}
