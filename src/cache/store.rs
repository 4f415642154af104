//! Local Store Module
//!
//! Synchronized wrapper around the LRU cache, owned by a single group.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::cache::{ByteView, CacheStats, EvictionHook, LruCache};

#[derive(Debug)]
struct Inner {
    lru: LruCache<ByteView>,
    stats: CacheStats,
}

// == Local Store ==
/// Byte-bounded LRU store shared by all tasks calling into one group.
///
/// The lock is held only for the duration of a single `get` or `add`,
/// including any evictions and eviction hooks that `add` triggers.
#[derive(Debug)]
pub struct LocalStore {
    inner: Mutex<Inner>,
    evictions: Arc<AtomicU64>,
}

impl LocalStore {
    // == Constructor ==
    /// Creates a store holding at most `max_bytes` (0 = unlimited).
    pub fn new(max_bytes: usize) -> Self {
        Self::build(max_bytes, None)
    }

    /// Creates a store that additionally forwards each eviction to `hook`.
    pub fn with_eviction_hook(max_bytes: usize, hook: EvictionHook<ByteView>) -> Self {
        Self::build(max_bytes, Some(hook))
    }

    fn build(max_bytes: usize, mut user_hook: Option<EvictionHook<ByteView>>) -> Self {
        let evictions = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&evictions);
        let hook: EvictionHook<ByteView> = Box::new(move |key: &str, value: &ByteView| {
            counter.fetch_add(1, Ordering::Relaxed);
            if let Some(hook) = user_hook.as_mut() {
                hook(key, value);
            }
        });

        Self {
            inner: Mutex::new(Inner {
                lru: LruCache::with_eviction_hook(max_bytes, hook),
                stats: CacheStats::new(),
            }),
            evictions,
        }
    }

    // == Get ==
    /// Returns a cheap clone of the cached value and marks it most recently used.
    pub fn get(&self, key: &str) -> Option<ByteView> {
        let mut inner = self.inner.lock();
        let value = inner.lru.get(key).cloned();
        match value {
            Some(_) => inner.stats.record_hit(),
            None => inner.stats.record_miss(),
        }
        value
    }

    // == Add ==
    /// Inserts or replaces `key`, evicting older entries past capacity.
    pub fn add(&self, key: &str, value: ByteView) {
        self.inner.lock().lru.add(key, value);
    }

    /// Checks for `key` without affecting recency or statistics.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().lru.contains(key)
    }

    // == Length ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.inner.lock().lru.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Stats ==
    /// Returns current store statistics.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let mut stats = inner.stats.clone();
        stats.evictions = self.evictions.load(Ordering::Relaxed);
        stats.total_entries = inner.lru.len();
        stats.total_bytes = inner.lru.used_bytes();
        stats
    }
}
