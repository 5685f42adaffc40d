//! Page artifact cache with LRU eviction
//!
//! Bounded by entry count only. Eviction happens synchronously inside
//! [`PageCache::put`]; there is no TTL and no background sweeping.

use std::num::NonZeroUsize;

use bytes::Bytes;
use lru::LruCache;
use parking_lot::Mutex;

use super::types::PageKey;

/// Default number of cached page artifacts
pub const DEFAULT_PAGE_CACHE_CAPACITY: usize = 64;

/// Thread-safe LRU cache of derived page artifacts
pub struct PageCache {
    entries: Mutex<LruCache<PageKey, Bytes>>,
}

impl Default for PageCache {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_CACHE_CAPACITY)
    }
}

impl PageCache {
    /// Create a cache holding at most `capacity` artifacts (0 is treated as 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Look up an artifact, marking it most recently used on a hit
    pub fn get(&self, key: &PageKey) -> Option<Bytes> {
        self.entries.lock().get(key).cloned()
    }

    /// Insert or overwrite an artifact, evicting the least recently used
    /// entry if the cache is full
    pub fn put(&self, key: PageKey, artifact: Bytes) {
        let evicted = self.entries.lock().push(key.clone(), artifact);

        if let Some((evicted_key, _)) = evicted {
            if evicted_key != key {
                tracing::trace!(page = evicted_key.page, "Evicted page artifact");
            }
        }
    }

    /// Check for a key without touching its recency
    pub fn contains(&self, key: &PageKey) -> bool {
        self.entries.lock().contains(key)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}
