//! Bounded in-memory cache of decoded resources.
//!
//! Entries can disappear at any time through eviction, so every lookup must treat a missing entry
//! as a plain miss. Eviction is least-recently-used and bounded by both an entry count and the
//! total number of decoded bytes.
//!
//! The cache has no locking of its own; the fetch coordinator guards it.

use std::sync::Arc;

use hashlink::LruCache;

use crate::resource::DecodedResource;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// An LRU map from resource identifier to decoded resource.
#[derive(Debug)]
pub struct ResourceCache {
    entries: LruCache<String, Arc<DecodedResource>>,
    max_entries: usize,
    max_bytes: usize,
    bytes_used: usize,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ResourceCache {
    /// Creates a cache holding at most `max_entries` resources and `max_bytes` decoded bytes.
    pub fn new(max_entries: usize, max_bytes: usize) -> Self {
        Self {
            entries: LruCache::new_unbounded(),
            max_entries,
            max_bytes,
            bytes_used: 0,
        }
    }

    /// Looks up `key`, refreshing its recency if present.
    pub fn get(&mut self, key: &str) -> Option<Arc<DecodedResource>> {
        let resource = self.entries.get(key).cloned();
        if resource.is_some() {
            tracing::trace!("cache hit: {key}");
        }
        resource
    }

    /// Looks up `key` without touching its recency.
    pub fn peek(&self, key: &str) -> Option<Arc<DecodedResource>> {
        self.entries.peek(key).cloned()
    }

    /// Whether `key` is currently cached.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts or replaces the resource for `key`, evicting older entries as needed.
    ///
    /// A resource larger than the whole byte budget is not stored.
    pub fn put(&mut self, key: impl Into<String>, resource: Arc<DecodedResource>) {
        let key = key.into();
        let cost = resource.byte_len();

        // Replacing drops the previous value even when the new one is not stored.
        self.remove(&key);
        if cost > self.max_bytes {
            tracing::debug!(
                "resource {key} ({cost} bytes) exceeds cache budget of {} bytes, not caching",
                self.max_bytes
            );
            return;
        }

        self.bytes_used += cost;
        self.entries.insert(key, resource);
        self.evict_if_needed();
    }

    /// Removes the entry for `key`.
    pub fn remove(&mut self, key: &str) -> Option<Arc<DecodedResource>> {
        let removed = self.entries.remove(key);
        if let Some(ref resource) = removed {
            self.bytes_used = self.bytes_used.saturating_sub(resource.byte_len());
        }
        removed
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.bytes_used = 0;
    }

    /// Number of cached resources.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total decoded bytes held by the cache.
    pub fn bytes_used(&self) -> usize {
        self.bytes_used
    }

    fn evict_if_needed(&mut self) {
        while self.entries.len() > self.max_entries || self.bytes_used > self.max_bytes {
            match self.entries.remove_lru() {
                Some((key, oldest)) => {
                    tracing::trace!("evicting {key} from cache");
                    self.bytes_used = self.bytes_used.saturating_sub(oldest.byte_len());
                }
                None => break,
            }
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
