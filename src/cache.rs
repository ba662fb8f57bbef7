//! Size-tracked asset cache with insertion-order eviction
//!
//! Entries are evicted oldest-inserted-first once the byte budget is exceeded,
//! down to a low-water mark of 80% of the budget. `get` deliberately does not
//! touch recency, so this is "approximate LRU" rather than access-order LRU.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::asset::Payload;

/// Default cache budget: 50 MB.
pub const DEFAULT_MAX_CACHE_SIZE: usize = 50 * 1024 * 1024;

/// Eviction stops once usage drops to this fraction of the budget.
const EVICTION_LOW_WATER: f64 = 0.8;

struct CacheEntry {
    payload: Arc<Payload>,
    size: usize,
}

struct CacheState {
    entries: HashMap<String, CacheEntry>,
    /// Keys in insertion order; front = oldest = first evicted.
    insertion_order: VecDeque<String>,
}

/// Byte-budgeted cache shared by the loaders and the thumbnail pool.
pub struct AssetCache {
    state: Mutex<CacheState>,
    max_size: usize,
    current_size: AtomicUsize,
}

impl AssetCache {
    pub fn new(max_size: usize) -> Self {
        Self {
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                insertion_order: VecDeque::new(),
            }),
            max_size,
            current_size: AtomicUsize::new(0),
        }
    }

    /// Insert a payload under `key`, charging its estimated size against the
    /// budget and evicting oldest entries if the budget is exceeded. The entry
    /// being written is never evicted by its own insertion. Returns the
    /// stored payload handle.
    pub fn set(&self, key: impl Into<String>, payload: Payload) -> Arc<Payload> {
        let key = key.into();
        let size = payload.estimated_size();
        let mut state = self.state.lock();

        // Replacing an entry releases the old payload first.
        if let Some(old) = state.entries.remove(&key) {
            self.current_size.fetch_sub(old.size, Ordering::SeqCst);
            self.release_entry(&key, old);
            state.insertion_order.retain(|k| k != &key);
        }

        let stored = Arc::new(payload);
        state.entries.insert(
            key.clone(),
            CacheEntry {
                payload: Arc::clone(&stored),
                size,
            },
        );
        state.insertion_order.push_back(key.clone());
        let total = self.current_size.fetch_add(size, Ordering::SeqCst) + size;

        if total > self.max_size {
            self.evict_locked(&mut state, &key);
        }
        stored
    }

    pub fn get(&self, key: &str) -> Option<Arc<Payload>> {
        self.state
            .lock()
            .entries
            .get(key)
            .map(|e| Arc::clone(&e.payload))
    }

    pub fn has(&self, key: &str) -> bool {
        self.state.lock().entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current sum of estimated entry sizes.
    pub fn current_size(&self) -> usize {
        self.current_size.load(Ordering::Relaxed)
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Drop every entry, releasing payloads, and reset the size to zero.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        let keys: Vec<String> = state.insertion_order.drain(..).collect();
        for key in keys {
            if let Some(entry) = state.entries.remove(&key) {
                self.release_entry(&key, entry);
            }
        }
        state.entries.clear();
        self.current_size.store(0, Ordering::SeqCst);
    }

    fn evict_locked(&self, state: &mut CacheState, protected_key: &str) {
        let low_water = (self.max_size as f64 * EVICTION_LOW_WATER) as usize;

        while self.current_size.load(Ordering::SeqCst) > low_water {
            // Skip the entry currently being written.
            let oldest = state
                .insertion_order
                .iter()
                .position(|k| k != protected_key);
            let Some(pos) = oldest else { break };
            let key = state.insertion_order.remove(pos).unwrap_or_default();
            if let Some(entry) = state.entries.remove(&key) {
                self.current_size.fetch_sub(entry.size, Ordering::SeqCst);
                log::debug!("evicting cache entry {key} ({} bytes)", entry.size);
                self.release_entry(&key, entry);
            }
        }
    }

    fn release_entry(&self, key: &str, entry: CacheEntry) {
        let mut payload = entry.payload;
        match Arc::get_mut(&mut payload) {
            Some(p) => p.release(),
            // A caller still holds the payload; drop releases it when the
            // last reference goes away.
            None => log::trace!("cache entry {key} still referenced at eviction"),
        }
    }
}

impl Default for AssetCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CACHE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_has() {
        let cache = AssetCache::new(1024);
        cache.set("a", Payload::Bytes(vec![1, 2, 3]));

        assert!(cache.has("a"));
        assert!(!cache.has("b"));
        assert_eq!(cache.current_size(), 3);
        match cache.get("a").as_deref() {
            Some(Payload::Bytes(b)) => assert_eq!(b, &[1, 2, 3]),
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn test_replace_does_not_double_count() {
        let cache = AssetCache::new(1024);
        cache.set("a", Payload::Bytes(vec![0; 100]));
        cache.set("a", Payload::Bytes(vec![0; 40]));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.current_size(), 40);
    }

    #[test]
    fn test_eviction_removes_oldest_first() {
        // Scenario: budget 10, entries sized [4, 4, 4]
        let cache = AssetCache::new(10);
        cache.set("first", Payload::Bytes(vec![0; 4]));
        cache.set("second", Payload::Bytes(vec![0; 4]));
        cache.set("third", Payload::Bytes(vec![0; 4]));

        assert!(!cache.has("first"));
        assert!(cache.has("second"));
        assert!(cache.has("third"));
        assert!(cache.current_size() <= 8);
    }

    #[test]
    fn test_eviction_never_removes_entry_being_written() {
        let cache = AssetCache::new(10);
        cache.set("big", Payload::Bytes(vec![0; 100]));

        // A single oversized entry survives its own insertion.
        assert!(cache.has("big"));
        assert_eq!(cache.current_size(), 100);

        // The next insert evicts it.
        cache.set("next", Payload::Bytes(vec![0; 4]));
        assert!(!cache.has("big"));
        assert!(cache.has("next"));
        assert_eq!(cache.current_size(), 4);
    }

    #[test]
    fn test_eviction_reaches_low_water() {
        let cache = AssetCache::new(100);
        for i in 0..11 {
            cache.set(format!("k{i}"), Payload::Bytes(vec![0; 10]));
        }
        // The 11th insert pushes usage to 110 and eviction runs to the
        // 80-byte low-water mark.
        assert_eq!(cache.current_size(), 80);
        assert!(!cache.has("k0"));
        assert!(cache.has("k10"));
    }

    #[test]
    fn test_clear_resets_size() {
        let cache = AssetCache::new(1024);
        cache.set("a", Payload::Text("hello".into()));
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.current_size(), 0);
    }
}
