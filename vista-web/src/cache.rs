//! Upstream response cache.
//!
//! Provider free tiers are heavily rate limited, so successful responses are
//! kept for a short TTL. Keys are built from credential-free upstream
//! requests; a key never contains an API key.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use vista_core::config::CacheConfig;

/// Cached provider body with its insertion time.
#[derive(Debug, Clone)]
struct CacheEntry {
    body: Value,
    created_at: Instant,
}

impl CacheEntry {
    fn new(body: Value) -> Self {
        Self {
            body,
            created_at: Instant::now(),
        }
    }

    fn is_fresh(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() < ttl
    }
}

/// Cache statistics reported by the health route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStatistics {
    /// Live entries, including ones that have expired but not been evicted yet
    pub entries: usize,
    /// Maximum entries
    pub capacity: usize,
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that went upstream
    pub misses: u64,
}

/// LRU cache of provider responses with a fixed time to live.
///
/// A capacity of zero disables caching.
#[derive(Debug)]
pub struct ResponseCache {
    entries: Option<Mutex<LruCache<String, CacheEntry>>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResponseCache {
    /// Create a cache holding up to `max_entries` responses for `ttl`.
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            entries: NonZeroUsize::new(max_entries).map(|cap| Mutex::new(LruCache::new(cap))),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Create a cache sized from configuration.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_entries, config.ttl)
    }

    /// Fresh body for `key`, evicting it if it has expired.
    pub fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.as_ref()?;
        let mut entries = entries.lock();

        let fresh = match entries.get(key) {
            Some(entry) if entry.is_fresh(self.ttl) => Some(entry.body.clone()),
            Some(_) => {
                entries.pop(key);
                None
            }
            None => None,
        };

        match fresh {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        fresh
    }

    /// Store a body, evicting the least recently used entry when full.
    pub fn insert(&self, key: String, body: Value) {
        if let Some(entries) = &self.entries {
            entries.lock().put(key, CacheEntry::new(body));
        }
    }

    /// Current statistics.
    pub fn statistics(&self) -> CacheStatistics {
        let (entries, capacity) = match &self.entries {
            Some(entries) => {
                let entries = entries.lock();
                (entries.len(), entries.cap().get())
            }
            None => (0, 0),
        };
        CacheStatistics {
            entries,
            capacity,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
