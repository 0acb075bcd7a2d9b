//! Cache store abstraction and an in-memory LRU implementation

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};
use async_trait::async_trait;
use lru::LruCache;
use parking_lot::Mutex;
use serde_json::Value;
use crate::Result;

/// Key-value store holding raw vendor responses
///
/// The store owns its own concurrency discipline. Writes of the same key are
/// idempotent from the caller's point of view.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a value, `None` on miss or expiry
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Store a value; `None` TTL means never expire
    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<()>;
}

struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Bounded in-memory store with per-entry expiry
pub struct MemoryCacheStore {
    entries: Mutex<LruCache<String, Entry>>,
}

impl MemoryCacheStore {
    /// Default number of entries kept before LRU eviction
    pub const DEFAULT_CAPACITY: usize = 10_000;

    /// Create a store holding at most `capacity` entries (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Number of entries, including ones that expired but were not touched yet
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut entries = self.entries.lock();
        let now = Instant::now();

        match entries.get(key) {
            Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
            Some(_) => {}
            None => return Ok(None),
        }

        entries.pop(key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<()> {
        // A TTL past the end of the clock never expires
        let entry = Entry {
            value,
            expires_at: ttl.and_then(|ttl| Instant::now().checked_add(ttl)),
        };
        self.entries.lock().put(key.to_string(), entry);
        Ok(())
    }
}
