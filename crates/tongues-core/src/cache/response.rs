//! Content-addressed memoization of vendor calls
//!
//! The key covers the operation, the engine instance name, the normalized
//! base URI and the full wire payload. Stored values are the raw vendor
//! response, not the typed result, so extraction can change without
//! invalidating what is already cached.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use serde_json::{json, Value};
use tracing::{debug, warn};
use crate::cache::CacheStore;
use crate::identity::content_hash;
use crate::Result;

/// Prefix shared by every cache key this crate writes
pub const KEY_PREFIX: &str = "tongues";

/// Per-engine cache wrapper
#[derive(Clone)]
pub struct ResponseCache {
    vendor: &'static str,
    engine: String,
    base_uri: String,
    store: Option<Arc<dyn CacheStore>>,
    default_ttl: u64,
}

impl ResponseCache {
    /// Create a cache wrapper; `default_ttl` is in seconds, 0 means forever
    pub fn new(
        vendor: &'static str,
        engine: impl Into<String>,
        base_uri: &str,
        store: Option<Arc<dyn CacheStore>>,
        default_ttl: u64,
    ) -> Self {
        Self {
            vendor,
            engine: engine.into(),
            base_uri: normalize_base_uri(base_uri),
            store,
            default_ttl,
        }
    }

    /// A wrapper that always calls through
    pub fn disabled(vendor: &'static str, engine: impl Into<String>, base_uri: &str) -> Self {
        Self::new(vendor, engine, base_uri, None, 0)
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    /// Normalized base URI that participates in the key
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// TTL applied on write
    pub fn ttl(&self) -> Option<Duration> {
        (self.default_ttl > 0).then(|| Duration::from_secs(self.default_ttl))
    }

    /// Compute the cache key for an operation and its wire payload
    pub fn key(&self, op: &str, payload: &Value) -> String {
        let envelope = json!({
            "op": op,
            "name": self.engine,
            "base": self.base_uri,
            "payload": payload,
        });
        // serde_json maps are sorted, so this serialization is canonical
        let hash = content_hash(envelope.to_string().as_bytes());
        format!("{}.{}.{}.{}", KEY_PREFIX, self.vendor, op, hash)
    }

    /// Return the cached response for `payload`, or run `producer` and store its result
    ///
    /// Without a store this is a direct call to `producer`. Store failures
    /// are logged and never fail the call.
    pub async fn fetch<F, Fut>(&self, op: &str, payload: &Value, producer: F) -> Result<Value>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<Value>> + Send,
    {
        let Some(store) = &self.store else {
            return producer().await;
        };

        let key = self.key(op, payload);

        match store.get(&key).await {
            Ok(Some(value)) if !value.is_null() => {
                debug!(engine = %self.engine, op, key = %key, "Cache hit");
                return Ok(value);
            }
            Ok(_) => {
                debug!(engine = %self.engine, op, key = %key, "Cache miss");
            }
            Err(e) => {
                warn!(engine = %self.engine, op, key = %key, error = %e, "Cache read failed, calling vendor");
            }
        }

        let value = producer().await?;

        if let Err(e) = store.set(&key, value.clone(), self.ttl()).await {
            warn!(engine = %self.engine, op, key = %key, error = %e, "Cache write failed");
        }

        Ok(value)
    }
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("vendor", &self.vendor)
            .field("engine", &self.engine)
            .field("base_uri", &self.base_uri)
            .field("enabled", &self.is_enabled())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

/// Lowercase scheme and host, drop trailing slashes
pub fn normalize_base_uri(base_uri: &str) -> String {
    let trimmed = base_uri.trim();
    match url::Url::parse(trimmed) {
        Ok(url) => url.as_str().trim_end_matches('/').to_string(),
        Err(_) => trimmed.trim_end_matches('/').to_string(),
    }
}
