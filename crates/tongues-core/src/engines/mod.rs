//! Vendor adapters and the plumbing they share
//!
//! Each adapter owns an `EngineContext`: its registry name, resolved base URI,
//! transport, auth handler and response cache. The adapter only builds the
//! vendor payload and extracts the typed result.

pub mod bing;
pub mod deepl;
pub mod google;
pub mod libre;

pub use bing::BingEngine;
pub use deepl::DeepLEngine;
pub use google::GoogleEngine;
pub use libre::LibreEngine;

use std::sync::Arc;
use serde_json::Value;
use crate::cache::{CacheStore, ResponseCache};
use crate::config::{EngineConfig, EngineType};
use crate::http::{create_auth_handler, AuthHandler, HttpRequest, HttpTransport};
use crate::types::Extra;
use crate::{Error, Result};

/// Per-adapter state fixed at construction
#[derive(Clone)]
pub struct EngineContext {
    name: String,
    engine_type: EngineType,
    base_uri: String,
    transport: Arc<dyn HttpTransport>,
    auth: Arc<dyn AuthHandler>,
    cache: ResponseCache,
}

impl EngineContext {
    pub fn new(
        name: impl Into<String>,
        engine_type: EngineType,
        base_uri: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
        auth: Arc<dyn AuthHandler>,
        cache_store: Option<Arc<dyn CacheStore>>,
        cache_ttl: u64,
    ) -> Self {
        let name = name.into();
        let base_uri = base_uri.into();
        let cache = ResponseCache::new(engine_type.as_str(), name.clone(), &base_uri, cache_store, cache_ttl);

        Self {
            name,
            engine_type,
            base_uri,
            transport,
            auth,
            cache,
        }
    }

    /// Resolve host and credentials from configuration
    pub fn from_config(
        config: &EngineConfig,
        transport: Arc<dyn HttpTransport>,
        cache_store: Option<Arc<dyn CacheStore>>,
        cache_ttl: u64,
    ) -> Result<Self> {
        let base_uri = config.resolved_base_uri()?;
        let api_key = config.resolved_api_key()?;
        let auth: Arc<dyn AuthHandler> = Arc::from(create_auth_handler(
            config.engine_type,
            api_key.as_deref(),
            config.region.as_deref(),
        ));

        Ok(Self::new(
            config.name.clone(),
            config.engine_type,
            base_uri,
            transport,
            auth,
            cache_store,
            cache_ttl,
        ))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn engine_type(&self) -> EngineType {
        self.engine_type
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// POST request against this engine's host
    pub fn post(&self, path: &str) -> HttpRequest {
        HttpRequest::post(self.name.clone(), self.base_uri.clone(), path)
    }

    /// Metadata attached to every result
    pub fn metadata(&self) -> Extra {
        let mut metadata = Extra::new();
        metadata.insert("engine".to_string(), Value::String(self.name.clone()));
        metadata.insert("vendor".to_string(), Value::String(self.engine_type.as_str().to_string()));
        metadata
    }

    /// Authenticate, send, and decode one vendor call
    pub async fn send(&self, mut request: HttpRequest) -> Result<Value> {
        self.auth.apply_auth(&mut request)?;

        let response = self.transport.execute(request).await?;
        if response.is_error() {
            return Err(Error::EngineHttp {
                engine: self.name.clone(),
                status_code: response.status,
                body: response.body,
            });
        }

        response.json(&self.name)
    }

    /// `send` behind the response cache; `payload` is what identifies the call
    pub async fn call(&self, op: &str, payload: &Value, request: HttpRequest) -> Result<Value> {
        self.cache.fetch(op, payload, || self.send(request)).await
    }
}

impl std::fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineContext")
            .field("name", &self.name)
            .field("engine_type", &self.engine_type)
            .field("base_uri", &self.base_uri)
            .field("auth", &self.auth)
            .field("cache", &self.cache)
            .finish()
    }
}

/// Add caller-supplied extras to a JSON object payload
///
/// Keys already in the payload are kept, so an extra can never replace the
/// text, languages or format of the call.
pub(crate) fn merge_extra(payload: &mut Value, extra: &Extra) {
    if let Value::Object(map) = payload {
        for (key, value) in extra {
            map.entry(key.clone()).or_insert_with(|| value.clone());
        }
    }
}

/// String at a JSON pointer, if present and a string
pub(crate) fn str_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value.pointer(pointer).and_then(Value::as_str)
}

/// Number at a JSON pointer, 0.0 when absent
pub(crate) fn f64_at(value: &Value, pointer: &str) -> f64 {
    value.pointer(pointer).and_then(Value::as_f64).unwrap_or(0.0)
}

/// Check that a batch response carries one translation per input
pub(crate) fn ensure_batch_len(engine: &str, expected: usize, translations: &[String]) -> Result<()> {
    if translations.len() != expected {
        return Err(Error::IncompleteBatch {
            engine: engine.to_string(),
            expected,
            received: translations.len(),
        });
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_send_maps_http_errors() {
        let transport = CannedTransport::json(403, json!({"message": "Wrong key"}));
        let config = EngineConfig::new("deepl_free", EngineType::Deepl).with_api_key("k");
        let ctx = context(config, transport);

        let err = ctx.send(ctx.post("/v2/translate")).await.unwrap_err();
        assert_eq!(err.status_code(), Some(403));
        assert_eq!(err.vendor_message().as_deref(), Some("Wrong key"));
    }

    #[tokio::test]
    async fn test_send_applies_auth() {
        let transport = CannedTransport::json(200, json!({}));
        let config = EngineConfig::new("google", EngineType::Google).with_api_key("g-key");
        let ctx = context(config, transport.clone());

        ctx.send(ctx.post("/language/translate/v2").json(json!({}))).await.unwrap();
        assert_eq!(transport.last_request().query_value("key"), Some("g-key"));
    }

    #[test]
    fn test_metadata() {
        let config = EngineConfig::new("libre_local", EngineType::Libre).with_base_uri("http://localhost:5000");
        let ctx = context(config, CannedTransport::with(vec![]));
        let metadata = ctx.metadata();
        assert_eq!(metadata["engine"], "libre_local");
        assert_eq!(metadata["vendor"], "libre");
    }

    #[test]
    fn test_merge_extra_keeps_payload_fields() {
        let mut payload = json!({"format": "text", "q": "Hi"});
        let mut extra = Extra::new();
        extra.insert("format".into(), json!("html"));
        extra.insert("alternatives".into(), json!(3));
        merge_extra(&mut payload, &extra);
        assert_eq!(payload, json!({"format": "text", "q": "Hi", "alternatives": 3}));
    }

    #[test]
    fn test_ensure_batch_len() {
        let texts = vec!["a".to_string()];
        assert!(ensure_batch_len("x", 1, &texts).is_ok());
        let err = ensure_batch_len("x", 2, &texts).unwrap_err();
        assert!(matches!(err, Error::IncompleteBatch { expected: 2, received: 1, .. }));
    }
}
