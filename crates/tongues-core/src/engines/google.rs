//! Google Cloud Translation (v2 basic) adapter
//!
//! An auto source is sent by leaving `source` out of the body rather than
//! as `"source": "auto"`, which the v2 API does not document. Extras only
//! add fields the body does not already carry.

use std::sync::Arc;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::instrument;
use crate::cache::CacheStore;
use crate::config::EngineConfig;
use crate::engine::TranslatorEngine;
use crate::engines::{ensure_batch_len, f64_at, merge_extra, str_at, EngineContext};
use crate::http::HttpTransport;
use crate::types::{
    is_auto, EngineCapabilities, Extra, LanguageDetectionResult, TranslationBatchRequest,
    TranslationBatchResult, TranslationRequest, TranslationResult, UNDETERMINED,
};
use crate::Result;

const TRANSLATE_PATH: &str = "/language/translate/v2";
const DETECT_PATH: &str = "/language/translate/v2/detect";

/// Documented per-request character limit of the v2 API
pub const MAX_CHARS_PER_REQUEST: usize = 30_000;

#[derive(Debug, Clone)]
pub struct GoogleEngine {
    ctx: EngineContext,
}

impl GoogleEngine {
    pub fn new(ctx: EngineContext) -> Self {
        Self { ctx }
    }

    pub fn from_config(
        config: &EngineConfig,
        transport: Arc<dyn HttpTransport>,
        cache_store: Option<Arc<dyn CacheStore>>,
        cache_ttl: u64,
    ) -> Result<Self> {
        EngineContext::from_config(config, transport, cache_store, cache_ttl).map(Self::new)
    }

    /// Google detects the source itself when `source` is absent
    fn payload(&self, q: Value, source: &str, target: &str, html: bool, extra: &Extra) -> Value {
        let mut body = Map::new();
        body.insert("q".into(), q);
        if !is_auto(source) {
            body.insert("source".into(), json!(source));
        }
        body.insert("target".into(), json!(target));
        body.insert("format".into(), json!(if html { "html" } else { "text" }));

        let mut payload = Value::Object(body);
        merge_extra(&mut payload, extra);
        payload
    }

    async fn translations(&self, op: &str, payload: &Value) -> Result<Vec<Value>> {
        let request = self.ctx.post(TRANSLATE_PATH).json(payload.clone());
        let data = self.ctx.call(op, payload, request).await?;
        Ok(data
            .pointer("/data/translations")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl TranslatorEngine for GoogleEngine {
    fn name(&self) -> &str {
        self.ctx.name()
    }

    fn vendor(&self) -> &'static str {
        "google"
    }

    #[instrument(skip(self, request), fields(engine = %self.ctx.name(), source = %request.source, target = %request.target))]
    async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult> {
        request.validate()?;

        let payload = self.payload(
            json!(request.text),
            &request.source,
            &request.target,
            request.html,
            &request.extra,
        );
        let translations = self.translations("translate", &payload).await?;
        let first = translations.first();

        Ok(TranslationResult {
            translated_text: first
                .and_then(|t| str_at(t, "/translatedText"))
                .unwrap_or_default()
                .to_string(),
            detected_source: first
                .and_then(|t| str_at(t, "/detectedSourceLanguage"))
                .map(str::to_string)
                .unwrap_or_else(|| request.fallback_source()),
            metadata: self.ctx.metadata(),
        })
    }

    #[instrument(skip(self, request), fields(engine = %self.ctx.name(), texts = request.texts.len(), target = %request.target))]
    async fn translate_batch(&self, request: &TranslationBatchRequest) -> Result<TranslationBatchResult> {
        request.validate()?;

        let payload = self.payload(
            json!(request.texts),
            &request.source,
            &request.target,
            request.html,
            &request.extra,
        );
        let translations = self.translations("translate_batch", &payload).await?;

        let translated_texts: Vec<String> = translations
            .iter()
            .map(|t| str_at(t, "/translatedText").unwrap_or_default().to_string())
            .collect();
        ensure_batch_len(self.ctx.name(), request.texts.len(), &translated_texts)?;

        let detected_source = if is_auto(&request.source) {
            translations
                .first()
                .and_then(|t| str_at(t, "/detectedSourceLanguage"))
                .map(str::to_string)
                .unwrap_or_else(|| request.fallback_source())
        } else {
            request.source.clone()
        };

        Ok(TranslationBatchResult {
            translated_texts,
            detected_source,
            metadata: self.ctx.metadata(),
        })
    }

    #[instrument(skip(self, text), fields(engine = %self.ctx.name()))]
    async fn detect(&self, text: &str) -> Result<LanguageDetectionResult> {
        let payload = json!({ "q": text });
        let request = self.ctx.post(DETECT_PATH).json(payload.clone());
        let data = self.ctx.call("detect", &payload, request).await?;

        // detections[i] holds the hypotheses for input i, best first
        let Some(best) = data.pointer("/data/detections/0/0") else {
            return Ok(LanguageDetectionResult::undetermined(self.ctx.metadata()));
        };

        Ok(LanguageDetectionResult {
            language: str_at(best, "/language").unwrap_or(UNDETERMINED).to_string(),
            confidence: f64_at(best, "/confidence"),
            metadata: self.ctx.metadata(),
        })
    }

    fn capabilities(&self) -> EngineCapabilities {
        let mut metadata = Extra::new();
        metadata.insert("vendor".to_string(), json!("google"));
        EngineCapabilities {
            supports_glossary: false,
            supports_html: true,
            max_chars_per_request: Some(MAX_CHARS_PER_REQUEST),
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineType;
    use crate::engines::testing::{context, CannedTransport};
    use crate::http::RequestBody;

    fn engine(transport: Arc<CannedTransport>) -> GoogleEngine {
        let config = EngineConfig::new("google", EngineType::Google).with_api_key("g-key");
        GoogleEngine::new(context(config, transport))
    }

    fn sent_json(transport: &CannedTransport) -> Value {
        match transport.last_request().body {
            RequestBody::Json(body) => body,
            other => panic!("expected JSON body, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_translate() {
        let transport = CannedTransport::json(200, json!({
            "data": {"translations": [{"translatedText": "Hola", "detectedSourceLanguage": "en"}]}
        }));
        let result = engine(transport.clone())
            .translate(&TranslationRequest::new("Hello", "auto", "es"))
            .await
            .unwrap();

        assert_eq!(result.translated_text, "Hola");
        assert_eq!(result.detected_source, "en");

        let request = transport.last_request();
        assert_eq!(request.query_value("key"), Some("g-key"));
        assert!(request.headers.is_empty());
        assert!(request.path.ends_with("/language/translate/v2"));
        assert_eq!(sent_json(&transport), json!({"q": "Hello", "target": "es", "format": "text"}));
    }

    #[tokio::test]
    async fn test_explicit_source_sent() {
        let transport = CannedTransport::json(200, json!({"data": {"translations": [{"translatedText": "Hallo"}]}}));
        let result = engine(transport.clone())
            .translate(&TranslationRequest::new("<p>Hello</p>", "en", "de").with_html(true))
            .await
            .unwrap();

        assert_eq!(result.detected_source, "en");
        let body = sent_json(&transport);
        assert_eq!(body["source"], "en");
        assert_eq!(body["format"], "html");
    }

    #[tokio::test]
    async fn test_extras_keep_text_and_target() {
        let transport = CannedTransport::json(200, json!({"data": {"translations": [{"translatedText": "Hola"}]}}));
        engine(transport.clone())
            .translate(
                &TranslationRequest::new("Hello", "en", "es")
                    .with_extra("q", "INJECTED")
                    .with_extra("format", "html")
                    .with_extra("model", "nmt"),
            )
            .await
            .unwrap();

        assert_eq!(
            sent_json(&transport),
            json!({"q": "Hello", "source": "en", "target": "es", "format": "text", "model": "nmt"})
        );
    }

    #[tokio::test]
    async fn test_batch_order() {
        let transport = CannedTransport::json(200, json!({
            "data": {"translations": [
                {"translatedText": "uno", "detectedSourceLanguage": "en"},
                {"translatedText": "dos", "detectedSourceLanguage": "en"},
                {"translatedText": "tres", "detectedSourceLanguage": "en"}
            ]}
        }));
        let result = engine(transport.clone())
            .translate_batch(&TranslationBatchRequest::new(["one", "two", "three"], "auto", "es"))
            .await
            .unwrap();

        assert_eq!(result.translated_texts, vec!["uno", "dos", "tres"]);
        assert_eq!(result.detected_source, "en");
        assert_eq!(sent_json(&transport)["q"], json!(["one", "two", "three"]));
    }

    #[tokio::test]
    async fn test_detect() {
        let transport = CannedTransport::json(200, json!({
            "data": {"detections": [[{"language": "de", "confidence": 0.98, "isReliable": false}]]}
        }));
        let result = engine(transport.clone()).detect("Hallo Welt").await.unwrap();
        assert_eq!(result.language, "de");
        assert_eq!(result.confidence, 0.98);
        assert!(transport.last_request().path.ends_with("/detect"));
    }

    #[tokio::test]
    async fn test_detect_empty_detections() {
        let transport = CannedTransport::json(200, json!({"data": {"detections": []}}));
        let result = engine(transport).detect("...").await.unwrap();
        assert_eq!(result.language, "und");
        assert_eq!(result.confidence, 0.0);
    }

    #[tokio::test]
    async fn test_http_error_carries_body() {
        let body = json!({"error": {"code": 400, "message": "API key not valid"}});
        let transport = CannedTransport::json(400, body);
        let err = engine(transport)
            .translate(&TranslationRequest::new("Hello", "en", "es"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(400));
        assert_eq!(err.vendor_message().as_deref(), Some("API key not valid"));
    }

    #[test]
    fn test_capabilities() {
        let caps = engine(CannedTransport::with(vec![])).capabilities();
        assert_eq!(caps.max_chars_per_request, Some(MAX_CHARS_PER_REQUEST));
        assert!(!caps.supports_glossary);
    }
}
