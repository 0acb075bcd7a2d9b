//! DeepL adapter
//!
//! Form-encoded `POST /v2/translate` with uppercase language codes. DeepL has
//! no detect endpoint, so detection translates to English and reads the
//! reported source language.

use std::sync::Arc;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::instrument;
use crate::cache::CacheStore;
use crate::config::EngineConfig;
use crate::engine::TranslatorEngine;
use crate::engines::{ensure_batch_len, str_at, EngineContext};
use crate::http::{form_pairs, HttpTransport};
use crate::types::{
    is_auto, EngineCapabilities, Extra, LanguageDetectionResult, TranslationBatchRequest,
    TranslationBatchResult, TranslationRequest, TranslationResult, UNDETERMINED,
};
use crate::Result;

const TRANSLATE_PATH: &str = "/v2/translate";

/// Target used for emulated detection
const DETECT_TARGET: &str = "EN";

#[derive(Debug, Clone)]
pub struct DeepLEngine {
    ctx: EngineContext,
}

struct Params<'a> {
    source: &'a str,
    target: &'a str,
    html: bool,
    glossary_id: Option<&'a str>,
    extra: &'a Extra,
}

impl DeepLEngine {
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

    /// The form body as a JSON object, which is also what the cache key hashes
    fn payload(&self, texts: &[String], params: Params<'_>) -> Value {
        let mut body = Map::new();
        body.insert("target_lang".into(), json!(params.target.to_uppercase()));
        if !is_auto(params.source) {
            body.insert("source_lang".into(), json!(params.source.to_uppercase()));
        }
        if params.html {
            body.insert("tag_handling".into(), json!("html"));
        }
        if let Some(glossary_id) = params.glossary_id.filter(|g| !g.is_empty()) {
            body.insert("glossary_id".into(), json!(glossary_id));
        }
        for (key, value) in params.extra {
            body.insert(key.clone(), value.clone());
        }
        body.insert("text".into(), json!(texts));
        Value::Object(body)
    }

    async fn post(&self, op: &str, payload: &Value) -> Result<Value> {
        let request = self.ctx.post(TRANSLATE_PATH).form(form_pairs(payload));
        self.ctx.call(op, payload, request).await
    }
}

#[async_trait]
impl TranslatorEngine for DeepLEngine {
    fn name(&self) -> &str {
        self.ctx.name()
    }

    fn vendor(&self) -> &'static str {
        "deepl"
    }

    #[instrument(skip(self, request), fields(engine = %self.ctx.name(), source = %request.source, target = %request.target))]
    async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult> {
        request.validate()?;

        let payload = self.payload(
            std::slice::from_ref(&request.text),
            Params {
                source: &request.source,
                target: &request.target,
                html: request.html,
                glossary_id: request.glossary_id.as_deref(),
                extra: &request.extra,
            },
        );
        let data = self.post("translate", &payload).await?;

        Ok(TranslationResult {
            translated_text: str_at(&data, "/translations/0/text").unwrap_or_default().to_string(),
            detected_source: str_at(&data, "/translations/0/detected_source_language")
                .map(str::to_string)
                .unwrap_or_else(|| request.fallback_source()),
            metadata: self.ctx.metadata(),
        })
    }

    #[instrument(skip(self, request), fields(engine = %self.ctx.name(), texts = request.texts.len(), target = %request.target))]
    async fn translate_batch(&self, request: &TranslationBatchRequest) -> Result<TranslationBatchResult> {
        request.validate()?;

        let payload = self.payload(
            &request.texts,
            Params {
                source: &request.source,
                target: &request.target,
                html: request.html,
                glossary_id: request.glossary_id.as_deref(),
                extra: &request.extra,
            },
        );
        let data = self.post("translate_batch", &payload).await?;

        let translations = data
            .get("translations")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let translated_texts: Vec<String> = translations
            .iter()
            .map(|t| str_at(t, "/text").unwrap_or_default().to_string())
            .collect();
        ensure_batch_len(self.ctx.name(), request.texts.len(), &translated_texts)?;

        // An explicit source is authoritative for the whole batch
        let detected_source = if is_auto(&request.source) {
            str_at(&data, "/translations/0/detected_source_language")
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
        let payload = json!({
            "text": [text],
            "target_lang": DETECT_TARGET,
        });
        let data = self.post("detect", &payload).await?;

        Ok(LanguageDetectionResult {
            language: str_at(&data, "/translations/0/detected_source_language")
                .unwrap_or(UNDETERMINED)
                .to_string(),
            // DeepL reports no confidence
            confidence: 0.0,
            metadata: self.ctx.metadata(),
        })
    }

    fn capabilities(&self) -> EngineCapabilities {
        let mut metadata = Extra::new();
        metadata.insert("vendor".to_string(), json!("deepl"));
        EngineCapabilities {
            supports_glossary: true,
            supports_html: true,
            max_chars_per_request: None,
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineType;
    use crate::engines::testing::{context, CannedTransport};
    use crate::http::{HttpRequest, RequestBody};

    fn engine(transport: Arc<CannedTransport>) -> DeepLEngine {
        let config = EngineConfig::new("deepl_free", EngineType::Deepl).with_api_key("abc:fx");
        DeepLEngine::new(context(config, transport))
    }

    fn form_value<'a>(request: &'a HttpRequest, key: &str) -> Option<&'a str> {
        match &request.body {
            RequestBody::Form(pairs) => pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str()),
            other => panic!("expected form body, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_translate_wire_shape() {
        let transport = CannedTransport::json(200, json!({
            "translations": [{"detected_source_language": "EN", "text": "Hallo"}]
        }));
        let result = engine(transport.clone())
            .translate(
                &TranslationRequest::new("Hello", "en", "de")
                    .with_html(true)
                    .with_glossary("gls-1")
                    .with_extra("formality", "more"),
            )
            .await
            .unwrap();

        assert_eq!(result.translated_text, "Hallo");
        assert_eq!(result.detected_source, "EN");

        let request = transport.last_request();
        assert_eq!(request.url().unwrap().as_str(), "https://api-free.deepl.com/v2/translate");
        assert_eq!(request.header_value("Authorization"), Some("DeepL-Auth-Key abc:fx"));
        assert_eq!(form_value(&request, "target_lang"), Some("DE"));
        assert_eq!(form_value(&request, "source_lang"), Some("EN"));
        assert_eq!(form_value(&request, "tag_handling"), Some("html"));
        assert_eq!(form_value(&request, "glossary_id"), Some("gls-1"));
        assert_eq!(form_value(&request, "formality"), Some("more"));
        assert_eq!(form_value(&request, "text"), Some("Hello"));
    }

    #[tokio::test]
    async fn test_auto_source_omitted() {
        let transport = CannedTransport::json(200, json!({"translations": [{"text": "Hola"}]}));
        engine(transport.clone())
            .translate(&TranslationRequest::new("Hello", "auto", "es"))
            .await
            .unwrap();
        let request = transport.last_request();
        assert!(form_value(&request, "source_lang").is_none());
        assert!(form_value(&request, "tag_handling").is_none());
    }

    #[tokio::test]
    async fn test_empty_source_omitted() {
        let transport = CannedTransport::json(200, json!({
            "translations": [{"text": "Hola", "detected_source_language": "EN"}]
        }));
        let result = engine(transport.clone())
            .translate(&TranslationRequest::new("Hello", "", "es"))
            .await
            .unwrap();

        assert_eq!(result.detected_source, "EN");
        assert_eq!(transport.requests.lock().len(), 1);
        assert!(form_value(&transport.last_request(), "source_lang").is_none());
    }

    #[tokio::test]
    async fn test_batch_repeats_text_field() {
        let transport = CannedTransport::json(200, json!({
            "translations": [
                {"detected_source_language": "EN", "text": "Hola"},
                {"detected_source_language": "EN", "text": "Mundo"}
            ]
        }));
        let result = engine(transport.clone())
            .translate_batch(&TranslationBatchRequest::new(["Hello", "World"], "auto", "es"))
            .await
            .unwrap();

        assert_eq!(result.translated_texts, vec!["Hola", "Mundo"]);
        assert_eq!(result.detected_source, "EN");

        let request = transport.last_request();
        let texts: Vec<&str> = match &request.body {
            RequestBody::Form(pairs) => pairs.iter().filter(|(k, _)| k == "text").map(|(_, v)| v.as_str()).collect(),
            _ => unreachable!(),
        };
        assert_eq!(texts, vec!["Hello", "World"]);
    }

    #[tokio::test]
    async fn test_batch_explicit_source_is_reported() {
        let transport = CannedTransport::json(200, json!({
            "translations": [{"detected_source_language": "DE", "text": "Hola"}]
        }));
        let result = engine(transport)
            .translate_batch(&TranslationBatchRequest::new(["Hello"], "en", "es"))
            .await
            .unwrap();
        assert_eq!(result.detected_source, "en");
    }

    #[tokio::test]
    async fn test_detect_via_translate() {
        let transport = CannedTransport::json(200, json!({
            "translations": [{"detected_source_language": "FR", "text": "Hello"}]
        }));
        let result = engine(transport.clone()).detect("Bonjour").await.unwrap();
        assert_eq!(result.language, "FR");
        assert_eq!(result.confidence, 0.0);

        let request = transport.last_request();
        assert_eq!(form_value(&request, "target_lang"), Some("EN"));
        assert_eq!(form_value(&request, "text"), Some("Bonjour"));
    }

    #[tokio::test]
    async fn test_detect_without_translations() {
        let transport = CannedTransport::json(200, json!({"translations": []}));
        let result = engine(transport).detect("???").await.unwrap();
        assert_eq!(result.language, "und");
    }

    #[tokio::test]
    async fn test_pro_plan_host() {
        let transport = CannedTransport::json(200, json!({"translations": [{"text": "x"}]}));
        let config = EngineConfig::new("deepl_pro", EngineType::Deepl)
            .with_api_key("k")
            .with_plan("pro");
        let engine = DeepLEngine::new(context(config, transport.clone()));
        engine.translate(&TranslationRequest::new("y", "en", "de")).await.unwrap();
        assert!(transport
            .last_request()
            .url()
            .unwrap()
            .as_str()
            .starts_with("https://api.deepl.com/"));
    }

    #[test]
    fn test_capabilities() {
        let caps = engine(CannedTransport::with(vec![])).capabilities();
        assert!(caps.supports_glossary);
        assert!(caps.supports_html);
    }
}
