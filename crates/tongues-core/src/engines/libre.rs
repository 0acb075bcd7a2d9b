//! LibreTranslate adapter
//!
//! Self-hosted, so the base URI is always explicit. The API key is optional
//! and travels in the JSON body.

use std::sync::{Arc, OnceLock};
use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Value};
use tracing::instrument;
use crate::cache::CacheStore;
use crate::config::EngineConfig;
use crate::engine::TranslatorEngine;
use crate::engines::{ensure_batch_len, f64_at, merge_extra, str_at, EngineContext};
use crate::http::HttpTransport;
use crate::types::{
    is_auto, EngineCapabilities, Extra, LanguageDetectionResult, TranslationBatchRequest,
    TranslationBatchResult, TranslationRequest, TranslationResult, AUTO, UNDETERMINED,
};
use crate::Result;

const TRANSLATE_PATH: &str = "/translate";
const DETECT_PATH: &str = "/detect";

/// Extra parameter that asks LibreTranslate for alternative translations
pub const ALTERNATIVES_PARAM: &str = "alternatives";

static ENUMERATION: OnceLock<Regex> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct LibreEngine {
    ctx: EngineContext,
}

impl LibreEngine {
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

    fn translate_payload(&self, q: Value, source: &str, target: &str, html: bool, extra: &Extra) -> Value {
        let mut payload = json!({
            "q": q,
            "source": if is_auto(source) { AUTO } else { source },
            "target": target,
            "format": if html { "html" } else { "text" },
        });
        merge_extra(&mut payload, extra);
        payload
    }
}

#[async_trait]
impl TranslatorEngine for LibreEngine {
    fn name(&self) -> &str {
        self.ctx.name()
    }

    fn vendor(&self) -> &'static str {
        "libre"
    }

    #[instrument(skip(self, request), fields(engine = %self.ctx.name(), source = %request.source, target = %request.target))]
    async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult> {
        request.validate()?;

        let payload = self.translate_payload(
            Value::String(request.text.clone()),
            &request.source,
            &request.target,
            request.html,
            &request.extra,
        );
        let data = self
            .ctx
            .call("translate", &payload, self.ctx.post(TRANSLATE_PATH).json(payload.clone()))
            .await?;

        let mut metadata = self.ctx.metadata();
        let translated = str_at(&data, "/translatedText").unwrap_or_default();
        let translated_text = if request.extra.contains_key(ALTERNATIVES_PARAM) {
            match alternative_for_echo(&request.text, translated, &data) {
                Some(alternative) => {
                    metadata.insert("alternative_used".to_string(), Value::Bool(true));
                    alternative
                }
                None => translated.to_string(),
            }
        } else {
            translated.to_string()
        };

        Ok(TranslationResult {
            translated_text,
            detected_source: detected_language(&data)
                .map(str::to_string)
                .unwrap_or_else(|| request.fallback_source()),
            metadata,
        })
    }

    #[instrument(skip(self, request), fields(engine = %self.ctx.name(), texts = request.texts.len(), target = %request.target))]
    async fn translate_batch(&self, request: &TranslationBatchRequest) -> Result<TranslationBatchResult> {
        request.validate()?;

        let payload = self.translate_payload(
            json!(request.texts),
            &request.source,
            &request.target,
            request.html,
            &request.extra,
        );
        let data = self
            .ctx
            .call("translate_batch", &payload, self.ctx.post(TRANSLATE_PATH).json(payload.clone()))
            .await?;

        let translated_texts: Vec<String> = match data.get("translatedText") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| item.as_str().unwrap_or_default().to_string())
                .collect(),
            Some(Value::String(single)) => vec![single.clone()],
            _ => Vec::new(),
        };
        ensure_batch_len(self.ctx.name(), request.texts.len(), &translated_texts)?;

        Ok(TranslationBatchResult {
            translated_texts,
            detected_source: detected_language(&data)
                .map(str::to_string)
                .unwrap_or_else(|| request.fallback_source()),
            metadata: self.ctx.metadata(),
        })
    }

    #[instrument(skip(self, text), fields(engine = %self.ctx.name()))]
    async fn detect(&self, text: &str) -> Result<LanguageDetectionResult> {
        let payload = json!({ "q": text });
        let data = self
            .ctx
            .call("detect", &payload, self.ctx.post(DETECT_PATH).json(payload.clone()))
            .await?;

        // Candidates arrive best first
        let Some(best) = data.get(0) else {
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
        metadata.insert("vendor".to_string(), json!("libre"));
        EngineCapabilities {
            supports_glossary: false,
            supports_html: true,
            max_chars_per_request: None,
            metadata,
        }
    }
}

/// `detectedLanguage` is an object for single texts and a list for batches
fn detected_language(data: &Value) -> Option<&str> {
    let language = match data.get("detectedLanguage")? {
        Value::String(language) => Some(language.as_str()),
        Value::Array(items) => items.first().and_then(|item| str_at(item, "/language")),
        object => str_at(object, "/language"),
    };
    language.filter(|language| !language.is_empty())
}

/// When the vendor echoes the input back, take the first alternative that differs
fn alternative_for_echo(input: &str, translated: &str, data: &Value) -> Option<String> {
    let input = input.trim();
    if !translated.trim().eq_ignore_ascii_case(input) {
        return None;
    }

    let enumeration = ENUMERATION.get_or_init(|| {
        Regex::new(r"^\s*(?:\d+[.)]|[-*\u{2022}])\s*").expect("Valid regex pattern")
    });

    data.get(ALTERNATIVES_PARAM)?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .map(|alternative| enumeration.replace(alternative, "").trim().to_string())
        .find(|alternative| !alternative.is_empty() && !alternative.eq_ignore_ascii_case(input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineType;
    use crate::engines::testing::{context, CannedTransport};
    use crate::http::RequestBody;
    use crate::Error;

    fn engine(transport: Arc<CannedTransport>) -> LibreEngine {
        let config = EngineConfig::new("libre_local", EngineType::Libre).with_base_uri("http://localhost:5000");
        LibreEngine::new(context(config, transport))
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
            "translatedText": "Hola",
            "detectedLanguage": {"language": "en", "confidence": 90.0}
        }));
        let engine = engine(transport.clone());

        let result = engine.translate(&TranslationRequest::new("Hello", "en", "es")).await.unwrap();
        assert_eq!(result.translated_text, "Hola");
        assert_eq!(result.detected_source, "en");
        assert_eq!(result.metadata["engine"], "libre_local");

        let request = transport.last_request();
        assert_eq!(request.url().unwrap().as_str(), "http://localhost:5000/translate");
        assert_eq!(
            sent_json(&transport),
            json!({"q": "Hello", "source": "en", "target": "es", "format": "text"})
        );
    }

    #[tokio::test]
    async fn test_extras_cannot_replace_core_fields() {
        let transport = CannedTransport::json(200, json!({"translatedText": "Hola"}));
        engine(transport.clone())
            .translate(
                &TranslationRequest::new("Hello", "en", "es")
                    .with_extra("q", "INJECTED")
                    .with_extra("target", "de")
                    .with_extra("alternatives", 2),
            )
            .await
            .unwrap();

        assert_eq!(
            sent_json(&transport),
            json!({"q": "Hello", "source": "en", "target": "es", "format": "text", "alternatives": 2})
        );
    }

    #[tokio::test]
    async fn test_missing_fields_fall_back() {
        let transport = CannedTransport::json(200, json!({}));
        let result = engine(transport)
            .translate(&TranslationRequest::new("Hello", "auto", "es"))
            .await
            .unwrap();
        assert_eq!(result.translated_text, "");
        assert_eq!(result.detected_source, "auto");
    }

    #[tokio::test]
    async fn test_api_key_in_body() {
        let transport = CannedTransport::json(200, json!({"translatedText": "Hallo"}));
        let config = EngineConfig::new("libre", EngineType::Libre)
            .with_base_uri("https://libre.example.com")
            .with_api_key("secret");
        let engine = LibreEngine::new(context(config, transport.clone()));

        engine
            .translate(&TranslationRequest::new("Hello", "en", "de").with_html(true))
            .await
            .unwrap();
        let body = sent_json(&transport);
        assert_eq!(body["api_key"], "secret");
        assert_eq!(body["format"], "html");
    }

    #[tokio::test]
    async fn test_batch_with_detected_list() {
        let transport = CannedTransport::json(200, json!({
            "translatedText": ["Hola", "Mundo"],
            "detectedLanguage": [{"language": "en", "confidence": 80}, {"language": "en", "confidence": 75}]
        }));
        let result = engine(transport.clone())
            .translate_batch(&TranslationBatchRequest::new(["Hello", "World"], "auto", "es"))
            .await
            .unwrap();

        assert_eq!(result.translated_texts, vec!["Hola", "Mundo"]);
        assert_eq!(result.detected_source, "en");
        assert_eq!(sent_json(&transport)["q"], json!(["Hello", "World"]));
    }

    #[tokio::test]
    async fn test_batch_short_response() {
        let transport = CannedTransport::json(200, json!({"translatedText": ["Hola"]}));
        let err = engine(transport)
            .translate_batch(&TranslationBatchRequest::new(["Hello", "World"], "en", "es"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::IncompleteBatch { expected: 2, received: 1, .. }));
    }

    #[tokio::test]
    async fn test_detect_picks_first() {
        let transport = CannedTransport::json(200, json!([
            {"language": "fr", "confidence": 92.0},
            {"language": "it", "confidence": 10.0}
        ]));
        let result = engine(transport.clone()).detect("Bonjour").await.unwrap();
        assert_eq!(result.language, "fr");
        assert_eq!(result.confidence, 92.0);
        assert!(transport.last_request().path.ends_with("/detect"));
    }

    #[tokio::test]
    async fn test_detect_empty() {
        let transport = CannedTransport::json(200, json!([]));
        let result = engine(transport).detect("???").await.unwrap();
        assert_eq!(result.language, "und");
        assert_eq!(result.confidence, 0.0);
    }

    #[tokio::test]
    async fn test_alternative_used_when_echoed() {
        let transport = CannedTransport::json(200, json!({
            "translatedText": "Hello",
            "alternatives": ["hello", "1. Hola", "2. Buenas"]
        }));
        let result = engine(transport)
            .translate(&TranslationRequest::new("Hello", "en", "es").with_extra(ALTERNATIVES_PARAM, 3))
            .await
            .unwrap();
        assert_eq!(result.translated_text, "Hola");
        assert_eq!(result.metadata["alternative_used"], true);
    }

    #[tokio::test]
    async fn test_alternatives_ignored_without_request() {
        let transport = CannedTransport::json(200, json!({
            "translatedText": "Hello",
            "alternatives": ["Hola"]
        }));
        let result = engine(transport)
            .translate(&TranslationRequest::new("Hello", "en", "es"))
            .await
            .unwrap();
        assert_eq!(result.translated_text, "Hello");
        assert!(!result.metadata.contains_key("alternative_used"));
    }

    #[test]
    fn test_capabilities() {
        let engine = engine(CannedTransport::with(vec![]));
        let caps = engine.capabilities();
        assert!(!caps.supports_glossary);
        assert!(caps.supports_html);
        assert_eq!(caps, engine.capabilities());
    }
}
