//! Microsoft Translator (v3) adapter
//!
//! Options travel in the query string and texts in a JSON array body of
//! `{"Text": ...}` objects.

use std::sync::Arc;
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::instrument;
use crate::cache::CacheStore;
use crate::config::EngineConfig;
use crate::engine::TranslatorEngine;
use crate::engines::{ensure_batch_len, f64_at, str_at, EngineContext};
use crate::http::{HttpRequest, HttpTransport};
use crate::types::{
    is_auto, EngineCapabilities, Extra, LanguageDetectionResult, TranslationBatchRequest,
    TranslationBatchResult, TranslationRequest, TranslationResult, UNDETERMINED,
};
use crate::Result;

const API_VERSION: &str = "3.0";
const TRANSLATE_PATH: &str = "/translate";
const DETECT_PATH: &str = "/detect";

/// Documented per-request character limit of the v3 API
pub const MAX_CHARS_PER_REQUEST: usize = 50_000;

#[derive(Debug, Clone)]
pub struct BingEngine {
    ctx: EngineContext,
}

impl BingEngine {
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

    /// Query parameters, in order, for a translate call
    fn translate_params(&self, source: &str, target: &str, html: bool, extra: &Extra) -> Vec<(String, String)> {
        let mut params = vec![
            ("api-version".to_string(), API_VERSION.to_string()),
            ("to".to_string(), target.to_string()),
        ];
        if !is_auto(source) {
            params.push(("from".to_string(), source.to_string()));
        }
        if html {
            params.push(("textType".to_string(), "html".to_string()));
        }
        for (key, value) in extra {
            if params.iter().any(|(k, _)| k == key) {
                continue;
            }
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            params.push((key.clone(), value));
        }
        params
    }

    fn request(&self, path: &str, params: &[(String, String)], texts: &[String]) -> HttpRequest {
        let body: Vec<Value> = texts.iter().map(|text| json!({ "Text": text })).collect();
        params
            .iter()
            .fold(self.ctx.post(path), |request, (key, value)| request.query(key.clone(), value.clone()))
            .json(Value::Array(body))
    }

    async fn translate_texts(
        &self,
        op: &str,
        texts: &[String],
        params: Vec<(String, String)>,
    ) -> Result<Value> {
        let payload = json!({ "params": params, "texts": texts });
        let request = self.request(TRANSLATE_PATH, &params, texts);
        self.ctx.call(op, &payload, request).await
    }
}

#[async_trait]
impl TranslatorEngine for BingEngine {
    fn name(&self) -> &str {
        self.ctx.name()
    }

    fn vendor(&self) -> &'static str {
        "bing"
    }

    #[instrument(skip(self, request), fields(engine = %self.ctx.name(), source = %request.source, target = %request.target))]
    async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult> {
        request.validate()?;

        let params = self.translate_params(&request.source, &request.target, request.html, &request.extra);
        let data = self
            .translate_texts("translate", std::slice::from_ref(&request.text), params)
            .await?;

        Ok(TranslationResult {
            translated_text: str_at(&data, "/0/translations/0/text").unwrap_or_default().to_string(),
            detected_source: str_at(&data, "/0/detectedLanguage/language")
                .map(str::to_string)
                .unwrap_or_else(|| request.fallback_source()),
            metadata: self.ctx.metadata(),
        })
    }

    #[instrument(skip(self, request), fields(engine = %self.ctx.name(), texts = request.texts.len(), target = %request.target))]
    async fn translate_batch(&self, request: &TranslationBatchRequest) -> Result<TranslationBatchResult> {
        request.validate()?;

        let params = self.translate_params(&request.source, &request.target, request.html, &request.extra);
        let data = self.translate_texts("translate_batch", &request.texts, params).await?;

        let items = data.as_array().map(Vec::as_slice).unwrap_or_default();
        let translated_texts: Vec<String> = items
            .iter()
            .map(|item| str_at(item, "/translations/0/text").unwrap_or_default().to_string())
            .collect();
        ensure_batch_len(self.ctx.name(), request.texts.len(), &translated_texts)?;

        let detected_source = if is_auto(&request.source) {
            str_at(&data, "/0/detectedLanguage/language")
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
        let texts = [text.to_string()];
        let params = vec![("api-version".to_string(), API_VERSION.to_string())];
        let payload = json!({ "texts": texts });
        let request = self.request(DETECT_PATH, &params, &texts);
        let data = self.ctx.call("detect", &payload, request).await?;

        let Some(best) = data.get(0) else {
            return Ok(LanguageDetectionResult::undetermined(self.ctx.metadata()));
        };

        Ok(LanguageDetectionResult {
            language: str_at(best, "/language").unwrap_or(UNDETERMINED).to_string(),
            confidence: f64_at(best, "/score"),
            metadata: self.ctx.metadata(),
        })
    }

    fn capabilities(&self) -> EngineCapabilities {
        let mut metadata = Extra::new();
        metadata.insert("vendor".to_string(), json!("bing"));
        EngineCapabilities {
            supports_glossary: false,
            supports_html: true,
            max_chars_per_request: Some(MAX_CHARS_PER_REQUEST),
            metadata,
        }
    }
}
