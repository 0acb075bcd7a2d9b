//! Core data types for tongues
//!
//! Requests and results are short-lived value objects. They are built by the
//! caller, handed to an engine, and never mutated afterwards.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::{Error, Result};

/// Source code meaning "let the vendor detect it"
pub const AUTO: &str = "auto";

/// Language code used when a vendor reports nothing
pub const UNDETERMINED: &str = "und";

/// Vendor-specific key/value parameters and result metadata
pub type Extra = BTreeMap<String, Value>;

static LANGUAGE_CODE: OnceLock<Regex> = OnceLock::new();

fn language_code_regex() -> &'static Regex {
    LANGUAGE_CODE.get_or_init(|| {
        Regex::new(r"^[A-Za-z]{2,3}([-_][A-Za-z0-9]{2,8})*$").expect("Valid regex pattern")
    })
}

/// True for "auto" (any case) and the empty string
pub fn is_auto(source: &str) -> bool {
    source.is_empty() || source.eq_ignore_ascii_case(AUTO)
}

/// Check that `code` looks like an ISO language tag (`en`, `pt-BR`, `zh_Hans`)
pub fn is_language_code(code: &str) -> bool {
    language_code_regex().is_match(code)
}

fn validate_languages(source: &str, target: &str) -> Result<()> {
    if target.trim().is_empty() {
        return Err(Error::invalid_request("target", "target language must not be empty"));
    }
    if !is_language_code(target) {
        return Err(Error::invalid_request(
            "target",
            format!("'{}' is not a language code", target),
        ));
    }
    if !is_auto(source) && !is_language_code(source) {
        return Err(Error::invalid_request(
            "source",
            format!("'{}' is neither 'auto' nor a language code", source),
        ));
    }
    Ok(())
}

/// Single-text translation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationRequest {
    /// Text to translate
    pub text: String,
    /// Source language code or "auto"
    pub source: String,
    /// Target language code
    pub target: String,
    /// Treat the text as HTML markup
    #[serde(default)]
    pub html: bool,
    /// Vendor glossary to apply (DeepL)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glossary_id: Option<String>,
    /// Extra vendor parameters merged into the wire payload
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: Extra,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
            target: target.into(),
            html: false,
            glossary_id: None,
            extra: Extra::new(),
        }
    }

    pub fn with_html(mut self, html: bool) -> Self {
        self.html = html;
        self
    }

    pub fn with_glossary(mut self, glossary_id: impl Into<String>) -> Self {
        self.glossary_id = Some(glossary_id.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Check the request invariants before any vendor call
    pub fn validate(&self) -> Result<()> {
        validate_languages(&self.source, &self.target)
    }

    /// Detected source to report when the vendor gives none
    pub fn fallback_source(&self) -> String {
        fallback_source(&self.source)
    }
}

/// Outcome of one translation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub translated_text: String,
    /// Vendor-reported source language; falls back to the requested source
    pub detected_source: String,
    #[serde(default)]
    pub metadata: Extra,
}

/// Ordered multi-text translation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationBatchRequest {
    pub texts: Vec<String>,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub html: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glossary_id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: Extra,
}

impl TranslationBatchRequest {
    pub fn new<I, S>(texts: I, source: impl Into<String>, target: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            texts: texts.into_iter().map(Into::into).collect(),
            source: source.into(),
            target: target.into(),
            html: false,
            glossary_id: None,
            extra: Extra::new(),
        }
    }

    pub fn with_html(mut self, html: bool) -> Self {
        self.html = html;
        self
    }

    pub fn with_glossary(mut self, glossary_id: impl Into<String>) -> Self {
        self.glossary_id = Some(glossary_id.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.texts.is_empty() {
            return Err(Error::invalid_request("texts", "batch must contain at least one text"));
        }
        validate_languages(&self.source, &self.target)
    }

    pub fn fallback_source(&self) -> String {
        fallback_source(&self.source)
    }
}

/// Outcome of a batch translation; `translated_texts[i]` belongs to `texts[i]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationBatchResult {
    pub translated_texts: Vec<String>,
    pub detected_source: String,
    #[serde(default)]
    pub metadata: Extra,
}

/// Outcome of language detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageDetectionResult {
    /// Detected code, "und" when the vendor gives nothing
    pub language: String,
    /// Vendor-defined scale; 0.0 when the vendor has no notion of confidence
    pub confidence: f64,
    #[serde(default)]
    pub metadata: Extra,
}

impl LanguageDetectionResult {
    pub fn undetermined(metadata: Extra) -> Self {
        Self {
            language: UNDETERMINED.to_string(),
            confidence: 0.0,
            metadata,
        }
    }
}

/// Static feature flags of an engine adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineCapabilities {
    pub supports_glossary: bool,
    pub supports_html: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_chars_per_request: Option<usize>,
    #[serde(default)]
    pub metadata: Extra,
}

impl Default for EngineCapabilities {
    fn default() -> Self {
        Self {
            supports_glossary: false,
            supports_html: true,
            max_chars_per_request: None,
            metadata: Extra::new(),
        }
    }
}

fn fallback_source(source: &str) -> String {
    if is_auto(source) {
        AUTO.to_string()
    } else {
        source.to_string()
    }
}
