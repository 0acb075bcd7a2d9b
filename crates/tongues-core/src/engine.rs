//! The contract every vendor adapter fulfils

use async_trait::async_trait;
use crate::types::{
    EngineCapabilities, LanguageDetectionResult, TranslationBatchRequest, TranslationBatchResult,
    TranslationRequest, TranslationResult,
};
use crate::Result;

/// Uniform translation API over one configured vendor endpoint
///
/// Adapters are immutable after construction and safe to share across tasks
/// behind an `Arc`. A failed call never leaves partial state behind.
#[async_trait]
pub trait TranslatorEngine: Send + Sync {
    /// Registry name of this instance (e.g. `deepl_free`)
    fn name(&self) -> &str;

    /// Vendor identifier (`libre`, `deepl`, `google`, `bing`)
    fn vendor(&self) -> &'static str;

    /// Translate one text
    async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult>;

    /// Translate several texts in one vendor call, preserving order
    async fn translate_batch(&self, request: &TranslationBatchRequest) -> Result<TranslationBatchResult>;

    /// Identify the language of `text`
    async fn detect(&self, text: &str) -> Result<LanguageDetectionResult>;

    /// Static feature flags; never performs I/O
    fn capabilities(&self) -> EngineCapabilities;
}
