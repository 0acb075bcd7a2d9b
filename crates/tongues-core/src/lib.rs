//! Tongues Core - one translation API over several machine-translation vendors
//!
//! This crate wraps LibreTranslate, DeepL, Google Cloud Translation and
//! Microsoft Translator behind a single async engine contract, with optional
//! content-addressed caching of vendor responses.
//!
//! # Main Components
//!
//! - **Engine Contract**: `TranslatorEngine`, implemented once per vendor
//! - **Vendor Adapters**: wire mapping and response normalization per vendor
//! - **Response Cache**: memoizes raw vendor responses in an injected store
//! - **Registry & Manager**: named engines built once from configuration
//! - **Identity**: `stable_id` keys for external string catalogs
//!
//! # Example
//!
//! ```no_run
//! use tongues_core::{EngineConfig, EngineType, TranslationRequest, TranslatorConfig, TranslatorManager};
//!
//! # async fn example() -> tongues_core::Result<()> {
//! let config = TranslatorConfig {
//!     default_engine: "libre_local".into(),
//!     engines: vec![EngineConfig::new("libre_local", EngineType::Libre).with_base_uri("http://localhost:5000")],
//!     ..Default::default()
//! };
//!
//! let manager = TranslatorManager::from_config(&config, None)?;
//! let result = manager
//!     .default_engine()?
//!     .translate(&TranslationRequest::new("Hello", "en", "es"))
//!     .await?;
//! println!("{}", result.translated_text);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod engine;
pub mod engines;
pub mod error;
pub mod http;
pub mod identity;
pub mod manager;
pub mod registry;
pub mod types;

// Re-export main types for convenience
pub use cache::{CacheStore, MemoryCacheStore, ResponseCache};
pub use config::{CacheConfig, EngineConfig, EngineType, TranslatorConfig};
pub use engine::TranslatorEngine;
pub use engines::{BingEngine, DeepLEngine, EngineContext, GoogleEngine, LibreEngine};
pub use error::{Error, ErrorClassification, Result};
pub use http::{HttpClientConfig, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use identity::{content_hash, stable_id};
pub use manager::TranslatorManager;
pub use registry::{build_registry, RegistryBuilder, TranslatorRegistry};
pub use types::{
    EngineCapabilities, Extra, LanguageDetectionResult, TranslationBatchRequest,
    TranslationBatchResult, TranslationRequest, TranslationResult, AUTO, UNDETERMINED,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
