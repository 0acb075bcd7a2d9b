//! Engine registry
//!
//! Built once at startup from configuration and immutable afterwards. Lookup
//! of an unknown name, including an unregistered default, fails with
//! `Error::EngineNotFound` at the time of the lookup.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};
use crate::cache::{CacheStore, MemoryCacheStore};
use crate::config::{EngineConfig, EngineType, TranslatorConfig};
use crate::engine::TranslatorEngine;
use crate::engines::{BingEngine, DeepLEngine, GoogleEngine, LibreEngine};
use crate::http::HttpTransport;
use crate::{Error, Result};

/// Name to engine mapping plus the configured default
pub struct TranslatorRegistry {
    engines: Vec<Arc<dyn TranslatorEngine>>,
    index: HashMap<String, usize>,
    default_name: String,
}

impl TranslatorRegistry {
    pub fn builder(default_name: impl Into<String>) -> RegistryBuilder {
        RegistryBuilder {
            default_name: default_name.into(),
            engines: Vec::new(),
        }
    }

    /// Look up an engine by its configured name
    pub fn get(&self, name: &str) -> Result<Arc<dyn TranslatorEngine>> {
        self.index
            .get(name)
            .map(|&i| Arc::clone(&self.engines[i]))
            .ok_or_else(|| Error::EngineNotFound { name: name.to_string() })
    }

    /// `get(default_name)`
    pub fn get_default(&self) -> Result<Arc<dyn TranslatorEngine>> {
        self.get(&self.default_name)
    }

    /// Registered names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.engines.iter().map(|engine| engine.name()).collect()
    }

    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Engines in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn TranslatorEngine>> {
        self.engines.iter()
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}

impl std::fmt::Debug for TranslatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslatorRegistry")
            .field("engines", &self.names())
            .field("default_name", &self.default_name)
            .finish()
    }
}

/// Collects engines before freezing them into a registry
pub struct RegistryBuilder {
    default_name: String,
    engines: Vec<Arc<dyn TranslatorEngine>>,
}

impl RegistryBuilder {
    pub fn register(mut self, engine: Arc<dyn TranslatorEngine>) -> Self {
        self.engines.push(engine);
        self
    }

    /// Freeze the registry; duplicate names are a configuration error
    pub fn build(self) -> Result<TranslatorRegistry> {
        let mut index = HashMap::with_capacity(self.engines.len());
        for (i, engine) in self.engines.iter().enumerate() {
            if index.insert(engine.name().to_string(), i).is_some() {
                return Err(Error::config(format!("Duplicate engine name '{}'", engine.name())));
            }
        }

        if !index.contains_key(&self.default_name) {
            warn!(default = %self.default_name, "Default engine is not registered");
        }

        Ok(TranslatorRegistry {
            engines: self.engines,
            index,
            default_name: self.default_name,
        })
    }
}

/// Construct the adapter for one configured engine
pub fn create_engine(
    config: &EngineConfig,
    transport: Arc<dyn HttpTransport>,
    cache_store: Option<Arc<dyn CacheStore>>,
    cache_ttl: u64,
) -> Result<Arc<dyn TranslatorEngine>> {
    let engine: Arc<dyn TranslatorEngine> = match config.engine_type {
        EngineType::Libre => Arc::new(LibreEngine::from_config(config, transport, cache_store, cache_ttl)?),
        EngineType::Deepl => Arc::new(DeepLEngine::from_config(config, transport, cache_store, cache_ttl)?),
        EngineType::Google => Arc::new(GoogleEngine::from_config(config, transport, cache_store, cache_ttl)?),
        EngineType::Bing => Arc::new(BingEngine::from_config(config, transport, cache_store, cache_ttl)?),
    };
    Ok(engine)
}

/// Build the registry for a configuration
///
/// An injected `cache_store` wins; otherwise an in-memory store is created
/// when `cache.enabled` is set. Without either, engines call through.
pub fn build_registry(
    config: &TranslatorConfig,
    transport: Arc<dyn HttpTransport>,
    cache_store: Option<Arc<dyn CacheStore>>,
) -> Result<TranslatorRegistry> {
    config.validate()?;

    let cache_store = cache_store.or_else(|| {
        config
            .cache
            .enabled
            .then(|| Arc::new(MemoryCacheStore::new(config.cache.capacity)) as Arc<dyn CacheStore>)
    });

    let mut builder = TranslatorRegistry::builder(config.default_engine.clone());
    for engine_config in &config.engines {
        let engine = create_engine(engine_config, Arc::clone(&transport), cache_store.clone(), config.cache.ttl)?;
        debug!(
            engine = %engine_config.name,
            vendor = %engine_config.engine_type,
            cached = cache_store.is_some(),
            "Registered engine"
        );
        builder = builder.register(engine);
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::testing::CannedTransport;

    fn config() -> TranslatorConfig {
        TranslatorConfig {
            default_engine: "libre_local".into(),
            engines: vec![
                EngineConfig::new("libre_local", EngineType::Libre).with_base_uri("http://localhost:5000"),
                EngineConfig::new("deepl_free", EngineType::Deepl).with_api_key("k"),
                EngineConfig::new("google", EngineType::Google).with_api_key("g"),
                EngineConfig::new("bing", EngineType::Bing).with_api_key("b"),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_build_preserves_order() {
        let registry = build_registry(&config(), CannedTransport::with(vec![]), None).unwrap();
        assert_eq!(registry.names(), vec!["libre_local", "deepl_free", "google", "bing"]);
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.get("deepl_free").unwrap().vendor(), "deepl");
        assert_eq!(registry.get_default().unwrap().name(), "libre_local");
    }

    #[test]
    fn test_missing_engine() {
        let registry = build_registry(&config(), CannedTransport::with(vec![]), None).unwrap();
        let err = registry.get("missing").err().unwrap();
        assert!(matches!(err, Error::EngineNotFound { ref name } if name == "missing"));
        assert_eq!(err.to_string(), "Translator engine not found: missing");
    }

    #[test]
    fn test_unregistered_default_fails_on_use() {
        let mut config = config();
        config.default_engine = "default".into();
        let registry = build_registry(&config, CannedTransport::with(vec![]), None).unwrap();
        assert!(matches!(registry.get_default(), Err(Error::EngineNotFound { .. })));
    }

    #[test]
    fn test_invalid_config_fails_build() {
        let mut config = config();
        config.engines.push(EngineConfig::new("google_2", EngineType::Google));
        let err = build_registry(&config, CannedTransport::with(vec![]), None).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_builder_rejects_duplicates() {
        let transport: Arc<dyn HttpTransport> = CannedTransport::with(vec![]);
        let engine_config = EngineConfig::new("x", EngineType::Libre).with_base_uri("http://a");
        let a = create_engine(&engine_config, transport.clone(), None, 0).unwrap();
        let b = create_engine(&engine_config, transport, None, 0).unwrap();

        let result = TranslatorRegistry::builder("x").register(a).register(b).build();
        assert!(result.unwrap_err().is_configuration());
    }

    #[test]
    fn test_empty_registry() {
        let registry = TranslatorRegistry::builder("default").build().unwrap();
        assert!(registry.is_empty());
        assert!(registry.names().is_empty());
        assert!(registry.get_default().is_err());
    }
}
