//! Caller-facing facade over the registry

use std::sync::Arc;
use crate::cache::CacheStore;
use crate::config::TranslatorConfig;
use crate::engine::TranslatorEngine;
use crate::http::{HttpTransport, ReqwestTransport};
use crate::registry::{build_registry, TranslatorRegistry};
use crate::Result;

/// Delegates to a shared `TranslatorRegistry`; cheap to clone
#[derive(Debug, Clone)]
pub struct TranslatorManager {
    registry: Arc<TranslatorRegistry>,
}

impl TranslatorManager {
    pub fn new(registry: Arc<TranslatorRegistry>) -> Self {
        Self { registry }
    }

    /// Build a manager with the reqwest transport
    pub fn from_config(config: &TranslatorConfig, cache_store: Option<Arc<dyn CacheStore>>) -> Result<Self> {
        let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new(&config.http)?);
        Self::with_transport(config, transport, cache_store)
    }

    pub fn with_transport(
        config: &TranslatorConfig,
        transport: Arc<dyn HttpTransport>,
        cache_store: Option<Arc<dyn CacheStore>>,
    ) -> Result<Self> {
        let registry = build_registry(config, transport, cache_store)?;
        Ok(Self::new(Arc::new(registry)))
    }

    /// The default engine
    pub fn default_engine(&self) -> Result<Arc<dyn TranslatorEngine>> {
        self.registry.get_default()
    }

    /// An engine by name
    pub fn by(&self, name: &str) -> Result<Arc<dyn TranslatorEngine>> {
        self.registry.get(name)
    }

    /// Registered names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.registry.names()
    }

    pub fn default_name(&self) -> &str {
        self.registry.default_name()
    }

    pub fn registry(&self) -> &Arc<TranslatorRegistry> {
        &self.registry
    }
}
