//! Declarative engine configuration
//!
//! A `TranslatorConfig` is read once at startup and turned into long-lived
//! adapters by `registry::build_registry`. Nothing here is consulted again
//! after that.

use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;
use regex::Regex;
use serde::{Deserialize, Serialize};
use crate::http::HttpClientConfig;
use crate::{Error, Result};

pub const DEEPL_FREE_HOST: &str = "https://api-free.deepl.com";
pub const DEEPL_PRO_HOST: &str = "https://api.deepl.com";
pub const GOOGLE_HOST: &str = "https://translation.googleapis.com";
pub const BING_HOST: &str = "https://api.cognitive.microsofttranslator.com";

/// Supported vendors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineType {
    Libre,
    Deepl,
    Google,
    Bing,
}

impl EngineType {
    /// Stable lowercase identifier, also used as the cache-key vendor segment
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineType::Libre => "libre",
            EngineType::Deepl => "deepl",
            EngineType::Google => "google",
            EngineType::Bing => "bing",
        }
    }

    pub fn requires_api_key(&self) -> bool {
        !matches!(self, EngineType::Libre)
    }
}

impl fmt::Display for EngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Setup for one named engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Unique key callers use to look the engine up
    pub name: String,

    #[serde(rename = "type")]
    pub engine_type: EngineType,

    /// Explicit host; inferred for deepl/google/bing when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_uri: Option<String>,

    /// API key, may reference `${ENV:NAME}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Azure region (bing)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// DeepL plan: "free" or "pro"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
}

impl EngineConfig {
    pub fn new(name: impl Into<String>, engine_type: EngineType) -> Self {
        Self {
            name: name.into(),
            engine_type,
            base_uri: None,
            api_key: None,
            region: None,
            plan: None,
        }
    }

    pub fn with_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.base_uri = Some(base_uri.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_plan(mut self, plan: impl Into<String>) -> Self {
        self.plan = Some(plan.into());
        self
    }

    /// Base URI to use, inferring the vendor's default host when none is set
    pub fn resolved_base_uri(&self) -> Result<String> {
        if let Some(base_uri) = self.base_uri.as_deref().map(str::trim).filter(|b| !b.is_empty()) {
            return Ok(base_uri.to_string());
        }

        match self.engine_type {
            EngineType::Deepl => {
                let plan = self.plan.as_deref().unwrap_or("free");
                if plan.eq_ignore_ascii_case("pro") {
                    Ok(DEEPL_PRO_HOST.to_string())
                } else {
                    Ok(DEEPL_FREE_HOST.to_string())
                }
            }
            EngineType::Google => Ok(GOOGLE_HOST.to_string()),
            EngineType::Bing => Ok(BING_HOST.to_string()),
            EngineType::Libre => Err(Error::config(format!(
                "Engine '{}': LibreTranslate is self-hosted, base_uri is required",
                self.name
            ))),
        }
    }

    /// API key with `${ENV:NAME}` references expanded; `None` when unset or blank
    pub fn resolved_api_key(&self) -> Result<Option<String>> {
        match self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
            Some(raw) => {
                let expanded = expand_env_vars(raw)?;
                Ok(Some(expanded).filter(|k| !k.trim().is_empty()))
            }
            None => Ok(None),
        }
    }

    /// Check the fields this engine type requires
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::config("Engine name must not be empty"));
        }
        self.resolved_base_uri()?;
        if self.engine_type.requires_api_key() && self.resolved_api_key()?.is_none() {
            return Err(Error::config(format!(
                "Engine '{}': api_key is required for {} engines",
                self.name, self.engine_type
            )));
        }
        Ok(())
    }
}

/// Response cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Attach the in-memory store when no store is injected
    pub enabled: bool,
    /// Seconds; 0 stores forever
    pub ttl: u64,
    /// In-memory store capacity
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ttl: 0,
            capacity: 10_000,
        }
    }
}

fn default_engine_name() -> String {
    "default".to_string()
}

/// Complete translator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    /// Engine used when the caller does not name one
    #[serde(default = "default_engine_name")]
    pub default_engine: String,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub http: HttpClientConfig,

    /// Engines in registration order
    #[serde(default)]
    pub engines: Vec<EngineConfig>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            default_engine: default_engine_name(),
            cache: CacheConfig::default(),
            http: HttpClientConfig::default(),
            engines: Vec::new(),
        }
    }
}

impl TranslatorConfig {
    /// Enforce unique names and per-type required fields
    ///
    /// The default engine name is deliberately not checked here; an
    /// unregistered default fails at first use.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for engine in &self.engines {
            if !seen.insert(engine.name.as_str()) {
                return Err(Error::config(format!("Duplicate engine name '{}'", engine.name)));
            }
            engine.validate()?;
        }
        Ok(())
    }

    /// Engine names in configuration order
    pub fn engine_names(&self) -> Vec<&str> {
        self.engines.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn engine(&self, name: &str) -> Option<&EngineConfig> {
        self.engines.iter().find(|e| e.name == name)
    }
}

static ENV_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Expand environment variables in the format ${ENV:VAR_NAME}
pub fn expand_env_vars(value: &str) -> Result<String> {
    let re = ENV_PATTERN.get_or_init(|| {
        Regex::new(r"\$\{ENV:([^}]+)\}").expect("Valid regex pattern")
    });

    let mut result = value.to_string();
    for cap in re.captures_iter(value) {
        let var_name = &cap[1];
        let env_value = std::env::var(var_name).map_err(|_| {
            Error::config(format!("Environment variable {} not found", var_name))
        })?;

        let pattern = format!("${{ENV:{}}}", var_name);
        result = result.replace(&pattern, &env_value);
    }

    Ok(result)
}
