//! Authentication handling for vendor APIs
//!
//! Every vendor puts its key somewhere different:
//! - DeepL: `Authorization: DeepL-Auth-Key <key>` header
//! - Bing: `Ocp-Apim-Subscription-Key` header, plus a region header
//! - Google: `key` query parameter
//! - LibreTranslate: optional `api_key` field in the JSON body
//!
//! Handlers run after the cache key has been computed, so keys never end up
//! in cache keys.

use std::fmt;
use serde_json::Value;
use crate::config::EngineType;
use crate::http::{HttpRequest, RequestBody};
use crate::{Error, Result};

/// Trait for applying vendor-specific authentication to a request
pub trait AuthHandler: Send + Sync + fmt::Debug {
    /// Apply authentication to the outgoing request
    fn apply_auth(&self, request: &mut HttpRequest) -> Result<()>;
}

/// No credentials (self-hosted LibreTranslate without a key)
#[derive(Debug, Clone, Default)]
pub struct NoAuth;

impl AuthHandler for NoAuth {
    fn apply_auth(&self, _request: &mut HttpRequest) -> Result<()> {
        Ok(())
    }
}

/// Static headers carrying the credentials
#[derive(Clone)]
pub struct HeaderAuth {
    headers: Vec<(String, String)>,
}

impl HeaderAuth {
    pub fn new(headers: Vec<(String, String)>) -> Self {
        Self { headers }
    }

    /// DeepL authentication header
    pub fn deepl(api_key: &str) -> Self {
        Self::new(vec![(
            "Authorization".to_string(),
            format!("DeepL-Auth-Key {}", api_key),
        )])
    }

    /// Microsoft Translator subscription key, with an optional region
    pub fn bing(api_key: &str, region: Option<&str>) -> Self {
        let mut headers = vec![(
            "Ocp-Apim-Subscription-Key".to_string(),
            api_key.to_string(),
        )];
        if let Some(region) = region.filter(|r| !r.is_empty()) {
            headers.push(("Ocp-Apim-Subscription-Region".to_string(), region.to_string()));
        }
        Self::new(headers)
    }
}

impl fmt::Debug for HeaderAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.headers.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("HeaderAuth").field("headers", &names).finish()
    }
}

impl AuthHandler for HeaderAuth {
    fn apply_auth(&self, request: &mut HttpRequest) -> Result<()> {
        for (key, value) in &self.headers {
            request.headers.push((key.clone(), value.clone()));
        }
        Ok(())
    }
}

/// Key passed as a query-string parameter
#[derive(Clone)]
pub struct QueryKeyAuth {
    param: String,
    api_key: String,
}

impl QueryKeyAuth {
    pub fn new(param: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            param: param.into(),
            api_key: api_key.into(),
        }
    }

    /// Google Cloud Translation `?key=`
    pub fn google(api_key: &str) -> Self {
        Self::new("key", api_key)
    }
}

impl fmt::Debug for QueryKeyAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryKeyAuth")
            .field("param", &self.param)
            .field("api_key", &"***")
            .finish()
    }
}

impl AuthHandler for QueryKeyAuth {
    fn apply_auth(&self, request: &mut HttpRequest) -> Result<()> {
        request.query.push((self.param.clone(), self.api_key.clone()));
        Ok(())
    }
}

/// Key merged into the JSON body
#[derive(Clone)]
pub struct BodyFieldAuth {
    field: String,
    api_key: String,
}

impl BodyFieldAuth {
    pub fn new(field: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            api_key: api_key.into(),
        }
    }

    /// LibreTranslate `api_key` body field
    pub fn libre(api_key: &str) -> Self {
        Self::new("api_key", api_key)
    }
}

impl fmt::Debug for BodyFieldAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyFieldAuth")
            .field("field", &self.field)
            .field("api_key", &"***")
            .finish()
    }
}

impl AuthHandler for BodyFieldAuth {
    fn apply_auth(&self, request: &mut HttpRequest) -> Result<()> {
        match &mut request.body {
            RequestBody::Json(Value::Object(map)) => {
                map.insert(self.field.clone(), Value::String(self.api_key.clone()));
                Ok(())
            }
            RequestBody::Form(pairs) => {
                pairs.push((self.field.clone(), self.api_key.clone()));
                Ok(())
            }
            _ => Err(Error::Transport {
                engine: request.engine.clone(),
                message: format!("Cannot add '{}' to a request without an object body", self.field),
                source: None,
            }),
        }
    }
}

/// Factory for the auth handler an engine type needs
pub fn create_auth_handler(
    engine_type: EngineType,
    api_key: Option<&str>,
    region: Option<&str>,
) -> Box<dyn AuthHandler> {
    let api_key = api_key.filter(|k| !k.trim().is_empty());

    match (engine_type, api_key) {
        (_, None) => Box::new(NoAuth),
        (EngineType::Libre, Some(key)) => Box::new(BodyFieldAuth::libre(key)),
        (EngineType::Deepl, Some(key)) => Box::new(HeaderAuth::deepl(key)),
        (EngineType::Google, Some(key)) => Box::new(QueryKeyAuth::google(key)),
        (EngineType::Bing, Some(key)) => Box::new(HeaderAuth::bing(key, region)),
    }
}
