//! HTTP transport seam and its reqwest implementation
//!
//! Adapters only talk to `dyn HttpTransport`, so tests can inject a stub and
//! hosts can swap in their own client.

use std::time::{Duration, Instant};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use crate::http::{HttpRequest, HttpResponse, RequestBody};
use crate::{Error, Result};

/// Configuration for the HTTP client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: format!("tongues/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Issues one HTTP request and returns status plus raw body
///
/// Implementations must not treat 4xx/5xx as errors; the adapter decides.
/// Only failures that produce no response at all become `Error::Transport`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Pooled reqwest-backed transport shared by all engines
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: ReqwestClient,
}

impl ReqwestTransport {
    /// Create a new transport
    pub fn new(config: &HttpClientConfig) -> Result<Self> {
        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Transport {
                engine: String::new(),
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(Box::new(e)),
            })?;

        Ok(Self { client })
    }

    /// Create with default configuration
    pub fn with_default_config() -> Result<Self> {
        Self::new(&HttpClientConfig::default())
    }

    /// Wrap an already configured reqwest client
    pub fn from_client(client: ReqwestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = request.url()?;
        let engine = request.engine.clone();

        let mut builder = self.client.request(request.method.clone(), url.clone());
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(body),
            RequestBody::Form(pairs) => builder.form(pairs),
        };

        let started = Instant::now();
        let response = builder.send().await.map_err(|e| Error::Transport {
            engine: engine.clone(),
            message: transport_message(&e),
            source: Some(Box::new(e)),
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| Error::Transport {
            engine: engine.clone(),
            message: format!("Failed to read response body: {}", e),
            source: Some(Box::new(e)),
        })?;

        tracing::debug!(
            engine = %engine,
            method = %request.method,
            url = %redacted_url(&url),
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Vendor call completed"
        );

        Ok(HttpResponse { status, body })
    }
}

fn transport_message(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("request timed out: {}", error)
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    }
}

/// URL without query values, so keys passed as `?key=` stay out of logs
fn redacted_url(url: &reqwest::Url) -> String {
    let mut clean = url.clone();
    let names: Vec<String> = url.query_pairs().map(|(k, _)| k.into_owned()).collect();
    if names.is_empty() {
        return clean.to_string();
    }
    clean
        .query_pairs_mut()
        .clear()
        .extend_pairs(names.iter().map(|k| (k.as_str(), "***")));
    clean.to_string()
}
