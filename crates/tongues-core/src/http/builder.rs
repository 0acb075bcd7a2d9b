//! HTTP request description for vendor API calls
//!
//! Adapters describe what to send; the transport decides how.

use reqwest::{Method, Url};
use serde_json::Value;
use crate::{Error, Result};

/// Request payload encoding
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    /// `application/json`
    Json(Value),
    /// `application/x-www-form-urlencoded`, keys may repeat
    Form(Vec<(String, String)>),
}

/// A single vendor call
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Engine name, used for diagnostics and error attribution
    pub engine: String,
    pub method: Method,
    pub base_uri: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl HttpRequest {
    /// Create a new request against `base_uri` + `path`
    pub fn new(
        engine: impl Into<String>,
        method: Method,
        base_uri: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            engine: engine.into(),
            method,
            base_uri: base_uri.into(),
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    /// Shorthand for a POST request
    pub fn post(engine: impl Into<String>, base_uri: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(engine, Method::POST, base_uri, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn form(mut self, pairs: Vec<(String, String)>) -> Self {
        self.body = RequestBody::Form(pairs);
        self
    }

    /// Look up a query parameter by name
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Look up a header by name, ignoring case
    pub fn header_value(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Build the full URL including query parameters
    ///
    /// The path is appended to the base URI rather than resolved against it,
    /// so a base like `https://host/libre` keeps its prefix.
    pub fn url(&self) -> Result<Url> {
        let joined = format!(
            "{}/{}",
            self.base_uri.trim_end_matches('/'),
            self.path.trim_start_matches('/')
        );

        let mut url = Url::parse(&joined).map_err(|e| Error::Transport {
            engine: self.engine.clone(),
            message: format!("Invalid URL: {}", joined),
            source: Some(Box::new(e)),
        })?;

        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.iter());
        }

        Ok(url)
    }
}

/// Raw vendor response
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Status >= 400
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }

    /// Decode the body as JSON
    pub fn json(&self, engine: &str) -> Result<Value> {
        serde_json::from_str(&self.body).map_err(|e| Error::InvalidResponse {
            engine: engine.to_string(),
            message: format!("body is not JSON ({}): {}", e, truncate(&self.body, 200)),
        })
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Flatten a JSON object into form pairs
///
/// Arrays repeat their key (`text=a&text=b`), booleans become `1`/`0`,
/// nulls are dropped and nested objects are sent as JSON strings.
pub fn form_pairs(payload: &Value) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let Some(object) = payload.as_object() else {
        return pairs;
    };

    for (key, value) in object {
        match value {
            Value::Array(items) => {
                for item in items {
                    if let Some(scalar) = form_scalar(item) {
                        pairs.push((key.clone(), scalar));
                    }
                }
            }
            other => {
                if let Some(scalar) = form_scalar(other) {
                    pairs.push((key.clone(), scalar));
                }
            }
        }
    }

    pairs
}

fn form_scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}
