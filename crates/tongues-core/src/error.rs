//! Error types for the tongues core library
//!
//! This module defines the error taxonomy shared by every engine adapter,
//! the registry and the response cache. Callers inspect the variant, never
//! the message text.

use std::fmt;
use thiserror::Error;
use serde::{Deserialize, Serialize};

/// Main error type for tongues operations
#[derive(Error, Debug)]
pub enum Error {
    /// Vendor answered with a status code >= 400
    #[error("Engine '{engine}' returned HTTP {status_code}: {body}")]
    EngineHttp {
        engine: String,
        status_code: u16,
        body: String,
    },

    /// No adapter registered under the requested name
    #[error("Translator engine not found: {name}")]
    EngineNotFound {
        name: String,
    },

    /// The request never produced a vendor response (connect, timeout, TLS, build)
    #[error("Transport error for engine '{engine}': {message}")]
    Transport {
        engine: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A successful vendor response whose body is not JSON at all
    #[error("Invalid response from engine '{engine}': {message}")]
    InvalidResponse {
        engine: String,
        message: String,
    },

    /// A batch response did not carry one translation per input text
    #[error("Engine '{engine}' returned {received} translations for {expected} texts")]
    IncompleteBatch {
        engine: String,
        expected: usize,
        received: usize,
    },

    /// Request data failed validation before any vendor call
    #[error("Invalid request: {field} - {message}")]
    InvalidRequest {
        field: String,
        message: String,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Cache store failures
    #[error("Cache error: {message}")]
    Cache {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic internal error with context
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of vendor HTTP failures
///
/// Informational only: the core never retries, but callers that run their own
/// backoff can use it to decide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClassification {
    /// 4xx other than auth and rate limiting
    ClientError,
    /// 5xx
    ServerError,
    /// 429
    RateLimitError,
    /// 401 and 403
    AuthenticationError,
    /// Anything else
    Unknown,
}

impl ErrorClassification {
    /// Classify an HTTP status code
    pub fn from_status(status_code: u16) -> Self {
        match status_code {
            401 | 403 => ErrorClassification::AuthenticationError,
            429 => ErrorClassification::RateLimitError,
            400..=499 => ErrorClassification::ClientError,
            500..=599 => ErrorClassification::ServerError,
            _ => ErrorClassification::Unknown,
        }
    }
}

impl fmt::Display for ErrorClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorClassification::ClientError => write!(f, "client_error"),
            ErrorClassification::ServerError => write!(f, "server_error"),
            ErrorClassification::RateLimitError => write!(f, "rate_limited"),
            ErrorClassification::AuthenticationError => write!(f, "authentication"),
            ErrorClassification::Unknown => write!(f, "unknown"),
        }
    }
}

impl Error {
    /// Create a configuration error without a source
    pub fn config(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create an invalid-request error
    pub fn invalid_request(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidRequest {
            field: field.into(),
            message: message.into(),
        }
    }

    /// HTTP status code for vendor failures
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::EngineHttp { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// Classification for vendor failures
    pub fn classification(&self) -> Option<ErrorClassification> {
        self.status_code().map(ErrorClassification::from_status)
    }

    /// Whether this is a user-facing configuration problem
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::EngineNotFound { .. } | Error::Configuration { .. })
    }

    /// Human-readable message from a vendor error body, when one can be found
    pub fn vendor_message(&self) -> Option<String> {
        match self {
            Error::EngineHttp { body, .. } => Some(extract_vendor_message(body)),
            _ => None,
        }
    }
}

/// Pull the vendor's own message out of an error body
///
/// Google nests it under `error.message`, Libre uses a plain `error` string and
/// DeepL and Bing put it under `message` or `error.message`. Falls back to the raw body.
fn extract_vendor_message(body: &str) -> String {
    let json = match serde_json::from_str::<serde_json::Value>(body) {
        Ok(json) => json,
        Err(_) => return body.to_string(),
    };

    if let Some(error) = json.get("error") {
        if let Some(message) = error.get("message").and_then(|m| m.as_str()) {
            return message.to_string();
        }
        if let Some(message) = error.as_str() {
            return message.to_string();
        }
    }

    if let Some(message) = json.get("message").and_then(|m| m.as_str()) {
        return message.to_string();
    }

    body.to_string()
}

// Conversion implementations
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal {
            message: err.to_string(),
            source: err,
        }
    }
}
