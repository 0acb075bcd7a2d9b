//! HTTP plumbing between engine adapters and vendor APIs
//!
//! This module provides:
//! - A vendor-neutral request description (`HttpRequest`) with JSON or form bodies
//! - The `HttpTransport` seam, with a pooled reqwest implementation
//! - Per-vendor authentication handlers applied just before sending

pub mod builder;
pub mod auth;
pub mod client;

pub use builder::{HttpRequest, HttpResponse, RequestBody, form_pairs};
pub use auth::{AuthHandler, NoAuth, HeaderAuth, QueryKeyAuth, BodyFieldAuth, create_auth_handler};
pub use client::{HttpTransport, ReqwestTransport, HttpClientConfig};

// Re-export commonly used types
pub use reqwest::Method;
