//! REST client for the participant-tracking backend.
//!
//! Every request goes through the [`Backend`] trait so views, forms and the
//! chat transcript can be driven by the real HTTP transport ([`HttpBackend`])
//! or by an in-memory double in tests. Entity CRUD is layered on top by
//! [`Resource`], and the remaining endpoints (dashboard aggregates, module
//! progress, assignments) live in [`endpoints`].

pub mod endpoints;
pub mod http;
pub mod resource;

use std::fmt;

use serde_json::Value;
use thiserror::Error;

pub use http::HttpBackend;
pub use resource::Resource;

/// Query-string filters passed through verbatim on list operations.
pub type Filters = Vec<(String, String)>;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// HTTP verbs used by the backend surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single request against the backend, relative to its base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below the base URL, always starting with `/`.
    pub path: String,
    pub query: Filters,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Put,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::Delete,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Attach query-string pairs (list filters).
    pub fn with_query(mut self, query: &[(String, String)]) -> Self {
        self.query.extend(query.iter().cloned());
        self
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure of a backend operation.
///
/// Transport failures and non-2xx statuses are kept apart so callers can
/// tell "backend unreachable" from "backend said no".
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{method} {url} returned HTTP {status}: {body}")]
    Status {
        method: Method,
        url: String,
        status: u16,
        body: String,
    },

    #[error("unexpected response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl ApiError {
    /// HTTP status code, when the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the request never got an answer from the backend.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

// ---------------------------------------------------------------------------
// Transport seam
// ---------------------------------------------------------------------------

/// Executes [`ApiRequest`]s and returns the decoded JSON body.
///
/// An empty 2xx body decodes to [`Value::Null`]. Implementations must be
/// shareable across threads: the dashboard issues its two requests
/// concurrently.
pub trait Backend: Send + Sync {
    fn send(&self, request: &ApiRequest) -> Result<Value, ApiError>;

    /// Base URL used for error messages and diagnostics.
    fn base_url(&self) -> &str;
}

/// Decode a JSON body into `T`, reporting the request path on failure.
pub(crate) fn decode<T: serde::de::DeserializeOwned>(
    backend: &dyn Backend,
    path: &str,
    value: Value,
) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode {
        url: format!("{}{}", backend.base_url(), path),
        message: e.to_string(),
    })
}
