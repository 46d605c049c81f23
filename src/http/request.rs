//! Request handling.
//!
//! # Responsibilities
//! - Reduce the local request to its path and ordered query parameters
//! - Provide the request ID header used for log correlation
//!
//! # Design Decisions
//! - Headers are not part of `ProxyRequest`; nothing from them reaches the upstream
//! - Query parameters keep their order and repeated keys

use axum::http::{HeaderMap, HeaderName, Uri};

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// The parts of a local request the gateway forwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRequest {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl ProxyRequest {
    pub fn from_uri(uri: &Uri) -> Self {
        let query = uri
            .query()
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default();

        Self {
            path: uri.path().to_string(),
            query,
        }
    }
}

/// Request ID set by the request-id layer, or "unknown".
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}
