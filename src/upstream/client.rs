//! Outbound HTTP client for the upstream analytics API.
//!
//! # Responsibilities
//! - Build `base_url + upstream_path` exactly as configured
//! - Forward the local query parameters, in order, repeats included
//! - Attach the configured `Authorization` value and nothing else from the local request
//! - Report transport failures and HTTP error statuses as distinct results
//!
//! # Design Decisions
//! - GET only; no request body
//! - No retries and no timeout unless one is configured
//! - HTTP error statuses are data for the caller, not failures

use std::time::Duration;

use axum::body::Bytes;
use axum::http::StatusCode;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::config::UpstreamConfig;

/// A 1xx/2xx/3xx upstream response.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// Outcome of a failed forward.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// DNS, connect, TLS, timeout or body read failure.
    #[error("upstream unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    /// Upstream answered with a 4xx/5xx status.
    #[error("upstream responded with {status}")]
    Status { status: StatusCode, body: Bytes },
}

/// Error building the client at startup.
#[derive(Debug, thiserror::Error)]
pub enum ClientBuildError {
    #[error("upstream token is not a valid header value")]
    InvalidToken(#[from] reqwest::header::InvalidHeaderValue),

    #[error("failed to build HTTP client: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Stateless upstream client; cheap to clone.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: String,
    authorization: HeaderValue,
}

impl UpstreamClient {
    /// Create a client from validated upstream settings.
    pub fn new(config: &UpstreamConfig) -> Result<Self, ClientBuildError> {
        let authorization = config.token.header_value()?;

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if !config.system_proxy {
            builder = builder.no_proxy();
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.clone(),
            authorization,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full upstream URL for a path, without any normalisation.
    pub fn url_for(&self, upstream_path: &str) -> String {
        format!("{}{}", self.base_url, upstream_path)
    }

    /// Issue one GET to the upstream. Every call goes to the network.
    pub async fn forward(
        &self,
        upstream_path: &str,
        query: &[(String, String)],
    ) -> Result<UpstreamResponse, UpstreamError> {
        let mut request = self
            .client
            .get(self.url_for(upstream_path))
            .header(AUTHORIZATION, self.authorization.clone());
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await.map_err(UpstreamError::Unreachable)?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response.bytes().await.map_err(UpstreamError::Unreachable)?;

        tracing::trace!(
            status = status.as_u16(),
            body_len = body.len(),
            "Upstream responded"
        );

        if status.is_client_error() || status.is_server_error() {
            return Err(UpstreamError::Status { status, body });
        }

        Ok(UpstreamResponse {
            status,
            content_type,
            body,
        })
    }
}
