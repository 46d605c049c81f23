//! Gateway-level failures and their local responses.
//!
//! Upstream 4xx/5xx statuses are not listed here: they are relayed, not failures.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("upstream unreachable: {0}")]
    UpstreamUnreachable(#[source] reqwest::Error),

    #[error("upstream timed out: {0}")]
    UpstreamTimeout(#[source] reqwest::Error),

    #[error("upstream returned {status} with a body that is not JSON")]
    UpstreamContractViolation {
        status: StatusCode,
        content_type: Option<String>,
        #[source]
        source: serde_json::Error,
    },

    #[error("no route matches '{0}'")]
    RouteNotFound(String),
}

impl GatewayError {
    /// Local status code for this failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::UpstreamUnreachable(_) => StatusCode::BAD_GATEWAY,
            GatewayError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::UpstreamContractViolation { .. } => StatusCode::BAD_GATEWAY,
            GatewayError::RouteNotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Short machine-readable label, also used as the metrics `kind`.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::UpstreamUnreachable(_) => "unreachable",
            GatewayError::UpstreamTimeout(_) => "timeout",
            GatewayError::UpstreamContractViolation { .. } => "contract_violation",
            GatewayError::RouteNotFound(_) => "not_found",
        }
    }

    fn public_message(&self) -> String {
        match self {
            GatewayError::UpstreamUnreachable(_) => "Upstream request failed".to_string(),
            GatewayError::UpstreamTimeout(_) => "Upstream request timed out".to_string(),
            GatewayError::UpstreamContractViolation { status, .. } => {
                format!("Upstream returned an invalid response (status {})", status.as_u16())
            }
            GatewayError::RouteNotFound(path) => format!("No route matches '{path}'"),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "error": self.kind(),
            "message": self.public_message(),
        }));
        (self.status_code(), body).into_response()
    }
}
