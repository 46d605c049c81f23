//! Upstream response normalisation.
//!
//! # Responsibilities
//! - Relay upstream error statuses with their body bytes untouched
//! - Relay 204 (and other empty successes) without JSON decoding
//! - Parse non-empty successes as JSON and re-emit them
//! - Map transport failures and non-JSON successes to gateway errors
//!
//! # Design Decisions
//! - Cases are checked in order: error status, 204, empty body, JSON
//! - Error bodies are never parsed; they may not be JSON

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::error::GatewayError;
use crate::upstream::{UpstreamError, UpstreamResponse};

/// Local view of an upstream response.
#[derive(Debug, Clone, PartialEq)]
pub enum ProxiedResponse {
    /// Parsed JSON payload from a successful upstream response.
    Json {
        status: StatusCode,
        body: serde_json::Value,
    },
    /// Upstream bytes passed through untouched.
    Raw { status: StatusCode, body: Bytes },
}

impl ProxiedResponse {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxiedResponse::Json { status, .. } | ProxiedResponse::Raw { status, .. } => *status,
        }
    }
}

impl IntoResponse for ProxiedResponse {
    fn into_response(self) -> Response {
        match self {
            ProxiedResponse::Json { status, body } => (status, Json(body)).into_response(),
            ProxiedResponse::Raw { status, body } if body.is_empty() => {
                let mut response = Response::new(Body::empty());
                *response.status_mut() = status;
                response
            }
            ProxiedResponse::Raw { status, body } => {
                let mut response = Response::new(Body::from(body));
                *response.status_mut() = status;
                response.headers_mut().insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("text/plain; charset=utf-8"),
                );
                response
            }
        }
    }
}

/// Normalise an upstream status and body.
pub fn normalize(
    status: StatusCode,
    body: Bytes,
    content_type: Option<&str>,
) -> Result<ProxiedResponse, GatewayError> {
    if status.is_client_error() || status.is_server_error() || status == StatusCode::NO_CONTENT {
        return Ok(ProxiedResponse::Raw { status, body });
    }

    if body.is_empty() {
        tracing::warn!(
            status = status.as_u16(),
            "Upstream returned an empty body on a non-204 success"
        );
        return Ok(ProxiedResponse::Raw { status, body });
    }

    match serde_json::from_slice(&body) {
        Ok(value) => Ok(ProxiedResponse::Json {
            status,
            body: value,
        }),
        Err(source) => Err(GatewayError::UpstreamContractViolation {
            status,
            content_type: content_type.map(str::to_owned),
            source,
        }),
    }
}

/// Turn the upstream client's outcome into a local response or gateway error.
pub fn relay(
    outcome: Result<UpstreamResponse, UpstreamError>,
) -> Result<ProxiedResponse, GatewayError> {
    match outcome {
        Ok(response) => normalize(
            response.status,
            response.body,
            response.content_type.as_deref(),
        ),
        Err(UpstreamError::Status { status, body }) => normalize(status, body, None),
        Err(UpstreamError::Unreachable(e)) if e.is_timeout() => {
            Err(GatewayError::UpstreamTimeout(e))
        }
        Err(UpstreamError::Unreachable(e)) => Err(GatewayError::UpstreamUnreachable(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn body_bytes(response: Response) -> Bytes {
        axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap()
    }

    #[test]
    fn test_no_content_is_not_decoded() {
        let res = normalize(StatusCode::NO_CONTENT, Bytes::new(), None).unwrap();
        assert_eq!(
            res,
            ProxiedResponse::Raw {
                status: StatusCode::NO_CONTENT,
                body: Bytes::new(),
            }
        );
    }

    #[test]
    fn test_error_status_passes_raw_text() {
        let res = normalize(
            StatusCode::NOT_FOUND,
            Bytes::from_static(b"not found"),
            Some("application/json"),
        ).unwrap();
        assert_eq!(
            res,
            ProxiedResponse::Raw {
                status: StatusCode::NOT_FOUND,
                body: Bytes::from_static(b"not found"),
            }
        );
    }

    #[test]
    fn test_error_body_bytes_are_not_reencoded() {
        let body = Bytes::from_static(b"caf\xe9 introuvable");
        let res = normalize(StatusCode::NOT_FOUND, body.clone(), Some("text/plain")).unwrap();
        assert_eq!(
            res,
            ProxiedResponse::Raw {
                status: StatusCode::NOT_FOUND,
                body,
            }
        );
    }

    #[test]
    fn test_error_status_with_json_body_stays_raw() {
        let res = normalize(
            StatusCode::BAD_REQUEST,
            Bytes::from_static(br#"{"detail":"bad"}"#),
            None,
        ).unwrap();
        assert_eq!(
            res,
            ProxiedResponse::Raw {
                status: StatusCode::BAD_REQUEST,
                body: Bytes::from_static(br#"{"detail":"bad"}"#),
            }
        );
    }

    #[test]
    fn test_success_is_parsed() {
        let res = normalize(
            StatusCode::OK,
            Bytes::from_static(br#"{"topics": ["Economy","China"]}"#),
            Some("application/json"),
        )
        .unwrap();
        assert_eq!(
            res,
            ProxiedResponse::Json {
                status: StatusCode::OK,
                body: json!({"topics": ["Economy", "China"]}),
            }
        );
    }

    #[test]
    fn test_non_json_success_is_contract_violation() {
        let err = normalize(
            StatusCode::OK,
            Bytes::from_static(b"not json"),
            Some("text/plain"),
        ).unwrap_err();
        match err {
            GatewayError::UpstreamContractViolation {
                status,
                content_type,
                ..
            } => {
                assert_eq!(status, StatusCode::OK);
                assert_eq!(content_type.as_deref(), Some("text/plain"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_non_204_success_is_relayed_empty() {
        let res = normalize(StatusCode::OK, Bytes::new(), None).unwrap();
        assert_eq!(
            res,
            ProxiedResponse::Raw {
                status: StatusCode::OK,
                body: Bytes::new(),
            }
        );
    }

    #[test]
    fn test_relay_status_error() {
        let outcome = Err(UpstreamError::Status {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: Bytes::from_static(b"maintenance"),
        });
        assert_eq!(
            relay(outcome).unwrap(),
            ProxiedResponse::Raw {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: Bytes::from_static(b"maintenance"),
            }
        );
    }

    #[tokio::test]
    async fn test_raw_response_rendering() {
        let response = ProxiedResponse::Raw {
            status: StatusCode::NOT_FOUND,
            body: Bytes::from_static(b"not found"),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
        assert_eq!(&body_bytes(response).await[..], b"not found");

        let response = ProxiedResponse::Raw {
            status: StatusCode::NO_CONTENT,
            body: Bytes::new(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());
    }

    #[tokio::test]
    async fn test_raw_error_rendering_keeps_invalid_utf8() {
        let response = relay(Err(UpstreamError::Status {
            status: StatusCode::BAD_REQUEST,
            body: Bytes::from_static(b"\xff\xfe erreur"),
        }))
        .unwrap()
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(&body_bytes(response).await[..], b"\xff\xfe erreur");
    }

    #[tokio::test]
    async fn test_json_rendering_keeps_key_order_and_big_numbers() {
        let upstream = br#"{"z":1,"a":123456789012345678901234567890,"m":[0.1,-7]}"#;
        let response = normalize(StatusCode::OK, Bytes::from_static(upstream), None)
            .unwrap()
            .into_response();
        assert_eq!(&body_bytes(response).await[..], &upstream[..]);
    }
}
