//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the upstream base URL and token are usable
//! - Check the mount prefix and every route compiles
//! - Detect conflicting routes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::GatewayConfig;
use crate::routing::matcher::{CaptureKind, PatternError};
use crate::routing::{PathMapper, RouteTable};

/// A semantic configuration error. Any of these prevents the gateway from serving.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    InvalidBindAddress(String),

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),

    #[error("invalid upstream base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("upstream token is not set")]
    MissingToken,

    #[error("upstream token is not a valid header value")]
    InvalidToken,

    #[error("invalid mount prefix: {0}")]
    InvalidMountPrefix(String),

    #[error("route '{route}': invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        route: String,
        pattern: String,
        reason: PatternError,
    },

    #[error("route '{route}': upstream placeholder '{placeholder}' is not captured locally")]
    UnknownPlaceholder { route: String, placeholder: String },

    #[error("route '{route}': placeholder '{placeholder}' is {local} locally but {upstream} upstream")]
    PlaceholderKindMismatch {
        route: String,
        placeholder: String,
        local: CaptureKind,
        upstream: CaptureKind,
    },

    #[error("duplicate route name '{0}'")]
    DuplicateRouteName(String),

    #[error("routes '{first}' and '{second}' match the same paths")]
    DuplicatePattern { first: String, second: String },
}

/// Validate a configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if let Err(reason) = check_base_url(&config.upstream.base_url) {
        errors.push(ValidationError::InvalidBaseUrl {
            url: config.upstream.base_url.clone(),
            reason,
        });
    }

    if config.upstream.token.is_empty() {
        errors.push(ValidationError::MissingToken);
    } else if config.upstream.token.header_value().is_err() {
        errors.push(ValidationError::InvalidToken);
    }

    if let Err(reason) = PathMapper::new(config.gateway.mount_prefix.clone()) {
        errors.push(ValidationError::InvalidMountPrefix(reason));
    }

    if let Err(route_errors) = RouteTable::from_config(&config.effective_routes()) {
        errors.extend(route_errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_base_url(raw: &str) -> Result<(), String> {
    if raw.is_empty() {
        return Err("not set".to_string());
    }
    let url = url::Url::parse(raw).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(format!("unsupported scheme '{other}'")),
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err("must not carry a query or fragment".to_string());
    }
    Ok(())
}
