//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::upstream::UpstreamCredential;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream analytics API settings.
    pub upstream: UpstreamConfig,

    /// Local mount settings.
    pub gateway: MountConfig,

    /// Route definitions. Empty means the built-in analytics table.
    pub routes: Vec<RouteConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl GatewayConfig {
    /// Routes to serve: the configured ones, or the built-in table when none are set.
    pub fn effective_routes(&self) -> Vec<RouteConfig> {
        if self.routes.is_empty() {
            RouteConfig::builtin()
        } else {
            self.routes.clone()
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL the rewritten path is appended to, verbatim.
    pub base_url: String,

    /// Value sent in the `Authorization` header of every upstream request.
    pub token: UpstreamCredential,

    /// Total request timeout in seconds. `None` keeps the transport default.
    pub timeout_secs: Option<u64>,

    /// Honour `HTTP_PROXY`/`HTTPS_PROXY` for outbound calls.
    pub system_proxy: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token: UpstreamCredential::default(),
            timeout_secs: None,
            system_proxy: true,
        }
    }
}

/// Mount configuration for the local URL namespace.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MountConfig {
    /// Prefix stripped from local paths (e.g., "/api/v1").
    pub mount_prefix: String,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            mount_prefix: "/api/v1".to_string(),
        }
    }
}

/// A local route and the upstream path it maps to.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RouteConfig {
    /// Route identifier for logging/metrics.
    pub name: String,

    /// Local pattern relative to the mount prefix, e.g. "/getads".
    pub pattern: String,

    /// Upstream path template. Defaults to `pattern`.
    #[serde(default)]
    pub upstream: Option<String>,
}

impl RouteConfig {
    /// Route with an identity upstream mapping.
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            upstream: None,
        }
    }

    /// Upstream template, falling back to the local pattern.
    pub fn upstream_template(&self) -> &str {
        self.upstream.as_deref().unwrap_or(&self.pattern)
    }

    /// The analytics routes served when no routes are configured.
    pub fn builtin() -> Vec<RouteConfig> {
        vec![
            RouteConfig::new(
                "total_spend_by_page_of_region",
                "/total_spend/by_page/of_region/{region_name:slug}",
            ),
            RouteConfig::new(
                "total_spend_of_page_of_region",
                "/total_spend/of_page/{page_id:int}/of_region/{region_name:slug}",
            ),
            RouteConfig::new("getads", "/getads"),
            RouteConfig::new("notifications_of_user", "/notifications/of_user/{email:slug}"),
        ]
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Compact,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
