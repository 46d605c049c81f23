//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::config::validation::ValidationError;
use crate::upstream::UpstreamCredential;

/// Environment variable overriding `upstream.base_url`.
pub const ENV_BASE_URL: &str = "POLADS_BASE_API_URL";
/// Environment variable overriding `upstream.token`.
pub const ENV_API_TOKEN: &str = "POLADS_API_TOKEN";
/// Environment variable overriding `listener.bind_address`.
pub const ENV_BIND_ADDRESS: &str = "POLADS_BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

pub(crate) fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a TOML file without validating it.
pub fn read_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Apply overrides from a variable lookup (normally `std::env::var`).
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_BASE_URL) {
        config.upstream.base_url = url;
    }
    if let Some(token) = lookup(ENV_API_TOKEN) {
        config.upstream.token = UpstreamCredential::new(token);
    }
    if let Some(addr) = lookup(ENV_BIND_ADDRESS) {
        config.listener.bind_address = addr;
    }
}
