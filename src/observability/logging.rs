//! Structured logging.
//!
//! `RUST_LOG` takes precedence; otherwise the configured level applies to this
//! crate and to `tower_http`.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ObservabilityConfig};

/// Default filter directive for a log level.
pub fn default_directive(level: &str) -> String {
    format!("polads_gateway={level},tower_http={level}")
}

/// Install the global tracing subscriber.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(&config.log_level)));

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Compact => registry.with(tracing_subscriber::fmt::layer().compact()).init(),
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
    }
}
