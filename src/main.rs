//! Political ads analytics gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────┐
//!                        │                     GATEWAY                      │
//!   GET /api/v1/...      │  ┌─────────┐   ┌────────────┐   ┌─────────────┐  │
//!   ─────────────────────┼─▶│  http   │──▶│  routing   │──▶│  upstream   │──┼──▶ Upstream API
//!                        │  │ server  │   │ map + match│   │   client    │  │    (Authorization)
//!                        │  └─────────┘   └────────────┘   └──────┬──────┘  │
//!                        │                                        │         │
//!   Local response       │  ┌──────────────────────┐              │         │
//!   ◀────────────────────┼──│ response normaliser  │◀─────────────┘         │
//!                        │  └──────────────────────┘                        │
//!                        │  config · observability · lifecycle              │
//!                        └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use polads_gateway::config::{self, loader};
use polads_gateway::lifecycle::{signals, Shutdown};
use polads_gateway::observability::{logging, metrics};
use polads_gateway::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "polads-gateway", version, about = "Political ads analytics gateway")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "POLADS_GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => loader::read_config(path)?,
        None => config::GatewayConfig::default(),
    };
    loader::apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }
    config::validation::validate_config(&config).map_err(config::ConfigError::Validation)?;

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "polads-gateway starting");

    if args.check {
        tracing::info!("Configuration is valid");
        return Ok(());
    }

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?);
    }

    let server = HttpServer::new(config)?;
    let listener = TcpListener::bind(&server.config().listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        tracing::info!("Shutdown signal received");
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
