//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment overrides: POLADS_BASE_API_URL, POLADS_API_TOKEN, ...)
//!     → CLI overrides (--bind)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to the HTTP server and upstream client
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::ConfigError;
pub use schema::GatewayConfig;
pub use schema::ListenerConfig;
pub use schema::LogFormat;
pub use schema::MountConfig;
pub use schema::ObservabilityConfig;
pub use schema::RouteConfig;
pub use schema::UpstreamConfig;
pub use validation::ValidationError;
