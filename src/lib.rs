//! Political ads analytics gateway.
//!
//! Re-exposes a remote analytics API under a local URL namespace: GET requests
//! under the mount prefix are mapped onto upstream paths, forwarded with the
//! configured credential, and the upstream response is relayed back.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod upstream;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
