//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, GET-only mount)
//!     → request.rs (path + ordered query parameters)
//!     → [routing layer maps to upstream path]
//!     → [upstream client forwards]
//!     → response.rs (normalise status/body)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{ProxyRequest, X_REQUEST_ID};
pub use response::{normalize, relay, ProxiedResponse};
pub use server::{AppState, HttpServer, ServerError};
