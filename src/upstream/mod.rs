//! Upstream subsystem.
//!
//! # Data Flow
//! ```text
//! upstream path + query pairs
//!     → client.rs (GET base_url + path, Authorization: token)
//!     → Ok(UpstreamResponse) | Err(Unreachable) | Err(Status { status, body })
//! ```

pub mod client;
pub mod credential;

pub use client::{ClientBuildError, UpstreamClient, UpstreamError, UpstreamResponse};
pub use credential::UpstreamCredential;
