//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Init logging/metrics → Build server → Bind
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → server stops accepting → in-flight requests finish
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::{notified, Shutdown};
