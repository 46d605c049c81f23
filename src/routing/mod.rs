//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming local path (/api/v1/...)
//!     → mapper.rs (strip mount prefix)
//!     → router.rs (route lookup, first match wins)
//!     → matcher.rs (segment match, typed captures)
//!     → mapper.rs (render upstream template)
//!     → Return: matched Route + upstream path, or NoMatch
//!
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → Parse patterns and templates
//!     → Check placeholders, names, shapes
//!     → Freeze as immutable RouteTable
//! ```

pub mod mapper;
pub mod matcher;
pub mod router;

pub use mapper::{PathMapper, UpstreamTemplate};
pub use matcher::{CaptureKind, Captures, RoutePattern};
pub use router::{Route, RouteMatch, RouteTable};
