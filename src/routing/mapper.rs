//! Local path to upstream path mapping.
//!
//! # Responsibilities
//! - Strip the fixed mount prefix from the local request path
//! - Substitute captured values into the upstream path template
//!
//! # Design Decisions
//! - Pure string manipulation; templates are checked against their pattern at startup
//! - Captured values are inserted verbatim, in the position the template names them

use crate::routing::matcher::{Captures, PatternError, RoutePattern, Segment};

/// Strips the mount prefix (e.g. `/api/v1`) from local request paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMapper {
    prefix: String,
}

impl PathMapper {
    /// Create a mapper for the given mount prefix.
    ///
    /// The prefix must start with `/` and must not end with one.
    pub fn new(prefix: impl Into<String>) -> Result<Self, String> {
        let prefix = prefix.into();
        if !prefix.starts_with('/') {
            return Err(format!("mount prefix '{prefix}' must start with '/'"));
        }
        if prefix.len() > 1 && prefix.ends_with('/') {
            return Err(format!("mount prefix '{prefix}' must not end with '/'"));
        }
        if prefix.len() == 1 {
            return Err("mount prefix must not be the root path".to_string());
        }
        Ok(Self { prefix })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Upstream-relative path for a local path, i.e. `local[prefix.len()..]`.
    ///
    /// Returns `None` when the local path is not under the mount prefix.
    pub fn strip<'a>(&self, local_path: &'a str) -> Option<&'a str> {
        if !local_path.starts_with(&self.prefix) {
            return None;
        }
        local_path.get(self.prefix.len()..)
    }
}

/// Upstream path template; shares placeholder syntax with local patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTemplate {
    pattern: RoutePattern,
}

impl UpstreamTemplate {
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        Ok(Self {
            pattern: RoutePattern::parse(raw)?,
        })
    }

    pub fn from_pattern(pattern: RoutePattern) -> Self {
        Self { pattern }
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    /// Render the upstream path from captured values.
    ///
    /// Returns `None` if a placeholder has no captured value; validated routes never do.
    pub fn render(&self, captures: &Captures) -> Option<String> {
        let mut out = String::new();
        for segment in self.pattern.segments() {
            out.push('/');
            match segment {
                Segment::Literal(lit) => out.push_str(lit),
                Segment::Capture { name, .. } => out.push_str(captures.get(name)?),
            }
        }
        Some(out)
    }
}
