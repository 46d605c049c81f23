//! Route table lookup.
//!
//! # Responsibilities
//! - Compile route configs into patterns and upstream templates
//! - Look up the route for a prefix-stripped path
//! - Return the matched route with its upstream path, or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan in declaration order, first match wins
//! - Every compile error is reported, not just the first

use std::collections::{HashMap, HashSet};

use crate::config::validation::ValidationError;
use crate::config::RouteConfig;
use crate::routing::mapper::UpstreamTemplate;
use crate::routing::matcher::{Captures, PatternError, RoutePattern, Segment};

/// A compiled route.
#[derive(Debug, Clone)]
pub struct Route {
    name: String,
    pattern: RoutePattern,
    upstream: UpstreamTemplate,
}

impl Route {
    /// Compile a route config, checking that the upstream template only uses
    /// placeholders the local pattern captures, with the same kinds.
    pub fn compile(config: &RouteConfig) -> Result<Self, Vec<ValidationError>> {
        let invalid = |raw: &str, reason: PatternError| ValidationError::InvalidPattern {
            route: config.name.clone(),
            pattern: raw.to_string(),
            reason,
        };

        let pattern = RoutePattern::parse(&config.pattern)
            .map_err(|e| vec![invalid(&config.pattern, e)])?;
        let upstream = UpstreamTemplate::parse(config.upstream_template())
            .map_err(|e| vec![invalid(config.upstream_template(), e)])?;

        let mut errors = Vec::new();
        for segment in upstream.pattern().segments() {
            let Segment::Capture { name, kind } = segment else {
                continue;
            };
            match pattern.capture_kind(name) {
                None => errors.push(ValidationError::UnknownPlaceholder {
                    route: config.name.clone(),
                    placeholder: name.clone(),
                }),
                Some(local) if local != *kind => errors.push(ValidationError::PlaceholderKindMismatch {
                    route: config.name.clone(),
                    placeholder: name.clone(),
                    local,
                    upstream: *kind,
                }),
                Some(_) => {}
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self {
            name: config.name.clone(),
            pattern,
            upstream,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn upstream(&self) -> &UpstreamTemplate {
        &self.upstream
    }
}

/// Result of a successful lookup.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub captures: Captures,
    /// Path to append to the upstream base URL.
    pub upstream_path: String,
}

/// Ordered, immutable set of routes.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Build the table from route configs.
    pub fn from_config(configs: &[RouteConfig]) -> Result<Self, Vec<ValidationError>> {
        let mut errors = Vec::new();
        let mut routes = Vec::with_capacity(configs.len());
        let mut names: HashSet<&str> = HashSet::new();
        let mut shapes: HashMap<String, &str> = HashMap::new();

        for config in configs {
            if !names.insert(config.name.as_str()) {
                errors.push(ValidationError::DuplicateRouteName(config.name.clone()));
            }
            match Route::compile(config) {
                Ok(route) => {
                    if let Some(first) = shapes.insert(route.pattern.shape(), config.name.as_str()) {
                        errors.push(ValidationError::DuplicatePattern {
                            first: first.to_string(),
                            second: config.name.clone(),
                        });
                    }
                    routes.push(route);
                }
                Err(errs) => errors.extend(errs),
            }
        }

        if errors.is_empty() {
            Ok(Self { routes })
        } else {
            Err(errors)
        }
    }

    /// Find the first route matching a prefix-stripped path.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        self.routes.iter().find_map(|route| {
            let captures = route.pattern.captures(path)?;
            let upstream_path = route.upstream.render(&captures)?;
            Some(RouteMatch {
                route,
                captures,
                upstream_path,
            })
        })
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
