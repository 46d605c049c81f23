//! Route pattern parsing and matching.
//!
//! # Responsibilities
//! - Parse local patterns such as `/of_page/{page_id:int}/of_region/{region_name:slug}`
//! - Match a prefix-stripped request path segment by segment
//! - Enforce capture types (`slug`, `int`, `str`)
//!
//! # Design Decisions
//! - Captured values are kept as the exact text seen in the path; an `int` capture
//!   is validated as digits but never re-encoded
//! - No regex in the hot path
//! - Matching is case-sensitive

use std::fmt;

/// Type of a path capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureKind {
    /// Letters, digits, hyphens and underscores.
    Slug,
    /// Non-negative integer (ASCII digits only).
    Int,
    /// Any non-empty segment.
    Str,
}

impl CaptureKind {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "slug" => Some(CaptureKind::Slug),
            "int" => Some(CaptureKind::Int),
            "str" => Some(CaptureKind::Str),
            _ => None,
        }
    }

    /// Returns true if `value` is a legal segment for this capture kind.
    pub fn accepts(&self, value: &str) -> bool {
        if value.is_empty() {
            return false;
        }
        match self {
            CaptureKind::Slug => value
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_'),
            CaptureKind::Int => value.bytes().all(|b| b.is_ascii_digit()),
            CaptureKind::Str => !value.contains('/'),
        }
    }
}

impl fmt::Display for CaptureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureKind::Slug => write!(f, "slug"),
            CaptureKind::Int => write!(f, "int"),
            CaptureKind::Str => write!(f, "str"),
        }
    }
}

/// One `/`-separated piece of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Capture { name: String, kind: CaptureKind },
}

/// Error raised while parsing a pattern.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("pattern must start with '/'")]
    MissingLeadingSlash,
    #[error("empty segment at position {0}")]
    EmptySegment(usize),
    #[error("malformed placeholder '{0}'")]
    MalformedPlaceholder(String),
    #[error("unknown capture type '{0}'")]
    UnknownKind(String),
    #[error("placeholder '{0}' appears more than once")]
    DuplicatePlaceholder(String),
}

/// Values captured from a matched path, in pattern order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures {
    values: Vec<(String, String)>,
}

impl Captures {
    /// Look up a captured value by placeholder name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Name and value pairs, in pattern order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

/// A parsed route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Parse a pattern of the form `/literal/{name:kind}/...`.
    ///
    /// A bare `{name}` is treated as a `str` capture.
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        let rest = raw
            .strip_prefix('/')
            .ok_or(PatternError::MissingLeadingSlash)?;

        let mut segments = Vec::new();
        for (idx, piece) in rest.split('/').enumerate() {
            if piece.is_empty() {
                return Err(PatternError::EmptySegment(idx));
            }
            let segment = match piece.strip_prefix('{') {
                Some(inner) => parse_placeholder(piece, inner)?,
                None if piece.contains('{') || piece.contains('}') => {
                    return Err(PatternError::MalformedPlaceholder(piece.to_string()));
                }
                None => Segment::Literal(piece.to_string()),
            };
            if let Segment::Capture { name, .. } = &segment {
                let seen = segments
                    .iter()
                    .any(|s| matches!(s, Segment::Capture { name: n, .. } if n == name));
                if seen {
                    return Err(PatternError::DuplicatePlaceholder(name.clone()));
                }
            }
            segments.push(segment);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Kind of the named placeholder, if the pattern declares it.
    pub fn capture_kind(&self, name: &str) -> Option<CaptureKind> {
        self.segments.iter().find_map(|s| match s {
            Segment::Capture { name: n, kind } if n == name => Some(*kind),
            _ => None,
        })
    }

    /// Shape of the pattern with placeholder names erased.
    ///
    /// Two patterns with the same shape and capture kinds can never be told apart.
    pub fn shape(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            out.push('/');
            match segment {
                Segment::Literal(lit) => out.push_str(lit),
                Segment::Capture { kind, .. } => {
                    out.push('{');
                    out.push_str(&kind.to_string());
                    out.push('}');
                }
            }
        }
        out
    }

    /// Match a prefix-stripped path against this pattern.
    pub fn captures(&self, path: &str) -> Option<Captures> {
        let rest = path.strip_prefix('/')?;
        let mut parts = rest.split('/');
        let mut values = Vec::new();

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(lit) => {
                    if part != lit {
                        return None;
                    }
                }
                Segment::Capture { name, kind } => {
                    if !kind.accepts(part) {
                        return None;
                    }
                    values.push((name.clone(), part.to_string()));
                }
            }
        }

        if parts.next().is_some() {
            return None;
        }
        Some(Captures { values })
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_placeholder(piece: &str, inner: &str) -> Result<Segment, PatternError> {
    let body = inner
        .strip_suffix('}')
        .ok_or_else(|| PatternError::MalformedPlaceholder(piece.to_string()))?;

    let (name, kind) = match body.split_once(':') {
        Some((name, kind)) => {
            let kind = kind.trim();
            let kind = CaptureKind::parse(kind)
                .ok_or_else(|| PatternError::UnknownKind(kind.to_string()))?;
            (name.trim(), kind)
        }
        None => (body.trim(), CaptureKind::Str),
    };

    let valid_name = !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_');
    if !valid_name {
        return Err(PatternError::MalformedPlaceholder(piece.to_string()));
    }

    Ok(Segment::Capture {
        name: name.to_string(),
        kind,
    })
}
