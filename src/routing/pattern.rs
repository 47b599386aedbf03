//! Route pattern compilation.
//!
//! # Syntax
//! - `/about` static segments, matched literally (case-sensitive)
//! - `/products/{id}` a placeholder capturing exactly one segment
//! - `/docs/{*rest}` a trailing catch-all capturing one or more segments, slashes included
//!
//! # Design Decisions
//! - Patterns are canonicalized like request paths, so `/about/` and `//about` compile
//!   to the same pattern as `/about`
//! - A placeholder must span a whole segment (`/file-{id}.html` is rejected)
//! - Matching works on percent-decoded segments: static segments are decoded when the
//!   pattern is compiled, request segments after splitting on the raw `/`, so `%2F`
//!   never introduces a segment boundary

use percent_encoding::percent_decode_str;
use std::hash::{Hash, Hasher};
use thiserror::Error;

use crate::routing::matcher::normalize_request_path;
use crate::routing::TEMPLATE_KEY;

/// Reasons a stored path cannot be used as a route pattern.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("unbalanced braces in segment {0:?}")]
    Unbalanced(String),

    #[error("placeholder must span the whole segment {0:?}")]
    PartialSegment(String),

    #[error("invalid parameter name {0:?}")]
    InvalidName(String),

    #[error("parameter {0:?} declared more than once")]
    DuplicateName(String),

    #[error("parameter name {0:?} is reserved")]
    ReservedName(String),

    #[error("catch-all {0:?} must be the last segment")]
    CatchAllNotLast(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Segment {
    Static(String),
    Param(String),
    CatchAll(String),
}

impl Segment {
    fn weight(&self) -> u8 {
        match self {
            Segment::Static(_) => 2,
            Segment::Param(_) => 1,
            Segment::CatchAll(_) => 0,
        }
    }
}

/// How specific a pattern is. Compared left to right: static beats placeholder beats
/// catch-all at the first differing segment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Specificity(Vec<u8>);

/// A compiled route pattern.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    source: String,
    canonical: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    pub fn parse(source: &str) -> Result<Self, PatternError> {
        let canonical = normalize_request_path(source);
        let mut segments = Vec::new();
        let mut names: Vec<String> = Vec::new();

        let raw_segments: Vec<&str> = split_segments(&canonical);
        let last = raw_segments.len().saturating_sub(1);

        for (index, raw) in raw_segments.iter().enumerate() {
            let segment = parse_segment(raw)?;
            let name = match &segment {
                Segment::Static(_) => None,
                Segment::Param(name) => Some(name.as_str()),
                Segment::CatchAll(name) => {
                    if index != last {
                        return Err(PatternError::CatchAllNotLast(name.clone()));
                    }
                    Some(name.as_str())
                }
            };

            if let Some(name) = name {
                if name == TEMPLATE_KEY {
                    return Err(PatternError::ReservedName(name.to_string()));
                }
                if names.iter().any(|seen| seen == name) {
                    return Err(PatternError::DuplicateName(name.to_string()));
                }
                names.push(name.to_string());
            }
            segments.push(segment);
        }

        Ok(Self {
            source: source.to_string(),
            canonical,
            segments,
        })
    }

    /// The path as stored on the template record.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The normalized form the pattern was compiled from.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// True when the pattern has no placeholders.
    pub fn is_static(&self) -> bool {
        self.segments
            .iter()
            .all(|s| matches!(s, Segment::Static(_)))
    }

    pub fn specificity(&self) -> Specificity {
        Specificity(self.segments.iter().map(Segment::weight).collect())
    }

    /// Decoded segments of a fully static pattern, used as the exact-path index key.
    pub(crate) fn static_key(&self) -> Option<Vec<String>> {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Static(value) => Some(value.clone()),
                _ => None,
            })
            .collect()
    }

    /// Match decoded path segments (see [`decode_segments`]). Returns the captured
    /// parameters.
    pub fn captures(&self, path: &[String]) -> Option<Vec<(String, String)>> {
        let mut captures = Vec::new();

        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Static(expected) => {
                    if path.get(index) != Some(expected) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = path.get(index)?;
                    captures.push((name.clone(), value.clone()));
                }
                Segment::CatchAll(name) => {
                    let rest = &path[index.min(path.len())..];
                    if rest.is_empty() {
                        return None;
                    }
                    captures.push((name.clone(), rest.join("/")));
                    return Some(captures);
                }
            }
        }

        (path.len() == self.segments.len()).then_some(captures)
    }
}

impl PartialEq for RoutePattern {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

impl Eq for RoutePattern {}

impl Hash for RoutePattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.segments.hash(state);
    }
}

/// Split a normalized path into its segments. `/` has none.
pub(crate) fn split_segments(path: &str) -> Vec<&str> {
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed.split('/').collect()
    }
}

/// Split a normalized request path on the raw `/` and percent-decode each segment.
pub(crate) fn decode_segments(path: &str) -> Vec<String> {
    split_segments(path).into_iter().map(decode).collect()
}

fn parse_segment(raw: &str) -> Result<Segment, PatternError> {
    let opens = raw.matches('{').count();
    let closes = raw.matches('}').count();

    if opens == 0 && closes == 0 {
        return Ok(Segment::Static(decode(raw)));
    }
    if opens != closes {
        return Err(PatternError::Unbalanced(raw.to_string()));
    }
    if opens > 1 || !raw.starts_with('{') || !raw.ends_with('}') {
        return Err(PatternError::PartialSegment(raw.to_string()));
    }

    let inner = &raw[1..raw.len() - 1];
    let (name, catch_all) = match inner.strip_prefix('*') {
        Some(name) => (name, true),
        None => (inner, false),
    };

    if !is_valid_name(name) {
        return Err(PatternError::InvalidName(name.to_string()));
    }

    Ok(if catch_all {
        Segment::CatchAll(name.to_string())
    } else {
        Segment::Param(name.to_string())
    })
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn decode(value: &str) -> String {
    percent_decode_str(value).decode_utf8_lossy().into_owned()
}
