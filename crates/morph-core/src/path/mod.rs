//! Path normalization and querying.
//!
//! Template paths are written bare (`a.b`, `[0].c`) and normalized to
//! root-qualified form (`$.a.b`, `$[0].c`) before they reach a [`PathQuery`].
//! [`JsonPathQuery`] is the built-in query capability, backed by
//! `serde_json_path`; callers may inject their own through the trait.
//! Singular paths, used for tag writes and template contexts, go through
//! the grammar in `singular`.

mod singular;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use serde_json_path::JsonPath;
use std::fmt;
use thiserror::Error;

/// Marker every normalized path starts with
pub const ROOT: char = '$';

/// Member names that can be written in dot notation
static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap());

/// Path syntax and addressing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The expression is malformed
    #[error("Invalid path '{path}' at {position}: {message}")]
    Syntax {
        /// Expression text
        path: String,
        /// Character offset of the problem
        position: usize,
        /// What was expected
        message: String,
    },

    /// A write target must name exactly one location
    #[error("Path '{path}' does not address a single location")]
    NotSingular {
        /// Expression text
        path: String,
    },

    /// An index write would pad an array far past its end
    #[error("Index {index} in '{path}' is too far past the end of an array of length {len}")]
    IndexOutOfRange {
        /// Expression text
        path: String,
        /// Requested index
        index: usize,
        /// Length of the array at that point
        len: usize,
    },
}

impl PathError {
    fn from_query(path: &str, err: serde_json_path::ParseError) -> Self {
        Self::Syntax {
            path: path.to_string(),
            position: err.position(),
            message: err.message().to_string(),
        }
    }
}

/// One step of a singular path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Object member
    Member(String),
    /// Array index
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(name: &str) -> Self {
        Self::Member(name.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(name: String) -> Self {
        Self::Member(name)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Member(name) if IDENTIFIER_RE.is_match(name) => write!(f, ".{}", name),
            Self::Member(name) => write!(f, "[{}]", Value::String(name.clone())),
            Self::Index(index) => write!(f, "[{}]", index),
        }
    }
}

/// Root-qualify a path expression.
///
/// Paths already starting with `$` are returned unchanged, paths starting
/// with `.` or `[` get the bare root prefix, anything else gets `$.`.
pub fn normalize(path: &str) -> String {
    if path.starts_with(ROOT) {
        path.to_string()
    } else if path.starts_with(&['.', '['][..]) {
        format!("{}{}", ROOT, path)
    } else {
        format!("{}.{}", ROOT, path)
    }
}

/// Render singular segments as a canonical path (`$.a[0]["b c"]`)
pub fn stringify(segments: &[PathSegment]) -> String {
    let mut out = String::from(ROOT);
    for segment in segments {
        out.push_str(&segment.to_string());
    }
    out
}

/// Normalize a path and resolve it to singular segments.
///
/// Valid query expressions that can match more than one location fail
/// with [`PathError::NotSingular`]; anything else unparseable is a
/// [`PathError::Syntax`].
pub fn segments(path: &str) -> Result<Vec<PathSegment>, PathError> {
    let normalized = normalize(path.trim());
    match singular::parse(&normalized) {
        Ok(segments) => Ok(segments),
        Err(_) if JsonPath::parse(&normalized).is_ok() => {
            Err(PathError::NotSingular { path: normalized })
        }
        Err(err) => Err(err),
    }
}

/// Canonical form of a singular path, so equivalent spellings compare equal
pub fn canonicalize(path: &str) -> Result<String, PathError> {
    segments(path).map(|segments| stringify(&segments))
}

/// Capability that evaluates a normalized path against a document
pub trait PathQuery: Send + Sync {
    /// All matches of `path` in `document`, in document order
    fn query(&self, document: &Value, path: &str) -> Result<Vec<Value>, PathError>;
}

/// Built-in [`PathQuery`] over RFC 9535 JSONPath
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPathQuery;

impl PathQuery for JsonPathQuery {
    fn query(&self, document: &Value, path: &str) -> Result<Vec<Value>, PathError> {
        let parsed = JsonPath::parse(path).map_err(|err| PathError::from_query(path, err))?;
        Ok(parsed.query(document).all().into_iter().cloned().collect())
    }
}
