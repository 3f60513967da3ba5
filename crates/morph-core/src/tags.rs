//! Tag table: values recorded by `#` symbols for cross-node references.
//!
//! The table is shared mutable state for a whole evaluation pass. It is
//! written only by the symbol binder and read by alternate-source lookups,
//! so nodes must be visited in one deterministic order for lookups to see
//! the writes of earlier nodes.

use crate::path::{self, PathError, PathSegment};
use serde_json::{Map, Value};
use tracing::trace;

/// How far past the end of an array an index write may reach
pub const MAX_INDEX_PADDING: usize = 1024;

/// Path-keyed values recorded during a pass.
///
/// Values live in one materialized document. The table also remembers
/// which canonical paths were written, in write order, and every read
/// resolves through the document, so a later write to a parent or child
/// path is visible from both.
#[derive(Debug, Clone, PartialEq)]
pub struct TagTable {
    paths: Vec<(String, Vec<PathSegment>)>,
    document: Value,
}

impl Default for TagTable {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            document: Value::Object(Map::new()),
        }
    }
}

impl TagTable {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` at `path`, returning the value previously there.
    ///
    /// The path is canonicalized first, so `foo.bar` and `$['foo']['bar']`
    /// address the same entry. Last writer wins. The table is unchanged
    /// when the write fails.
    pub fn insert(&mut self, path: &str, value: Value) -> Result<Option<Value>, PathError> {
        let segments = path::segments(path)?;
        let key = path::stringify(&segments);
        check_padding(&self.document, &segments, &key)?;

        trace!(tag = %key, "recording tag");
        let previous = resolve(&self.document, &segments).cloned();
        write_at(&mut self.document, &segments, value);
        if !self.paths.iter().any(|(written, _)| *written == key) {
            self.paths.push((key, segments));
        }
        Ok(previous)
    }

    /// Value recorded at `path`, if any.
    ///
    /// Only written paths resolve; containers created along the way to a
    /// write are not entries of their own.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let key = path::canonicalize(path).ok()?;
        let (_, segments) = self.paths.iter().find(|(written, _)| *written == key)?;
        resolve(&self.document, segments)
    }

    /// True when something was recorded at `path`
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Entries in first-write order, keyed by canonical path.
    ///
    /// A path whose location was later replaced by a write to one of its
    /// ancestors is skipped when it no longer resolves.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.paths
            .iter()
            .filter_map(|(key, segments)| resolve(&self.document, segments).map(|v| (key, v)))
    }

    /// Number of recorded paths that still resolve
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// True when nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Recorded values laid out as one document, each at its path
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Entries as a JSON object keyed by canonical path
    pub fn to_map(&self) -> Map<String, Value> {
        self.iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

fn resolve<'v>(document: &'v Value, segments: &[PathSegment]) -> Option<&'v Value> {
    segments.iter().try_fold(document, |node, segment| match segment {
        PathSegment::Member(name) => node.as_object()?.get(name),
        PathSegment::Index(index) => node.as_array()?.get(*index),
    })
}

/// Reject writes that would pad an array by more than [`MAX_INDEX_PADDING`]
fn check_padding(document: &Value, segments: &[PathSegment], key: &str) -> Result<(), PathError> {
    let mut current = Some(document);
    for segment in segments {
        current = match segment {
            PathSegment::Member(name) => current.and_then(|node| node.as_object()?.get(name)),
            PathSegment::Index(index) => {
                let len = current.and_then(Value::as_array).map_or(0, Vec::len);
                if *index > len.saturating_add(MAX_INDEX_PADDING) {
                    return Err(PathError::IndexOutOfRange {
                        path: key.to_string(),
                        index: *index,
                        len,
                    });
                }
                current.and_then(|node| node.as_array()?.get(*index))
            }
        };
    }
    Ok(())
}

/// Write `value` at `segments`, creating containers along the way
fn write_at(target: &mut Value, segments: &[PathSegment], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        *target = value;
        return;
    };

    let slot = match first {
        PathSegment::Member(name) => {
            if !target.is_object() {
                *target = Value::Object(Map::new());
            }
            let Value::Object(map) = target else {
                return;
            };
            map.entry(name.clone()).or_insert(Value::Null)
        }
        PathSegment::Index(index) => {
            if !target.is_array() {
                *target = Value::Array(Vec::new());
            }
            let Value::Array(items) = target else {
                return;
            };
            if items.len() <= *index {
                items.resize(index + 1, Value::Null);
            }
            &mut items[*index]
        }
    };

    write_at(slot, rest, value);
}
