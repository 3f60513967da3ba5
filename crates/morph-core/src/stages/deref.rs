//! Dereferencer: resolve a node's path against a source document.

use crate::ast::{meta, AstNode};
use crate::context::Environment;
use crate::error::OperatorResult;
use crate::path::{self, PathQuery};
use crate::value::is_container;
use serde_json::Value;
use tracing::{debug, trace};

/// Where and how to dereference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerefOptions {
    /// Stage marker for the result
    pub meta: u8,
    /// Source name; the configured origin source when `None`
    pub source: Option<String>,
}

impl Default for DerefOptions {
    fn default() -> Self {
        Self {
            meta: meta::DEREF,
            source: None,
        }
    }
}

impl DerefOptions {
    /// Dereference against `source`
    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::default()
        }
    }

    /// Override the stage marker
    pub fn with_meta(mut self, meta: u8) -> Self {
        self.meta = meta;
        self
    }
}

/// Dereference `node` against the named source in `env`
pub fn deref(node: &AstNode, env: &Environment, options: &DerefOptions) -> OperatorResult<AstNode> {
    let source = options
        .source
        .as_deref()
        .unwrap_or(&env.config().origin_source);
    let document = env.sources().get(source);
    if document.is_none() {
        debug!(source, path = %node.path, "source not registered, dereferencing to empty");
    }
    deref_document(node, document, options.meta, env.path_query())
}

/// Dereference `node` against an already looked-up document.
///
/// A missing or null document yields an empty sequence. A scalar document
/// is a literal: it yields itself as a one-element sequence and the marker
/// drops to [`meta::LITERAL`].
pub fn deref_document(
    node: &AstNode,
    document: Option<&Value>,
    meta: u8,
    path_query: &dyn PathQuery,
) -> OperatorResult<AstNode> {
    let (values, meta) = match document {
        None | Some(Value::Null) => (Vec::new(), meta),
        Some(scalar) if !is_container(scalar) => (vec![scalar.clone()], meta::LITERAL),
        Some(document) => {
            let normalized = path::normalize(&node.path);
            let matches = path_query.query(document, &normalized)?;
            trace!(path = %normalized, matches = matches.len(), "dereferenced");
            (matches, meta)
        }
    };

    Ok(node.resolved(Some(Value::Array(values)), meta))
}
