//! AST nodes as produced by the template parser.
//!
//! Nodes are immutable by replacement: every stage takes a node by reference
//! and returns an updated copy.

use crate::operators::{Depth, InceptionMode, Operators};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Stage markers recorded in a node's `@meta` field
pub mod meta {
    /// Value is a literal; no path was resolved
    pub const LITERAL: u8 = 0;
    /// Dereferencer
    pub const DEREF: u8 = 1;
    /// Query stage
    pub const QUERY: u8 = 2;
    /// Constraint resolver
    pub const CONSTRAINTS: u8 = 2;
    /// Symbol binder
    pub const SYMBOL: u8 = 2;
    /// Enumerator
    pub const ENUMERATE: u8 = 4;
    /// Pipe executor
    pub const PIPE: u8 = 5;
    /// Inception composer
    pub const INCEPTION: u8 = 5;
}

/// One unit of a template
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AstNode {
    /// Path expression, bare or root-qualified
    #[serde(default)]
    pub path: String,

    /// Declared operators
    #[serde(default, skip_serializing_if = "Operators::is_empty")]
    pub operators: Operators,

    /// Pipe declarations keyed by ordinal (`$1`, `$2`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipes: Option<Map<String, Value>>,

    /// Resolved value; `None` is undefined, distinct from JSON null
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    /// Marker of the stage that last produced `value`
    #[serde(rename = "@meta", default)]
    pub meta: u8,

    /// Tag path this node's value was recorded under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    /// Inception mode, set by the inception preprocessor
    #[serde(rename = "$inception", default, skip_serializing_if = "Option::is_none")]
    pub inception: Option<InceptionMode>,

    /// Inception depth, set by the inception preprocessor
    #[serde(rename = "$depth", default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<Depth>,
}

impl AstNode {
    /// Node with a path and nothing else
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Replace the declared operators
    pub fn with_operators(mut self, operators: Operators) -> Self {
        self.operators = operators;
        self
    }

    /// Replace the pipe declarations
    pub fn with_pipes(mut self, pipes: Map<String, Value>) -> Self {
        self.pipes = Some(pipes);
        self
    }

    /// Set a resolved value
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    /// Copy with a new value and stage marker
    pub(crate) fn resolved(&self, value: Option<Value>, meta: u8) -> Self {
        Self {
            value,
            meta,
            ..self.clone()
        }
    }

    /// Copy with a new stage marker only
    pub(crate) fn marked(&self, meta: u8) -> Self {
        Self {
            meta,
            ..self.clone()
        }
    }
}
