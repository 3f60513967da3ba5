//! Query stage: collapse a dereferenced sequence.

use crate::ast::AstNode;
use crate::operators::QueryOp;
use serde_json::Value;

/// Pick from the node's match sequence.
///
/// Without a query operator the last match wins (undefined when there are
/// none). `+N` keeps the first `N` matches as a sequence, `+` keeps them
/// all. Values that are not sequences pass through.
pub fn select(node: &AstNode, meta: u8) -> AstNode {
    let value = match (&node.value, node.operators.query) {
        (Some(Value::Array(items)), None) => items.last().cloned(),
        (Some(Value::Array(items)), Some(QueryOp::Take(count))) => {
            let count = count.unwrap_or(items.len());
            Some(Value::Array(items.iter().take(count).cloned().collect()))
        }
        (other, _) => other.clone(),
    };

    node.resolved(value, meta)
}
