//! Symbol binder.
//!
//! `#` records the node's value in the pass-wide [`TagTable`]. This is the
//! one stage with a side effect, so the driver must visit nodes in a single
//! deterministic order for later lookups to observe earlier writes.

use crate::ast::AstNode;
use crate::context::Context;
use crate::error::{OperatorError, OperatorResult};
use crate::operators::SymbolOp;
use crate::path;
use crate::tags::TagTable;
use tracing::{debug, trace};

/// Apply the node's symbol operator, if it declares one
pub fn bind(
    node: &AstNode,
    tags: &mut TagTable,
    context: &Context,
    meta: u8,
) -> OperatorResult<AstNode> {
    let Some(op) = &node.operators.symbol else {
        return Ok(node.clone());
    };

    let tag = match op {
        SymbolOp::Bind => {
            return Err(OperatorError::Unimplemented {
                family: "symbol",
                token: op.to_string(),
            })
        }
        SymbolOp::Tag(None) => context.path_string(),
        SymbolOp::Tag(Some(tag)) => path::normalize(tag),
    };
    let tag = path::canonicalize(&tag)?;

    match &node.value {
        Some(value) => {
            trace!(tag = %tag, "tagging value");
            tags.insert(&tag, value.clone())?;
        }
        None => debug!(tag = %tag, "value undefined, tag not recorded"),
    }

    let mut tagged = node.marked(meta);
    tagged.tag = Some(tag);
    Ok(tagged)
}
