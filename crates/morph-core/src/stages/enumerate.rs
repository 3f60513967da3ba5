//! Enumerator: expand a container into a sequence.

use crate::ast::AstNode;
use crate::operators::EnumerateOp;
use crate::value::{elements, entries};
use serde_json::Value;

/// Apply the node's enumerate operator, if it declares one.
///
/// An undefined value enumerates like null, to an empty sequence.
pub fn expand(node: &AstNode, meta: u8) -> AstNode {
    let Some(op) = node.operators.enumerate else {
        return node.clone();
    };

    let source = node.value.as_ref().unwrap_or(&Value::Null);
    let items = match op {
        EnumerateOp::Elements => elements(source),
        EnumerateOp::Entries => entries(source),
    };

    node.resolved(Some(Value::Array(items)), meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::meta;
    use crate::operators::Operators;
    use serde_json::json;
    use test_case::test_case;

    fn node(op: EnumerateOp, value: Value) -> AstNode {
        AstNode::new("a")
            .with_operators(Operators {
                enumerate: Some(op),
                ..Operators::default()
            })
            .with_value(value)
    }

    #[test_case(EnumerateOp::Elements, json!([1, 2, 3]), json!([1, 2, 3]) ; "elements of array")]
    #[test_case(EnumerateOp::Elements, json!({"a": 1, "b": 2}), json!([1, 2]) ; "elements of object")]
    #[test_case(EnumerateOp::Entries, json!({"a": 1, "b": 2}), json!([["a", 1], ["b", 2]]) ; "entries of object")]
    #[test_case(EnumerateOp::Entries, json!(["x", "y"]), json!([[0, "x"], [1, "y"]]) ; "entries of array")]
    #[test_case(EnumerateOp::Elements, json!(null), json!([]) ; "null is empty")]
    fn test_expand(op: EnumerateOp, value: Value, expected: Value) {
        let expanded = expand(&node(op, value), meta::ENUMERATE);
        assert_eq!(expanded.value, Some(expected));
        assert_eq!(expanded.meta, meta::ENUMERATE);
    }

    #[test]
    fn test_undefined_is_empty() {
        let mut undefined = node(EnumerateOp::Entries, json!(1));
        undefined.value = None;
        assert_eq!(expand(&undefined, 4).value, Some(json!([])));
    }

    #[test]
    fn test_without_operator_passes_through() {
        let plain = AstNode::new("a").with_value(json!({"a": 1}));
        assert_eq!(expand(&plain, 4), plain);
    }
}
