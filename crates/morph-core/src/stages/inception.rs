//! Inception: recursive template composition.
//!
//! The composer never renders templates itself. The driver injects a
//! [`Transform`] that renders one sub-template against a document, and the
//! composer decides which documents each sub-template sees:
//!
//! - `.` lens: each sub-template renders the previous one's output,
//!   starting from the node's value
//! - `>` lead: the first sub-template renders the origin document into a
//!   scoped document, then every sub-template renders against it
//! - `%` zip: the leader renders the origin document into a sequence and
//!   the remaining sub-templates are aligned with its elements
//!
//! Every sub-template is rendered whatever the depth. The depth bounds
//! nesting instead: each render is handed the budget left below this level,
//! and a driver composing a nested inception caps that node's own depth
//! with it (see [`Depth::within`]). A composition at depth 0 fails with
//! [`OperatorError::DepthExceeded`]. An unbounded depth ends when the
//! driver runs out of nested templates.

use crate::ast::AstNode;
use crate::context::Environment;
use crate::error::{OperatorError, OperatorResult};
use crate::operators::{Depth, InceptionMode};
use crate::value::type_name;
use serde_json::Value;
use tracing::{debug, trace};

/// Renders one sub-template against a document
pub trait Transform {
    /// Template representation understood by the driver
    type Template;

    /// Render `template` with `document` as its scope. `depth` is the
    /// nesting budget left for inceptions inside `template`.
    fn transform(
        &self,
        template: &Self::Template,
        document: &Value,
        depth: Depth,
    ) -> OperatorResult<Value>;
}

/// Copy the declared inception operator into the `$inception` and
/// `$depth` fields. Nodes without one are returned unchanged.
pub fn preprocess(node: &AstNode) -> AstNode {
    let mut node = node.clone();
    if let Some(op) = node.operators.inception {
        node.inception = Some(op.mode);
        node.depth = Some(op.depth);
    }
    node
}

/// Compose `templates` according to the node's inception mode.
///
/// The node is preprocessed first when its `$inception` field is unset.
/// Without an inception operator the node passes through.
pub fn incept<T: Transform + ?Sized>(
    node: &AstNode,
    templates: &[T::Template],
    transformer: &T,
    env: &Environment,
    meta: u8,
) -> OperatorResult<AstNode> {
    let node = if node.inception.is_none() {
        preprocess(node)
    } else {
        node.clone()
    };
    let Some(mode) = node.inception else {
        return Ok(node);
    };

    let depth = node.depth.unwrap_or(Depth::Unbounded);
    let inner = depth.descend().ok_or(OperatorError::DepthExceeded {
        operator: mode.symbol(),
    })?;
    trace!(
        mode = %mode,
        depth = ?depth,
        templates = templates.len(),
        "inception"
    );

    let render = Render {
        transformer,
        depth: inner,
    };
    let value = match mode {
        InceptionMode::Lens => lens(&node, templates, &render)?,
        InceptionMode::Lead => lead(templates, &render, env)?,
        InceptionMode::Zip => zip(templates, &render, env)?,
    };

    Ok(node.resolved(Some(value), meta))
}

/// A transformer paired with the nesting budget for its renders
struct Render<'t, T: ?Sized> {
    transformer: &'t T,
    depth: Depth,
}

impl<T: Transform + ?Sized> Render<'_, T> {
    fn render(&self, template: &T::Template, document: &Value) -> OperatorResult<Value> {
        self.transformer.transform(template, document, self.depth)
    }
}

fn lens<T: Transform + ?Sized>(
    node: &AstNode,
    templates: &[T::Template],
    render: &Render<'_, T>,
) -> OperatorResult<Value> {
    let base = node.value.clone().unwrap_or(Value::Null);
    templates
        .iter()
        .try_fold(base, |document, template| render.render(template, &document))
}

fn lead<T: Transform + ?Sized>(
    templates: &[T::Template],
    render: &Render<'_, T>,
    env: &Environment,
) -> OperatorResult<Value> {
    let Some(leader) = templates.first() else {
        return Ok(Value::Array(Vec::new()));
    };

    let scoped = render.render(leader, &env.origin())?;
    templates
        .iter()
        .map(|template| render.render(template, &scoped))
        .collect::<OperatorResult<Vec<_>>>()
        .map(Value::Array)
}

fn zip<T: Transform + ?Sized>(
    templates: &[T::Template],
    render: &Render<'_, T>,
    env: &Environment,
) -> OperatorResult<Value> {
    let Some((leader, rest)) = templates.split_first() else {
        return Ok(Value::Array(Vec::new()));
    };

    let scoped = render.render(leader, &env.origin())?;
    let documents = match scoped {
        Value::Array(documents) => documents,
        other => {
            return Err(OperatorError::TypeMismatch {
                operator: InceptionMode::Zip.symbol(),
                expected: "array",
                found: type_name(&other),
            })
        }
    };

    let rendered = match rest {
        [template] => documents
            .iter()
            .map(|document| render.render(template, document))
            .collect::<OperatorResult<Vec<_>>>()?,
        _ => {
            if rest.len() != documents.len() {
                debug!(
                    templates = rest.len(),
                    documents = documents.len(),
                    "zip lengths differ, truncating to the shorter"
                );
            }
            rest.iter()
                .zip(&documents)
                .map(|(template, document)| render.render(template, document))
                .collect::<OperatorResult<Vec<_>>>()?
        }
    };

    Ok(Value::Array(rendered))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::meta;
    use crate::context::Sources;
    use crate::operators::Operators;
    use crate::path::{normalize, JsonPathQuery, PathQuery};
    use serde_json::json;

    /// Templates are paths; rendering returns the last match
    struct PathTransform;

    impl Transform for PathTransform {
        type Template = String;

        fn transform(&self, template: &String, document: &Value, _depth: Depth) -> OperatorResult<Value> {
            let matches = JsonPathQuery.query(document, &normalize(template))?;
            Ok(matches.last().cloned().unwrap_or(Value::Null))
        }
    }

    fn node(token: &str, value: Value) -> AstNode {
        AstNode::new("a")
            .with_operators(Operators {
                inception: Some(token.parse().unwrap()),
                ..Operators::default()
            })
            .with_value(value)
    }

    fn templates(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    fn env(origin: Value) -> Environment {
        Environment::new(Sources::new().with_source("origin", origin))
    }

    #[test]
    fn test_preprocess() {
        let processed = preprocess(&node("..", json!(null)));
        assert_eq!(processed.inception, Some(InceptionMode::Lens));
        assert_eq!(processed.depth, Some(Depth::Finite(2)));

        let plain = AstNode::new("a");
        assert_eq!(preprocess(&plain), plain);
    }

    #[test]
    fn test_lens_drills_down() {
        let base = json!({"a": {"b": {"c": 1}}, "b": "wrong"});
        let result = incept(
            &node(".", base),
            &templates(&["a", "b"]),
            &PathTransform,
            &env(json!(null)),
            meta::INCEPTION,
        )
        .unwrap();
        assert_eq!(result.value, Some(json!({"c": 1})));
        assert_eq!(result.meta, meta::INCEPTION);
    }

    /// Renders the nesting budget it was handed
    struct DepthEcho;

    impl Transform for DepthEcho {
        type Template = ();

        fn transform(&self, _template: &(), _document: &Value, depth: Depth) -> OperatorResult<Value> {
            Ok(serde_json::to_value(depth).unwrap_or(Value::Null))
        }
    }

    #[test]
    fn test_depth_does_not_drop_templates() {
        let base = json!({"a": {"b": 1}});
        let result = incept(&node(".1", base), &templates(&["a", "b"]), &PathTransform, &env(json!(null)), 5)
            .unwrap();
        assert_eq!(result.value, Some(json!(1)));

        let origin = json!({"s": {"s": "S", "a": 1, "b": 2, "c": 3}});
        let result = incept(
            &node(">2", json!(null)),
            &templates(&["s", "a", "b", "c"]),
            &PathTransform,
            &env(origin),
            5,
        )
        .unwrap();
        assert_eq!(result.value, Some(json!(["S", 1, 2, 3])));
    }

    #[test]
    fn test_renders_receive_remaining_depth() {
        let units = [(), ()];
        for (token, expected) in [(".3", json!(2)), (">>", json!([1, 1])), (">", json!(["unbounded", "unbounded"]))] {
            let result = incept(&node(token, json!(null)), &units[..], &DepthEcho, &env(json!(null)), 5).unwrap();
            assert_eq!(result.value, Some(expected), "{}", token);
        }
    }

    #[test]
    fn test_zero_depth_fails() {
        let err = incept(&node(".0", json!(null)), &templates(&["a"]), &PathTransform, &env(json!(null)), 5)
            .unwrap_err();
        assert!(matches!(err, OperatorError::DepthExceeded { operator: '.' }));
    }

    #[test]
    fn test_lead_renders_all_against_scoped() {
        let origin = json!({"user": {"user": "nested", "name": "ada"}});
        let result = incept(
            &node(">", json!(null)),
            &templates(&["user", "name"]),
            &PathTransform,
            &env(origin),
            5,
        )
        .unwrap();
        assert_eq!(result.value, Some(json!(["nested", "ada"])));
    }

    #[test]
    fn test_zip_broadcast() {
        let origin = json!({"items": [{"v": 1}, {"v": 2}]});
        let result = incept(
            &node("%", json!(null)),
            &templates(&["items", "v"]),
            &PathTransform,
            &env(origin),
            5,
        )
        .unwrap();
        assert_eq!(result.value, Some(json!([1, 2])));
    }

    #[test]
    fn test_zip_aligns_and_truncates() {
        let origin = json!({"items": [{"a": 1, "b": 2}, {"a": 3, "b": 4}, {"a": 5}]});
        let result = incept(
            &node("%", json!(null)),
            &templates(&["items", "a", "b"]),
            &PathTransform,
            &env(origin),
            5,
        )
        .unwrap();
        assert_eq!(result.value, Some(json!([1, 4])));
    }

    #[test]
    fn test_zip_requires_sequence() {
        let origin = json!({"items": {"not": "a list"}});
        let err = incept(
            &node("%", json!(null)),
            &templates(&["items", "not"]),
            &PathTransform,
            &env(origin),
            5,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Inception operator [%] expected array, found object"
        );
    }

    #[test]
    fn test_no_templates() {
        let none: Vec<String> = Vec::new();
        for (token, expected) in [(".", json!("base")), (">", json!([])), ("%", json!([]))] {
            let result = incept(&node(token, json!("base")), &none, &PathTransform, &env(json!(null)), 5)
                .unwrap();
            assert_eq!(result.value, Some(expected), "{}", token);
        }
    }

    #[test]
    fn test_without_inception_passes_through() {
        let plain = AstNode::new("a").with_value(json!(1));
        let result = incept(&plain, &templates(&["x"]), &PathTransform, &env(json!(null)), 5).unwrap();
        assert_eq!(result, plain);
    }
}
