//! Constraint resolver: soft defaults, alternate sources and tag handlers.
//!
//! Nothing here fails on missing data. An unregistered source dereferences
//! to an empty sequence, an unknown tag handler yields null, and an absent
//! default leaves the value undefined (`?`) or null (`!=`).

use crate::ast::AstNode;
use crate::context::Environment;
use crate::error::OperatorResult;
use crate::operators::ConstraintOp;
use crate::stages::{deref, query};
use crate::tags::TagTable;
use crate::value::argument;
use serde_json::Value;
use tracing::{debug, trace};

/// Apply the node's constraint operator, if it declares one
pub fn resolve(
    node: &AstNode,
    env: &Environment,
    tags: &TagTable,
    meta: u8,
) -> OperatorResult<AstNode> {
    let Some(op) = &node.operators.constraints else {
        return Ok(node.clone());
    };
    let coerce = env.config().literal_arguments;

    let value = match op {
        ConstraintOp::Default { .. } if node.value.is_some() => node.value.clone(),
        ConstraintOp::Default {
            literal: Some(literal),
            ..
        } => Some(argument(literal, coerce)),
        ConstraintOp::Default {
            source,
            literal: None,
        } => {
            let source = source
                .as_deref()
                .unwrap_or(&env.config().fallback_source);
            lookup(node, env, tags, source, meta)?
        }
        ConstraintOp::AltSource { source, literal } => {
            let found = if source.is_empty() {
                Some(Value::Null)
            } else {
                lookup(node, env, tags, source, meta)?
            };
            found.or_else(|| Some(literal.as_deref().map_or(Value::Null, |l| argument(l, coerce))))
        }
        ConstraintOp::TagHandler { handler, args } => {
            let handler_fn = handler
                .as_deref()
                .and_then(|name| env.tag_handlers().get(name));
            match handler_fn {
                Some(handler_fn) => {
                    let args: Vec<Value> = args.iter().map(|a| argument(a, coerce)).collect();
                    Some(handler_fn(node.value.as_ref(), &args))
                }
                None => {
                    debug!(handler = ?handler, "tag handler not registered, resolving to null");
                    Some(Value::Null)
                }
            }
        }
    };

    trace!(constraint = %op, value = ?value, "constraint resolved");
    Ok(node.resolved(value, meta))
}

/// Re-run dereference and query against another source.
///
/// The configured tag source name resolves to the tag table's document.
fn lookup(
    node: &AstNode,
    env: &Environment,
    tags: &TagTable,
    source: &str,
    meta: u8,
) -> OperatorResult<Option<Value>> {
    let document = if source == env.config().tag_source {
        Some(tags.document())
    } else {
        env.sources().get(source)
    };
    if document.is_none() {
        debug!(source, path = %node.path, "alternate source not registered");
    }

    let dereferenced = deref::deref_document(node, document, meta, env.path_query())?;
    Ok(query::select(&dereferenced, meta).value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::meta;
    use crate::context::Sources;
    use crate::operators::Operators;
    use crate::registry::TagHandlerRegistry;
    use morph_config::EngineConfig;
    use serde_json::json;

    fn env() -> Environment {
        let sources = Sources::new()
            .with_source("origin", json!({"name": "ada"}))
            .with_source("default", json!({"name": "fallback", "age": 36}))
            .with_source("alt", json!({"name": "alt-ada"}));
        let handlers = TagHandlerRegistry::new().with_handler("wrap", |value, args| {
            json!({"value": value.cloned(), "args": args})
        });
        Environment::new(sources).with_tag_handlers(handlers)
    }

    fn node(path: &str, token: &str, value: Option<Value>) -> AstNode {
        AstNode {
            value,
            ..AstNode::new(path).with_operators(Operators {
                constraints: Some(token.parse().unwrap()),
                ..Operators::default()
            })
        }
    }

    fn run(node: &AstNode) -> Option<Value> {
        resolve(node, &env(), &TagTable::new(), meta::CONSTRAINTS)
            .unwrap()
            .value
    }

    #[test]
    fn test_soft_default_keeps_defined_value() {
        assert_eq!(run(&node("name", "?=:7", Some(json!(5)))), Some(json!(5)));
        assert_eq!(run(&node("name", "?", Some(Value::Null))), Some(Value::Null));
    }

    #[test]
    fn test_soft_default_literal() {
        assert_eq!(run(&node("missing", "?=:7", None)), Some(json!(7)));
        assert_eq!(run(&node("missing", "?=:abc", None)), Some(json!("abc")));
    }

    #[test]
    fn test_soft_default_literal_without_coercion() {
        let config = EngineConfig {
            literal_arguments: false,
            ..EngineConfig::default()
        };
        let env = env().with_config(config);
        let resolved = resolve(&node("missing", "?=:7", None), &env, &TagTable::new(), 2).unwrap();
        assert_eq!(resolved.value, Some(json!("7")));
    }

    #[test]
    fn test_soft_default_fallback_source() {
        assert_eq!(run(&node("age", "?", None)), Some(json!(36)));
        assert_eq!(run(&node("name", "?=alt", None)), Some(json!("alt-ada")));
        assert_eq!(run(&node("name", "?=nowhere", None)), None);
    }

    #[test]
    fn test_alt_source_lookup() {
        assert_eq!(run(&node("name", "!=alt", Some(json!("x")))), Some(json!("alt-ada")));
        assert_eq!(run(&node("age", "!=alt:0", None)), Some(json!(0)));
        assert_eq!(run(&node("age", "!=alt", None)), Some(Value::Null));
    }

    #[test]
    fn test_alt_source_empty_is_null() {
        assert_eq!(run(&node("name", "!=", None)), Some(Value::Null));
        assert_eq!(run(&node("name", "!=:7", Some(json!(1)))), Some(Value::Null));
    }

    #[test]
    fn test_alt_source_reads_tag_table() {
        let mut tags = TagTable::new();
        tags.insert("user.name", json!("tagged")).unwrap();
        let resolved = resolve(&node("user.name", "!=tags", None), &env(), &tags, 2).unwrap();
        assert_eq!(resolved.value, Some(json!("tagged")));
    }

    #[test]
    fn test_tag_handler() {
        assert_eq!(
            run(&node("name", "!wrap:3", Some(json!("v")))),
            Some(json!({"value": "v", "args": [3]}))
        );
        assert_eq!(
            run(&node("name", "!wrap", None)),
            Some(json!({"value": null, "args": []}))
        );
    }

    #[test]
    fn test_missing_tag_handler_is_null() {
        assert_eq!(run(&node("name", "!nope", Some(json!(1)))), Some(Value::Null));
        assert_eq!(run(&node("name", "!", Some(json!(1)))), Some(Value::Null));
    }

    #[test]
    fn test_without_constraint_passes_through() {
        let plain = AstNode::new("name").with_value(json!(1));
        let resolved = resolve(&plain, &env(), &TagTable::new(), meta::CONSTRAINTS).unwrap();
        assert_eq!(resolved, plain);
    }

    #[test]
    fn test_marks_meta() {
        let resolved = resolve(&node("name", "?", Some(json!(1))), &env(), &TagTable::new(), 9).unwrap();
        assert_eq!(resolved.meta, 9);
    }
}
