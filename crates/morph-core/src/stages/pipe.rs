//! Pipe executor.
//!
//! A pipes mapping such as `{"$1": "toInt", "$2": "take:2", "@meta": 3}`
//! declares an ordered function pipeline. Only `$`-prefixed keys take part,
//! ordered by their numeric ordinal, and the first ordinal runs first.

use crate::ast::AstNode;
use crate::context::Environment;
use crate::error::{OperatorError, OperatorResult};
use crate::operators::split_args;
use crate::sort::{sort_by, SortOptions};
use crate::stages::partial::Partial;
use serde_json::{Map, Value};
use tracing::trace;

/// Key prefix marking a pipeline entry
pub const ORDINAL_MARKER: char = '$';

/// Run the node's pipes over its value, if it declares any.
///
/// Every function is resolved before any of them runs, so an unknown name
/// fails the node even when an earlier function would have failed too.
pub fn run(node: &AstNode, env: &Environment, meta: u8) -> OperatorResult<AstNode> {
    let Some(pipes) = &node.pipes else {
        return Ok(node.clone());
    };

    let pipeline = resolve(pipes, env)?;
    let mut value = node.value.clone().unwrap_or(Value::Null);
    for stage in &pipeline {
        trace!(function = stage.name(), "applying pipe");
        value = stage.apply(value)?;
    }

    Ok(node.resolved(Some(value), meta))
}

/// Ordered, resolved pipeline for a pipes mapping
pub fn resolve(pipes: &Map<String, Value>, env: &Environment) -> OperatorResult<Vec<Partial>> {
    let mut entries = Vec::new();
    for (key, expression) in pipes {
        let Some(ordinal) = key.strip_prefix(ORDINAL_MARKER) else {
            continue;
        };
        if ordinal.parse::<u64>().is_err() {
            return Err(OperatorError::InvalidPipeOrdinal { key: key.clone() });
        }
        if !expression.is_string() {
            return Err(OperatorError::InvalidPipeExpression {
                key: key.clone(),
                message: format!("expected a function expression, got {}", expression),
            });
        }
        entries.push(Value::Array(vec![Value::String(key.clone()), expression.clone()]));
    }
    entries.sort_by(sort_by("0", SortOptions::new().with_mapping(ordinal_key)));

    entries
        .iter()
        .map(|entry| {
            let key = entry[0].as_str().unwrap_or_default();
            let expression = entry[1].as_str().unwrap_or_default();
            partial(key, expression, env)
        })
        .collect()
}

fn ordinal_key(key: &Value) -> Value {
    key.as_str()
        .and_then(|key| key.trim_start_matches(ORDINAL_MARKER).parse::<u64>().ok())
        .map_or(Value::Null, Value::from)
}

fn partial(key: &str, expression: &str, env: &Environment) -> OperatorResult<Partial> {
    let mut parts = split_args(expression).into_iter();
    let name = parts.next().unwrap_or_default();
    if name.is_empty() {
        return Err(OperatorError::InvalidPipeExpression {
            key: key.to_string(),
            message: "missing function name".to_string(),
        });
    }

    let function = env
        .functions()
        .get(&name)
        .cloned()
        .ok_or_else(|| OperatorError::unresolved(&name))?;
    let args: Vec<String> = parts.collect();
    Partial::build(name, function, &args, env.config().literal_arguments)
}
