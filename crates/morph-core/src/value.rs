//! Uniform iteration and literal helpers over JSON values.

use serde_json::Value;

/// True for arrays and objects
pub fn is_container(value: &Value) -> bool {
    matches!(value, Value::Array(_) | Value::Object(_))
}

/// JSON type name used in diagnostics
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Children of a container in declaration order.
///
/// Arrays yield their items and objects their member values. A scalar is a
/// sequence of one and null is empty.
pub fn elements(value: &Value) -> Vec<Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.clone(),
        Value::Object(map) => map.values().cloned().collect(),
        scalar => vec![scalar.clone()],
    }
}

/// `[index, item]` / `[key, value]` pairs in declaration order.
///
/// Follows the same rules as [`elements`] for scalars and null.
pub fn entries(value: &Value) -> Vec<Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| Value::Array(vec![Value::from(i), item.clone()]))
            .collect(),
        Value::Object(map) => map
            .iter()
            .map(|(key, item)| Value::Array(vec![Value::String(key.clone()), item.clone()]))
            .collect(),
        scalar => vec![Value::Array(vec![Value::from(0), scalar.clone()])],
    }
}

/// Interpret operator argument text as JSON, falling back to a string.
///
/// `"7"` becomes `7`, `"true"` becomes `true`, `"\"x\""` becomes `"x"` and
/// `"abc"` stays `"abc"`.
pub fn parse_literal(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Argument text as a value, honoring the literal coercion switch
pub(crate) fn argument(text: &str, coerce: bool) -> Value {
    if coerce {
        parse_literal(text)
    } else {
        Value::String(text.to_string())
    }
}

/// Truthiness used by builtin predicates
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
