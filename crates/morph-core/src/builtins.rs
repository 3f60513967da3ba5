//! Standard pipe functions.
//!
//! Every builtin receives its bound arguments first and the piped value
//! last, so `take:2` applied to `[1, 2, 3]` calls `take(2, [1, 2, 3])`.

use crate::registry::{FunctionError, FunctionRegistry};
use crate::sort::compare_values;
use crate::value::{is_truthy, type_name};
use serde_json::{Number, Value};
use std::cmp::Ordering;

type FnResult = Result<Value, FunctionError>;

impl FunctionRegistry {
    /// Registry preloaded with the standard functions
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("toInt", to_int);
        registry.register("toFloat", to_float);
        registry.register("toString", |args| unary(args).map(|v| Value::String(to_text(v))));
        registry.register("toBool", |args| unary(args).map(|v| Value::Bool(is_truthy(v))));
        registry.register("not", |args| unary(args).map(|v| Value::Bool(!is_truthy(v))));
        registry.register("upper", |args| map_str(args, |s| s.to_uppercase()));
        registry.register("lower", |args| map_str(args, |s| s.to_lowercase()));
        registry.register("trim", |args| map_str(args, |s| s.trim().to_string()));
        registry.register("length", length);
        registry.register("take", take);
        registry.register("split", split);
        registry.register("join", join);
        registry.register("equals", equals);
        registry.register("sum", sum);
        registry.register("keys", keys);
        registry.register("values", values);
        registry.register("reverse", reverse);
        registry
    }
}

fn unary(args: &[Value]) -> Result<&Value, FunctionError> {
    match args {
        [value] => Ok(value),
        _ => Err(FunctionError::Arity {
            expected: "1",
            found: args.len(),
        }),
    }
}

fn binary(args: &[Value]) -> Result<(&Value, &Value), FunctionError> {
    match args {
        [first, second] => Ok((first, second)),
        _ => Err(FunctionError::Arity {
            expected: "2",
            found: args.len(),
        }),
    }
}

fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn expect_str(value: &Value, index: usize) -> Result<&str, FunctionError> {
    value
        .as_str()
        .ok_or_else(|| FunctionError::invalid(index, format!("expected string, got {}", type_name(value))))
}

fn expect_count(value: &Value, index: usize) -> Result<usize, FunctionError> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| FunctionError::invalid(index, format!("expected a count, got {}", n))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| FunctionError::invalid(index, format!("expected a count, got '{}'", s))),
        other => Err(FunctionError::invalid(
            index,
            format!("expected a count, got {}", type_name(other)),
        )),
    }
}

fn map_str(args: &[Value], f: impl Fn(&str) -> String) -> FnResult {
    let value = unary(args)?;
    Ok(Value::String(f(expect_str(value, 0)?)))
}

/// `toInt(value)` or `toInt(radix, value)`
fn to_int(args: &[Value]) -> FnResult {
    let (radix, value, index) = match args {
        [value] => (10, value, 0),
        [radix, value] => {
            let count = expect_count(radix, 0)?;
            let radix = u32::try_from(count)
                .map_err(|_| FunctionError::invalid(0, format!("radix {} out of range", count)))?;
            (radix, value, 1)
        }
        _ => {
            return Err(FunctionError::Arity {
                expected: "1..=2",
                found: args.len(),
            })
        }
    };

    if !(2..=36).contains(&radix) {
        return Err(FunctionError::invalid(0, format!("radix {} out of range", radix)));
    }

    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
        Value::Number(n) => Ok(Value::from(n.as_f64().unwrap_or(0.0).trunc() as i64)),
        Value::Bool(b) => Ok(Value::from(i64::from(*b))),
        Value::String(s) => i64::from_str_radix(s.trim(), radix)
            .map(Value::from)
            .map_err(|_| FunctionError::invalid(index, format!("'{}' is not an integer", s))),
        other => Err(FunctionError::invalid(
            index,
            format!("cannot convert {} to integer", type_name(other)),
        )),
    }
}

fn to_float(args: &[Value]) -> FnResult {
    let value = unary(args)?;
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    parsed
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| FunctionError::invalid(0, format!("cannot convert {} to float", value)))
}

fn length(args: &[Value]) -> FnResult {
    let len = match unary(args)? {
        Value::Null => 0,
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        other => {
            return Err(FunctionError::invalid(
                0,
                format!("{} has no length", type_name(other)),
            ))
        }
    };
    Ok(Value::from(len))
}

/// `take(n, value)`: first `n` items of an array or characters of a string
fn take(args: &[Value]) -> FnResult {
    let (count, value) = binary(args)?;
    let count = expect_count(count, 0)?;
    match value {
        Value::Array(items) => Ok(Value::Array(items.iter().take(count).cloned().collect())),
        Value::String(s) => Ok(Value::String(s.chars().take(count).collect())),
        other => Err(FunctionError::invalid(
            1,
            format!("cannot take from {}", type_name(other)),
        )),
    }
}

/// `split(separator, string)`
fn split(args: &[Value]) -> FnResult {
    let (separator, value) = binary(args)?;
    let separator = expect_str(separator, 0)?;
    let text = expect_str(value, 1)?;
    Ok(Value::Array(
        text.split(separator)
            .map(|part| Value::String(part.to_string()))
            .collect(),
    ))
}

/// `join(separator, array)`
fn join(args: &[Value]) -> FnResult {
    let (separator, value) = binary(args)?;
    let separator = expect_str(separator, 0)?;
    let items = value
        .as_array()
        .ok_or_else(|| FunctionError::invalid(1, format!("expected array, got {}", type_name(value))))?;
    Ok(Value::String(
        items.iter().map(to_text).collect::<Vec<_>>().join(separator),
    ))
}

fn equals(args: &[Value]) -> FnResult {
    let (left, right) = binary(args)?;
    Ok(Value::Bool(compare_values(left, right) == Ordering::Equal))
}

fn sum(args: &[Value]) -> FnResult {
    let value = unary(args)?;
    let items = value
        .as_array()
        .ok_or_else(|| FunctionError::invalid(0, format!("expected array, got {}", type_name(value))))?;

    let mut integer: i64 = 0;
    let mut float: f64 = 0.0;
    let mut is_float = false;
    for (i, item) in items.iter().enumerate() {
        let Value::Number(n) = item else {
            return Err(FunctionError::invalid(0, format!("item {} is not a number", i)));
        };
        match n.as_i64() {
            Some(x) if !is_float => match integer.checked_add(x) {
                Some(total) => integer = total,
                None => {
                    is_float = true;
                    float = integer as f64 + x as f64;
                }
            },
            _ => {
                if !is_float {
                    is_float = true;
                    float = integer as f64;
                }
                float += n.as_f64().unwrap_or(0.0);
            }
        }
    }

    if is_float {
        Number::from_f64(float)
            .map(Value::Number)
            .ok_or_else(|| FunctionError::Failed("sum is not finite".to_string()))
    } else {
        Ok(Value::from(integer))
    }
}

fn keys(args: &[Value]) -> FnResult {
    match unary(args)? {
        Value::Object(map) => Ok(Value::Array(
            map.keys().map(|k| Value::String(k.clone())).collect(),
        )),
        Value::Array(items) => Ok(Value::Array((0..items.len()).map(Value::from).collect())),
        other => Err(FunctionError::invalid(
            0,
            format!("{} has no keys", type_name(other)),
        )),
    }
}

fn values(args: &[Value]) -> FnResult {
    match unary(args)? {
        Value::Object(map) => Ok(Value::Array(map.values().cloned().collect())),
        Value::Array(items) => Ok(Value::Array(items.clone())),
        other => Err(FunctionError::invalid(
            0,
            format!("{} has no values", type_name(other)),
        )),
    }
}

fn reverse(args: &[Value]) -> FnResult {
    match unary(args)? {
        Value::Array(items) => Ok(Value::Array(items.iter().rev().cloned().collect())),
        Value::String(s) => Ok(Value::String(s.chars().rev().collect())),
        other => Err(FunctionError::invalid(
            0,
            format!("cannot reverse {}", type_name(other)),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    fn call(name: &str, args: &[Value]) -> FnResult {
        let registry = FunctionRegistry::with_builtins();
        let function = registry.get(name).expect("builtin registered");
        function(args)
    }

    #[test_case("toInt", &[json!("42")], json!(42) ; "to int from string")]
    #[test_case("toInt", &[json!(16), json!("ff")], json!(255) ; "to int with radix")]
    #[test_case("toInt", &[json!(3.9)], json!(3) ; "to int truncates")]
    #[test_case("toFloat", &[json!("1.5")], json!(1.5) ; "to float")]
    #[test_case("toString", &[json!(7)], json!("7") ; "to string")]
    #[test_case("toBool", &[json!("")], json!(false) ; "empty string is false")]
    #[test_case("not", &[json!(0)], json!(true) ; "not zero")]
    #[test_case("upper", &[json!("ab")], json!("AB") ; "upper")]
    #[test_case("trim", &[json!("  ab ")], json!("ab") ; "trim")]
    #[test_case("length", &[json!([1, 2])], json!(2) ; "length of array")]
    #[test_case("take", &[json!(2), json!([1, 2, 3])], json!([1, 2]) ; "take from array")]
    #[test_case("take", &[json!("2"), json!("abc")], json!("ab") ; "take from string")]
    #[test_case("split", &[json!(","), json!("a,b")], json!(["a", "b"]) ; "split")]
    #[test_case("join", &[json!("-"), json!(["a", 1])], json!("a-1") ; "join")]
    #[test_case("equals", &[json!(100), json!(100.0)], json!(true) ; "equals numeric")]
    #[test_case("sum", &[json!([1, 2, 3])], json!(6) ; "sum integers")]
    #[test_case("sum", &[json!([1, 2.5])], json!(3.5) ; "sum floats")]
    #[test_case("keys", &[json!({"b": 1, "a": 2})], json!(["b", "a"]) ; "keys in order")]
    #[test_case("values", &[json!({"b": 1, "a": 2})], json!([1, 2]) ; "values in order")]
    #[test_case("reverse", &[json!([1, 2])], json!([2, 1]) ; "reverse")]
    fn test_builtin(name: &str, args: &[Value], expected: Value) {
        assert_eq!(call(name, args).unwrap(), expected);
    }

    #[test]
    fn test_arity_error() {
        let err = call("upper", &[json!("a"), json!("b")]).unwrap_err();
        assert_eq!(
            err,
            FunctionError::Arity {
                expected: "1",
                found: 2
            }
        );
    }

    #[test]
    fn test_type_error() {
        let err = call("upper", &[json!(1)]).unwrap_err();
        assert!(matches!(err, FunctionError::InvalidArgument { index: 0, .. }));
    }

    #[test]
    fn test_radix_out_of_range() {
        for radix in [json!(1), json!(37), json!(4294967306u64)] {
            let err = call("toInt", &[radix.clone(), json!("10")]).unwrap_err();
            assert!(
                matches!(err, FunctionError::InvalidArgument { index: 0, .. }),
                "radix {}",
                radix
            );
        }
    }
}
