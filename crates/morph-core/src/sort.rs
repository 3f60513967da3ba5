//! Comparator builder for ordering JSON entities by a named field.

use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

/// Key mapping applied to field values before comparison
pub type KeyMapping = Box<dyn Fn(&Value) -> Value + Send + Sync>;

/// Options for [`sort_by`]
pub struct SortOptions {
    /// Transform applied to each field value before comparing
    pub mapping: Option<KeyMapping>,
    /// Ascending (default) or descending order
    pub ascending: bool,
}

impl Default for SortOptions {
    fn default() -> Self {
        Self {
            mapping: None,
            ascending: true,
        }
    }
}

impl fmt::Debug for SortOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortOptions")
            .field("mapping", &self.mapping.is_some())
            .field("ascending", &self.ascending)
            .finish()
    }
}

impl SortOptions {
    /// Ascending order, no mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Reverse the order
    pub fn descending(mut self) -> Self {
        self.ascending = false;
        self
    }

    /// Compare mapped keys instead of raw field values
    pub fn with_mapping(mut self, mapping: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        self.mapping = Some(Box::new(mapping));
        self
    }
}

/// Build a comparator ordering entities by `field`.
///
/// Objects are read by member name and arrays by index (`"0"` selects the
/// first element), so tuples such as `["$2", "fn"]` sort by their first slot.
/// A missing field compares as null.
pub fn sort_by(field: impl Into<String>, options: SortOptions) -> impl Fn(&Value, &Value) -> Ordering {
    let field = field.into();
    move |a, b| {
        let (a, b) = if options.ascending { (a, b) } else { (b, a) };
        let (a, b) = (field_of(a, &field), field_of(b, &field));
        match &options.mapping {
            Some(mapping) => compare_values(&mapping(&a), &mapping(&b)),
            None => compare_values(&a, &b),
        }
    }
}

fn field_of(entity: &Value, field: &str) -> Value {
    let found = match entity {
        Value::Object(map) => map.get(field),
        Value::Array(items) => field.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    };
    found.cloned().unwrap_or(Value::Null)
}

/// Total order over JSON values.
///
/// Values of different types order as null < boolean < number < string <
/// array < object. Numbers compare numerically, strings lexicographically,
/// arrays element by element.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            match (x.as_i64(), y.as_i64()) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => {
                    let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
                    x.partial_cmp(&y).unwrap_or(Ordering::Equal)
                }
            }
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (x, y) in x.iter().zip(y.iter()) {
                let ord = compare_values(x, y);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        (Value::Object(x), Value::Object(y)) => {
            if a == b {
                Ordering::Equal
            } else {
                x.len()
                    .cmp(&y.len())
                    .then_with(|| a.to_string().cmp(&b.to_string()))
            }
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sort_objects_by_field() {
        let mut people = vec![
            json!({"name": "b", "age": 30}),
            json!({"name": "a", "age": 25}),
            json!({"name": "c", "age": 35}),
        ];
        people.sort_by(sort_by("age", SortOptions::new()));
        let names: Vec<_> = people.iter().map(|p| p["name"].clone()).collect();
        assert_eq!(names, vec![json!("a"), json!("b"), json!("c")]);
    }

    #[test]
    fn test_sort_descending() {
        let mut items = vec![json!({"n": 1}), json!({"n": 3}), json!({"n": 2})];
        items.sort_by(sort_by("n", SortOptions::new().descending()));
        assert_eq!(items, vec![json!({"n": 3}), json!({"n": 2}), json!({"n": 1})]);
    }

    #[test]
    fn test_sort_tuples_with_mapping() {
        let mut tuples = vec![json!(["$10", "c"]), json!(["$2", "b"]), json!(["$1", "a"])];
        let ordinal = |v: &Value| {
            v.as_str()
                .and_then(|s| s.trim_start_matches('$').parse::<u64>().ok())
                .map(Value::from)
                .unwrap_or(Value::Null)
        };
        tuples.sort_by(sort_by("0", SortOptions::new().with_mapping(ordinal)));
        assert_eq!(tuples[0], json!(["$1", "a"]));
        assert_eq!(tuples[2], json!(["$10", "c"]));
    }

    #[test]
    fn test_compare_values_across_types() {
        assert_eq!(compare_values(&json!(null), &json!(false)), Ordering::Less);
        assert_eq!(compare_values(&json!(2), &json!(10)), Ordering::Less);
        assert_eq!(compare_values(&json!(1.5), &json!(1)), Ordering::Greater);
        assert_eq!(compare_values(&json!("10"), &json!("2")), Ordering::Less);
        assert_eq!(compare_values(&json!([1, 2]), &json!([1, 2, 0])), Ordering::Less);
    }
}
