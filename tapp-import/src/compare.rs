//! Structural equality for diffing imported records
//!
//! Spreadsheet cells that are missing, explicitly null or empty strings all
//! mean "no value", so they compare equal to each other. They never compare
//! equal to `0` or `false`.
//!
//! Arrays are compared without regard to order: both sides are sorted on a
//! copy before the element-wise comparison, so a list cell whose entries
//! were reordered is not reported as a change.

use serde_json::{Map, Number, Value};

/// True for `null` and `""`
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Equivalence of two values for diffing purposes
pub fn is_same(a: &Value, b: &Value) -> bool {
    if a == b {
        return true;
    }

    if is_blank(a) || is_blank(b) {
        return is_blank(a) && is_blank(b);
    }

    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y || (x.is_nan() && y.is_nan()),
            _ => false,
        },
        (Value::Array(x), Value::Array(y)) => arrays_same(x, y),
        (Value::Object(x), Value::Object(y)) => objects_same(x, y),
        _ => false,
    }
}

/// Like [`is_same`], treating a missing field as blank
pub fn is_same_field(a: Option<&Value>, b: Option<&Value>) -> bool {
    is_same(a.unwrap_or(&Value::Null), b.unwrap_or(&Value::Null))
}

fn arrays_same(x: &[Value], y: &[Value]) -> bool {
    if x.len() != y.len() {
        return false;
    }
    let x = sorted(x);
    let y = sorted(y);
    x.iter().zip(y.iter()).all(|(a, b)| is_same(a, b))
}

fn objects_same(x: &Map<String, Value>, y: &Map<String, Value>) -> bool {
    if x.len() != y.len() {
        return false;
    }
    x.iter()
        .all(|(key, value)| y.get(key).is_some_and(|other| is_same(value, other)))
}

fn sorted(values: &[Value]) -> Vec<&Value> {
    let mut refs: Vec<&Value> = values.iter().collect();
    refs.sort_by_cached_key(|v| canonical(v).to_string());
    refs
}

/// Form shared by every value in an `is_same` class, used as a sort key
///
/// Blanks fold to `null` at any depth, whole floats become integers, arrays
/// are sorted and object keys are ordered.
fn canonical(value: &Value) -> Value {
    match value {
        v if is_blank(v) => Value::Null,
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                Value::Number(Number::from(f as i64))
            }
            _ => value.clone(),
        },
        Value::Array(items) => {
            let mut items: Vec<Value> = items.iter().map(canonical).collect();
            items.sort_by_cached_key(Value::to_string);
            Value::Array(items)
        }
        Value::Object(fields) => {
            let mut entries: Vec<(&String, &Value)> = fields.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), canonical(v)))
                    .collect(),
            )
        }
        other => other.clone(),
    }
}
