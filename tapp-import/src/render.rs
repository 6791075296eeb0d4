//! Human-readable rendering of values for change messages and spreadsheet cells

use crate::compare::is_blank;
use serde_json::{Map, Number, Value};

/// Format a number without a trailing `.0` for whole values
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// JSON text of a value, with whole floats written as integers
///
/// `70.0` renders as `70`, so an hours value typed in a spreadsheet reads
/// the same as one stored by the backend.
pub fn render_json(value: &Value) -> String {
    integral_numbers(value).to_string()
}

/// Text for a single spreadsheet cell
///
/// Lists are joined with `"; "`; duty objects use `hours:description`.
pub fn cell_text(value: &Value) -> String {
    match value {
        v if is_blank(v) => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.as_f64().map_or_else(|| n.to_string(), format_number),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .map(list_item_text)
            .collect::<Vec<_>>()
            .join("; "),
        Value::Object(_) => render_json(value),
        Value::Null => String::new(),
    }
}

fn list_item_text(item: &Value) -> String {
    if let Value::Object(fields) = item {
        if let (Some(hours), Some(Value::String(description))) =
            (fields.get("hours").and_then(Value::as_f64), fields.get("description"))
        {
            return format!("{}:{}", format_number(hours), description);
        }
    }
    cell_text(item)
}

fn integral_numbers(value: &Value) -> Value {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                Value::Number(Number::from(f as i64))
            }
            _ => value.clone(),
        },
        Value::Array(items) => Value::Array(items.iter().map(integral_numbers).collect()),
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), integral_numbers(v)))
                .collect::<Map<String, Value>>(),
        ),
        other => other.clone(),
    }
}
