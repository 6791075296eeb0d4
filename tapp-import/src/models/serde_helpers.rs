//! Lenient deserializers for values that spreadsheets type inconsistently

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accept a string or a number for an optional text field
///
/// Student numbers and phone numbers frequently arrive as numeric cells.
pub fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected a string or number, got {}",
            other
        ))),
    }
}

/// Accept an optional whole number given as an integer, a float such as
/// `3.0`, or a numeric string
///
/// Spreadsheet cells often store counts as floats. Fractional values are
/// rejected rather than truncated.
pub fn opt_i64_lenient<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let number = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n,
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse::<serde_json::Number>()
            .map_err(|_| D::Error::custom(format!("expected a whole number, got \"{}\"", s)))?,
        Some(other) => {
            return Err(D::Error::custom(format!(
                "expected a whole number, got {}",
                other
            )))
        }
    };

    if let Some(n) = number.as_i64() {
        return Ok(Some(n));
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Ok(Some(f as i64)),
        _ => Err(D::Error::custom(format!(
            "expected a whole number, got {}",
            number
        ))),
    }
}
