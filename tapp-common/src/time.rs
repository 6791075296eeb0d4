//! Date utilities
//!
//! Spreadsheet cells arrive as Excel serial numbers, ISO strings, US-style
//! dates or written-out month names. Everything is normalized to a plain
//! `YYYY-MM-DD` calendar date.

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Days between the Excel epoch (1899-12-30) and the Unix epoch
const EXCEL_UNIX_EPOCH_OFFSET_DAYS: f64 = 25_569.0;
const MS_PER_DAY: f64 = 86_400_000.0;

/// Numbers at or above this magnitude are epoch milliseconds, not serials.
/// Serial 10,000,000 is roughly the year 29,000.
const EPOCH_MS_THRESHOLD: f64 = 10_000_000.0;

/// Canonical output format for normalized dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d-%b-%Y",
    "%d %B %Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%a, %B %d, %Y",
    "%a %B %d %Y",
];

/// Convert an Excel date serial to milliseconds since the Unix epoch
pub fn excel_serial_to_epoch_ms(serial: f64) -> i64 {
    ((serial - EXCEL_UNIX_EPOCH_OFFSET_DAYS) * MS_PER_DAY).round() as i64
}

/// UTC calendar date of an epoch-milliseconds timestamp
pub fn epoch_ms_to_date(ms: i64) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp_millis(ms).map(|dt| dt.date_naive())
}

/// Format a date the way normalized records store it
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// First ten characters of a date or timestamp string (`YYYY-MM-DD`)
pub fn truncate_to_date(value: &str) -> &str {
    value.get(..10).unwrap_or(value)
}

/// Interpret a numeric cell as a date
///
/// Small magnitudes are Excel serials, large ones epoch milliseconds.
pub fn date_from_number(number: f64) -> Result<NaiveDate> {
    if !number.is_finite() {
        return Err(Error::DateParse {
            value: number.to_string(),
        });
    }
    let ms = if number.abs() < EPOCH_MS_THRESHOLD {
        excel_serial_to_epoch_ms(number)
    } else {
        number.round() as i64
    };
    epoch_ms_to_date(ms).ok_or_else(|| Error::DateParse {
        value: number.to_string(),
    })
}

/// Best-effort parse of a free-form date string
pub fn parse_date_str(raw: &str) -> Result<NaiveDate> {
    let text = raw.trim();

    if let Ok(number) = text.parse::<f64>() {
        return date_from_number(number);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.date_naive());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(dt.date());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Ok(date);
        }
    }

    Err(Error::DateParse {
        value: raw.to_string(),
    })
}

/// Parse a JSON cell (number or string) into a calendar date
pub fn parse_date_value(value: &Value) -> Result<NaiveDate> {
    match value {
        Value::Number(n) => date_from_number(n.as_f64().unwrap_or(f64::NAN)),
        Value::String(s) => parse_date_str(s),
        other => Err(Error::DateParse {
            value: other.to_string(),
        }),
    }
}

/// Parse a JSON cell and re-emit it as a `YYYY-MM-DD` string value
pub fn normalize_date_value(value: &Value) -> Result<Value> {
    parse_date_value(value).map(|date| Value::String(format_date(date)))
}
