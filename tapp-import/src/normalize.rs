//! Row normalization
//!
//! Turns raw spreadsheet rows (keyed by whatever headers the user typed) or
//! JSON records into records keyed by canonical field names, then validates
//! required fields.
//!
//! Header resolution per column:
//! 1. exact match against an alias or field name (case and punctuation folded)
//! 2. fuzzy match (Sørensen–Dice) against aliases of fields not yet claimed
//!    by another column; the best candidate at or above the threshold wins
//! 3. otherwise the column is unknown and its cells are dropped
//!
//! Decisions are cached in an empirical key map, so every row of a sheet is
//! mapped the same way and each header is only matched once.

use crate::compare::is_blank;
use crate::schema::{fold_header, ImportSchema};
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};
use std::collections::{BTreeSet, HashMap};
use tapp_common::config::DEFAULT_SIMILARITY_THRESHOLD;
use tapp_common::time::normalize_date_value;
use tapp_common::{Error, Result};
use tracing::{debug, warn};

/// A record keyed by column header or field name
pub type Row = Map<String, Value>;

/// Raw data handed over by a file loader
#[derive(Debug, Clone, PartialEq)]
pub enum ImportData {
    /// `{<entity>: [...]}` or a bare array of records
    Json(Value),
    /// Rows keyed by column header
    Spreadsheet(Vec<Row>),
}

/// Stateful header mapper for one import
pub struct RowNormalizer<'a> {
    schema: &'a ImportSchema,
    threshold: f64,
    /// column header -> canonical field
    empirical_key_map: HashMap<String, String>,
    unknown_columns: BTreeSet<String>,
}

impl<'a> RowNormalizer<'a> {
    pub fn new(schema: &'a ImportSchema) -> Self {
        Self {
            schema,
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
            empirical_key_map: HashMap::new(),
            unknown_columns: BTreeSet::new(),
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Header decisions made so far
    pub fn empirical_key_map(&self) -> &HashMap<String, String> {
        &self.empirical_key_map
    }

    /// Headers that matched no field
    pub fn unknown_columns(&self) -> &BTreeSet<String> {
        &self.unknown_columns
    }

    /// Canonical field for a column header, if any
    pub fn resolve_column(&mut self, column: &str) -> Option<String> {
        if let Some(key) = self.empirical_key_map.get(column) {
            return Some(key.clone());
        }
        if self.unknown_columns.contains(column) {
            return None;
        }

        let key = match self.schema.exact_key(column) {
            Some(key) => Some(key.to_string()),
            None => self.fuzzy_match(column),
        };

        match &key {
            Some(key) => {
                self.empirical_key_map
                    .insert(column.to_string(), key.clone());
            }
            None => {
                self.unknown_columns.insert(column.to_string());
            }
        }
        key
    }

    fn fuzzy_match(&self, column: &str) -> Option<String> {
        let folded = fold_header(column);
        if folded.is_empty() {
            return None;
        }

        let claimed: BTreeSet<&str> = self
            .empirical_key_map
            .values()
            .map(String::as_str)
            .collect();

        let mut best: Option<(f64, &str, &str)> = None;
        for (candidate, key) in self.schema.candidates() {
            if claimed.contains(key) {
                continue;
            }
            let score = strsim::sorensen_dice(&folded, &fold_header(candidate));
            if best.map_or(true, |(best_score, _, _)| score > best_score) {
                best = Some((score, candidate, key));
            }
        }

        match best {
            Some((score, candidate, key)) if score >= self.threshold => {
                debug!(
                    "Fuzzy matched column '{}' to '{}' via '{}' (similarity {:.2})",
                    column, key, candidate, score
                );
                Some(key.to_string())
            }
            _ => None,
        }
    }

    /// Map one row onto canonical fields and coerce typed columns
    ///
    /// Blank cells are treated as absent. When two columns land on the same
    /// field, the first non-blank one wins.
    pub fn normalize_row(&mut self, row: &Row) -> Result<Row> {
        let mut normalized = Row::new();

        for (column, value) in row {
            let value = match value {
                Value::String(s) => Value::String(s.trim().to_string()),
                other => other.clone(),
            };
            if is_blank(&value) {
                continue;
            }

            let Some(key) = self.resolve_column(column) else {
                continue;
            };
            if normalized.contains_key(&key) {
                debug!("Column '{}' duplicates field '{}', ignoring", column, key);
                continue;
            }

            let value = self.coerce(&key, column, value)?;
            normalized.insert(key, value);
        }

        Ok(normalized)
    }

    fn coerce(&self, key: &str, column: &str, value: Value) -> Result<Value> {
        if self.schema.is_date_column(key) {
            return normalize_date_value(&value);
        }
        if self.schema.is_numeric_column(key) {
            return coerce_number(column, value);
        }
        if self.schema.is_list_column(key) {
            return Ok(split_list(value));
        }
        Ok(value)
    }
}

fn coerce_number(column: &str, value: Value) -> Result<Value> {
    let Value::String(text) = &value else {
        return Ok(value);
    };
    if let Ok(n) = text.parse::<i64>() {
        return Ok(Value::Number(Number::from(n)));
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| {
            Error::InvalidInput(format!(
                "Expected a number in column \"{}\", got \"{}\"",
                column, text
            ))
        })
}

/// Split a `;`-separated cell into a list; lists pass through
fn split_list(value: Value) -> Value {
    match value {
        Value::String(text) => Value::Array(
            text.split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| Value::String(s.to_string()))
                .collect(),
        ),
        other => other,
    }
}

/// Pull the record list out of a JSON document
fn json_records(value: &Value, base_name: &str) -> Result<Vec<Row>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(fields) => match fields.get(base_name) {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(Error::InvalidInput(format!(
                    "Expected an array of records or an object with key \"{}\"",
                    base_name
                )))
            }
        },
        _ => {
            return Err(Error::InvalidInput(
                "Expected a JSON array or object".to_string(),
            ))
        }
    };

    items
        .iter()
        .map(|item| match item {
            Value::Object(fields) => Ok(fields.clone()),
            other => Err(Error::InvalidInput(format!(
                "Expected a record object, got {}",
                other
            ))),
        })
        .collect()
}

/// Check that every required field is present and non-blank
pub fn validate_required(rows: &[Row], schema: &ImportSchema) -> Result<()> {
    for row in rows {
        for key in &schema.required_keys {
            if row.get(key).map_or(true, is_blank) {
                return Err(Error::Validation {
                    record: Value::Object(row.clone()).to_string(),
                    key: key.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Normalize and validate imported data against `schema`
pub fn normalize_import(
    data: &ImportData,
    schema: &ImportSchema,
    threshold: f64,
) -> Result<Vec<Row>> {
    let rows = match data {
        ImportData::Json(value) => json_records(value, &schema.base_name)?,
        ImportData::Spreadsheet(rows) => rows.clone(),
    };

    let mut normalizer = RowNormalizer::new(schema).with_threshold(threshold);
    let normalized = rows
        .iter()
        .map(|row| normalizer.normalize_row(row))
        .collect::<Result<Vec<_>>>()?;

    if !normalizer.unknown_columns().is_empty() {
        warn!(
            "Ignoring unknown {} columns: {}",
            schema.base_name,
            normalizer
                .unknown_columns()
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    validate_required(&normalized, schema)?;
    debug!(
        "Normalized {} {} record(s)",
        normalized.len(),
        schema.base_name
    );
    Ok(normalized)
}

/// Convert normalized rows into typed minimal records
pub fn parse_records<M: DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<M>> {
    rows.into_iter()
        .map(|row| {
            let record = Value::Object(row);
            let text = record.to_string();
            serde_json::from_value(record)
                .map_err(|e| Error::InvalidInput(format!("Invalid data for {}: {}", text, e)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(fields) => fields,
            _ => panic!("row literal must be an object"),
        }
    }

    #[test]
    fn test_canonical_row_round_trips() {
        let schema = schema::positions();
        let input = row(json!({
            "position_code": "CSC100H1F",
            "position_title": "Intro CS",
            "hours_per_assignment": 70,
            "start_date": "2021-09-01",
            "end_date": "2021-12-31",
            "instructors": ["smithh"]
        }));

        let mut normalizer = RowNormalizer::new(&schema);
        assert_eq!(normalizer.normalize_row(&input).unwrap(), input);
    }

    #[test]
    fn test_fuzzy_header_is_cached() {
        let schema = schema::instructors();
        let mut normalizer = RowNormalizer::new(&schema);

        let first = normalizer
            .normalize_row(&row(json!({"Family Names": "Smith", "UTORid": "smithh"})))
            .unwrap();
        assert_eq!(first.get("last_name"), Some(&json!("Smith")));
        assert_eq!(
            normalizer.empirical_key_map().get("Family Names").map(String::as_str),
            Some("last_name")
        );

        let second = normalizer
            .normalize_row(&row(json!({"Family Names": "Doe", "UTORid": "doej"})))
            .unwrap();
        assert_eq!(second.get("last_name"), Some(&json!("Doe")));
    }

    #[test]
    fn test_claimed_field_not_fuzzy_matched_twice() {
        let schema = schema::instructors();
        let mut normalizer = RowNormalizer::new(&schema);
        assert_eq!(normalizer.resolve_column("Family Names").as_deref(), Some("last_name"));
        // would match "Family Name" as well, but last_name is taken
        assert_eq!(normalizer.resolve_column("Family Namez"), None);
    }

    #[test]
    fn test_unknown_columns_dropped() {
        let schema = schema::instructors();
        let mut normalizer = RowNormalizer::new(&schema);
        let out = normalizer
            .normalize_row(&row(json!({"UTORid": "smithh", "Office Location": "BA 1234"})))
            .unwrap();
        assert_eq!(out, row(json!({"utorid": "smithh"})));
        assert!(normalizer.unknown_columns().contains("Office Location"));
    }

    #[test]
    fn test_blank_cells_are_absent() {
        let schema = schema::instructors();
        let mut normalizer = RowNormalizer::new(&schema);
        let out = normalizer
            .normalize_row(&row(json!({"UTORid": " smithh ", "Email": "  ", "First Name": null})))
            .unwrap();
        assert_eq!(out, row(json!({"utorid": "smithh"})));
    }

    #[test]
    fn test_typed_columns_are_coerced() {
        let schema = schema::positions();
        let mut normalizer = RowNormalizer::new(&schema);
        let out = normalizer
            .normalize_row(&row(json!({
                "Course Code": "CSC100H1F",
                "Hours per Assignment": "65.5",
                "Desired Number of Assignments": "3",
                "Start Date": 44440,
                "End Date": "Dec 31, 2021",
                "Instructors": "Smith, Henry; doej"
            })))
            .unwrap();

        assert_eq!(out["hours_per_assignment"], json!(65.5));
        assert_eq!(out["desired_num_assignments"], json!(3));
        assert_eq!(out["start_date"], json!("2021-09-01"));
        assert_eq!(out["end_date"], json!("2021-12-31"));
        assert_eq!(out["instructors"], json!(["Smith, Henry", "doej"]));
    }

    #[test]
    fn test_bad_number_names_column() {
        let schema = schema::assignments();
        let mut normalizer = RowNormalizer::new(&schema);
        let err = normalizer
            .normalize_row(&row(json!({"Hours": "seventy"})))
            .unwrap_err();
        assert!(err.to_string().contains("Hours"));
        assert!(err.to_string().contains("seventy"));
    }

    #[test]
    fn test_bad_date_is_quoted() {
        let schema = schema::assignments();
        let mut normalizer = RowNormalizer::new(&schema);
        let err = normalizer
            .normalize_row(&row(json!({"Start Date": "sometime soon"})))
            .unwrap_err();
        assert!(matches!(err, Error::DateParse { .. }));
        assert!(err.to_string().contains("\"sometime soon\""));
    }

    #[test]
    fn test_missing_required_key_names_key() {
        let schema = schema::instructors();
        let data = ImportData::Spreadsheet(vec![row(json!({"Last Name": "Smith"}))]);
        let err = normalize_import(&data, &schema, 0.7).unwrap_err();
        match &err {
            Error::Validation { key, record } => {
                assert_eq!(key, "utorid");
                assert!(record.contains("Smith"));
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(err.to_string().contains("utorid"));
    }

    #[test]
    fn test_json_wrapped_and_bare() {
        let schema = schema::instructors();
        let wrapped = ImportData::Json(json!({"instructors": [{"utorid": "smithh"}]}));
        let bare = ImportData::Json(json!([{"utorid": "smithh"}]));
        assert_eq!(
            normalize_import(&wrapped, &schema, 0.7).unwrap(),
            normalize_import(&bare, &schema, 0.7).unwrap()
        );

        let wrong_key = ImportData::Json(json!({"applicants": []}));
        assert!(normalize_import(&wrong_key, &schema, 0.7).is_err());
    }

    #[test]
    fn test_parse_records_reports_record() {
        let rows = vec![row(json!({"utorid": 12}))];
        let err = parse_records::<crate::models::MinimalInstructor>(rows).unwrap_err();
        assert!(err.to_string().contains("\"utorid\":12"));
    }
}
