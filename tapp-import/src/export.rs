//! Export of store records back to the import formats

use crate::models::Entity;
use crate::render::cell_text;
use serde_json::{Map, Value};
use tapp_common::Result;

/// Header row plus one row of cell text per record
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadsheetTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub fn to_minimal_records<T: Entity>(records: &[T]) -> Vec<T::Minimal> {
    records.iter().map(T::to_minimal).collect()
}

/// `{"<entity>": [minimal, ...]}`, the shape [`crate::normalize`] accepts
pub fn json_payload<T: Entity>(records: &[T]) -> Result<Value> {
    let minimal = serde_json::to_value(to_minimal_records(records))?;
    let mut payload = Map::new();
    payload.insert(T::NAME.to_string(), minimal);
    Ok(Value::Object(payload))
}

/// Spreadsheet rendering; nested JSON-only fields are left out
pub fn spreadsheet_rows<T: Entity>(records: &[T]) -> Result<SpreadsheetTable> {
    let schema = T::schema();
    let keys: Vec<&str> = schema.spreadsheet_keys().collect();
    let headers = keys.iter().map(|k| schema.header_for(k).to_string()).collect();

    let rows = to_minimal_records(records)
        .iter()
        .map(|minimal| {
            let fields = serde_json::to_value(minimal)?;
            Ok(keys
                .iter()
                .map(|k| fields.get(*k).map(cell_text).unwrap_or_default())
                .collect())
        })
        .collect::<Result<Vec<Vec<String>>>>()?;

    Ok(SpreadsheetTable { headers, rows })
}
