//! Reading import files and writing export files
//!
//! `.json` files are passed through as JSON; `.csv` files become rows of
//! strings keyed by the header row.

use crate::context::DataContext;
use crate::error::{ImportError, ImportResult};
use crate::export::SpreadsheetTable;
use crate::normalize::{ImportData, Row};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

pub fn read_import_file(path: &Path) -> ImportResult<ImportData> {
    match extension(path).as_str() {
        "json" => {
            let text = fs::read_to_string(path)?;
            Ok(ImportData::Json(serde_json::from_str(&text)?))
        }
        "csv" => Ok(ImportData::Spreadsheet(read_csv_rows(path)?)),
        _ => Err(ImportError::UnsupportedFormat(path.display().to_string())),
    }
}

fn read_csv_rows(path: &Path) -> ImportResult<Vec<Row>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row = Row::new();
        for (header, cell) in headers.iter().zip(record.iter()) {
            if row.contains_key(header) {
                warn!("Duplicate column \"{}\" in {}; keeping the first", header, path.display());
                continue;
            }
            row.insert(header.to_string(), Value::String(cell.to_string()));
        }
        rows.push(row);
    }

    debug!("Read {} row(s) from {}", rows.len(), path.display());
    Ok(rows)
}

/// Load a store snapshot (`{"instructors": [...], "positions": [...], ...}`)
pub fn read_data_context(path: &Path) -> ImportResult<DataContext> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

pub fn write_json(path: &Path, value: &Value) -> ImportResult<()> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    fs::write(path, text)?;
    Ok(())
}

pub fn write_csv(path: &Path, table: &SpreadsheetTable) -> ImportResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Render a table as CSV text
pub fn csv_string(table: &SpreadsheetTable) -> ImportResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ImportError::Io(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
