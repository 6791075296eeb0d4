//! Three-way diff of imported records against the store
//!
//! Each imported minimal record is classified as `new` (no record with the
//! same natural key exists), `duplicate` (a match exists and every imported
//! field is equivalent) or `modified`. Only fields the import actually
//! carries are compared, so a partial import never reports the fields it
//! left out as changes.

use crate::compare::is_same_field;
use crate::context::DataContext;
use crate::models::Entity;
use crate::render::render_json;
use crate::resolve::Resolver;
use crate::schema::ImportSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tapp_common::time::truncate_to_date;
use tapp_common::{Error, Result};
use tracing::debug;

/// List-of-instructors field, rendered as "Last, First" names
const INSTRUCTORS_FIELD: &str = "instructors";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffStatus {
    New,
    Duplicate,
    Modified,
}

/// Outcome of diffing one imported record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffSpec<T> {
    pub status: DiffStatus,
    /// Field name -> `old → new`
    pub changes: BTreeMap<String, String>,
    /// Fully resolved record; carries the existing ID when matched
    pub obj: T,
}

impl<T> DiffSpec<T> {
    pub fn is_changed(&self) -> bool {
        matches!(self.status, DiffStatus::New | DiffStatus::Modified)
    }
}

fn to_fields<S: Serialize>(value: &S) -> Result<Map<String, Value>> {
    match serde_json::to_value(value)? {
        Value::Object(fields) => Ok(fields),
        other => Err(Error::InvalidInput(format!(
            "Expected a record, found {}",
            other
        ))),
    }
}

/// Render one side of a change message
fn render_field(
    schema: &ImportSchema,
    field: &str,
    value: Option<&Value>,
    data: &DataContext,
) -> String {
    let Some(value) = value else {
        return "null".to_string();
    };
    match value {
        Value::String(s) if schema.is_date_column(field) => {
            Value::String(truncate_to_date(s).to_string()).to_string()
        }
        Value::Array(items) if field == INSTRUCTORS_FIELD => items
            .iter()
            .map(|item| match item.as_str() {
                Some(utorid) => data
                    .instructor_by_utorid(utorid)
                    .map(|i| i.display_name())
                    .unwrap_or_else(|| utorid.to_string()),
                None => render_json(item),
            })
            .collect::<Vec<_>>()
            .join("; "),
        other => render_json(other),
    }
}

/// Diff imported minimal records against the store
///
/// Fails only if a record's relations cannot be resolved.
pub fn diff_imports<T: Entity>(
    imported: &[T::Minimal],
    resolver: &Resolver<'_>,
) -> Result<Vec<DiffSpec<T>>> {
    let data = resolver.data();
    let schema = T::schema();
    let existing_records = T::existing(data);

    let specs = imported
        .iter()
        .map(|minimal| {
            let mut obj = T::resolve(minimal, resolver)?;

            let Some(existing) = existing_records.iter().find(|e| e.matches(minimal)) else {
                obj.set_id(None);
                return Ok(DiffSpec {
                    status: DiffStatus::New,
                    changes: BTreeMap::new(),
                    obj,
                });
            };
            obj.set_id(existing.id());

            // Compare the resolved form so references by name and by
            // UTORid compare equal
            let imported_fields = to_fields(minimal)?;
            let new_fields = to_fields(&obj.to_minimal())?;
            let old_fields = to_fields(&existing.to_minimal())?;

            let mut changes = BTreeMap::new();
            for field in imported_fields.keys() {
                if T::DIFF_SKIPPED_FIELDS.contains(&field.as_str()) {
                    continue;
                }
                let old = old_fields.get(field);
                let new = new_fields.get(field).or_else(|| imported_fields.get(field));
                if !is_same_field(old, new) {
                    changes.insert(
                        field.clone(),
                        format!(
                            "{} → {}",
                            render_field(&schema, field, old, data),
                            render_field(&schema, field, new, data)
                        ),
                    );
                }
            }
            changes.extend(T::extra_changes(existing, minimal));

            let status = if changes.is_empty() {
                DiffStatus::Duplicate
            } else {
                DiffStatus::Modified
            };
            Ok(DiffSpec {
                status,
                changes,
                obj,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let count = |status| specs.iter().filter(|s| s.status == status).count();
    debug!(
        "Diffed {} {}: {} new, {} modified, {} duplicate",
        specs.len(),
        T::NAME,
        count(DiffStatus::New),
        count(DiffStatus::Modified),
        count(DiffStatus::Duplicate)
    );
    Ok(specs)
}

/// Records that need to be sent as an upsert: the new and modified ones
pub fn get_changed<T: Clone>(diffs: &[DiffSpec<T>]) -> Vec<T> {
    diffs
        .iter()
        .filter(|d| d.is_changed())
        .map(|d| d.obj.clone())
        .collect()
}
