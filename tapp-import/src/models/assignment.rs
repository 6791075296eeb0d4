//! Assignments and their wage chunks

use super::{Applicant, Entity, Position};
use crate::context::DataContext;
use crate::render::format_number;
use crate::resolve::Resolver;
use crate::schema::{self, ImportSchema};
use crate::wage_chunks::{hours_differ, total_hours};
use serde::{Deserialize, Serialize};
use tapp_common::time::truncate_to_date;
use tapp_common::Result;

/// Suffix on an `hours` change derived from wage chunks
pub const WAGE_CHUNK_CHANGE_NOTE: &str = "(wage chunk change)";

/// Sub-interval of an assignment with its own hours and pay rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WageChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub hours: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimalWageChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub hours: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub position: Position,
    pub applicant: Applicant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_override_pdf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_offer_status: Option<String>,
    #[serde(default)]
    pub wage_chunks: Vec<WageChunk>,
}

/// Assignment as found in import/export files, keyed by applicant UTORid
/// and position code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimalAssignment {
    pub utorid: String,
    pub position_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_override_pdf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wage_chunks: Option<Vec<MinimalWageChunk>>,
}

impl WageChunk {
    pub fn to_minimal(&self) -> MinimalWageChunk {
        MinimalWageChunk {
            start_date: self.start_date.as_deref().map(|d| truncate_to_date(d).to_string()),
            end_date: self.end_date.as_deref().map(|d| truncate_to_date(d).to_string()),
            hours: self.hours,
            rate: self.rate,
        }
    }
}

impl Assignment {
    /// Total hours, recomputed from wage chunks when there are any
    pub fn effective_hours(&self) -> Option<f64> {
        if self.wage_chunks.is_empty() {
            self.hours
        } else {
            Some(total_hours(self.wage_chunks.iter().map(|c| c.hours)))
        }
    }
}

impl MinimalAssignment {
    /// Wage chunks if the record carries a non-empty list
    pub fn explicit_wage_chunks(&self) -> Option<&[MinimalWageChunk]> {
        self.wage_chunks.as_deref().filter(|chunks| !chunks.is_empty())
    }
}

impl Entity for Assignment {
    type Minimal = MinimalAssignment;

    const NAME: &'static str = "assignments";

    // hours are compared through extra_changes so wage chunks are accounted for
    const DIFF_SKIPPED_FIELDS: &'static [&'static str] = &["hours", "wage_chunks"];

    fn schema() -> ImportSchema {
        schema::assignments()
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }

    fn to_minimal(&self) -> MinimalAssignment {
        let wage_chunks = if self.wage_chunks.is_empty() {
            None
        } else {
            Some(self.wage_chunks.iter().map(WageChunk::to_minimal).collect())
        };
        MinimalAssignment {
            utorid: self.applicant.utorid.clone(),
            position_code: self.position.position_code.clone(),
            contract_override_pdf: self.contract_override_pdf.clone(),
            hours: self.hours,
            start_date: self.start_date.as_deref().map(|d| truncate_to_date(d).to_string()),
            end_date: self.end_date.as_deref().map(|d| truncate_to_date(d).to_string()),
            wage_chunks,
        }
    }

    fn matches(&self, minimal: &MinimalAssignment) -> bool {
        self.position.position_code == minimal.position_code
            && self.applicant.utorid == minimal.utorid
    }

    fn existing(data: &DataContext) -> &[Self] {
        &data.assignments
    }

    fn resolve(minimal: &MinimalAssignment, resolver: &Resolver<'_>) -> Result<Self> {
        resolver.assignment(minimal)
    }

    fn extra_changes(existing: &Self, imported: &MinimalAssignment) -> Vec<(String, String)> {
        let old_hours = existing.effective_hours();

        let (new_hours, note) = match imported.explicit_wage_chunks() {
            Some(chunks) => (
                Some(total_hours(chunks.iter().map(|c| c.hours))),
                Some(WAGE_CHUNK_CHANGE_NOTE),
            ),
            None => match imported.hours {
                Some(hours) => (Some(hours), None),
                // hours not part of this import
                None => return Vec::new(),
            },
        };

        let changed = match (old_hours, new_hours) {
            (Some(old), Some(new)) => hours_differ(old, new),
            (None, None) => false,
            _ => true,
        };
        if !changed {
            return Vec::new();
        }

        let render = |h: Option<f64>| h.map_or_else(|| "null".to_string(), format_number);
        let mut message = format!("{} → {}", render(old_hours), render(new_hours));
        if let Some(note) = note {
            message.push(' ');
            message.push_str(note);
        }
        vec![("hours".to_string(), message)]
    }
}
