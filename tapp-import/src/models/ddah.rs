//! DDAHs (Description of Duties and Allocation of Hours)

use super::{Assignment, Entity};
use crate::context::DataContext;
use crate::render::format_number;
use crate::resolve::Resolver;
use crate::schema::{self, ImportSchema};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use tapp_common::Result;

/// One line of a DDAH: a task and the hours allotted to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Duty {
    pub order: i64,
    pub hours: f64,
    pub description: String,
}

impl Duty {
    /// Spreadsheet cell form, `hours:description`
    pub fn to_cell(&self) -> String {
        format!("{}:{}", format_number(self.hours), self.description)
    }

    /// Parse the `hours:description` cell form
    pub fn from_cell(cell: &str, order: i64) -> std::result::Result<Self, String> {
        let (hours, description) = cell
            .split_once(':')
            .ok_or_else(|| format!("Duty \"{}\" is not of the form hours:description", cell))?;
        let hours: f64 = hours
            .trim()
            .parse()
            .map_err(|_| format!("Duty \"{}\" has non-numeric hours", cell))?;
        Ok(Self {
            order,
            hours,
            description: description.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ddah {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub assignment: Assignment,
    #[serde(default)]
    pub duties: Vec<Duty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revised_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emailed_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// DDAH as found in import/export files; `applicant` is the UTORid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimalDdah {
    pub position_code: String,
    pub applicant: String,
    #[serde(default, deserialize_with = "deserialize_duties")]
    pub duties: Vec<Duty>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DutyRepr {
    Full {
        #[serde(default)]
        order: Option<i64>,
        hours: f64,
        description: String,
    },
    Cell(String),
}

// Duties come either as objects (JSON) or as `hours:description` cells.
// Entries without an explicit order are numbered by position.
fn deserialize_duties<'de, D>(deserializer: D) -> std::result::Result<Vec<Duty>, D::Error>
where
    D: Deserializer<'de>,
{
    let reprs = Option::<Vec<DutyRepr>>::deserialize(deserializer)?.unwrap_or_default();
    reprs
        .into_iter()
        .zip(1..)
        .map(|(repr, position)| match repr {
            DutyRepr::Full {
                order,
                hours,
                description,
            } => Ok(Duty {
                order: order.unwrap_or(position),
                hours,
                description,
            }),
            DutyRepr::Cell(cell) => Duty::from_cell(&cell, position).map_err(D::Error::custom),
        })
        .collect()
}

/// Duties sorted by their `order` field
pub fn ordered_duties(duties: &[Duty]) -> Vec<Duty> {
    let mut sorted = duties.to_vec();
    sorted.sort_by_key(|d| d.order);
    sorted
}

impl Entity for Ddah {
    type Minimal = MinimalDdah;

    const NAME: &'static str = "ddahs";

    fn schema() -> ImportSchema {
        schema::ddahs()
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }

    fn to_minimal(&self) -> MinimalDdah {
        MinimalDdah {
            position_code: self.assignment.position.position_code.clone(),
            applicant: self.assignment.applicant.utorid.clone(),
            duties: ordered_duties(&self.duties),
        }
    }

    fn matches(&self, minimal: &MinimalDdah) -> bool {
        self.assignment.position.position_code == minimal.position_code
            && self.assignment.applicant.utorid == minimal.applicant
    }

    fn existing(data: &DataContext) -> &[Self] {
        &data.ddahs
    }

    fn resolve(minimal: &MinimalDdah, resolver: &Resolver<'_>) -> Result<Self> {
        resolver.ddah(minimal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_duty_cell_round_trip() {
        let duty = Duty::from_cell("12.5: Marking: midterm", 2).unwrap();
        assert_eq!(duty.order, 2);
        assert_eq!(duty.hours, 12.5);
        assert_eq!(duty.description, "Marking: midterm");
        assert_eq!(duty.to_cell(), "12.5:Marking: midterm");
    }

    #[test]
    fn test_duty_cell_errors() {
        assert!(Duty::from_cell("no colon", 1).is_err());
        assert!(Duty::from_cell("ten:Tutorials", 1).is_err());
    }

    #[test]
    fn test_minimal_accepts_mixed_duty_forms() {
        let ddah: MinimalDdah = serde_json::from_value(json!({
            "position_code": "CSC100H1F",
            "applicant": "doej",
            "duties": [
                {"order": 5, "hours": 20, "description": "Tutorials"},
                "10:Office hours"
            ]
        }))
        .unwrap();

        assert_eq!(ddah.duties[0].order, 5);
        assert_eq!(ddah.duties[1].order, 2);
        assert_eq!(ddah.duties[1].description, "Office hours");
    }

    #[test]
    fn test_bad_duty_cell_fails_deserialization() {
        let result = serde_json::from_value::<MinimalDdah>(json!({
            "position_code": "CSC100H1F",
            "applicant": "doej",
            "duties": ["Office hours"]
        }));
        assert!(result.is_err());
    }
}
