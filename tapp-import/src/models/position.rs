//! Positions (courses needing TAs)

use super::serde_helpers::opt_i64_lenient;
use super::{ContractTemplate, Entity, Instructor};
use crate::context::DataContext;
use crate::resolve::Resolver;
use crate::schema::{self, ImportSchema};
use serde::{Deserialize, Serialize};
use tapp_common::time::truncate_to_date;
use tapp_common::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub position_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours_per_assignment: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_template: Option<ContractTemplate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duties: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifications: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "opt_i64_lenient"
    )]
    pub desired_num_assignments: Option<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "opt_i64_lenient"
    )]
    pub current_enrollment: Option<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "opt_i64_lenient"
    )]
    pub current_waitlisted: Option<i64>,
    #[serde(default)]
    pub instructors: Vec<Instructor>,
}

/// Position as found in import/export files
///
/// `contract_template` is the template name; `instructors` lists UTORids or
/// "Last, First" names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimalPosition {
    pub position_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours_per_assignment: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duties: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifications: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "opt_i64_lenient"
    )]
    pub desired_num_assignments: Option<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "opt_i64_lenient"
    )]
    pub current_enrollment: Option<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "opt_i64_lenient"
    )]
    pub current_waitlisted: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instructors: Vec<String>,
}

impl Entity for Position {
    type Minimal = MinimalPosition;

    const NAME: &'static str = "positions";

    fn schema() -> ImportSchema {
        schema::positions()
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }

    fn to_minimal(&self) -> MinimalPosition {
        MinimalPosition {
            position_code: self.position_code.clone(),
            position_title: self.position_title.clone(),
            hours_per_assignment: self.hours_per_assignment,
            start_date: self.start_date.as_deref().map(|d| truncate_to_date(d).to_string()),
            end_date: self.end_date.as_deref().map(|d| truncate_to_date(d).to_string()),
            contract_template: self
                .contract_template
                .as_ref()
                .map(|t| t.template_name.clone()),
            duties: self.duties.clone(),
            qualifications: self.qualifications.clone(),
            desired_num_assignments: self.desired_num_assignments,
            current_enrollment: self.current_enrollment,
            current_waitlisted: self.current_waitlisted,
            instructors: self.instructors.iter().map(|i| i.utorid.clone()).collect(),
        }
    }

    fn matches(&self, minimal: &MinimalPosition) -> bool {
        self.position_code == minimal.position_code
    }

    fn existing(data: &DataContext) -> &[Self] {
        &data.positions
    }

    fn resolve(minimal: &MinimalPosition, resolver: &Resolver<'_>) -> Result<Self> {
        resolver.position(minimal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_flattens_relations() {
        let position = Position {
            id: Some(3),
            position_code: "CSC100H1F".to_string(),
            position_title: Some("Intro CS".to_string()),
            hours_per_assignment: Some(70.0),
            start_date: Some("2021-09-01T00:00:00.000Z".to_string()),
            end_date: Some("2021-12-31".to_string()),
            contract_template: Some(ContractTemplate {
                id: Some(1),
                template_name: "Standard".to_string(),
                template_file: Some("standard.html".to_string()),
            }),
            duties: None,
            qualifications: None,
            desired_num_assignments: Some(4),
            current_enrollment: None,
            current_waitlisted: None,
            instructors: vec![Instructor {
                id: Some(9),
                last_name: Some("Smith".to_string()),
                first_name: Some("Henry".to_string()),
                utorid: "smithh".to_string(),
                email: None,
            }],
        };

        let minimal = position.to_minimal();
        assert_eq!(minimal.start_date.as_deref(), Some("2021-09-01"));
        assert_eq!(minimal.contract_template.as_deref(), Some("Standard"));
        assert_eq!(minimal.instructors, vec!["smithh".to_string()]);
        assert!(position.matches(&minimal));
    }

    #[test]
    fn test_counts_from_float_cells() {
        let minimal: MinimalPosition = serde_json::from_value(serde_json::json!({
            "position_code": "CSC100H1F",
            "desired_num_assignments": 3.0,
            "current_enrollment": "250",
            "current_waitlisted": null
        }))
        .unwrap();
        assert_eq!(minimal.desired_num_assignments, Some(3));
        assert_eq!(minimal.current_enrollment, Some(250));
        assert_eq!(minimal.current_waitlisted, None);

        let bad = serde_json::json!({"position_code": "CSC100H1F", "current_enrollment": 10.5});
        assert!(serde_json::from_value::<Position>(bad).is_err());
    }
}
