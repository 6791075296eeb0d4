//! Snapshot of the in-memory data store an import is reconciled against

use crate::models::{Applicant, Assignment, ContractTemplate, Ddah, Instructor, Position};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataContext {
    #[serde(default)]
    pub instructors: Vec<Instructor>,
    #[serde(default)]
    pub applicants: Vec<Applicant>,
    #[serde(default)]
    pub contract_templates: Vec<ContractTemplate>,
    #[serde(default)]
    pub positions: Vec<Position>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub ddahs: Vec<Ddah>,
}

impl DataContext {
    pub fn instructor_by_utorid(&self, utorid: &str) -> Option<&Instructor> {
        self.instructors.iter().find(|i| i.utorid == utorid)
    }

    pub fn applicant_by_utorid(&self, utorid: &str) -> Option<&Applicant> {
        self.applicants.iter().find(|a| a.utorid == utorid)
    }

    pub fn position_by_code(&self, position_code: &str) -> Option<&Position> {
        self.positions
            .iter()
            .find(|p| p.position_code == position_code)
    }

    pub fn contract_template_by_name(&self, name: &str) -> Option<&ContractTemplate> {
        self.contract_templates
            .iter()
            .find(|t| t.template_name == name)
    }

    pub fn assignment_for(&self, position_code: &str, utorid: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|a| {
            a.position.position_code == position_code && a.applicant.utorid == utorid
        })
    }
}
