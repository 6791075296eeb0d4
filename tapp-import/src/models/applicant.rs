//! Applicants

use super::serde_helpers::opt_string_or_number;
use super::Entity;
use crate::context::DataContext;
use crate::resolve::Resolver;
use crate::schema::{self, ImportSchema};
use serde::{Deserialize, Serialize};
use tapp_common::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Applicant {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    pub utorid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(
        default,
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub student_number: Option<String>,
    #[serde(
        default,
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimalApplicant {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    pub utorid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(
        default,
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub student_number: Option<String>,
    #[serde(
        default,
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone: Option<String>,
}

impl Entity for Applicant {
    type Minimal = MinimalApplicant;

    const NAME: &'static str = "applicants";

    fn schema() -> ImportSchema {
        schema::applicants()
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }

    fn to_minimal(&self) -> MinimalApplicant {
        MinimalApplicant {
            last_name: self.last_name.clone(),
            first_name: self.first_name.clone(),
            utorid: self.utorid.clone(),
            email: self.email.clone(),
            student_number: self.student_number.clone(),
            phone: self.phone.clone(),
        }
    }

    fn matches(&self, minimal: &MinimalApplicant) -> bool {
        self.utorid == minimal.utorid
    }

    fn existing(data: &DataContext) -> &[Self] {
        &data.applicants
    }

    fn resolve(minimal: &MinimalApplicant, _resolver: &Resolver<'_>) -> Result<Self> {
        Ok(Self {
            id: None,
            last_name: minimal.last_name.clone(),
            first_name: minimal.first_name.clone(),
            utorid: minimal.utorid.clone(),
            email: minimal.email.clone(),
            student_number: minimal.student_number.clone(),
            phone: minimal.phone.clone(),
        })
    }
}
