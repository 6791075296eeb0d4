//! Instructors

use super::Entity;
use crate::context::DataContext;
use crate::resolve::Resolver;
use crate::schema::{self, ImportSchema};
use serde::{Deserialize, Serialize};
use tapp_common::Result;

/// Instructor as held by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instructor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    pub utorid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Instructor as found in import/export files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimalInstructor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    pub utorid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Instructor {
    /// "Last, First", or whichever part is known, or the UTORid
    pub fn display_name(&self) -> String {
        match (self.last_name.as_deref(), self.first_name.as_deref()) {
            (Some(last), Some(first)) => format!("{}, {}", last, first),
            (Some(last), None) => last.to_string(),
            (None, Some(first)) => first.to_string(),
            (None, None) => self.utorid.clone(),
        }
    }
}

impl Entity for Instructor {
    type Minimal = MinimalInstructor;

    const NAME: &'static str = "instructors";

    fn schema() -> ImportSchema {
        schema::instructors()
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }

    fn to_minimal(&self) -> MinimalInstructor {
        MinimalInstructor {
            last_name: self.last_name.clone(),
            first_name: self.first_name.clone(),
            utorid: self.utorid.clone(),
            email: self.email.clone(),
        }
    }

    fn matches(&self, minimal: &MinimalInstructor) -> bool {
        self.utorid == minimal.utorid
    }

    fn existing(data: &DataContext) -> &[Self] {
        &data.instructors
    }

    fn resolve(minimal: &MinimalInstructor, _resolver: &Resolver<'_>) -> Result<Self> {
        Ok(Self {
            id: None,
            last_name: minimal.last_name.clone(),
            first_name: minimal.first_name.clone(),
            utorid: minimal.utorid.clone(),
            email: minimal.email.clone(),
        })
    }
}
