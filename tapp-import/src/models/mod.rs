//! Entity models
//!
//! Every entity exists in two forms:
//! - **canonical**: the ID-bearing record held by the in-memory store, with
//!   relations nested as full objects
//! - **minimal**: the flat, ID-less form found in import/export files
//!
//! The [`Entity`] trait ties the two together along with the natural key
//! used to match an imported record against the store.

pub mod applicant;
pub mod assignment;
pub mod contract_template;
pub mod ddah;
pub mod instructor;
pub mod position;
mod serde_helpers;

pub use applicant::{Applicant, MinimalApplicant};
pub use assignment::{Assignment, MinimalAssignment, MinimalWageChunk, WageChunk};
pub use contract_template::ContractTemplate;
pub use ddah::{Ddah, Duty, MinimalDdah};
pub use instructor::{Instructor, MinimalInstructor};
pub use position::{MinimalPosition, Position};

use crate::context::DataContext;
use crate::resolve::Resolver;
use crate::schema::ImportSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tapp_common::Result;

/// An importable entity type
pub trait Entity: Clone + Serialize + Sized {
    /// Flat import/export representation
    type Minimal: Clone + Serialize + DeserializeOwned;

    /// Key under which records are listed in JSON files and the store
    const NAME: &'static str;

    /// Fields the generic field-by-field diff leaves alone
    const DIFF_SKIPPED_FIELDS: &'static [&'static str] = &[];

    /// Column dictionary for normalizing raw rows of this entity
    fn schema() -> ImportSchema;

    fn id(&self) -> Option<i64>;

    fn set_id(&mut self, id: Option<i64>);

    /// Flatten to the import/export form
    fn to_minimal(&self) -> Self::Minimal;

    /// True if this record has the same natural key as `minimal`
    fn matches(&self, minimal: &Self::Minimal) -> bool;

    /// Records of this type currently in the store
    fn existing(data: &DataContext) -> &[Self];

    /// Build the full record from its minimal form, resolving relations
    fn resolve(minimal: &Self::Minimal, resolver: &Resolver<'_>) -> Result<Self>;

    /// Entity-specific change descriptions the generic diff cannot produce
    fn extra_changes(_existing: &Self, _imported: &Self::Minimal) -> Vec<(String, String)> {
        Vec::new()
    }
}
