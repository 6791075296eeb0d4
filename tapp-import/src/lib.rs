//! # TAPP Import
//!
//! Import, diff and export of TAPP records:
//! - Row normalization with fuzzy column-header matching
//! - Three-way diff (new / duplicate / modified) against a store snapshot
//! - Relation resolution and wage-chunk splitting
//! - Export back to JSON and spreadsheet form

pub mod cli;
pub mod compare;
pub mod context;
pub mod diff;
pub mod error;
pub mod export;
pub mod files;
pub mod models;
pub mod normalize;
pub mod render;
pub mod resolve;
pub mod schema;
pub mod wage_chunks;

pub use compare::is_same;
pub use context::DataContext;
pub use diff::{diff_imports, get_changed, DiffSpec, DiffStatus};
pub use error::{ImportError, ImportResult};
pub use models::Entity;
pub use normalize::{normalize_import, ImportData, Row, RowNormalizer};
pub use resolve::Resolver;
pub use schema::ImportSchema;
