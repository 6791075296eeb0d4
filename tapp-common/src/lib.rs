//! # TAPP Common Library
//!
//! Shared code for the TAPP import tooling:
//! - Error types
//! - Configuration loading
//! - Date parsing helpers (spreadsheet serials, loose date formats)

pub mod config;
pub mod error;
pub mod time;

pub use error::{Error, Result};
