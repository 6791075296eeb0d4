//! Common error types for TAPP import tooling

use thiserror::Error;

/// Common result type for TAPP operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the import pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// Normalized record is missing a required field
    #[error("Invalid data for {record}; missing key {key}")]
    Validation { record: String, key: String },

    /// Date cell could not be interpreted
    #[error("Could not parse date \"{value}\"")]
    DateParse { value: String },

    /// A reference to another entity could not be resolved
    #[error("Resolution error: {0}")]
    Resolution(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
