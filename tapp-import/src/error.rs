//! Errors raised while reading and writing import files

use thiserror::Error;

pub type ImportResult<T> = std::result::Result<T, ImportError>;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File extension is neither `.json` nor `.csv`
    #[error("Unsupported import format: {0}")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Common(#[from] tapp_common::Error),
}
