//! Error types for reg file generation

use std::path::PathBuf;

use thiserror::Error;

/// Result type for reg file operations
pub type Result<T> = std::result::Result<T, RegError>;

/// Reg file generation errors
#[derive(Error, Debug)]
pub enum RegError {
    #[error("Missing field \"{field}\" on key <{node}>")]
    MissingField { node: String, field: String },

    #[error("Invalid field \"{field}\" on key <{node}>: expected {expected}")]
    InvalidField {
        node: String,
        field: String,
        expected: &'static str,
    },

    #[error("Unsupported root path declaration: expected a string or an array of strings, got {0}")]
    UnsupportedRootPath(String),

    #[error("Error while parsing key <{node}>: the key is defining both \"children\" and \"command\"")]
    ConflictingFields { node: String },

    #[error("Unresolved variable <{fragment}> in \"{input}\"")]
    UnresolvedVariable { fragment: String, input: String },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Reg file <{0}> not created")]
    WriteVerificationFailed(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
