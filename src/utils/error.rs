//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort reading a HotSpot log
#[derive(Error, Debug)]
pub enum LogError {
    #[error("Cannot open log file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Recoverable problems found while reconstituting a tag.
///
/// These never abort a parse; callers log them at debug level and move on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    #[error("Empty tag name in '{0}'")]
    EmptyName(String),

    #[error("Attribute '{0}' has no value")]
    MissingValue(String),

    #[error("Unterminated value for attribute '{0}'")]
    UnterminatedValue(String),

    #[error("Tag <{0}> has no method attribute")]
    MissingMethod(String),

    #[error("Malformed method signature: '{0}'")]
    MalformedMethod(String),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
