//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while parsing sanitizer output
///
/// Every variant is fatal for the run: a report built after one of these
/// would be silently wrong.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Could not find error name in section header: {line}")]
    MalformedHeader { line: String },

    #[error("Could not find key in stack trace lines:\n{}", frames.join("\n"))]
    KeyNotFound { frames: Vec<String> },

    #[error("Invalid project marker: {0}")]
    InvalidProjectMarker(#[from] regex::Error),
}

/// Errors that can occur during report output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Report is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("Failed to write XML: {0}")]
    Xml(String),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
