//! Output writers for sanitizer reports.
//!
//! This module handles writing data to disk in various formats:
//! - CSV reports (one row per aggregation key)
//! - xUnit XML reports (one testcase per package)
//! - JSON summaries

pub mod csv;
pub mod json;
pub mod xml;

// Re-export main functions
pub use self::csv::{render_csv, write_csv};
pub use self::json::{read_summary, write_summary};
pub use self::xml::{render_xml, write_xml};

use crate::utils::error::OutputError;
use log::debug;
use std::path::Path;

/// Common path validation for output files
pub fn validate_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.exists() && path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

/// Validate an output path and create its parent directories
fn prepare_path(path: &Path) -> Result<(), OutputError> {
    validate_path(path)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    Ok(())
}

/// Write rendered report text to a file
fn write_text(text: &str, path: &Path) -> Result<(), OutputError> {
    prepare_path(path)?;
    std::fs::write(path, text)?;
    debug!("Wrote {} bytes to {}", text.len(), path.display());
    Ok(())
}
