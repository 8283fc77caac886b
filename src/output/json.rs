//! JSON summary writer.
//!
//! Writes ReportSummary structs to JSON files with proper formatting.

use super::prepare_path;
use crate::aggregator::ReportSummary;
use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Write a summary to a JSON file
///
/// **Public** - main entry point for JSON output
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_summary(
    summary: &ReportSummary,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing summary to: {}", output_path.display());

    prepare_path(output_path)?;

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, summary).map_err(OutputError::SerializationFailed)?;

    Ok(())
}

/// Read a summary from a JSON file
///
/// # Errors
/// * `OutputError::WriteFailed` - File read error (reusing WriteFailed for I/O)
/// * `OutputError::SerializationFailed` - JSON parse error
pub fn read_summary(input_path: impl AsRef<Path>) -> Result<ReportSummary, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading summary from: {}", input_path.display());

    let file = File::open(input_path).map_err(OutputError::WriteFailed)?;
    let summary: ReportSummary =
        serde_json::from_reader(file).map_err(OutputError::SerializationFailed)?;

    debug!(
        "Summary loaded: version {}, {} distinct keys",
        summary.version, summary.distinct_keys
    );

    Ok(summary)
}
