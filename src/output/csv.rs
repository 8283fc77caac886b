//! CSV report writer.
//!
//! Columns are `package,error_name,stack_trace_key,count,sample_stack_trace`,
//! one row per aggregation key. The sample stack trace is the frame lines
//! joined with newlines, so most rows span several physical lines.

use super::write_text;
use crate::aggregator::Aggregator;
use crate::utils::config::CSV_HEADER;
use crate::utils::error::OutputError;
use log::info;
use std::path::Path;

/// Render the report as CSV
///
/// # Errors
/// * `OutputError::Csv` - a record could not be written
pub fn render_csv(aggregator: &Aggregator) -> Result<String, OutputError> {
    let mut writer = ::csv::WriterBuilder::new()
        .terminator(::csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;

    for (key, record) in aggregator.snapshot() {
        let count = record.count.to_string();
        let sample = record.sample_trace.to_text();
        writer.write_record([
            key.package.as_str(),
            key.error_name.as_str(),
            key.stack_trace_key.as_str(),
            count.as_str(),
            sample.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| OutputError::WriteFailed(e.into_error()))?;

    Ok(String::from_utf8(bytes)?)
}

/// Write the CSV report to a file
///
/// **Public** - main entry point for CSV output
///
/// # Errors
/// * `OutputError::InvalidPath` - path is empty, a directory, or cannot be created
/// * `OutputError::WriteFailed` - I/O error during write
pub fn write_csv(
    aggregator: &Aggregator,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing CSV report to: {}", output_path.display());
    write_text(&render_csv(aggregator)?, output_path)
}
