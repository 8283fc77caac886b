//! xUnit-style XML report writer.
//!
//! Every package is a `testcase` and every aggregation key of that package is
//! an `error` inside it:
//! ```text
//! <testsuite tests="1">
//!   <testcase name="test_communication" errors="1">
//!     <error message="data-race" key="worker() /ros2/..." count="2">#0 worker() ...</error>
//!   </testcase>
//! </testsuite>
//! ```

use super::write_text;
use crate::aggregator::{AggregationKey, AggregationRecord, Aggregator};
use crate::utils::error::OutputError;
use log::info;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::collections::BTreeMap;
use std::path::Path;

type PackageErrors<'a> = BTreeMap<&'a str, Vec<(&'a AggregationKey, AggregationRecord<'a>)>>;

/// Render the report as xUnit XML
///
/// # Errors
/// * `OutputError::Xml` - an element could not be written
pub fn render_xml(aggregator: &Aggregator) -> Result<String, OutputError> {
    let mut by_package: PackageErrors<'_> = BTreeMap::new();
    for (key, record) in aggregator.snapshot() {
        by_package
            .entry(key.package.as_str())
            .or_default()
            .push((key, record));
    }

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    write_event(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;

    let tests = by_package.len().to_string();
    let testsuite = BytesStart::new("testsuite").with_attributes([("tests", tests.as_str())]);

    if by_package.is_empty() {
        write_event(&mut writer, Event::Empty(testsuite))?;
    } else {
        write_event(&mut writer, Event::Start(testsuite))?;
        for (package, errors) in &by_package {
            write_testcase(&mut writer, package, errors)?;
        }
        write_event(&mut writer, Event::End(BytesEnd::new("testsuite")))?;
    }

    Ok(String::from_utf8(writer.into_inner())?)
}

fn write_testcase(
    writer: &mut Writer<Vec<u8>>,
    package: &str,
    errors: &[(&AggregationKey, AggregationRecord<'_>)],
) -> Result<(), OutputError> {
    let error_count = errors.len().to_string();
    let testcase = BytesStart::new("testcase")
        .with_attributes([("name", package), ("errors", error_count.as_str())]);
    write_event(writer, Event::Start(testcase))?;

    for (key, record) in errors {
        let message = key.error_name.replace(' ', "-");
        let count = record.count.to_string();
        let error = BytesStart::new("error").with_attributes([
            ("message", message.as_str()),
            ("key", key.stack_trace_key.as_str()),
            ("count", count.as_str()),
        ]);

        write_event(writer, Event::Start(error))?;
        write_event(
            writer,
            Event::Text(BytesText::new(&record.sample_trace.to_text())),
        )?;
        write_event(writer, Event::End(BytesEnd::new("error")))?;
    }

    write_event(writer, Event::End(BytesEnd::new("testcase")))
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), OutputError> {
    writer
        .write_event(event)
        .map_err(|e| OutputError::Xml(e.to_string()))
}

/// Write the XML report to a file
///
/// **Public** - main entry point for XML output
///
/// # Errors
/// * `OutputError::InvalidPath` - path is empty, a directory, or cannot be created
/// * `OutputError::WriteFailed` - I/O error during write
pub fn write_xml(
    aggregator: &Aggregator,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing XML report to: {}", output_path.display());
    write_text(&render_xml(aggregator)?, output_path)
}
