//! Line-by-line parser of test logs containing sanitizer output.
//!
//! Wires the section tracker to section decomposition and aggregation. Lines
//! are fed one at a time with `parse_line`; the accumulated report is read
//! from `aggregator()` once the logs are exhausted.

use super::section::Section;
use super::stack_trace::KeyExtractor;
use super::tracker::SectionTracker;
use crate::aggregator::{AggregationKey, Aggregator};
use crate::utils::config::ParserConfig;
use crate::utils::error::ParseError;
use log::{debug, warn};

/// Parses sanitizer sections out of logs and aggregates their relevant traces
///
/// **Public** - main entry point of the library
#[derive(Debug)]
pub struct SanitizerLogParser {
    tracker: SectionTracker,
    keys: KeyExtractor,
    aggregator: Aggregator,
    package: String,
}

impl SanitizerLogParser {
    /// Create a parser with an empty report
    ///
    /// # Errors
    /// * `ParseError::InvalidProjectMarker` - marker cannot be turned into a frame pattern
    pub fn new(config: &ParserConfig) -> Result<Self, ParseError> {
        Ok(Self {
            tracker: SectionTracker::new(),
            keys: KeyExtractor::new(config)?,
            aggregator: Aggregator::new(),
            package: String::new(),
        })
    }

    /// Set the package subsequently parsed sections are attributed to
    pub fn set_package(&mut self, package: impl Into<String>) {
        self.package = package.into();
        debug!("Parsing output of package: {}", self.package);
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// Parse the next log line
    ///
    /// # Errors
    /// Any error is fatal for the report: the sections aggregated so far can
    /// no longer be trusted to be complete.
    /// * `ParseError::MalformedHeader` - a closed section has no error name
    /// * `ParseError::KeyNotFound` - a relevant trace has no application frame
    pub fn parse_line(&mut self, line: &str) -> Result<(), ParseError> {
        let Some(lines) = self.tracker.observe(line) else {
            return Ok(());
        };

        let section = Section::parse(lines, &self.keys)?;
        let mut recorded = 0;

        for trace in section.relevant_stack_traces() {
            let key = AggregationKey::new(&self.package, section.error_name(), trace.key());
            self.aggregator.record(key, trace.clone());
            recorded += 1;
        }

        debug!(
            "Section '{}' in package '{}': {} parts, {} relevant stack traces",
            section.error_name(),
            self.package,
            section.parts().len(),
            recorded
        );

        Ok(())
    }

    /// Parse every line of an in-memory log
    pub fn parse_lines<'a>(
        &mut self,
        lines: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), ParseError> {
        lines.into_iter().try_for_each(|line| self.parse_line(line))
    }

    /// End the current log
    ///
    /// Sections still waiting for their summary line are dropped, so they can
    /// neither contribute to the report nor absorb lines of the next log.
    /// Returns how many were dropped.
    pub fn finish(&mut self) -> usize {
        let abandoned = self.tracker.abandon_open();
        for section in &abandoned {
            warn!(
                "Sanitizer section without a summary line in package '{}' is not reported \
                 (prefix {:?}, {} lines)",
                self.package(),
                section.prefix(),
                section.lines().len()
            );
        }
        abandoned.len()
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }
}
