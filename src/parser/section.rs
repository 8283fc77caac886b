//! A complete sanitizer section: header, contents and summary line.
//!
//! ```text
//! WARNING: ThreadSanitizer: lock-order-inversion (potential deadlock) (pid=26542)
//! <contents>
//! SUMMARY: ThreadSanitizer: lock-order-inversion (potential deadlock) ...
//! ```
//! or
//! ```text
//! ==5054==ERROR: AddressSanitizer: SEGV on unknown address 0x60304d80008f
//! <contents>
//! SUMMARY: AddressSanitizer: SEGV (/lib/x86_64-linux-gnu/libc.so.6+0x18e5a0)
//! ```
//! The error names of these are `lock-order-inversion` and
//! `SEGV on unknown address`.

use super::policy::RelevancePolicy;
use super::section_part::SectionPart;
use super::stack_trace::{KeyExtractor, StackTrace};
use crate::utils::error::ParseError;
use regex::Regex;
use std::sync::LazyLock;

// The error name follows "Sanitizer: " and stops before a parenthesis or an address.
static ERROR_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.*Sanitizer: (?P<error_name>.+?)( \(| 0x[\da-f]+|\s*$)")
        .expect("error name pattern is valid")
});

// Parts begin at non-indented lines.
static PART_BEGIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S.*$").expect("part pattern is valid"));

/// Parse the error name out of a section header line
///
/// # Errors
/// * `ParseError::MalformedHeader` - no error name in the line
pub fn parse_error_name(header: &str) -> Result<String, ParseError> {
    ERROR_NAME
        .captures(header)
        .and_then(|caps| caps.name("error_name"))
        .map(|name| name.as_str().to_string())
        .ok_or_else(|| ParseError::MalformedHeader {
            line: header.to_string(),
        })
}

/// A decomposed sanitizer section
#[derive(Debug, Clone)]
pub struct Section {
    error_name: String,
    parts: Vec<SectionPart>,
}

impl Section {
    /// Decompose the lines of one section; `lines[0]` is the header
    ///
    /// # Errors
    /// * `ParseError::MalformedHeader` - header has no error name
    /// * `ParseError::KeyNotFound` - a relevant trace has no application frame
    pub fn parse(lines: Vec<String>, keys: &KeyExtractor) -> Result<Self, ParseError> {
        let header = lines.first().map(String::as_str).unwrap_or_default();
        let error_name = parse_error_name(header)?;
        let policy = RelevancePolicy::for_error_name(&error_name);

        let parts = part_ranges(&lines)
            .into_iter()
            .map(|(start, end)| SectionPart::parse(policy, &lines[start..end], keys))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { error_name, parts })
    }

    pub fn error_name(&self) -> &str {
        &self.error_name
    }

    pub fn parts(&self) -> &[SectionPart] {
        &self.parts
    }

    /// Relevant traces of every part, in section order
    pub fn relevant_stack_traces(&self) -> impl Iterator<Item = &StackTrace> {
        self.parts
            .iter()
            .flat_map(|part| part.relevant_stack_traces().iter())
    }
}

/// Half-open line ranges of the parts of a section
fn part_ranges(lines: &[String]) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut start = 0;

    for (index, line) in lines.iter().enumerate().skip(1) {
        if PART_BEGIN.is_match(line) {
            ranges.push((start, index));
            start = index;
        }
    }

    if start < lines.len() {
        ranges.push((start, lines.len()));
    }

    ranges
}
