//! Stack trace keys.
//!
//! A key identifies the underlying defect behind a stack trace: it is the
//! text of the first frame that points into the project's own sources, with
//! every hexadecimal address masked so reproductions of the same defect in
//! different runs produce the same key.
//!
//! Example frames from LeakSanitizer output:
//! ```text
//!     #0 0x7f0c1a2b3c4d in operator new(unsigned long) (/usr/lib/libasan.so.5+0x10f2c)
//!     #1 0x7f0c19876543 in rclcpp::NodeOptions::get_rcl_node_options() const /ros2/src/rclcpp/node_options.cpp:42
//! ```
//! Frame #1 is the first application frame, so the key is
//! `rclcpp::NodeOptions::get_rcl_node_options() const /ros2/src/rclcpp/node_options.cpp:42`.

use crate::utils::config::{ParserConfig, ADDRESS_PLACEHOLDER};
use crate::utils::error::ParseError;
use regex::Regex;
use std::sync::LazyLock;

static ADDRESS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"0x[\da-f]+").expect("address pattern is valid"));

/// One relevant stack trace of a sanitizer section part
///
/// **Public** - stored by the aggregator as the sample trace of a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackTrace {
    key: String,
    lines: Vec<String>,
}

impl StackTrace {
    /// Normalized identity of the trace
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Frame lines, in log order
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Frame lines joined with newlines, as written to reports
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Finds the first application frame of a trace and derives its key
///
/// **Public** - built once per parser from its configuration
#[derive(Debug, Clone)]
pub struct KeyExtractor {
    application_frame: Regex,
}

impl KeyExtractor {
    /// Build the application-frame pattern for the configured project marker
    ///
    /// # Errors
    /// * `ParseError::InvalidProjectMarker` - pattern could not be compiled
    pub fn new(config: &ParserConfig) -> Result<Self, ParseError> {
        let pattern = format!(
            r"^\s+#\d+ (0x[\da-f]+ in|)\s*(?P<key>.*{}.*)\s*$",
            regex::escape(&config.project_marker)
        );

        Ok(Self {
            application_frame: Regex::new(&pattern)?,
        })
    }

    /// Key of the first application frame, if any frame is application code
    pub fn key_for(&self, frames: &[String]) -> Option<String> {
        frames.iter().find_map(|frame| {
            self.application_frame
                .captures(frame)
                .and_then(|caps| caps.name("key"))
                .map(|key| mask_addresses(key.as_str()))
        })
    }

    /// Turn frame lines into a keyed stack trace
    ///
    /// # Errors
    /// * `ParseError::KeyNotFound` - no frame belongs to application code
    pub fn extract(&self, frames: Vec<String>) -> Result<StackTrace, ParseError> {
        match self.key_for(&frames) {
            Some(key) => Ok(StackTrace { key, lines: frames }),
            None => Err(ParseError::KeyNotFound { frames }),
        }
    }
}

/// Replace every hexadecimal address with the fixed placeholder
pub fn mask_addresses(text: &str) -> String {
    ADDRESS_PATTERN
        .replace_all(text, ADDRESS_PLACEHOLDER)
        .into_owned()
}
