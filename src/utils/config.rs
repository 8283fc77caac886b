//! Configuration and constants for the parser and the CLI.

/// Current summary schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Path component identifying frames from the project's own sources
pub const DEFAULT_PROJECT_MARKER: &str = "/ros2";

/// Replacement for every hexadecimal address in a stack trace key
pub const ADDRESS_PLACEHOLDER: &str = "0xX";

/// Log file written for every package under the log base directory
pub const PACKAGE_LOG_FILE_NAME: &str = "stdout_stderr.log";

// Default report locations (relative to the working directory)
pub const DEFAULT_CSV_REPORT: &str = "sanitizer_report.csv";
pub const DEFAULT_XML_REPORT: &str = "test_results.xml";

/// CSV header, in column order
pub const CSV_HEADER: [&str; 5] = [
    "package",
    "error_name",
    "stack_trace_key",
    "count",
    "sample_stack_trace",
];

/// Parser settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Literal text that must appear in a frame for it to count as application code
    pub project_marker: String,
}

impl ParserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project_marker(mut self, marker: impl Into<String>) -> Self {
        self.project_marker = marker.into();
        self
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            project_marker: DEFAULT_PROJECT_MARKER.to_string(),
        }
    }
}
