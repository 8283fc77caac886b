//! Sanitizer Reports
//!
//! Deduplicated, counted reports of AddressSanitizer, LeakSanitizer and
//! ThreadSanitizer output found in test logs.
//!
//! Sanitizer sections are reassembled from possibly interleaved log lines,
//! reduced to the stack traces relevant to each error, and keyed by the first
//! frame in the project's own code. Occurrences sharing a
//! (package, error name, key) triple are counted once per occurrence and
//! reported as one CSV row and one xUnit `error` element.
//!
//! ```ignore
//! let mut parser = SanitizerLogParser::new(&ParserConfig::default())?;
//! parser.set_package("rclcpp");
//! for line in log.lines() {
//!     parser.parse_line(line)?;
//! }
//! let csv = render_csv(parser.aggregator())?;
//! ```

pub mod aggregator;
pub mod commands;
pub mod output;
pub mod parser;
pub mod utils;
