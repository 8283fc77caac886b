//! Sanitizer log parsing.
//!
//! This module handles:
//! - Reassembling sanitizer sections from interleaved log lines
//! - Splitting sections into parts
//! - Selecting the relevant stack traces of each part
//! - Deriving deduplication keys from stack traces

pub mod log_parser;
pub mod policy;
pub mod section;
pub mod section_part;
pub mod stack_trace;
pub mod tracker;

// Re-export main types
pub use log_parser::SanitizerLogParser;
pub use policy::RelevancePolicy;
pub use section::{parse_error_name, Section};
pub use section_part::SectionPart;
pub use stack_trace::{KeyExtractor, StackTrace};
pub use tracker::{OpenSection, SectionTracker};
