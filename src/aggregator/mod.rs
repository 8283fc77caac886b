//! Aggregation of relevant stack traces into a deduplicated report.
//!
//! This module transforms keyed stack traces into:
//! - Occurrence counts per (package, error name, stack trace key)
//! - One sample stack trace per key
//! - Summary statistics for the text and JSON summaries

pub mod report;
pub mod summary;

// Re-export main types and functions
pub use report::{AggregationKey, AggregationRecord, Aggregator};
pub use summary::{generate_text_summary, summarize, top_keys, PackageSummary, ReportSummary};
