//! Summary statistics over an aggregated report.
//!
//! The summary answers "how bad is it" at a glance: total occurrences,
//! distinct keys, and their breakdown per package and per error name.

use super::report::{AggregationKey, Aggregator};
use crate::utils::config::SCHEMA_VERSION;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Report summary written as JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Schema version for compatibility checking
    pub version: String,

    /// Sum of all counts
    pub total_occurrences: u64,

    /// Number of distinct (package, error name, stack trace key) rows
    pub distinct_keys: usize,

    /// Per-package breakdown, sorted by package name
    pub packages: Vec<PackageSummary>,

    /// Occurrences per error name
    pub by_error_name: BTreeMap<String, u64>,

    /// Timestamp when the summary was generated
    pub generated_at: String,
}

/// Counts of one package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSummary {
    pub name: String,
    pub distinct_keys: usize,
    pub occurrences: u64,
}

impl ReportSummary {
    /// Whether no sanitizer output was reported at all
    pub fn is_clean(&self) -> bool {
        self.distinct_keys == 0
    }

    /// Get human-readable summary
    ///
    /// **Public** - for logging and debugging
    pub fn summary(&self) -> String {
        format!(
            "Packages: {} | Distinct keys: {} | Occurrences: {}",
            self.packages.len(),
            self.distinct_keys,
            self.total_occurrences
        )
    }
}

/// Compute the summary of an aggregated report
pub fn summarize(aggregator: &Aggregator) -> ReportSummary {
    let mut packages: BTreeMap<&str, PackageSummary> = BTreeMap::new();
    let mut by_error_name: BTreeMap<String, u64> = BTreeMap::new();

    for (key, record) in aggregator.snapshot() {
        let package = packages
            .entry(key.package.as_str())
            .or_insert_with(|| PackageSummary {
                name: key.package.clone(),
                distinct_keys: 0,
                occurrences: 0,
            });
        package.distinct_keys += 1;
        package.occurrences += record.count;

        *by_error_name.entry(key.error_name.clone()).or_insert(0) += record.count;
    }

    ReportSummary {
        version: SCHEMA_VERSION.to_string(),
        total_occurrences: aggregator.total_occurrences(),
        distinct_keys: aggregator.len(),
        packages: packages.into_values().collect(),
        by_error_name,
        generated_at: chrono::Utc::now().to_rfc3339(),
    }
}

/// The `top_n` most frequent keys, most frequent first
///
/// Ties keep key order.
pub fn top_keys(aggregator: &Aggregator, top_n: usize) -> Vec<(&AggregationKey, u64)> {
    let mut keys: Vec<(&AggregationKey, u64)> = aggregator
        .snapshot()
        .into_iter()
        .map(|(key, record)| (key, record.count))
        .collect();

    keys.sort_by(|a, b| b.1.cmp(&a.1));
    keys.truncate(top_n);
    keys
}

/// Render a plain-text table of the most frequent keys
pub fn generate_text_summary(aggregator: &Aggregator, max_lines: usize) -> String {
    let mut lines = Vec::new();

    lines.push(format!(
        "  {:>7}  {:<24}  {:<22}  {}",
        "COUNT", "PACKAGE", "ERROR", "STACK TRACE KEY"
    ));

    for (key, count) in top_keys(aggregator, max_lines) {
        lines.push(format!(
            "  {:>7}  {:<24}  {:<22}  {}",
            count,
            truncate(&key.package, 24),
            truncate(&key.error_name, 22),
            key.stack_trace_key
        ));
    }

    if aggregator.len() > max_lines {
        lines.push(format!("  ... {} more", aggregator.len() - max_lines));
    }

    lines.join("\n")
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}
