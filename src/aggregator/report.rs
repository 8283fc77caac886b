//! Deduplicated occurrence counts of relevant stack traces.

use crate::parser::StackTrace;
use std::collections::BTreeMap;

/// Primary key of the report
///
/// No two report rows share a key; every occurrence of a key is folded into
/// one count. A single sanitizer section may have several relevant traces and
/// therefore contribute to several keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AggregationKey {
    /// Package whose test output contained the section
    pub package: String,

    /// Sanitizer error name, e.g. "data race" or "lock-order-inversion"
    pub error_name: String,

    /// Key of the relevant stack trace
    pub stack_trace_key: String,
}

impl AggregationKey {
    pub fn new(
        package: impl Into<String>,
        error_name: impl Into<String>,
        stack_trace_key: impl Into<String>,
    ) -> Self {
        Self {
            package: package.into(),
            error_name: error_name.into(),
            stack_trace_key: stack_trace_key.into(),
        }
    }
}

/// Aggregated state of one key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationRecord<'a> {
    /// Occurrences of the key, at least 1
    pub count: u64,

    /// First stack trace seen for the key
    pub sample_trace: &'a StackTrace,
}

/// Accumulates keyed stack traces
///
/// **Public** - owned by `SanitizerLogParser`, read by the output writers
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    counts: BTreeMap<AggregationKey, u64>,
    samples: BTreeMap<AggregationKey, StackTrace>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of a key
    ///
    /// The trace is kept as sample only if the key has not been seen before.
    pub fn record(&mut self, key: AggregationKey, trace: StackTrace) {
        *self.counts.entry(key.clone()).or_insert(0) += 1;
        self.samples.entry(key).or_insert(trace);
    }

    /// Read-only view of every key, in key order
    pub fn snapshot(&self) -> BTreeMap<&AggregationKey, AggregationRecord<'_>> {
        self.counts
            .iter()
            .filter_map(|(key, &count)| {
                self.samples
                    .get(key)
                    .map(|sample_trace| (key, AggregationRecord { count, sample_trace }))
            })
            .collect()
    }

    /// Count of one key, 0 if never recorded
    pub fn count(&self, key: &AggregationKey) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts
    pub fn total_occurrences(&self) -> u64 {
        self.counts.values().sum()
    }
}
