//! Which stack traces of a section part are relevant to report.
//!
//! Sanitizer sections carry incidental traces next to the ones that explain
//! the error (thread creation sites, heap block allocation sites). Each known
//! error kind lists, in order, the lines that introduce its relevant traces.

use regex::Regex;
use std::sync::LazyLock;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("relevance pattern is valid")
}

static DATA_RACE_BEGIN: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        compile(r"^\s+(Read|Write) of size \d+ at 0x[\da-f]+ .*$"),
        compile(r"^\s+Previous (read|write) of size \d+ at 0x[\da-f]+ .*$"),
    ]
});

// Indirect leaks are a consequence of a direct leak, so only direct ones count.
static MEMORY_LEAK_BEGIN: LazyLock<[Regex; 1]> = LazyLock::new(|| {
    [compile(
        r"^Direct leak of \d+ byte\(s\) in \d+ object\(s\) allocated from:$",
    )]
});

static LOCK_ORDER_INVERSION_BEGIN: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    let pattern = r"^\s+Mutex M\d+ acquired here while holding mutex M\d+ in .*$";
    [compile(pattern), compile(pattern)]
});

static FIRST_TRACE_BEGIN: LazyLock<[Regex; 1]> = LazyLock::new(|| [compile(r"^.*$")]);

/// Relevance policy of one error kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelevancePolicy {
    /// Current access, then the previous conflicting access
    DataRace,
    /// The trace following a "Direct leak" line
    DetectedMemoryLeaks,
    /// The first two "Mutex acquired here" traces
    LockOrderInversion,
    /// The trace right after the first line of the part
    FirstTrace,
}

impl RelevancePolicy {
    /// Select the policy for an error name parsed from a section header
    pub fn for_error_name(error_name: &str) -> Self {
        match error_name {
            "data race" => RelevancePolicy::DataRace,
            "detected memory leaks" => RelevancePolicy::DetectedMemoryLeaks,
            "lock-order-inversion" => RelevancePolicy::LockOrderInversion,
            _ => RelevancePolicy::FirstTrace,
        }
    }

    /// Ordered patterns of the lines that begin each relevant trace
    pub fn begin_patterns(self) -> &'static [Regex] {
        match self {
            RelevancePolicy::DataRace => DATA_RACE_BEGIN.as_slice(),
            RelevancePolicy::DetectedMemoryLeaks => MEMORY_LEAK_BEGIN.as_slice(),
            RelevancePolicy::LockOrderInversion => LOCK_ORDER_INVERSION_BEGIN.as_slice(),
            RelevancePolicy::FirstTrace => FIRST_TRACE_BEGIN.as_slice(),
        }
    }
}
