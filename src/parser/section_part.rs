//! Relevant stack traces of one section part.
//!
//! A section part starts at an unindented line and runs through the indented
//! lines that follow it. For example, the first part of a
//! lock-order-inversion warning:
//! ```text
//! WARNING: ThreadSanitizer: lock-order-inversion (potential deadlock) (pid=26542)
//!   Cycle in lock order graph: M3363 (0x7b0c00000020) => M2800 (0x7b0c00000048) => M3363
//!
//!   Mutex M2800 acquired here while holding mutex M3363 in thread T5:
//!     <relevant stack trace>
//!
//!   Mutex M3363 acquired here while holding mutex M2800 in thread T6:
//!     <relevant stack trace>
//!
//!   Thread T5 (tid=26553, running) created by main thread at:
//!     <irrelevant stack trace>
//! ```

use super::policy::RelevancePolicy;
use super::stack_trace::{KeyExtractor, StackTrace};
use crate::utils::error::ParseError;
use regex::Regex;
use std::sync::LazyLock;

static FRAME_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#\d+\s+.*$").expect("frame pattern is valid"));

/// Whether a line is a stack frame (`#<n> ...`, optionally indented)
pub fn is_frame_line(line: &str) -> bool {
    FRAME_LINE.is_match(line)
}

/// A section part reduced to its relevant stack traces
#[derive(Debug, Clone)]
pub struct SectionPart {
    relevant_stack_traces: Vec<StackTrace>,
}

impl SectionPart {
    /// Locate and key the relevant stack traces of a part
    ///
    /// Each begin pattern of the policy is searched from where the previous
    /// trace ended, so the line that ends one trace may begin the next one.
    /// A pattern with no matching line, or with no frames after its line,
    /// contributes nothing.
    ///
    /// # Errors
    /// * `ParseError::KeyNotFound` - a relevant trace has no application frame
    pub fn parse(
        policy: RelevancePolicy,
        lines: &[String],
        keys: &KeyExtractor,
    ) -> Result<Self, ParseError> {
        let mut relevant_stack_traces = Vec::new();
        let mut cursor = 0;

        for begin in policy.begin_patterns() {
            let Some(offset) = lines[cursor..].iter().position(|line| begin.is_match(line)) else {
                cursor = lines.len();
                continue;
            };

            let first_frame = cursor + offset + 1;
            let frame_count = lines[first_frame..]
                .iter()
                .take_while(|line| is_frame_line(line))
                .count();
            cursor = first_frame + frame_count;

            if frame_count > 0 {
                let frames = lines[first_frame..cursor].to_vec();
                relevant_stack_traces.push(keys.extract(frames)?);
            }
        }

        Ok(Self {
            relevant_stack_traces,
        })
    }

    pub fn relevant_stack_traces(&self) -> &[StackTrace] {
        &self.relevant_stack_traces
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config::ParserConfig;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    fn parse(policy: RelevancePolicy, text: &str) -> SectionPart {
        let keys = KeyExtractor::new(&ParserConfig::default()).unwrap();
        SectionPart::parse(policy, &lines(text), &keys).unwrap()
    }

    #[test]
    fn test_frame_line() {
        assert!(is_frame_line("    #0 0x4b2c1 in worker() /ros2/a.cpp:1"));
        assert!(is_frame_line("#12 main"));
        assert!(!is_frame_line("    #x main"));
        assert!(!is_frame_line("  Previous write of size 4 at 0x1000 by thread T1:"));
    }

    #[test]
    fn test_lock_order_inversion_takes_first_two_mutex_traces() {
        let part = parse(
            RelevancePolicy::LockOrderInversion,
            "WARNING: ThreadSanitizer: lock-order-inversion (potential deadlock) (pid=1)
  Cycle in lock order graph: M1 (0x10) => M2 (0x20) => M1

  Mutex M2 acquired here while holding mutex M1 in thread T1:
    #0 pthread_mutex_lock <null> (libtsan.so.0+0x4f3ab)
    #1 lock_both() /ros2/src/locks.cpp:14 (test_locks+0x1a2b)

  Mutex M1 acquired here while holding mutex M2 in thread T2:
    #0 pthread_mutex_lock <null> (libtsan.so.0+0x4f3ab)
    #1 lock_reversed() /ros2/src/locks.cpp:22 (test_locks+0x1c3d)

  Thread T1 (tid=2, running) created by main thread at:
    #0 pthread_create <null> (libtsan.so.0+0x2cd6b)
    #1 main /ros2/src/locks.cpp:30 (test_locks+0x1e00)
",
        );

        let keys: Vec<&str> = part.relevant_stack_traces().iter().map(|t| t.key()).collect();
        assert_eq!(
            keys,
            vec![
                "lock_both() /ros2/src/locks.cpp:14 (test_locks+0xX)",
                "lock_reversed() /ros2/src/locks.cpp:22 (test_locks+0xX)",
            ]
        );
    }

    #[test]
    fn test_terminating_line_can_begin_next_trace() {
        let part = parse(
            RelevancePolicy::DataRace,
            "WARNING: ThreadSanitizer: data race (pid=1)
  Read of size 4 at 0x1000 by thread T1:
    #0 reader() /ros2/src/race.cpp:3 (test_race+0x10)
  Previous write of size 4 at 0x1000 by main thread:
    #0 writer() /ros2/src/race.cpp:9 (test_race+0x20)",
        );

        assert_eq!(part.relevant_stack_traces().len(), 2);
        assert_eq!(
            part.relevant_stack_traces()[1].key(),
            "writer() /ros2/src/race.cpp:9 (test_race+0xX)"
        );
    }

    #[test]
    fn test_begin_line_without_frames_is_skipped() {
        let part = parse(
            RelevancePolicy::FirstTrace,
            "==1==Hint: address points to the zero page.
  not a frame
    #0 0x1 in crash() /ros2/src/crash.cpp:8",
        );

        assert!(part.relevant_stack_traces().is_empty());
    }

    #[test]
    fn test_missing_begin_line_skips_remaining_patterns() {
        let part = parse(
            RelevancePolicy::DataRace,
            "WARNING: ThreadSanitizer: data race (pid=1)
  Previous write of size 4 at 0x1000 by main thread:
    #0 writer() /ros2/src/race.cpp:9 (test_race+0x20)",
        );

        assert!(part.relevant_stack_traces().is_empty());
    }

    #[test]
    fn test_relevant_trace_without_application_frame_is_fatal() {
        let keys = KeyExtractor::new(&ParserConfig::default()).unwrap();
        let result = SectionPart::parse(
            RelevancePolicy::FirstTrace,
            &lines(
                "==1==Hint: address points to the zero page.
    #0 0x1 in raise (/lib/libc.so.6+0x3ef)",
            ),
            &keys,
        );

        assert!(matches!(result, Err(ParseError::KeyNotFound { .. })));
    }
}
