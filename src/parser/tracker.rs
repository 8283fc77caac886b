//! Reassembly of sanitizer sections from an interleaved log.
//!
//! Multi-threaded processes write to the same log concurrently, so the lines
//! of one sanitizer section can be interspersed with unrelated output and with
//! the lines of other sections. Every line of a section carries the same
//! prefix as its header (whatever the logging wrapper prepends, like
//! `[talker-1] `), which is what ties the lines back together.

use log::debug;
use regex::Regex;
use std::sync::LazyLock;

static SECTION_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<prefix>.*?)(==\d+==|)(WARNING|ERROR):.*Sanitizer:.*$")
        .expect("section start pattern is valid")
});

static SECTION_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<prefix>.*)(SUMMARY: .*Sanitizer: .*)$").expect("section end pattern is valid")
});

/// A section whose summary line has not been seen yet
#[derive(Debug, Clone)]
pub struct OpenSection {
    prefix: String,
    lines: Vec<String>,
}

impl OpenSection {
    fn new(prefix: &str, header: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            lines: vec![header.to_string()],
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Lines gathered so far, prefix removed
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The line without this section's prefix, if it carries the prefix
    fn strip<'a>(&self, line: &'a str) -> Option<&'a str> {
        line.strip_prefix(self.prefix.as_str())
    }
}

/// Tracks every open section of one log
///
/// **Public** - driven line by line by `SanitizerLogParser`
#[derive(Debug, Default)]
pub struct SectionTracker {
    open: Vec<OpenSection>,
}

impl SectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next log line
    ///
    /// Returns the lines of a section (header through summary, prefix removed)
    /// once its summary line arrives.
    ///
    /// A header line opens a section and belongs to it alone. A header whose
    /// prefix equals that of a section still open restarts that section; the
    /// lines gathered for the abandoned one are dropped. Any other line goes to
    /// the first open section, in opening order, whose prefix it carries.
    pub fn observe(&mut self, line: &str) -> Option<Vec<String>> {
        let line = line.trim_end();

        if let Some(caps) = SECTION_START.captures(line) {
            let prefix = caps.name("prefix").map_or("", |m| m.as_str());
            let header = &line[prefix.len()..];
            let section = OpenSection::new(prefix, header);

            match self.open.iter_mut().find(|open| open.prefix == prefix) {
                Some(existing) => {
                    debug!(
                        "Restarting open section with prefix {:?} ({} lines dropped)",
                        prefix,
                        existing.lines.len()
                    );
                    *existing = section;
                }
                None => {
                    debug!("Opened section with prefix {:?}: {}", prefix, header);
                    self.open.push(section);
                }
            }

            return None;
        }

        let index = self.open.iter().position(|open| open.strip(line).is_some())?;
        let open = &mut self.open[index];
        let stripped = open.strip(line).unwrap_or(line);
        let is_end = SECTION_END.is_match(stripped);
        open.lines.push(stripped.to_string());

        if !is_end {
            return None;
        }

        let closed = self.open.remove(index);
        debug!(
            "Closed section with prefix {:?} ({} lines)",
            closed.prefix,
            closed.lines.len()
        );

        Some(closed.lines)
    }

    /// Sections opened but not closed yet
    pub fn open_sections(&self) -> &[OpenSection] {
        &self.open
    }

    /// Drop every open section and return them
    pub fn abandon_open(&mut self) -> Vec<OpenSection> {
        std::mem::take(&mut self.open)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn feed(tracker: &mut SectionTracker, text: &str) -> Vec<Vec<String>> {
        text.lines().filter_map(|line| tracker.observe(line)).collect()
    }

    #[test]
    fn test_collects_section_with_prefix_removed() {
        let mut tracker = SectionTracker::new();
        let closed = feed(
            &mut tracker,
            "[talker-1] starting up
[talker-1] WARNING: ThreadSanitizer: data race (pid=1)
[talker-1]   Write of size 4 at 0x10 by thread T1:
[talker-1]     #0 worker() /ros2/src/a.cpp:1 (a+0x1)
[talker-1] SUMMARY: ThreadSanitizer: data race /ros2/src/a.cpp:1 in worker()
[talker-1] shutting down",
        );

        assert_eq!(
            closed,
            vec![vec![
                "WARNING: ThreadSanitizer: data race (pid=1)".to_string(),
                "  Write of size 4 at 0x10 by thread T1:".to_string(),
                "    #0 worker() /ros2/src/a.cpp:1 (a+0x1)".to_string(),
                "SUMMARY: ThreadSanitizer: data race /ros2/src/a.cpp:1 in worker()".to_string(),
            ]]
        );
        assert!(tracker.open_sections().is_empty());
    }

    #[test]
    fn test_interleaved_sections_are_separated() {
        let mut tracker = SectionTracker::new();
        let closed = feed(
            &mut tracker,
            "[a] WARNING: ThreadSanitizer: data race (pid=1)
[b] ==7==ERROR: AddressSanitizer: SEGV on unknown address 0x0 (pc 0x1 T0)
[a]   Read of size 4 at 0x10 by thread T1:
[launch] unrelated
[b]     #0 0x1 in crash() /ros2/src/b.cpp:2
[a] SUMMARY: ThreadSanitizer: data race
[b] SUMMARY: AddressSanitizer: SEGV /ros2/src/b.cpp:2 in crash()",
        );

        assert_eq!(closed.len(), 2);
        assert_eq!(closed[0][0], "WARNING: ThreadSanitizer: data race (pid=1)");
        assert_eq!(closed[0].len(), 3);
        assert_eq!(
            closed[1][0],
            "==7==ERROR: AddressSanitizer: SEGV on unknown address 0x0 (pc 0x1 T0)"
        );
        assert_eq!(closed[1][1], "    #0 0x1 in crash() /ros2/src/b.cpp:2");
    }

    #[test]
    fn test_first_matching_section_wins() {
        let mut tracker = SectionTracker::new();
        tracker.observe("WARNING: ThreadSanitizer: data race (pid=1)");
        tracker.observe("[b] WARNING: ThreadSanitizer: data race (pid=2)");

        // "[b] ..." also carries the empty prefix of the older section.
        tracker.observe("[b]   Read of size 4 at 0x10 by thread T1:");

        let open = tracker.open_sections();
        assert_eq!(open.len(), 2);
        assert_eq!(open[0].lines().len(), 2);
        assert_eq!(open[0].lines()[1], "[b]   Read of size 4 at 0x10 by thread T1:");
        assert_eq!(open[1].lines().len(), 1);
    }

    #[test]
    fn test_same_prefix_header_restarts_section() {
        let mut tracker = SectionTracker::new();
        tracker.observe("WARNING: ThreadSanitizer: data race (pid=1)");
        tracker.observe("  Read of size 4 at 0x10 by thread T1:");
        tracker.observe("==9==ERROR: AddressSanitizer: heap-use-after-free on address 0x20");

        let open = tracker.open_sections();
        assert_eq!(open.len(), 1);
        assert_eq!(
            open[0].lines(),
            ["==9==ERROR: AddressSanitizer: heap-use-after-free on address 0x20".to_string()]
        );
    }

    #[test]
    fn test_unterminated_section_stays_open() {
        let mut tracker = SectionTracker::new();
        let closed = feed(
            &mut tracker,
            "WARNING: ThreadSanitizer: data race (pid=1)\n  Read of size 4 at 0x10 by thread T1:",
        );

        assert!(closed.is_empty());
        assert_eq!(tracker.open_sections().len(), 1);
        assert_eq!(tracker.open_sections()[0].prefix(), "");
    }

    #[test]
    fn test_abandoned_sections_do_not_capture_later_lines() {
        let mut tracker = SectionTracker::new();
        tracker.observe("WARNING: ThreadSanitizer: data race (pid=1)");

        let abandoned = tracker.abandon_open();
        assert_eq!(abandoned.len(), 1);
        assert!(tracker.open_sections().is_empty());

        assert_eq!(tracker.observe("[t]   Read of size 4 at 0x10 by thread T1:"), None);
        assert_eq!(tracker.observe("[t] SUMMARY: ThreadSanitizer: data race"), None);
    }

    #[test]
    fn test_lines_without_open_section_are_ignored() {
        let mut tracker = SectionTracker::new();
        assert_eq!(tracker.observe("SUMMARY: ThreadSanitizer: data race"), None);
        assert!(tracker.open_sections().is_empty());
    }
}
