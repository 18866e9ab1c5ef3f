//! Line filtering rules

use aws_cleaner_common::LogLevel;
use std::borrow::Cow;

/// Counts reported after a file has been filtered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub original_lines: usize,
    pub kept_lines: usize,
    pub warning_lines: usize,
}

impl FilterStats {
    pub fn removed_lines(&self) -> usize {
        self.original_lines - self.kept_lines
    }

    /// Share of lines dropped, in percent. Zero for an empty file.
    pub fn removed_percent(&self) -> f64 {
        if self.original_lines == 0 {
            return 0.0;
        }
        self.removed_lines() as f64 / self.original_lines as f64 * 100.0
    }
}

/// Decide what happens to a single line.
///
/// Rules are checked in order:
/// 1. `INFO` lines whose message starts with `Completed` are kept and
///    promoted to `WARNING`.
/// 2. `WARNING` lines are kept.
/// 3. Any other line mentioning `Successfully` is kept.
///
/// Everything else is dropped.
pub fn filter_line(line: &str) -> Option<Cow<'_, str>> {
    let info = LogLevel::Info.marker();
    let warning = LogLevel::Warning.marker();

    if line.contains(&format!("{info}Completed")) {
        Some(Cow::Owned(line.replace(&info, &warning)))
    } else if line.contains(warning.trim_end()) {
        Some(Cow::Borrowed(line))
    } else if line.contains("Successfully") {
        Some(Cow::Borrowed(line))
    } else {
        None
    }
}

/// Filter a whole file body. Kept lines are joined with `\n` and the result
/// carries no trailing newline.
pub fn filter_content(content: &str) -> (String, FilterStats) {
    let mut original_lines = 0;
    let mut kept = Vec::new();

    for line in content.lines() {
        original_lines += 1;
        if let Some(line) = filter_line(line) {
            kept.push(line);
        }
    }

    let filtered = kept.join("\n");
    let warning_marker = LogLevel::Warning.marker();
    let warning_lines = filtered.matches(warning_marker.trim_end()).count();

    let stats = FilterStats {
        original_lines,
        kept_lines: kept.len(),
        warning_lines,
    };
    (filtered, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_cleaner_test_utils::{log_line, sample_log};
    use proptest::prelude::*;

    #[test]
    fn test_completed_info_is_promoted() {
        let line = log_line(LogLevel::Info, "Completed EC2 resource cleanup in us-west-2");
        let kept = filter_line(&line).expect("completed lines are kept");
        assert_eq!(
            kept,
            log_line(LogLevel::Warning, "Completed EC2 resource cleanup in us-west-2")
        );
    }

    #[test]
    fn test_warning_lines_kept_verbatim() {
        let line = log_line(LogLevel::Warning, "Deleting subnet subnet-1");
        assert_eq!(filter_line(&line).as_deref(), Some(line.as_str()));
    }

    #[test]
    fn test_successfully_kept_at_any_level() {
        let line = log_line(LogLevel::Info, "Successfully released Elastic IP eipalloc-1");
        assert_eq!(filter_line(&line).as_deref(), Some(line.as_str()));
    }

    #[test]
    fn test_plain_info_error_and_debug_dropped() {
        for (level, msg) in [
            (LogLevel::Info, "Found 3 subnets"),
            (LogLevel::Error, "Failed to delete subnet subnet-1"),
            (LogLevel::Debug, "Skipping main route table"),
        ] {
            assert!(filter_line(&log_line(level, msg)).is_none(), "{level} {msg}");
        }
    }

    #[test]
    fn test_completed_elsewhere_in_message_is_not_promoted() {
        let line = log_line(LogLevel::Info, "Stack state UPDATE_COMPLETE observed, not Completed");
        assert!(filter_line(&line).is_none());
    }

    #[test]
    fn test_filter_content_stats() {
        let (filtered, stats) = filter_content(&sample_log());
        assert_eq!(stats.original_lines, 8);
        assert_eq!(stats.kept_lines, 4);
        assert_eq!(stats.removed_lines(), 4);
        assert_eq!(stats.warning_lines, 3);
        assert!(!filtered.ends_with('\n'));
        assert!((stats.removed_percent() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_content() {
        let (filtered, stats) = filter_content("");
        assert!(filtered.is_empty());
        assert_eq!(stats, FilterStats::default());
        assert_eq!(stats.removed_percent(), 0.0);
    }

    proptest! {
        #[test]
        fn filtered_lines_come_from_input(lines in proptest::collection::vec("[ -~]{0,60}", 0..40)) {
            let content = lines.join("\n");
            let (filtered, stats) = filter_content(&content);
            prop_assert!(stats.kept_lines <= stats.original_lines);
            let warning = LogLevel::Warning.marker();
            let info = LogLevel::Info.marker();
            for out in filtered.lines() {
                let from_input = content.lines().any(|l| {
                    l == out || l.replace(&info, &warning) == out
                });
                prop_assert!(from_input, "line not derived from input: {out:?}");
            }
        }
    }
}
