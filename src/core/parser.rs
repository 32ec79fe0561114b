// BugSleuth - core/parser.rs
//
// Line classifier for Android `threadtime` logcat lines as they appear in
// bugreports:
//
//   08-27 19:02:04.123  4667  4667 E AndroidRuntime: FATAL EXCEPTION: main
//   MM-DD HH:MM:SS.mmm  PID   TID  L TAG           : MESSAGE
//
// Core layer: pure function of one line, never touches the filesystem.

use crate::core::model::{LogLevel, LogTimestamp, ParsedLine};
use crate::util::constants;
use regex::Regex;
use std::sync::OnceLock;

/// The general leveled-line shape. The tag runs up to the first colon; one
/// optional space after the colon belongs to the separator, not the message.
fn line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Exercised by the unit tests below.
        Regex::new(
            r"^(?P<date>\d{2}-\d{2})\s+(?P<time>\d{2}:\d{2}:\d{2}\.\d{3})\s+(?P<pid>\d+)\s+(?P<tid>\d+)\s+(?P<level>[A-Z])\s+(?P<tag>[^:]*?)\s*:\s?(?P<message>.*)$",
        )
        .expect("line_pattern: invalid regex")
    })
}

/// True if `pid` is a non-empty run of ASCII digits.
pub fn is_valid_pid(pid: &str) -> bool {
    !pid.is_empty() && pid.bytes().all(|b| b.is_ascii_digit())
}

/// Classifies raw lines relative to a crash-marker tag.
#[derive(Debug, Clone)]
pub struct LineClassifier {
    crash_tag: String,
}

impl LineClassifier {
    pub fn new(crash_tag: impl Into<String>) -> Self {
        Self {
            crash_tag: crash_tag.into(),
        }
    }

    /// Classify one raw line.
    ///
    /// Crash header/continuation detection runs first and only for
    /// `target_pid`; a crash line from any other process comes back as a
    /// plain `LeveledEntry` carrying its own pid so the caller can discard
    /// it. Lines whose prefix fields are missing, non-numeric, or out of
    /// range are `Unmatched`.
    pub fn classify<'a>(&self, line: &'a str, target_pid: &str) -> ParsedLine<'a> {
        let Some(caps) = line_pattern().captures(line) else {
            return ParsedLine::Unmatched;
        };

        let (Some(date), Some(time), Some(pid), Some(level), Some(message)) = (
            caps.name("date"),
            caps.name("time"),
            caps.name("pid"),
            caps.name("level"),
            caps.name("message"),
        ) else {
            return ParsedLine::Unmatched;
        };

        let pid = pid.as_str();
        if !is_valid_pid(pid) {
            return ParsedLine::Unmatched;
        }
        let Some(timestamp) = LogTimestamp::parse(date.as_str(), time.as_str()) else {
            return ParsedLine::Unmatched;
        };
        let Some(level) = level.as_str().chars().next().and_then(LogLevel::from_letter) else {
            return ParsedLine::Unmatched;
        };
        let tag = caps.name("tag").map(|m| m.as_str()).unwrap_or("");
        let message = message.as_str();

        if pid == target_pid && self.is_crash_line(level, tag) {
            return match frame_text(message) {
                Some(frame) => ParsedLine::StackContinuation {
                    pid,
                    timestamp,
                    frame,
                },
                None => ParsedLine::StackHeader {
                    pid,
                    timestamp,
                    message,
                },
            };
        }

        ParsedLine::LeveledEntry {
            pid,
            timestamp,
            level,
            tag,
            message,
        }
    }

    fn is_crash_line(&self, level: LogLevel, tag: &str) -> bool {
        level == LogLevel::Error && !self.crash_tag.is_empty() && tag.contains(&self.crash_tag)
    }
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new(constants::DEFAULT_CRASH_TAG)
    }
}

/// The text after the `at ` marker if `message` is a stack-frame line.
fn frame_text(message: &str) -> Option<&str> {
    message
        .trim_start()
        .strip_prefix(constants::FRAME_MARKER)
        .map(str::trim_start)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PID: &str = "1234";

    fn classify(line: &str) -> ParsedLine<'_> {
        LineClassifier::default().classify(line, PID)
    }

    #[test]
    fn test_plain_error_line() {
        match classify("01-01 00:00:00.000  1234  0001 E MyTag: boom") {
            ParsedLine::LeveledEntry {
                pid,
                level,
                tag,
                message,
                ..
            } => {
                assert_eq!(pid, "1234");
                assert_eq!(level, LogLevel::Error);
                assert_eq!(tag, "MyTag");
                assert_eq!(message, "boom");
            }
            other => panic!("expected LeveledEntry, got {other:?}"),
        }
    }

    #[test]
    fn test_crash_header_keeps_colons_in_message() {
        match classify("01-01 00:00:00.000  1234  1234 E AndroidRuntime: java.lang.Exception: X") {
            ParsedLine::StackHeader { pid, message, .. } => {
                assert_eq!(pid, "1234");
                assert_eq!(message, "java.lang.Exception: X");
            }
            other => panic!("expected StackHeader, got {other:?}"),
        }
    }

    #[test]
    fn test_crash_continuation_strips_frame_marker() {
        match classify("01-01 00:00:00.001  1234  1234 E AndroidRuntime: \tat com.example.Foo.run(Foo.java:42)") {
            ParsedLine::StackContinuation { frame, .. } => {
                assert_eq!(frame, "com.example.Foo.run(Foo.java:42)");
            }
            other => panic!("expected StackContinuation, got {other:?}"),
        }
    }

    #[test]
    fn test_crash_line_for_other_pid_is_leveled_entry() {
        match classify("01-01 00:00:00.000  9999  9999 E AndroidRuntime: at foo()") {
            ParsedLine::LeveledEntry { pid, message, .. } => {
                assert_eq!(pid, "9999");
                assert_eq!(message, "at foo()");
            }
            other => panic!("expected LeveledEntry, got {other:?}"),
        }
    }

    #[test]
    fn test_crash_tag_at_non_error_level_is_leveled_entry() {
        assert!(matches!(
            classify("01-01 00:00:00.000  1234  1234 W AndroidRuntime: at foo()"),
            ParsedLine::LeveledEntry {
                level: LogLevel::Warn,
                ..
            }
        ));
    }

    #[test]
    fn test_pid_must_match_exactly() {
        // 12345 contains 1234 but is a different process.
        assert!(matches!(
            classify("01-01 00:00:00.000 12345 12345 E AndroidRuntime: java.lang.Error"),
            ParsedLine::LeveledEntry { pid: "12345", .. }
        ));
    }

    #[test]
    fn test_custom_crash_tag() {
        let classifier = LineClassifier::new("DEBUG");
        assert!(matches!(
            classifier.classify("01-01 00:00:00.000  1234  1234 E DEBUG: signal 11 (SIGSEGV)", PID),
            ParsedLine::StackHeader { .. }
        ));
        assert!(matches!(
            classifier.classify("01-01 00:00:00.000  1234  1234 E AndroidRuntime: boom", PID),
            ParsedLine::LeveledEntry { .. }
        ));
    }

    #[test]
    fn test_unmatched_lines() {
        for line in [
            "",
            "   ",
            "------ SYSTEM LOG (logcat -v threadtime) ------",
            "\tat com.example.Foo.run(Foo.java:42)",
            "01-01 00:00:00  1234  1234 E Tag: missing millis",
            "01-01 00:00:00.000  abcd  1234 E Tag: non-numeric pid",
            "01-01 00:00:00.000  1234  1234 e Tag: lower-case level",
            "01-01 00:00:00.000  1234  1234 E no colon anywhere",
            "13-45 00:00:00.000  1234  1234 E Tag: impossible date",
            "01-01 24:00:00.000  1234  1234 E Tag: impossible time",
        ] {
            assert_eq!(classify(line), ParsedLine::Unmatched, "line: {line:?}");
        }
    }

    #[test]
    fn test_timestamp_is_extracted() {
        match classify("08-27 19:02:04.123  1234  1234 I ActivityManager: Start proc") {
            ParsedLine::LeveledEntry { timestamp, .. } => {
                assert_eq!(timestamp.to_string(), "08-27 19:02:04.123");
            }
            other => panic!("expected LeveledEntry, got {other:?}"),
        }
    }

    #[test]
    fn test_is_valid_pid() {
        assert!(is_valid_pid("4667"));
        assert!(!is_valid_pid(""));
        assert!(!is_valid_pid("46a7"));
        assert!(!is_valid_pid(" 4667"));
    }
}
