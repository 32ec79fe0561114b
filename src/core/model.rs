// BugSleuth - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// platform dependencies.
//
// These types are the shared vocabulary between the classifier, the
// accumulator, the aggregator, and the report.

use chrono::{NaiveDate, NaiveTime};
use std::fmt;

// =============================================================================
// Log line (raw input)
// =============================================================================

/// One raw line of the input with its 1-based line number.
///
/// Borrowed from the file content; lives only for the duration of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLine<'a> {
    pub text: &'a str,
    pub number: u64,
}

// =============================================================================
// Log level
// =============================================================================

/// Android log priority, written as a single upper-case letter in
/// `threadtime` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Verbose,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    Assert,
    /// Any other upper-case letter (e.g. `S` for silent).
    Other(char),
}

impl LogLevel {
    /// Map a priority letter to its level. Returns `None` for anything that
    /// is not an ASCII upper-case letter.
    pub fn from_letter(letter: char) -> Option<Self> {
        let level = match letter {
            'V' => Self::Verbose,
            'D' => Self::Debug,
            'I' => Self::Info,
            'W' => Self::Warn,
            'E' => Self::Error,
            'F' => Self::Fatal,
            'A' => Self::Assert,
            c if c.is_ascii_uppercase() => Self::Other(c),
            _ => return None,
        };
        Some(level)
    }

    /// The single-letter form used in log output.
    pub fn letter(&self) -> char {
        match self {
            Self::Verbose => 'V',
            Self::Debug => 'D',
            Self::Info => 'I',
            Self::Warn => 'W',
            Self::Error => 'E',
            Self::Fatal => 'F',
            Self::Assert => 'A',
            Self::Other(c) => *c,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

// =============================================================================
// Timestamp
// =============================================================================

/// Year-less timestamp from the `MM-DD HH:MM:SS.mmm` logcat prefix.
///
/// Bugreport logcat sections omit the year, so only month, day, and time of
/// day are kept. Ordering is field-wise and therefore only meaningful within
/// a single calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LogTimestamp {
    pub month: u32,
    pub day: u32,
    pub time: NaiveTime,
}

impl LogTimestamp {
    /// Parse the date (`MM-DD`) and time (`HH:MM:SS.mmm`) fields.
    ///
    /// Returns `None` when either field is out of range. Feb 29 is accepted
    /// because the year is unknown.
    pub fn parse(date: &str, time: &str) -> Option<Self> {
        let (month, day) = date.split_once('-')?;
        let month: u32 = month.parse().ok()?;
        let day: u32 = day.parse().ok()?;
        // 2000 is a leap year, so every real month/day pair validates.
        NaiveDate::from_ymd_opt(2000, month, day)?;
        let time = NaiveTime::parse_from_str(time, "%H:%M:%S%.3f").ok()?;
        Some(Self { month, day, time })
    }
}

impl fmt::Display for LogTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}-{:02} {}",
            self.month,
            self.day,
            self.time.format("%H:%M:%S%.3f")
        )
    }
}

// =============================================================================
// Parsed line (classifier output)
// =============================================================================

/// Result of classifying one raw line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine<'a> {
    /// First line of a fatal exception for the target pid.
    StackHeader {
        pid: &'a str,
        timestamp: LogTimestamp,
        message: &'a str,
    },

    /// An `at ...` frame line of a fatal exception for the target pid.
    StackContinuation {
        pid: &'a str,
        timestamp: LogTimestamp,
        frame: &'a str,
    },

    /// Any other well-formed logcat line, for any pid.
    LeveledEntry {
        pid: &'a str,
        timestamp: LogTimestamp,
        level: LogLevel,
        tag: &'a str,
        message: &'a str,
    },

    /// Blank, malformed, or foreign-format line.
    Unmatched,
}

// =============================================================================
// Trace record (accumulator output)
// =============================================================================

/// A reconstructed multi-line fatal exception.
///
/// `fragments[0]` is the header message (the signature); the rest are
/// frame texts in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRecord {
    pub fragments: Vec<String>,
    /// Line number of the header.
    pub line_number: u64,
    /// Timestamp of the header.
    pub timestamp: LogTimestamp,
}

impl TraceRecord {
    /// Start a record from its header line.
    pub fn new(header: &str, line_number: u64, timestamp: LogTimestamp) -> Self {
        Self {
            fragments: vec![header.to_string()],
            line_number,
            timestamp,
        }
    }

    /// The dedup key: the header message.
    pub fn signature(&self) -> &str {
        self.fragments.first().map(String::as_str).unwrap_or("")
    }

    /// Frame lines joined with `\n`. Empty for a header-only record.
    pub fn body(&self) -> String {
        self.fragments.get(1..).unwrap_or(&[]).join("\n")
    }

    /// Number of fragments including the header.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

// =============================================================================
// Aggregate entries
// =============================================================================

/// One deduplicated row of the fatal-exception or error table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateEntry {
    /// First-seen ordinal, starting at 1.
    pub index: usize,
    /// Number of occurrences.
    pub count: usize,
    /// Trace body of the first occurrence. Always empty for error entries.
    pub body: String,
    /// Line number of the first occurrence.
    pub first_line: u64,
    /// Timestamp of the first occurrence.
    pub first_seen: LogTimestamp,
}

/// Substring hits for one exact message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchTally {
    /// One entry per (line, matching substring) pair, in input order.
    pub line_numbers: Vec<u64>,
    /// Distinct substrings that matched this message, in first-hit order.
    pub substrings: Vec<String>,
}

impl MatchTally {
    pub fn count(&self) -> usize {
        self.line_numbers.len()
    }
}
