// BugSleuth - core/aggregator.rs
//
// Per-run aggregate tables: deduplicated fatal exceptions, error message
// counts, and substring match tallies. One Aggregator is built per run and
// returned by the pipeline; there is no shared or global state.

use crate::core::model::{AggregateEntry, LogTimestamp, MatchTally, TraceRecord};
use crate::core::table::OrderedTable;

/// Line counters gathered during a pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalysisStats {
    /// Lines read from the input.
    pub lines_processed: u64,
    /// Lines that classified as belonging to the target pid.
    pub target_lines: u64,
    /// Lines that matched no known shape.
    pub unmatched_lines: u64,
    /// Frame lines for the target pid seen while no trace was open.
    pub orphan_frames: u64,
    /// Frame lines dropped by the per-trace frame cap.
    pub frames_dropped: u64,
}

/// Aggregate tables for one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregator {
    fatal_exceptions: OrderedTable<AggregateEntry>,
    errors: OrderedTable<AggregateEntry>,
    matches: OrderedTable<MatchTally>,
    substring_totals: OrderedTable<usize>,
    pub(crate) stats: AnalysisStats,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a closed trace. The first occurrence of a signature fixes its
    /// index and body; later ones only bump the count, even when their
    /// frames differ.
    pub fn record_trace(&mut self, record: &TraceRecord) {
        let entry = self
            .fatal_exceptions
            .get_or_insert_with(record.signature(), |index| AggregateEntry {
                index,
                count: 0,
                body: record.body(),
                first_line: record.line_number,
                first_seen: record.timestamp,
            });
        entry.count += 1;
    }

    /// Count one occurrence of an error-level message.
    pub fn record_error(&mut self, message: &str, line_number: u64, timestamp: LogTimestamp) {
        let entry = self
            .errors
            .get_or_insert_with(message, |index| AggregateEntry {
                index,
                count: 0,
                body: String::new(),
                first_line: line_number,
                first_seen: timestamp,
            });
        entry.count += 1;
    }

    /// Check `message` against every search substring independently. Each
    /// substring found adds `line_number` to the message's tally once.
    /// Returns the number of substrings that matched.
    pub fn record_matches<S: AsRef<str>>(
        &mut self,
        message: &str,
        line_number: u64,
        substrings: &[S],
    ) -> usize {
        let mut hits = 0;
        for needle in substrings {
            let needle = needle.as_ref();
            if !message.contains(needle) {
                continue;
            }
            hits += 1;

            let tally = self.matches.get_or_insert_with(message, |_| MatchTally::default());
            tally.line_numbers.push(line_number);
            if !tally.substrings.iter().any(|s| s == needle) {
                tally.substrings.push(needle.to_string());
            }

            *self.substring_totals.get_or_insert_with(needle, |_| 0) += 1;
        }
        hits
    }

    /// Deduplicated fatal exceptions keyed by signature, in first-seen order.
    pub fn fatal_exceptions(&self) -> &OrderedTable<AggregateEntry> {
        &self.fatal_exceptions
    }

    /// Error messages keyed by exact text, in first-seen order.
    pub fn errors(&self) -> &OrderedTable<AggregateEntry> {
        &self.errors
    }

    /// Substring tallies keyed by exact message, in first-seen order.
    pub fn matches(&self) -> &OrderedTable<MatchTally> {
        &self.matches
    }

    /// Total hits per search substring, in first-hit order.
    pub fn substring_totals(&self) -> &OrderedTable<usize> {
        &self.substring_totals
    }

    pub fn stats(&self) -> &AnalysisStats {
        &self.stats
    }

    /// True if nothing was recorded in any table.
    pub fn is_empty(&self) -> bool {
        self.fatal_exceptions.is_empty() && self.errors.is_empty() && self.matches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts() -> LogTimestamp {
        LogTimestamp::parse("01-01", "00:00:00.000").unwrap()
    }

    fn trace(fragments: &[&str], line: u64) -> TraceRecord {
        let mut record = TraceRecord::new(fragments[0], line, ts());
        record
            .fragments
            .extend(fragments[1..].iter().map(|f| f.to_string()));
        record
    }

    #[test]
    fn test_trace_dedup_keeps_first_body_and_index() {
        let mut agg = Aggregator::new();
        agg.record_trace(&trace(&["E1", "a()"], 1));
        agg.record_trace(&trace(&["E2"], 5));
        agg.record_trace(&trace(&["E1", "different()"], 9));

        let table = agg.fatal_exceptions();
        assert_eq!(table.len(), 2);
        let e1 = table.get("E1").unwrap();
        assert_eq!(e1.index, 1);
        assert_eq!(e1.count, 2);
        assert_eq!(e1.body, "a()");
        assert_eq!(e1.first_line, 1);
        assert_eq!(table.get("E2").unwrap().index, 2);
    }

    #[test]
    fn test_error_counts_by_exact_message() {
        let mut agg = Aggregator::new();
        agg.record_error("boom", 1, ts());
        agg.record_error("boom ", 2, ts());
        agg.record_error("boom", 3, ts());

        let errors = agg.errors();
        assert_eq!(errors.get("boom").unwrap().count, 2);
        assert_eq!(errors.get("boom ").unwrap().count, 1);
        assert_eq!(errors.get("boom ").unwrap().index, 2);
        assert!(errors.get("boom").unwrap().body.is_empty());
    }

    #[test]
    fn test_matches_check_every_substring() {
        let mut agg = Aggregator::new();
        let needles = ["timeout", "socket"];
        assert_eq!(agg.record_matches("socket timeout on read", 4, &needles), 2);
        assert_eq!(agg.record_matches("socket closed", 7, &needles), 1);
        assert_eq!(agg.record_matches("all good", 8, &needles), 0);

        let tally = agg.matches().get("socket timeout on read").unwrap();
        assert_eq!(tally.line_numbers, vec![4, 4]);
        assert_eq!(tally.substrings, vec!["timeout", "socket"]);
        assert_eq!(tally.count(), 2);

        assert_eq!(agg.substring_totals().get("socket"), Some(&2));
        assert_eq!(agg.substring_totals().get("timeout"), Some(&1));
        assert!(agg.matches().get("all good").is_none());
    }

    #[test]
    fn test_empty_substring_list_records_nothing() {
        let mut agg = Aggregator::new();
        let none: [&str; 0] = [];
        assert_eq!(agg.record_matches("anything", 1, &none), 0);
        assert!(agg.is_empty());
    }
}
