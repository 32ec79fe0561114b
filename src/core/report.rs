// BugSleuth - core/report.rs
//
// Ordered summary rows derived from an Aggregator, and their flat-text
// rendering. Core layer: writes to any Write trait object.
//
// Numbering always comes from first-seen order in the aggregate tables,
// never from counts.

use crate::core::aggregator::Aggregator;
use crate::core::model::AggregateEntry;
use crate::core::table::OrderedTable;
use std::io::{self, Write};

/// `(index, text, count)` row of the fatal-exception and error summaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub index: usize,
    pub text: String,
    pub count: usize,
}

/// One reconstructed stack trace with a non-empty body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceDetail {
    pub index: usize,
    pub signature: String,
    pub body: String,
}

/// `(rank, message, match_count)` row of the matching-strings summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRow {
    pub rank: usize,
    pub message: String,
    pub match_count: usize,
}

fn summarise(table: &OrderedTable<AggregateEntry>) -> Vec<SummaryRow> {
    table
        .iter()
        .map(|(text, entry)| SummaryRow {
            index: entry.index,
            text: text.to_string(),
            count: entry.count,
        })
        .collect()
}

/// Fatal exceptions in first-seen order.
pub fn fatal_exception_summary(aggregator: &Aggregator) -> Vec<SummaryRow> {
    summarise(aggregator.fatal_exceptions())
}

/// Stack traces with at least one frame, in first-seen order.
pub fn stack_trace_details(aggregator: &Aggregator) -> Vec<TraceDetail> {
    aggregator
        .fatal_exceptions()
        .iter()
        .filter(|(_, entry)| !entry.body.is_empty())
        .map(|(signature, entry)| TraceDetail {
            index: entry.index,
            signature: signature.to_string(),
            body: entry.body.clone(),
        })
        .collect()
}

/// Error messages in first-seen order. Same shape as the fatal-exception
/// summary.
pub fn error_summary(aggregator: &Aggregator) -> Vec<SummaryRow> {
    summarise(aggregator.errors())
}

/// Messages that matched a search substring, ranked by first match.
pub fn matching_strings_summary(aggregator: &Aggregator) -> Vec<MatchRow> {
    aggregator
        .matches()
        .iter()
        .enumerate()
        .map(|(i, (message, tally))| MatchRow {
            rank: i + 1,
            message: message.to_string(),
            match_count: tally.count(),
        })
        .collect()
}

/// All four summaries for one run, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub fatal_exceptions: Vec<SummaryRow>,
    pub stack_traces: Vec<TraceDetail>,
    pub errors: Vec<SummaryRow>,
    pub matching_strings: Vec<MatchRow>,
}

impl Report {
    pub fn from_aggregator(aggregator: &Aggregator) -> Self {
        Self {
            fatal_exceptions: fatal_exception_summary(aggregator),
            stack_traces: stack_trace_details(aggregator),
            errors: error_summary(aggregator),
            matching_strings: matching_strings_summary(aggregator),
        }
    }

    /// Write the report as plain text sections:
    ///
    /// ```text
    /// == Fatal exceptions ==
    /// 1|java.lang.IllegalStateException: boom|2
    /// == Stack traces ==
    /// [1] java.lang.IllegalStateException: boom
    ///     com.example.Foo.run(Foo.java:42)
    /// == Errors ==
    /// (none)
    /// == Matching strings ==
    /// 1|socket timeout|3
    /// ```
    pub fn render<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "== Fatal exceptions ==")?;
        write_rows(&mut out, &self.fatal_exceptions)?;

        writeln!(out, "== Stack traces ==")?;
        if self.stack_traces.is_empty() {
            writeln!(out, "(none)")?;
        }
        for detail in &self.stack_traces {
            writeln!(out, "[{}] {}", detail.index, detail.signature)?;
            for frame in detail.body.lines() {
                writeln!(out, "    {frame}")?;
            }
        }

        writeln!(out, "== Errors ==")?;
        write_rows(&mut out, &self.errors)?;

        writeln!(out, "== Matching strings ==")?;
        if self.matching_strings.is_empty() {
            writeln!(out, "(none)")?;
        }
        for row in &self.matching_strings {
            writeln!(out, "{}|{}|{}", row.rank, row.message, row.match_count)?;
        }

        out.flush()
    }
}

fn write_rows<W: Write>(out: &mut W, rows: &[SummaryRow]) -> io::Result<()> {
    if rows.is_empty() {
        writeln!(out, "(none)")?;
    }
    for row in rows {
        writeln!(out, "{}|{}|{}", row.index, row.text, row.count)?;
    }
    Ok(())
}
