// BugSleuth - core/pipeline.rs
//
// Single-pass driver: classify each line, feed the trace accumulator, and
// record into a fresh Aggregator. Strictly sequential, because a frame only
// belongs to the header directly above it.

use crate::core::accumulator::TraceAccumulator;
use crate::core::aggregator::Aggregator;
use crate::core::model::{LogLevel, LogLine, ParsedLine};
use crate::core::parser::{is_valid_pid, LineClassifier};
use crate::util::constants;
use crate::util::error::BugSleuthError;
use crate::util::logging::preview;

/// Inputs for one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Process whose lines are analysed.
    pub target_pid: String,
    /// Substrings searched for in the target's leveled messages.
    pub search_strings: Vec<String>,
    /// Tag marking runtime-crash lines.
    pub crash_tag: String,
    /// Levels counted in the error table.
    pub error_levels: Vec<LogLevel>,
    /// Frames kept per stack trace.
    pub max_trace_frames: usize,
}

impl AnalysisConfig {
    /// Build a config with defaults for everything but the pid and search
    /// strings.
    ///
    /// The pid must be a non-empty string of digits. Search strings are
    /// normalised: empty strings are dropped (they would match every line)
    /// and duplicates are removed keeping the first occurrence.
    pub fn new<I, S>(target_pid: &str, search_strings: I) -> Result<Self, BugSleuthError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !is_valid_pid(target_pid) {
            return Err(BugSleuthError::InvalidPid {
                value: target_pid.to_string(),
            });
        }

        let mut normalised: Vec<String> = Vec::new();
        for s in search_strings {
            let s = s.into();
            if s.is_empty() {
                tracing::warn!("Ignoring empty search string");
                continue;
            }
            if !normalised.contains(&s) {
                normalised.push(s);
            }
        }

        Ok(Self {
            target_pid: target_pid.to_string(),
            search_strings: normalised,
            crash_tag: constants::DEFAULT_CRASH_TAG.to_string(),
            error_levels: default_error_levels(),
            max_trace_frames: constants::DEFAULT_MAX_TRACE_FRAMES,
        })
    }

    fn is_error_level(&self, level: LogLevel) -> bool {
        self.error_levels.contains(&level)
    }
}

/// Error levels used when none are configured.
pub fn default_error_levels() -> Vec<LogLevel> {
    constants::DEFAULT_ERROR_LEVELS
        .iter()
        .filter_map(|&c| LogLevel::from_letter(c))
        .collect()
}

/// Analyse a whole file's content. Line numbers start at 1; `\r\n` endings
/// are handled by `str::lines`.
pub fn analyse_content(content: &str, config: &AnalysisConfig) -> Aggregator {
    analyse_lines(content.lines(), config)
}

/// Analyse an ordered sequence of lines.
pub fn analyse_lines<'a, I>(lines: I, config: &AnalysisConfig) -> Aggregator
where
    I: IntoIterator<Item = &'a str>,
{
    let classifier = LineClassifier::new(config.crash_tag.as_str());
    let mut accumulator = TraceAccumulator::new(config.max_trace_frames);
    let mut aggregator = Aggregator::new();

    tracing::debug!(
        pid = %config.target_pid,
        crash_tag = %config.crash_tag,
        search_strings = config.search_strings.len(),
        "Analysis started"
    );

    for (idx, text) in lines.into_iter().enumerate() {
        let line = LogLine {
            text,
            number: (idx as u64) + 1,
        };
        aggregator.stats.lines_processed += 1;

        match classifier.classify(line.text, &config.target_pid) {
            ParsedLine::StackHeader {
                timestamp, message, ..
            } => {
                aggregator.stats.target_lines += 1;
                if let Some(record) = accumulator.start(message, line.number, timestamp) {
                    flush(&mut aggregator, &record);
                }
            }
            ParsedLine::StackContinuation { frame, .. } => {
                aggregator.stats.target_lines += 1;
                if !accumulator.push_frame(frame) {
                    aggregator.stats.orphan_frames += 1;
                    tracing::trace!(line = line.number, "Frame outside any trace ignored");
                }
            }
            other => {
                if let Some(record) = accumulator.close() {
                    flush(&mut aggregator, &record);
                }
                match other {
                    ParsedLine::LeveledEntry {
                        pid,
                        timestamp,
                        level,
                        message,
                        ..
                    } if pid == config.target_pid => {
                        aggregator.stats.target_lines += 1;
                        if config.is_error_level(level) {
                            aggregator.record_error(message, line.number, timestamp);
                        }
                        aggregator.record_matches(message, line.number, &config.search_strings);
                    }
                    ParsedLine::Unmatched => {
                        aggregator.stats.unmatched_lines += 1;
                        tracing::trace!(
                            line = line.number,
                            text = preview(line.text),
                            "Unmatched line"
                        );
                    }
                    _ => {}
                }
            }
        }
    }

    aggregator.stats.frames_dropped = accumulator.frames_dropped();
    if let Some(record) = accumulator.finish() {
        flush(&mut aggregator, &record);
    }

    tracing::debug!(
        lines = aggregator.stats.lines_processed,
        target_lines = aggregator.stats.target_lines,
        fatal_exceptions = aggregator.fatal_exceptions().len(),
        errors = aggregator.errors().len(),
        matches = aggregator.matches().len(),
        "Analysis complete"
    );

    aggregator
}

fn flush(aggregator: &mut Aggregator, record: &crate::core::model::TraceRecord) {
    tracing::debug!(
        line = record.line_number,
        frames = record.len() - 1,
        signature = preview(record.signature()),
        "Trace closed"
    );
    aggregator.record_trace(record);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(search: &[&str]) -> AnalysisConfig {
        AnalysisConfig::new("1234", search.iter().copied()).unwrap()
    }

    const HEADER: &str = "01-01 00:00:00.000  1234  1234 E AndroidRuntime: java.lang.Exception: X";
    const FRAME_FOO: &str = "01-01 00:00:00.001  1234  1234 E AndroidRuntime: \tat foo()";
    const FRAME_BAR: &str = "01-01 00:00:00.002  1234  1234 E AndroidRuntime: \tat bar()";
    const UNRELATED: &str = "01-01 00:00:01.000  1234  1250 I MyTag: unrelated";

    #[test]
    fn test_single_error_line() {
        let agg = analyse_lines(["01-01 00:00:00.000  1234  0001 E MyTag: boom"], &config(&[]));
        let errors = agg.errors();
        assert_eq!(errors.len(), 1);
        let entry = errors.get("boom").unwrap();
        assert_eq!(entry.count, 1);
        assert_eq!(entry.index, 1);
        assert!(agg.fatal_exceptions().is_empty());
    }

    #[test]
    fn test_trace_reconstruction() {
        let agg = analyse_lines([HEADER, FRAME_FOO, FRAME_BAR, UNRELATED], &config(&[]));
        let traces = agg.fatal_exceptions();
        assert_eq!(traces.len(), 1);
        let entry = traces.get("java.lang.Exception: X").unwrap();
        assert_eq!(entry.count, 1);
        assert_eq!(entry.body, "foo()\nbar()");
        assert_eq!(entry.first_line, 1);
        // Crash lines are never double-counted as plain errors.
        assert!(agg.errors().is_empty());
    }

    #[test]
    fn test_trailing_trace_is_flushed() {
        let agg = analyse_lines([UNRELATED, HEADER, FRAME_FOO], &config(&[]));
        let entry = agg.fatal_exceptions().get("java.lang.Exception: X").unwrap();
        assert_eq!(entry.body, "foo()");
        assert_eq!(entry.first_line, 2);
    }

    #[test]
    fn test_foreign_pid_frame_closes_trace_and_is_excluded() {
        let foreign = "01-01 00:00:00.001  9999  9999 E AndroidRuntime: \tat evil()";
        let agg = analyse_lines([HEADER, foreign, FRAME_BAR], &config(&[]));
        let entry = agg.fatal_exceptions().get("java.lang.Exception: X").unwrap();
        assert_eq!(entry.body, "");
        assert!(!entry.body.contains("evil"));
        // bar() arrived after the trace closed.
        assert_eq!(agg.stats().orphan_frames, 1);
        // The foreign crash line must not reach the error table either.
        assert!(agg.errors().is_empty());
    }

    #[test]
    fn test_non_adjacent_duplicate_headers_share_an_index() {
        let other = "01-01 00:00:02.000  1234  1234 E AndroidRuntime: java.lang.Error: Y";
        let agg = analyse_lines(
            [HEADER, FRAME_FOO, UNRELATED, other, UNRELATED, HEADER, FRAME_BAR],
            &config(&[]),
        );
        let traces = agg.fatal_exceptions();
        assert_eq!(traces.len(), 2);
        let x = traces.get("java.lang.Exception: X").unwrap();
        assert_eq!((x.index, x.count), (1, 2));
        assert_eq!(x.body, "foo()");
        let y = traces.get("java.lang.Error: Y").unwrap();
        assert_eq!((y.index, y.count), (2, 1));
    }

    #[test]
    fn test_back_to_back_headers_start_fresh_records() {
        let banner = "01-01 00:00:00.000  1234  1234 E AndroidRuntime: FATAL EXCEPTION: main";
        let agg = analyse_lines([banner, HEADER, FRAME_FOO], &config(&[]));
        let order: Vec<_> = agg.fatal_exceptions().iter().map(|(k, _)| k).collect();
        assert_eq!(order, vec!["FATAL EXCEPTION: main", "java.lang.Exception: X"]);
        assert_eq!(agg.fatal_exceptions().get("FATAL EXCEPTION: main").unwrap().body, "");
    }

    #[test]
    fn test_substring_matches_only_for_target_pid() {
        let lines = [
            "01-01 00:00:00.000  1234  1234 W Net: socket timeout",
            "01-01 00:00:00.000  5678  5678 W Net: socket timeout",
            "01-01 00:00:00.000  1234  1234 I Net: socket timeout",
        ];
        let agg = analyse_lines(lines, &config(&["socket", "timeout"]));
        let tally = agg.matches().get("socket timeout").unwrap();
        assert_eq!(tally.line_numbers, vec![1, 1, 3, 3]);
        assert_eq!(tally.substrings, vec!["socket", "timeout"]);
        // W and I are not error levels by default.
        assert!(agg.errors().is_empty());
    }

    #[test]
    fn test_configured_error_levels() {
        let mut cfg = config(&[]);
        cfg.error_levels = vec![LogLevel::Error, LogLevel::Warn];
        let agg = analyse_lines(
            [
                "01-01 00:00:00.000  1234  1234 W Net: retrying",
                "01-01 00:00:00.000  1234  1234 E Net: failed",
                "01-01 00:00:00.000  1234  1234 I Net: ok",
            ],
            &cfg,
        );
        let order: Vec<_> = agg.errors().iter().map(|(k, _)| k).collect();
        assert_eq!(order, vec!["retrying", "failed"]);
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let content = [HEADER, FRAME_FOO, UNRELATED, HEADER, FRAME_BAR].join("\n");
        let cfg = config(&["unrelated"]);
        assert_eq!(analyse_content(&content, &cfg), analyse_content(&content, &cfg));
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let content = format!("{HEADER}\r\n{FRAME_FOO}\r\n\r\n{FRAME_BAR}\r\n");
        let agg = analyse_content(&content, &config(&[]));
        assert_eq!(
            agg.fatal_exceptions().get("java.lang.Exception: X").unwrap().body,
            "foo()"
        );
        assert_eq!(agg.stats().unmatched_lines, 1);
        assert_eq!(agg.stats().orphan_frames, 1);
        assert_eq!(agg.stats().lines_processed, 4);
    }

    #[test]
    fn test_empty_input() {
        let agg = analyse_content("", &config(&["x"]));
        assert!(agg.is_empty());
        assert_eq!(agg.stats().lines_processed, 0);
    }

    #[test]
    fn test_config_rejects_bad_pid_and_normalises_search() {
        assert!(matches!(
            AnalysisConfig::new("12x", Vec::<String>::new()),
            Err(BugSleuthError::InvalidPid { .. })
        ));
        assert!(AnalysisConfig::new("", Vec::<String>::new()).is_err());

        let cfg = AnalysisConfig::new("1", ["a", "", "b", "a"]).unwrap();
        assert_eq!(cfg.search_strings, vec!["a", "b"]);
        assert_eq!(cfg.error_levels, vec![LogLevel::Error]);
    }
}
