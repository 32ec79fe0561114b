// BugSleuth - app/analyse.rs
//
// Analysis orchestration: merges CLI arguments with config.toml, reads the
// bugreport from disk, and runs the core pipeline.
//
// Only run-level failures surface as errors: missing arguments, a bad pid,
// and a missing or unreadable input file. Everything inside the file is
// best-effort.

use crate::core::aggregator::Aggregator;
use crate::core::model::LogLevel;
use crate::core::pipeline::{self, AnalysisConfig};
use crate::platform::config::{is_valid_crash_tag, AppConfig};
use crate::platform::fs;
use crate::util::error::{BugSleuthError, Result};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// What the caller asked for, before defaults are applied.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    /// Bugreport file.
    pub input: Option<PathBuf>,
    /// Target pid.
    pub pid: Option<String>,
    /// Extra search substrings, appended after the configured ones.
    pub search_strings: Vec<String>,
    /// Error level letters. Empty means "use config".
    pub error_levels: Vec<char>,
    /// Crash tag override.
    pub crash_tag: Option<String>,
}

impl AnalysisRequest {
    /// Validate the request and merge it over `app_config`.
    pub fn resolve(self, app_config: &AppConfig) -> Result<(PathBuf, AnalysisConfig)> {
        let input = self
            .input
            .ok_or(BugSleuthError::NoArgumentsProvided { missing: "FILE" })?;
        let pid = self
            .pid
            .ok_or(BugSleuthError::NoArgumentsProvided { missing: "PID" })?;

        let search = app_config
            .search_strings
            .iter()
            .cloned()
            .chain(self.search_strings);
        let mut config = AnalysisConfig::new(pid.trim(), search)?;

        config.crash_tag = match self.crash_tag {
            Some(tag) if is_valid_crash_tag(&tag) => tag.trim().to_string(),
            Some(tag) => {
                tracing::warn!(
                    tag = %tag,
                    fallback = %app_config.crash_tag,
                    "Ignoring invalid --crash-tag"
                );
                app_config.crash_tag.clone()
            }
            None => app_config.crash_tag.clone(),
        };

        let letters = if self.error_levels.is_empty() {
            &app_config.error_levels
        } else {
            &self.error_levels
        };
        config.error_levels = letters
            .iter()
            .filter_map(|&c| LogLevel::from_letter(c))
            .collect();
        if config.error_levels.is_empty() {
            config.error_levels = pipeline::default_error_levels();
        }

        config.max_trace_frames = app_config.max_trace_frames;

        Ok((input, config))
    }
}

/// Read `path` and analyse its content.
///
/// A file that does not exist is `InputFileMissing`; any other read failure
/// (permissions, a directory, I/O error) is `InputFileUnreadable`. An empty
/// file is not an error and yields empty tables.
pub fn analyse_file(path: &Path, config: &AnalysisConfig) -> Result<Aggregator> {
    let content = fs::read_file_lossy(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            BugSleuthError::InputFileMissing {
                path: path.to_path_buf(),
            }
        } else {
            BugSleuthError::InputFileUnreadable {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    let started = Instant::now();
    let aggregator = pipeline::analyse_content(&content, config);
    let stats = aggregator.stats();

    tracing::info!(
        file = %path.display(),
        pid = %config.target_pid,
        lines = stats.lines_processed,
        target_lines = stats.target_lines,
        unmatched = stats.unmatched_lines,
        fatal_exceptions = aggregator.fatal_exceptions().len(),
        errors = aggregator.errors().len(),
        matches = aggregator.matches().len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Analysis finished"
    );
    if stats.frames_dropped > 0 {
        tracing::warn!(
            dropped = stats.frames_dropped,
            cap = config.max_trace_frames,
            "Some stack frames exceeded the per-trace cap and were dropped"
        );
    }
    if stats.target_lines == 0 && stats.lines_processed > 0 {
        tracing::warn!(pid = %config.target_pid, "No lines found for this pid");
    }

    Ok(aggregator)
}

/// Resolve the request and analyse the file it names.
pub fn run(request: AnalysisRequest, app_config: &AppConfig) -> Result<Aggregator> {
    let (input, config) = request.resolve(app_config)?;
    analyse_file(&input, &config)
}
