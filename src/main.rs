// BugSleuth - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Config loading (platform config.toml or --config)
// 3. Logging initialisation (debug mode support)
// 4. Analysis and report printing, with a distinct exit code per failure

use bugsleuth::app::analyse::{self, AnalysisRequest};
use bugsleuth::core::report::Report;
use bugsleuth::platform;
use bugsleuth::util;
use clap::Parser;
use std::path::PathBuf;

/// BugSleuth - Android bugreport analyser.
///
/// Reconstructs fatal-exception stack traces, counts error messages, and
/// tallies search-string hits for one process in a bugreport text file.
#[derive(Parser, Debug)]
#[command(name = "bugsleuth", version, about)]
struct Cli {
    /// Bugreport text file to analyse.
    file: Option<PathBuf>,

    /// Process id whose log lines are analysed.
    pid: Option<String>,

    /// Substrings to search for in the process's log messages.
    search: Vec<String>,

    /// Additional search substring (repeatable).
    #[arg(short = 's', long = "search", value_name = "TEXT")]
    extra_search: Vec<String>,

    /// Log level letter counted as an error (repeatable, default E).
    #[arg(short = 'l', long = "level", value_name = "LETTER", value_parser = parse_level)]
    levels: Vec<char>,

    /// Tag marking runtime-crash lines (default AndroidRuntime).
    #[arg(long = "crash-tag", value_name = "TAG")]
    crash_tag: Option<String>,

    /// Config file to use instead of the platform default.
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn parse_level(raw: &str) -> Result<char, String> {
    platform::config::parse_level_letter(raw)
        .ok_or_else(|| format!("'{raw}' is not a single upper-case level letter (e.g. E, W)"))
}

fn main() {
    let cli = Cli::parse();

    // Config is loaded before logging so its [logging] level can apply;
    // its warnings are emitted once the subscriber exists.
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| platform::config::PlatformPaths::resolve().config_file);
    let (app_config, config_warnings) = platform::config::load_config(&config_path);

    util::logging::init(cli.debug, app_config.log_level.as_deref());

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "BugSleuth starting"
    );
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    let request = AnalysisRequest {
        input: cli.file,
        pid: cli.pid,
        search_strings: cli.search.into_iter().chain(cli.extra_search).collect(),
        error_levels: cli.levels,
        crash_tag: cli.crash_tag,
    };

    let aggregator = match analyse::run(request, &app_config) {
        Ok(aggregator) => aggregator,
        Err(e) => {
            tracing::error!(error = %e, "Analysis failed");
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    };

    let report = Report::from_aggregator(&aggregator);
    let stdout = std::io::stdout();
    if let Err(e) = report.render(stdout.lock()) {
        // Broken pipe (e.g. `| head`) still exits 0.
        if e.kind() != std::io::ErrorKind::BrokenPipe {
            tracing::error!(error = %e, "Failed to write report");
            eprintln!("Error: failed to write report: {e}");
            std::process::exit(1);
        }
    }
}
