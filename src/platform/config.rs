// BugSleuth - platform/config.rs
//
// Platform config directory resolution and config.toml loading with
// startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for BugSleuth configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/bugsleuth/ or %APPDATA%\BugSleuth\config\)
    pub config_dir: PathBuf,

    /// Full path of the default config file inside `config_dir`.
    pub config_file: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        let config_dir = if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %dir.display(), "Platform paths resolved");
            dir
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            PathBuf::from(".")
        };

        Self {
            config_file: config_dir.join(constants::CONFIG_FILE_NAME),
            config_dir,
        }
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[analysis]` section.
    pub analysis: AnalysisSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[analysis]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct AnalysisSection {
    /// Tag marking runtime-crash lines.
    pub crash_tag: Option<String>,
    /// Level letters counted as errors, e.g. `["E", "W"]`.
    pub error_levels: Option<Vec<String>>,
    /// Search substrings applied on every run.
    pub search_strings: Option<Vec<String>>,
    /// Frames kept per stack trace.
    pub max_trace_frames: Option<usize>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    // -- Analysis --
    /// Tag marking runtime-crash lines.
    pub crash_tag: String,
    /// Level letters counted as errors.
    pub error_levels: Vec<char>,
    /// Search substrings applied on every run (CLI strings are appended).
    pub search_strings: Vec<String>,
    /// Frames kept per stack trace.
    pub max_trace_frames: usize,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            crash_tag: constants::DEFAULT_CRASH_TAG.to_string(),
            error_levels: constants::DEFAULT_ERROR_LEVELS.to_vec(),
            search_strings: Vec::new(),
            max_trace_frames: constants::DEFAULT_MAX_TRACE_FRAMES,
            log_level: None,
        }
    }
}

/// Parse a level letter such as `"E"`. Only a single ASCII upper-case
/// letter is accepted.
pub fn parse_level_letter(raw: &str) -> Option<char> {
    let mut chars = raw.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_uppercase() => Some(c),
        _ => None,
    }
}

/// Check a crash tag: non-empty, no colon (the tag separator), bounded.
pub fn is_valid_crash_tag(tag: &str) -> bool {
    !tag.trim().is_empty() && !tag.contains(':') && tag.len() <= constants::MAX_CRASH_TAG_LENGTH
}

/// Load and validate the config file at `config_path`.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings (first-run).
/// If the file is unreadable or unparseable, returns defaults with a warning;
/// the analysis still runs but the user is informed.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config file found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(e) => {
            warnings.push(format!(
                "Could not read config file '{}': {e}. Using defaults.",
                config_path.display()
            ));
            return (AppConfig::default(), warnings);
        }
    };

    let (config, mut parse_warnings) = parse_config(&content);
    if parse_warnings.is_empty() {
        tracing::info!(path = %config_path.display(), "Loaded config file");
    } else {
        for w in &mut parse_warnings {
            *w = format!("{}: {w}", config_path.display());
        }
    }
    warnings.extend(parse_warnings);
    (config, warnings)
}

/// Parse and validate config text. Split from `load_config` so validation
/// can be tested without touching the filesystem.
pub fn parse_config(content: &str) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    let raw: RawConfig = match toml::from_str(content) {
        Ok(r) => r,
        Err(e) => {
            warnings.push(format!("Failed to parse config: {e}. Using defaults."));
            return (AppConfig::default(), warnings);
        }
    };

    // Validate each field against named constants, accumulating all warnings.
    let mut config = AppConfig::default();

    // -- Analysis: crash_tag --
    if let Some(tag) = raw.analysis.crash_tag {
        if is_valid_crash_tag(&tag) {
            config.crash_tag = tag.trim().to_string();
        } else {
            warnings.push(format!(
                "[analysis] crash_tag = \"{tag}\" must be non-empty, contain no ':' and be at most {} characters. Using default ({}).",
                constants::MAX_CRASH_TAG_LENGTH,
                constants::DEFAULT_CRASH_TAG,
            ));
        }
    }

    // -- Analysis: error_levels --
    if let Some(levels) = raw.analysis.error_levels {
        let mut parsed = Vec::new();
        for raw_level in &levels {
            match parse_level_letter(raw_level) {
                Some(c) if !parsed.contains(&c) => parsed.push(c),
                Some(_) => {}
                None => warnings.push(format!(
                    "[analysis] error_levels entry \"{raw_level}\" is not a single upper-case level letter. Ignored.",
                )),
            }
        }
        if parsed.is_empty() {
            warnings.push(
                "[analysis] error_levels has no valid entries. Using default ([\"E\"]).".to_string(),
            );
        } else {
            config.error_levels = parsed;
        }
    }

    // -- Analysis: search_strings --
    if let Some(strings) = raw.analysis.search_strings {
        config.search_strings = strings;
    }

    // -- Analysis: max_trace_frames --
    if let Some(frames) = raw.analysis.max_trace_frames {
        if (constants::MIN_MAX_TRACE_FRAMES..=constants::ABSOLUTE_MAX_TRACE_FRAMES).contains(&frames) {
            config.max_trace_frames = frames;
        } else {
            warnings.push(format!(
                "[analysis] max_trace_frames = {frames} is out of range ({}-{}). Using default ({}).",
                constants::MIN_MAX_TRACE_FRAMES,
                constants::ABSOLUTE_MAX_TRACE_FRAMES,
                constants::DEFAULT_MAX_TRACE_FRAMES,
            ));
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    (config, warnings)
}
