// BugSleuth - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "BugSleuth";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "BugSleuth";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Line classification
// =============================================================================

/// Tag marking runtime-crash lines emitted by the Android runtime when an
/// uncaught exception kills a process.
pub const DEFAULT_CRASH_TAG: &str = "AndroidRuntime";

/// Prefix of a stack-frame message (`at com.example.Foo.bar(Foo.java:12)`).
pub const FRAME_MARKER: &str = "at ";

/// Log level letters counted as errors when none are configured.
pub const DEFAULT_ERROR_LEVELS: &[char] = &['E'];

/// Maximum length of a crash tag accepted from config or the CLI.
pub const MAX_CRASH_TAG_LENGTH: usize = 128;

// =============================================================================
// Trace limits
// =============================================================================

/// Default cap on frames kept per stack trace. Frames past the cap are
/// counted and dropped; the trace itself stays open.
pub const DEFAULT_MAX_TRACE_FRAMES: usize = 512;

/// Minimum user-configurable frame cap.
pub const MIN_MAX_TRACE_FRAMES: usize = 1;

/// Hard upper bound on the frame cap.
pub const ABSOLUTE_MAX_TRACE_FRAMES: usize = 100_000;

// =============================================================================
// Exit codes
// =============================================================================

/// Missing positional arguments or an invalid pid.
pub const EXIT_USAGE: i32 = 2;

/// The input file does not exist.
pub const EXIT_INPUT_MISSING: i32 = 3;

/// The input file exists but could not be read.
pub const EXIT_INPUT_UNREADABLE: i32 = 4;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Maximum length of a log line included in debug output.
/// Prevents accidental exposure of sensitive data in long lines.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
