// BugSleuth - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// Individual log lines never produce errors: a line that cannot be
// classified is simply Unmatched. Only the run-level failures below abort.

use crate::util::constants;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all BugSleuth operations.
#[derive(Debug)]
pub enum BugSleuthError {
    /// A required positional argument was not supplied.
    NoArgumentsProvided { missing: &'static str },

    /// The target pid is empty or contains non-digit characters.
    InvalidPid { value: String },

    /// The input bugreport does not exist.
    InputFileMissing { path: PathBuf },

    /// The input bugreport exists but could not be read
    /// (permission denied, is a directory, I/O failure).
    InputFileUnreadable { path: PathBuf, source: io::Error },
}

impl BugSleuthError {
    /// Process exit code for this error, distinct per failure class.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoArgumentsProvided { .. } | Self::InvalidPid { .. } => constants::EXIT_USAGE,
            Self::InputFileMissing { .. } => constants::EXIT_INPUT_MISSING,
            Self::InputFileUnreadable { .. } => constants::EXIT_INPUT_UNREADABLE,
        }
    }
}

impl fmt::Display for BugSleuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoArgumentsProvided { missing } => {
                write!(f, "Missing required argument <{missing}>. Please provide a bugreport file and a pid.")
            }
            Self::InvalidPid { value } => {
                write!(f, "Invalid pid '{value}': expected a non-empty string of digits")
            }
            Self::InputFileMissing { path } => {
                write!(f, "Input file '{}' does not exist", path.display())
            }
            Self::InputFileUnreadable { path, source } => {
                write!(f, "Input file '{}' could not be read: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for BugSleuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InputFileUnreadable { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for BugSleuth results.
pub type Result<T> = std::result::Result<T, BugSleuthError>;
