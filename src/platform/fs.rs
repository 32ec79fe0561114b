// BugSleuth - platform/fs.rs
//
// Filesystem helpers.

use std::io;
use std::path::Path;

/// Read the full content of a file as a string.
///
/// Bugreports regularly contain stray binary bytes from kernel and radio
/// logs, so invalid UTF-8 is replaced rather than treated as a read error.
pub fn read_file_lossy(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
