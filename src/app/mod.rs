// BugSleuth - app/mod.rs
//
// Application layer: argument/config merging and file-level orchestration.
// Dependencies: core, platform, util.

pub mod analyse;
