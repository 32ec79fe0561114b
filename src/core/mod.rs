// BugSleuth - core/mod.rs
//
// Core business logic layer.
// Dependencies: standard library, regex, chrono.
// Must NOT depend on: platform, app, or touch the filesystem directly.

pub mod accumulator;
pub mod aggregator;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod table;
