//! Grader CLI - runs grading service scripts against a DS server
//!
//! This library provides the pieces behind the `grader` binary: the
//! grading service client, report scraping, server state reset and the
//! sequential script runner.

pub mod cli;
pub mod client;
pub mod commands;
pub mod common;
pub mod extract;
pub mod pacing;
pub mod runner;
pub mod sequence;
pub mod state;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use runner::{RunSummary, TestRunner};
pub use sequence::{ScriptId, Sequence};
