//! Error types for the grader CLI
//!
//! Everything in here is fatal: it aborts the run and is reported by `main`.
//! Recoverable conditions (a state directory that could not be removed) are
//! carried in [`crate::state::ResetReport`] instead.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the grader CLI
#[derive(Error, Debug)]
pub enum Error {
    // === State Errors ===
    #[error("Failed to create state directory '{}': {source}", .path.display())]
    StateCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    // === Grading Service Errors ===
    #[error("Request for script {script} failed: {source}")]
    Request {
        script: u16,
        #[source]
        source: reqwest::Error,
    },

    #[error("Grading service returned status {status} for script {script}")]
    HttpStatus { script: u16, status: u16 },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    // === Sequence Errors ===
    #[error("Unknown sequence '{name}'. Known sequences: {known}")]
    UnknownSequence { name: String, known: String },

    #[error("Invalid script list '{input}': {reason}")]
    InvalidScriptList { input: String, reason: String },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid script list error
    pub fn invalid_script_list(input: &str, reason: &str) -> Self {
        Self::InvalidScriptList {
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an unknown sequence error listing the names that do exist
    pub fn unknown_sequence<S: AsRef<str>>(name: &str, known: &[S]) -> Self {
        Self::UnknownSequence {
            name: name.to_string(),
            known: known.iter().map(|s| s.as_ref()).collect::<Vec<_>>().join(", "),
        }
    }
}
