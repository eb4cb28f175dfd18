//! Scraping of grading service reports
//!
//! The service answers with an HTML page whose lines are separated by
//! literal `<br>` tags. Each step of a script shows up as a line containing
//! `COMMAND`, and the line right after it holds the server's reply. Only
//! those pairs are worth showing.

use serde::Serialize;
use std::fmt;

use crate::common::{Error, Result};

/// Marker of a script step in the report
pub const COMMAND_MARKER: &str = "COMMAND";

/// Line separator used by the report
const LINE_BREAK: &str = "<br>";

/// Escaped newline the service leaves in its HTML (a backslash then `n`)
const ESCAPED_NEWLINE: &str = "\\n";

/// A `COMMAND` line together with the line that follows it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandLine {
    pub command: String,
    pub following: String,
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.command, self.following)
    }
}

/// Extract every `COMMAND` line and its successor from a report body
///
/// A `COMMAND` on the very last line has no successor; that is reported
/// as [`Error::MalformedResponse`].
pub fn extract_commands(body: &str) -> Result<Vec<CommandLine>> {
    let cleaned = body.replace(ESCAPED_NEWLINE, "");
    let lines: Vec<&str> = cleaned.split(LINE_BREAK).collect();

    let mut commands = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if !line.contains(COMMAND_MARKER) {
            continue;
        }
        let following = lines.get(i + 1).ok_or_else(|| {
            Error::MalformedResponse(format!(
                "'{}' is the last line of the report, expected its result after it",
                line.trim()
            ))
        })?;
        commands.push(CommandLine {
            command: line.to_string(),
            following: following.to_string(),
        });
    }

    Ok(commands)
}
