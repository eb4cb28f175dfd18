//! Script runner
//!
//! Resets the server state once, then walks the selected sequences one
//! script at a time: ask the grading service to run the script, print the
//! `COMMAND` lines of its report, optionally reset the state again, and
//! pause before the next script. The first fatal error ends the run.

use colored::Colorize;
use serde::Serialize;

use crate::client::{GraderClient, ScriptRequest};
use crate::common::config::RunConfig;
use crate::common::Result;
use crate::extract::{extract_commands, CommandLine};
use crate::pacing::Pacer;
use crate::sequence::{ScriptId, Sequence};
use crate::state::{ResetReport, StateResetter};

/// Result of one script
#[derive(Debug, Clone, Serialize)]
pub struct ScriptOutcome {
    pub sequence: String,
    pub script: ScriptId,
    pub commands: Vec<CommandLine>,
    /// Present when the state was reset after this script
    pub reset: Option<ResetReport>,
}

/// Result of a whole run, scripts in the order they ran
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub initial_reset: ResetReport,
    pub scripts: Vec<ScriptOutcome>,
}

impl RunSummary {
    pub fn command_count(&self) -> usize {
        self.scripts.iter().map(|s| s.commands.len()).sum()
    }

    /// Removal failures over the whole run
    pub fn reset_failures(&self) -> usize {
        self.initial_reset.failures.len()
            + self
                .scripts
                .iter()
                .filter_map(|s| s.reset.as_ref())
                .map(|r| r.failures.len())
                .sum::<usize>()
    }
}

pub struct TestRunner<C, P> {
    config: RunConfig,
    client: C,
    pacer: P,
    resetter: StateResetter,
    quiet: bool,
}

impl<C: GraderClient, P: Pacer> TestRunner<C, P> {
    pub fn new(config: RunConfig, client: C, pacer: P) -> Self {
        let resetter = StateResetter::new(config.state_dirs.clone());
        Self {
            config,
            client,
            pacer,
            resetter,
            quiet: false,
        }
    }

    /// Suppress the human-readable report on stdout
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Reset once, then run every sequence in order
    pub async fn run(&self, sequences: &[Sequence]) -> Result<RunSummary> {
        if !self.quiet {
            println!(
                "Running tests with IP: {}, Port: {}, reset state: {}",
                self.config.ip, self.config.port, self.config.reset_after_each
            );
        }

        let initial_reset = self.reset()?;
        let mut scripts = Vec::new();

        for sequence in sequences {
            tracing::info!(
                sequence = %sequence.name,
                scripts = sequence.scripts.len(),
                "starting sequence"
            );
            if !self.quiet {
                println!(
                    "\n{} {} ({} scripts)",
                    "Sequence:".blue().bold(),
                    sequence.name.white().bold(),
                    sequence.scripts.len()
                );
            }

            for &script in &sequence.scripts {
                let outcome = self.run_script(&sequence.name, script).await?;
                scripts.push(outcome);
            }
        }

        Ok(RunSummary {
            initial_reset,
            scripts,
        })
    }

    /// Reset the state directories and report removal failures on stdout
    fn reset(&self) -> Result<ResetReport> {
        let report = self.resetter.reset()?;
        if !self.quiet {
            for failure in &report.failures {
                println!("{} {}", "Error:".yellow(), failure);
            }
        }
        Ok(report)
    }

    /// Run a single script, then reset if configured and pause
    async fn run_script(&self, sequence: &str, script: ScriptId) -> Result<ScriptOutcome> {
        let request = ScriptRequest {
            ip: self.config.ip.clone(),
            port: self.config.port,
            script,
        };

        let body = self.client.run_script(&request).await?;

        if !self.quiet {
            println!("{}", format!("=== SCRIPT {} ===", script).cyan());
        }

        let commands = extract_commands(&body)?;
        if !self.quiet {
            for command in &commands {
                println!(" {}", command);
            }
        }
        tracing::debug!(%script, commands = commands.len(), "script finished");

        let reset = if self.config.reset_after_each {
            Some(self.reset()?)
        } else {
            None
        };

        self.pacer.pause(self.config.delay).await;

        Ok(ScriptOutcome {
            sequence: sequence.to_string(),
            script,
            commands,
            reset,
        })
    }
}
