//! CLI command handling
//!
//! Loads configuration, wires the runner together and formats output.

use colored::Colorize;
use std::io::Read;
use std::path::Path;

use crate::client::HttpGrader;
use crate::commands::{Commands, TargetArgs};
use crate::common::config::{Config, RunOverrides};
use crate::common::{paths, Error, Result};
use crate::extract::extract_commands;
use crate::pacing::TokioPacer;
use crate::runner::{RunSummary, TestRunner};
use crate::sequence::{
    builtin_sequences, parse_script_list, Sequence, SequenceCatalog, DEFAULT_SEQUENCE,
};
use crate::state::StateResetter;

/// Dispatch a CLI command
pub async fn dispatch(command: Commands, config_path: Option<&Path>) -> Result<()> {
    match command {
        Commands::Run {
            sequences,
            scripts,
            target,
            no_reset,
            delay,
            json,
        } => {
            let config = Config::load(config_path)?;
            let overrides = overrides(target, no_reset, delay);
            let run_config = config.run_config(&overrides)?;

            let catalog = SequenceCatalog::new(config.sequences);
            let selected = select_sequences(&catalog, &sequences, scripts.as_deref())?;

            let grader = HttpGrader::new(&run_config.url, run_config.request_timeout)?;
            tracing::info!(url = grader.url(), "using grading service");
            let runner = TestRunner::new(run_config, grader, TokioPacer).quiet(json);

            let summary = runner.run(&selected).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary);
            }
            Ok(())
        }

        Commands::Reset => {
            let config = Config::load(config_path)?;
            let resetter = StateResetter::new(config.state.dirs);
            let report = resetter.reset()?;

            for failure in &report.failures {
                println!("{} {}", "Error:".yellow(), failure);
            }
            for dir in resetter.dirs() {
                println!("  {} {}", "✓".green(), dir.display());
            }
            if !report.is_clean() {
                println!(
                    "{} {} director{} could not be removed",
                    "Warning:".yellow().bold(),
                    report.failures.len(),
                    if report.failures.len() == 1 { "y" } else { "ies" }
                );
            }
            Ok(())
        }

        Commands::Extract { path } => {
            let body = read_body(&path)?;
            let commands = extract_commands(&body)?;
            if commands.is_empty() {
                println!("{}", "No COMMAND lines found".dimmed());
            }
            for command in commands {
                println!(" {}", command);
            }
            Ok(())
        }

        Commands::Sequences => {
            let config = Config::load(config_path)?;
            let catalog = SequenceCatalog::new(config.sequences);

            println!("{}", "Built-in sequences:".blue().bold());
            for builtin in builtin_sequences() {
                let mut name = builtin.name.to_string();
                if !builtin.aliases.is_empty() {
                    name = format!("{} ({})", name, builtin.aliases.join(", "));
                }
                let shadowed = if catalog.is_custom(builtin.name) {
                    " [overridden by config]".yellow().to_string()
                } else {
                    String::new()
                };
                let marker = if builtin.name == DEFAULT_SEQUENCE {
                    " [default]".green().to_string()
                } else {
                    String::new()
                };
                println!("  {:<18} {}{}{}", name, builtin.description.dimmed(), marker, shadowed);
                println!("  {:<18} {}", "", format_scripts(&builtin.sequence()).dimmed());
            }

            let custom: Vec<_> = catalog.custom().collect();
            if !custom.is_empty() {
                println!("\n{}", "Configured sequences:".blue().bold());
                for (name, scripts) in custom {
                    let list = scripts
                        .iter()
                        .map(|n| n.to_string())
                        .collect::<Vec<_>>()
                        .join(", ");
                    println!("  {:<18} {}", name, list.dimmed());
                }
            }
            Ok(())
        }

        Commands::Config => {
            let config = Config::load(config_path)?;
            let run_config = config.run_config(&RunOverrides::default())?;

            let file = config_path
                .map(|p| p.to_path_buf())
                .or_else(paths::config_path);
            match file {
                Some(file) if file.exists() => println!("Config file: {}", file.display()),
                Some(file) => println!(
                    "Config file: {} {}",
                    file.display(),
                    "(not found, using defaults)".dimmed()
                ),
                None => println!("Config file: {}", "(no config directory)".dimmed()),
            }

            println!("  IP:              {}", run_config.ip);
            println!("  Port:            {}", run_config.port);
            println!("  URL:             {}", run_config.url);
            println!("  Reset each:      {}", run_config.reset_after_each);
            println!("  Delay:           {}s", run_config.delay.as_secs());
            match run_config.request_timeout {
                Some(timeout) => println!("  Request timeout: {}s", timeout.as_secs()),
                None => println!("  Request timeout: none"),
            }
            for dir in &run_config.state_dirs {
                println!("  State dir:       {}", dir.display());
            }
            Ok(())
        }
    }
}

fn overrides(target: TargetArgs, no_reset: bool, delay: Option<u64>) -> RunOverrides {
    RunOverrides {
        ip: target.ip,
        port: target.port,
        url: target.url,
        no_reset,
        delay_secs: delay,
    }
}

/// Resolve named sequences, then the ad-hoc list; the default when neither
/// is given
fn select_sequences(
    catalog: &SequenceCatalog,
    names: &[String],
    scripts: Option<&str>,
) -> Result<Vec<Sequence>> {
    let mut selected = names
        .iter()
        .map(|name| catalog.resolve(name))
        .collect::<Result<Vec<_>>>()?;

    if let Some(list) = scripts {
        selected.push(parse_script_list(list)?);
    }

    if selected.is_empty() {
        selected.push(catalog.resolve(DEFAULT_SEQUENCE)?);
    }

    Ok(selected)
}

fn read_body(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut body = String::new();
        std::io::stdin().read_to_string(&mut body)?;
        return Ok(body);
    }
    std::fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.display().to_string(),
        error: e.to_string(),
    })
}

fn format_scripts(sequence: &Sequence) -> String {
    sequence
        .scripts
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_summary(summary: &RunSummary) {
    println!(
        "\n\n{} {} scripts run, {} COMMAND lines",
        "✓".green().bold(),
        summary.scripts.len(),
        summary.command_count()
    );
    let failures = summary.reset_failures();
    if failures > 0 {
        println!(
            "{} {} state directory removals failed during the run",
            "Warning:".yellow().bold(),
            failures
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn numbers(seq: &Sequence) -> Vec<u16> {
        seq.scripts.iter().map(|s| s.get()).collect()
    }

    #[test]
    fn test_select_defaults_to_post() {
        let selected = select_sequences(&SequenceCatalog::default(), &[], None).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, DEFAULT_SEQUENCE);
    }

    #[test]
    fn test_select_names_then_scripts() {
        let mut custom = BTreeMap::new();
        custom.insert("smoke".to_string(), vec![1, 20]);
        let catalog = SequenceCatalog::new(custom);

        let selected = select_sequences(
            &catalog,
            &["smoke".to_string(), "ul".to_string()],
            Some("6-7"),
        )
        .unwrap();

        assert_eq!(selected.len(), 3);
        assert_eq!(numbers(&selected[0]), vec![1, 20]);
        assert_eq!(selected[1].name, "list");
        assert_eq!(numbers(&selected[2]), vec![6, 7]);
    }

    #[test]
    fn test_select_unknown_name_fails() {
        let names = ["bogus".to_string()];
        let err = select_sequences(&SequenceCatalog::default(), &names, None).unwrap_err();
        assert!(matches!(err, Error::UnknownSequence { .. }));
    }

    #[test]
    fn test_read_body_missing_file() {
        let err = read_body(Path::new("/nonexistent/report.html")).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }
}
