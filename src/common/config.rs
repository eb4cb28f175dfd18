//! Configuration file handling
//!
//! The file only supplies defaults. Command-line flags are applied on top
//! through [`RunOverrides`] and the result is frozen into a [`RunConfig`]
//! that is handed to the runner once at startup.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::paths::config_path;
use super::{Error, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Grading service and target server
    #[serde(default)]
    pub target: TargetConfig,

    /// Loop behaviour
    #[serde(default)]
    pub run: RunSettings,

    /// Local server state
    #[serde(default)]
    pub state: StateConfig,

    /// User-defined script sequences, by name
    #[serde(default)]
    pub sequences: BTreeMap<String, Vec<u16>>,
}

/// Where the grading service lives and which server it should test
#[derive(Debug, Deserialize)]
pub struct TargetConfig {
    /// IP address of the server under test (`DSIP`)
    #[serde(default = "default_ip")]
    pub ip: String,

    /// Port of the server under test (`DSPORT`)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Grading service endpoint
    #[serde(default = "default_url")]
    pub url: String,

    /// Per-request timeout. Unset means wait as long as the service takes.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            ip: default_ip(),
            port: default_port(),
            url: default_url(),
            request_timeout_secs: None,
        }
    }
}

fn default_ip() -> String {
    "193.136.128.103".to_string()
}
fn default_port() -> u16 {
    58018
}
fn default_url() -> String {
    "http://tejo.tecnico.ulisboa.pt:59000/index.html".to_string()
}

/// Loop settings
#[derive(Debug, Deserialize)]
pub struct RunSettings {
    /// Reset the state directories after every script
    #[serde(default = "default_reset")]
    pub reset_after_each: bool,

    /// Pause between scripts, in seconds
    #[serde(default = "default_delay")]
    pub delay_secs: u64,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            reset_after_each: default_reset(),
            delay_secs: default_delay(),
        }
    }
}

fn default_reset() -> bool {
    true
}
fn default_delay() -> u64 {
    15
}

/// Server state directories wiped by a reset
#[derive(Debug, Deserialize)]
pub struct StateConfig {
    #[serde(default = "default_state_dirs")]
    pub dirs: Vec<PathBuf>,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            dirs: default_state_dirs(),
        }
    }
}

fn default_state_dirs() -> Vec<PathBuf> {
    vec![
        PathBuf::from("src/server/USERS"),
        PathBuf::from("src/server/GROUPS"),
    ]
}

/// Values given on the command line, each one replacing the file value
#[derive(Debug, Default, Clone)]
pub struct RunOverrides {
    pub ip: Option<String>,
    pub port: Option<u16>,
    pub url: Option<String>,
    pub no_reset: bool,
    pub delay_secs: Option<u64>,
}

/// Effective settings for one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub ip: String,
    pub port: u16,
    pub url: String,
    pub reset_after_each: bool,
    pub delay: Duration,
    pub request_timeout: Option<Duration>,
    pub state_dirs: Vec<PathBuf>,
}

impl Config {
    /// Load configuration from `path`, or from the default config file
    ///
    /// An explicit path must exist. The default file is optional and its
    /// absence yields the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::read(path),
            None => match config_path() {
                Some(path) if path.exists() => Self::read(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))?;
        if let Some(name) = config.sequences.keys().find(|n| n.is_empty() || n.starts_with('-')) {
            return Err(Error::ConfigParse(format!(
                "sequence name '{}' must be non-empty and must not start with '-'",
                name
            )));
        }
        Ok(config)
    }

    /// Apply command-line overrides and validate the result
    pub fn run_config(&self, overrides: &RunOverrides) -> Result<RunConfig> {
        let config = RunConfig {
            ip: overrides.ip.clone().unwrap_or_else(|| self.target.ip.clone()),
            port: overrides.port.unwrap_or(self.target.port),
            url: overrides.url.clone().unwrap_or_else(|| self.target.url.clone()),
            reset_after_each: self.run.reset_after_each && !overrides.no_reset,
            delay: Duration::from_secs(overrides.delay_secs.unwrap_or(self.run.delay_secs)),
            request_timeout: self.target.request_timeout_secs.map(Duration::from_secs),
            state_dirs: self.state.dirs.clone(),
        };
        config.validate()?;
        Ok(config)
    }
}

impl RunConfig {
    fn validate(&self) -> Result<()> {
        if self.ip.trim().is_empty() {
            return Err(Error::Config("target ip must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(Error::Config("target port must not be 0".to_string()));
        }
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "grading service url '{}' must start with http:// or https://",
                self.url
            )));
        }
        if self.state_dirs.is_empty() {
            return Err(Error::Config(
                "at least one state directory must be configured".to_string(),
            ));
        }
        Ok(())
    }
}
