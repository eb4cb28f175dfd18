//! Configuration file locations

use std::path::PathBuf;

/// Directory name used under the platform config dir
const APP_NAME: &str = "grader-cli";

/// Get the configuration directory path
///
/// Uses the directories crate for platform-appropriate locations:
/// - Linux: `~/.config/grader-cli/`
/// - macOS: `~/Library/Application Support/grader-cli/`
/// - Windows: `%APPDATA%\grader-cli\`
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_is_toml() {
        if let Some(path) = config_path() {
            assert_eq!(path.file_name().unwrap(), "config.toml");
            assert!(path.parent().unwrap().ends_with(APP_NAME));
        }
    }
}
