//! Server state reset
//!
//! The DS server keeps registered users and groups as directory trees under
//! `src/server/USERS` and `src/server/GROUPS`. Scripts assume a clean
//! server, so these are wiped and recreated between runs.

use serde::Serialize;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::common::{Error, Result};

/// A directory that could not be removed
#[derive(Debug, Clone, Serialize)]
pub struct RemovalFailure {
    pub path: PathBuf,
    pub error: String,
}

impl fmt::Display for RemovalFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}.", self.path.display(), self.error)
    }
}

/// What a reset did. Removal failures are not fatal and end up here.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResetReport {
    pub removed: Vec<PathBuf>,
    pub failures: Vec<RemovalFailure>,
}

impl ResetReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Wipes and recreates the state directories
#[derive(Debug, Clone)]
pub struct StateResetter {
    dirs: Vec<PathBuf>,
    remove: fn(&Path) -> io::Result<()>,
}

impl StateResetter {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self {
            dirs,
            remove: |path| std::fs::remove_dir_all(path),
        }
    }

    /// Resetter whose directory removal is replaced by `remove`
    #[cfg(test)]
    pub(crate) fn with_remover(dirs: Vec<PathBuf>, remove: fn(&Path) -> io::Result<()>) -> Self {
        Self { dirs, remove }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Remove every state directory, then create them all again empty
    ///
    /// A directory that does not exist counts as already removed. Any other
    /// removal error is logged and recorded in the report, and the reset
    /// carries on. Printing it is up to the caller. Failing to create a
    /// directory is fatal.
    pub fn reset(&self) -> Result<ResetReport> {
        let mut report = ResetReport::default();

        for dir in &self.dirs {
            match (self.remove)(dir) {
                Ok(()) => report.removed.push(dir.clone()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    tracing::debug!(path = %dir.display(), "state directory already absent");
                }
                Err(e) => {
                    tracing::warn!(
                        path = %dir.display(),
                        error = %e,
                        "could not remove state directory"
                    );
                    report.failures.push(RemovalFailure {
                        path: dir.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        for dir in &self.dirs {
            create_dir(dir)?;
        }

        tracing::debug!(
            removed = report.removed.len(),
            failures = report.failures.len(),
            "state reset"
        );
        Ok(report)
    }
}

fn create_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|source| Error::StateCreate {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn resetter(root: &Path) -> StateResetter {
        StateResetter::new(vec![root.join("USERS"), root.join("GROUPS")])
    }

    fn is_empty_dir(path: &Path) -> bool {
        path.is_dir() && std::fs::read_dir(path).unwrap().next().is_none()
    }

    #[test]
    fn test_reset_creates_missing_dirs() {
        let root = tempdir().unwrap();
        let resetter = resetter(root.path());

        let report = resetter.reset().unwrap();
        assert!(report.is_clean());
        assert!(report.removed.is_empty());
        for dir in resetter.dirs() {
            assert!(is_empty_dir(dir));
        }
    }

    #[test]
    fn test_reset_clears_contents() {
        let root = tempdir().unwrap();
        let resetter = resetter(root.path());

        let user = root.path().join("USERS").join("12345");
        std::fs::create_dir_all(&user).unwrap();
        std::fs::write(user.join("12345_pass.txt"), "secret").unwrap();
        std::fs::create_dir_all(root.path().join("GROUPS").join("01")).unwrap();

        let report = resetter.reset().unwrap();
        assert_eq!(report.removed.len(), 2);
        for dir in resetter.dirs() {
            assert!(is_empty_dir(dir));
        }
    }

    #[test]
    fn test_consecutive_resets_leave_empty_dirs() {
        let root = tempdir().unwrap();
        let resetter = resetter(root.path());

        resetter.reset().unwrap();
        std::fs::write(root.path().join("GROUPS").join("GID"), "01").unwrap();
        resetter.reset().unwrap();

        for dir in resetter.dirs() {
            assert!(is_empty_dir(dir));
        }
    }

    #[test]
    fn test_creation_failure_is_fatal() {
        let root = tempdir().unwrap();
        let blocker = root.path().join("server");
        std::fs::write(&blocker, "not a directory").unwrap();

        let resetter = StateResetter::new(vec![blocker.join("USERS")]);
        let err = resetter.reset().unwrap_err();
        assert!(matches!(err, Error::StateCreate { .. }));
    }

    #[test]
    fn test_removal_failure_does_not_stop_other_dirs() {
        let root = tempdir().unwrap();
        // remove_dir_all refuses a plain file; GROUPS must still be wiped
        let file = root.path().join("USERS");
        std::fs::write(&file, "stray").unwrap();
        let groups = root.path().join("GROUPS");
        std::fs::create_dir_all(groups.join("01")).unwrap();

        let resetter = StateResetter::new(vec![file, groups.clone()]);
        let err = resetter.reset().unwrap_err();

        assert!(matches!(err, Error::StateCreate { .. }));
        assert!(!groups.join("01").exists());
    }

    fn deny_users(path: &Path) -> io::Result<()> {
        if path.ends_with("USERS") {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        std::fs::remove_dir_all(path)
    }

    #[test]
    fn test_removal_failure_is_recorded_and_reset_succeeds() {
        let root = tempdir().unwrap();
        let users = root.path().join("USERS");
        let groups = root.path().join("GROUPS");
        std::fs::create_dir_all(users.join("12345")).unwrap();
        std::fs::create_dir_all(groups.join("01")).unwrap();

        let resetter = StateResetter::with_remover(vec![users.clone(), groups.clone()], deny_users);
        let report = resetter.reset().unwrap();

        assert!(!report.is_clean());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, users);
        assert_eq!(report.removed, vec![groups.clone()]);
        assert!(users.join("12345").exists());
        assert!(is_empty_dir(&groups));
    }

    #[test]
    fn test_removal_failure_display() {
        let failure = RemovalFailure {
            path: PathBuf::from("src/server/USERS"),
            error: "Permission denied (os error 13)".to_string(),
        };
        assert_eq!(
            failure.to_string(),
            "src/server/USERS - Permission denied (os error 13)."
        );
    }
}
