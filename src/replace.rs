//! Safe replacement of a persistent file with a freshly written temp file.
//!
//! # Overview
//!
//! The obvious `rename(temp, target)` is not enough: some platforms and
//! filesystems refuse to rename onto an existing destination. Replacement is
//! therefore done in three steps:
//!
//! 1. Remove a stale `target.old` left over from the previous cycle
//! 2. Move the current `target` aside to `target.old`
//! 3. Move `temp` to `target`
//!
//! Steps 1 and 2 are best-effort. Their failures are logged and reported as
//! [`BackupWarning`]s in the [`ReplaceOutcome`], never as errors. Only a
//! failure of step 3 is returned as [`ReplaceError::Swap`]: the new content
//! was not installed and the caller must not assume it was.
//!
//! After an `Err`, the previous content is either still at `target` or at the
//! backup path, which is the manual recovery point.
//!
//! # Concurrency
//!
//! No locking is done here. Only one replace per target may be in flight.
//!
//! # Example
//!
//! ```no_run
//! use filestate::replace::replace;
//! use std::path::Path;
//!
//! std::fs::write("state.json.tmp", b"{}").unwrap();
//! let outcome = replace(Path::new("state.json"), Path::new("state.json.tmp")).unwrap();
//! for warning in &outcome.warnings {
//!     eprintln!("backup step: {}", warning);
//! }
//! ```

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Suffix appended to the target path to form the backup path.
pub const DEFAULT_BACKUP_SUFFIX: &str = ".old";

/// Options for [`replace_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceOptions {
    /// Appended to the target path to build the backup path.
    pub backup_suffix: String,
}

impl Default for ReplaceOptions {
    fn default() -> Self {
        Self {
            backup_suffix: DEFAULT_BACKUP_SUFFIX.to_string(),
        }
    }
}

impl ReplaceOptions {
    /// The backup path for `target` (`target` + suffix, not an extension swap).
    #[must_use]
    pub fn backup_path(&self, target: &Path) -> PathBuf {
        let mut backup = OsString::from(target.as_os_str());
        backup.push(&self.backup_suffix);
        PathBuf::from(backup)
    }
}

/// A failure in one of the best-effort backup steps.
#[derive(Debug, Error)]
pub enum BackupWarning {
    /// The stale backup from a previous cycle could not be removed.
    #[error("failed to remove stale backup {}: {source}", .path.display())]
    RemoveStale {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The current target could not be moved to the backup path.
    #[error("failed to move {} to backup {}: {source}", .target.display(), .backup.display())]
    Preserve {
        target: PathBuf,
        backup: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The fatal failure of a replace.
#[derive(Debug, Error)]
pub enum ReplaceError {
    /// The temp file could not be moved into place.
    #[error("failed to move {} into place at {}: {source}", .temp.display(), .target.display())]
    Swap {
        temp: PathBuf,
        target: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What a successful replace did besides installing the new content.
#[derive(Debug)]
pub struct ReplaceOutcome {
    /// Where the previous target would be kept.
    pub backup: PathBuf,
    /// `true` if a previous target existed and was moved to `backup`.
    pub backup_created: bool,
    /// Advisory failures of the backup steps, in the order they happened.
    pub warnings: Vec<BackupWarning>,
}

impl ReplaceOutcome {
    /// Returns `true` if no backup step reported a problem.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Replace `target` with `temp` using the default `.old` backup suffix.
///
/// # Errors
///
/// Returns [`ReplaceError::Swap`] if `temp` could not be renamed to `target`.
pub fn replace(target: &Path, temp: &Path) -> Result<ReplaceOutcome, ReplaceError> {
    replace_with(target, temp, &ReplaceOptions::default())
}

/// Replace `target` with `temp`, keeping the previous target as a backup.
///
/// # Errors
///
/// Returns [`ReplaceError::Swap`] if `temp` could not be renamed to `target`.
/// Backup failures are reported in [`ReplaceOutcome::warnings`] instead.
pub fn replace_with(
    target: &Path,
    temp: &Path,
    options: &ReplaceOptions,
) -> Result<ReplaceOutcome, ReplaceError> {
    let backup = options.backup_path(target);
    let mut warnings = Vec::new();

    // An empty suffix makes the backup path the target itself; removing it
    // would destroy the only copy of the previous content.
    if backup.as_path() == target {
        log::debug!(
            "backup path equals target {}, skipping backup",
            target.display()
        );
        return swap(target, temp).map(|()| ReplaceOutcome {
            backup,
            backup_created: false,
            warnings,
        });
    }

    match fs::remove_file(&backup) {
        Ok(()) => log::debug!("removed stale backup {}", backup.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            log::debug!("delete old {}: {}", backup.display(), source);
            warnings.push(BackupWarning::RemoveStale {
                path: backup.clone(),
                source,
            });
        }
    }

    let backup_created = match fs::rename(target, &backup) {
        Ok(()) => true,
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        Err(source) => {
            log::debug!(
                "rotate {} to old {}: {}",
                target.display(),
                backup.display(),
                source
            );
            warnings.push(BackupWarning::Preserve {
                target: target.to_path_buf(),
                backup: backup.clone(),
                source,
            });
            false
        }
    };

    swap(target, temp)?;
    Ok(ReplaceOutcome {
        backup,
        backup_created,
        warnings,
    })
}

fn swap(target: &Path, temp: &Path) -> Result<(), ReplaceError> {
    fs::rename(temp, target).map_err(|source| {
        log::error!(
            "failed to install {} as {}: {}",
            temp.display(),
            target.display(),
            source
        );
        ReplaceError::Swap {
            temp: temp.to_path_buf(),
            target: target.to_path_buf(),
            source,
        }
    })
}
