//! I/O operations for checkpoint files.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::checkpoint::data::{Checkpoint, CHECKPOINT_VERSION};
use crate::replace::{replace_with, ReplaceError, ReplaceOptions, ReplaceOutcome};

/// Suffix appended to the checkpoint path for the file written before the swap.
pub const DEFAULT_TEMP_SUFFIX: &str = ".tmp";

/// Error type for checkpoint persistence.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Reading or writing a checkpoint file failed.
    #[error("I/O error for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The checkpoint could not be serialized.
    #[error("failed to serialize checkpoint: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The file is not a checkpoint envelope.
    #[error("failed to parse checkpoint {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The stored checksum does not match the content.
    #[error("checkpoint integrity check failed for {}: checksum mismatch", .path.display())]
    Integrity { path: PathBuf },

    /// The file was written by an incompatible format version.
    #[error("unsupported checkpoint version: {found} (current version is {expected})")]
    Version { found: u32, expected: u32 },

    /// The new checkpoint could not be installed.
    #[error(transparent)]
    Replace(#[from] ReplaceError),
}

/// Result type for checkpoint persistence.
pub type CheckpointResult<T> = Result<T, CheckpointError>;

/// Envelope for checkpoint files to include integrity checks.
#[derive(Debug, Serialize, Deserialize)]
struct CheckpointEnvelope {
    /// SHA256 checksum of the compact serialized checkpoint.
    checksum: String,
    /// The actual checkpoint data.
    checkpoint: Checkpoint,
}

fn checksum_of(checkpoint: &Checkpoint) -> CheckpointResult<String> {
    // Compact form; load must hash the same representation.
    let json = serde_json::to_string(checkpoint).map_err(CheckpointError::Serialize)?;
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// A checkpoint file on disk and how it is replaced.
#[derive(Debug, Clone)]
pub struct CheckpointFile {
    path: PathBuf,
    temp_path: PathBuf,
    replace: ReplaceOptions,
}

impl CheckpointFile {
    /// Checkpoint at `path` with the default `.tmp` and `.old` suffixes.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_options(path, DEFAULT_TEMP_SUFFIX, ReplaceOptions::default())
    }

    /// Checkpoint at `path` with explicit temp suffix and replace options.
    pub fn with_options(path: impl Into<PathBuf>, temp_suffix: &str, replace: ReplaceOptions) -> Self {
        let path = path.into();
        let mut temp = OsString::from(path.as_os_str());
        temp.push(temp_suffix);
        Self {
            path,
            temp_path: PathBuf::from(temp),
            replace,
        }
    }

    /// Path of the checkpoint file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path the new checkpoint is written to before the swap.
    #[must_use]
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Path the previous checkpoint is kept at after a save.
    #[must_use]
    pub fn backup_path(&self) -> PathBuf {
        self.replace.backup_path(&self.path)
    }

    /// Load and verify the checkpoint.
    ///
    /// A checkpoint file that does not exist yet loads as an empty checkpoint.
    /// The backup file is never consulted.
    ///
    /// # Errors
    ///
    /// Fails on I/O errors, malformed content, checksum mismatch, or an
    /// unsupported format version.
    pub fn load(&self) -> CheckpointResult<Checkpoint> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!(
                    "No checkpoint at {}, starting empty",
                    self.path.display()
                );
                return Ok(Checkpoint::new());
            }
            Err(source) => {
                return Err(CheckpointError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let envelope: CheckpointEnvelope =
            serde_json::from_str(&content).map_err(|source| CheckpointError::Parse {
                path: self.path.clone(),
                source,
            })?;

        if checksum_of(&envelope.checkpoint)? != envelope.checksum {
            return Err(CheckpointError::Integrity {
                path: self.path.clone(),
            });
        }

        let checkpoint = envelope.checkpoint;
        if checkpoint.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::Version {
                found: checkpoint.version,
                expected: CHECKPOINT_VERSION,
            });
        }

        log::debug!(
            "Loaded {} checkpoint entries from {}",
            checkpoint.len(),
            self.path.display()
        );
        Ok(checkpoint)
    }

    /// Write `checkpoint` to the temp path, sync it, and swap it into place.
    ///
    /// # Errors
    ///
    /// Fails if the temp file cannot be written, or with
    /// [`CheckpointError::Replace`] if the final swap fails. Backup problems
    /// are returned as warnings in the [`ReplaceOutcome`].
    pub fn save(&self, checkpoint: &Checkpoint) -> CheckpointResult<ReplaceOutcome> {
        let envelope = CheckpointEnvelope {
            checksum: checksum_of(checkpoint)?,
            checkpoint: checkpoint.clone(),
        };
        let json = serde_json::to_string_pretty(&envelope).map_err(CheckpointError::Serialize)?;

        self.write_temp(json.as_bytes())
            .map_err(|source| CheckpointError::Io {
                path: self.temp_path.clone(),
                source,
            })?;

        let outcome = replace_with(&self.path, &self.temp_path, &self.replace)?;
        for warning in &outcome.warnings {
            log::warn!("Checkpoint saved, but {}", warning);
        }
        Ok(outcome)
    }

    fn write_temp(&self, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = self.temp_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = File::create(&self.temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()
    }
}
