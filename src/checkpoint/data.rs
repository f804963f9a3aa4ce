//! Data structures for checkpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use crate::identity::{FileIdentity, Identify, IdentityError, IdentityResult};

/// Current version of the checkpoint file format.
pub const CHECKPOINT_VERSION: u32 = 1;

/// Read state of a single tracked file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointEntry {
    /// Path the file was last read under.
    pub source: PathBuf,
    /// Byte offset up to which the file has been read.
    pub offset: u64,
    /// Identity of the file when the offset was recorded.
    pub identity: FileIdentity,
    /// When the entry was last updated.
    pub updated_at: DateTime<Utc>,
}

impl CheckpointEntry {
    /// Create an entry stamped with the current time.
    pub fn new(source: PathBuf, offset: u64, identity: FileIdentity) -> Self {
        Self {
            source,
            offset,
            identity,
            updated_at: Utc::now(),
        }
    }

    /// Capture the identity of the open `file` and record `offset` for it.
    ///
    /// # Errors
    ///
    /// Fails if the identity cannot be captured.
    pub fn capture(source: PathBuf, file: &File, offset: u64) -> IdentityResult<Self> {
        Ok(Self::new(source, offset, file.identity()?))
    }

    /// Compare this entry against a live file's identity and length.
    #[must_use]
    pub fn rotation_status(&self, live: &FileIdentity, live_len: u64) -> RotationStatus {
        if !self.identity.is_same(live) {
            RotationStatus::Rotated
        } else if live_len < self.offset {
            RotationStatus::Truncated
        } else {
            RotationStatus::Unchanged
        }
    }

    /// Open the file at [`source`](Self::source) and check it for rotation.
    ///
    /// A file that no longer exists is reported as [`RotationStatus::Missing`].
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be opened or queried.
    pub fn probe(&self) -> IdentityResult<RotationStatus> {
        let file = match File::open(&self.source) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(RotationStatus::Missing),
            Err(source) => {
                return Err(IdentityError::Stat {
                    path: Some(self.source.clone()),
                    source,
                })
            }
        };
        let live = file.identity()?;
        let len = file
            .metadata()
            .map_err(|source| IdentityError::Stat {
                path: Some(self.source.clone()),
                source,
            })?
            .len();
        Ok(self.rotation_status(&live, len))
    }
}

/// Result of comparing a checkpoint entry with the file now at its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationStatus {
    /// Same file, at least as long as the recorded offset.
    Unchanged,
    /// A different file now lives at the path.
    Rotated,
    /// Same file, but shorter than the recorded offset (copy-truncate).
    Truncated,
    /// Nothing lives at the path any more.
    Missing,
}

impl RotationStatus {
    /// Returns `true` if reading can resume at the recorded offset.
    #[must_use]
    pub fn can_resume(self) -> bool {
        self == Self::Unchanged
    }
}

impl fmt::Display for RotationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unchanged => "unchanged",
            Self::Rotated => "rotated",
            Self::Truncated => "truncated",
            Self::Missing => "missing",
        };
        f.pad(name)
    }
}

/// All checkpoint entries of one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Format version.
    pub version: u32,
    /// One entry per tracked path.
    pub entries: Vec<CheckpointEntry>,
}

impl Default for Checkpoint {
    fn default() -> Self {
        Self::new()
    }
}

impl Checkpoint {
    /// Create an empty checkpoint at the current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            entries: Vec::new(),
        }
    }

    /// Insert an entry, replacing any entry for the same source path.
    ///
    /// Returns the replaced entry.
    pub fn upsert(&mut self, entry: CheckpointEntry) -> Option<CheckpointEntry> {
        match self.entries.iter_mut().find(|e| e.source == entry.source) {
            Some(existing) => Some(std::mem::replace(existing, entry)),
            None => {
                self.entries.push(entry);
                None
            }
        }
    }

    /// Look up the entry for `source`.
    #[must_use]
    pub fn get(&self, source: &Path) -> Option<&CheckpointEntry> {
        self.entries.iter().find(|e| e.source == source)
    }

    /// Remove and return the entry for `source`.
    pub fn remove(&mut self, source: &Path) -> Option<CheckpointEntry> {
        let index = self.entries.iter().position(|e| e.source == source)?;
        Some(self.entries.remove(index))
    }

    /// Find the entry recorded for `identity`, whatever path it was under.
    ///
    /// This is how a renamed file is matched back to its read offset.
    #[must_use]
    pub fn find_by_identity(&self, identity: &FileIdentity) -> Option<&CheckpointEntry> {
        self.entries.iter().find(|e| e.identity.is_same(identity))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
