//! Platform file identity for rotation detection.
//!
//! # Overview
//!
//! Log rotation (rename-and-create, copy-truncate) moves or recreates the file
//! behind a path while the path itself may be reused immediately. The path is
//! therefore useless for deciding whether we are still looking at the file we
//! were reading. The identity the OS assigns to the file object is not:
//!
//! - **Unix**: `(device, inode)` from `fstat`
//! - **Windows**: volume serial number plus the 64-bit file index from
//!   `GetFileInformationByHandle`, which the API hands out as two 32-bit halves
//! - **Other**: unsupported, capture fails with [`IdentityError::Unsupported`]
//!
//! Both survive a rename and both change when the file is deleted and created
//! again. File content is never inspected.
//!
//! # Example
//!
//! ```no_run
//! use filestate::identity::{identity_of_path, Identify};
//! use std::fs::File;
//!
//! let file = File::open("/var/log/app.log").unwrap();
//! let before = file.identity().unwrap();
//!
//! // ... the file gets rotated away ...
//!
//! let now = identity_of_path("/var/log/app.log".as_ref()).unwrap();
//! if !before.is_same(&now) {
//!     println!("app.log was rotated");
//! }
//! ```

mod record;

#[cfg(unix)]
mod unix;
#[cfg(unix)]
use unix as sys;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
use self::windows as sys;

#[cfg(not(any(unix, windows)))]
mod other;
#[cfg(not(any(unix, windows)))]
use other as sys;

use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for identity capture.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The metadata query (or the open that precedes it) failed.
    #[error("failed to stat {}: {source}", display_path(.path))]
    Stat {
        /// Path of the file, when the identity was requested by path.
        path: Option<PathBuf>,
        #[source]
        source: io::Error,
    },

    /// This platform exposes no stable file identity.
    #[error("file identity is not supported on this platform")]
    Unsupported,
}

impl IdentityError {
    fn with_path(self, path: &Path) -> Self {
        match self {
            Self::Stat { source, .. } => Self::Stat {
                path: Some(path.to_path_buf()),
                source,
            },
            other => other,
        }
    }
}

fn display_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => p.display().to_string(),
        None => "open file handle".to_string(),
    }
}

/// Result type for identity operations.
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Snapshot of the identity the OS assigns to a file object.
///
/// Two values are equal only when they are the same variant and every field
/// matches. A `FileIdentity` carries no handle; it stays valid (as a value)
/// after the file it was taken from is closed, renamed or deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "record::IdentityRecord", into = "record::IdentityRecord")]
pub enum FileIdentity {
    /// Device and inode number.
    Posix { device: u64, inode: u64 },
    /// Volume serial number and the split 64-bit file index.
    Windows {
        volume: u64,
        index_high: u32,
        index_low: u32,
    },
}

impl FileIdentity {
    /// Identity with every field zeroed, in the variant native to this platform.
    ///
    /// This is what an empty serialized record decodes to.
    #[must_use]
    pub const fn native_zero() -> Self {
        if cfg!(windows) {
            Self::Windows {
                volume: 0,
                index_high: 0,
                index_low: 0,
            }
        } else {
            Self::Posix {
                device: 0,
                inode: 0,
            }
        }
    }

    /// Returns `true` when both identities name the same underlying file.
    #[must_use]
    pub fn is_same(&self, other: &FileIdentity) -> bool {
        self == other
    }

    /// The full 64-bit file index (Windows) or inode number (Unix).
    #[must_use]
    pub const fn file_index(&self) -> u64 {
        match *self {
            Self::Posix { inode, .. } => inode,
            Self::Windows {
                index_high,
                index_low,
                ..
            } => ((index_high as u64) << 32) | index_low as u64,
        }
    }

    /// Returns `true` if every field is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        match *self {
            Self::Posix { device, inode } => device == 0 && inode == 0,
            Self::Windows {
                volume,
                index_high,
                index_low,
            } => volume == 0 && index_high == 0 && index_low == 0,
        }
    }
}

impl fmt::Display for FileIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Posix { device, inode } => write!(f, "dev={device} ino={inode}"),
            Self::Windows { volume, .. } => {
                write!(f, "vol={volume:#x} idx={:#018x}", self.file_index())
            }
        }
    }
}

/// Capability to produce a [`FileIdentity`].
///
/// Implemented once per platform for [`File`]; the implementation is picked at
/// compile time.
pub trait Identify {
    /// Query the OS for the identity of this file.
    fn identity(&self) -> IdentityResult<FileIdentity>;
}

impl Identify for File {
    fn identity(&self) -> IdentityResult<FileIdentity> {
        let identity = sys::identity_of(self)?;
        log::trace!("captured file identity {}", identity);
        Ok(identity)
    }
}

/// Derive the identity of an open file.
///
/// # Errors
///
/// Returns [`IdentityError::Stat`] if the metadata query fails, or
/// [`IdentityError::Unsupported`] on platforms without a file identity.
pub fn identity_of(file: &File) -> IdentityResult<FileIdentity> {
    file.identity()
}

/// Open `path` read-only and derive its identity.
///
/// The handle is closed before returning. Symlinks are followed, so the
/// identity is that of the target.
///
/// # Errors
///
/// Returns [`IdentityError::Stat`] (carrying `path`) if the file cannot be
/// opened or queried.
pub fn identity_of_path(path: &Path) -> IdentityResult<FileIdentity> {
    let file = File::open(path).map_err(|source| IdentityError::Stat {
        path: Some(path.to_path_buf()),
        source,
    })?;
    file.identity().map_err(|e| e.with_path(path))
}

/// Returns `true` if `a` and `b` currently refer to the same file.
///
/// # Errors
///
/// Fails if either identity cannot be captured.
pub fn same_file(a: &Path, b: &Path) -> IdentityResult<bool> {
    Ok(identity_of_path(a)?.is_same(&identity_of_path(b)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;

    fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        writeln!(file, "{}", content).unwrap();
        path
    }

    #[test]
    fn test_identity_stable_for_same_handle() {
        let dir = TempDir::new().unwrap();
        let path = create_test_file(&dir, "a.log", "line");
        let file = File::open(&path).unwrap();

        let first = file.identity().unwrap();
        let second = file.identity().unwrap();
        assert_eq!(first, second);
        assert!(first.is_same(&second));
    }

    #[test]
    fn test_identity_handle_matches_path() {
        let dir = TempDir::new().unwrap();
        let path = create_test_file(&dir, "a.log", "line");
        let file = File::open(&path).unwrap();

        assert_eq!(identity_of(&file).unwrap(), identity_of_path(&path).unwrap());
    }

    #[test]
    fn test_different_files_differ() {
        let dir = TempDir::new().unwrap();
        let a = create_test_file(&dir, "a.log", "one");
        let b = create_test_file(&dir, "b.log", "one");

        assert!(!same_file(&a, &b).unwrap());
    }

    #[test]
    fn test_identity_survives_rename() {
        let dir = TempDir::new().unwrap();
        let original = create_test_file(&dir, "app.log", "line");
        let before = identity_of_path(&original).unwrap();

        let rotated = dir.path().join("app.log.1");
        fs::rename(&original, &rotated).unwrap();

        assert_eq!(before, identity_of_path(&rotated).unwrap());
    }

    #[test]
    fn test_missing_file_is_stat_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.log");

        let err = identity_of_path(&missing).unwrap_err();
        match err {
            IdentityError::Stat { path, source } => {
                assert_eq!(path.as_deref(), Some(missing.as_path()));
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_error_message_names_path() {
        let err = IdentityError::Stat {
            path: Some(PathBuf::from("/tmp/gone.log")),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(err.to_string().contains("/tmp/gone.log"));

        let err = IdentityError::Stat {
            path: None,
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert!(err.to_string().contains("open file handle"));
    }

    #[test]
    fn test_variants_never_equal() {
        let posix = FileIdentity::Posix {
            device: 1,
            inode: 2,
        };
        let windows = FileIdentity::Windows {
            volume: 1,
            index_high: 0,
            index_low: 2,
        };
        assert_ne!(posix, windows);
        assert_eq!(posix.file_index(), windows.file_index());
    }

    #[test]
    fn test_file_index_combines_halves() {
        let id = FileIdentity::Windows {
            volume: 7,
            index_high: 0x1,
            index_low: 0x2,
        };
        assert_eq!(id.file_index(), 0x0000_0001_0000_0002);
    }

    #[test]
    fn test_native_zero() {
        let zero = FileIdentity::native_zero();
        assert!(zero.is_zero());
        #[cfg(unix)]
        assert!(matches!(zero, FileIdentity::Posix { .. }));
        #[cfg(windows)]
        assert!(matches!(zero, FileIdentity::Windows { .. }));
    }

    #[test]
    fn test_display() {
        let id = FileIdentity::Posix {
            device: 64768,
            inode: 42,
        };
        assert_eq!(id.to_string(), "dev=64768 ino=42");
    }
}
