//! filestate - file identity and safe checkpoint replacement
//!
//! Building blocks for a log-tailing agent's state layer:
//!
//! * [`identity`]: derive and compare the OS identity of a file (device/inode
//!   on Unix, volume serial/file index on Windows) to detect rotation.
//! * [`replace`](mod@replace): install a freshly written temp file over a persistent file,
//!   keeping the previous version as a `.old` backup.
//! * [`checkpoint`]: checkpoint records tying a file's identity to its read
//!   offset, persisted with [`replace`](mod@replace).
//!
//! Nothing here locks; callers serialize access per target path.

pub mod app;
pub mod checkpoint;
pub mod cli;
pub mod config;
pub mod error;
pub mod identity;
pub mod logging;
pub mod replace;

pub use app::run_app;
pub use identity::{identity_of, identity_of_path, FileIdentity, Identify, IdentityError};
pub use replace::{replace, replace_with, BackupWarning, ReplaceError, ReplaceOptions, ReplaceOutcome};
