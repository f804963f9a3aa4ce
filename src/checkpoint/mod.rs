//! Checkpoint records: where each tracked file was, and how far it was read.
//!
//! Each entry keeps the file's [`FileIdentity`](crate::identity::FileIdentity)
//! next to its read offset so that, after a restart, the live file at the same
//! path can be checked for rotation before reading resumes.
//!
//! # Features
//!
//! * **Rotation detection**: compare a stored entry with the live file.
//! * **Integrity**: the file is wrapped in an envelope with a SHA256 checksum.
//! * **Safe persistence**: written to a temp file, then installed with
//!   [`replace`](mod@crate::replace).
//!
//! # Architecture
//!
//! * [`data`]: Serializable entries, the checkpoint itself, rotation checks.
//! * [`io`]: Loading, verifying and saving checkpoint files.

pub mod data;
pub mod io;

pub use data::{Checkpoint, CheckpointEntry, RotationStatus, CHECKPOINT_VERSION};
pub use io::{CheckpointError, CheckpointFile, CheckpointResult, DEFAULT_TEMP_SUFFIX};
