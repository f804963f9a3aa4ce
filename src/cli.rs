//! Command-line interface definitions for `filestate`.
//!
//! # Example
//!
//! ```bash
//! # Print the identity of a file
//! filestate identity /var/log/syslog
//!
//! # Check whether two paths are the same file
//! filestate same /var/log/syslog /var/log/syslog.1
//!
//! # Record the current end of a log in the checkpoint, then check it later
//! filestate track /var/log/syslog
//! filestate status
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// File identity tracking and safe checkpoint replacement.
#[derive(Debug, Parser)]
#[command(name = "filestate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to a TOML config file
    #[arg(long, value_name = "FILE", global = true, env = "FILESTATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the identity of a file as JSON
    Identity(IdentityArgs),
    /// Check whether two paths refer to the same file (exit code 2 if not)
    Same(SameArgs),
    /// Replace TARGET with TEMP, keeping the previous TARGET as a backup
    Replace(ReplaceArgs),
    /// Record a file's identity and read offset in the checkpoint
    Track(TrackArgs),
    /// Check every checkpointed file for rotation (exit code 2 if any changed)
    Status(StatusArgs),
}

/// Arguments for the identity subcommand.
#[derive(Debug, Args)]
pub struct IdentityArgs {
    /// File to inspect
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Arguments for the same subcommand.
#[derive(Debug, Args)]
pub struct SameArgs {
    /// First path
    #[arg(value_name = "A")]
    pub a: PathBuf,
    /// Second path
    #[arg(value_name = "B")]
    pub b: PathBuf,
}

/// Arguments for the replace subcommand.
#[derive(Debug, Args)]
pub struct ReplaceArgs {
    /// Persistent file to replace
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,
    /// File holding the new content; consumed on success
    #[arg(value_name = "TEMP")]
    pub temp: PathBuf,
    /// Backup suffix (overrides config)
    #[arg(long, value_name = "SUFFIX")]
    pub backup_suffix: Option<String>,
}

/// Arguments for the track subcommand.
#[derive(Debug, Args)]
pub struct TrackArgs {
    /// File to track
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
    /// Read offset to record (default: current file length)
    #[arg(long, value_name = "BYTES")]
    pub offset: Option<u64>,
    /// Checkpoint file (overrides config)
    #[arg(long, value_name = "PATH")]
    pub checkpoint: Option<PathBuf>,
}

/// Arguments for the status subcommand.
#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Checkpoint file (overrides config)
    #[arg(long, value_name = "PATH")]
    pub checkpoint: Option<PathBuf>,
    /// Print a JSON report instead of one line per file
    #[arg(long)]
    pub json: bool,
}
