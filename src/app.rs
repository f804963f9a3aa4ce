//! Subcommand execution for the `filestate` binary.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::checkpoint::{CheckpointEntry, CheckpointFile, RotationStatus};
use crate::cli::{Cli, Commands, IdentityArgs, ReplaceArgs, SameArgs, StatusArgs, TrackArgs};
use crate::config::{validate_suffix, Config};
use crate::error::ExitCode;
use crate::identity::{identity_of_path, same_file, Identify};
use crate::replace::replace_with;

/// Run the parsed command line. Logging must already be initialized.
///
/// # Errors
///
/// Returns any error that should end the process with [`ExitCode::GeneralError`].
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    log::debug!("Effective config: {:?}", config);

    match cli.command {
        Commands::Identity(args) => run_identity(&args),
        Commands::Same(args) => run_same(&args),
        Commands::Replace(args) => run_replace(&config, &args),
        Commands::Track(args) => run_track(&config, &args),
        Commands::Status(args) => run_status(&config, &args),
    }
}

fn checkpoint_file(config: &Config, explicit: Option<&Path>) -> Result<CheckpointFile> {
    config.checkpoint_file(explicit).context(
        "No checkpoint path configured and no platform data directory available; use --checkpoint",
    )
}

fn run_identity(args: &IdentityArgs) -> Result<ExitCode> {
    let identity = identity_of_path(&args.file)?;
    println!("{}", serde_json::to_string_pretty(&identity)?);
    Ok(ExitCode::Success)
}

fn run_same(args: &SameArgs) -> Result<ExitCode> {
    if same_file(&args.a, &args.b)? {
        println!("same");
        Ok(ExitCode::Success)
    } else {
        println!("different");
        Ok(ExitCode::Changed)
    }
}

fn run_replace(config: &Config, args: &ReplaceArgs) -> Result<ExitCode> {
    let mut options = config.replace_options();
    if let Some(suffix) = &args.backup_suffix {
        validate_suffix("backup_suffix", suffix)?;
        options.backup_suffix = suffix.clone();
    }

    let outcome = replace_with(&args.target, &args.temp, &options)?;
    for warning in &outcome.warnings {
        log::warn!("{}", warning);
    }
    if outcome.backup_created {
        log::info!(
            "Installed {} (previous version kept at {})",
            args.target.display(),
            outcome.backup.display()
        );
    } else {
        log::info!("Installed {}", args.target.display());
    }
    Ok(ExitCode::Success)
}

fn run_track(config: &Config, args: &TrackArgs) -> Result<ExitCode> {
    let store = checkpoint_file(config, args.checkpoint.as_deref())?;
    let mut checkpoint = store.load()?;

    // Entries are keyed by canonical path so `./a.log` and `a.log` match.
    let source = fs::canonicalize(&args.file)
        .with_context(|| format!("Failed to resolve {}", args.file.display()))?;
    let file = File::open(&source)
        .with_context(|| format!("Failed to open {}", source.display()))?;
    let offset = match args.offset {
        Some(offset) => offset,
        None => file
            .metadata()
            .with_context(|| format!("Failed to stat {}", source.display()))?
            .len(),
    };
    let identity = file.identity()?;
    drop(file);

    // A file we already know under another name was renamed; carry it over.
    let renamed_from = checkpoint
        .find_by_identity(&identity)
        .filter(|entry| entry.source != source)
        .map(|entry| entry.source.clone());
    if let Some(old) = renamed_from {
        log::info!("{} was renamed to {}", old.display(), source.display());
        checkpoint.remove(&old);
    }

    let entry = CheckpointEntry::new(source.clone(), offset, identity);
    if let Some(previous) = checkpoint.upsert(entry) {
        if !previous.identity.is_same(&identity) {
            log::info!("{} was rotated, starting a new entry", source.display());
        }
    }

    store.save(&checkpoint)?;
    log::info!(
        "Tracking {} at offset {} ({})",
        source.display(),
        offset,
        identity
    );
    Ok(ExitCode::Success)
}

#[derive(Debug, Serialize)]
struct StatusLine {
    source: PathBuf,
    offset: u64,
    status: RotationStatus,
}

fn run_status(config: &Config, args: &StatusArgs) -> Result<ExitCode> {
    let store = checkpoint_file(config, args.checkpoint.as_deref())?;
    let checkpoint = store.load()?;

    let mut report = Vec::with_capacity(checkpoint.len());
    for entry in &checkpoint.entries {
        let status = entry.probe()?;
        report.push(StatusLine {
            source: entry.source.clone(),
            offset: entry.offset,
            status,
        });
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in &report {
            println!(
                "{:<9} {:>12} {}",
                line.status,
                line.offset,
                line.source.display()
            );
        }
    }

    if report.iter().all(|line| line.status.can_resume()) {
        Ok(ExitCode::Success)
    } else {
        Ok(ExitCode::Changed)
    }
}
