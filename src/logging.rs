//! Logger setup for the `filestate` binary.
//!
//! The library itself only emits `log` records. The binary installs
//! `env_logger`, filtering by `RUST_LOG` when it is set and by the CLI
//! flags otherwise (`-q` errors only, `-v` debug, `-vv` trace, info by default).

use env_logger::{Builder, Env};
use log::{LevelFilter, SetLoggerError};
use std::io::Write;

/// Install the process logger.
///
/// # Errors
///
/// Fails if a logger is already installed.
pub fn init_logging(verbose: u8, quiet: bool) -> Result<(), SetLoggerError> {
    let level = level_for(verbose, quiet);
    let env = Env::default().default_filter_or(level.as_str());

    let mut builder = Builder::from_env(env);
    let show_target = verbose > 0 || cfg!(debug_assertions);
    builder.format(move |buf, record| {
        let style = buf.default_level_style(record.level());
        if show_target {
            writeln!(
                buf,
                "{style}{:<5}{style:#} {} {}: {}",
                record.level(),
                buf.timestamp_seconds(),
                record.target(),
                record.args()
            )
        } else {
            writeln!(buf, "{style}{:<5}{style:#} {}", record.level(), record.args())
        }
    });
    builder.try_init()?;

    log::debug!("logger ready, default level {}", level);
    Ok(())
}

/// Level selected by the CLI flags; `quiet` wins over `verbose`.
fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    }
}
