//! filestate - entry point for the CLI.

use clap::Parser;
use filestate::{cli::Cli, error::ExitCode, logging::init_logging};

fn main() {
    let cli = Cli::parse();
    if let Err(err) = init_logging(cli.verbose, cli.quiet) {
        eprintln!("warning: logging disabled: {}", err);
    }

    match filestate::run_app(cli) {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            let exit_code = ExitCode::GeneralError;
            eprintln!("[{}] Error: {:#}", exit_code.code_prefix(), err);
            std::process::exit(exit_code.as_i32());
        }
    }
}
