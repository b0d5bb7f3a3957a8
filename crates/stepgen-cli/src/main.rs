//! Stepgen CLI - Cucumber step definition generator
//!
//! Main entry point for the `stepgen` binary.

use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;
use stepgen_cli::cli::Cli;
use stepgen_common_log::{LogConfig, LogLevel};
use tracing::error;

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(&cli);

    match cli.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(code = e.code(), "{e}");
            eprintln!("{}", e.render());
            e.exit_code()
        }
    }
}

fn init_logging(cli: &Cli) {
    let mut config = LogConfig::from_env().with_ansi(std::io::stderr().is_terminal());

    // Flags win over STEPGEN_LOG_LEVEL / RUST_LOG
    if cli.verbose > 0 || cli.quiet {
        config = config.with_level(LogLevel::from_verbosity(cli.verbose, cli.quiet));
    }

    if let Err(e) = stepgen_common_log::init(config) {
        eprintln!("warning: failed to initialize logging: {e}");
    }
}
