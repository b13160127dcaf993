//! try: quick, dated scratch directories.
//!
//! This binary is meant to be wrapped by the shell function printed by
//! `try init`. It draws its UI on stderr and prints a shell script on stdout,
//! which the wrapper evaluates to create and enter directories.
//!
//! # Logging
//! Set `TRY_LOG_DIR` to write logs to `<dir>/try.<pid>.log`, or `TRY_LOG`
//! (an `EnvFilter` directive, default `warn`) to control stderr logging.

use std::{
    env,
    fs::{self, OpenOptions},
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use tries::cli::Cli;
use tries::commands::execute;

const LOG_DIR_ENV: &str = "TRY_LOG_DIR";
const LOG_FILTER_ENV: &str = "TRY_LOG";

fn init_tracing() {
    if let Some(log_dir) = env::var_os(LOG_DIR_ENV).map(PathBuf::from)
        && fs::create_dir_all(&log_dir).is_ok()
    {
        let log_path = log_dir.join(format!("try.{}.log", std::process::id()));
        if let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) {
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_target(true);
            let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
                .unwrap_or_else(|_| EnvFilter::new("tries=debug"));
            tracing_subscriber::registry()
                .with(filter)
                .with(file_layer)
                .init();
            tracing::debug!(path = ?log_path, "tracing initialized");
            return;
        }
    }

    // Stderr carries the picker UI, so only warnings and up by default.
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Writes the script to stdout without any re-encoding of paths.
fn emit(script: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(script.as_bytes())?;
    stdout.flush()
}

/// Runs the command and prints its script.
///
/// Exit codes: 0 on success or cancel, 1 when the command failed, 2 when
/// the script could not be written (usage errors are reported by clap).
fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match execute(cli) {
        Ok(Some(script)) => {
            if let Err(e) = emit(&script) {
                eprintln!("Error: {}", e);
                return ExitCode::from(2);
            }
            ExitCode::SUCCESS
        }
        // Cancelled: nothing for the shell to do.
        Ok(None) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
