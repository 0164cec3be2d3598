//! CLI entry point and dispatch logic
//!
//! `run()` parses arguments, discovers configuration, initializes logging,
//! creates the tokio runtime, dispatches to a command handler and prints
//! every error. main.rs only maps the returned exit code.

use anyhow::Result;
use clap::Parser;

use super::args::{Cli, Commands};
use super::commands;

use crate::logging::init_tracing;
use crate::redaction::redact_error_message;
use crate::{CliArgs, Config, ExitCode, HeadsongError};

/// Main CLI execution function.
///
/// Returns `Ok(())` on success, otherwise the exit code to terminate with
/// after the error has already been printed.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    let news = cli.command.news_args();
    let cli_args = CliArgs {
        config_path: cli.config.clone(),
        region: news.and_then(|n| n.region.clone()),
        max_headlines: news.and_then(|n| n.max),
        timeout_secs: cli.timeout,
        verbose: cli.verbose.then_some(true),
    };

    let config = match Config::discover(&cli_args) {
        Ok(config) => config,
        Err(err) => {
            let err = HeadsongError::from(err);
            eprint!("{}", err.display_for_user());
            return Err(err.to_exit_code());
        }
    };

    if let Err(e) = init_tracing(config.verbose) {
        eprintln!("Warning: failed to initialize logging: {e}");
    }

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("✗ Failed to create async runtime: {e}");
            return Err(ExitCode::INTERNAL);
        }
    };

    let operation = cli.command.name();
    let result = rt.block_on(async {
        match cli.command {
            Commands::Headlines { json, .. } => {
                commands::execute_headlines_command(&config, json).await
            }
            Commands::Lyrics { select, json, .. } => {
                commands::execute_lyrics_command(&config, &select, json).await
            }
            Commands::Run { select, json, .. } => {
                commands::execute_run_command(&config, &select, json).await
            }
            Commands::Doctor { probe, json } => {
                commands::execute_doctor_command(&config, probe, json).await
            }
        }
    });

    match result {
        Ok(code) if code == ExitCode::SUCCESS => Ok(()),
        Ok(code) => Err(code),
        Err(error) => {
            if let Some(headsong_error) = error.downcast_ref::<HeadsongError>() {
                eprint!("{}", headsong_error.display_for_user());
                tracing::debug!(operation, kind = ?headsong_error.kind(), "Command failed");
                Err(headsong_error.to_exit_code())
            } else {
                eprintln!(
                    "✗ Unexpected error during {operation}: {}",
                    redact_error_message(&format!("{error:#}"))
                );
                eprintln!("\n  Run with --verbose for more detailed output");
                Err(ExitCode::INTERNAL)
            }
        }
    }
}
