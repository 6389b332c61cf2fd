//! whatexec - locate executables
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use whatexec::cli::{Cli, Commands};
use whatexec::config::{Config, ConfigManager};
use whatexec::error::WhatExecResult;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> WhatExecResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };

    // These must work even when the config file is broken
    match cli.command {
        Commands::Completions(args) => return whatexec::cli::commands::completions(args),
        Commands::Config(args) => {
            init_logging(cli.verbose, "text");
            return whatexec::cli::commands::config(args, &config_manager).await;
        }
        _ => {}
    }

    let config = config_manager.load().await?;
    let verbose = cli.verbose.max(u8::from(config.general.verbose));
    init_logging(verbose, &config.general.log_format);
    debug!("Loaded configuration from {}", config_manager.path().display());

    if console::user_attended_stderr() {
        whatexec::ui::init_theme();
    }

    dispatch(cli.command, &config, verbose > 0).await
}

async fn dispatch(command: Commands, config: &Config, verbose: bool) -> WhatExecResult<()> {
    use whatexec::cli::commands;

    match command {
        Commands::Find(args) => commands::find(args, config, verbose).await,
        Commands::Search(args) => commands::search(args, config, verbose).await,
        Commands::List(args) => commands::list(args, config).await,
        Commands::Path(args) => commands::path(args).await,
        Commands::Drives(args) => commands::drives(args, config).await,
        Commands::Config(_) | Commands::Completions(_) => unreachable!("handled before config load"),
    }
}

/// Logs go to stderr; stdout carries results only.
/// 0 = warn, 1 = info, 2+ = debug
fn init_logging(verbose: u8, format: &str) {
    let filter = match verbose {
        0 => EnvFilter::new("whatexec=warn"),
        1 => EnvFilter::new("whatexec=info"),
        _ => EnvFilter::new("whatexec=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
