// Fleetpull - Tenant inventory acquisition pipeline
// Copyright (c) 2025 Fleetpull Contributors
// Licensed under the MIT License

use clap::Parser;
use fleetpull::cli::{Cli, Commands, EXIT_FATAL, EXIT_INTERRUPTED};
use fleetpull::config::{load_config, LoggingConfig};
use fleetpull::logging::init_logging;
use std::process;

#[tokio::main]
async fn main() {
    // Optional; a missing .env is ignored
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let (log_level, logging_config) = logging_settings(&cli);
    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(EXIT_FATAL);
        }
    };

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "fleetpull starting");

    let exit_code = tokio::select! {
        result = execute_command(&cli) => match result {
            Ok(code) => code,
            Err(e) => {
                tracing::error!(error = %e, "Command execution failed");
                eprintln!("Error: {e}");
                EXIT_FATAL
            }
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, aborting without output");
            eprintln!("\n⚠️  Interrupted");
            EXIT_INTERRUPTED
        }
    };

    // process::exit skips destructors; flush file logs first
    drop(guard);
    process::exit(exit_code);
}

/// Log level and file logging settings
///
/// Taken from the configuration file when it loads; `--log-level` wins.
/// Commands report configuration errors themselves.
fn logging_settings(cli: &Cli) -> (String, LoggingConfig) {
    let (level, logging) = match &cli.command {
        Commands::Init(_) => ("info".to_string(), LoggingConfig::default()),
        _ => load_config(&cli.config)
            .map(|config| (config.application.log_level, config.logging))
            .unwrap_or_else(|_| ("info".to_string(), LoggingConfig::default())),
    };

    (cli.log_level.clone().unwrap_or(level), logging)
}

async fn execute_command(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Fetch(args) => args.execute(&cli.config).await,
        Commands::Summary(args) => args.execute(&cli.config).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Tenants(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}
