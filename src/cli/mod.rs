//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for fleetpull using clap.
//!
//! # Exit codes
//!
//! | Code | Meaning                                        |
//! |------|------------------------------------------------|
//! | 0    | Success                                        |
//! | 2    | Configuration or argument error                |
//! | 3    | Authentication failure                         |
//! | 4    | Connection, API or response error              |
//! | 5    | Fatal error                                    |
//! | 6    | A detail batch failed part-way through         |
//! | 130  | Interrupted                                    |

pub mod commands;

use crate::domain::InventoryError;
use clap::{Parser, Subcommand};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_CONFIG: i32 = 2;
pub const EXIT_AUTH: i32 = 3;
pub const EXIT_CONNECTION: i32 = 4;
pub const EXIT_FATAL: i32 = 5;
pub const EXIT_PARTIAL: i32 = 6;
pub const EXIT_INTERRUPTED: i32 = 130;

/// Fleetpull - tenant inventory acquisition
#[derive(Parser, Debug)]
#[command(name = "fleetpull")]
#[command(version, about, long_about = None)]
#[command(author = "Fleetpull Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "fleetpull.toml", env = "FLEETPULL_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "FLEETPULL_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Acquire a tenant's inventory and write it as JSON
    Fetch(commands::fetch::FetchArgs),

    /// Acquire a tenant's inventory and write its summary as JSON
    Summary(commands::summary::SummaryArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// List configured tenants
    Tenants(commands::tenants::TenantsArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

/// Process exit code for an error
pub fn exit_code_for(error: &InventoryError) -> i32 {
    match error {
        InventoryError::Configuration(_) | InventoryError::Validation(_) => EXIT_CONFIG,
        InventoryError::Auth(_) => EXIT_AUTH,
        InventoryError::Transport(_)
        | InventoryError::Api { .. }
        | InventoryError::InvalidResponse(_)
        | InventoryError::PaginationNonTermination { .. } => EXIT_CONNECTION,
        InventoryError::PartialBatchFailure(_) => EXIT_PARTIAL,
        InventoryError::Serialization(_) | InventoryError::Io(_) => EXIT_FATAL,
    }
}
