//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the fleetpull configuration file without contacting any tenant.

use crate::cli::{EXIT_CONFIG, EXIT_SUCCESS};
use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug, Default)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates before returning
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Environment: {:?}", config.environment);
        println!("  Log Level: {}", config.application.log_level);
        println!("  Tenants: {}", config.tenant_keys().join(", "));
        println!(
            "  Listing: {} ({}, limit {}, max {} pages)",
            config.listing.mode,
            config.listing.endpoint_path(),
            config.listing.limit,
            config.listing.max_pages
        );
        println!(
            "  Details: {:?} {} (batch size {})",
            config.details.method, config.details.path, config.details.batch_size
        );
        println!(
            "  Timeouts: auth {}s, requests {}s, connect {}s",
            config.http.auth_timeout_seconds,
            config.http.request_timeout_seconds,
            config.http.connect_timeout_seconds
        );
        println!(
            "  Retry: {} attempts, {}ms initial delay, x{} backoff, {}ms cap",
            config.http.retry.max_attempts,
            config.http.retry.initial_delay_ms,
            config.http.retry.backoff_multiplier,
            config.http.retry.max_delay_ms
        );
        println!();

        Ok(EXIT_SUCCESS)
    }
}
