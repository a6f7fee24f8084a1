//! Tenants command implementation
//!
//! Lists the configured tenants. Credentials are never printed.

use crate::cli::{EXIT_CONFIG, EXIT_SUCCESS};
use crate::config::load_config;
use clap::Args;
use serde::Serialize;

/// Arguments for the tenants command
#[derive(Args, Debug, Default)]
pub struct TenantsArgs {
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct TenantEntry<'a> {
    key: &'a str,
    display_name: &'a str,
    base_url: &'a str,
}

impl TenantsArgs {
    /// Execute the tenants command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let entries: Vec<TenantEntry<'_>> = config
            .tenants
            .iter()
            .map(|(key, tenant)| TenantEntry {
                key,
                display_name: &tenant.display_name,
                base_url: &tenant.base_url,
            })
            .collect();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        } else {
            for entry in &entries {
                println!("{:<20} {:<30} {}", entry.key, entry.display_name, entry.base_url);
            }
        }

        Ok(EXIT_SUCCESS)
    }
}
