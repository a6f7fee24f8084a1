//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use crate::cli::{EXIT_CONFIG, EXIT_FATAL, EXIT_SUCCESS};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "fleetpull.toml")]
    pub output: String,

    /// Include every option with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing fleetpull configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your tenants", self.output);
                println!("  2. Put client secrets in a .env file, e.g.");
                println!("     FLEETPULL_ACME_CLIENT_SECRET=...");
                println!("  3. Validate configuration: fleetpull validate-config");
                println!("  4. Fetch an inventory: fleetpull fetch --tenant acme --pretty");
                println!();
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(EXIT_FATAL)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# fleetpull configuration

[application]
log_level = "info"

[tenants.acme]
display_name = "ACME Corp"
base_url = "https://api.us-2.example.com"
client_id = "replace-with-client-id"
client_secret = "${FLEETPULL_ACME_CLIENT_SECRET}"

[listing]
mode = "scroll"
limit = 5000

[details]
method = "post"
batch_size = 400
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# fleetpull configuration
#
# ${VAR} placeholders are replaced from the environment (and .env).
# Scalar settings can be overridden with FLEETPULL_<SECTION>_<KEY>,
# e.g. FLEETPULL_LISTING_MODE=offset.

# development | staging | production
# Plain http:// tenant URLs are rejected in production.
environment = "development"

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# Tenants
# ============================================================================
# One table per tenant. Keys use lowercase letters, digits, '-' and '_'.
# Credentials may also come from FLEETPULL_TENANT_<KEY>_CLIENT_SECRET.
[tenants.acme]
display_name = "ACME Corp"
base_url = "https://api.us-2.example.com"
client_id = "replace-with-client-id"
client_secret = "${FLEETPULL_ACME_CLIENT_SECRET}"

# [tenants.globex]
# display_name = "Globex"
# base_url = "https://api.eu-1.example.com"
# client_id = "replace-with-client-id"
# client_secret = "${FLEETPULL_GLOBEX_CLIENT_SECRET}"

# ============================================================================
# HTTP
# ============================================================================
[http]
auth_timeout_seconds = 20
request_timeout_seconds = 60
connect_timeout_seconds = 10
tls_verify = true

# Applied to every request on HTTP 429/500/502/503/504, timeouts and
# connection failures
[http.retry]
max_attempts = 3
initial_delay_ms = 500
max_delay_ms = 10000
backoff_multiplier = 2.0

# ============================================================================
# Identifier listing
# ============================================================================
[listing]
# offset: ?offset=N&limit=L until an empty page
# scroll: ?limit=L&offset=<token> until no token is returned
mode = "scroll"

# Defaults to /devices/queries/devices/v1 (offset)
# or /devices/queries/devices-scroll/v1 (scroll)
# path = "/devices/queries/devices-scroll/v1"

# Page size (1-10000)
limit = 5000

# Abort if the server keeps returning pages
max_pages = 10000

# ============================================================================
# Detail fetch
# ============================================================================
[details]
path = "/devices/entities/devices/v2"

# get: ?ids=a&ids=b   post: {"ids": [...]}
method = "post"

# Ids per request (1-500)
batch_size = 400

# ============================================================================
# Summary report
# ============================================================================
[report]
breakdown_columns = ["os_version", "agent_version"]
flag_columns = ["rfm_enabled", "tamper_protection_enabled"]
preview_rows = 20

# ============================================================================
# Logging
# ============================================================================
[logging]
# JSON log file in addition to console output
local_enabled = false
local_path = "logs"

# daily | hourly | never
local_rotation = "daily"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use tempfile::TempDir;

    fn resolved(template: String) -> String {
        template.replace("${FLEETPULL_ACME_CLIENT_SECRET}", "test-secret")
    }

    #[test]
    fn test_generated_minimal_config_is_valid() {
        let config = parse_config(&resolved(InitArgs::generate_minimal_config())).unwrap();
        assert_eq!(config.tenants.len(), 1);
        assert_eq!(config.details.batch_size, 400);
    }

    #[test]
    fn test_generated_config_with_examples_is_valid() {
        let config =
            parse_config(&resolved(InitArgs::generate_config_with_examples())).unwrap();
        assert_eq!(config.report.preview_rows, 20);
        assert_eq!(config.http.retry.max_attempts, 3);
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fleetpull.toml");
        fs::write(&path, "existing").unwrap();

        let args = InitArgs {
            output: path.to_string_lossy().to_string(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), EXIT_CONFIG);
        assert_eq!(fs::read_to_string(&path).unwrap(), "existing");
    }

    #[tokio::test]
    async fn test_init_writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fleetpull.toml");

        let args = InitArgs {
            output: path.to_string_lossy().to_string(),
            with_examples: true,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), EXIT_SUCCESS);
        assert!(fs::read_to_string(&path).unwrap().contains("[tenants.acme]"));
    }
}
