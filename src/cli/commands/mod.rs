//! CLI command implementations
//!
//! `fetch` and `summary` share the acquisition helpers defined here.

pub mod fetch;
pub mod init;
pub mod summary;
pub mod tenants;
pub mod validate;

use crate::cli::exit_code_for;
use crate::config::{load_config, InventoryConfig};
use crate::core::filter::{parse_filters, FilterSpec};
use crate::domain::{InventoryError, TenantKey};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Everything `fetch` and `summary` need before the first request
pub(crate) struct Prepared {
    pub config: InventoryConfig,
    pub tenant_key: TenantKey,
    pub filters: Vec<FilterSpec>,
}

/// Load configuration, resolve the tenant and parse filters
///
/// On failure the error is reported on stderr and the exit code returned.
pub(crate) fn prepare(
    config_path: &str,
    tenant: Option<&str>,
    raw_filters: &[String],
) -> std::result::Result<Prepared, i32> {
    let config = load_config(config_path).map_err(|e| report_error(&e))?;

    let (tenant_key, _) = config
        .select_tenant(tenant)
        .map_err(|e| report_error(&InventoryError::Configuration(e)))?;

    let filters = parse_filters(raw_filters).map_err(|e| report_error(&e))?;

    Ok(Prepared {
        config,
        tenant_key,
        filters,
    })
}

/// Log and print an error, returning its exit code
pub(crate) fn report_error(error: &InventoryError) -> i32 {
    tracing::error!(error = %error, "Command failed");
    eprintln!("❌ {error}");
    exit_code_for(error)
}

/// Write a value as JSON to `output`, or stdout when absent
pub(crate) fn write_json<T: Serialize>(
    value: &T,
    output: Option<&Path>,
    pretty: bool,
) -> anyhow::Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };

    match output {
        Some(path) => {
            std::fs::write(path, json + "\n")?;
            tracing::info!(path = %path.display(), "Output written");
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{json}")?;
            handle.flush()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_write_json_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");

        write_json(&json!({"a": 1}), Some(&path), false).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "{\"a\":1}\n");
    }

    #[test]
    fn test_prepare_reports_missing_config() {
        let result = prepare("does-not-exist.toml", None, &[]);
        assert_eq!(result.err(), Some(crate::cli::EXIT_CONFIG));
    }
}
