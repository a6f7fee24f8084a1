//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::InventoryConfig;
use super::secret_string;
use crate::domain::errors::InventoryError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`InventoryConfig`]
/// 4. Applies environment variable overrides (`FLEETPULL_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`InventoryError::Configuration`] if the file cannot be read,
/// a referenced variable is unset, parsing fails or validation fails.
///
/// # Examples
///
/// ```no_run
/// use fleetpull::config::loader::load_config;
///
/// let config = load_config("fleetpull.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<InventoryConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(InventoryError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        InventoryError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let config = parse_config(&contents)?;

    tracing::debug!(
        path = %path.display(),
        tenants = config.tenants.len(),
        "Configuration loaded"
    );

    Ok(config)
}

/// Parses and validates configuration from TOML text
///
/// Same pipeline as [`load_config`] minus the file read.
pub fn parse_config(contents: &str) -> Result<InventoryConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: InventoryConfig = toml::from_str(&contents)
        .map_err(|e| InventoryError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        InventoryError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are copied untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| InventoryError::Configuration(format!("Invalid placeholder pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&cap[0], &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(InventoryError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Environment variable prefix for a tenant key
///
/// `acme-emea` → `FLEETPULL_TENANT_ACME_EMEA_`
fn tenant_env_prefix(key: &str) -> String {
    format!(
        "FLEETPULL_TENANT_{}_",
        key.to_ascii_uppercase().replace('-', "_")
    )
}

/// Applies environment variable overrides using the `FLEETPULL_*` prefix
///
/// Variables follow `FLEETPULL_<SECTION>_<KEY>`, e.g. `FLEETPULL_LISTING_MODE`.
/// Tenant credentials use `FLEETPULL_TENANT_<KEY>_<FIELD>`.
fn apply_env_overrides(config: &mut InventoryConfig) -> Result<()> {
    if let Ok(val) = std::env::var("FLEETPULL_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    for (key, tenant) in config.tenants.iter_mut() {
        let prefix = tenant_env_prefix(key);
        if let Ok(val) = std::env::var(format!("{prefix}BASE_URL")) {
            tenant.base_url = val;
        }
        if let Ok(val) = std::env::var(format!("{prefix}CLIENT_ID")) {
            tenant.client_id = val;
        }
        if let Ok(val) = std::env::var(format!("{prefix}CLIENT_SECRET")) {
            tenant.client_secret = secret_string(val);
        }
    }

    // HTTP overrides
    if let Ok(val) = std::env::var("FLEETPULL_HTTP_REQUEST_TIMEOUT_SECONDS") {
        if let Ok(secs) = val.parse() {
            config.http.request_timeout_seconds = secs;
        }
    }
    if let Ok(val) = std::env::var("FLEETPULL_HTTP_RETRY_MAX_ATTEMPTS") {
        if let Ok(attempts) = val.parse() {
            config.http.retry.max_attempts = attempts;
        }
    }
    if let Ok(val) = std::env::var("FLEETPULL_HTTP_TLS_VERIFY") {
        config.http.tls_verify = val.parse().unwrap_or(true);
    }

    // Listing overrides
    if let Ok(val) = std::env::var("FLEETPULL_LISTING_MODE") {
        config.listing.mode = val.parse().map_err(InventoryError::Configuration)?;
    }
    if let Ok(val) = std::env::var("FLEETPULL_LISTING_LIMIT") {
        if let Ok(limit) = val.parse() {
            config.listing.limit = limit;
        }
    }
    if let Ok(val) = std::env::var("FLEETPULL_LISTING_MAX_PAGES") {
        if let Ok(cap) = val.parse() {
            config.listing.max_pages = cap;
        }
    }

    // Detail overrides
    if let Ok(val) = std::env::var("FLEETPULL_DETAILS_BATCH_SIZE") {
        if let Ok(size) = val.parse() {
            config.details.batch_size = size;
        }
    }

    // Logging overrides
    if let Ok(val) = std::env::var("FLEETPULL_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("FLEETPULL_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("FLEETPULL_LOADER_TEST_VAR", "test_value");
        let input = "client_secret = \"${FLEETPULL_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "client_secret = \"test_value\"\n");
        std::env::remove_var("FLEETPULL_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("FLEETPULL_LOADER_MISSING_VAR");
        let input = "client_secret = \"${FLEETPULL_LOADER_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("FLEETPULL_LOADER_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        std::env::remove_var("FLEETPULL_LOADER_COMMENTED_VAR");
        let input = "# client_secret = \"${FLEETPULL_LOADER_COMMENTED_VAR}\"";
        assert!(substitute_env_vars(input).is_ok());
    }

    #[test]
    fn test_tenant_env_prefix() {
        assert_eq!(tenant_env_prefix("acme-emea"), "FLEETPULL_TENANT_ACME_EMEA_");
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(matches!(result, Err(InventoryError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "info"

[tenants.loadertest]
display_name = "Loader Test"
base_url = "https://api.example.com"
client_id = "client"
client_secret = "secret"

[details]
batch_size = 250
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.tenants.len(), 1);
        assert_eq!(config.tenants["loadertest"].display_name, "Loader Test");
        assert_eq!(config.details.batch_size, 250);
    }
}
