//! Configuration schema types
//!
//! This module defines the configuration structure that maps to the TOML file.

use crate::config::SecretString;
use crate::domain::ids::TenantKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Runtime environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    #[default]
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    Production,
}

/// Main fleetpull configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: Environment,

    /// Tenants keyed by tenant key (`[tenants.<key>]`)
    #[serde(default)]
    pub tenants: BTreeMap<String, TenantConfig>,

    /// HTTP transport settings shared by every outbound call
    #[serde(default)]
    pub http: HttpConfig,

    /// Identifier listing settings
    #[serde(default)]
    pub listing: ListingConfig,

    /// Detail fetch settings
    #[serde(default)]
    pub details: DetailConfig,

    /// Inventory summary settings
    #[serde(default)]
    pub report: ReportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl InventoryConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid or if no
    /// tenant is configured.
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;

        if self.tenants.is_empty() {
            return Err("at least one [tenants.<key>] section is required".to_string());
        }
        for (key, tenant) in &self.tenants {
            TenantKey::new(key.as_str())?;
            tenant
                .validate(&self.environment)
                .map_err(|e| format!("tenants.{key}: {e}"))?;
        }

        self.http.validate(&self.environment)?;
        self.listing.validate()?;
        self.details.validate()?;
        self.report.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Look up a tenant by key
    pub fn tenant(&self, key: &TenantKey) -> Option<&TenantConfig> {
        self.tenants.get(key.as_str())
    }

    /// Resolve the tenant to operate on
    ///
    /// With an explicit key the tenant must exist; without one the
    /// configuration must hold exactly one tenant.
    pub fn select_tenant(&self, key: Option<&str>) -> Result<(TenantKey, &TenantConfig), String> {
        match key {
            Some(key) => {
                let key = TenantKey::new(key)?;
                let tenant = self.tenant(&key).ok_or_else(|| {
                    format!(
                        "Unknown tenant '{key}'. Configured tenants: {}",
                        self.tenant_keys().join(", ")
                    )
                })?;
                Ok((key, tenant))
            }
            None => {
                let mut iter = self.tenants.iter();
                match (iter.next(), iter.next()) {
                    (Some((key, tenant)), None) => Ok((TenantKey::new(key.as_str())?, tenant)),
                    (None, _) => Err("No tenants configured".to_string()),
                    _ => Err(format!(
                        "Multiple tenants configured, select one with --tenant: {}",
                        self.tenant_keys().join(", ")
                    )),
                }
            }
        }
    }

    /// Configured tenant keys in sorted order
    pub fn tenant_keys(&self) -> Vec<String> {
        self.tenants.keys().cloned().collect()
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Credentials and endpoint of one tenant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantConfig {
    /// Human-readable tenant name used in summaries
    pub display_name: String,

    /// API root, e.g. `https://api.us-2.example.com`
    pub base_url: String,

    /// OAuth2 client id
    pub client_id: String,

    /// OAuth2 client secret
    /// Stored securely in memory and automatically zeroized on drop
    pub client_secret: SecretString,
}

impl TenantConfig {
    fn validate(&self, environment: &Environment) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.display_name.trim().is_empty() {
            return Err("display_name cannot be empty".to_string());
        }

        let url = url::Url::parse(&self.base_url)
            .map_err(|e| format!("base_url '{}' is not a valid URL: {e}", self.base_url))?;

        match url.scheme() {
            "https" => {}
            "http" if *environment != Environment::Production => {
                tracing::warn!(
                    base_url = %self.base_url,
                    "Tenant base_url uses plain HTTP; credentials are sent unencrypted"
                );
            }
            "http" => {
                return Err(
                    "base_url must use https:// in production environments".to_string()
                );
            }
            other => {
                return Err(format!(
                    "base_url must start with http:// or https://, got scheme '{other}'"
                ));
            }
        }

        if self.client_id.trim().is_empty() {
            return Err("client_id cannot be empty".to_string());
        }

        if self.client_secret.expose_secret().is_empty() {
            return Err("client_secret cannot be empty".to_string());
        }

        Ok(())
    }

    /// Base URL without a trailing slash
    pub fn api_root(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

/// Retry configuration shared by every outbound request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per request, the first one included
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 || self.max_attempts > 10 {
            return Err(format!(
                "http.retry.max_attempts must be between 1 and 10, got {}",
                self.max_attempts
            ));
        }
        if self.backoff_multiplier < 1.0 {
            return Err(format!(
                "http.retry.backoff_multiplier must be >= 1.0, got {}",
                self.backoff_multiplier
            ));
        }
        if self.initial_delay_ms > self.max_delay_ms {
            return Err(format!(
                "http.retry.initial_delay_ms ({}) cannot exceed max_delay_ms ({})",
                self.initial_delay_ms, self.max_delay_ms
            ));
        }
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

/// HTTP transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Timeout for token requests, in seconds
    #[serde(default = "default_auth_timeout_seconds")]
    pub auth_timeout_seconds: u64,

    /// Timeout for listing and detail requests, in seconds
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,

    /// TCP connect timeout, in seconds
    #[serde(default = "default_connect_timeout_seconds")]
    pub connect_timeout_seconds: u64,

    /// TLS certificate verification enabled
    ///
    /// **SECURITY WARNING**: only disable in development. Rejected in production.
    #[serde(default = "default_true")]
    pub tls_verify: bool,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

impl HttpConfig {
    fn validate(&self, environment: &Environment) -> Result<(), String> {
        if self.auth_timeout_seconds == 0 || self.request_timeout_seconds == 0 {
            return Err("http timeouts must be > 0".to_string());
        }
        if self.connect_timeout_seconds == 0 {
            return Err("http.connect_timeout_seconds must be > 0".to_string());
        }
        if *environment == Environment::Production && !self.tls_verify {
            return Err(
                "TLS certificate verification cannot be disabled in production environments"
                    .to_string(),
            );
        }
        self.retry.validate()
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            auth_timeout_seconds: default_auth_timeout_seconds(),
            request_timeout_seconds: default_request_timeout_seconds(),
            connect_timeout_seconds: default_connect_timeout_seconds(),
            tls_verify: true,
            retry: RetryConfig::default(),
        }
    }
}

/// Pagination style of the listing endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ListingMode {
    /// Increasing `offset` until an empty page
    #[default]
    Offset,
    /// Opaque scroll token echoed back until the server stops sending one
    Scroll,
}

impl std::fmt::Display for ListingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListingMode::Offset => write!(f, "offset"),
            ListingMode::Scroll => write!(f, "scroll"),
        }
    }
}

impl std::str::FromStr for ListingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "offset" => Ok(ListingMode::Offset),
            "scroll" | "cursor" => Ok(ListingMode::Scroll),
            _ => Err(format!(
                "Invalid listing mode: {s}. Expected 'offset' or 'scroll'"
            )),
        }
    }
}

/// Identifier listing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Pagination style
    #[serde(default)]
    pub mode: ListingMode,

    /// Endpoint path; defaults depend on the mode
    #[serde(default)]
    pub path: Option<String>,

    /// Page size requested from the server
    #[serde(default = "default_listing_limit")]
    pub limit: usize,

    /// Safety cap on the number of page requests
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

impl ListingConfig {
    fn validate(&self) -> Result<(), String> {
        if !(1..=10_000).contains(&self.limit) {
            return Err(format!(
                "listing.limit must be between 1 and 10000, got {}",
                self.limit
            ));
        }
        if self.max_pages == 0 {
            return Err("listing.max_pages must be > 0".to_string());
        }
        if let Some(path) = &self.path {
            if !path.starts_with('/') {
                return Err(format!("listing.path must start with '/', got '{path}'"));
            }
        }
        Ok(())
    }

    /// Effective endpoint path
    pub fn endpoint_path(&self) -> &str {
        match (&self.path, self.mode) {
            (Some(path), _) => path,
            (None, ListingMode::Offset) => "/devices/queries/devices/v1",
            (None, ListingMode::Scroll) => "/devices/queries/devices-scroll/v1",
        }
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            mode: ListingMode::default(),
            path: None,
            limit: default_listing_limit(),
            max_pages: default_max_pages(),
        }
    }
}

/// How ids are sent to the detail endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DetailMethod {
    /// `GET ?ids=a&ids=b`
    Get,
    /// `POST {"ids": [...]}`
    #[default]
    Post,
}

/// Detail fetch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailConfig {
    /// Endpoint path
    #[serde(default = "default_details_path")]
    pub path: String,

    /// Request style
    #[serde(default)]
    pub method: DetailMethod,

    /// Ids per request, bounded by the upstream maximum
    #[serde(default = "default_details_batch_size")]
    pub batch_size: usize,
}

impl DetailConfig {
    fn validate(&self) -> Result<(), String> {
        if !(1..=MAX_DETAIL_BATCH_SIZE).contains(&self.batch_size) {
            return Err(format!(
                "details.batch_size must be between 1 and {MAX_DETAIL_BATCH_SIZE}, got {}",
                self.batch_size
            ));
        }
        if !self.path.starts_with('/') {
            return Err(format!(
                "details.path must start with '/', got '{}'",
                self.path
            ));
        }
        Ok(())
    }
}

impl Default for DetailConfig {
    fn default() -> Self {
        Self {
            path: default_details_path(),
            method: DetailMethod::default(),
            batch_size: default_details_batch_size(),
        }
    }
}

/// Upper bound accepted by the detail endpoint
pub const MAX_DETAIL_BATCH_SIZE: usize = 500;

/// Inventory summary configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Columns summarized with distinct count and value distribution
    #[serde(default = "default_breakdown_columns")]
    pub breakdown_columns: Vec<String>,

    /// Boolean columns summarized by the number of `true` cells
    #[serde(default = "default_flag_columns")]
    pub flag_columns: Vec<String>,

    /// Rows included in the preview
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

impl ReportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.preview_rows > 1000 {
            return Err(format!(
                "report.preview_rows must be <= 1000, got {}",
                self.preview_rows
            ));
        }
        Ok(())
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            breakdown_columns: default_breakdown_columns(),
            flag_columns: default_flag_columns(),
            preview_rows: default_preview_rows(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_auth_timeout_seconds() -> u64 {
    20
}

fn default_request_timeout_seconds() -> u64 {
    60
}

fn default_connect_timeout_seconds() -> u64 {
    10
}

fn default_max_attempts() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    10_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_listing_limit() -> usize {
    500
}

fn default_max_pages() -> usize {
    10_000
}

fn default_details_path() -> String {
    "/devices/entities/devices/v2".to_string()
}

fn default_details_batch_size() -> usize {
    400
}

fn default_breakdown_columns() -> Vec<String> {
    vec!["os_version".to_string(), "agent_version".to_string()]
}

fn default_flag_columns() -> Vec<String> {
    vec![
        "rfm_enabled".to_string(),
        "tamper_protection_enabled".to_string(),
    ]
}

fn default_preview_rows() -> usize {
    20
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
