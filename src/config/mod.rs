//! Configuration management for fleetpull.
//!
//! TOML configuration with:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `FLEETPULL_*` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! Tenant credentials are plain configuration values handed to the
//! pipeline by reference; nothing in the library reads them from
//! process-wide state.
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [tenants.acme]
//! display_name = "ACME Corp"
//! base_url = "https://api.us-2.example.com"
//! client_id = "0123456789abcdef"
//! client_secret = "${ACME_CLIENT_SECRET}"
//!
//! [listing]
//! mode = "scroll"
//! limit = 5000
//!
//! [details]
//! method = "post"
//! batch_size = 400
//! ```
//!
//! # Loading
//!
//! ```rust,no_run
//! use fleetpull::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("fleetpull.toml")?;
//! for key in config.tenant_keys() {
//!     println!("tenant: {key}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, DetailConfig, DetailMethod, Environment, HttpConfig, InventoryConfig,
    ListingConfig, ListingMode, LoggingConfig, ReportConfig, RetryConfig, TenantConfig,
    MAX_DETAIL_BATCH_SIZE,
};
pub use secret::{secret_string, SecretString, SecretValue};
