//! External system integrations for fleetpull.
//!
//! - [`http`] - shared HTTP client with the retry policy applied to every request
//! - [`inventory`] - the multi-tenant inventory REST API
//!
//! # Design Pattern
//!
//! Adapters isolate the network from the rest of the crate. The pipeline in
//! [`crate::core`] only sees the [`inventory::InventoryApi`] trait, so tests
//! can substitute a mock server or an in-memory implementation.
//!
//! ```rust,no_run
//! use fleetpull::adapters::inventory::{InventoryApi, RestInventoryApi};
//! use fleetpull::config::load_config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("fleetpull.toml")?;
//! let api = RestInventoryApi::from_config(&config)?;
//! let (_, tenant) = config.select_tenant(None)?;
//! let token = api.acquire_token(tenant).await?;
//! let ids = api.list_all_ids(tenant, &token).await?;
//! let table = api.fetch_details(tenant, &token, &ids).await?;
//! println!("{} rows", table.len());
//! # Ok(())
//! # }
//! ```

pub mod http;
pub mod inventory;
