//! Core logic for fleetpull.
//!
//! # Modules
//!
//! - [`pipeline`] - Acquisition orchestration (token, listing, details)
//! - [`normalize`] - Flattening of nested detail resources into rows
//! - [`filter`] - Equality, membership and range filters over a table
//! - [`summary`] - Executive summary figures of an inventory
//!
//! # Acquisition Workflow
//!
//! 1. **Authenticate**: client-credentials token for the tenant
//! 2. **List**: every entity id, page by page
//! 3. **Fetch**: detail records in bounded batches
//! 4. **Flatten**: nested resources become dotted-path columns
//! 5. **Filter / Summarize**: pure functions over the resulting table
//!
//! # Example
//!
//! ```rust,no_run
//! use fleetpull::config::load_config;
//! use fleetpull::core::pipeline::AcquisitionPipeline;
//! use fleetpull::core::summary::summarize;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("fleetpull.toml")?;
//! let (key, tenant) = config.select_tenant(Some("acme"))?;
//!
//! let pipeline = AcquisitionPipeline::from_config(&config)?;
//! let acquisition = pipeline.run(&key, tenant).await?;
//!
//! let summary = summarize(&acquisition.table, &tenant.display_name, &config.report);
//! println!("Total hosts: {}", summary.total_entities);
//! # Ok(())
//! # }
//! ```

pub mod filter;
pub mod normalize;
pub mod pipeline;
pub mod summary;
