// Fleetpull - Tenant inventory acquisition pipeline
// Copyright (c) 2025 Fleetpull Contributors
// Licensed under the MIT License

//! # Fleetpull - multi-tenant inventory acquisition
//!
//! Fleetpull pulls the full host inventory of a tenant from a REST inventory
//! API and turns it into a flat table that can be filtered, summarized and
//! exported.
//!
//! ## Overview
//!
//! - **Authenticating** with the OAuth2 client-credentials grant
//! - **Enumerating** every host identifier with offset or scroll pagination
//! - **Fetching** host details in bounded batches
//! - **Flattening** nested detail records into dotted-path columns
//! - **Filtering** and **summarizing** the resulting table
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Pipeline, flattening, filters and summary
//! - [`adapters`] - HTTP client and the inventory REST API
//! - [`domain`] - Identifiers, table model and error types
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fleetpull::config::load_config;
//! use fleetpull::core::filter::{apply_filter, Predicate};
//! use fleetpull::core::pipeline::AcquisitionPipeline;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("fleetpull.toml")?;
//!     let (key, tenant) = config.select_tenant(Some("acme"))?;
//!
//!     let pipeline = AcquisitionPipeline::from_config(&config)?;
//!     let acquisition = pipeline.run(&key, tenant).await?;
//!
//!     let windows = apply_filter(
//!         &acquisition.table,
//!         "platform_name",
//!         &Predicate::OneOf(vec!["Windows".into()]),
//!     );
//!     println!("{} Windows hosts", windows.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every stage returns [`domain::InventoryError`]. A failed detail batch
//! still hands back the rows fetched before it:
//!
//! ```rust,no_run
//! use fleetpull::domain::InventoryError;
//!
//! fn report(err: &InventoryError) {
//!     if let Some(partial) = err.partial_table() {
//!         eprintln!("kept {} rows before the failure", partial.len());
//!     }
//! }
//! ```
//!
//! ## Concurrency
//!
//! Requests are issued one at a time. The tokio runtime only drives I/O;
//! there are no background tasks and no shared state between runs.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
