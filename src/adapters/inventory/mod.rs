//! Inventory REST API integration
//!
//! - [`api`] - the [`InventoryApi`] trait the pipeline depends on
//! - [`rest`] - [`RestInventoryApi`], the HTTPS implementation
//! - [`models`] - wire envelopes and request bodies

pub mod api;
pub mod models;
pub mod rest;

pub use api::InventoryApi;
pub use rest::RestInventoryApi;
