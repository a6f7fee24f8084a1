//! Domain models and types for fleetpull.
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`EntityId`], [`TenantKey`])
//! - **Tabular model** ([`EntityRecord`], [`ResultTable`])
//! - **Access token** ([`AccessToken`])
//! - **Error types** ([`InventoryError`], [`AuthError`], [`TransportError`], [`PartialBatchFailure`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T>`]:
//!
//! ```rust
//! use fleetpull::domain::{InventoryError, Result};
//!
//! fn example() -> Result<()> {
//!     let _config = fleetpull::config::load_config("fleetpull.toml")?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod ids;
pub mod result;
pub mod table;
pub mod token;

// Re-export commonly used types for convenience
pub use errors::{AuthError, InventoryError, PartialBatchFailure, TransportError};
pub use ids::{EntityId, TenantKey};
pub use result::Result;
pub use table::{EntityRecord, ResultTable};
pub use token::AccessToken;
