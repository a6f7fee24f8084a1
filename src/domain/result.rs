//! Result type alias for fleetpull
//!
//! This module provides a convenient Result type alias that uses
//! `InventoryError` as the error type.

use super::errors::InventoryError;

/// Result type alias for fleetpull operations
///
/// # Examples
///
/// ```
/// use fleetpull::domain::result::Result;
/// use fleetpull::domain::errors::InventoryError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(InventoryError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, InventoryError>;
