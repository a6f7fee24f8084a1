//! Domain error types
//!
//! This module defines the error hierarchy for fleetpull. Every stage of the
//! acquisition pipeline surfaces one of these typed errors to its caller;
//! none of them is swallowed or converted into an empty result.
//! Third-party HTTP client types never leak through these enums.

use super::table::ResultTable;
use thiserror::Error;

/// Main fleetpull error type
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Token acquisition failed
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Timeout or connection failure (eligible for automatic retry)
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Non-2xx response after retries were exhausted
    #[error("API error: {status} - {body}")]
    Api { status: u16, body: String },

    /// Response body did not have the expected shape
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// The listing endpoint kept returning pages past the safety cap
    #[error("Pagination did not terminate: {pages} pages requested, cap is {cap}")]
    PaginationNonTermination { pages: usize, cap: usize },

    /// A detail batch failed after earlier batches succeeded
    #[error(transparent)]
    PartialBatchFailure(Box<PartialBatchFailure>),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl InventoryError {
    /// Whether retrying the whole operation could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            InventoryError::Transport(_) => true,
            InventoryError::Api { status, .. } => {
                matches!(status, 429 | 500 | 502 | 503 | 504)
            }
            InventoryError::PartialBatchFailure(failure) => failure.cause.is_retryable(),
            _ => false,
        }
    }

    /// Returns the partially assembled table if this is a batch failure
    pub fn partial_table(&self) -> Option<&ResultTable> {
        match self {
            InventoryError::PartialBatchFailure(failure) => Some(&failure.partial),
            _ => None,
        }
    }
}

/// Token acquisition errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Token endpoint answered with a status other than 200/201
    #[error("token request rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Token endpoint answered 200/201 but without a usable access token
    #[error("malformed token response: {0}")]
    MalformedTokenResponse(String),
}

/// Transport-level errors
#[derive(Debug, Error)]
pub enum TransportError {
    /// Request exceeded its timeout
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Could not connect to the server
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Any other failure while sending the request or reading the body
    #[error("request failed: {0}")]
    Request(String),
}

/// Detail fetch aborted part-way through
///
/// Carries the rows assembled from the batches that did succeed so the
/// caller can decide whether to proceed with a degraded inventory.
#[derive(Debug, Error)]
#[error(
    "detail batch {batch_index}/{total_batches} failed after {rows_accumulated} rows were fetched: {cause}"
)]
pub struct PartialBatchFailure {
    /// 1-based index of the failed batch
    pub batch_index: usize,

    /// Number of batches the id list was split into
    pub total_batches: usize,

    /// Rows already accumulated from earlier batches
    pub rows_accumulated: usize,

    /// Table holding only the rows of the successful batches
    pub partial: ResultTable,

    /// Underlying failure of the batch request
    #[source]
    pub cause: Box<InventoryError>,
}

impl From<PartialBatchFailure> for InventoryError {
    fn from(failure: PartialBatchFailure) -> Self {
        InventoryError::PartialBatchFailure(Box::new(failure))
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for InventoryError {
    fn from(err: std::io::Error) -> Self {
        InventoryError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for InventoryError {
    fn from(err: serde_json::Error) -> Self {
        InventoryError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for InventoryError {
    fn from(err: toml::de::Error) -> Self {
        InventoryError::Configuration(format!("TOML parse error: {err}"))
    }
}
