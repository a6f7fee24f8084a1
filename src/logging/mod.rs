//! Logging and observability
//!
//! Structured logging on top of `tracing`:
//! - Human-readable console output on stderr
//! - Optional JSON log file with rotation
//! - Level from configuration, overridable with `RUST_LOG`
//!
//! Secrets (client secrets, bearer tokens) are never passed to these macros.
//!
//! # Example
//!
//! ```no_run
//! use fleetpull::logging::init_logging;
//! use fleetpull::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(tenant = "acme", "Acquisition started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a tenant acquisition
///
/// # Example
///
/// ```no_run
/// use fleetpull::log_acquisition_start;
/// use fleetpull::domain::TenantKey;
///
/// let tenant = TenantKey::new("acme").unwrap();
/// log_acquisition_start!(&tenant, "scroll");
/// ```
#[macro_export]
macro_rules! log_acquisition_start {
    ($tenant:expr, $mode:expr) => {
        tracing::info!(
            tenant = %$tenant,
            listing_mode = %$mode,
            "Starting acquisition"
        );
    };
}

/// Log the completion of a tenant acquisition
///
/// # Example
///
/// ```no_run
/// use fleetpull::log_acquisition_complete;
/// use std::time::Duration;
///
/// log_acquisition_complete!("acme", 120, 118, Duration::from_secs(4));
/// ```
#[macro_export]
macro_rules! log_acquisition_complete {
    ($tenant:expr, $ids:expr, $rows:expr, $duration:expr) => {
        tracing::info!(
            tenant = %$tenant,
            ids_listed = $ids,
            rows = $rows,
            duration_ms = $duration.as_millis() as u64,
            "Acquisition completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use fleetpull::log_error_with_context;
/// use fleetpull::domain::InventoryError;
///
/// let error = InventoryError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log a detail batch about to be requested
///
/// `current` is 1-based.
#[macro_export]
macro_rules! log_batch_processing {
    ($current:expr, $total:expr, $size:expr) => {
        tracing::debug!(
            batch = $current,
            total_batches = $total,
            batch_size = $size,
            progress_pct = ($current as f64 / $total as f64 * 100.0),
            "Fetching detail batch"
        );
    };
}

/// Log a retry attempt and the delay before it
///
/// # Example
///
/// ```no_run
/// use fleetpull::log_retry_attempt;
/// use std::time::Duration;
///
/// log_retry_attempt!(1, 3, "listing: HTTP 503", Duration::from_millis(500));
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr, $delay:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = %$reason,
            delay_ms = $delay.as_millis() as u64,
            "Retrying request"
        );
    };
}
