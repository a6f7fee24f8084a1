//! Shared HTTP client with uniform retry policy
//!
//! Every outbound call (token, listing, details) goes through [`ApiClient::send`],
//! which retries transient failures with bounded attempts and exponential
//! backoff:
//!
//! - HTTP 429, 500, 502, 503 and 504
//! - request timeouts and connection failures
//!
//! Any other status is handed back to the caller untouched; interpreting it
//! is the caller's job.

use crate::config::{HttpConfig, RetryConfig};
use crate::domain::{InventoryError, Result, TransportError};
use crate::log_retry_attempt;
use rand::Rng;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, ClientBuilder, RequestBuilder, Response, StatusCode};
use std::time::Duration;

/// Statuses retried by the shared client
pub const RETRYABLE_STATUSES: [StatusCode; 5] = [
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

/// HTTP client shared by every stage of the pipeline
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    retry: RetryConfig,
    auth_timeout: Duration,
    request_timeout: Duration,
}

impl ApiClient {
    /// Build the client from transport configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the TLS backend cannot be initialized.
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let mut builder = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .user_agent(concat!("fleetpull/", env!("CARGO_PKG_VERSION")));

        if !config.tls_verify {
            tracing::warn!(
                "TLS certificate verification is DISABLED. Only use this against development servers."
            );
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().map_err(|e| {
            InventoryError::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            retry: config.retry.clone(),
            auth_timeout: Duration::from_secs(config.auth_timeout_seconds),
            request_timeout: Duration::from_secs(config.request_timeout_seconds),
        })
    }

    /// Timeout applied to token requests
    pub fn auth_timeout(&self) -> Duration {
        self.auth_timeout
    }

    /// Timeout applied to listing and detail requests
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Send a request, retrying transient failures
    ///
    /// `build` is invoked once per attempt so every retry sends a fresh
    /// request. `operation` only labels log events.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::Transport`] when the last attempt failed
    /// below HTTP. A response with a retryable status is returned as-is once
    /// the attempts are exhausted.
    pub async fn send<F>(&self, operation: &str, build: F) -> Result<Response>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            match build(&self.client).send().await {
                Ok(response) => {
                    let status = response.status();
                    if !is_retryable_status(status) || attempt >= max_attempts {
                        return Ok(response);
                    }

                    let retry_after = parse_retry_after(&response);
                    let delay = with_jitter(backoff_delay(&self.retry, attempt, retry_after));
                    log_retry_attempt!(
                        attempt,
                        max_attempts,
                        format!("{operation}: HTTP {status}"),
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    let error = classify_transport_error(&e);
                    let retryable = matches!(
                        error,
                        TransportError::Timeout(_) | TransportError::ConnectionFailed(_)
                    );
                    if !retryable || attempt >= max_attempts {
                        tracing::error!(
                            operation = operation,
                            attempt = attempt,
                            error = %error,
                            "Request failed"
                        );
                        return Err(error.into());
                    }

                    let delay = with_jitter(backoff_delay(&self.retry, attempt, None));
                    log_retry_attempt!(
                        attempt,
                        max_attempts,
                        format!("{operation}: {error}"),
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

/// Whether the shared client retries this status
pub fn is_retryable_status(status: StatusCode) -> bool {
    RETRYABLE_STATUSES.contains(&status)
}

/// Delay before retry number `attempt` (1-based), without jitter
///
/// `initial * multiplier^(attempt - 1)`, raised to the server's
/// `Retry-After` when present, capped at `max_delay_ms`.
pub fn backoff_delay(retry: &RetryConfig, attempt: usize, retry_after: Option<Duration>) -> Duration {
    let exponent = attempt.saturating_sub(1) as i32;
    let computed = retry.initial_delay_ms as f64 * retry.backoff_multiplier.powi(exponent);
    let computed_ms = computed.min(retry.max_delay_ms as f64) as u64;

    let delay_ms = match retry_after {
        Some(server) => computed_ms.max(server.as_millis() as u64),
        None => computed_ms,
    };

    Duration::from_millis(delay_ms.min(retry.max_delay_ms))
}

/// Add up to 10% random jitter
fn with_jitter(delay: Duration) -> Duration {
    let max_jitter = (delay.as_millis() as u64) / 10;
    if max_jitter == 0 {
        return delay;
    }
    delay + Duration::from_millis(rand::thread_rng().gen_range(0..=max_jitter))
}

/// `Retry-After` in delta-seconds form
fn parse_retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn classify_transport_error(e: &reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else if e.is_connect() {
        TransportError::ConnectionFailed(e.to_string())
    } else {
        TransportError::Request(e.to_string())
    }
}

/// Turn a non-2xx response into [`InventoryError::Api`]
pub async fn error_for_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(InventoryError::Api {
        status: status.as_u16(),
        body,
    })
}

/// Read the whole body as text
pub async fn read_text(response: Response) -> Result<String> {
    response
        .text()
        .await
        .map_err(|e| classify_transport_error(&e).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn retry(initial: u64, max: u64) -> RetryConfig {
        RetryConfig {
            max_attempts: 4,
            initial_delay_ms: initial,
            max_delay_ms: max,
            backoff_multiplier: 2.0,
        }
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(is_retryable_status(StatusCode::GATEWAY_TIMEOUT));
        assert!(!is_retryable_status(StatusCode::FORBIDDEN));
        assert!(!is_retryable_status(StatusCode::NOT_FOUND));
        assert!(!is_retryable_status(StatusCode::NOT_IMPLEMENTED));
    }

    #[test]
    fn test_backoff_is_exponential() {
        let config = retry(500, 10_000);
        assert_eq!(backoff_delay(&config, 1, None), Duration::from_millis(500));
        assert_eq!(backoff_delay(&config, 2, None), Duration::from_millis(1000));
        assert_eq!(backoff_delay(&config, 3, None), Duration::from_millis(2000));
    }

    #[test]
    fn test_backoff_is_capped() {
        let config = retry(500, 1500);
        assert_eq!(backoff_delay(&config, 5, None), Duration::from_millis(1500));
    }

    #[test]
    fn test_backoff_honors_retry_after_within_cap() {
        let config = retry(100, 5000);
        assert_eq!(
            backoff_delay(&config, 1, Some(Duration::from_secs(2))),
            Duration::from_secs(2)
        );
        assert_eq!(
            backoff_delay(&config, 1, Some(Duration::from_secs(60))),
            Duration::from_millis(5000)
        );
    }

    #[test]
    fn test_jitter_stays_within_ten_percent() {
        let base = Duration::from_millis(1000);
        for _ in 0..50 {
            let jittered = with_jitter(base);
            assert!(jittered >= base);
            assert!(jittered <= Duration::from_millis(1100));
        }
    }

    #[test]
    fn test_api_client_builds_from_defaults() {
        let client = ApiClient::new(&HttpConfig::default()).unwrap();
        assert_eq!(client.auth_timeout(), Duration::from_secs(20));
        assert_eq!(client.request_timeout(), Duration::from_secs(60));
    }
}
