//! Bearer access token
//!
//! Tokens are short-lived and owned by the operation that acquired them.
//! They are never cached between pipeline runs.

use crate::config::SecretString;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;

/// OAuth2 access token obtained with the client-credentials grant
#[derive(Debug, Clone)]
pub struct AccessToken {
    value: SecretString,

    /// When the token endpoint answered
    pub obtained_at: DateTime<Utc>,

    /// Token type reported by the server (usually "bearer")
    pub token_type: String,

    /// Lifetime reported by the server, in seconds
    pub expires_in: Option<u64>,
}

impl AccessToken {
    /// Create a token obtained now
    pub fn new(value: SecretString, token_type: impl Into<String>, expires_in: Option<u64>) -> Self {
        Self {
            value,
            obtained_at: Utc::now(),
            token_type: token_type.into(),
            expires_in,
        }
    }

    /// Raw token value, for the `Authorization` header only
    pub fn secret(&self) -> &str {
        self.value.expose_secret().as_ref()
    }

    /// Expiry instant derived from `expires_in`, if the server sent one
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_in
            .map(|secs| self.obtained_at + chrono::Duration::seconds(secs as i64))
    }
}
