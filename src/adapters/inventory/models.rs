//! Wire models of the inventory REST API
//!
//! Responses share one envelope:
//!
//! ```json
//! {
//!   "meta": {"pagination": {"offset": "FQluY2x1ZGVf...", "limit": 500, "total": 1200}},
//!   "resources": [...],
//!   "errors": []
//! }
//! ```
//!
//! `resources` holds identifier strings on listing endpoints and detail
//! objects on entity endpoints. `meta.pagination.offset` is a number in
//! offset mode and an opaque string in scroll mode.

use crate::domain::{AuthError, EntityId, InventoryError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub meta: ResponseMeta,

    /// Absent and `null` both mean "no resources"
    #[serde(default)]
    pub resources: Option<Vec<T>>,

    #[serde(default)]
    pub errors: Option<Vec<ApiErrorEntry>>,
}

impl<T> ApiEnvelope<T> {
    pub fn into_resources(self) -> Vec<T> {
        self.resources.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseMeta {
    #[serde(default)]
    pub pagination: Option<Pagination>,

    #[serde(default)]
    pub query_time: Option<f64>,

    #[serde(default)]
    pub trace_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub offset: Option<Value>,

    #[serde(default)]
    pub limit: Option<u64>,

    #[serde(default)]
    pub total: Option<u64>,
}

/// Error entry reported inside an envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorEntry {
    #[serde(default)]
    pub code: Option<i64>,

    #[serde(default)]
    pub message: String,
}

/// One page of identifiers
pub type IdPage = ApiEnvelope<String>;

impl IdPage {
    /// Scroll token for the next page, if the server sent a usable one
    pub fn next_scroll_token(&self) -> Option<String> {
        match self.meta.pagination.as_ref()?.offset.as_ref()? {
            Value::String(token) if !token.trim().is_empty() => Some(token.clone()),
            _ => None,
        }
    }

    /// Total reported by the server, for logging only
    pub fn reported_total(&self) -> Option<u64> {
        self.meta.pagination.as_ref()?.total
    }
}

/// Identifiers of a page, blank entries dropped
///
/// Returns the parsed ids and the number of raw entries received.
pub fn page_ids(resources: Vec<String>) -> (Vec<EntityId>, usize) {
    let received = resources.len();
    let mut ids = Vec::with_capacity(received);
    let mut skipped = 0usize;

    for raw in resources {
        match EntityId::new(raw) {
            Ok(id) => ids.push(id),
            Err(_) => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::warn!(skipped = skipped, "Skipped blank identifiers in listing page");
    }

    (ids, received)
}

/// One page of detail resources
pub type DetailPage = ApiEnvelope<Value>;

/// Body of a POST detail request
#[derive(Debug, Serialize)]
pub struct DetailsRequest<'a> {
    pub ids: &'a [EntityId],
}

/// Token endpoint form body
#[derive(Debug, Serialize)]
pub struct TokenRequest<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub grant_type: &'a str,
}

/// Token fields extracted from a 200/201 response
#[derive(Debug)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: Option<u64>,
}

impl TokenResponse {
    /// Extract the token from a response body
    ///
    /// # Errors
    ///
    /// [`AuthError::MalformedTokenResponse`] when the body is not JSON or
    /// `access_token` is missing, empty or not a string.
    pub fn parse(body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body).map_err(|e| {
            InventoryError::from(AuthError::MalformedTokenResponse(format!(
                "body is not JSON: {e}"
            )))
        })?;

        let access_token = match value.get("access_token") {
            Some(Value::String(token)) if !token.is_empty() => token.clone(),
            Some(Value::String(_)) => {
                return Err(AuthError::MalformedTokenResponse(
                    "access_token is empty".to_string(),
                )
                .into())
            }
            Some(_) => {
                return Err(AuthError::MalformedTokenResponse(
                    "access_token is not a string".to_string(),
                )
                .into())
            }
            None => {
                return Err(AuthError::MalformedTokenResponse(
                    "access_token field is missing".to_string(),
                )
                .into())
            }
        };

        Ok(Self {
            access_token,
            token_type: value
                .get("token_type")
                .and_then(Value::as_str)
                .unwrap_or("bearer")
                .to_string(),
            expires_in: value.get("expires_in").and_then(Value::as_u64),
        })
    }
}
