//! Inventory API abstraction
//!
//! The pipeline talks to the REST service only through [`InventoryApi`], so
//! tests and alternative backends can stand in for [`RestInventoryApi`].
//!
//! [`RestInventoryApi`]: super::RestInventoryApi

use crate::config::TenantConfig;
use crate::domain::{AccessToken, EntityId, Result, ResultTable};
use async_trait::async_trait;

/// Operations of a multi-tenant inventory service
///
/// Every call receives the tenant explicitly; implementations keep no
/// per-tenant state between calls and never cache tokens.
#[async_trait]
pub trait InventoryApi: Send + Sync {
    /// Obtain a bearer token with the client-credentials grant
    ///
    /// # Errors
    ///
    /// [`AuthError::Rejected`] for a final status other than 200/201,
    /// [`AuthError::MalformedTokenResponse`] when the body lacks a token.
    ///
    /// [`AuthError::Rejected`]: crate::domain::AuthError::Rejected
    /// [`AuthError::MalformedTokenResponse`]: crate::domain::AuthError::MalformedTokenResponse
    async fn acquire_token(&self, tenant: &TenantConfig) -> Result<AccessToken>;

    /// Enumerate every entity identifier of the tenant, in server order
    async fn list_all_ids(&self, tenant: &TenantConfig, token: &AccessToken)
        -> Result<Vec<EntityId>>;

    /// Fetch and flatten the detail records of `ids`
    ///
    /// An empty `ids` slice yields an empty table without any request.
    async fn fetch_details(
        &self,
        tenant: &TenantConfig,
        token: &AccessToken,
        ids: &[EntityId],
    ) -> Result<ResultTable>;

    /// Short name of the listing strategy, for logging
    fn listing_mode(&self) -> &str;
}
