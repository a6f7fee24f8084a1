//! REST implementation of [`InventoryApi`]
//!
//! Endpoints, relative to the tenant's `base_url`:
//!
//! | Stage   | Request                                                        |
//! |---------|----------------------------------------------------------------|
//! | Token   | `POST /oauth2/token` (form: client id, secret, grant type)     |
//! | Listing | `GET {listing.path}?limit=L&offset=N` or `...&offset=<token>`  |
//! | Details | `GET {details.path}?ids=a&ids=b` or `POST {"ids": [...]}`     |
//!
//! All requests go through the shared [`ApiClient`] and are issued one at a
//! time.

use super::api::InventoryApi;
use super::models::{page_ids, DetailPage, DetailsRequest, IdPage, TokenRequest, TokenResponse};
use crate::adapters::http::{error_for_status, read_text, ApiClient};
use crate::config::{
    secret_string, DetailConfig, DetailMethod, InventoryConfig, ListingConfig, ListingMode,
    TenantConfig, MAX_DETAIL_BATCH_SIZE,
};
use crate::core::normalize::flatten_resource;
use crate::domain::{
    AccessToken, AuthError, EntityId, InventoryError, PartialBatchFailure, Result, ResultTable,
};
use crate::log_batch_processing;
use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::ExposeSecret;

/// Inventory API over HTTPS
#[derive(Debug, Clone)]
pub struct RestInventoryApi {
    http: ApiClient,
    listing: ListingConfig,
    details: DetailConfig,
}

impl RestInventoryApi {
    pub fn new(http: ApiClient, listing: ListingConfig, details: DetailConfig) -> Self {
        Self {
            http,
            listing,
            details,
        }
    }

    /// Build the client and API from a loaded configuration
    pub fn from_config(config: &InventoryConfig) -> Result<Self> {
        Ok(Self::new(
            ApiClient::new(&config.http)?,
            config.listing.clone(),
            config.details.clone(),
        ))
    }

    async fn request_token(&self, tenant: &TenantConfig) -> Result<AccessToken> {
        let url = format!("{}/oauth2/token", tenant.api_root());
        let client_secret = tenant.client_secret.expose_secret();
        let form = TokenRequest {
            client_id: &tenant.client_id,
            client_secret: client_secret.as_ref(),
            grant_type: "client_credentials",
        };

        tracing::debug!(tenant = %tenant.display_name, "Requesting access token");

        let response = self
            .http
            .send("token", |client| {
                client
                    .post(&url)
                    .timeout(self.http.auth_timeout())
                    .form(&form)
            })
            .await?;

        let status = response.status();
        let body = read_text(response).await?;

        if status != StatusCode::OK && status != StatusCode::CREATED {
            tracing::error!(
                tenant = %tenant.display_name,
                status = status.as_u16(),
                "Token request rejected"
            );
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let parsed = TokenResponse::parse(&body)?;
        let token = AccessToken::new(
            secret_string(parsed.access_token),
            parsed.token_type,
            parsed.expires_in,
        );

        tracing::info!(
            tenant = %tenant.display_name,
            expires_in = ?token.expires_in,
            "Access token acquired"
        );

        Ok(token)
    }

    async fn fetch_id_page(
        &self,
        tenant: &TenantConfig,
        token: &AccessToken,
        query: &[(&str, String)],
    ) -> Result<IdPage> {
        let url = format!("{}{}", tenant.api_root(), self.listing.endpoint_path());

        let response = self
            .http
            .send("list_ids", |client| {
                client
                    .get(&url)
                    .timeout(self.http.request_timeout())
                    .bearer_auth(token.secret())
                    .query(query)
            })
            .await?;

        let body = read_text(error_for_status(response).await?).await?;
        serde_json::from_str(&body)
            .map_err(|e| InventoryError::InvalidResponse(format!("listing page: {e}")))
    }

    /// Offset mode: advance by the number of ids received until an empty page
    async fn list_by_offset(
        &self,
        tenant: &TenantConfig,
        token: &AccessToken,
    ) -> Result<Vec<EntityId>> {
        let mut ids = Vec::new();
        let mut offset = 0usize;
        let mut pages = 0usize;

        loop {
            if pages >= self.listing.max_pages {
                return Err(InventoryError::PaginationNonTermination {
                    pages,
                    cap: self.listing.max_pages,
                });
            }
            pages += 1;

            let query = [
                ("offset", offset.to_string()),
                ("limit", self.listing.limit.to_string()),
            ];
            let page = self.fetch_id_page(tenant, token, &query).await?;
            let total = page.reported_total();
            let (listed, received) = page_ids(page.into_resources());

            tracing::debug!(
                page = pages,
                offset = offset,
                received = received,
                total = ?total,
                "Listed id page"
            );

            if received == 0 {
                break;
            }
            offset += received;
            ids.extend(listed);
        }

        Ok(ids)
    }

    /// Scroll mode: echo `meta.pagination.offset` until the server stops sending one
    async fn list_by_scroll(
        &self,
        tenant: &TenantConfig,
        token: &AccessToken,
    ) -> Result<Vec<EntityId>> {
        let mut ids = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;

        loop {
            if pages >= self.listing.max_pages {
                return Err(InventoryError::PaginationNonTermination {
                    pages,
                    cap: self.listing.max_pages,
                });
            }
            pages += 1;

            let mut query = vec![("limit", self.listing.limit.to_string())];
            if let Some(scroll) = &cursor {
                query.push(("offset", scroll.clone()));
            }

            let page = self.fetch_id_page(tenant, token, &query).await?;
            let next = page.next_scroll_token();
            let total = page.reported_total();
            let (listed, received) = page_ids(page.into_resources());

            tracing::debug!(
                page = pages,
                received = received,
                total = ?total,
                has_next = next.is_some(),
                "Listed id page"
            );

            ids.extend(listed);

            match next {
                Some(scroll) if received > 0 => cursor = Some(scroll),
                _ => break,
            }
        }

        Ok(ids)
    }

    async fn fetch_batch(
        &self,
        tenant: &TenantConfig,
        token: &AccessToken,
        batch: &[EntityId],
    ) -> Result<ResultTable> {
        let url = format!("{}{}", tenant.api_root(), self.details.path);
        let timeout = self.http.request_timeout();

        let response = match self.details.method {
            DetailMethod::Get => {
                let query: Vec<(&str, &str)> = batch.iter().map(|id| ("ids", id.as_str())).collect();
                self.http
                    .send("fetch_details", |client| {
                        client
                            .get(&url)
                            .timeout(timeout)
                            .bearer_auth(token.secret())
                            .query(&query)
                    })
                    .await?
            }
            DetailMethod::Post => {
                let body = DetailsRequest { ids: batch };
                self.http
                    .send("fetch_details", |client| {
                        client
                            .post(&url)
                            .timeout(timeout)
                            .bearer_auth(token.secret())
                            .json(&body)
                    })
                    .await?
            }
        };

        let body = read_text(error_for_status(response).await?).await?;
        let page: DetailPage = serde_json::from_str(&body)
            .map_err(|e| InventoryError::InvalidResponse(format!("detail page: {e}")))?;

        let mut rows = ResultTable::new();
        for resource in page.into_resources() {
            rows.push(flatten_resource(&resource)?);
        }
        Ok(rows)
    }
}

#[async_trait]
impl InventoryApi for RestInventoryApi {
    async fn acquire_token(&self, tenant: &TenantConfig) -> Result<AccessToken> {
        self.request_token(tenant).await
    }

    async fn list_all_ids(
        &self,
        tenant: &TenantConfig,
        token: &AccessToken,
    ) -> Result<Vec<EntityId>> {
        let ids = match self.listing.mode {
            ListingMode::Offset => self.list_by_offset(tenant, token).await?,
            ListingMode::Scroll => self.list_by_scroll(tenant, token).await?,
        };

        tracing::info!(
            tenant = %tenant.display_name,
            ids = ids.len(),
            "Identifier listing complete"
        );

        Ok(ids)
    }

    async fn fetch_details(
        &self,
        tenant: &TenantConfig,
        token: &AccessToken,
        ids: &[EntityId],
    ) -> Result<ResultTable> {
        if ids.is_empty() {
            tracing::warn!(tenant = %tenant.display_name, "No ids to fetch, skipping detail requests");
            return Ok(ResultTable::new());
        }

        let batch_size = self.details.batch_size.clamp(1, MAX_DETAIL_BATCH_SIZE);
        let total_batches = ids.len().div_ceil(batch_size);
        let mut table = ResultTable::new();

        for (index, batch) in ids.chunks(batch_size).enumerate() {
            let batch_index = index + 1;
            log_batch_processing!(batch_index, total_batches, batch.len());

            match self.fetch_batch(tenant, token, batch).await {
                Ok(rows) => table.extend(rows),
                Err(cause) => {
                    tracing::error!(
                        tenant = %tenant.display_name,
                        batch = batch_index,
                        total_batches = total_batches,
                        rows_accumulated = table.len(),
                        error = %cause,
                        "Detail batch failed"
                    );
                    return Err(PartialBatchFailure {
                        batch_index,
                        total_batches,
                        rows_accumulated: table.len(),
                        partial: table,
                        cause: Box::new(cause),
                    }
                    .into());
                }
            }
        }

        tracing::info!(
            tenant = %tenant.display_name,
            batches = total_batches,
            rows = table.len(),
            "Detail fetch complete"
        );

        Ok(table)
    }

    fn listing_mode(&self) -> &str {
        match self.listing.mode {
            ListingMode::Offset => "offset",
            ListingMode::Scroll => "scroll",
        }
    }
}
