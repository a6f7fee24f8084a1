//! Acquisition pipeline - sequences token, listing and detail fetch
//!
//! One run handles one tenant. The token is acquired at the start of the run
//! and dropped at the end; nothing is carried over to the next run.

use crate::adapters::inventory::{InventoryApi, RestInventoryApi};
use crate::config::{InventoryConfig, TenantConfig};
use crate::domain::{Result, ResultTable, TenantKey};
use crate::{log_acquisition_complete, log_acquisition_start, log_error_with_context};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct Acquisition {
    pub tenant_key: TenantKey,

    /// Number of identifiers returned by the listing stage
    pub ids_listed: usize,

    /// Flattened detail records, in retrieval order
    pub table: ResultTable,

    pub duration: Duration,
}

/// Runs the acquisition stages against an [`InventoryApi`]
pub struct AcquisitionPipeline {
    api: Arc<dyn InventoryApi>,
}

impl AcquisitionPipeline {
    pub fn new(api: Arc<dyn InventoryApi>) -> Self {
        Self { api }
    }

    /// Pipeline over the REST API described by `config`
    pub fn from_config(config: &InventoryConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(RestInventoryApi::from_config(config)?)))
    }

    /// Acquire the full inventory of one tenant
    ///
    /// Stops at the first failing stage and returns its error unchanged. An
    /// authentication failure therefore never reaches the listing endpoint.
    pub async fn run(&self, key: &TenantKey, tenant: &TenantConfig) -> Result<Acquisition> {
        let started = Instant::now();
        log_acquisition_start!(key, self.api.listing_mode());

        let token = self.api.acquire_token(tenant).await.map_err(|e| {
            log_error_with_context!(&e, "token acquisition failed");
            e
        })?;

        let ids = self.api.list_all_ids(tenant, &token).await.map_err(|e| {
            log_error_with_context!(&e, "identifier listing failed");
            e
        })?;

        let table = self
            .api
            .fetch_details(tenant, &token, &ids)
            .await
            .map_err(|e| {
                log_error_with_context!(&e, "detail fetch failed");
                e
            })?;

        let duration = started.elapsed();
        log_acquisition_complete!(key, ids.len(), table.len(), duration);

        Ok(Acquisition {
            tenant_key: key.clone(),
            ids_listed: ids.len(),
            table,
            duration,
        })
    }
}
