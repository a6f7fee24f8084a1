//! Summary command implementation
//!
//! Same acquisition as `fetch`, but writes the inventory summary (totals,
//! distributions, flag counts, preview) instead of the full table.

use super::{prepare, report_error, write_json};
use crate::cli::{EXIT_FATAL, EXIT_SUCCESS};
use crate::core::filter::apply_all;
use crate::core::pipeline::AcquisitionPipeline;
use crate::core::summary::summarize;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the summary command
#[derive(Args, Debug, Default)]
pub struct SummaryArgs {
    /// Tenant key; may be omitted when only one tenant is configured
    #[arg(short, long)]
    pub tenant: Option<String>,

    /// Row filter applied before summarizing, repeatable
    #[arg(short, long = "filter", value_name = "FILTER")]
    pub filters: Vec<String>,

    /// Number of preview rows, overrides `report.preview_rows`
    #[arg(long)]
    pub preview_rows: Option<usize>,

    /// Write JSON to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pretty-print JSON
    #[arg(long)]
    pub pretty: bool,
}

impl SummaryArgs {
    /// Execute the summary command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting summary command");

        let mut prepared = match prepare(config_path, self.tenant.as_deref(), &self.filters) {
            Ok(p) => p,
            Err(code) => return Ok(code),
        };
        if let Some(rows) = self.preview_rows {
            prepared.config.report.preview_rows = rows;
        }
        let Some(tenant) = prepared.config.tenant(&prepared.tenant_key) else {
            return Ok(EXIT_FATAL);
        };

        let pipeline = match AcquisitionPipeline::from_config(&prepared.config) {
            Ok(p) => p,
            Err(e) => return Ok(report_error(&e)),
        };

        let acquisition = match pipeline.run(&prepared.tenant_key, tenant).await {
            Ok(a) => a,
            Err(e) => return Ok(report_error(&e)),
        };

        let table = apply_all(&acquisition.table, &prepared.filters);
        let summary = summarize(&table, &tenant.display_name, &prepared.config.report);
        write_json(&summary, self.output.as_deref(), self.pretty)?;

        eprintln!(
            "✅ {}: {} hosts summarized ({:.2}s)",
            tenant.display_name,
            summary.total_entities,
            acquisition.duration.as_secs_f64()
        );
        Ok(EXIT_SUCCESS)
    }
}
