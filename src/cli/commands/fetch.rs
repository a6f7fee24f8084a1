//! Fetch command implementation
//!
//! Runs the acquisition pipeline for one tenant, applies `--filter`
//! expressions and writes the resulting table as a JSON array of rows.

use super::{prepare, report_error, write_json};
use crate::cli::{EXIT_FATAL, EXIT_SUCCESS};
use crate::core::filter::apply_all;
use crate::core::pipeline::AcquisitionPipeline;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the fetch command
#[derive(Args, Debug, Default)]
pub struct FetchArgs {
    /// Tenant key; may be omitted when only one tenant is configured
    #[arg(short, long)]
    pub tenant: Option<String>,

    /// Row filter, repeatable: `column=a,b` or `column=lo..hi`
    #[arg(short, long = "filter", value_name = "FILTER")]
    pub filters: Vec<String>,

    /// Write JSON to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pretty-print JSON
    #[arg(long)]
    pub pretty: bool,

    /// On a failed detail batch, still write the rows fetched so far
    #[arg(long)]
    pub allow_partial: bool,
}

impl FetchArgs {
    /// Execute the fetch command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting fetch command");

        let prepared = match prepare(config_path, self.tenant.as_deref(), &self.filters) {
            Ok(p) => p,
            Err(code) => return Ok(code),
        };
        let Some(tenant) = prepared.config.tenant(&prepared.tenant_key) else {
            return Ok(EXIT_FATAL);
        };

        let pipeline = match AcquisitionPipeline::from_config(&prepared.config) {
            Ok(p) => p,
            Err(e) => return Ok(report_error(&e)),
        };

        match pipeline.run(&prepared.tenant_key, tenant).await {
            Ok(acquisition) => {
                let table = apply_all(&acquisition.table, &prepared.filters);
                write_json(&table, self.output.as_deref(), self.pretty)?;

                eprintln!(
                    "✅ {}: {} ids listed, {} rows fetched, {} rows after filters ({:.2}s)",
                    tenant.display_name,
                    acquisition.ids_listed,
                    acquisition.table.len(),
                    table.len(),
                    acquisition.duration.as_secs_f64()
                );
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                let code = report_error(&e);
                if let (true, Some(partial)) = (self.allow_partial, e.partial_table()) {
                    let table = apply_all(partial, &prepared.filters);
                    write_json(&table, self.output.as_deref(), self.pretty)?;
                    eprintln!("⚠️  Wrote {} rows from the batches that succeeded", table.len());
                }
                Ok(code)
            }
        }
    }
}
