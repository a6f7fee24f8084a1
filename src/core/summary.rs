//! Executive summary of an acquired inventory
//!
//! Computes the figures a report or dashboard needs (totals, value
//! distributions, flag counts and a row preview) as plain serializable data.
//! Rendering is left to whoever consumes the JSON.

use crate::config::ReportConfig;
use crate::domain::{EntityRecord, ResultTable};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Summary of one tenant's inventory
#[derive(Debug, Clone, Serialize)]
pub struct InventorySummary {
    pub tenant: String,
    pub generated_at: DateTime<Utc>,
    pub total_entities: usize,
    pub breakdowns: Vec<ColumnBreakdown>,
    pub flags: Vec<FlagCount>,
    pub preview: ResultTable,
}

/// Distribution of the values of one column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnBreakdown {
    pub column: String,
    pub distinct: usize,
    pub distribution: Vec<ValueCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Number of rows where a boolean column is `true`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlagCount {
    pub column: String,
    pub enabled: usize,
}

impl InventorySummary {
    pub fn breakdown(&self, column: &str) -> Option<&ColumnBreakdown> {
        self.breakdowns.iter().find(|b| b.column == column)
    }

    pub fn flag(&self, column: &str) -> Option<&FlagCount> {
        self.flags.iter().find(|f| f.column == column)
    }
}

/// Summarize a table
///
/// Columns named in `report` but absent from the table produce zero counts
/// rather than an error.
pub fn summarize(table: &ResultTable, tenant: &str, report: &ReportConfig) -> InventorySummary {
    let breakdowns = report
        .breakdown_columns
        .iter()
        .map(|column| breakdown(table, column))
        .collect();

    let flags = report
        .flag_columns
        .iter()
        .map(|column| FlagCount {
            column: column.clone(),
            enabled: table
                .column_values(column)
                .filter(|v| matches!(v, Value::Bool(true)))
                .count(),
        })
        .collect();

    InventorySummary {
        tenant: tenant.to_string(),
        generated_at: Utc::now(),
        total_entities: table.len(),
        breakdowns,
        flags,
        preview: table.head(report.preview_rows),
    }
}

fn breakdown(table: &ResultTable, column: &str) -> ColumnBreakdown {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for row in table.rows() {
        if let Some(label) = cell_label(row, column) {
            *counts.entry(label).or_insert(0) += 1;
        }
    }

    let mut distribution: Vec<ValueCount> = counts
        .into_iter()
        .map(|(value, count)| ValueCount { value, count })
        .collect();
    distribution.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));

    ColumnBreakdown {
        column: column.to_string(),
        distinct: distribution.len(),
        distribution,
    }
}

/// Text used to group a cell; nulls are not counted
fn cell_label(row: &EntityRecord, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
