//! Row filtering over a [`ResultTable`]
//!
//! Filters are pure: the input table is never touched and the output keeps
//! its full column set. A filter on a column the table does not have is a
//! no-op. Null cells and cells of the wrong type never match.

use crate::domain::{InventoryError, Result, ResultTable};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Value accepted by a membership predicate
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Bool(bool),
}

impl FilterValue {
    fn matches(&self, cell: &Value) -> bool {
        match (self, cell) {
            (FilterValue::Text(expected), Value::String(actual)) => expected == actual,
            (FilterValue::Bool(expected), Value::Bool(actual)) => expected == actual,
            _ => false,
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Text(s.to_string())
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        FilterValue::Bool(b)
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Text(s) => write!(f, "{s}"),
            FilterValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Condition a cell must satisfy for its row to be kept
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Cell equals one of the values
    OneOf(Vec<FilterValue>),

    /// Numeric cell within `[min, max]`; a missing bound is open
    Range { min: Option<f64>, max: Option<f64> },
}

impl Predicate {
    /// Whether a single cell satisfies the predicate
    pub fn matches(&self, cell: &Value) -> bool {
        match self {
            Predicate::OneOf(values) => values.iter().any(|v| v.matches(cell)),
            Predicate::Range { min, max } => match cell.as_f64() {
                Some(n) => min.map_or(true, |lo| n >= lo) && max.map_or(true, |hi| n <= hi),
                None => false,
            },
        }
    }
}

/// Keep the rows whose `column` cell satisfies `predicate`
///
/// # Examples
///
/// ```
/// use fleetpull::core::filter::{apply_filter, Predicate};
/// use fleetpull::domain::{EntityRecord, ResultTable};
/// use serde_json::json;
///
/// let table = ResultTable::from_records([
///     [("os".to_string(), json!("Windows"))].into_iter().collect::<EntityRecord>(),
///     [("os".to_string(), json!("Linux"))].into_iter().collect::<EntityRecord>(),
/// ]);
///
/// let windows = apply_filter(&table, "os", &Predicate::OneOf(vec!["Windows".into()]));
/// assert_eq!(windows.len(), 1);
/// ```
pub fn apply_filter(table: &ResultTable, column: &str, predicate: &Predicate) -> ResultTable {
    if !table.has_column(column) {
        tracing::debug!(column = column, "Filter column not present, table unchanged");
        return table.clone();
    }

    table.retain_rows(|row| row.get(column).is_some_and(|cell| predicate.matches(cell)))
}

/// A filter in its command-line form
///
/// - `column=a,b,c` keeps rows whose cell is one of the values;
///   `true` and `false` are read as booleans
/// - `column=lo..hi` keeps rows whose numeric cell is in range;
///   either bound may be omitted (`cpu_count=4..`)
///
/// A value is only read as a range when every bound present is a number,
/// so `hostname=web..prod` is a membership filter.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    pub column: String,
    pub predicate: Predicate,
}

impl FilterSpec {
    pub fn apply(&self, table: &ResultTable) -> ResultTable {
        apply_filter(table, &self.column, &self.predicate)
    }
}

impl FromStr for FilterSpec {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (column, expr) = s
            .split_once('=')
            .ok_or_else(|| format!("filter '{s}' must have the form column=value"))?;

        let column = column.trim();
        if column.is_empty() {
            return Err(format!("filter '{s}' has an empty column name"));
        }

        let range = expr
            .split_once("..")
            .and_then(|(lo, hi)| Some((parse_bound(lo)?, parse_bound(hi)?)));

        let predicate = match range {
            Some((min, max)) => {
                if min.is_none() && max.is_none() {
                    return Err(format!("range filter '{s}' needs at least one bound"));
                }
                if let (Some(lo), Some(hi)) = (min, max) {
                    if lo > hi {
                        return Err(format!("range filter '{s}' has min greater than max"));
                    }
                }
                Predicate::Range { min, max }
            }
            None => {
                let values: Vec<FilterValue> = expr
                    .split(',')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(|v| match v {
                        "true" => FilterValue::Bool(true),
                        "false" => FilterValue::Bool(false),
                        text => FilterValue::Text(text.to_string()),
                    })
                    .collect();
                if values.is_empty() {
                    return Err(format!("filter '{s}' has no values"));
                }
                Predicate::OneOf(values)
            }
        };

        Ok(FilterSpec {
            column: column.to_string(),
            predicate,
        })
    }
}

/// `Some(None)` for an open bound, `None` when the text is not a number
fn parse_bound(raw: &str) -> Option<Option<f64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(None);
    }
    raw.parse::<f64>().ok().map(Some)
}

/// Apply filters one after the other
pub fn apply_all(table: &ResultTable, filters: &[FilterSpec]) -> ResultTable {
    filters
        .iter()
        .fold(table.clone(), |current, filter| filter.apply(&current))
}

/// Parse a list of textual filters
///
/// # Errors
///
/// Returns [`InventoryError::Validation`] naming the first malformed filter.
pub fn parse_filters<S: AsRef<str>>(raw: &[S]) -> Result<Vec<FilterSpec>> {
    raw.iter()
        .map(|s| s.as_ref().parse().map_err(InventoryError::Validation))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntityRecord;
    use serde_json::json;
    use test_case::test_case;

    fn hosts() -> ResultTable {
        let rows = [
            json!({"hostname": "a", "os": "Windows", "rfm": false, "cpu": 4}),
            json!({"hostname": "b", "os": "Linux", "rfm": true, "cpu": 16}),
            json!({"hostname": "c", "os": "Windows", "rfm": true, "cpu": 8}),
            json!({"hostname": "d", "os": null, "cpu": "eight"}),
        ];
        ResultTable::from_records(rows.iter().map(|r| {
            r.as_object()
                .unwrap()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<EntityRecord>()
        }))
    }

    fn hostnames(table: &ResultTable) -> Vec<&str> {
        table
            .column_values("hostname")
            .filter_map(Value::as_str)
            .collect()
    }

    #[test]
    fn test_one_of_text() {
        let out = apply_filter(&hosts(), "os", &Predicate::OneOf(vec!["Windows".into()]));
        assert_eq!(hostnames(&out), ["a", "c"]);
    }

    #[test]
    fn test_one_of_bool() {
        let out = apply_filter(&hosts(), "rfm", &Predicate::OneOf(vec![true.into()]));
        assert_eq!(hostnames(&out), ["b", "c"]);
    }

    #[test]
    fn test_bool_does_not_match_text() {
        let out = apply_filter(&hosts(), "rfm", &Predicate::OneOf(vec!["true".into()]));
        assert!(out.is_empty());
    }

    #[test]
    fn test_range_is_inclusive_and_skips_non_numeric() {
        let predicate = Predicate::Range {
            min: Some(8.0),
            max: Some(16.0),
        };
        let out = apply_filter(&hosts(), "cpu", &predicate);
        assert_eq!(hostnames(&out), ["b", "c"]);
    }

    #[test]
    fn test_open_range() {
        let predicate = Predicate::Range {
            min: None,
            max: Some(4.0),
        };
        let out = apply_filter(&hosts(), "cpu", &predicate);
        assert_eq!(hostnames(&out), ["a"]);
    }

    #[test]
    fn test_null_never_matches() {
        let predicate = Predicate::OneOf(vec!["Windows".into(), "Linux".into()]);
        let out = apply_filter(&hosts(), "os", &predicate);
        assert!(!hostnames(&out).contains(&"d"));
    }

    #[test]
    fn test_unknown_column_returns_copy() {
        let table = hosts();
        let out = apply_filter(&table, "nope", &Predicate::OneOf(vec!["x".into()]));
        assert_eq!(out, table);
    }

    #[test]
    fn test_output_keeps_columns_and_input_untouched() {
        let table = hosts();
        let before = table.clone();
        let out = apply_filter(&table, "os", &Predicate::OneOf(vec!["Linux".into()]));
        assert_eq!(out.columns(), table.columns());
        assert_eq!(table, before);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let predicate = Predicate::OneOf(vec!["Windows".into()]);
        let once = apply_filter(&hosts(), "os", &predicate);
        let twice = apply_filter(&once, "os", &predicate);
        assert_eq!(once, twice);
    }

    #[test_case("os=Windows", "os", Predicate::OneOf(vec![FilterValue::Text("Windows".into())]) ; "single value")]
    #[test_case("os=Windows,Linux", "os", Predicate::OneOf(vec![FilterValue::Text("Windows".into()), FilterValue::Text("Linux".into())]) ; "value list")]
    #[test_case("rfm=true", "rfm", Predicate::OneOf(vec![FilterValue::Bool(true)]) ; "boolean")]
    #[test_case("cpu=4..16", "cpu", Predicate::Range { min: Some(4.0), max: Some(16.0) } ; "closed range")]
    #[test_case("cpu=4..", "cpu", Predicate::Range { min: Some(4.0), max: None } ; "open max")]
    #[test_case("cpu=..2.5", "cpu", Predicate::Range { min: None, max: Some(2.5) } ; "open min")]
    #[test_case("hostname=web..prod", "hostname", Predicate::OneOf(vec![FilterValue::Text("web..prod".into())]) ; "dotted text")]
    #[test_case("version=7..x,7.1", "version", Predicate::OneOf(vec![FilterValue::Text("7..x".into()), FilterValue::Text("7.1".into())]) ; "half numeric text")]
    fn test_filter_spec_parse(input: &str, column: &str, predicate: Predicate) {
        let spec: FilterSpec = input.parse().unwrap();
        assert_eq!(spec.column, column);
        assert_eq!(spec.predicate, predicate);
    }

    #[test_case("os" ; "missing equals")]
    #[test_case("=Windows" ; "empty column")]
    #[test_case("os=" ; "no values")]
    #[test_case("cpu=.." ; "no bounds")]
    #[test_case("cpu=9..1" ; "inverted")]
    fn test_filter_spec_rejects(input: &str) {
        assert!(input.parse::<FilterSpec>().is_err());
    }

    #[test]
    fn test_apply_all_composes() {
        let filters = parse_filters(&["os=Windows", "rfm=true"]).unwrap();
        let out = apply_all(&hosts(), &filters);
        assert_eq!(hostnames(&out), ["c"]);
    }

    #[test]
    fn test_parse_filters_reports_validation_error() {
        let err = parse_filters(&["broken"]).unwrap_err();
        assert!(matches!(err, InventoryError::Validation(_)));
    }
}
