//! Tabular inventory model
//!
//! An [`EntityRecord`] is one flattened entity: dotted field path → scalar
//! JSON value. A [`ResultTable`] is an ordered sequence of records whose
//! column set is the union of every key seen, in first-seen order.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

/// One flattened entity row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityRecord(BTreeMap<String, Value>);

impl EntityRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Set a field, replacing any previous value
    pub fn insert(&mut self, path: impl Into<String>, value: Value) {
        self.0.insert(path.into(), value);
    }

    /// Value stored at a field path
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.0.get(path)
    }

    /// Whether the record has the field at all (null counts as present)
    pub fn contains(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    /// Iterate fields in path order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Field paths in path order
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for EntityRecord {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Ordered rows with a union column set
///
/// Rows lacking a column read as null. Row order is insertion order; the
/// table is never re-sorted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    columns: Vec<String>,
    known: HashSet<String>,
    rows: Vec<EntityRecord>,
}

static NULL: Value = Value::Null;

impl ResultTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from records, preserving their order
    pub fn from_records(records: impl IntoIterator<Item = EntityRecord>) -> Self {
        let mut table = Self::new();
        for record in records {
            table.push(record);
        }
        table
    }

    /// Append a row, registering any new columns
    pub fn push(&mut self, record: EntityRecord) {
        for key in record.keys() {
            if !self.known.contains(key) {
                self.known.insert(key.clone());
                self.columns.push(key.clone());
            }
        }
        self.rows.push(record);
    }

    /// Append all rows of another table
    pub fn extend(&mut self, other: ResultTable) {
        for record in other.rows {
            self.push(record);
        }
    }

    /// Build a table with the same column set holding only matching rows
    pub fn retain_rows<F>(&self, mut keep: F) -> ResultTable
    where
        F: FnMut(&EntityRecord) -> bool,
    {
        ResultTable {
            columns: self.columns.clone(),
            known: self.known.clone(),
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }

    /// Column names in first-seen order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.known.contains(column)
    }

    pub fn rows(&self) -> &[EntityRecord] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<EntityRecord> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell value; missing cells of known rows read as null
    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        self.rows
            .get(row)
            .map(|record| record.get(column).unwrap_or(&NULL))
    }

    /// All values of one column in row order, nulls included
    pub fn column_values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.rows
            .iter()
            .map(move |record| record.get(column).unwrap_or(&NULL))
    }

    /// First `n` rows as a new table
    pub fn head(&self, n: usize) -> ResultTable {
        ResultTable::from_records(self.rows.iter().take(n).cloned())
    }
}

impl Serialize for ResultTable {
    /// Serialized as an array of row objects with every column present
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeSeq;

        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for record in &self.rows {
            seq.serialize_element(&RowView {
                columns: &self.columns,
                record,
            })?;
        }
        seq.end()
    }
}

/// One row written in table column order
struct RowView<'a> {
    columns: &'a [String],
    record: &'a EntityRecord,
}

impl Serialize for RowView<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for column in self.columns {
            map.serialize_entry(column, self.record.get(column).unwrap_or(&NULL))?;
        }
        map.end()
    }
}
