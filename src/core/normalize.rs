//! Flattening of nested detail resources into table rows
//!
//! Every leaf value of a resource becomes one cell keyed by its dotted path:
//!
//! - nested objects join their keys with `.` (`device_policies.prevention.applied`)
//! - array elements use their index as a path segment (`tags.0`, `policies.1.id`)
//! - an empty object or empty array becomes a single null cell at its own path
//!
//! Two leaves that land on the same path (`{"a": {"b": 1}, "a.b": 2}`) make
//! the resource invalid rather than one overwriting the other.
//!
//! Scalars are copied unchanged, so text, numbers, booleans and nulls keep
//! their JSON type.

use crate::domain::{EntityRecord, InventoryError, Result, ResultTable};
use serde_json::Value;

/// Separator between path segments
pub const PATH_SEPARATOR: char = '.';

/// Flatten one detail resource into a row
///
/// # Errors
///
/// Returns [`InventoryError::InvalidResponse`] if the resource is not a JSON
/// object or two of its fields flatten to the same path.
///
/// # Examples
///
/// ```
/// use fleetpull::core::normalize::flatten_resource;
/// use serde_json::json;
///
/// let row = flatten_resource(&json!({
///     "device_id": "a",
///     "os": {"name": "Windows", "build": 22631},
///     "tags": ["prod", "eu"]
/// })).unwrap();
///
/// assert_eq!(row.get("os.name"), Some(&json!("Windows")));
/// assert_eq!(row.get("tags.1"), Some(&json!("eu")));
/// ```
pub fn flatten_resource(resource: &Value) -> Result<EntityRecord> {
    let object = resource.as_object().ok_or_else(|| {
        InventoryError::InvalidResponse(format!(
            "expected detail resource to be an object, got {}",
            json_type_name(resource)
        ))
    })?;

    let mut record = EntityRecord::new();
    for (key, value) in object {
        flatten_into(key.clone(), value, &mut record)?;
    }
    Ok(record)
}

/// Flatten a page of resources into a table, preserving input order
pub fn flatten_resources<'a>(resources: impl IntoIterator<Item = &'a Value>) -> Result<ResultTable> {
    let mut table = ResultTable::new();
    for resource in resources {
        table.push(flatten_resource(resource)?);
    }
    Ok(table)
}

fn flatten_into(path: String, value: &Value, record: &mut EntityRecord) -> Result<()> {
    match value {
        Value::Object(map) if map.is_empty() => insert_leaf(path, Value::Null, record),
        Value::Object(map) => {
            for (key, nested) in map {
                flatten_into(join(&path, key), nested, record)?;
            }
            Ok(())
        }
        Value::Array(items) if items.is_empty() => insert_leaf(path, Value::Null, record),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten_into(join(&path, &index.to_string()), item, record)?;
            }
            Ok(())
        }
        scalar => insert_leaf(path, scalar.clone(), record),
    }
}

fn insert_leaf(path: String, value: Value, record: &mut EntityRecord) -> Result<()> {
    if record.contains(&path) {
        return Err(InventoryError::InvalidResponse(format!(
            "detail resource has more than one field flattening to '{path}'"
        )));
    }
    record.insert(path, value);
    Ok(())
}

fn join(prefix: &str, segment: &str) -> String {
    let mut path = String::with_capacity(prefix.len() + segment.len() + 1);
    path.push_str(prefix);
    path.push(PATH_SEPARATOR);
    path.push_str(segment);
    path
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
