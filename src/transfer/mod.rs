//! Export and validated import of whole data sets.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde_json::Value;

use crate::{
    domain::{DataSet, EntityId, Identifiable},
    errors::{ImportError, Result},
};

pub const BACKUP_FILE_PREFIX: &str = "moni_backup_";
pub const BACKUP_EXTENSION: &str = "json";

const REQUIRED_COLLECTIONS: [&str; 2] = ["transactions", "subscriptions"];

/// Serializes the data set as indented JSON, the exact format [`import_blob`] reads.
pub fn export_blob(data: &DataSet) -> Result<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// Parses and validates an externally supplied blob.
///
/// Text that is not JSON is `Malformed`. JSON without array-valued
/// `transactions` and `subscriptions`, or whose entries do not fit the data
/// model or that repeat an id within one collection, is `SchemaInvalid`.
pub fn import_blob(text: &str) -> std::result::Result<DataSet, ImportError> {
    let value: Value = serde_json::from_str(text).map_err(ImportError::malformed)?;
    let object = value
        .as_object()
        .ok_or_else(|| ImportError::schema_invalid("expected a JSON object at the top level"))?;
    for field in REQUIRED_COLLECTIONS {
        match object.get(field) {
            Some(Value::Array(_)) => {}
            Some(_) => {
                return Err(ImportError::schema_invalid(format!(
                    "`{field}` must be a list"
                )))
            }
            None => {
                return Err(ImportError::schema_invalid(format!(
                    "missing `{field}` list"
                )))
            }
        }
    }
    let data: DataSet = serde_json::from_value(value)
        .map_err(|err| ImportError::schema_invalid(err.to_string()))?;
    ensure_unique_ids("transactions", &data.transactions)?;
    ensure_unique_ids("subscriptions", &data.subscriptions)?;
    Ok(data)
}

fn ensure_unique_ids<T: Identifiable>(
    field: &str,
    items: &[T],
) -> std::result::Result<(), ImportError> {
    let mut seen: HashSet<&EntityId> = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.id()) {
            return Err(ImportError::schema_invalid(format!(
                "duplicate id `{}` in `{field}`",
                item.id()
            )));
        }
    }
    Ok(())
}

/// Download name for an export taken on `date`, e.g. `moni_backup_2024-05-01.json`.
pub fn backup_file_name(date: NaiveDate) -> String {
    format!(
        "{}{}.{}",
        BACKUP_FILE_PREFIX,
        date.format("%Y-%m-%d"),
        BACKUP_EXTENSION
    )
}
