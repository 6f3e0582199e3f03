//! Column renaming and removal.
//!
//! Renaming is a case- and whitespace-sensitive exact match of source
//! labels to canonical field names; unmapped columns are left as-is.
//! Both operations fail when a scheduled column is absent, surfacing
//! spreadsheet-shape drift instead of papering over it.

use std::collections::HashMap;

use super::Row;
use crate::error::{SchemaError, SchemaResult};

/// Rename the row's columns according to the profile map.
pub fn rename_columns(mut row: Row, rename: &HashMap<&str, &str>) -> SchemaResult<Row> {
    for (&source, &canonical) in rename {
        let value = row
            .remove(source)
            .ok_or_else(|| SchemaError::MissingColumn(source.to_string()))?;
        row.insert(canonical.to_string(), value);
    }
    Ok(row)
}

/// Drop the scheduled columns from the row.
pub fn remove_columns(mut row: Row, columns: &[&str]) -> SchemaResult<Row> {
    for &column in columns {
        row.remove(column)
            .ok_or_else(|| SchemaError::MissingColumn(column.to_string()))?;
    }
    Ok(row)
}
