//! Field transformers.
//!
//! Each transformer operates on one named column of a [`Row`] and is
//! independently invokable; the pipeline composes them in a fixed order.

use serde_json::Value;
use std::collections::HashSet;

use super::Row;
use crate::error::{SchemaError, SchemaResult, ValidationError, ValidationResult};
use crate::models::{Creator, FileLang};

/// Split a cell on `;`, trim each token, and drop duplicates while
/// preserving first-seen order. Non-string cells become `[]`.
pub fn unique_ordered_list(cell: &Value) -> Vec<String> {
    let Some(s) = cell.as_str() else {
        return Vec::new();
    };
    let mut seen = HashSet::new();
    s.split(';')
        .map(str::trim)
        .filter(|item| seen.insert(item.to_string()))
        .map(str::to_string)
        .collect()
}

/// Replace a column's cell with its semicolon-split list form.
pub fn convert_list_column(row: &mut Row, column: &str) -> ValidationResult<()> {
    let cell = row
        .get(column)
        .ok_or_else(|| ValidationError::MissingSource(column.to_string()))?;
    let list = unique_ordered_list(cell);
    row.insert(column.to_string(), Value::from(list));
    Ok(())
}

/// Parse a packed creators cell like `"Alice; a@x.com, Bob;"` into unique
/// `{name, email}` records.
///
/// Entries are separated by `", "`; within an entry, `;` separates name
/// from email (missing email defaults to empty). The result is
/// deduplicated with set semantics, so its order is not guaranteed.
pub fn convert_creators_cell(row: &mut Row, column: &str) -> ValidationResult<()> {
    let cell = row
        .remove(column)
        .ok_or_else(|| ValidationError::MissingSource(column.to_string()))?;
    let Some(packed) = cell.as_str() else {
        return Err(ValidationError::InvalidCell {
            column: column.to_string(),
            message: "expected a text cell of creators".to_string(),
        });
    };

    let mut unique: HashSet<Creator> = HashSet::new();
    for pair in packed.split(", ") {
        let parts: Vec<&str> = pair.split(';').collect();
        let name = parts[0].trim();
        let email = parts.get(1).map(|e| e.trim()).unwrap_or("");
        unique.insert(Creator::new(name, email));
    }

    row.insert("creators".to_string(), creators_to_value(unique));
    Ok(())
}

/// Pair two parallel semicolon-separated columns of names and emails into
/// unique `{name, email}` records, consuming both source columns.
pub fn convert_creators_columns(
    row: &mut Row,
    names_column: &str,
    emails_column: &str,
) -> ValidationResult<()> {
    let names = take_text_cell(row, names_column)?;
    let emails = take_text_cell(row, emails_column)?;

    let mut unique: HashSet<Creator> = HashSet::new();
    for (name, email) in names.split(';').zip(emails.split(';')) {
        unique.insert(Creator::new(name.trim(), email.trim()));
    }

    row.insert("creators".to_string(), creators_to_value(unique));
    Ok(())
}

/// Pair a filenames cell with a languages cell into `file_name_lang`,
/// consuming both source columns.
///
/// Tokens are zipped positionally; the longer side is truncated to the
/// shorter, with a warning naming the dropped side. Pairs are
/// deduplicated preserving first-seen order.
pub fn convert_file_name_and_language(
    row: &mut Row,
    files_column: &str,
    languages_column: &str,
) -> ValidationResult<()> {
    let files_cell = take_text_cell(row, files_column)?;
    let languages_cell = take_text_cell(row, languages_column)?;

    let files: Vec<&str> = files_cell.split(';').map(str::trim).collect();
    let languages: Vec<&str> = languages_cell.split(';').map(str::trim).collect();

    if files.len() != languages.len() {
        let matched = files.len().min(languages.len());
        log::warn!(
            "'{files_column}' has {} entries but '{languages_column}' has {}; \
             keeping the first {matched} pair(s)",
            files.len(),
            languages.len(),
        );
    }

    let mut seen = HashSet::new();
    let pairs: Vec<Value> = files
        .iter()
        .zip(languages.iter())
        .map(|(&filename, &language)| FileLang {
            filename: filename.to_string(),
            language: language.to_string(),
        })
        .filter(|pair| seen.insert(pair.clone()))
        .map(|pair| {
            serde_json::json!({ "filename": pair.filename, "language": pair.language })
        })
        .collect();

    row.insert("file_name_lang".to_string(), Value::Array(pairs));
    Ok(())
}

/// Bundle the designated columns into a `contributor_custom_metadata`
/// mapping, removing them from the flat row.
pub fn bundle_custom_metadata(row: &mut Row, columns: &[&str]) -> SchemaResult<()> {
    if columns.is_empty() {
        return Ok(());
    }

    let mut bundle = serde_json::Map::new();
    for &column in columns {
        let value = row
            .remove(column)
            .ok_or_else(|| SchemaError::MissingColumn(column.to_string()))?;
        bundle.insert(column.to_string(), value);
    }

    row.insert(
        "contributor_custom_metadata".to_string(),
        Value::Object(bundle),
    );
    Ok(())
}

fn creators_to_value(unique: HashSet<Creator>) -> Value {
    Value::Array(
        unique
            .into_iter()
            .map(|c| serde_json::json!({ "name": c.name, "email": c.email }))
            .collect(),
    )
}

fn take_text_cell(row: &mut Row, column: &str) -> ValidationResult<String> {
    let cell = row
        .remove(column)
        .ok_or_else(|| ValidationError::MissingSource(column.to_string()))?;
    match cell {
        Value::String(s) => Ok(s),
        other => Err(ValidationError::InvalidCell {
            column: column.to_string(),
            message: format!("expected a text cell, found {other}"),
        }),
    }
}
