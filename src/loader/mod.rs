//! Spreadsheet loading.
//!
//! Turns a metadata spreadsheet into a [`SheetTable`]: a header row plus
//! data rows of JSON values, with wholly-empty rows and columns removed.
//! Excel workbooks (`.xlsx`/`.xlsm`) are read with calamine; `.csv` files
//! go through the encoding-detecting parser in [`csv`].
//!
//! Pivoted sources (field names in column 1, values in column 2) are
//! transposed here into a single-row table before downstream processing.

pub mod csv;

use calamine::{open_workbook_auto, Data, Reader};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::error::{BatchResult, LoadError, LoadResult, SchemaError, SchemaResult};
use crate::source::SourceProfile;

/// A loaded spreadsheet: headers plus rectangular data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl SheetTable {
    /// One JSON object per data row, keyed by header. Columns with an
    /// empty header label are skipped.
    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                let mut obj = Map::new();
                for (i, header) in self.headers.iter().enumerate() {
                    if header.is_empty() {
                        continue;
                    }
                    let value = row.get(i).cloned().unwrap_or(Value::Null);
                    obj.insert(header.clone(), value);
                }
                obj
            })
            .collect()
    }

    /// Drop data rows where every cell is empty, then columns where every
    /// data cell is empty.
    fn drop_empty(mut self) -> Self {
        self.rows.retain(|row| !row.iter().all(is_empty_cell));

        let keep: Vec<bool> = (0..self.headers.len())
            .map(|i| {
                self.rows
                    .iter()
                    .any(|row| !is_empty_cell(row.get(i).unwrap_or(&Value::Null)))
            })
            .collect();

        self.headers = filter_by(self.headers, &keep);
        self.rows = self
            .rows
            .into_iter()
            .map(|row| filter_by(row, &keep))
            .collect();
        self
    }

    /// Coerce numeric cells in the given columns to plain text, preserving
    /// identifiers that spreadsheet type inference would mangle.
    fn force_text_columns(mut self, columns: &[&str]) -> Self {
        for (i, header) in self.headers.iter().enumerate() {
            if !columns.contains(&header.as_str()) {
                continue;
            }
            for row in &mut self.rows {
                if let Some(cell) = row.get_mut(i) {
                    if let Some(text) = number_as_text(cell) {
                        *cell = Value::String(text);
                    }
                }
            }
        }
        self
    }
}

fn filter_by<T>(items: Vec<T>, keep: &[bool]) -> Vec<T> {
    items
        .into_iter()
        .zip(keep.iter())
        .filter_map(|(item, &k)| k.then_some(item))
        .collect()
}

fn is_empty_cell(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn number_as_text(value: &Value) -> Option<String> {
    let n = value.as_number()?;
    if let Some(i) = n.as_i64() {
        Some(i.to_string())
    } else {
        Some(n.to_string())
    }
}

/// Load the spreadsheet for a source profile, applying its pivot if any.
///
/// Fails with [`LoadError::NotFound`] before any parsing if the path does
/// not exist; any parse failure is wrapped into a [`LoadError`].
pub fn load_source_table(path: &Path, profile: &SourceProfile) -> BatchResult<SheetTable> {
    let table = load_table(path, profile)?;
    if profile.pivot {
        Ok(pivot_table(table)?)
    } else {
        Ok(table)
    }
}

/// Load a spreadsheet into a cleaned [`SheetTable`], without pivoting.
pub fn load_table(path: &Path, profile: &SourceProfile) -> LoadResult<SheetTable> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let table = if extension == "csv" {
        csv::load_csv_table(path)?
    } else {
        load_excel_table(path, profile.sheet)?
    };

    let table = table
        .drop_empty()
        .force_text_columns(profile.text_columns);

    if table.rows.is_empty() {
        return Err(LoadError::EmptySheet(path.to_path_buf()));
    }
    Ok(table)
}

/// List the spreadsheets in a metadata directory matching the profile's
/// extension, in name order.
pub fn find_spreadsheets(dir: &Path, profile: &SourceProfile) -> LoadResult<Vec<PathBuf>> {
    if !dir.exists() {
        return Err(LoadError::NotFound(dir.to_path_buf()));
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case(profile.extension))
                .unwrap_or(false)
        })
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(LoadError::NoSpreadsheets {
            dir: dir.to_path_buf(),
            extension: profile.extension.to_string(),
        });
    }
    Ok(paths)
}

fn load_excel_table(path: &Path, sheet: Option<&str>) -> LoadResult<SheetTable> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| LoadError::Workbook(e.to_string()))?;

    let sheet_name = match sheet {
        Some(name) => {
            if !workbook.sheet_names().iter().any(|s| s == name) {
                return Err(LoadError::MissingSheet(name.to_string()));
            }
            name.to_string()
        }
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| LoadError::Workbook("workbook has no sheets".to_string()))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| LoadError::Workbook(e.to_string()))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|row| row.iter().map(cell_to_header).collect())
        .unwrap_or_default();

    let data: Vec<Vec<Value>> = rows
        .map(|row| row.iter().map(cell_to_value).collect())
        .collect();

    Ok(SheetTable {
        headers,
        rows: data,
    })
}

fn cell_to_header(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => match cell_to_value(other) {
            Value::Null => String::new(),
            Value::String(s) => s,
            v => v.to_string(),
        },
    }
}

/// Convert an Excel cell to a JSON value. Dates collapse to `YYYY-MM-DD`
/// when they carry no time component.
fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) if s.trim().is_empty() => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Int(i) => Value::from(*i),
        Data::Float(f) => {
            if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                Value::from(*f as i64)
            } else {
                Value::from(*f)
            }
        }
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ts) if ts.time() == chrono::NaiveTime::MIN => {
                Value::String(ts.date().format("%Y-%m-%d").to_string())
            }
            Some(ts) => Value::String(ts.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => Value::String(dt.to_string()),
        },
        Data::DateTimeIso(s) => Value::String(s.clone()),
        Data::DurationIso(s) => Value::String(s.clone()),
        Data::Error(_) => Value::Null,
    }
}

/// Transpose a field-per-row sheet into a single-row table: column 1 holds
/// the field names, column 2 the values. The longer column is truncated to
/// match the shorter.
pub fn pivot_table(table: SheetTable) -> SchemaResult<SheetTable> {
    if table.headers.len() < 2 {
        return Err(SchemaError::PivotShape(format!(
            "expected a field and a value column, found {}",
            table.headers.len()
        )));
    }

    let mut headers = Vec::new();
    let mut row = Vec::new();
    for cells in &table.rows {
        let field = cells.first().cloned().unwrap_or(Value::Null);
        let value = cells.get(1).cloned().unwrap_or(Value::Null);
        let label = match field {
            Value::String(s) => s,
            Value::Null => continue,
            other => other.to_string(),
        };
        headers.push(label);
        row.push(value);
    }

    Ok(SheetTable {
        headers,
        rows: vec![row],
    })
}
