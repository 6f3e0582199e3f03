//! CSV loading with encoding and delimiter auto-detection.
//!
//! Some partners export their metadata as CSV instead of Excel. Files in
//! the wild arrive in UTF-8, ISO-8859 or Windows-1252 with varying
//! delimiters, so both are detected from the raw bytes before parsing.

use serde_json::Value;
use std::path::Path;

use super::SheetTable;
use crate::error::{LoadError, LoadResult};

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.to_string()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.to_string(),
        _ => String::from_utf8_lossy(bytes).to_string(),
    }
}

/// Detect the delimiter by counting occurrences in the first line.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [';', ',', '\t', '|'];
    let mut best_sep = ';';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV content into a table with an explicit delimiter.
pub fn parse_csv_table(content: &str, delimiter: char) -> LoadResult<SheetTable> {
    let mut lines = content.lines();

    let header_line = lines
        .next()
        .ok_or_else(|| LoadError::Csv("empty CSV file".to_string()))?;

    let headers: Vec<String> = header_line
        .split(delimiter)
        .map(|s| s.trim().trim_matches('"').to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(LoadError::Csv("no headers found".to_string()));
    }

    let mut rows = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }

        let row: Vec<Value> = (0..headers.len())
            .map(|i| {
                let cell = line
                    .split(delimiter)
                    .nth(i)
                    .map(|s| s.trim().trim_matches('"'))
                    .unwrap_or("");
                if cell.is_empty() {
                    Value::Null
                } else {
                    Value::String(cell.to_string())
                }
            })
            .collect();
        rows.push(row);
    }

    Ok(SheetTable { headers, rows })
}

/// Load a CSV file with auto-detection of encoding and delimiter.
pub fn load_csv_table(path: &Path) -> LoadResult<SheetTable> {
    let bytes = std::fs::read(path)?;
    let encoding = detect_encoding(&bytes);
    let content = decode_content(&bytes, &encoding);
    let delimiter = detect_delimiter(&content);
    log::debug!(
        "CSV {}: encoding {}, delimiter '{}'",
        path.display(),
        encoding,
        delimiter
    );
    parse_csv_table(&content, delimiter)
}
