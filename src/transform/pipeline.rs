//! Normalization pipeline.
//!
//! Applies the transformers in a fixed order and produces one
//! [`CanonicalRecord`] per spreadsheet row. Performs no I/O.
//!
//! Order matters: renaming runs first so later stages see canonical
//! names; the creator and filename conversions run before the generic
//! list conversion so already-structured data is never re-split; column
//! removal runs last, before the typed boundary.

use serde_json::Value;

use super::{columns, ops, Row};
use crate::error::{BatchResult, ValidationError};
use crate::loader::SheetTable;
use crate::models::CanonicalRecord;
use crate::source::{CreatorLayout, FileLayout, SourceProfile};

/// Normalize every row of a loaded table. Any failure is fatal for the
/// run; nothing is uploaded from a sheet that does not fully normalize.
pub fn normalize_table(
    table: &SheetTable,
    profile: &SourceProfile,
) -> BatchResult<Vec<CanonicalRecord>> {
    table
        .records()
        .into_iter()
        .enumerate()
        .map(|(idx, row)| normalize_row(row, profile, idx + 1))
        .collect()
}

/// Normalize a single row. `row_number` is 1-based, for error context.
pub fn normalize_row(
    row: Row,
    profile: &SourceProfile,
    row_number: usize,
) -> BatchResult<CanonicalRecord> {
    let mut row = columns::rename_columns(row, &profile.rename)?;

    match &profile.creators {
        CreatorLayout::PackedCell { column } => {
            ops::convert_creators_cell(&mut row, column)?;
        }
        CreatorLayout::SplitColumns { names, emails } => {
            ops::convert_creators_columns(&mut row, names, emails)?;
        }
    }

    if let FileLayout::MultiLanguage {
        files_column,
        languages_column,
        ..
    } = &profile.files
    {
        ops::convert_file_name_and_language(&mut row, files_column, languages_column)?;
    }

    for column in profile.list_columns {
        ops::convert_list_column(&mut row, column)?;
    }

    ops::bundle_custom_metadata(&mut row, profile.custom_metadata_columns)?;

    let row = columns::remove_columns(row, profile.remove)?;

    serde_json::from_value(Value::Object(row)).map_err(|e| {
        ValidationError::InvalidRecord {
            row: row_number,
            message: e.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::pivot_table;
    use crate::models::Creator;
    use crate::source;
    use serde_json::json;

    fn resalliance_table() -> SheetTable {
        let headers = vec![
            "Title",
            "Description",
            "keywords",
            "Creators",
            "Geographic location(s)",
            "Date of completion",
            "Language",
            "Category",
            "Type",
            "Topics",
            "Subtopics",
            "Licence",
            "Intended Purpose",
            "Grant ID",
            "Type of Solution",
            "Sector",
            "ResAlliance Partner",
            "Climate hazard",
            "Good Practice(s)",
            "Factsheet",
            "File language(s)",
        ];
        let row = vec![
            json!("Fire-resilient grazing"),
            json!("Grazing plans that reduce fuel load"),
            json!("grazing; fire; grazing"),
            json!("Alice;alice@x.com, Bob;"),
            json!("Spain; Portugal; Spain"),
            json!("2023-05-01"),
            json!("EN"),
            json!("factsheet"),
            json!("practice"),
            json!("livestock"),
            json!("grazing systems"),
            json!("CC-BY"),
            json!("farmers; advisors"),
            json!("101086600"),
            json!("prevention"),
            json!("Forestry; Livestock"),
            json!("UdL"),
            json!("Wildfire"),
            json!("GP-12"),
            json!("FS_grazing_EN;FS_grazing_ES"),
            json!("EN;ES"),
        ];
        SheetTable {
            headers: headers.into_iter().map(String::from).collect(),
            rows: vec![row],
        }
    }

    fn g4ae_table() -> SheetTable {
        let fields = [
            ("title (*)", json!("Indicator list for self-assessment")),
            ("description (*)", json!("Indicators for agroecology")),
            ("keywords (*) ", json!("agroecology; indicators")),
            ("creator(s) (*)", json!("Alice; Bob")),
            ("creator(s) contact(s) (*)", json!("alice@x.com; bob@x.com")),
            ("geographic location(s) 6", json!("EU")),
            ("date of completion (*)", json!("2024-01-15")),
            ("language(s) (*) 6", json!("EN")),
            ("category (*) 6", json!("report")),
            ("type (*) 6", json!("deliverable")),
            ("subject - Level 1 (*) 6", json!("farming")),
            ("subject - Level 2 (*) 6", json!("self-assessment")),
            ("license (*)", json!("CC-BY-SA")),
            ("intended purpose (*) 6", json!("advisors")),
            ("file name (*)", json!("D2.2_indicators.pdf")),
            ("format (*) 6", json!("pdf")),
            ("file size (*)", json!("2MB")),
            ("project name (*) 6", json!("G4AE")),
        ];
        let table = SheetTable {
            headers: vec!["Field".to_string(), "Value".to_string()],
            rows: fields
                .into_iter()
                .map(|(field, value)| vec![json!(field), value])
                .collect(),
        };
        pivot_table(table).unwrap()
    }

    #[test]
    fn test_resalliance_row_normalizes() {
        let profile = source::profile("resalliance").unwrap();
        let records = normalize_table(&resalliance_table(), profile).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];

        assert_eq!(record.title, "Fire-resilient grazing");
        // Category and Type land swapped, as the source sheets require.
        assert_eq!(record.type_, vec!["factsheet"]);
        assert_eq!(record.category, "practice");
        assert_eq!(record.keywords, vec!["grazing", "fire"]);
        assert_eq!(record.geographic_locations, vec!["Spain", "Portugal"]);
        assert_eq!(record.language, "EN");

        let mut creators = record.creators.clone();
        creators.sort();
        assert_eq!(
            creators,
            vec![Creator::new("Alice", "alice@x.com"), Creator::new("Bob", "")]
        );

        let pairs = record.file_name_lang.as_ref().unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].filename, "FS_grazing_EN");
        assert_eq!(pairs[1].language, "ES");

        let custom = record.contributor_custom_metadata.as_ref().unwrap();
        assert_eq!(custom["Sector"], json!(["Forestry", "Livestock"]));
        assert_eq!(custom["Climate hazard"], json!(["Wildfire"]));

        // the raw file columns and the removal list are gone
        assert!(record.extra.is_empty());
        assert!(record.file_name.is_none());
    }

    #[test]
    fn test_g4ae_pivoted_row_normalizes() {
        let profile = source::profile("g4ae").unwrap();
        let records = normalize_table(&g4ae_table(), profile).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];

        assert_eq!(record.title, "Indicator list for self-assessment");
        assert_eq!(record.file_name.as_deref(), Some("D2.2_indicators.pdf"));
        assert_eq!(record.language, "EN");
        assert_eq!(record.type_, vec!["report"]);
        assert_eq!(record.category, "deliverable");
        let mut creators = record.creators.clone();
        creators.sort();
        assert_eq!(
            creators,
            vec![
                Creator::new("Alice", "alice@x.com"),
                Creator::new("Bob", "bob@x.com")
            ]
        );

        // the removal list is consumed, nothing stray remains
        assert!(record.extra.is_empty());
        assert!(record.file_name_lang.is_none());
    }

    #[test]
    fn test_null_required_cell_fails_at_boundary() {
        let profile = source::profile("resalliance").unwrap();
        let mut table = resalliance_table();
        table.rows[0][0] = Value::Null; // Title
        let err = normalize_table(&table, profile).unwrap_err();
        assert!(err.to_string().contains("Row 1"));
    }
}
