//! Source profiles.
//!
//! A [`SourceProfile`] is a declarative description of one metadata source:
//! how its spreadsheet is laid out, which column labels map to canonical
//! field names, and which transformations apply. The pipeline stays generic;
//! everything source-specific lives here.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// How a source encodes its creators.
#[derive(Debug, Clone)]
pub enum CreatorLayout {
    /// One cell per row packing `"Name; email, Name2; email2"` pairs.
    PackedCell { column: &'static str },
    /// Two parallel columns of semicolon-separated names and emails.
    SplitColumns {
        names: &'static str,
        emails: &'static str,
    },
}

/// How a source references its knowledge-object files.
#[derive(Debug, Clone)]
pub enum FileLayout {
    /// Parallel semicolon-separated filename and language cells, paired
    /// positionally into `file_name_lang`.
    MultiLanguage {
        files_column: &'static str,
        languages_column: &'static str,
        /// Fixed suffix appended when resolving files on disk, e.g. `.pdf`.
        suffix: &'static str,
    },
    /// A single canonical `file_name` cell per record; the record's
    /// `language` field travels with the uploaded file.
    Single {
        column: &'static str,
        suffix: &'static str,
    },
}

/// Declarative description of one metadata source.
#[derive(Debug, Clone)]
pub struct SourceProfile {
    pub name: &'static str,
    /// Spreadsheet extension this source uses, e.g. `xlsx` or `xlsm`.
    pub extension: &'static str,
    /// Worksheet to read; `None` selects the first sheet.
    pub sheet: Option<&'static str>,
    /// Whether the sheet stores field names in column 1 and values in
    /// column 2, requiring a transpose into a single-row table.
    pub pivot: bool,
    /// Columns whose cells must be kept as plain text even when numeric.
    pub text_columns: &'static [&'static str],
    /// Source column label -> canonical field name, exact match.
    pub rename: HashMap<&'static str, &'static str>,
    /// Columns dropped from the record before serialization.
    pub remove: &'static [&'static str],
    /// Columns converted to semicolon-split, deduplicated lists.
    pub list_columns: &'static [&'static str],
    /// Columns bundled into `contributor_custom_metadata`.
    pub custom_metadata_columns: &'static [&'static str],
    pub creators: CreatorLayout,
    pub files: FileLayout,
}

static RESALLIANCE: Lazy<SourceProfile> = Lazy::new(|| SourceProfile {
    name: "resalliance",
    extension: "xlsx",
    sheet: None,
    pivot: false,
    text_columns: &["Factsheet"],
    rename: HashMap::from([
        ("Title", "title"),
        ("Description", "description"),
        ("keywords", "keywords"),
        ("Creators", "creators_preprocessing"),
        ("Geographic location(s)", "geographic_locations"),
        ("Date of completion", "date_of_completion"),
        ("Language", "language"),
        // Category and Type are swapped in the source sheets.
        ("Category", "type"),
        ("Type", "category"),
        ("Topics", "topics"),
        ("Subtopics", "subtopics"),
        ("Licence", "license"),
        ("Intended Purpose", "intended_purpose"),
    ]),
    remove: &["Grant ID"],
    list_columns: &[
        "keywords",
        "geographic_locations",
        "intended_purpose",
        "topics",
        "subtopics",
        "type",
        "Type of Solution",
        "Sector",
        "ResAlliance Partner",
        "Climate hazard",
        "Good Practice(s)",
    ],
    custom_metadata_columns: &[
        "Type of Solution",
        "Sector",
        "ResAlliance Partner",
        "Climate hazard",
        "Good Practice(s)",
    ],
    creators: CreatorLayout::PackedCell {
        column: "creators_preprocessing",
    },
    files: FileLayout::MultiLanguage {
        files_column: "Factsheet",
        languages_column: "File language(s)",
        suffix: ".pdf",
    },
});

static G4AE: Lazy<SourceProfile> = Lazy::new(|| SourceProfile {
    name: "g4ae",
    extension: "xlsm",
    sheet: Some("Fill Me"),
    pivot: true,
    text_columns: &[],
    rename: HashMap::from([
        ("title (*)", "title"),
        ("description (*)", "description"),
        ("keywords (*) ", "keywords"),
        ("creator(s) (*)", "creators_names"),
        ("creator(s) contact(s) (*)", "creators_emails"),
        ("geographic location(s) 6", "geographic_locations"),
        ("date of completion (*)", "date_of_completion"),
        ("language(s) (*) 6", "language"),
        // Category and type are swapped in the source sheets.
        ("category (*) 6", "type"),
        ("type (*) 6", "category"),
        ("subject - Level 1 (*) 6", "topics"),
        ("subject - Level 2 (*) 6", "subtopics"),
        ("license (*)", "license"),
        ("intended purpose (*) 6", "intended_purpose"),
        ("file name (*)", "file_name"),
    ]),
    remove: &["format (*) 6", "file size (*)", "project name (*) 6"],
    list_columns: &[
        "keywords",
        "geographic_locations",
        "intended_purpose",
        "topics",
        "subtopics",
        "type",
    ],
    custom_metadata_columns: &[],
    creators: CreatorLayout::SplitColumns {
        names: "creators_names",
        emails: "creators_emails",
    },
    files: FileLayout::Single {
        column: "file_name",
        suffix: "",
    },
});

/// Look up a built-in source profile by name.
pub fn profile(name: &str) -> Option<&'static SourceProfile> {
    match name {
        "resalliance" => Some(&RESALLIANCE),
        "g4ae" => Some(&G4AE),
        _ => None,
    }
}

/// Names of all built-in source profiles.
pub fn profile_names() -> &'static [&'static str] {
    &["resalliance", "g4ae"]
}
