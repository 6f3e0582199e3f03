//! Domain models for the kobatch upload pipeline.
//!
//! This module contains the core data structures used throughout the pipeline:
//!
//! - [`CanonicalRecord`] - one normalized knowledge-object metadata record
//! - [`Creator`] - a contributor with name and email
//! - [`FileLang`] - a filename/language pair for multilingual submissions
//! - [`KnowledgeObjectRef`] - server-assigned identifier for an uploaded file
//! - [`Token`] - short-lived authentication credential bundle

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

// =============================================================================
// Creator
// =============================================================================

/// A contributor to a knowledge object.
///
/// Equality is on the full (name, email) pair; creator lists are
/// deduplicated with set semantics, so their order is not guaranteed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Creator {
    pub name: String,
    pub email: String,
}

impl Creator {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

// =============================================================================
// Filename / Language Pair
// =============================================================================

/// One file of a multilingual knowledge object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct FileLang {
    pub filename: String,
    pub language: String,
}

// =============================================================================
// Canonical Record
// =============================================================================

/// One knowledge object's normalized metadata.
///
/// Built once per spreadsheet row at the end of the transformation pipeline,
/// consumed exactly once by the upload orchestrator, then discarded.
///
/// Columns that no transformation recognizes are preserved verbatim in
/// `extra` and travel with the serialized metadata unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub creators: Vec<Creator>,
    pub geographic_locations: Vec<String>,
    pub date_of_completion: String,
    pub language: String,
    #[serde(rename = "type")]
    pub type_: Vec<String>,
    pub category: String,
    pub topics: Vec<String>,
    pub subtopics: Vec<String>,
    pub license: String,
    pub intended_purpose: Vec<String>,

    /// Project-specific metadata bundled from designated columns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contributor_custom_metadata: Option<BTreeMap<String, Value>>,

    /// Filename/language pairs for multilingual submissions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name_lang: Option<Vec<FileLang>>,

    /// Single filename for single-language submissions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    /// Unmapped columns, passed through to the metadata endpoint as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// =============================================================================
// Upload Linkage
// =============================================================================

/// Server-assigned identifier for one uploaded knowledge-object file.
///
/// Accumulated per file and sent with the metadata as the
/// `knowledge_objects` list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KnowledgeObjectRef {
    pub database_id: String,
    pub language: String,
}

// =============================================================================
// Token
// =============================================================================

/// Authentication credential bundle returned by the token endpoint.
///
/// Fetched fresh for every API call and never persisted. Fields beyond the
/// documented three are passed through untouched so the serialized token
/// matches what the server issued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access: String,
    pub refresh: String,
    pub user_id: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
