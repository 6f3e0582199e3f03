//! Metadata normalization.
//!
//! Reshapes loosely-structured spreadsheet rows into canonical records:
//!
//! - [`columns`] - column renaming and removal
//! - [`ops`] - independent per-column field transformers
//! - [`pipeline`] - fixed-order orchestration producing [`crate::models::CanonicalRecord`]

pub mod columns;
pub mod ops;
pub mod pipeline;

/// One spreadsheet row keyed by its current column names.
pub type Row = serde_json::Map<String, serde_json::Value>;
