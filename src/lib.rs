//! # kobatch - knowledge-object batch uploading
//!
//! kobatch ingests spreadsheet-based metadata describing knowledge objects
//! (documents plus descriptive metadata), normalizes it into canonical
//! records, and uploads both the files and the metadata to the EU-FarmBook
//! repository API.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐    ┌──────────┐    ┌─────────────┐    ┌─────────────┐
//! │ Spreadsheet  │───▶│  Loader  │───▶│  Transform  │───▶│   Upload    │
//! │ (xlsx/xlsm)  │    │(calamine)│    │ (canonical) │    │ (files+meta)│
//! └──────────────┘    └──────────┘    └─────────────┘    └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use kobatch::{config::Config, source, upload::run_source};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::from_env().unwrap();
//!     let profile = source::profile("resalliance").unwrap();
//!     let report = run_source(&config, profile, true).await.unwrap();
//!     println!("{} submitted, {} failed", report.submitted(), report.failed());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`config`] - Environment-backed runtime configuration
//! - [`models`] - Domain models (CanonicalRecord, Creator, Token)
//! - [`source`] - Declarative per-source profiles
//! - [`loader`] - Spreadsheet loading (Excel and CSV)
//! - [`transform`] - Column normalization and field transformers
//! - [`api`] - Repository API client
//! - [`upload`] - Sequential upload orchestration

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Sources and loading
pub mod loader;
pub mod source;

// Transformation
pub mod transform;

// Remote API
pub mod api;

// Orchestration
pub mod upload;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    AuthError, BatchError, ConfigError, LoadError, SchemaError, UploadError, ValidationError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{CanonicalRecord, Creator, FileLang, KnowledgeObjectRef, Token};

// =============================================================================
// Re-exports - Loading
// =============================================================================

pub use loader::{find_spreadsheets, load_source_table, load_table, pivot_table, SheetTable};

// =============================================================================
// Re-exports - Sources
// =============================================================================

pub use source::{profile, profile_names, CreatorLayout, FileLayout, SourceProfile};

// =============================================================================
// Re-exports - Transformation
// =============================================================================

pub use transform::ops::{
    bundle_custom_metadata, convert_creators_cell, convert_creators_columns,
    convert_file_name_and_language, convert_list_column, unique_ordered_list,
};
pub use transform::pipeline::{normalize_row, normalize_table};

// =============================================================================
// Re-exports - API and Orchestration
// =============================================================================

pub use api::ApiClient;
pub use upload::{
    run_batch, run_source, upload_record, BatchReport, FileStore, RecordOutcome, RecordReport,
    UploadStage,
};
