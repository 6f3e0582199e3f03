//! Error types for the kobatch upload pipeline.
//!
//! This module defines a hierarchy of error types, one per layer:
//!
//! - [`ConfigError`] - missing or unusable configuration
//! - [`LoadError`] - spreadsheet and local file loading errors
//! - [`SchemaError`] - unexpected spreadsheet shape
//! - [`ValidationError`] - malformed per-row data
//! - [`AuthError`] - authentication endpoint failures
//! - [`UploadError`] - file and metadata endpoint failures
//! - [`BatchError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while assembling the runtime configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// Unknown source profile name.
    #[error("Unknown source profile: {0}")]
    UnknownSource(String),
}

// =============================================================================
// Loading Errors
// =============================================================================

/// Errors while loading spreadsheets or knowledge-object files.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The path does not exist; raised before any parsing is attempted.
    #[error("No file found at the specified path: {}", .0.display())]
    NotFound(PathBuf),

    /// Failed to read the file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to open or parse an Excel workbook.
    #[error("Failed to load Excel file: {0}")]
    Workbook(String),

    /// The requested worksheet is missing.
    #[error("Worksheet not found: {0}")]
    MissingSheet(String),

    /// Failed to decode or parse CSV content.
    #[error("Invalid CSV content: {0}")]
    Csv(String),

    /// The sheet contains no usable rows.
    #[error("Spreadsheet is empty: {}", .0.display())]
    EmptySheet(PathBuf),

    /// No spreadsheet with the configured extension in the metadata directory.
    #[error("No '{extension}' spreadsheets found in {}", .dir.display())]
    NoSpreadsheets { dir: PathBuf, extension: String },
}

// =============================================================================
// Schema Errors
// =============================================================================

/// Errors caused by an unexpected spreadsheet shape.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A column scheduled for renaming or removal is absent.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// A pivoted sheet does not have the field/value column pair.
    #[error("Cannot pivot sheet: {0}")]
    PivotShape(String),
}

// =============================================================================
// Row Validation Errors
// =============================================================================

/// Errors from malformed per-row data.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A transformer's expected source column is absent.
    #[error("The '{0}' column does not exist in the row")]
    MissingSource(String),

    /// A cell does not have the shape a transformer requires.
    #[error("Column '{column}': {message}")]
    InvalidCell { column: String, message: String },

    /// The row does not deserialize into a canonical record.
    #[error("Row {row}: {message}")]
    InvalidRecord { row: usize, message: String },
}

// =============================================================================
// Authentication Errors
// =============================================================================

/// Errors from the authentication endpoints.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Transport-level failure reaching the endpoint.
    #[error("Authentication request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-200 response from the authentication endpoint.
    #[error("Could not get token: Status code: {status}: {body}")]
    Rejected { status: u16, body: String },

    /// 200 response whose body does not parse as a token.
    #[error("Malformed token response: {0}")]
    Malformed(String),
}

// =============================================================================
// Upload Errors
// =============================================================================

/// Errors from the file and metadata upload endpoints.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Token acquisition failed.
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Transport-level failure reaching the endpoint.
    #[error("Upload request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-200 response from the endpoint, with the server's error body.
    #[error("Upload rejected: {status} - {body}")]
    Rejected { status: u16, body: String },

    /// The 200 response body is missing an expected field.
    #[error("Malformed upload response: missing '{0}'")]
    MissingField(&'static str),

    /// Failed to serialize the request payload.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

// =============================================================================
// Batch Errors (top-level)
// =============================================================================

/// Top-level orchestration errors.
///
/// This is the main error type returned by the batch entry points. It wraps
/// all lower-level errors and is fatal for the run; per-record upload
/// failures are captured in the batch report instead.
#[derive(Debug, Error)]
pub enum BatchError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Spreadsheet loading error.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Spreadsheet shape error.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Row validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Authentication error.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Upload error.
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Result type for row validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Result type for authentication.
pub type AuthResult<T> = Result<T, AuthError>;

/// Result type for uploads.
pub type UploadResult<T> = Result<T, UploadError>;

/// Result type for batch orchestration.
pub type BatchResult<T> = Result<T, BatchError>;
