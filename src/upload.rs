//! Upload orchestration.
//!
//! Consumes canonical records one at a time: resolve the referenced
//! file(s) from the local store, upload the bytes, then submit the
//! metadata with the server-assigned identifiers attached.
//!
//! A record moves through file upload to metadata submission, or fails at
//! either step. Failures are isolated: the failing record is logged and
//! reported, earlier uploads are not rolled back, and the batch continues
//! with the next record. Only configuration and spreadsheet loading abort
//! the whole run.

use log::{error, info};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::api::ApiClient;
use crate::config::Config;
use crate::error::{BatchResult, LoadError, LoadResult};
use crate::loader;
use crate::models::{CanonicalRecord, KnowledgeObjectRef};
use crate::source::{FileLayout, SourceProfile};
use crate::transform::pipeline;

// =============================================================================
// Local Object Store
// =============================================================================

/// Read-only store of knowledge-object files, keyed by filename.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Read a file's bytes; fails with [`LoadError::NotFound`] if absent.
    pub fn read(&self, file_name: &str) -> LoadResult<Vec<u8>> {
        let path = self.root.join(file_name);
        if !path.exists() {
            return Err(LoadError::NotFound(path));
        }
        Ok(std::fs::read(path)?)
    }
}

// =============================================================================
// Reports
// =============================================================================

/// The step a record failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    FileUpload,
    MetadataSubmission,
}

impl fmt::Display for UploadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadStage::FileUpload => write!(f, "file upload"),
            UploadStage::MetadataSubmission => write!(f, "metadata submission"),
        }
    }
}

/// Failure of a single record; the batch continues past it.
#[derive(Debug, Error)]
#[error("{stage} failed: {message}")]
pub struct RecordError {
    pub stage: UploadStage,
    pub message: String,
}

/// Outcome of one record.
#[derive(Debug)]
pub enum RecordOutcome {
    /// Metadata accepted (or validated, in dry-run mode).
    Submitted {
        remote_id: Value,
        knowledge_objects: Vec<KnowledgeObjectRef>,
    },
    /// The record failed; earlier records are unaffected.
    Failed { stage: UploadStage, message: String },
}

/// One record's report, by its 1-based row number within its spreadsheet.
#[derive(Debug)]
pub struct RecordReport {
    pub row: usize,
    pub outcome: RecordOutcome,
}

/// Summary of a whole run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub records: Vec<RecordReport>,
}

impl BatchReport {
    pub fn submitted(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r.outcome, RecordOutcome::Submitted { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.records.len() - self.submitted()
    }

    pub fn merge(&mut self, other: BatchReport) {
        self.records.extend(other.records);
    }
}

// =============================================================================
// Orchestration
// =============================================================================

/// Upload one record: its file(s), then its metadata.
pub async fn upload_record(
    record: CanonicalRecord,
    profile: &SourceProfile,
    client: &ApiClient,
    store: &FileStore,
    dry_run: bool,
) -> Result<(Value, Vec<KnowledgeObjectRef>), RecordError> {
    let refs = upload_files(&record, profile, client, store).await?;

    let mut metadata = serde_json::to_value(&record).map_err(|e| RecordError {
        stage: UploadStage::MetadataSubmission,
        message: e.to_string(),
    })?;

    if let Some(object) = metadata.as_object_mut() {
        // The file-reference fields are consumed by the uploads above and
        // must not reach the metadata endpoint.
        object.remove("file_name_lang");
        object.remove("file_name");
        if matches!(profile.files, FileLayout::Single { .. }) {
            // Single-file sources carry the language on the uploaded file.
            object.remove("language");
        }
        object.insert(
            "knowledge_objects".to_string(),
            Value::Array(
                refs.iter()
                    .map(|r| {
                        serde_json::json!({
                            "database_id": r.database_id,
                            "language": r.language,
                        })
                    })
                    .collect(),
            ),
        );
    }

    let remote_id = client
        .submit_metadata(metadata, dry_run)
        .await
        .map_err(|e| RecordError {
            stage: UploadStage::MetadataSubmission,
            message: e.to_string(),
        })?;

    Ok((remote_id, refs))
}

async fn upload_files(
    record: &CanonicalRecord,
    profile: &SourceProfile,
    client: &ApiClient,
    store: &FileStore,
) -> Result<Vec<KnowledgeObjectRef>, RecordError> {
    let mut refs = Vec::new();

    match &profile.files {
        FileLayout::MultiLanguage { suffix, .. } => {
            for pair in record.file_name_lang.clone().unwrap_or_default() {
                let file_name = format!("{}{}", pair.filename, suffix);
                let database_id = upload_one(&file_name, client, store).await?;
                refs.push(KnowledgeObjectRef {
                    database_id,
                    language: pair.language,
                });
            }
        }
        FileLayout::Single { suffix, .. } => {
            let name = record.file_name.as_deref().ok_or_else(|| RecordError {
                stage: UploadStage::FileUpload,
                message: "record has no file_name".to_string(),
            })?;
            let file_name = format!("{name}{suffix}");
            let database_id = upload_one(&file_name, client, store).await?;
            refs.push(KnowledgeObjectRef {
                database_id,
                language: record.language.clone(),
            });
        }
    }

    Ok(refs)
}

async fn upload_one(
    file_name: &str,
    client: &ApiClient,
    store: &FileStore,
) -> Result<String, RecordError> {
    info!("Attempting upload for {file_name}");
    let bytes = store.read(file_name).map_err(|e| RecordError {
        stage: UploadStage::FileUpload,
        message: e.to_string(),
    })?;

    info!("Uploading knowledge object {file_name}");
    client.upload_file(file_name, bytes).await.map_err(|e| {
        RecordError {
            stage: UploadStage::FileUpload,
            message: e.to_string(),
        }
    })
}

/// Upload a batch of records strictly sequentially, isolating per-record
/// failures.
pub async fn run_batch(
    records: Vec<CanonicalRecord>,
    profile: &SourceProfile,
    client: &ApiClient,
    store: &FileStore,
    dry_run: bool,
) -> BatchReport {
    let mut report = BatchReport::default();

    for (idx, record) in records.into_iter().enumerate() {
        let row = idx + 1;
        info!("Processing metadata for row {row}");

        match upload_record(record, profile, client, store, dry_run).await {
            Ok((remote_id, knowledge_objects)) => {
                info!(
                    "Success: Uploaded metadata for row {row}: knowledge objects \
                     {knowledge_objects:?}. Repository ID: {remote_id}"
                );
                report.records.push(RecordReport {
                    row,
                    outcome: RecordOutcome::Submitted {
                        remote_id,
                        knowledge_objects,
                    },
                });
            }
            Err(e) => {
                error!("Row {row}: {e}");
                report.records.push(RecordReport {
                    row,
                    outcome: RecordOutcome::Failed {
                        stage: e.stage,
                        message: e.message,
                    },
                });
            }
        }
    }

    report
}

/// Full run for one source: scan the metadata directory, normalize each
/// spreadsheet, and upload every record.
pub async fn run_source(
    config: &Config,
    profile: &SourceProfile,
    dry_run: bool,
) -> BatchResult<BatchReport> {
    if dry_run {
        info!("Dry run to check metadata validity in progress...");
    }

    let client = ApiClient::new(config)?;
    let store = FileStore::new(&config.objects_dir);

    let mut report = BatchReport::default();
    for path in loader::find_spreadsheets(&config.metadata_dir, profile)? {
        info!("Processing spreadsheet {}", path.display());
        let table = loader::load_source_table(&path, profile)?;
        let records = pipeline::normalize_table(&table, profile)?;
        report.merge(run_batch(records, profile, &client, &store, dry_run).await);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let err = store.read("absent.pdf").unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn test_file_store_reads_bytes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("doc.pdf"), b"content").unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.read("doc.pdf").unwrap(), b"content");
    }

    #[test]
    fn test_batch_report_counts() {
        let mut report = BatchReport::default();
        report.records.push(RecordReport {
            row: 1,
            outcome: RecordOutcome::Submitted {
                remote_id: Value::String("id-1".into()),
                knowledge_objects: vec![],
            },
        });
        report.records.push(RecordReport {
            row: 2,
            outcome: RecordOutcome::Failed {
                stage: UploadStage::FileUpload,
                message: "500".into(),
            },
        });
        assert_eq!(report.submitted(), 1);
        assert_eq!(report.failed(), 1);
    }
}
