//! Batch upload behavior against a mocked repository API.

use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use kobatch::config::Config;
use kobatch::{
    normalize_table, profile, run_batch, ApiClient, CanonicalRecord, FileStore, RecordOutcome,
    SheetTable, UploadStage,
};

fn test_config(server: &MockServer, objects_dir: &std::path::Path) -> Config {
    Config {
        api_address: server.uri(),
        project_id: "proj-1".to_string(),
        email: "curator@example.test".to_string(),
        password: "secret".to_string(),
        metadata_dir: "data".into(),
        objects_dir: objects_dir.to_path_buf(),
    }
}

async fn mount_token_endpoint(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/authentication/token/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "token-access",
            "refresh": "token-refresh",
            "user_id": 7
        })))
        .mount(server)
        .await;
}

/// A complete one-row resalliance sheet referencing a single file.
fn one_row_table(filename: &str) -> SheetTable {
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
        json!("Soil factsheet"),
        json!("Keeping soil alive"),
        json!("soil"),
        json!("Alice;alice@x.com"),
        json!("Spain"),
        json!("2023-05-01"),
        json!("EN"),
        json!("factsheet"),
        json!("practice"),
        json!("soil"),
        json!("soil health"),
        json!("CC-BY"),
        json!("farmers"),
        json!("101086600"),
        json!("prevention"),
        json!("Forestry"),
        json!("UdL"),
        json!("Drought"),
        json!("GP-1"),
        json!(filename),
        json!("EN"),
    ];
    SheetTable {
        headers: headers.into_iter().map(String::from).collect(),
        rows: vec![row],
    }
}

/// A minimal canonical record referencing a single file, for batch tests.
fn record_with_file(title: &str, filename: &str) -> CanonicalRecord {
    serde_json::from_value(json!({
        "title": title,
        "description": "d",
        "keywords": ["k"],
        "creators": [{"name": "Alice", "email": "alice@x.com"}],
        "geographic_locations": ["Spain"],
        "date_of_completion": "2023-05-01",
        "language": "EN",
        "type": ["factsheet"],
        "category": "practice",
        "topics": ["soil"],
        "subtopics": ["soil health"],
        "license": "CC-BY",
        "intended_purpose": ["farmers"],
        "file_name_lang": [{"filename": filename, "language": "EN"}]
    }))
    .unwrap()
}

#[tokio::test]
async fn dry_run_validates_without_committing() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/upload/knowledge_object_file"))
        .and(query_param("project_id", "proj-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"database_id": "db-1"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/upload/validate_knowledge_object_metadata"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("EFB-1")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/upload/knowledge_object_metadata"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let objects = tempfile::tempdir().unwrap();
    std::fs::write(objects.path().join("FS_soil.pdf"), b"%PDF-stub").unwrap();

    let source = profile("resalliance").unwrap();
    let records = normalize_table(&one_row_table("FS_soil"), source).unwrap();
    assert_eq!(records.len(), 1);

    let config = test_config(&server, objects.path());
    let client = ApiClient::new(&config).unwrap();
    let store = FileStore::new(objects.path());

    let report = run_batch(records, source, &client, &store, true).await;
    assert_eq!(report.submitted(), 1);
    assert_eq!(report.failed(), 0);

    // The validated metadata carries the linkage list but not the
    // consumed file-reference field.
    let requests = server.received_requests().await.unwrap();
    let validate = requests
        .iter()
        .find(|r| r.url.path() == "/api/upload/validate_knowledge_object_metadata")
        .unwrap();
    let body: Value = serde_json::from_slice(&validate.body).unwrap();
    assert_eq!(body["user_tokens"]["access"], "token-access");
    assert_eq!(
        body["metadata"]["knowledge_objects"],
        json!([{"database_id": "db-1", "language": "EN"}])
    );
    assert!(body["metadata"].get("file_name_lang").is_none());
    assert_eq!(body["metadata"]["title"], "Soil factsheet");
}

#[tokio::test]
async fn single_file_source_moves_language_onto_the_upload() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/upload/knowledge_object_file"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"database_id": "db-9"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/upload/validate_knowledge_object_metadata"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("EFB-9")))
        .expect(1)
        .mount(&server)
        .await;

    let objects = tempfile::tempdir().unwrap();
    std::fs::write(objects.path().join("D2.2_indicators.pdf"), b"stub").unwrap();

    let mut record = record_with_file("deliverable", "unused");
    record.file_name_lang = None;
    record.file_name = Some("D2.2_indicators.pdf".to_string());

    let source = profile("g4ae").unwrap();
    let config = test_config(&server, objects.path());
    let client = ApiClient::new(&config).unwrap();
    let store = FileStore::new(objects.path());

    let report = run_batch(vec![record], source, &client, &store, true).await;
    assert_eq!(report.submitted(), 1);

    let requests = server.received_requests().await.unwrap();
    let validate = requests
        .iter()
        .find(|r| r.url.path() == "/api/upload/validate_knowledge_object_metadata")
        .unwrap();
    let body: Value = serde_json::from_slice(&validate.body).unwrap();
    assert_eq!(
        body["metadata"]["knowledge_objects"],
        json!([{"database_id": "db-9", "language": "EN"}])
    );
    // single-file sources carry the language on the upload, not the metadata
    assert!(body["metadata"].get("language").is_none());
    assert!(body["metadata"].get("file_name").is_none());
}

#[tokio::test]
async fn failed_row_does_not_stop_the_batch() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    // Row 2's file upload is rejected; every other upload succeeds.
    Mock::given(method("POST"))
        .and(path("/api/upload/knowledge_object_file"))
        .and(body_string_contains("b.pdf"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "boom"})))
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/upload/knowledge_object_file"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"database_id": "db-ok"})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/upload/validate_knowledge_object_metadata"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("EFB-ok")))
        .expect(2)
        .mount(&server)
        .await;

    let objects = tempfile::tempdir().unwrap();
    for name in ["a.pdf", "b.pdf", "c.pdf"] {
        std::fs::write(objects.path().join(name), b"stub").unwrap();
    }

    let records = vec![
        record_with_file("first", "a"),
        record_with_file("second", "b"),
        record_with_file("third", "c"),
    ];

    let source = profile("resalliance").unwrap();
    let config = test_config(&server, objects.path());
    let client = ApiClient::new(&config).unwrap();
    let store = FileStore::new(objects.path());

    let report = run_batch(records, source, &client, &store, true).await;
    assert_eq!(report.submitted(), 2);
    assert_eq!(report.failed(), 1);

    match &report.records[1].outcome {
        RecordOutcome::Failed { stage, message } => {
            assert_eq!(*stage, UploadStage::FileUpload);
            assert!(message.contains("500"));
        }
        other => panic!("row 2 should have failed, got {other:?}"),
    }
    assert!(matches!(
        report.records[0].outcome,
        RecordOutcome::Submitted { .. }
    ));
    assert!(matches!(
        report.records[2].outcome,
        RecordOutcome::Submitted { .. }
    ));
}

#[tokio::test]
async fn missing_file_fails_only_that_record() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/upload/knowledge_object_file"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"database_id": "db-ok"})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/upload/validate_knowledge_object_metadata"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("EFB-ok")))
        .mount(&server)
        .await;

    let objects = tempfile::tempdir().unwrap();
    std::fs::write(objects.path().join("present.pdf"), b"stub").unwrap();

    let records = vec![
        record_with_file("has file", "present"),
        record_with_file("no file", "absent"),
    ];

    let source = profile("resalliance").unwrap();
    let config = test_config(&server, objects.path());
    let client = ApiClient::new(&config).unwrap();
    let store = FileStore::new(objects.path());

    let report = run_batch(records, source, &client, &store, true).await;
    assert_eq!(report.submitted(), 1);
    assert_eq!(report.failed(), 1);
    match &report.records[1].outcome {
        RecordOutcome::Failed { stage, message } => {
            assert_eq!(*stage, UploadStage::FileUpload);
            assert!(message.contains("absent.pdf"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn rejected_metadata_reports_status_and_body() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/upload/knowledge_object_file"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"database_id": "db-ok"})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/upload/validate_knowledge_object_metadata"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"detail": "license not recognized"})),
        )
        .mount(&server)
        .await;

    let objects = tempfile::tempdir().unwrap();
    std::fs::write(objects.path().join("doc.pdf"), b"stub").unwrap();

    let source = profile("resalliance").unwrap();
    let config = test_config(&server, objects.path());
    let client = ApiClient::new(&config).unwrap();
    let store = FileStore::new(objects.path());

    let report = run_batch(
        vec![record_with_file("rejected", "doc")],
        source,
        &client,
        &store,
        true,
    )
    .await;

    assert_eq!(report.failed(), 1);
    match &report.records[0].outcome {
        RecordOutcome::Failed { stage, message } => {
            assert_eq!(*stage, UploadStage::MetadataSubmission);
            assert!(message.contains("422"));
            assert!(message.contains("license not recognized"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
}
