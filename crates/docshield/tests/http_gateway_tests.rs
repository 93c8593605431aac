//! `HttpGateway` tests against a local axum server.

mod common;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Form, Multipart, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use common::spawn_server;
use docshield::audit::{AuditQueryEngine, EventKind};
use docshield::document::{
    DocumentLifecycleManager, LifecyclePhase, PartialData, ProcessingOptions, RedactionOptions,
    UploadFile,
};
use docshield::error::{DocShieldError, NetworkError};
use docshield::gateway::{ApiGateway, HttpGateway};

#[derive(Debug, Clone)]
struct SeenPart {
    name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
struct SeenUpload {
    query: HashMap<String, String>,
    parts: Vec<SeenPart>,
}

type Recorder<T> = Arc<Mutex<Option<T>>>;

async fn record_upload(
    State(seen): State<Recorder<SeenUpload>>,
    Query(query): Query<HashMap<String, String>>,
    mut multipart: Multipart,
) -> Json<Value> {
    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await.expect("multipart field") {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.expect("field bytes").to_vec();
        parts.push(SeenPart {
            name,
            file_name,
            content_type,
            bytes,
        });
    }
    *seen.lock().unwrap() = Some(SeenUpload { query, parts });

    Json(json!({
        "status": "uploaded",
        "document_id": "20240301_100000",
        "filename": "scan.pdf",
        "content_type": "application/pdf",
        "file_path": "uploads/20240301_100000_scan.pdf"
    }))
}

async fn record_redaction(
    State(seen): State<Recorder<HashMap<String, String>>>,
    Form(form): Form<HashMap<String, String>>,
) -> Json<Value> {
    *seen.lock().unwrap() = Some(form);
    Json(json!({"status": "success", "message": "Document redacted"}))
}

async fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"detail": "Document not found"})),
    )
}

// ============================================================================
// Status mapping
// ============================================================================

#[tokio::test]
async fn test_fetch_404_is_not_found() {
    let app = Router::new().route("/ingest/document/:id", get(not_found));
    let gateway = HttpGateway::with_base_url(&spawn_server(app).await).unwrap();

    let err = gateway.fetch_document("doc-1").await.unwrap_err();
    assert!(err.is_not_found());
    match err {
        DocShieldError::NotFound { document_id } => assert_eq!(document_id, "doc-1"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_redact_404_is_not_found() {
    let app = Router::new().route("/ingest/redact/:id", post(not_found));
    let gateway = HttpGateway::with_base_url(&spawn_server(app).await).unwrap();

    let err = gateway.redact("doc-9", "black").await.unwrap_err();
    assert!(matches!(
        err,
        DocShieldError::NotFound { ref document_id } if document_id == "doc-9"
    ));
}

#[tokio::test]
async fn test_audit_404_is_plain_status_error() {
    let gateway = HttpGateway::with_base_url(&spawn_server(Router::new()).await).unwrap();

    let err = gateway.fetch_audit_logs().await.unwrap_err();
    assert!(!err.is_not_found());
    assert!(matches!(
        err,
        DocShieldError::Network(NetworkError::Status { status: 404, .. })
    ));
}

#[tokio::test]
async fn test_server_error_body_is_truncated() {
    let app = Router::new().route(
        "/ingest/document/:id",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "e".repeat(300)) }),
    );
    let gateway = HttpGateway::with_base_url(&spawn_server(app).await).unwrap();

    match gateway.fetch_document("doc-1").await.unwrap_err() {
        DocShieldError::Network(NetworkError::Status { status, body, .. }) => {
            assert_eq!(status, 500);
            assert_eq!(body, format!("{}... (truncated)", "e".repeat(200)));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// ============================================================================
// Request shapes
// ============================================================================

#[tokio::test]
async fn test_upload_sends_file_part_and_processing_flags() {
    let seen: Recorder<SeenUpload> = Arc::default();
    let app = Router::new()
        .route("/ingest/upload", post(record_upload))
        .with_state(Arc::clone(&seen));
    let gateway = Arc::new(HttpGateway::with_base_url(&spawn_server(app).await).unwrap());
    let manager = DocumentLifecycleManager::new(gateway);

    let file = UploadFile::new("scan.pdf", None, b"%PDF-1.7".to_vec());
    let receipt = manager
        .submit(&file, ProcessingOptions::pii_detection())
        .await
        .unwrap();
    assert_eq!(receipt.document_id, "20240301_100000");
    assert_eq!(manager.phase(), LifecyclePhase::Submitted);

    let upload = seen.lock().unwrap().clone().expect("upload reached the server");
    assert_eq!(upload.query.get("ocr").map(String::as_str), Some("true"));
    assert_eq!(upload.query.get("detect_pii").map(String::as_str), Some("true"));
    assert_eq!(
        upload.query.get("analyze_layout").map(String::as_str),
        Some("false")
    );

    assert_eq!(upload.parts.len(), 1);
    let part = &upload.parts[0];
    assert_eq!(part.name, "file");
    assert_eq!(part.file_name.as_deref(), Some("scan.pdf"));
    assert_eq!(part.content_type.as_deref(), Some("application/pdf"));
    assert_eq!(part.bytes, b"%PDF-1.7");
}

#[tokio::test]
async fn test_redact_sends_color_form_field() {
    let seen: Recorder<HashMap<String, String>> = Arc::default();
    let app = Router::new()
        .route("/ingest/redact/:id", post(record_redaction))
        .with_state(Arc::clone(&seen));
    let gateway = HttpGateway::with_base_url(&spawn_server(app).await).unwrap();

    let response = gateway.redact("doc-1", "white").await.unwrap();
    assert_eq!(response.status.as_deref(), Some("success"));

    let form = seen.lock().unwrap().clone().expect("redaction reached the server");
    assert_eq!(form.get("redaction_color").map(String::as_str), Some("white"));
}

#[tokio::test]
async fn test_redact_with_empty_success_body_is_acknowledged() {
    let app = Router::new().route("/ingest/redact/:id", post(|| async { StatusCode::OK }));
    let gateway = Arc::new(HttpGateway::with_base_url(&spawn_server(app).await).unwrap());
    let manager = DocumentLifecycleManager::for_document(gateway, "doc-1").unwrap();

    let ack = manager
        .request_redaction("doc-1", &RedactionOptions::default())
        .await
        .unwrap();
    assert_eq!(ack.document_id, "doc-1");
    assert_eq!(ack.status, "");
    assert!(ack.message.is_none());
}

#[tokio::test]
async fn test_redact_with_non_json_success_body_is_acknowledged() {
    let app = Router::new().route("/ingest/redact/:id", post(|| async { "Redaction queued" }));
    let gateway = HttpGateway::with_base_url(&spawn_server(app).await).unwrap();

    let response = gateway.redact("doc-1", "black").await.unwrap();
    assert!(response.status.is_none());
}

// ============================================================================
// Response decoding
// ============================================================================

#[tokio::test]
async fn test_load_over_http_tolerates_wrong_typed_fields() {
    let app = Router::new().route(
        "/ingest/document/:id",
        get(|| async {
            Json(json!({
                "filename": "scan.pdf",
                "upload_date": "2024-03-01T10:00:00",
                "status": "success",
                "original_path": "uploads/scan.pdf",
                "pii": {
                    "status": "success",
                    "entity_count": 2,
                    "sensitivity": "high",
                    "entity_types": ["EMAIL", null]
                },
                "layout": {"status": "success", "pages": 1, "summary": []}
            }))
        }),
    );
    let gateway = Arc::new(HttpGateway::with_base_url(&spawn_server(app).await).unwrap());
    let manager = DocumentLifecycleManager::for_document(gateway, "doc-1").unwrap();

    let document = manager.load("doc-1").await.unwrap();
    assert_eq!(document.entity_types(), ["EMAIL"]);
    assert_eq!(manager.phase(), LifecyclePhase::Processed);
    assert!(manager.view().warnings.contains(&PartialData::InvalidField {
        field: "layout.summary".to_string()
    }));
}

#[tokio::test]
async fn test_audit_logs_feed_query_engine() {
    let app = Router::new().route(
        "/audit/logs",
        get(|| async {
            Json(json!([
                {"timestamp": "2024-03-01T10:00:00", "event_type": "document_upload", "document_id": "d1"},
                "not an entry"
            ]))
        }),
    );
    let gateway = HttpGateway::with_base_url(&spawn_server(app).await).unwrap();

    let engine = AuditQueryEngine::load(&gateway).await.unwrap();
    assert_eq!(engine.len(), 1);
    assert_eq!(engine.skipped(), 1);
    assert_eq!(engine.entries()[0].kind(), EventKind::Upload);
}
