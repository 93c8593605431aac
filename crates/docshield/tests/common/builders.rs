//! Builders for backend response bodies.

#![allow(dead_code)]

use serde_json::{json, Map, Value};

use docshield::gateway::{DocumentResponse, RedactResponse, UploadResponse};

pub fn upload_response(status: &str, document_id: &str, filename: &str) -> UploadResponse {
    serde_json::from_value(json!({
        "status": status,
        "document_id": document_id,
        "filename": filename,
        "content_type": "application/pdf",
        "file_path": format!("uploads/{}_{}", document_id, filename),
    }))
    .expect("valid upload response")
}

pub fn redact_response(status: &str, message: Option<&str>) -> RedactResponse {
    let mut body = json!({ "status": status });
    if let Some(message) = message {
        body["message"] = json!(message);
    }
    serde_json::from_value(body).expect("valid redact response")
}

/// Builder for `GET /ingest/document/{id}` bodies.
pub struct DocumentResponseBuilder {
    body: Map<String, Value>,
}

impl DocumentResponseBuilder {
    /// A processed document with no PII or redaction blocks.
    pub fn new(document_id: &str) -> Self {
        let mut body = Map::new();
        body.insert("document_id".into(), json!(document_id));
        body.insert("filename".into(), json!("scan.pdf"));
        body.insert("upload_date".into(), json!("2024-03-01T10:00:00"));
        body.insert("status".into(), json!("success"));
        body.insert("original_path".into(), json!("uploads/scan.pdf"));
        Self { body }
    }

    pub fn status(mut self, status: &str) -> Self {
        self.body.insert("status".into(), json!(status));
        self
    }

    pub fn filename(mut self, filename: &str) -> Self {
        self.body.insert("filename".into(), json!(filename));
        self
    }

    pub fn pii(mut self, sensitivity: &str, entity_types: &[&str]) -> Self {
        self.body.insert(
            "pii".into(),
            json!({
                "status": "success",
                "entity_count": entity_types.len(),
                "sensitivity": sensitivity,
                "entity_types": entity_types,
            }),
        );
        self
    }

    pub fn redacted(mut self, pdf_path: &str) -> Self {
        self.body.insert(
            "redaction".into(),
            json!({
                "status": "success",
                "pages": 2,
                "total_redactions": 3,
                "pdf": { "filename": "scan_redacted.pdf", "path": pdf_path },
            }),
        );
        self
    }

    /// Sets a raw top-level field, whatever its JSON type.
    pub fn set(mut self, key: &str, value: Value) -> Self {
        self.body.insert(key.into(), value);
        self
    }

    pub fn without(mut self, key: &str) -> Self {
        self.body.remove(key);
        self
    }

    pub fn build(self) -> DocumentResponse {
        serde_json::from_value(Value::Object(self.body)).expect("valid document response")
    }
}
