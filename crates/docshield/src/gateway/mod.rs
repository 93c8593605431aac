//! The backend's REST contract.

pub mod http;
pub mod wire;

use async_trait::async_trait;

use crate::document::{ProcessingOptions, UploadFile};
use crate::error::Result;

pub use http::HttpGateway;
pub use wire::{DocumentResponse, RedactResponse, UploadResponse};

/// The four ingest/audit endpoints the client relies on.
///
/// Implementations hold no document state. `upload` receives a file that has
/// already passed validation along with the MIME type to send.
#[async_trait]
pub trait ApiGateway: Send + Sync {
    /// `POST /ingest/upload`
    async fn upload(
        &self,
        file: &UploadFile,
        mime_type: &str,
        options: ProcessingOptions,
    ) -> Result<UploadResponse>;

    /// `GET /ingest/document/{document_id}`
    async fn fetch_document(&self, document_id: &str) -> Result<DocumentResponse>;

    /// `POST /ingest/redact/{document_id}`
    async fn redact(&self, document_id: &str, redaction_color: &str) -> Result<RedactResponse>;

    /// `GET /audit/logs`, one JSON value per entry.
    async fn fetch_audit_logs(&self) -> Result<Vec<serde_json::Value>>;
}
