//! Per-document lifecycle tracking: upload, fetch, redaction.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, info, warn};
use serde::Serialize;

use super::model::{Document, DocumentStatus, ProcessingOptions, Sensitivity};
use super::snapshot::{snapshot_from_response, snapshot_from_upload, PartialData, Snapshot, UploadReceipt};
use super::upload::UploadFile;
use crate::config::ClientConfig;
use crate::error::{DocShieldError, NetworkError, Result, ValidationError};
use crate::gateway::ApiGateway;
use crate::sanitize::{redact_id, redact_path};

/// Stage of a document as derived from the held snapshot. Display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePhase {
    Unsubmitted,
    Submitted,
    Processed,
    Failed,
    Redacted,
}

impl std::fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecyclePhase::Unsubmitted => write!(f, "Not uploaded"),
            LifecyclePhase::Submitted => write!(f, "Processing"),
            LifecyclePhase::Processed => write!(f, "Processed"),
            LifecyclePhase::Failed => write!(f, "Failed"),
            LifecyclePhase::Redacted => write!(f, "Redacted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactionOptions {
    pub redaction_color: String,
}

impl RedactionOptions {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            redaction_color: config.redaction_color.clone(),
        }
    }
}

impl Default for RedactionOptions {
    fn default() -> Self {
        Self {
            redaction_color: "black".to_string(),
        }
    }
}

/// Confirmation that the backend accepted a redaction request.
///
/// Carries no document state; reload the document to see the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactionAck {
    pub document_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Everything a renderer needs for one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    pub phase: LifecyclePhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<Document>,
    pub has_redacted_version: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redacted_pdf_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensitivity: Option<Sensitivity>,
    pub entity_types: Vec<String>,
    pub warnings: Vec<PartialData>,
}

/// Client-held state for a single document.
///
/// Only ever changed by [`DocumentState::apply`], which replaces the snapshot
/// wholesale. `applied_generation` is the ticket of the last applied response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentState {
    document_id: Option<String>,
    snapshot: Option<Snapshot>,
    applied_generation: u64,
}

impl DocumentState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State already bound to a known document that has not been fetched yet.
    pub fn for_document(document_id: &str) -> Self {
        Self {
            document_id: Some(document_id.to_string()),
            ..Self::default()
        }
    }

    pub fn document_id(&self) -> Option<&str> {
        self.document_id.as_deref()
    }

    pub fn document(&self) -> Option<&Document> {
        self.snapshot.as_ref().map(|s| &s.document)
    }

    pub fn warnings(&self) -> &[PartialData] {
        self.snapshot
            .as_ref()
            .map(|s| s.warnings.as_slice())
            .unwrap_or(&[])
    }

    pub fn applied_generation(&self) -> u64 {
        self.applied_generation
    }

    /// Fails if this state is bound to a different document.
    pub fn check_scope(&self, requested: &str) -> Result<()> {
        match &self.document_id {
            Some(bound) if bound != requested => Err(DocShieldError::ScopeMismatch {
                bound: bound.clone(),
                requested: requested.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Replaces the held snapshot with `snapshot`, unless a response with a
    /// newer ticket has already been applied.
    pub fn apply(&mut self, generation: u64, snapshot: Snapshot) -> Result<()> {
        if generation <= self.applied_generation {
            return Err(DocShieldError::Superseded {
                generation,
                applied: self.applied_generation,
            });
        }
        self.check_scope(&snapshot.document.id)?;

        self.document_id = Some(snapshot.document.id.clone());
        self.snapshot = Some(snapshot);
        self.applied_generation = generation;
        Ok(())
    }

    pub fn phase(&self) -> LifecyclePhase {
        let document = match self.document() {
            Some(doc) => doc,
            None if self.document_id.is_some() => return LifecyclePhase::Submitted,
            None => return LifecyclePhase::Unsubmitted,
        };

        if document.has_redacted_version() {
            return LifecyclePhase::Redacted;
        }
        match document.status {
            DocumentStatus::Success => LifecyclePhase::Processed,
            DocumentStatus::Error => LifecyclePhase::Failed,
            DocumentStatus::Uploaded | DocumentStatus::Processing | DocumentStatus::Other(_) => {
                LifecyclePhase::Submitted
            }
        }
    }

    pub fn view(&self) -> DocumentView {
        let document = self.document().cloned();
        DocumentView {
            document_id: self.document_id.clone(),
            phase: self.phase(),
            has_redacted_version: document
                .as_ref()
                .is_some_and(Document::has_redacted_version),
            redacted_pdf_path: document
                .as_ref()
                .and_then(|d| d.redacted_pdf_path().map(str::to_string)),
            sensitivity: document
                .as_ref()
                .and_then(|d| d.pii.as_ref().map(|p| p.sensitivity)),
            entity_types: document
                .as_ref()
                .map(|d| d.entity_types().to_vec())
                .unwrap_or_default(),
            warnings: self.warnings().to_vec(),
            document,
        }
    }
}

fn require_id(document_id: &str) -> Result<&str> {
    let trimmed = document_id.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyDocumentId.into());
    }
    Ok(trimmed)
}

/// Tracks one document through upload, processing and redaction.
///
/// Every response that replaces the snapshot is tagged with a ticket when its
/// request is issued. A response is only applied if no response with a newer
/// ticket has been applied in the meantime, so a slow, older response can
/// never overwrite a newer one. Requests are not de-duplicated.
pub struct DocumentLifecycleManager<G: ApiGateway> {
    gateway: Arc<G>,
    state: RwLock<DocumentState>,
    next_generation: AtomicU64,
}

impl<G: ApiGateway> DocumentLifecycleManager<G> {
    /// A manager for a document that has not been uploaded yet.
    pub fn new(gateway: Arc<G>) -> Self {
        Self::with_state(gateway, DocumentState::new())
    }

    /// A manager bound to an existing backend document. A blank id is rejected.
    pub fn for_document(gateway: Arc<G>, document_id: &str) -> Result<Self> {
        let document_id = require_id(document_id)?;
        Ok(Self::with_state(
            gateway,
            DocumentState::for_document(document_id),
        ))
    }

    pub fn with_state(gateway: Arc<G>, state: DocumentState) -> Self {
        let next_generation = AtomicU64::new(state.applied_generation());
        Self {
            gateway,
            state: RwLock::new(state),
            next_generation,
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, DocumentState> {
        match self.state.read() {
            Ok(g) => g,
            Err(poisoned) => {
                warn!("Document state lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, DocumentState> {
        match self.state.write() {
            Ok(g) => g,
            Err(poisoned) => {
                warn!("Document state lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn issue_ticket(&self) -> u64 {
        self.next_generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn apply(&self, generation: u64, snapshot: Snapshot) -> Result<Document> {
        let document = snapshot.document.clone();
        if !snapshot.warnings.is_empty() {
            warn!(
                "Document {} snapshot is incomplete: {}",
                redact_id(&document.id),
                snapshot
                    .warnings
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        if let Err(e) = self.write_state().apply(generation, snapshot) {
            if e.is_superseded() {
                debug!("Discarding response #{} for {}: {}", generation, redact_id(&document.id), e);
            }
            return Err(e);
        }
        Ok(document)
    }

    /// Uploads `file` with the given processing options.
    ///
    /// The file is validated before any request is made. On failure the held
    /// state is left as it was.
    pub async fn submit(
        &self,
        file: &UploadFile,
        options: ProcessingOptions,
    ) -> Result<UploadReceipt> {
        let mime_type = file.validate()?;
        if let Some(bound) = self.read_state().document_id() {
            return Err(DocShieldError::ScopeMismatch {
                bound: bound.to_string(),
                requested: file.filename.clone(),
            });
        }

        let generation = self.issue_ticket();
        let response = self.gateway.upload(file, &mime_type, options).await?;
        let snapshot = snapshot_from_upload(&response, &file.filename)?;

        let receipt = UploadReceipt {
            document_id: snapshot.document.id.clone(),
            status: snapshot.document.status.clone(),
            filename: snapshot.document.filename.clone(),
        };
        self.apply(generation, snapshot)?;

        info!(
            "Uploaded {} as document {} (status: {})",
            redact_path(&receipt.filename),
            redact_id(&receipt.document_id),
            receipt.status
        );
        Ok(receipt)
    }

    /// Fetches the document and replaces the held snapshot with it in full.
    pub async fn load(&self, document_id: &str) -> Result<Document> {
        let document_id = require_id(document_id)?;
        self.read_state().check_scope(document_id)?;

        let generation = self.issue_ticket();
        let response = self.gateway.fetch_document(document_id).await?;
        let snapshot = snapshot_from_response(document_id, response);
        let document = self.apply(generation, snapshot)?;

        debug!(
            "Applied snapshot #{} for {} (status: {})",
            generation,
            redact_id(document_id),
            document.status
        );
        Ok(document)
    }

    /// Asks the backend to redact the document.
    ///
    /// The held snapshot is not touched; call [`load`](Self::load) afterwards
    /// to see the redacted artifact.
    pub async fn request_redaction(
        &self,
        document_id: &str,
        options: &RedactionOptions,
    ) -> Result<RedactionAck> {
        let document_id = require_id(document_id)?;
        self.read_state().check_scope(document_id)?;

        let response = self
            .gateway
            .redact(document_id, &options.redaction_color)
            .await?;

        let status = response.status.unwrap_or_default();
        if status == "error" {
            return Err(NetworkError::Rejected {
                operation: "Redaction".to_string(),
                message: response
                    .message
                    .unwrap_or_else(|| "Unknown redaction error".to_string()),
            }
            .into());
        }

        info!(
            "Redaction accepted for {} (status: {})",
            redact_id(document_id),
            if status.is_empty() { "<none>" } else { status.as_str() }
        );
        Ok(RedactionAck {
            document_id: document_id.to_string(),
            status,
            message: response.message,
        })
    }

    /// Copy of the current state.
    pub fn state(&self) -> DocumentState {
        self.read_state().clone()
    }

    pub fn document_id(&self) -> Option<String> {
        self.read_state().document_id().map(str::to_string)
    }

    pub fn document(&self) -> Option<Document> {
        self.read_state().document().cloned()
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.read_state().phase()
    }

    pub fn view(&self) -> DocumentView {
        self.read_state().view()
    }
}
