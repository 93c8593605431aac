//! In-memory `ApiGateway` with scripted responses.
//!
//! Responses are queued per endpoint and handed out in call order. A queued
//! document fetch can be held back on a gate until the test releases it,
//! which lets tests complete requests out of order.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::oneshot;

use docshield::document::{ProcessingOptions, UploadFile};
use docshield::error::{DocShieldError, NetworkError, Result};
use docshield::gateway::{ApiGateway, DocumentResponse, RedactResponse, UploadResponse};

struct ScriptedFetch {
    response: Result<DocumentResponse>,
    gate: Option<oneshot::Receiver<()>>,
}

/// A recorded upload call.
#[derive(Debug, Clone)]
pub struct UploadCall {
    pub filename: String,
    pub mime_type: String,
    pub options: ProcessingOptions,
}

#[derive(Default)]
pub struct FakeGateway {
    uploads: Mutex<VecDeque<Result<UploadResponse>>>,
    fetches: Mutex<VecDeque<ScriptedFetch>>,
    redactions: Mutex<VecDeque<Result<RedactResponse>>>,
    audit_logs: Mutex<Vec<serde_json::Value>>,
    upload_calls: Mutex<Vec<UploadCall>>,
    redaction_colors: Mutex<Vec<String>>,
    fetch_count: AtomicUsize,
    audit_count: AtomicUsize,
}

fn exhausted(operation: &str) -> DocShieldError {
    NetworkError::Request {
        operation: operation.to_string(),
        message: "no scripted response left".to_string(),
    }
    .into()
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_upload(&self, response: Result<UploadResponse>) {
        self.uploads.lock().unwrap().push_back(response);
    }

    pub fn push_fetch(&self, response: Result<DocumentResponse>) {
        self.fetches.lock().unwrap().push_back(ScriptedFetch {
            response,
            gate: None,
        });
    }

    /// Queues a fetch response that is only returned once the sender fires.
    pub fn push_gated_fetch(&self, response: Result<DocumentResponse>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.fetches.lock().unwrap().push_back(ScriptedFetch {
            response,
            gate: Some(rx),
        });
        tx
    }

    pub fn push_redaction(&self, response: Result<RedactResponse>) {
        self.redactions.lock().unwrap().push_back(response);
    }

    pub fn set_audit_logs(&self, entries: Vec<serde_json::Value>) {
        *self.audit_logs.lock().unwrap() = entries;
    }

    pub fn upload_calls(&self) -> Vec<UploadCall> {
        self.upload_calls.lock().unwrap().clone()
    }

    pub fn redaction_colors(&self) -> Vec<String> {
        self.redaction_colors.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    pub fn audit_count(&self) -> usize {
        self.audit_count.load(Ordering::SeqCst)
    }

    /// Total number of requests that reached the gateway.
    pub fn total_calls(&self) -> usize {
        self.upload_calls.lock().unwrap().len()
            + self.redaction_colors.lock().unwrap().len()
            + self.fetch_count()
            + self.audit_count()
    }
}

#[async_trait]
impl ApiGateway for FakeGateway {
    async fn upload(
        &self,
        file: &UploadFile,
        mime_type: &str,
        options: ProcessingOptions,
    ) -> Result<UploadResponse> {
        self.upload_calls.lock().unwrap().push(UploadCall {
            filename: file.filename.clone(),
            mime_type: mime_type.to_string(),
            options,
        });
        self.uploads
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(exhausted("Upload")))
    }

    async fn fetch_document(&self, _document_id: &str) -> Result<DocumentResponse> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        let scripted = self.fetches.lock().unwrap().pop_front();
        let Some(scripted) = scripted else {
            return Err(exhausted("Fetch document"));
        };
        if let Some(gate) = scripted.gate {
            let _ = gate.await;
        }
        scripted.response
    }

    async fn redact(&self, _document_id: &str, redaction_color: &str) -> Result<RedactResponse> {
        self.redaction_colors
            .lock()
            .unwrap()
            .push(redaction_color.to_string());
        self.redactions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(exhausted("Redaction")))
    }

    async fn fetch_audit_logs(&self) -> Result<Vec<serde_json::Value>> {
        self.audit_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.audit_logs.lock().unwrap().clone())
    }
}
