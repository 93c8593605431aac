//! Client-side core of a document redaction service.
//!
//! [`DocumentLifecycleManager`] drives one document through upload,
//! processing, PII detection and redaction against the backend's REST API.
//! [`AuditQueryEngine`] searches, filters and sorts a snapshot of the audit log.

pub mod audit;
pub mod config;
pub mod document;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod sanitize;

pub use audit::{
    AuditLogEntry, AuditQuery, AuditQueryEngine, AuditSummary, AuditView, EventKind,
    SortDirection, SortField, StatusFilter,
};
pub use config::{load_config, load_config_from_str, ClientConfig, LoggingConfig};
pub use document::{
    Document, DocumentLifecycleManager, DocumentStatus, DocumentView, LifecyclePhase,
    ProcessingOptions, RedactionAck, RedactionOptions, Sensitivity, UploadFile, UploadReceipt,
};
pub use error::{ConfigError, DocShieldError, NetworkError, Result, ValidationError};
pub use gateway::{ApiGateway, HttpGateway};
pub use logging::init_logging;
