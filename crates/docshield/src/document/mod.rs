//! Document lifecycle: upload validation, snapshots, and the per-document manager.

pub mod lifecycle;
pub mod model;
pub mod snapshot;
pub mod upload;

pub use lifecycle::{
    DocumentLifecycleManager, DocumentState, DocumentView, LifecyclePhase, RedactionAck,
    RedactionOptions,
};
pub use model::{
    Document, DocumentStatus, LayoutSummary, OcrSummary, PiiDetectionResult, ProcessingOptions,
    RedactionResult, Sensitivity, StageSummary,
};
pub use snapshot::{PartialData, Snapshot, UploadReceipt};
pub use upload::{UploadFile, ALLOWED_MIME_TYPES, MAX_UPLOAD_BYTES};
