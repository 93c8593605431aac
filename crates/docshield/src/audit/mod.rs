//! Audit log snapshot and the search/filter/sort engine over it.

pub mod entry;
pub mod query;

pub use entry::{
    AuditDetails, AuditLogEntry, EventKind, OtherDetails, PiiDetectionDetails, RedactionDetails,
    UploadDetails,
};
pub use query::{
    apply_query, AuditQuery, AuditQueryEngine, AuditSummary, AuditView, InvalidQueryValue,
    SortDirection, SortField, StatusFilter,
};
