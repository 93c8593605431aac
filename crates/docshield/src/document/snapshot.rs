//! Conversion of backend responses into complete [`Document`] snapshots.
//!
//! Every optional field has a fixed fallback. Each time one is used a
//! [`PartialData`] warning is recorded next to the snapshot instead of failing.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

use super::model::{
    Document, DocumentStatus, LayoutSummary, OcrSummary, PiiDetectionResult, RedactionResult,
    Sensitivity, StageSummary,
};
use crate::error::{DocShieldError, NetworkError, Result};
use crate::gateway::wire::{DocumentResponse, PiiResponse, RedactionResponse, UploadResponse};

/// A field missing from, or malformed in, an otherwise successful response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PartialData {
    MissingFilename,
    MissingStatus,
    MissingUploadDate,
    UnparseableUploadDate { value: String },
    MissingOriginalPath,
    MissingSensitivity,
    UnknownSensitivity { value: String },
    MissingEntityTypes,
    MissingEntityCount,
    MissingRedactionStatus,
    /// A field had an unexpected JSON type and was dropped, or partly dropped.
    InvalidField { field: String },
}

impl std::fmt::Display for PartialData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartialData::MissingFilename => write!(f, "filename missing"),
            PartialData::MissingStatus => write!(f, "status missing, shown as processing"),
            PartialData::MissingUploadDate => write!(f, "upload date missing"),
            PartialData::UnparseableUploadDate { value } => {
                write!(f, "upload date '{}' could not be parsed", value)
            }
            PartialData::MissingOriginalPath => write!(f, "original path missing"),
            PartialData::MissingSensitivity => write!(f, "sensitivity missing, assuming low"),
            PartialData::UnknownSensitivity { value } => {
                write!(f, "unknown sensitivity '{}', assuming low", value)
            }
            PartialData::MissingEntityTypes => write!(f, "entity types missing"),
            PartialData::MissingEntityCount => write!(f, "entity count missing, assuming 0"),
            PartialData::MissingRedactionStatus => write!(f, "redaction status missing"),
            PartialData::InvalidField { field } => {
                write!(f, "field '{}' had an unexpected type and was ignored", field)
            }
        }
    }
}

/// A complete document plus the fallbacks applied while building it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub document: Document,
    pub warnings: Vec<PartialData>,
}

/// Identity of a freshly uploaded document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub document_id: String,
    pub status: DocumentStatus,
    pub filename: String,
}

/// Upload statuses accepted as success. Both are treated identically.
pub const ACCEPTED_UPLOAD_STATUSES: &[&str] = &["success", "uploaded"];

/// Parses RFC 3339, or a naive ISO-8601 date-time interpreted as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Builds the initial snapshot from an upload response.
///
/// Fails unless the response carries an accepted status and a document id.
pub fn snapshot_from_upload(response: &UploadResponse, local_filename: &str) -> Result<Snapshot> {
    let status = response.status.as_deref().unwrap_or_default();
    if !ACCEPTED_UPLOAD_STATUSES.contains(&status) {
        return Err(NetworkError::Rejected {
            operation: "Upload".to_string(),
            message: format!("unexpected upload status '{}'", status),
        }
        .into());
    }

    let document_id = match response.document_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => {
            return Err(DocShieldError::Network(NetworkError::Decode {
                operation: "Upload".to_string(),
                message: "response has no document_id".to_string(),
            }))
        }
    };

    let mut warnings = Vec::new();
    let original_path = response.file_path.clone();
    if original_path.is_none() {
        warnings.push(PartialData::MissingOriginalPath);
    }

    Ok(Snapshot {
        document: Document {
            id: document_id,
            filename: response
                .filename
                .clone()
                .unwrap_or_else(|| local_filename.to_string()),
            upload_date: None,
            status: DocumentStatus::from(status),
            original_path,
            pii: None,
            redaction: None,
            preprocessing: None,
            ocr: None,
            layout: None,
        },
        warnings,
    })
}

/// Builds a complete snapshot from a document fetch.
///
/// Nothing from any earlier snapshot is consulted.
pub fn snapshot_from_response(document_id: &str, response: DocumentResponse) -> Snapshot {
    let mut warnings: Vec<PartialData> = response
        .invalid_fields
        .iter()
        .map(|field| PartialData::InvalidField {
            field: field.clone(),
        })
        .collect();

    let filename = response.filename.unwrap_or_else(|| {
        warnings.push(PartialData::MissingFilename);
        String::new()
    });

    let status = match response.status {
        Some(s) => DocumentStatus::from(s),
        None => {
            warnings.push(PartialData::MissingStatus);
            DocumentStatus::Processing
        }
    };

    let upload_date = match response.upload_date {
        Some(raw) => {
            let parsed = parse_timestamp(&raw);
            if parsed.is_none() {
                warnings.push(PartialData::UnparseableUploadDate { value: raw });
            }
            parsed
        }
        None => {
            warnings.push(PartialData::MissingUploadDate);
            None
        }
    };

    if response.original_path.is_none() {
        warnings.push(PartialData::MissingOriginalPath);
    }

    let pii = response.pii.map(|p| pii_from_response(p, &mut warnings));
    let redaction = response
        .redaction
        .map(|r| redaction_from_response(r, &mut warnings));

    Snapshot {
        document: Document {
            id: document_id.to_string(),
            filename,
            upload_date,
            status,
            original_path: response.original_path,
            pii,
            redaction,
            preprocessing: response.preprocessing.map(|s| StageSummary {
                status: s.status.unwrap_or_default(),
                pages: s.pages.unwrap_or(0),
            }),
            ocr: response.ocr.map(|o| OcrSummary {
                status: o.status.unwrap_or_default(),
                pages: o.pages.unwrap_or(0),
                text_preview: o.text_preview,
            }),
            layout: response.layout.map(|l| LayoutSummary {
                status: l.status.unwrap_or_default(),
                pages: l.pages.unwrap_or(0),
                summary: l.summary.unwrap_or_default(),
            }),
        },
        warnings,
    }
}

fn pii_from_response(pii: PiiResponse, warnings: &mut Vec<PartialData>) -> PiiDetectionResult {
    let sensitivity = match pii.sensitivity {
        Some(raw) => Sensitivity::parse(&raw).unwrap_or_else(|| {
            warnings.push(PartialData::UnknownSensitivity { value: raw });
            Sensitivity::Low
        }),
        None => {
            warnings.push(PartialData::MissingSensitivity);
            Sensitivity::Low
        }
    };

    let entity_types = match pii.entity_types {
        Some(types) => {
            let mut unique: Vec<String> = Vec::with_capacity(types.len());
            for label in types {
                if !unique.contains(&label) {
                    unique.push(label);
                }
            }
            unique
        }
        None => {
            warnings.push(PartialData::MissingEntityTypes);
            Vec::new()
        }
    };

    let entity_count = pii.entity_count.unwrap_or_else(|| {
        warnings.push(PartialData::MissingEntityCount);
        0
    });

    PiiDetectionResult {
        entity_count,
        sensitivity,
        entity_types,
    }
}

fn redaction_from_response(
    redaction: RedactionResponse,
    warnings: &mut Vec<PartialData>,
) -> RedactionResult {
    let status = redaction.status.unwrap_or_else(|| {
        warnings.push(PartialData::MissingRedactionStatus);
        String::new()
    });

    RedactionResult {
        status,
        pages: redaction.pages.unwrap_or(0),
        total_redactions: redaction.total_redactions.unwrap_or(0),
        pdf_path: redaction.pdf.and_then(|pdf| pdf.path),
    }
}
