//! Document snapshot types as held by the client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Processing status reported by the backend.
///
/// Unknown strings are preserved verbatim; the client never invents a status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DocumentStatus {
    Uploaded,
    Processing,
    Success,
    Error,
    Other(String),
}

impl DocumentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            DocumentStatus::Uploaded => "uploaded",
            DocumentStatus::Processing => "processing",
            DocumentStatus::Success => "success",
            DocumentStatus::Error => "error",
            DocumentStatus::Other(s) => s,
        }
    }
}

impl From<String> for DocumentStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "uploaded" => DocumentStatus::Uploaded,
            "processing" => DocumentStatus::Processing,
            "success" => DocumentStatus::Success,
            "error" => DocumentStatus::Error,
            _ => DocumentStatus::Other(s),
        }
    }
}

impl From<&str> for DocumentStatus {
    fn from(s: &str) -> Self {
        DocumentStatus::from(s.to_string())
    }
}

impl From<DocumentStatus> for String {
    fn from(status: DocumentStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which backend stages to run, fixed at upload time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingOptions {
    pub ocr: bool,
    pub detect_pii: bool,
    pub analyze_layout: bool,
}

impl ProcessingOptions {
    pub fn ocr_only() -> Self {
        Self {
            ocr: true,
            detect_pii: false,
            analyze_layout: false,
        }
    }

    /// PII detection needs OCR text, so OCR is enabled as well.
    pub fn pii_detection() -> Self {
        Self {
            ocr: true,
            detect_pii: true,
            analyze_layout: false,
        }
    }

    pub fn full_pipeline() -> Self {
        Self {
            ocr: true,
            detect_pii: true,
            analyze_layout: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    #[default]
    Low,
    Medium,
    High,
}

impl Sensitivity {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Sensitivity::Low),
            "medium" => Some(Sensitivity::Medium),
            "high" => Some(Sensitivity::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sensitivity::Low => "low",
            Sensitivity::Medium => "medium",
            Sensitivity::High => "high",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PiiDetectionResult {
    pub entity_count: u64,
    pub sensitivity: Sensitivity,
    /// Labels in display order, without duplicates.
    pub entity_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactionResult {
    pub status: String,
    pub pages: u64,
    pub total_redactions: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_path: Option<String>,
}

impl RedactionResult {
    /// The redacted artifact path, if the backend produced one.
    pub fn redacted_pdf(&self) -> Option<&str> {
        self.pdf_path.as_deref().filter(|p| !p.trim().is_empty())
    }
}

/// Summary of a backend stage that reports a status and a page count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageSummary {
    pub status: String,
    pub pages: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrSummary {
    pub status: String,
    pub pages: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_preview: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSummary {
    pub status: String,
    pub pages: u64,
    pub summary: serde_json::Map<String, serde_json::Value>,
}

/// Full client-side view of one backend document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<DateTime<Utc>>,
    pub status: DocumentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pii: Option<PiiDetectionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redaction: Option<RedactionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preprocessing: Option<StageSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr: Option<OcrSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutSummary>,
}

impl Document {
    /// Whether a redacted artifact exists. Only `redaction.pdf.path` counts.
    pub fn has_redacted_version(&self) -> bool {
        self.redacted_pdf_path().is_some()
    }

    pub fn redacted_pdf_path(&self) -> Option<&str> {
        self.redaction.as_ref().and_then(RedactionResult::redacted_pdf)
    }

    pub fn sensitivity(&self) -> Sensitivity {
        self.pii.as_ref().map(|p| p.sensitivity).unwrap_or_default()
    }

    pub fn entity_types(&self) -> &[String] {
        self.pii
            .as_ref()
            .map(|p| p.entity_types.as_slice())
            .unwrap_or(&[])
    }
}
