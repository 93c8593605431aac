//! Audit log entries with a typed, per-event `details` payload.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::document::snapshot::parse_timestamp;

/// Kind of audited event, derived from the entry's event type label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Upload,
    Redaction,
    PiiDetection,
    Other,
}

impl EventKind {
    /// Maps a raw label such as `upload` or `document_redaction` to a kind.
    pub fn classify(label: Option<&str>) -> Self {
        let label = match label {
            Some(l) => l.trim().to_ascii_lowercase(),
            None => return EventKind::Other,
        };
        let label = label.strip_prefix("document_").unwrap_or(&label);
        match label {
            "upload" => EventKind::Upload,
            "redaction" | "redact" => EventKind::Redaction,
            "pii_detection" | "pii" => EventKind::PiiDetection,
            _ => EventKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Upload => "upload",
            EventKind::Redaction => "redaction",
            EventKind::PiiDetection => "pii_detection",
            EventKind::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UploadDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RedactionDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_redactions: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PiiDetectionDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_types: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensitivity: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OtherDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `details` bag of an entry, one variant per event kind.
///
/// Keys that are absent, or present with an unexpected JSON type, stay in
/// `extra` untouched so they remain searchable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AuditDetails {
    Upload(UploadDetails),
    Redaction(RedactionDetails),
    PiiDetection(PiiDetectionDetails),
    Other(OtherDetails),
}

fn take_str(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key) {
        Some(Value::String(_)) => match map.remove(key) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        },
        _ => None,
    }
}

fn take_u64(map: &mut Map<String, Value>, key: &str) -> Option<u64> {
    let value = map.get(key).and_then(Value::as_u64)?;
    map.remove(key);
    Some(value)
}

fn take_str_list(map: &mut Map<String, Value>, key: &str) -> Option<Vec<String>> {
    let items = map.get(key).and_then(Value::as_array)?;
    let labels: Option<Vec<String>> = items
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect();
    let labels = labels?;
    map.remove(key);
    Some(labels)
}

impl AuditDetails {
    /// Builds the typed payload for `kind` from a raw JSON object.
    pub fn from_map(kind: EventKind, mut map: Map<String, Value>) -> Self {
        let status = take_str(&mut map, "status");
        let filename = take_str(&mut map, "filename");

        match kind {
            EventKind::Upload => AuditDetails::Upload(UploadDetails {
                status,
                filename,
                file_size: take_u64(&mut map, "file_size"),
                content_type: take_str(&mut map, "content_type"),
                extra: map,
            }),
            EventKind::Redaction => AuditDetails::Redaction(RedactionDetails {
                status,
                filename,
                total_redactions: take_u64(&mut map, "total_redactions"),
                pages: take_u64(&mut map, "pages"),
                extra: map,
            }),
            EventKind::PiiDetection => AuditDetails::PiiDetection(PiiDetectionDetails {
                status,
                filename,
                entity_count: take_u64(&mut map, "entity_count"),
                entity_types: take_str_list(&mut map, "entity_types"),
                sensitivity: take_str(&mut map, "sensitivity"),
                extra: map,
            }),
            EventKind::Other => AuditDetails::Other(OtherDetails {
                status,
                filename,
                extra: map,
            }),
        }
    }

    /// Builds the payload from whatever the backend put under `details`.
    ///
    /// Objects are used directly; strings holding a JSON object (as stored by
    /// the database-backed logger) are decoded; anything else is kept under
    /// `extra["value"]`.
    pub fn from_value(kind: EventKind, value: Option<&Value>) -> Self {
        let map = match value {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(Value::String(s)) => match serde_json::from_str::<Value>(s) {
                Ok(Value::Object(map)) => map,
                _ => single_value(Value::String(s.clone())),
            },
            Some(other) => single_value(other.clone()),
        };
        Self::from_map(kind, map)
    }

    pub fn kind(&self) -> EventKind {
        match self {
            AuditDetails::Upload(_) => EventKind::Upload,
            AuditDetails::Redaction(_) => EventKind::Redaction,
            AuditDetails::PiiDetection(_) => EventKind::PiiDetection,
            AuditDetails::Other(_) => EventKind::Other,
        }
    }

    pub fn status(&self) -> Option<&str> {
        match self {
            AuditDetails::Upload(d) => d.status.as_deref(),
            AuditDetails::Redaction(d) => d.status.as_deref(),
            AuditDetails::PiiDetection(d) => d.status.as_deref(),
            AuditDetails::Other(d) => d.status.as_deref(),
        }
    }

    pub fn filename(&self) -> Option<&str> {
        match self {
            AuditDetails::Upload(d) => d.filename.as_deref(),
            AuditDetails::Redaction(d) => d.filename.as_deref(),
            AuditDetails::PiiDetection(d) => d.filename.as_deref(),
            AuditDetails::Other(d) => d.filename.as_deref(),
        }
    }

    pub fn extra(&self) -> &Map<String, Value> {
        match self {
            AuditDetails::Upload(d) => &d.extra,
            AuditDetails::Redaction(d) => &d.extra,
            AuditDetails::PiiDetection(d) => &d.extra,
            AuditDetails::Other(d) => &d.extra,
        }
    }

    /// An `event_type` key inside the details, if the backend put one there.
    pub fn event_type(&self) -> Option<&str> {
        self.extra().get("event_type").and_then(Value::as_str)
    }

    /// JSON rendering used for free-text search.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

fn single_value(value: Value) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("value".to_string(), value);
    map
}

impl Default for AuditDetails {
    fn default() -> Self {
        AuditDetails::Other(OtherDetails::default())
    }
}

/// One recorded event in the document-processing history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// The timestamp exactly as sent, kept for display when it did not parse.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Top-level status, consulted only when `details` has none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub details: AuditDetails,
}

fn str_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
}

impl AuditLogEntry {
    /// Parses one element of the `/audit/logs` array. Non-objects yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;

        let raw_timestamp = str_field(obj, "timestamp");
        let timestamp = raw_timestamp.as_deref().and_then(parse_timestamp);
        let event_type = str_field(obj, "event_type").or_else(|| str_field(obj, "action"));
        let document_id = match obj.get("document_id") {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        let details_event_type = obj
            .get("details")
            .and_then(|d| d.get("event_type"))
            .and_then(Value::as_str);
        let kind = EventKind::classify(event_type.as_deref().or(details_event_type));
        Some(Self {
            timestamp,
            raw_timestamp,
            event_type,
            document_id,
            filename: str_field(obj, "filename"),
            status: str_field(obj, "status"),
            details: AuditDetails::from_value(kind, obj.get("details")),
        })
    }

    pub fn kind(&self) -> EventKind {
        self.details.kind()
    }

    /// `details.status`, else the top-level `status`.
    pub fn resolved_status(&self) -> Option<&str> {
        self.details.status().or(self.status.as_deref())
    }

    /// Top-level `filename`, else `details.filename`.
    pub fn resolved_filename(&self) -> Option<&str> {
        self.filename.as_deref().or_else(|| self.details.filename())
    }

    /// Top-level event type, else `details.event_type`.
    pub fn resolved_event_type(&self) -> Option<&str> {
        self.event_type
            .as_deref()
            .or_else(|| self.details.event_type())
    }

    /// Rows without a document id cannot be linked to a document.
    pub fn is_navigable(&self) -> bool {
        self.document_id.is_some()
    }
}
