//! Response bodies of the ingest endpoints, as sent by the backend.
//!
//! Every field is optional here; deciding what a missing field means is left
//! to the snapshot conversion in `document::snapshot`.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Response from `POST /ingest/upload`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
}

/// Response from `GET /ingest/document/{id}`.
///
/// Decoded leniently: a field with an unexpected JSON type is dropped and its
/// dotted path recorded in `invalid_fields`, so one bad field never costs the
/// whole snapshot. `null` counts as absent.
#[derive(Debug, Clone, Default)]
pub struct DocumentResponse {
    pub document_id: Option<String>,
    pub filename: Option<String>,
    pub upload_date: Option<String>,
    pub status: Option<String>,
    pub original_path: Option<String>,
    pub pii: Option<PiiResponse>,
    pub redaction: Option<RedactionResponse>,
    pub preprocessing: Option<StageResponse>,
    pub ocr: Option<OcrResponse>,
    pub layout: Option<LayoutResponse>,
    pub invalid_fields: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PiiResponse {
    pub status: Option<String>,
    pub entity_count: Option<u64>,
    pub sensitivity: Option<String>,
    pub entity_types: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct RedactionResponse {
    pub status: Option<String>,
    pub pages: Option<u64>,
    pub total_redactions: Option<u64>,
    pub pdf: Option<PdfArtifact>,
}

#[derive(Debug, Clone, Default)]
pub struct PdfArtifact {
    pub path: Option<String>,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StageResponse {
    pub status: Option<String>,
    pub pages: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct OcrResponse {
    pub status: Option<String>,
    pub pages: Option<u64>,
    pub text_preview: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LayoutResponse {
    pub status: Option<String>,
    pub pages: Option<u64>,
    pub summary: Option<Map<String, Value>>,
}

/// Pulls typed fields out of one JSON object, noting the ones of the wrong type.
struct FieldReader<'a> {
    map: Map<String, Value>,
    prefix: &'a str,
    invalid: &'a mut Vec<String>,
}

impl<'a> FieldReader<'a> {
    fn new(map: Map<String, Value>, prefix: &'a str, invalid: &'a mut Vec<String>) -> Self {
        Self {
            map,
            prefix,
            invalid,
        }
    }

    fn mark_invalid(&mut self, key: &str) {
        let path = if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.prefix, key)
        };
        self.invalid.push(path);
    }

    /// Takes `key`, treating absent and `null` alike.
    fn take(&mut self, key: &str) -> Option<Value> {
        match self.map.remove(key) {
            None | Some(Value::Null) => None,
            Some(value) => Some(value),
        }
    }

    fn string(&mut self, key: &str) -> Option<String> {
        match self.take(key)? {
            Value::String(s) => Some(s),
            _ => {
                self.mark_invalid(key);
                None
            }
        }
    }

    fn count(&mut self, key: &str) -> Option<u64> {
        let value = self.take(key)?;
        let parsed = value.as_u64();
        if parsed.is_none() {
            self.mark_invalid(key);
        }
        parsed
    }

    fn object(&mut self, key: &str) -> Option<Map<String, Value>> {
        match self.take(key)? {
            Value::Object(map) => Some(map),
            _ => {
                self.mark_invalid(key);
                None
            }
        }
    }

    /// Keeps the string elements of an array. Any other element marks the field.
    fn string_list(&mut self, key: &str) -> Option<Vec<String>> {
        let items = match self.take(key)? {
            Value::Array(items) => items,
            _ => {
                self.mark_invalid(key);
                return None;
            }
        };
        let total = items.len();
        let labels: Vec<String> = items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect();
        if labels.len() != total {
            self.mark_invalid(key);
        }
        Some(labels)
    }
}

impl DocumentResponse {
    /// Decodes a document body. Only a non-object body is an error.
    pub fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Object(map) => Ok(Self::from_map(map)),
            other => Err(format!("expected a JSON object, got {}", json_type(&other))),
        }
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        let mut invalid = Vec::new();
        let mut fields = FieldReader::new(map, "", &mut invalid);

        let document_id = fields.string("document_id");
        let filename = fields.string("filename");
        let upload_date = fields.string("upload_date");
        let status = fields.string("status");
        let original_path = fields.string("original_path");
        let pii = fields.object("pii");
        let redaction = fields.object("redaction");
        let preprocessing = fields.object("preprocessing");
        let ocr = fields.object("ocr");
        let layout = fields.object("layout");

        let pii = pii.map(|map| {
            let mut f = FieldReader::new(map, "pii", &mut invalid);
            PiiResponse {
                status: f.string("status"),
                entity_count: f.count("entity_count"),
                sensitivity: f.string("sensitivity"),
                entity_types: f.string_list("entity_types"),
            }
        });

        let redaction = redaction.map(|map| {
            let mut f = FieldReader::new(map, "redaction", &mut invalid);
            let status = f.string("status");
            let pages = f.count("pages");
            let total_redactions = f.count("total_redactions");
            let pdf = f.object("pdf");
            let pdf = pdf.map(|map| {
                let mut f = FieldReader::new(map, "redaction.pdf", &mut invalid);
                PdfArtifact {
                    path: f.string("path"),
                    filename: f.string("filename"),
                }
            });
            RedactionResponse {
                status,
                pages,
                total_redactions,
                pdf,
            }
        });

        let preprocessing = preprocessing.map(|map| {
            let mut f = FieldReader::new(map, "preprocessing", &mut invalid);
            StageResponse {
                status: f.string("status"),
                pages: f.count("pages"),
            }
        });

        let ocr = ocr.map(|map| {
            let mut f = FieldReader::new(map, "ocr", &mut invalid);
            OcrResponse {
                status: f.string("status"),
                pages: f.count("pages"),
                text_preview: f.string("text_preview"),
            }
        });

        let layout = layout.map(|map| {
            let mut f = FieldReader::new(map, "layout", &mut invalid);
            LayoutResponse {
                status: f.string("status"),
                pages: f.count("pages"),
                summary: f.object("summary"),
            }
        });

        Self {
            document_id,
            filename,
            upload_date,
            status,
            original_path,
            pii,
            redaction,
            preprocessing,
            ocr,
            layout,
            invalid_fields: invalid,
        }
    }
}

impl<'de> Deserialize<'de> for DocumentResponse {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(D::Error::custom)
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Response from `POST /ingest/redact/{id}`. Only read to confirm success.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RedactResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
