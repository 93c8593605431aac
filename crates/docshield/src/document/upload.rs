//! Local upload payloads and the checks run before any request is made.

use std::path::Path;

use crate::error::ValidationError;

/// Largest file accepted for upload (10 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// MIME types the ingest endpoint accepts.
pub const ALLOWED_MIME_TYPES: &[&str] = &["application/pdf", "image/jpeg", "image/png", "image/tiff"];

/// A file selected for upload.
#[derive(Clone)]
pub struct UploadFile {
    pub filename: String,
    /// Explicit MIME type. When absent it is guessed from the filename.
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadFile")
            .field("filename", &self.filename)
            .field("mime_type", &self.mime_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl UploadFile {
    pub fn new(filename: impl Into<String>, mime_type: Option<&str>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mime_type: mime_type.map(|m| m.to_string()),
            bytes,
        }
    }

    /// Reads a file from disk, rejecting oversize files before reading their contents.
    pub async fn from_path(path: &Path) -> Result<Self, ValidationError> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| ValidationError::ReadFile {
                path: path.to_path_buf(),
                source: e,
            })?;
        check_size(&filename, metadata.len())?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ValidationError::ReadFile {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(Self {
            filename,
            mime_type: None,
            bytes,
        })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// The explicit MIME type, or the one guessed from the extension.
    pub fn effective_mime_type(&self) -> String {
        match &self.mime_type {
            Some(m) if !m.trim().is_empty() => m.trim().to_ascii_lowercase(),
            _ => mime_guess::from_path(&self.filename)
                .first_raw()
                .unwrap_or("application/octet-stream")
                .to_string(),
        }
    }

    /// Checks size and type. Returns the MIME type to send.
    pub fn validate(&self) -> Result<String, ValidationError> {
        check_size(&self.filename, self.size())?;

        let mime_type = self.effective_mime_type();
        if !ALLOWED_MIME_TYPES.contains(&mime_type.as_str()) {
            return Err(ValidationError::UnsupportedMimeType {
                filename: self.filename.clone(),
                mime_type,
            });
        }

        Ok(mime_type)
    }
}

fn check_size(filename: &str, size: u64) -> Result<(), ValidationError> {
    if size > MAX_UPLOAD_BYTES {
        return Err(ValidationError::FileTooLarge {
            filename: filename.to_string(),
            size,
            limit: MAX_UPLOAD_BYTES,
        });
    }
    Ok(())
}
