use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocShieldError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Document not found: {document_id}")]
    NotFound { document_id: String },

    #[error("Response for request #{generation} superseded by request #{applied}")]
    Superseded { generation: u64, applied: u64 },

    #[error("Manager is bound to document '{bound}', refusing request for '{requested}'")]
    ScopeMismatch { bound: String, requested: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl DocShieldError {
    /// Returns true when the backend has no record of the requested document.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DocShieldError::NotFound { .. })
    }

    /// Returns true for responses that were dropped because a newer one was applied.
    pub fn is_superseded(&self) -> bool {
        matches!(self, DocShieldError::Superseded { .. })
    }

    /// Message suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            DocShieldError::Validation(e) => e.to_string(),
            DocShieldError::Network(e) => format!("Request failed: {}", e),
            DocShieldError::NotFound { .. } => {
                "Document not found. It may have been removed; try uploading it again.".to_string()
            }
            DocShieldError::Superseded { .. } => {
                "A newer response is already displayed.".to_string()
            }
            DocShieldError::ScopeMismatch { requested, .. } => {
                format!("Cannot open document '{}' in this view", requested)
            }
            DocShieldError::Config(e) => format!("Invalid configuration: {}", e),
        }
    }
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid file type '{mime_type}' for '{filename}'. Only PDF and images (JPEG, PNG, TIFF) are supported.")]
    UnsupportedMimeType { filename: String, mime_type: String },

    #[error("File '{filename}' is {size} bytes, exceeding the {limit} byte limit")]
    FileTooLarge {
        filename: String,
        size: u64,
        limit: u64,
    },

    #[error("Document id must not be empty")]
    EmptyDocumentId,

    #[error("Failed to read file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Failed to create HTTP client: {0}")]
    Client(String),

    #[error("{operation} failed: {message}")]
    Request { operation: String, message: String },

    #[error("{operation} failed ({status}): {body}")]
    Status {
        operation: String,
        status: u16,
        body: String,
    },

    #[error("Failed to parse {operation} response: {message}")]
    Decode { operation: String, message: String },

    #[error("{operation} rejected by server: {message}")]
    Rejected { operation: String, message: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },
}

pub type Result<T> = std::result::Result<T, DocShieldError>;
