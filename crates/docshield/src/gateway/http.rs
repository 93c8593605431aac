//! `reqwest`-backed implementation of [`ApiGateway`].

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::{Client, Response, StatusCode, Url};
use tracing::Instrument;

use super::wire::{DocumentResponse, RedactResponse, UploadResponse};
use super::ApiGateway;
use crate::config::ClientConfig;
use crate::document::{ProcessingOptions, UploadFile};
use crate::error::{DocShieldError, NetworkError, Result};
use crate::sanitize::{redact_id, truncate_body};

/// HTTP client for the document service.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: Url,
}

fn create_http_client(connect_timeout: Duration, request_timeout: Duration) -> Result<Client> {
    Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(request_timeout)
        .build()
        .map_err(|e| NetworkError::Client(e.to_string()).into())
}

fn parse_base_url(base_url: &str) -> Result<Url> {
    Url::parse(base_url).map_err(|e| {
        NetworkError::Client(format!("Invalid base URL '{}': {}", base_url, e)).into()
    })
}

fn request_error(operation: &str, err: reqwest::Error) -> DocShieldError {
    NetworkError::Request {
        operation: operation.to_string(),
        message: err.to_string(),
    }
    .into()
}

fn decode_error(operation: &str, err: reqwest::Error) -> DocShieldError {
    NetworkError::Decode {
        operation: operation.to_string(),
        message: err.to_string(),
    }
    .into()
}

/// Maps non-success responses to errors. A 404 on a document route becomes `NotFound`.
async fn check_status(
    operation: &str,
    document_id: Option<&str>,
    response: Response,
) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::NOT_FOUND {
        if let Some(id) = document_id {
            return Err(DocShieldError::NotFound {
                document_id: id.to_string(),
            });
        }
    }

    let body = response.text().await.unwrap_or_default();
    Err(NetworkError::Status {
        operation: operation.to_string(),
        status: status.as_u16(),
        body: truncate_body(&body),
    }
    .into())
}

impl HttpGateway {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            client: create_http_client(
                Duration::from_secs(config.connect_timeout_secs),
                Duration::from_secs(config.request_timeout_secs),
            )?,
            base_url: parse_base_url(&config.base_url)?,
        })
    }

    /// Creates a gateway with default timeouts.
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        Self::new(&ClientConfig::new(base_url))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                NetworkError::Client(format!("Base URL '{}' cannot be a base", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl ApiGateway for HttpGateway {
    async fn upload(
        &self,
        file: &UploadFile,
        mime_type: &str,
        options: ProcessingOptions,
    ) -> Result<UploadResponse> {
        const OPERATION: &str = "Upload";
        let url = self.endpoint(&["ingest", "upload"])?;

        let span = tracing::info_span!(
            "gateway.upload",
            size = file.size(),
            mime_type = %mime_type,
            ocr = options.ocr,
            detect_pii = options.detect_pii,
            analyze_layout = options.analyze_layout
        );

        async move {
            let part = reqwest::multipart::Part::bytes(file.bytes.clone())
                .file_name(file.filename.clone())
                .mime_str(mime_type)
                .map_err(|e| request_error(OPERATION, e))?;
            let form = reqwest::multipart::Form::new().part("file", part);

            info!("Uploading document ({} bytes, {})", file.size(), mime_type);

            let response = self
                .client
                .post(url)
                .query(&[
                    ("ocr", options.ocr),
                    ("detect_pii", options.detect_pii),
                    ("analyze_layout", options.analyze_layout),
                ])
                .multipart(form)
                .send()
                .await
                .map_err(|e| request_error(OPERATION, e))?;

            let response = check_status(OPERATION, None, response).await?;
            response
                .json::<UploadResponse>()
                .await
                .map_err(|e| decode_error(OPERATION, e))
        }
        .instrument(span)
        .await
    }

    async fn fetch_document(&self, document_id: &str) -> Result<DocumentResponse> {
        const OPERATION: &str = "Document fetch";
        let url = self.endpoint(&["ingest", "document", document_id])?;
        let span = tracing::info_span!("gateway.fetch_document", document = %redact_id(document_id));

        async move {
            debug!("Fetching document snapshot");
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| request_error(OPERATION, e))?;

            let response = check_status(OPERATION, Some(document_id), response).await?;
            response
                .json::<DocumentResponse>()
                .await
                .map_err(|e| decode_error(OPERATION, e))
        }
        .instrument(span)
        .await
    }

    async fn redact(&self, document_id: &str, redaction_color: &str) -> Result<RedactResponse> {
        const OPERATION: &str = "Redaction";
        let url = self.endpoint(&["ingest", "redact", document_id])?;
        let span = tracing::info_span!("gateway.redact", document = %redact_id(document_id));

        async move {
            info!("Requesting redaction with color '{}'", redaction_color);
            let response = self
                .client
                .post(url)
                .form(&[("redaction_color", redaction_color)])
                .send()
                .await
                .map_err(|e| request_error(OPERATION, e))?;

            let response = check_status(OPERATION, Some(document_id), response).await?;
            let body = response
                .text()
                .await
                .map_err(|e| request_error(OPERATION, e))?;

            // Only a success confirmation; a 2xx body that is not JSON still counts.
            Ok(serde_json::from_str::<RedactResponse>(&body).unwrap_or_else(|e| {
                debug!("Redaction response body not decodable ({}), treating as accepted", e);
                RedactResponse::default()
            }))
        }
        .instrument(span)
        .await
    }

    async fn fetch_audit_logs(&self) -> Result<Vec<serde_json::Value>> {
        const OPERATION: &str = "Audit log fetch";
        let url = self.endpoint(&["audit", "logs"])?;

        async move {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| request_error(OPERATION, e))?;

            let response = check_status(OPERATION, None, response).await?;
            let entries: Vec<serde_json::Value> = response
                .json()
                .await
                .map_err(|e| decode_error(OPERATION, e))?;
            debug!("Fetched {} audit log entries", entries.len());
            Ok(entries)
        }
        .instrument(tracing::info_span!("gateway.fetch_audit_logs"))
        .await
    }
}
