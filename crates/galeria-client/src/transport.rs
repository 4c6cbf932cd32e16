//! Transport: one outbound POST of the application form
use async_trait::async_trait;
use galeria_core::SubmissionPayload;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

/// What gets sent on every attempt of one submission
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    pub url: String,
    pub payload: SubmissionPayload,
    /// Shared by all retries of the same submission, for log correlation
    pub attempt_id: Uuid,
}

impl SubmissionRequest {
    pub fn new(url: impl Into<String>, payload: SubmissionPayload) -> Self {
        Self {
            url: url.into(),
            payload,
            attempt_id: Uuid::new_v4(),
        }
    }
}

/// Any HTTP answer, error statuses included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    pub fn json(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }

    /// `detalhe`, then `error`, from a JSON error body
    pub fn error_detail(&self) -> Option<String> {
        let body = self.json()?;
        ["detalhe", "error"].iter().find_map(|key| {
            body.get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
    }
}

/// Connection-level failure; no HTTP status was received
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("invalid request: {0}")]
    Request(String),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else if err.is_builder() {
            TransportError::Request(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &SubmissionRequest) -> Result<TransportResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: &SubmissionRequest) -> Result<TransportResponse, TransportError> {
        (**self).send(request).await
    }
}

/// Multipart POST over reqwest
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

/// Every field by name, the photo as a file part, then `timestamp`
pub fn multipart_form(payload: &SubmissionPayload) -> Result<Form, TransportError> {
    let mut form = Form::new();

    for (name, value) in &payload.fields {
        form = form.text(name.clone(), value.clone());
    }

    if let Some((name, photo)) = &payload.photo {
        let part = Part::bytes(photo.bytes.clone())
            .file_name(photo.file_name.clone())
            .mime_str(&photo.content_type)
            .map_err(|e| TransportError::Request(e.to_string()))?;
        form = form.part(name.clone(), part);
    }

    Ok(form.text(SubmissionPayload::TIMESTAMP_FIELD, payload.timestamp_iso()))
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &SubmissionRequest) -> Result<TransportResponse, TransportError> {
        let form = multipart_form(&request.payload)?;

        let response = self.client.post(&request.url).multipart(form).send().await?;
        let status = response.status().as_u16();
        debug!(attempt_id = %request.attempt_id, status, "Submission endpoint answered");

        // The status is already known; a body that fails to arrive only
        // loses the error detail.
        let body = match response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => {
                warn!(attempt_id = %request.attempt_id, error = %e, "Failed to read response body");
                Vec::new()
            }
        };

        Ok(TransportResponse { status, body })
    }
}
