//! Multipart HTTP transport adapter

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::debug;

use crate::application::ports::{Transport, TransportError};
use crate::domain::audio::PcmContainer;
use crate::domain::config::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS};
use crate::domain::transcript::TranscriptResult;

/// Name of the multipart field carrying the recording
const FILE_FIELD: &str = "file";

/// Uploads containers as `multipart/form-data` to one endpoint
pub struct HttpTransport {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport for `endpoint` with a per-request timeout
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::TransportFailure(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    /// Configured endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build the upload form: a single `file` part
    fn build_form(container: &PcmContainer) -> Result<Form, TransportError> {
        let part = Part::bytes(container.as_bytes().to_vec())
            .file_name(container.file_name())
            .mime_str(container.mime_type())
            .map_err(|e| TransportError::TransportFailure(e.to_string()))?;

        Ok(Form::new().part(FILE_FIELD, part))
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, container: &PcmContainer) -> Result<TranscriptResult, TransportError> {
        let form = Self::build_form(container)?;

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError::TransportFailure(e.to_string()))?;

        let status = response.status();
        debug!(status = status.as_u16(), endpoint = %self.endpoint, "upload response");

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TransportError::NetworkError {
                status_code: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| TransportError::TransportFailure(e.to_string()))?;
        let json: Value = serde_json::from_str(&body)
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;

        Ok(TranscriptResult::new(json))
    }
}
