//! Kernel HTTP client
//!
//! The kernel computes everything that needs the audio signal (pitch,
//! formants, transcriptions, error rates). Responses are validated against
//! the mode registry before they are handed to callers.

use crate::modes::{self, ComputedData, ModeName};
use crate::state::{Caption, FileState, Transcription};
use reqwest::header::{HeaderMap, CONNECTION};
use reqwest::{Method, Url};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const USER_AGENT: &str = concat!("spectral/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Kernel client errors
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("Invalid kernel URL: {0}")]
    InvalidUrl(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Kernel responded with {0}: {1}")]
    Status(u16, String),

    #[error("Invalid kernel response: {0}")]
    InvalidResponse(String),
}

/// Transcription produced by one of the kernel's models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedTranscription {
    pub language: Option<String>,
    pub transcription: Vec<Caption>,
}

/// Client for the analysis kernel
#[derive(Debug, Clone)]
pub struct KernelClient {
    http_client: reqwest::Client,
    origin: Url,
}

impl KernelClient {
    pub fn new(origin: &str) -> Result<Self, KernelError> {
        // A base without trailing slash would make `join` drop its last segment
        let normalized = if origin.ends_with('/') {
            origin.to_string()
        } else {
            format!("{}/", origin)
        };
        let origin = Url::parse(&normalized).map_err(|e| KernelError::InvalidUrl(e.to_string()))?;

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| KernelError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            origin,
        })
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// URL of a kernel path. A leading slash is ignored.
    pub fn url_for(&self, path: &str) -> Result<Url, KernelError> {
        self.origin
            .join(path.trim_start_matches('/'))
            .map_err(|e| KernelError::InvalidUrl(e.to_string()))
    }

    /// Compute the data `mode` needs for one file
    pub async fn computed_file_data(
        &self,
        mode: ModeName,
        file_state: &FileState,
    ) -> crate::Result<ComputedData> {
        let picked = modes::pick_file_state(mode, file_state)?;
        let url = self.url_for(&format!("signals/modes/{}", mode))?;

        debug!(mode = %mode, file_id = %file_state.id, "Requesting computed file data");

        let response = self
            .http_client
            .post(url)
            .json(&json!({ "fileState": picked }))
            .send()
            .await
            .map_err(|e| KernelError::Network(e.to_string()))?;

        let body = Self::json_body(response).await?;

        modes::parse_computed_data(mode, body).map_err(|e| {
            KernelError::InvalidResponse(format!("{} data did not validate: {}", mode, e)).into()
        })
    }

    /// Transcribe a file with one of the kernel's models
    pub async fn transcribe(
        &self,
        model: &str,
        file_id: &str,
        api_key: &str,
    ) -> Result<GeneratedTranscription, KernelError> {
        let url = self.url_for(&format!("transcription/{}/{}/{}", model, file_id, api_key))?;

        debug!(model = %model, file_id = %file_id, "Requesting transcription");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| KernelError::Network(e.to_string()))?;

        let body = Self::json_body(response).await?;
        serde_json::from_value(body).map_err(|e| KernelError::InvalidResponse(e.to_string()))
    }

    /// Convert transcription tracks to a TextGrid document
    pub async fn textgrid(&self, transcriptions: &[Transcription]) -> Result<Value, KernelError> {
        let url = self.url_for("transcription/textgrid")?;

        let response = self
            .http_client
            .post(url)
            .json(&json!({ "transcriptions": transcriptions }))
            .send()
            .await
            .map_err(|e| KernelError::Network(e.to_string()))?;

        Self::json_body(response).await
    }

    /// Forward a request to the kernel as-is.
    ///
    /// The `connection` and `host` headers are hop-specific and are not forwarded.
    pub async fn forward(
        &self,
        method: Method,
        path: &str,
        query: Option<&str>,
        mut headers: HeaderMap,
        body: Vec<u8>,
    ) -> Result<reqwest::Response, KernelError> {
        let mut url = self.url_for(path)?;
        url.set_query(query);

        headers.remove(CONNECTION);
        headers.remove(reqwest::header::HOST);
        headers.remove(reqwest::header::CONTENT_LENGTH);

        debug!(method = %method, url = %url, "Forwarding request to kernel");

        self.http_client
            .request(method, url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| KernelError::Network(e.to_string()))
    }

    async fn json_body(response: reqwest::Response) -> Result<Value, KernelError> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(KernelError::Status(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| KernelError::InvalidResponse(e.to_string()))
    }
}
