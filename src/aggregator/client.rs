// ============================================================================
// Summary Backend Client
// ============================================================================
//
// Issues one summarization request to the external endpoint and classifies
// the outcome. Timeouts, non-2xx statuses and unreadable bodies are all
// failures; none of them is retried.
//
// ============================================================================

use anyhow::{Context, Result};
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use super::types::{SummaryRequest, SummaryResponse, SummaryResult};
use crate::config::UpstreamConfig;

/// Longest slice of an error body kept for logs
const MAX_ERROR_BODY_LEN: usize = 256;

#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("upstream returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed response body: {0}")]
    Decode(String),

    #[error("request task aborted: {0}")]
    Join(String),
}

impl SummaryError {
    /// Short label used for the failure metric
    pub fn kind(&self) -> &'static str {
        match self {
            SummaryError::Timeout => "timeout",
            SummaryError::Transport(_) => "transport",
            SummaryError::Status { .. } => "status",
            SummaryError::Decode(_) => "decode",
            SummaryError::Join(_) => "join",
        }
    }
}

impl From<reqwest::Error> for SummaryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SummaryError::Timeout
        } else if e.is_decode() {
            SummaryError::Decode(e.to_string())
        } else {
            SummaryError::Transport(e)
        }
    }
}

/// Something that can summarize one request
#[async_trait::async_trait]
pub trait SummaryBackend: Send + Sync {
    async fn summarize(&self, request: &SummaryRequest) -> Result<SummaryResult, SummaryError>;
}

/// Summary backend reached over HTTP
pub struct HttpSummaryBackend {
    client: reqwest::Client,
    url: String,
}

impl HttpSummaryBackend {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        Self::with_timeout(&config.summary_url, config.timeout)
    }

    pub fn with_timeout(url: &str, timeout: Duration) -> Result<Self> {
        // Configure connection pooling and keep-alive
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .tcp_keepalive(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl SummaryBackend for HttpSummaryBackend {
    async fn summarize(&self, request: &SummaryRequest) -> Result<SummaryResult, SummaryError> {
        let response = self
            .client
            .post(&self.url)
            .json(&request.to_payload())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            truncate_on_char_boundary(&mut body, MAX_ERROR_BODY_LEN);
            warn!(
                provider = %request.provider(),
                model = %request.model(),
                status = %status.as_u16(),
                "Summarization endpoint returned an error status"
            );
            return Err(SummaryError::Status { status, body });
        }

        let bytes = response.bytes().await?;
        let wire: SummaryResponse =
            serde_json::from_slice(&bytes).map_err(|e| SummaryError::Decode(e.to_string()))?;

        let mut result = SummaryResult::from(wire);
        if result.model.is_empty() {
            result.model = request.model().to_string();
        }
        Ok(result)
    }
}

fn truncate_on_char_boundary(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}
