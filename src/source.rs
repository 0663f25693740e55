//! Snapshot sources.
//!
//! The poller talks to a `SnapshotSource`; production uses `HttpSource`,
//! which issues `GET {base_url}{path}` and decodes the JSON body.

use crate::config::PollerConfig;
use crate::error::{FetchError, ServiceError};
use crate::snapshot::SensorSnapshot;
use async_trait::async_trait;
use std::time::Duration;

/// Largest response body accepted from the endpoint
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Trait for fetching the latest sensor snapshot
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch and decode one snapshot
    async fn fetch(&self) -> Result<SensorSnapshot, FetchError>;
}

/// HTTP JSON source
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
    reject_error_status: bool,
    timeout_ms: Option<u64>,
}

impl HttpSource {
    /// Create a source from the poller configuration
    pub fn new(config: &PollerConfig) -> Result<Self, ServiceError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout_ms) = config.request_timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        let client = builder
            .build()
            .map_err(|e| ServiceError::InitializationError(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.endpoint_url(),
            reject_error_status: config.reject_error_status,
            timeout_ms: config.request_timeout_ms,
        })
    }

    /// Full URL polled by this source
    pub fn url(&self) -> &str {
        &self.url
    }

    fn map_request_error(&self, e: reqwest::Error) -> FetchError {
        match self.timeout_ms {
            Some(timeout_ms) if e.is_timeout() => FetchError::Timeout {
                url: self.url.clone(),
                timeout_ms,
            },
            _ => FetchError::Network {
                url: self.url.clone(),
                message: e.to_string(),
            },
        }
    }
}

#[async_trait]
impl SnapshotSource for HttpSource {
    async fn fetch(&self) -> Result<SensorSnapshot, FetchError> {
        let mut response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        if self.reject_error_status && !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            tracing::debug!(url = %self.url, status = status.as_u16(), "non-success status, decoding body anyway");
        }

        if let Some(length) = response.content_length() {
            if length > MAX_BODY_BYTES as u64 {
                return Err(oversized(length as usize));
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.map_request_error(e))?
        {
            if body.len() + chunk.len() > MAX_BODY_BYTES {
                return Err(oversized(body.len() + chunk.len()));
            }
            body.extend_from_slice(&chunk);
        }
        SensorSnapshot::decode(&body)
    }
}

fn oversized(length: usize) -> FetchError {
    FetchError::MalformedPayload(format!(
        "body of {} bytes exceeds the {} byte limit",
        length, MAX_BODY_BYTES
    ))
}
