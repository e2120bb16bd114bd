//! Upstream forwarding toward the remote verification service.
//!
//! The proxy re-wraps the browser's two parts into a fresh multipart
//! request: the inbound content-type header is never forwarded and the
//! boundary is regenerated by the HTTP client. One outbound call per
//! inbound request; no retries, no caching.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::multipart::FileField;

/// Transport-level forwarding failure.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream transport error: {0}")]
    Transport(String),
}

/// Raw reply from the remote service, before content-type dispatch.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: u16,
    /// Whether the remote declared a JSON content type.
    pub is_json: bool,
    pub body: Vec<u8>,
}

/// One-shot forwarding seam; abstract so tests can stub the remote.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn forward(
        &self,
        document: FileField,
        selfie: FileField,
    ) -> Result<UpstreamReply, UpstreamError>;
}

/// HTTP implementation backed by `reqwest`.
pub struct HttpUpstream {
    client: Client,
    url: String,
}

impl HttpUpstream {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

/// Build an outbound part preserving the inbound filename and content type.
/// An unparseable content type falls back to the client default rather than
/// failing the whole attempt.
fn forwarded_part(file: FileField, fallback_name: &str) -> reqwest::multipart::Part {
    let name = file.file_name.unwrap_or_else(|| fallback_name.to_string());
    if let Some(ct) = &file.content_type {
        match reqwest::multipart::Part::bytes(file.data.clone())
            .file_name(name.clone())
            .mime_str(ct)
        {
            Ok(part) => return part,
            Err(_) => {
                warn!(content_type = %ct, "unparseable part content type, forwarding without it");
            }
        }
    }
    reqwest::multipart::Part::bytes(file.data).file_name(name)
}

#[async_trait]
impl Upstream for HttpUpstream {
    #[instrument(level = "info", skip_all, fields(url = %self.url))]
    async fn forward(
        &self,
        document: FileField,
        selfie: FileField,
    ) -> Result<UpstreamReply, UpstreamError> {
        let form = reqwest::multipart::Form::new()
            .part(crate::multipart::DOCUMENT_PART, forwarded_part(document, "aadhar.jpg"))
            .part(crate::multipart::SELFIE_PART, forwarded_part(selfie, "selfie.jpg"));

        let start = Instant::now();
        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "forwarding to verification service failed");
                UpstreamError::Transport(e.to_string())
            })?;

        let status = response.status().as_u16();
        let is_json = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| {
                let ct = ct.to_ascii_lowercase();
                ct.starts_with("application/json") || ct.contains("+json")
            })
            .unwrap_or(false);
        let body = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?
            .to_vec();

        debug!(
            status,
            is_json,
            latency_ms = start.elapsed().as_millis() as u64,
            "verification service replied"
        );

        Ok(UpstreamReply {
            status,
            is_json,
            body,
        })
    }
}
