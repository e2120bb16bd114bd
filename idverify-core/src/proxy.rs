//! Verification proxy clients.
//!
//! The remote service is an opaque collaborator: two binary images in, one
//! structured verdict out. The trait keeps the session machinery independent
//! of the transport so tests can substitute a mock, mirroring how the rest
//! of the crate treats external collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::artifact::ImageArtifact;
use crate::error::{Result, VerifyError};
use crate::verdict::{interpret_response, VerificationVerdict};

/// One-shot forwarding seam toward the verification service.
///
/// Implementations must be thread-safe (`Send + Sync`), perform no retries
/// and no caching; a repeat attempt is always a new explicit call.
#[async_trait]
pub trait VerificationProxy: Send + Sync {
    /// Submit exactly two named artifacts and await the verdict.
    async fn submit(
        &self,
        document: &ImageArtifact,
        selfie: &ImageArtifact,
    ) -> Result<VerificationVerdict>;
}

/// Configuration for the HTTP proxy client.
#[derive(Debug, Clone)]
pub struct HttpProxyConfig {
    /// Verification endpoint accepting the two-part multipart upload.
    pub endpoint: String,
    /// Hard bound on the round trip; expiry surfaces as a network error.
    pub timeout: Duration,
}

impl Default for HttpProxyConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:3000/api/verify".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP implementation of [`VerificationProxy`] backed by `reqwest`.
pub struct HttpVerificationProxy {
    client: Client,
    config: HttpProxyConfig,
}

impl HttpVerificationProxy {
    pub fn new(config: HttpProxyConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| VerifyError::NetworkError(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client, config })
    }
}

fn artifact_part(artifact: &ImageArtifact) -> Result<reqwest::multipart::Part> {
    reqwest::multipart::Part::bytes(artifact.data().to_vec())
        .file_name(artifact.file_name().to_string())
        .mime_str(artifact.content_type())
        .map_err(|e| {
            VerifyError::InvalidMedia(format!(
                "invalid content type '{}': {e}",
                artifact.content_type()
            ))
        })
}

#[async_trait]
impl VerificationProxy for HttpVerificationProxy {
    #[instrument(level = "info", skip_all, fields(endpoint = %self.config.endpoint))]
    async fn submit(
        &self,
        document: &ImageArtifact,
        selfie: &ImageArtifact,
    ) -> Result<VerificationVerdict> {
        let form = reqwest::multipart::Form::new()
            .part("aadhar", artifact_part(document)?)
            .part("selfie", artifact_part(selfie)?);

        let start = Instant::now();
        let response = self
            .client
            .post(&self.config.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "verification request transport failure");
                VerifyError::NetworkError(e.to_string())
            })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = response
            .text()
            .await
            .map_err(|e| VerifyError::NetworkError(e.to_string()))?;

        debug!(
            status,
            latency_ms = start.elapsed().as_millis() as u64,
            "verification response received"
        );

        interpret_response(status, content_type.as_deref(), &body)
    }
}

/// Canned outcome for [`MockVerificationProxy`].
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Verdict(VerificationVerdict),
    NetworkError(String),
    BackendError { status: Option<u16>, body: String },
    MalformedResponse { detail: String, body: String },
}

/// In-memory proxy for tests. Counts calls so the single-in-flight and
/// fail-closed properties can assert on network activity.
pub struct MockVerificationProxy {
    outcome: MockOutcome,
    calls: AtomicUsize,
}

impl MockVerificationProxy {
    pub fn new(outcome: MockOutcome) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
        }
    }

    /// Mock resolving with the canonical "verified adult" verdict.
    pub fn verified() -> Self {
        Self::new(MockOutcome::Verdict(VerificationVerdict {
            status: crate::verdict::VerdictStatus::Verified,
            age: 24,
            date_of_birth: "1999-05-01".to_string(),
            match_confidence: 91.2,
            extracted_name: None,
        }))
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VerificationProxy for MockVerificationProxy {
    async fn submit(
        &self,
        _document: &ImageArtifact,
        _selfie: &ImageArtifact,
    ) -> Result<VerificationVerdict> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.outcome.clone() {
            MockOutcome::Verdict(verdict) => Ok(verdict),
            MockOutcome::NetworkError(msg) => Err(VerifyError::NetworkError(msg)),
            MockOutcome::BackendError { status, body } => {
                Err(VerifyError::BackendError { status, body })
            }
            MockOutcome::MalformedResponse { detail, body } => {
                Err(VerifyError::MalformedResponse { detail, body })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact() -> ImageArtifact {
        ImageArtifact::new(vec![1, 2, 3], "id.jpg", "image/jpeg")
    }

    #[test]
    fn test_default_config() {
        let config = HttpProxyConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.endpoint.ends_with("/api/verify"));
    }

    #[test]
    fn test_artifact_part_rejects_garbage_mime() {
        let bad = ImageArtifact::new(vec![1], "x.bin", "not a mime type");
        assert!(matches!(
            artifact_part(&bad),
            Err(VerifyError::InvalidMedia(_))
        ));
    }

    #[tokio::test]
    async fn test_mock_proxy_counts_calls() {
        let proxy = MockVerificationProxy::verified();
        assert_eq!(proxy.call_count(), 0);

        let verdict = proxy.submit(&artifact(), &artifact()).await.unwrap();
        assert!(verdict.is_verified());
        assert_eq!(proxy.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_proxy_backend_failure() {
        let proxy = MockVerificationProxy::new(MockOutcome::BackendError {
            status: Some(500),
            body: "Traceback ...".into(),
        });
        let err = proxy.submit(&artifact(), &artifact()).await.unwrap_err();
        assert_eq!(err.diagnostic(), Some("Traceback ..."));
    }
}
