//! idverify-core - Capture and verification orchestration for identity/age checks
//!
//! This crate is the client-side core of the idverify system: it governs how
//! a document image and a selfie are acquired (upload or gated camera
//! capture), drives the single verification request against the remote
//! service, and turns the verdict into a deterministic rendering contract
//! and a downloadable report.
//!
//! # Features
//!
//! - Discriminated session state machine with fail-closed submission
//! - Quality-gated camera capture with guaranteed device release
//! - Content-type-aware response dispatch shared by native and Wasm builds
//! - One-shot HTTP proxy client (no retries, explicit timeout)
//!
//! # Example
//!
//! ```no_run
//! use idverify_core::{ImageArtifact, MockVerificationProxy, SessionState, VerificationSession};
//!
//! # async fn example() -> idverify_core::Result<()> {
//! let mut session = VerificationSession::new();
//! session.attach_document(ImageArtifact::new(vec![], "id.jpg", "image/jpeg"))?;
//! session.attach_selfie(ImageArtifact::new(vec![], "selfie.jpg", "image/jpeg"))?;
//!
//! // In production, use HttpVerificationProxy pointed at the proxy handler.
//! let proxy = MockVerificationProxy::verified();
//! if let SessionState::Result(verdict) = session.submit(&proxy).await? {
//!     println!("verified: {}", verdict.is_verified());
//! }
//! # Ok(())
//! # }
//! ```

pub mod artifact;
#[cfg(feature = "network")]
pub mod camera;
pub mod error;
#[cfg(feature = "network")]
pub mod proxy;
pub mod quality;
pub mod report;
pub mod session;
pub mod verdict;

// Re-export main types for convenience
pub use artifact::{ImageArtifact, RawUpload, MAX_ARTIFACT_BYTES};
pub use error::{Result, VerifyError};
pub use quality::{Blur, Lighting, QualityAnalyzer, QualitySignal, SimulatedAnalyzer};
pub use report::VerificationReport;
pub use session::{FailureReason, SessionState, VerificationSession};
pub use verdict::{
    interpret_response, VerdictStatus, VerificationVerdict, ADULT_AGE,
    HIGH_CONFIDENCE_THRESHOLD,
};

// Network-dependent exports (not available in Wasm)
#[cfg(feature = "network")]
pub use camera::{CameraDevice, CameraSession, CameraStream, SAMPLE_INTERVAL};
#[cfg(feature = "network")]
pub use proxy::{
    HttpProxyConfig, HttpVerificationProxy, MockOutcome, MockVerificationProxy,
    VerificationProxy,
};

#[cfg(all(test, feature = "network"))]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::camera::{CameraDevice, CameraStream};
    use async_trait::async_trait;

    struct StubStream {
        stopped: Arc<AtomicBool>,
    }

    impl CameraStream for StubStream {
        fn grab_frame(&mut self) -> Result<Vec<u8>> {
            Ok(vec![0xFF, 0xD8, 0xFF])
        }

        fn stop_tracks(&mut self) {
            self.stopped.store(true, Ordering::SeqCst);
        }
    }

    struct StubDevice {
        stopped: Arc<AtomicBool>,
    }

    #[async_trait]
    impl CameraDevice for StubDevice {
        async fn open(&self) -> Result<Box<dyn CameraStream>> {
            Ok(Box::new(StubStream {
                stopped: Arc::clone(&self.stopped),
            }))
        }
    }

    struct AdmissibleAnalyzer;

    impl QualityAnalyzer for AdmissibleAnalyzer {
        fn analyze(&self) -> QualitySignal {
            QualitySignal {
                lighting: Lighting::Good,
                face_detected: true,
                blur: Blur::Low,
            }
        }
    }

    /// Integration test: upload a document, capture a gated selfie, submit,
    /// and download the report.
    #[tokio::test]
    async fn test_full_verification_workflow() {
        let mut session = VerificationSession::new();

        // Step 1: Document via the upload path (first file of the selection)
        let document = ImageArtifact::from_upload(vec![RawUpload {
            data: vec![0u8; 2 * 1024 * 1024],
            file_name: "id.jpg".into(),
            content_type: Some("image/jpeg".into()),
        }])
        .expect("upload normalizes to an artifact");
        assert!(document.acceptable_document_type());
        assert!(document.within_size_limit());
        session.attach_document(document).unwrap();

        // Step 2: Selfie via a camera session with an admitting gate
        let stopped = Arc::new(AtomicBool::new(false));
        let device = StubDevice {
            stopped: Arc::clone(&stopped),
        };
        session
            .start_camera(&device, Arc::new(AdmissibleAnalyzer))
            .await
            .unwrap();

        // wait for the first sample, then capture
        for _ in 0..50 {
            if session.camera_quality().is_some() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert!(session.capture_selfie().unwrap(), "gate admits capture");
        assert!(stopped.load(Ordering::SeqCst), "tracks stopped on capture");
        assert_eq!(session.state(), SessionState::ReadyToSubmit);

        // Step 3: Single submission against a mocked remote
        let proxy = MockVerificationProxy::verified();
        let state = session.submit(&proxy).await.unwrap();
        let SessionState::Result(verdict) = state else {
            panic!("expected a result, got {state:?}");
        };
        assert!(verdict.is_verified());
        assert!(verdict.age_eligible());
        assert!(verdict.high_confidence());

        // Step 4: Report round trip, no image bytes
        let report = session.build_report().unwrap();
        let json = report.to_json().unwrap();
        assert!(json.contains("\"selfie.jpg\""));
        assert!(json.len() < 4096);
    }

    /// A blocked gate means no artifact and no network interaction.
    #[tokio::test]
    async fn test_blocked_capture_never_reaches_network() {
        struct NoFaceAnalyzer;
        impl QualityAnalyzer for NoFaceAnalyzer {
            fn analyze(&self) -> QualitySignal {
                QualitySignal {
                    lighting: Lighting::Good,
                    face_detected: false,
                    blur: Blur::Low,
                }
            }
        }

        let mut session = VerificationSession::new();
        session
            .attach_document(ImageArtifact::new(vec![0u8; 8], "id.jpg", "image/jpeg"))
            .unwrap();

        let device = StubDevice {
            stopped: Arc::new(AtomicBool::new(false)),
        };
        session
            .start_camera(&device, Arc::new(NoFaceAnalyzer))
            .await
            .unwrap();
        for _ in 0..50 {
            if session.camera_quality().is_some() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        assert!(!session.capture_selfie().unwrap(), "capture is a no-op");
        assert!(session.selfie().is_none());

        let proxy = MockVerificationProxy::verified();
        assert!(session.submit(&proxy).await.is_err());
        assert_eq!(proxy.call_count(), 0);
    }
}
