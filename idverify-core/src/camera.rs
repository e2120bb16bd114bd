//! Scoped camera acquisition with gated frame capture.
//!
//! The camera is a hardware resource: every exit path from a session
//! (successful capture, explicit close, drop) must stop the acquired device
//! tracks and cancel the quality sampler, otherwise the device leaks into
//! subsequent sessions and orphaned timers keep firing.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::artifact::ImageArtifact;
use crate::error::{Result, VerifyError};
use crate::quality::{QualityAnalyzer, QualitySignal};

/// Interval at which the quality signal is recomputed.
pub const SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// A video device that can be opened for exclusive use.
///
/// Implementations wrap the platform camera API (`getUserMedia` in the
/// browser). Denial or device absence must surface as
/// [`VerifyError::CaptureUnavailable`].
#[async_trait]
pub trait CameraDevice: Send + Sync {
    async fn open(&self) -> Result<Box<dyn CameraStream>>;
}

/// An open video stream with stoppable device tracks.
pub trait CameraStream: Send {
    /// Encode the current frame as a static JPEG image.
    fn grab_frame(&mut self) -> Result<Vec<u8>>;

    /// Stop all acquired device tracks. Must be idempotent.
    fn stop_tracks(&mut self);
}

/// An active camera session: an exclusive stream plus a background sampler
/// that refreshes the [`QualitySignal`] once per second.
pub struct CameraSession {
    stream: Option<Box<dyn CameraStream>>,
    latest: Arc<Mutex<Option<QualitySignal>>>,
    sampler: tokio::task::JoinHandle<()>,
}

impl CameraSession {
    /// Open the device and start the sampler.
    ///
    /// On denial or device absence the error is returned unchanged and no
    /// sampler is started.
    pub async fn open(
        device: &dyn CameraDevice,
        analyzer: Arc<dyn QualityAnalyzer>,
    ) -> Result<Self> {
        let stream = device.open().await?;
        debug!("camera session opened");

        let latest: Arc<Mutex<Option<QualitySignal>>> = Arc::new(Mutex::new(None));
        let shared = Arc::clone(&latest);
        let sampler = tokio::spawn(async move {
            let mut interval = tokio::time::interval(SAMPLE_INTERVAL);
            loop {
                interval.tick().await;
                let signal = analyzer.analyze();
                if let Ok(mut guard) = shared.lock() {
                    *guard = Some(signal);
                }
            }
        });

        Ok(Self {
            stream: Some(stream),
            latest,
            sampler,
        })
    }

    /// Most recent quality sample, or `None` before the first tick or after
    /// the session ended.
    pub fn quality(&self) -> Option<QualitySignal> {
        self.latest.lock().ok().and_then(|guard| *guard)
    }

    /// Whether the gate currently admits a capture.
    pub fn capture_allowed(&self) -> bool {
        self.quality()
            .map(|signal| signal.capture_admissible())
            .unwrap_or(false)
    }

    /// Finalize the current frame into a selfie artifact.
    ///
    /// Returns `Ok(None)` without side effects while the gate blocks; the
    /// caller surfaces this as a disabled capture action. On success the
    /// session is closed (tracks stopped, sampler cancelled). A frame-grab
    /// failure also closes the session.
    pub fn capture(&mut self) -> Result<Option<ImageArtifact>> {
        if !self.capture_allowed() {
            return Ok(None);
        }

        let stream = self.stream.as_mut().ok_or_else(|| {
            VerifyError::CaptureUnavailable("camera session already closed".into())
        })?;

        match stream.grab_frame() {
            Ok(data) => {
                self.close();
                debug!(bytes = data.len(), "selfie frame captured");
                Ok(Some(ImageArtifact::new(data, "selfie.jpg", "image/jpeg")))
            }
            Err(e) => {
                warn!(error = %e, "frame grab failed, closing camera session");
                self.close();
                Err(e)
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    /// Stop device tracks and cancel the sampler. Idempotent; also invoked
    /// on drop so teardown cannot leak the device.
    pub fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop_tracks();
            debug!("camera tracks stopped");
        }
        self.sampler.abort();
        if let Ok(mut guard) = self.latest.lock() {
            *guard = None;
        }
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::quality::{Blur, Lighting};

    /// Analyzer returning one fixed signal, for deterministic gate tests.
    struct FixedAnalyzer(QualitySignal);

    impl QualityAnalyzer for FixedAnalyzer {
        fn analyze(&self) -> QualitySignal {
            self.0
        }
    }

    struct FakeStream {
        stopped: Arc<AtomicBool>,
    }

    impl CameraStream for FakeStream {
        fn grab_frame(&mut self) -> Result<Vec<u8>> {
            Ok(vec![0xFF, 0xD8, 0xFF, 0xE0])
        }

        fn stop_tracks(&mut self) {
            self.stopped.store(true, Ordering::SeqCst);
        }
    }

    struct FakeDevice {
        stopped: Arc<AtomicBool>,
        available: bool,
    }

    #[async_trait]
    impl CameraDevice for FakeDevice {
        async fn open(&self) -> Result<Box<dyn CameraStream>> {
            if !self.available {
                return Err(VerifyError::CaptureUnavailable("permission denied".into()));
            }
            Ok(Box::new(FakeStream {
                stopped: Arc::clone(&self.stopped),
            }))
        }
    }

    fn admissible() -> QualitySignal {
        QualitySignal {
            lighting: Lighting::Good,
            face_detected: true,
            blur: Blur::Low,
        }
    }

    fn no_face() -> QualitySignal {
        QualitySignal {
            lighting: Lighting::Good,
            face_detected: false,
            blur: Blur::Low,
        }
    }

    async fn wait_for_sample(session: &CameraSession) {
        for _ in 0..50 {
            if session.quality().is_some() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("sampler never produced a signal");
    }

    #[tokio::test]
    async fn test_open_denied_fails_with_capture_unavailable() {
        let device = FakeDevice {
            stopped: Arc::new(AtomicBool::new(false)),
            available: false,
        };
        let result = CameraSession::open(&device, Arc::new(FixedAnalyzer(admissible()))).await;
        assert!(matches!(result, Err(VerifyError::CaptureUnavailable(_))));
    }

    #[tokio::test]
    async fn test_capture_blocked_until_gate_admits() {
        let stopped = Arc::new(AtomicBool::new(false));
        let device = FakeDevice {
            stopped: Arc::clone(&stopped),
            available: true,
        };
        let mut session = CameraSession::open(&device, Arc::new(FixedAnalyzer(no_face())))
            .await
            .unwrap();
        wait_for_sample(&session).await;

        let outcome = session.capture().unwrap();
        assert!(outcome.is_none(), "gate must block without a face");
        assert!(session.is_active(), "blocked capture leaves session open");
        assert!(!stopped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_capture_stops_tracks_and_yields_jpeg_artifact() {
        let stopped = Arc::new(AtomicBool::new(false));
        let device = FakeDevice {
            stopped: Arc::clone(&stopped),
            available: true,
        };
        let mut session = CameraSession::open(&device, Arc::new(FixedAnalyzer(admissible())))
            .await
            .unwrap();
        wait_for_sample(&session).await;

        let artifact = session.capture().unwrap().expect("gate admits capture");
        assert_eq!(artifact.file_name(), "selfie.jpg");
        assert_eq!(artifact.content_type(), "image/jpeg");
        assert!(stopped.load(Ordering::SeqCst), "tracks stopped on capture");
        assert!(!session.is_active());
        assert!(session.quality().is_none(), "no signal once inactive");
    }

    #[tokio::test]
    async fn test_close_is_idempotent_and_cancels_sampler() {
        let stopped = Arc::new(AtomicBool::new(false));
        let device = FakeDevice {
            stopped: Arc::clone(&stopped),
            available: true,
        };
        let mut session = CameraSession::open(&device, Arc::new(FixedAnalyzer(admissible())))
            .await
            .unwrap();

        session.close();
        session.close();
        assert!(stopped.load(Ordering::SeqCst));
        assert!(!session.is_active());

        // Sampler task is aborted; give the runtime a moment to observe it.
        for _ in 0..50 {
            if session.sampler.is_finished() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("sampler task still running after close");
    }

    #[tokio::test]
    async fn test_drop_stops_tracks() {
        let stopped = Arc::new(AtomicBool::new(false));
        let device = FakeDevice {
            stopped: Arc::clone(&stopped),
            available: true,
        };
        let session = CameraSession::open(&device, Arc::new(FixedAnalyzer(admissible())))
            .await
            .unwrap();

        drop(session);
        assert!(stopped.load(Ordering::SeqCst), "teardown must stop tracks");
    }
}
