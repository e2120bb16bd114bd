//! The verification session state machine.
//!
//! One `VerificationSession` exists per user session. It owns both image
//! artifacts, any active camera session, and the single discriminated state;
//! nothing it holds survives a reset or crosses into another session.

#[cfg(feature = "network")]
use std::sync::Arc;

use tracing::debug;
#[cfg(feature = "network")]
use tracing::warn;

use crate::artifact::ImageArtifact;
#[cfg(feature = "network")]
use crate::camera::{CameraDevice, CameraSession};
use crate::error::{Result, VerifyError};
#[cfg(feature = "network")]
use crate::proxy::VerificationProxy;
#[cfg(feature = "network")]
use crate::quality::{QualityAnalyzer, QualitySignal};
use crate::report::VerificationReport;
use crate::verdict::VerificationVerdict;

/// User-facing classification of a failed attempt.
///
/// Each kind maps to exactly one human-readable message; raw diagnostics
/// stay in the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    MissingArtifacts,
    NetworkError,
    BackendError,
    MalformedResponse,
}

impl FailureReason {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::MissingArtifacts => {
                "Please provide both an ID document and a selfie before verifying."
            }
            Self::NetworkError => {
                "Could not reach the verification service. Check your connection and try again."
            }
            Self::BackendError => "Verification failed on the server. Please try again.",
            Self::MalformedResponse => {
                "The verification service returned an unexpected response. Please try again."
            }
        }
    }

    /// Stable identifier for UI code and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingArtifacts => "missing_artifacts",
            Self::NetworkError => "network_error",
            Self::BackendError => "backend_error",
            Self::MalformedResponse => "malformed_response",
        }
    }
}

impl VerifyError {
    /// The failure kind a submission error collapses into, if it is one of
    /// the recoverable attempt failures (guard errors are not).
    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self {
            Self::MissingArtifacts => Some(FailureReason::MissingArtifacts),
            Self::NetworkError(_) => Some(FailureReason::NetworkError),
            Self::BackendError { .. } => Some(FailureReason::BackendError),
            Self::MalformedResponse { .. } => Some(FailureReason::MalformedResponse),
            _ => None,
        }
    }
}

/// The single discriminated session state.
///
/// `Idle` and `ReadyToSubmit` are derived from artifact presence, so
/// readiness is revoked the instant either artifact is cleared and no
/// impossible combination (a result alongside an in-flight request, say) can
/// be represented.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    ReadyToSubmit,
    Submitting,
    Result(VerificationVerdict),
    Failed(FailureReason),
}

/// Internal completion record; acquisition states are derived on demand.
enum Outcome {
    None,
    InFlight,
    Verdict(VerificationVerdict),
    Failure(FailureReason),
}

/// Orchestrates the two-artifact precondition, the single verification
/// request, and the transition to a result or failure.
pub struct VerificationSession {
    document: Option<ImageArtifact>,
    selfie: Option<ImageArtifact>,
    outcome: Outcome,
    #[cfg(feature = "network")]
    camera: Option<CameraSession>,
}

impl VerificationSession {
    pub fn new() -> Self {
        Self {
            document: None,
            selfie: None,
            outcome: Outcome::None,
            #[cfg(feature = "network")]
            camera: None,
        }
    }

    /// Current state of the machine.
    pub fn state(&self) -> SessionState {
        match &self.outcome {
            Outcome::InFlight => SessionState::Submitting,
            Outcome::Verdict(verdict) => SessionState::Result(verdict.clone()),
            Outcome::Failure(reason) => SessionState::Failed(*reason),
            Outcome::None => {
                if self.document.is_some() && self.selfie.is_some() {
                    SessionState::ReadyToSubmit
                } else {
                    SessionState::Idle
                }
            }
        }
    }

    /// Both artifacts present and no request in flight.
    pub fn ready(&self) -> bool {
        !matches!(self.outcome, Outcome::InFlight)
            && self.document.is_some()
            && self.selfie.is_some()
    }

    pub fn document(&self) -> Option<&ImageArtifact> {
        self.document.as_ref()
    }

    pub fn selfie(&self) -> Option<&ImageArtifact> {
        self.selfie.as_ref()
    }

    /// Guard for artifact mutation: no changes while a request is in flight
    /// or a result is held. A previous failure is discarded so the user can
    /// rework their inputs.
    fn allow_mutation(&mut self) -> Result<()> {
        match self.outcome {
            Outcome::InFlight => Err(VerifyError::SubmissionInFlight),
            Outcome::Verdict(_) => Err(VerifyError::SessionComplete),
            Outcome::Failure(_) => {
                self.outcome = Outcome::None;
                Ok(())
            }
            Outcome::None => Ok(()),
        }
    }

    pub fn attach_document(&mut self, artifact: ImageArtifact) -> Result<()> {
        self.allow_mutation()?;
        debug!(file = artifact.file_name(), size = artifact.byte_size(), "document attached");
        self.document = Some(artifact);
        Ok(())
    }

    pub fn attach_selfie(&mut self, artifact: ImageArtifact) -> Result<()> {
        self.allow_mutation()?;
        debug!(file = artifact.file_name(), size = artifact.byte_size(), "selfie attached");
        self.selfie = Some(artifact);
        Ok(())
    }

    pub fn clear_document(&mut self) -> Result<()> {
        self.allow_mutation()?;
        self.document = None;
        Ok(())
    }

    pub fn clear_selfie(&mut self) -> Result<()> {
        self.allow_mutation()?;
        self.selfie = None;
        Ok(())
    }

    /// Transition into `Submitting`, failing closed on missing artifacts and
    /// rejecting a second submit while one is in flight. A held result stays
    /// terminal until reset. No network call has happened when this returns
    /// an error.
    pub fn begin_submit(&mut self) -> Result<()> {
        if matches!(self.outcome, Outcome::InFlight) {
            return Err(VerifyError::SubmissionInFlight);
        }
        if matches!(self.outcome, Outcome::Verdict(_)) {
            return Err(VerifyError::SessionComplete);
        }
        if self.document.is_none() || self.selfie.is_none() {
            return Err(VerifyError::MissingArtifacts);
        }
        self.outcome = Outcome::InFlight;
        Ok(())
    }

    /// Complete the in-flight attempt with a structurally valid verdict.
    pub fn complete_with_verdict(&mut self, verdict: VerificationVerdict) {
        debug!(status = ?verdict.status, "verification attempt resolved");
        self.outcome = Outcome::Verdict(verdict);
    }

    /// Complete the in-flight attempt with a failure. Non-terminal: the
    /// artifacts are kept so the user can re-attempt or reset.
    pub fn complete_with_failure(&mut self, reason: FailureReason) {
        self.outcome = Outcome::Failure(reason);
    }

    /// Issue exactly one verification request through the proxy.
    ///
    /// No automatic retries; a repeat attempt is a new explicit call. The
    /// returned state is `Result` or `Failed`; guard violations return an
    /// error without a state change or a network call.
    #[cfg(feature = "network")]
    pub async fn submit(&mut self, proxy: &dyn VerificationProxy) -> Result<SessionState> {
        self.begin_submit()?;

        let result = match (&self.document, &self.selfie) {
            (Some(document), Some(selfie)) => proxy.submit(document, selfie).await,
            // begin_submit guarantees both artifacts
            _ => Err(VerifyError::MissingArtifacts),
        };

        match result {
            Ok(verdict) => self.complete_with_verdict(verdict),
            Err(e) => {
                warn!(
                    error = %e,
                    diagnostic = e.diagnostic().unwrap_or(""),
                    "verification attempt failed"
                );
                let reason = e.failure_reason().unwrap_or(FailureReason::NetworkError);
                self.complete_with_failure(reason);
            }
        }

        Ok(self.state())
    }

    /// Open a camera session for the selfie. Rejected while another session
    /// is active; denial leaves any prior selfie artifact untouched.
    #[cfg(feature = "network")]
    pub async fn start_camera(
        &mut self,
        device: &dyn CameraDevice,
        analyzer: Arc<dyn QualityAnalyzer>,
    ) -> Result<()> {
        if self.camera.is_some() {
            return Err(VerifyError::CameraBusy);
        }
        self.camera = Some(CameraSession::open(device, analyzer).await?);
        Ok(())
    }

    /// Latest quality sample of the active camera session, if any.
    #[cfg(feature = "network")]
    pub fn camera_quality(&self) -> Option<QualitySignal> {
        self.camera.as_ref().and_then(|session| session.quality())
    }

    #[cfg(feature = "network")]
    pub fn camera_active(&self) -> bool {
        self.camera.as_ref().map(CameraSession::is_active).unwrap_or(false)
    }

    /// Finalize the current frame into the selfie slot if the gate admits.
    ///
    /// Returns `Ok(false)` when the gate blocks (the action is a no-op) and
    /// `Ok(true)` when a selfie was captured, in which case the camera
    /// session has been closed.
    #[cfg(feature = "network")]
    pub fn capture_selfie(&mut self) -> Result<bool> {
        let session = self
            .camera
            .as_mut()
            .ok_or_else(|| VerifyError::CaptureUnavailable("no active camera session".into()))?;

        match session.capture() {
            Ok(Some(artifact)) => {
                self.camera = None;
                self.attach_selfie(artifact)?;
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(e) => {
                // capture() already stopped tracks on failure
                self.camera = None;
                Err(e)
            }
        }
    }

    /// Cancel the active camera session, stopping tracks and the sampler.
    #[cfg(feature = "network")]
    pub fn cancel_camera(&mut self) {
        if let Some(mut session) = self.camera.take() {
            session.close();
        }
    }

    /// Discard the held selfie and reopen the camera from the same
    /// preconditions as the initial acquisition.
    #[cfg(feature = "network")]
    pub async fn retake_selfie(
        &mut self,
        device: &dyn CameraDevice,
        analyzer: Arc<dyn QualityAnalyzer>,
    ) -> Result<()> {
        self.clear_selfie()?;
        self.start_camera(device, analyzer).await
    }

    /// Build the downloadable report for a completed verification.
    pub fn build_report(&self) -> Result<VerificationReport> {
        match &self.outcome {
            Outcome::Verdict(verdict) => Ok(VerificationReport::new(
                verdict,
                self.document.as_ref().map(ImageArtifact::file_name),
                self.selfie.as_ref().map(ImageArtifact::file_name),
            )),
            _ => Err(VerifyError::NoResult),
        }
    }

    /// Return to `Idle` from any state, releasing both artifacts, any held
    /// verdict or failure, and any live camera session.
    pub fn reset(&mut self) {
        #[cfg(feature = "network")]
        self.cancel_camera();
        self.document = None;
        self.selfie = None;
        self.outcome = Outcome::None;
        debug!("session reset");
    }
}

impl Default for VerificationSession {
    fn default() -> Self {
        Self::new()
    }
}
