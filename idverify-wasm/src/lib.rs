//! WebAssembly bindings for the identity verification session.
//!
//! The browser keeps ownership of the camera, the DOM, and the fetch call;
//! this module owns the session state machine, the capture gate, and the
//! response dispatch contract. JS hands raw bytes and fetch replies in, and
//! reads back state, verdicts, and the downloadable report.

use wasm_bindgen::prelude::*;

use idverify_core::{
    interpret_response, FailureReason, ImageArtifact, QualityAnalyzer, QualitySignal, RawUpload,
    SessionState, SimulatedAnalyzer, VerificationSession, VerifyError,
};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn to_js(err: VerifyError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Browser console warning; no-op when unit tests run on the host target.
fn warn(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&JsValue::from_str(message));
    #[cfg(not(target_arch = "wasm32"))]
    let _ = message;
}

fn state_label(state: &SessionState) -> &'static str {
    match state {
        SessionState::Idle => "idle",
        SessionState::ReadyToSubmit => "ready_to_submit",
        SessionState::Submitting => "submitting",
        SessionState::Result(_) => "result",
        SessionState::Failed(_) => "failed",
    }
}

/// One verification session, bridged into JS.
///
/// Camera frames arrive as encoded JPEG bytes; quality samples arrive as the
/// analyzer's JSON (`{"lighting": "...", "faceDetected": ..., "blur": "..."}`)
/// once per sampling tick.
#[wasm_bindgen]
pub struct BrowserSession {
    session: VerificationSession,
    latest_quality: Option<QualitySignal>,
}

impl Default for BrowserSession {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl BrowserSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            session: VerificationSession::new(),
            latest_quality: None,
        }
    }

    /// Attach the identity document from a file picker or drop event.
    #[wasm_bindgen(js_name = attachDocument)]
    pub fn attach_document(
        &mut self,
        data: Vec<u8>,
        file_name: String,
        content_type: Option<String>,
    ) -> Result<(), JsValue> {
        let artifact = ImageArtifact::from_upload(vec![RawUpload {
            data,
            file_name,
            content_type,
        }])
        .map_err(to_js)?;
        self.session.attach_document(artifact).map_err(to_js)
    }

    /// Attach a selfie uploaded as a file, bypassing the camera path.
    #[wasm_bindgen(js_name = attachSelfie)]
    pub fn attach_selfie(
        &mut self,
        data: Vec<u8>,
        file_name: String,
        content_type: Option<String>,
    ) -> Result<(), JsValue> {
        let artifact = ImageArtifact::from_upload(vec![RawUpload {
            data,
            file_name,
            content_type,
        }])
        .map_err(to_js)?;
        self.session.attach_selfie(artifact).map_err(to_js)
    }

    #[wasm_bindgen(js_name = clearDocument)]
    pub fn clear_document(&mut self) -> Result<(), JsValue> {
        self.session.clear_document().map_err(to_js)
    }

    #[wasm_bindgen(js_name = clearSelfie)]
    pub fn clear_selfie(&mut self) -> Result<(), JsValue> {
        self.session.clear_selfie().map_err(to_js)
    }

    /// Record one quality sample from the active camera preview.
    ///
    /// Returns whether capture is currently admissible.
    #[wasm_bindgen(js_name = recordQuality)]
    pub fn record_quality(&mut self, sample_json: &str) -> Result<bool, JsValue> {
        let signal: QualitySignal = serde_json::from_str(sample_json)
            .map_err(|e| JsValue::from_str(&format!("invalid quality sample: {e}")))?;
        self.latest_quality = Some(signal);
        Ok(signal.capture_admissible())
    }

    /// Whether the capture button should be enabled right now.
    #[wasm_bindgen(js_name = captureAllowed)]
    pub fn capture_allowed(&self) -> bool {
        self.latest_quality
            .map(|signal| signal.capture_admissible())
            .unwrap_or(false)
    }

    /// Finalize a camera frame into the selfie slot.
    ///
    /// Returns `false` without touching the session when the quality gate
    /// blocks; JS should keep the preview running. On `true` the caller must
    /// stop the media tracks.
    #[wasm_bindgen(js_name = captureSelfie)]
    pub fn capture_selfie(&mut self, frame: Vec<u8>) -> Result<bool, JsValue> {
        if !self.capture_allowed() {
            return Ok(false);
        }
        let artifact = ImageArtifact::new(frame, "selfie.jpg", "image/jpeg");
        self.session.attach_selfie(artifact).map_err(to_js)?;
        self.latest_quality = None;
        Ok(true)
    }

    /// Drop any pending camera quality state (preview closed or cancelled).
    #[wasm_bindgen(js_name = cancelCamera)]
    pub fn cancel_camera(&mut self) {
        self.latest_quality = None;
    }

    /// Both artifacts present and no request in flight.
    pub fn ready(&self) -> bool {
        self.session.ready()
    }

    /// Current state as a stable label for UI dispatch.
    pub fn state(&self) -> String {
        state_label(&self.session.state()).to_string()
    }

    /// Transition into `submitting` before JS issues the fetch.
    ///
    /// Fails closed: an error here means no request must be sent.
    #[wasm_bindgen(js_name = beginSubmit)]
    pub fn begin_submit(&mut self) -> Result<(), JsValue> {
        self.session.begin_submit().map_err(to_js)
    }

    /// Resolve the in-flight attempt from the fetch reply.
    ///
    /// Applies the dispatch contract (status code, declared content type,
    /// body) and returns the resulting state label.
    pub fn complete(
        &mut self,
        status: u16,
        content_type: Option<String>,
        body: String,
    ) -> String {
        match interpret_response(status, content_type.as_deref(), &body) {
            Ok(verdict) => self.session.complete_with_verdict(verdict),
            Err(e) => {
                warn(&format!("verification attempt failed: {e}"));
                let reason = e.failure_reason().unwrap_or(FailureReason::NetworkError);
                self.session.complete_with_failure(reason);
            }
        }
        self.state()
    }

    /// Resolve the in-flight attempt when the fetch itself rejected.
    #[wasm_bindgen(js_name = failWithNetworkError)]
    pub fn fail_with_network_error(&mut self, detail: String) {
        warn(&format!("verification request failed: {detail}"));
        self.session.complete_with_failure(FailureReason::NetworkError);
    }

    /// Human-readable message for a failed attempt, if the session failed.
    #[wasm_bindgen(js_name = failureMessage)]
    pub fn failure_message(&self) -> Option<String> {
        match self.session.state() {
            SessionState::Failed(reason) => Some(reason.user_message().to_string()),
            _ => None,
        }
    }

    /// The held verdict as JSON, if the session has a result.
    #[wasm_bindgen(js_name = verdictJson)]
    pub fn verdict_json(&self) -> Option<String> {
        match self.session.state() {
            SessionState::Result(verdict) => serde_json::to_string(&verdict).ok(),
            _ => None,
        }
    }

    /// Serialized downloadable report for a completed verification.
    #[wasm_bindgen(js_name = reportJson)]
    pub fn report_json(&self) -> Result<String, JsValue> {
        let report = self.session.build_report().map_err(to_js)?;
        report.to_json().map_err(to_js)
    }

    /// Timestamped file name for the report download.
    #[wasm_bindgen(js_name = reportFileName)]
    pub fn report_file_name(&self) -> String {
        idverify_core::VerificationReport::file_name()
    }

    /// Discard all artifacts, results, and camera state.
    pub fn reset(&mut self) {
        self.session.reset();
        self.latest_quality = None;
    }
}

/// Simulated quality analyzer, bridged so the JS preview loop can pull one
/// sample per tick and feed it to [`BrowserSession::record_quality`].
#[wasm_bindgen]
pub struct SimulatedQuality {
    analyzer: SimulatedAnalyzer,
}

#[wasm_bindgen]
impl SimulatedQuality {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            analyzer: seed.map(SimulatedAnalyzer::new).unwrap_or_default(),
        }
    }

    /// One quality sample as JSON.
    pub fn sample(&self) -> Result<String, JsValue> {
        let signal = self.analyzer.analyze();
        serde_json::to_string(&signal).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_gate_blocks_until_admissible_sample() {
        let mut session = BrowserSession::new();
        assert!(!session.capture_allowed());

        let blocked = session
            .record_quality(r#"{"lighting":"poor","faceDetected":true,"blur":"low"}"#)
            .unwrap();
        assert!(!blocked);
        assert_eq!(session.capture_selfie(vec![1, 2, 3]).unwrap(), false);

        let admitted = session
            .record_quality(r#"{"lighting":"good","faceDetected":true,"blur":"high"}"#)
            .unwrap();
        assert!(admitted);
        assert_eq!(session.capture_selfie(vec![1, 2, 3]).unwrap(), true);
    }

    #[test]
    fn test_complete_dispatches_on_content_type() {
        let mut session = BrowserSession::new();
        session
            .attach_document(vec![1], "id.jpg".into(), Some("image/jpeg".into()))
            .unwrap();
        session
            .attach_selfie(vec![2], "selfie.jpg".into(), Some("image/jpeg".into()))
            .unwrap();
        session.begin_submit().unwrap();

        let state = session.complete(
            200,
            Some("application/json".into()),
            r#"{"status":"verified","age":24,"dob":"1999-05-01","matchConfidence":91.2}"#.into(),
        );
        assert_eq!(state, "result");
        assert!(session.verdict_json().unwrap().contains("verified"));
        assert!(session.report_json().unwrap().contains("id.jpg"));
    }

    #[test]
    fn test_traceback_reply_fails_the_attempt() {
        let mut session = BrowserSession::new();
        session
            .attach_document(vec![1], "id.jpg".into(), None)
            .unwrap();
        session
            .attach_selfie(vec![2], "selfie.jpg".into(), None)
            .unwrap();
        session.begin_submit().unwrap();

        let state = session.complete(
            500,
            Some("text/html".into()),
            "Traceback (most recent call last): ...".into(),
        );
        assert_eq!(state, "failed");
        assert!(session.failure_message().is_some());
    }
}
