use thiserror::Error;

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("no usable file in selection: {0}")]
    InvalidMedia(String),

    #[error("camera unavailable: {0}")]
    CaptureUnavailable(String),

    #[error("both a document and a selfie are required")]
    MissingArtifacts,

    #[error("a verification request is already in flight")]
    SubmissionInFlight,

    #[error("a camera session is already active")]
    CameraBusy,

    #[error("session already holds a result; reset to start over")]
    SessionComplete,

    #[error("no verification result available")]
    NoResult,

    #[error("network error reaching verification service: {0}")]
    NetworkError(String),

    #[error("verification service error{}", .status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    BackendError { status: Option<u16>, body: String },

    #[error("malformed verification response: {detail}")]
    MalformedResponse { detail: String, body: String },

    #[error("serialization error: {0}")]
    SerializationError(String),
}

impl VerifyError {
    /// Raw diagnostic payload attached to the error, if any.
    ///
    /// Backend bodies and unparseable responses are kept for operator logs
    /// and must never be shown verbatim to end users.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Self::BackendError { body, .. } | Self::MalformedResponse { body, .. } => {
                Some(body.as_str())
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, VerifyError>;
