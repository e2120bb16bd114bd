//! API error handling module
//!
//! Provides a unified error type for the proxy endpoints. Client responses
//! carry a sanitized message; raw upstream payloads are logged for operators
//! only alongside the normalized `{error, details}` body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// API error type with structured variants for different error categories
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad request - client provided invalid input
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Upstream failure - forwarding failed or the remote service returned
    /// a non-JSON body. Always surfaces as a normalized 500.
    #[error("Upstream failure: {details}")]
    Upstream {
        /// Remote status code, when the remote was reachable
        status: Option<u16>,
        /// Raw diagnostic detail (transport error or response body)
        details: String,
    },

    /// Internal server error - unexpected server-side failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Create an upstream error without a remote status (transport failure)
    pub fn upstream(details: impl Into<String>) -> Self {
        Self::Upstream {
            status: None,
            details: details.into(),
        }
    }

    /// Create an internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            // Any forwarding or non-JSON-response failure is a 500 toward
            // the browser, regardless of what the remote returned.
            Self::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Sanitized message shown to the client
    fn client_message(&self) -> &str {
        match self {
            Self::BadRequest(message) => message,
            Self::Upstream { .. } => "Verification request could not be completed",
            Self::Internal(_) => "Internal server error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            Self::BadRequest(message) => {
                tracing::warn!(status = %status, error = %message, "Client error");
            }
            Self::Upstream {
                status: remote_status,
                details,
            } => {
                tracing::error!(
                    status = %status,
                    remote_status = ?remote_status,
                    details = %details,
                    "Upstream failure (raw diagnostic logged)"
                );
            }
            Self::Internal(message) => {
                tracing::error!(status = %status, error = %message, "Server error");
            }
        }

        let body = match &self {
            Self::Upstream { details, .. } => serde_json::json!({
                "error": self.client_message(),
                "details": details,
            }),
            _ => serde_json::json!({
                "error": self.client_message(),
            }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_always_maps_to_500() {
        let transport = ApiError::upstream("connection refused");
        assert_eq!(transport.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let remote = ApiError::Upstream {
            status: Some(502),
            details: "Bad Gateway".into(),
        };
        assert_eq!(remote.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_client_message_hides_diagnostics() {
        let err = ApiError::Upstream {
            status: Some(500),
            details: "Traceback (most recent call last): ...".into(),
        };
        assert!(!err.client_message().contains("Traceback"));
    }

    #[test]
    fn test_bad_request_status() {
        assert_eq!(
            ApiError::bad_request("missing part").status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
