//! Verification forwarding handler
//!
//! Handles POST /api/verify: parses the browser's two-part upload and relays
//! the remote verdict, or a normalized error envelope.

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use idverify_core::VerificationVerdict;

use crate::error::ApiError;
use crate::multipart::VerifyUpload;
use crate::state::AppState;

/// Normalized error envelope returned on forwarding failures.
#[derive(Serialize, ToSchema)]
pub struct ProxyErrorBody {
    /// Generic human-readable message
    #[schema(example = "Verification request could not be completed")]
    pub error: String,
    /// Raw diagnostic detail for operators
    pub details: String,
}

/// Forward a verification attempt to the remote service
///
/// Accepts multipart/form-data with exactly two file parts:
/// - **aadhar** (required): The identity document image (or PDF)
/// - **selfie** (required): The facial photo
///
/// The two parts are re-wrapped into a fresh multipart request toward the
/// configured verification service. A JSON reply is relayed verbatim with
/// the remote status code; any forwarding failure or non-JSON reply becomes
/// a normalized `{error, details}` body with status 500.
#[utoipa::path(
    post,
    path = "/api/verify",
    tag = "Verification",
    request_body(
        content_type = "multipart/form-data",
        description = "Document and selfie images to verify"
    ),
    responses(
        (status = 200, description = "Remote verdict relayed verbatim"),
        (status = 400, description = "Invalid request (missing part, oversized file)"),
        (status = 500, description = "Forwarding failed or remote reply was not JSON", body = ProxyErrorBody)
    )
)]
pub async fn verify_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let upload = VerifyUpload::parse(&mut multipart, state.max_file_size).await?;

    tracing::info!(
        document = upload.document.file_name.as_deref().unwrap_or("<unnamed>"),
        document_bytes = upload.document.data.len(),
        selfie_bytes = upload.selfie.data.len(),
        "forwarding verification attempt"
    );

    let reply = state
        .upstream
        .forward(upload.document, upload.selfie)
        .await
        .map_err(|e| ApiError::upstream(e.to_string()))?;

    if reply.is_json {
        let status =
            StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Log the verdict shape when it parses; the body is relayed verbatim
        // either way, so the browser client stays the authority on dispatch.
        if status.is_success() {
            match VerificationVerdict::from_json(&String::from_utf8_lossy(&reply.body)) {
                Ok(verdict) => tracing::info!(
                    verified = verdict.is_verified(),
                    age_eligible = verdict.age_eligible(),
                    high_confidence = verdict.high_confidence(),
                    "verification verdict relayed"
                ),
                Err(e) => tracing::warn!(error = %e, "relaying JSON body that is not a verdict"),
            }
        }

        Ok((
            status,
            [(header::CONTENT_TYPE, "application/json")],
            reply.body,
        )
            .into_response())
    } else {
        let details = String::from_utf8_lossy(&reply.body).into_owned();
        Err(ApiError::Upstream {
            status: Some(reply.status),
            details,
        })
    }
}
