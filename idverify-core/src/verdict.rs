//! Verification verdicts and the response dispatch contract.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VerifyError};

/// Age threshold for eligibility.
pub const ADULT_AGE: u32 = 18;

/// Face-match confidence threshold for a "high confidence" result.
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 80.0;

/// Overall verification status returned by the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    Verified,
    NotVerified,
}

/// Structured result of a verification attempt. Immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationVerdict {
    pub status: VerdictStatus,
    pub age: u32,
    #[serde(rename = "dob")]
    pub date_of_birth: String,
    #[serde(rename = "matchConfidence")]
    pub match_confidence: f64,
    #[serde(rename = "extractedName", default, skip_serializing_if = "Option::is_none")]
    pub extracted_name: Option<String>,
}

impl VerificationVerdict {
    /// Parse and validate a verdict from a JSON body.
    ///
    /// Structural problems (missing or mistyped fields, out-of-range
    /// confidence) are [`VerifyError::MalformedResponse`] with the raw body
    /// retained for diagnostics.
    pub fn from_json(body: &str) -> Result<Self> {
        let verdict: Self = serde_json::from_str(body).map_err(|e| {
            VerifyError::MalformedResponse {
                detail: e.to_string(),
                body: body.to_string(),
            }
        })?;

        if !(0.0..=100.0).contains(&verdict.match_confidence) {
            return Err(VerifyError::MalformedResponse {
                detail: format!(
                    "matchConfidence {} outside [0, 100]",
                    verdict.match_confidence
                ),
                body: body.to_string(),
            });
        }

        Ok(verdict)
    }

    pub fn is_verified(&self) -> bool {
        self.status == VerdictStatus::Verified
    }

    pub fn age_eligible(&self) -> bool {
        self.age >= ADULT_AGE
    }

    pub fn high_confidence(&self) -> bool {
        self.match_confidence >= HIGH_CONFIDENCE_THRESHOLD
    }
}

/// Interpret a verification response according to the dispatch contract.
///
/// - non-success status: [`VerifyError::BackendError`] with the raw body and
///   the remote status code;
/// - declared JSON: parsed as a verdict, parse failure is
///   [`VerifyError::MalformedResponse`];
/// - anything else: [`VerifyError::BackendError`].
///
/// Shared between the HTTP proxy client and the browser bindings so both
/// sides of the fetch agree on the same mapping.
pub fn interpret_response(
    status: u16,
    content_type: Option<&str>,
    body: &str,
) -> Result<VerificationVerdict> {
    let declared_json = content_type
        .map(|ct| {
            let ct = ct.to_ascii_lowercase();
            ct.starts_with("application/json") || ct.contains("+json")
        })
        .unwrap_or(false);

    if !(200..300).contains(&status) {
        return Err(VerifyError::BackendError {
            status: Some(status),
            body: body.to_string(),
        });
    }

    if !declared_json {
        return Err(VerifyError::BackendError {
            status: Some(status),
            body: body.to_string(),
        });
    }

    VerificationVerdict::from_json(body)
}
