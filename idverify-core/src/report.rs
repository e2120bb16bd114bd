//! Downloadable verification reports.
//!
//! A report carries the timestamp, the full verdict, and the original file
//! names of both artifacts. It never embeds the image bytes themselves.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VerifyError};
use crate::verdict::VerificationVerdict;

/// Report object offered for download after a completed verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// RFC 3339 generation time.
    pub timestamp: String,
    #[serde(flatten)]
    pub verdict: VerificationVerdict,
    #[serde(rename = "aadharFileName", default, skip_serializing_if = "Option::is_none")]
    pub aadhar_file_name: Option<String>,
    #[serde(rename = "selfieFileName", default, skip_serializing_if = "Option::is_none")]
    pub selfie_file_name: Option<String>,
}

impl VerificationReport {
    pub fn new(
        verdict: &VerificationVerdict,
        aadhar_file_name: Option<&str>,
        selfie_file_name: Option<&str>,
    ) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            verdict: verdict.clone(),
            aadhar_file_name: aadhar_file_name.map(str::to_string),
            selfie_file_name: selfie_file_name.map(str::to_string),
        }
    }

    /// Suggested download name, `verification-report-<epoch-millis>.json`.
    pub fn file_name() -> String {
        format!("verification-report-{}.json", Utc::now().timestamp_millis())
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| VerifyError::SerializationError(e.to_string()))
    }
}
