//! Multipart form parsing helpers
//!
//! Parses the browser's two-part verification upload, preserving each
//! part's original filename and content type so the forwarded request can
//! reproduce them.

use axum::extract::Multipart;

use crate::error::ApiError;
use crate::validation::validate_file_size;

/// Multipart part name for the identity document image.
pub const DOCUMENT_PART: &str = "aadhar";

/// Multipart part name for the selfie image.
pub const SELFIE_PART: &str = "selfie";

/// Represents a file uploaded via multipart form
#[derive(Debug, Clone)]
pub struct FileField {
    /// File data bytes
    pub data: Vec<u8>,
    /// Content-Type from the multipart field (if provided)
    pub content_type: Option<String>,
    /// Original filename from the multipart field (if provided)
    pub file_name: Option<String>,
}

/// The two named artifacts of a verification attempt.
#[derive(Debug)]
pub struct VerifyUpload {
    pub document: FileField,
    pub selfie: FileField,
}

impl VerifyUpload {
    /// Parse both file parts from a multipart request.
    ///
    /// Unknown parts are ignored; both `aadhar` and `selfie` must be present
    /// or the request is rejected before any forwarding happens.
    pub async fn parse(
        multipart: &mut Multipart,
        max_file_size: usize,
    ) -> Result<Self, ApiError> {
        let mut document: Option<FileField> = None;
        let mut selfie: Option<FileField> = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to parse multipart: {}", e)))?
        {
            let name = field.name().unwrap_or("").to_string();
            if name != DOCUMENT_PART && name != SELFIE_PART {
                continue;
            }

            let content_type = field.content_type().map(|s| s.to_string());
            let file_name = field.file_name().map(|s| s.to_string());

            let data = field
                .bytes()
                .await
                .map_err(|e| {
                    ApiError::bad_request(format!("Failed to read field '{}': {}", name, e))
                })?
                .to_vec();

            validate_file_size(data.len(), max_file_size)?;

            let file = FileField {
                data,
                content_type,
                file_name,
            };
            if name == DOCUMENT_PART {
                document = Some(file);
            } else {
                selfie = Some(file);
            }
        }

        match (document, selfie) {
            (Some(document), Some(selfie)) => Ok(Self { document, selfie }),
            (None, _) => Err(ApiError::bad_request(format!(
                "No document provided. Use '{}' field in multipart form.",
                DOCUMENT_PART
            ))),
            (_, None) => Err(ApiError::bad_request(format!(
                "No selfie provided. Use '{}' field in multipart form.",
                SELFIE_PART
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_names_match_wire_contract() {
        assert_eq!(DOCUMENT_PART, "aadhar");
        assert_eq!(SELFIE_PART, "selfie");
    }

    #[test]
    fn test_file_field_preserves_metadata() {
        let field = FileField {
            data: vec![1, 2, 3],
            content_type: Some("image/jpeg".into()),
            file_name: Some("id.jpg".into()),
        };
        assert_eq!(field.data.len(), 3);
        assert_eq!(field.content_type.as_deref(), Some("image/jpeg"));
        assert_eq!(field.file_name.as_deref(), Some("id.jpg"));
    }
}
