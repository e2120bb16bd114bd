//! Image artifacts produced by upload, drag-drop, or camera capture.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VerifyError};

/// Maximum advisory artifact size (10 MiB).
pub const MAX_ARTIFACT_BYTES: usize = 10 * 1024 * 1024;

/// A raw file handed over by a picker, drop event, or upload widget.
///
/// The content type is optional because drag-drop sources do not always
/// supply one; [`ImageArtifact::from_upload`] fills the gap from the file
/// name.
#[derive(Debug, Clone)]
pub struct RawUpload {
    pub data: Vec<u8>,
    pub file_name: String,
    pub content_type: Option<String>,
}

/// A single binary image held in transient client memory.
///
/// Artifacts are never persisted; they live exactly as long as the session
/// that owns them and are released on reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageArtifact {
    data: Vec<u8>,
    file_name: String,
    content_type: String,
}

impl ImageArtifact {
    pub fn new(
        data: Vec<u8>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            data,
            file_name: file_name.into(),
            content_type: content_type.into(),
        }
    }

    /// Normalize a picker/drop selection into an artifact.
    ///
    /// Takes the first file only when several are provided. Performs no type
    /// or size validation; those checks are advisory at the UI layer and the
    /// remote service remains the authority.
    pub fn from_upload(files: Vec<RawUpload>) -> Result<Self> {
        let first = files
            .into_iter()
            .next()
            .ok_or_else(|| VerifyError::InvalidMedia("empty file selection".into()))?;

        let content_type = match first.content_type {
            Some(ct) if !ct.is_empty() => ct,
            _ => mime_guess::from_path(&first.file_name)
                .first_or_octet_stream()
                .essence_str()
                .to_string(),
        };

        Ok(Self {
            data: first.data,
            file_name: first.file_name,
            content_type,
        })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn byte_size(&self) -> usize {
        self.data.len()
    }

    /// Advisory size check against [`MAX_ARTIFACT_BYTES`].
    pub fn within_size_limit(&self) -> bool {
        self.byte_size() <= MAX_ARTIFACT_BYTES
    }

    /// Advisory type check for the document slot: `image/*` or PDF.
    pub fn acceptable_document_type(&self) -> bool {
        let ct = self.content_type.to_ascii_lowercase();
        ct.starts_with("image/") || ct == "application/pdf"
    }

    /// Advisory type check for the selfie slot: `image/*` only.
    pub fn acceptable_selfie_type(&self) -> bool {
        self.content_type.to_ascii_lowercase().starts_with("image/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, content_type: Option<&str>) -> RawUpload {
        RawUpload {
            data: vec![0u8; 16],
            file_name: name.to_string(),
            content_type: content_type.map(|s| s.to_string()),
        }
    }

    #[test]
    fn test_from_upload_takes_first_file_only() {
        let artifact = ImageArtifact::from_upload(vec![
            upload("id.jpg", Some("image/jpeg")),
            upload("other.png", Some("image/png")),
        ])
        .unwrap();

        assert_eq!(artifact.file_name(), "id.jpg");
        assert_eq!(artifact.content_type(), "image/jpeg");
    }

    #[test]
    fn test_from_upload_empty_selection_rejected() {
        let result = ImageArtifact::from_upload(vec![]);
        assert!(matches!(result, Err(VerifyError::InvalidMedia(_))));
    }

    #[test]
    fn test_from_upload_guesses_missing_content_type() {
        let artifact = ImageArtifact::from_upload(vec![upload("card.pdf", None)]).unwrap();
        assert_eq!(artifact.content_type(), "application/pdf");

        let artifact = ImageArtifact::from_upload(vec![upload("selfie.jpeg", None)]).unwrap();
        assert_eq!(artifact.content_type(), "image/jpeg");
    }

    #[test]
    fn test_document_type_allows_images_and_pdf() {
        let jpeg = ImageArtifact::new(vec![], "id.jpg", "image/jpeg");
        let pdf = ImageArtifact::new(vec![], "id.pdf", "application/pdf");
        let html = ImageArtifact::new(vec![], "id.html", "text/html");

        assert!(jpeg.acceptable_document_type());
        assert!(pdf.acceptable_document_type());
        assert!(!html.acceptable_document_type());
    }

    #[test]
    fn test_selfie_type_allows_images_only() {
        let png = ImageArtifact::new(vec![], "selfie.png", "image/png");
        let pdf = ImageArtifact::new(vec![], "selfie.pdf", "application/pdf");

        assert!(png.acceptable_selfie_type());
        assert!(!pdf.acceptable_selfie_type());
    }

    #[test]
    fn test_size_limit_is_advisory_ten_mib() {
        let small = ImageArtifact::new(vec![0u8; 1024], "id.jpg", "image/jpeg");
        assert!(small.within_size_limit());
        assert_eq!(MAX_ARTIFACT_BYTES, 10 * 1024 * 1024);
    }
}
