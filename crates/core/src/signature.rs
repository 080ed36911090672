//! Consent signature capture.
//!
//! A signature is stored and sent as an image data URL (`data:image/png;base64,...`), which is
//! what the backend persists alongside the patient record.

use crate::error::{IntakeError, IntakeResult};
use base64::{engine::general_purpose, Engine as _};
use std::path::Path;

const ACCEPTED_MIME_TYPES: &[&str] = &["image/png", "image/jpeg"];

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct ConsentSignature(String);

impl ConsentSignature {
    /// Builds a signature from raw image bytes.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::SignatureFormat`] if the bytes are not a PNG or JPEG image.
    pub fn from_image_bytes(bytes: &[u8]) -> IntakeResult<Self> {
        let mime = infer::get(bytes)
            .map(|kind| kind.mime_type())
            .filter(|mime| ACCEPTED_MIME_TYPES.contains(mime))
            .ok_or(IntakeError::SignatureFormat)?;

        let encoded = general_purpose::STANDARD.encode(bytes);
        Ok(Self(format!("data:{mime};base64,{encoded}")))
    }

    pub fn from_file(path: &Path) -> IntakeResult<Self> {
        let bytes = std::fs::read(path).map_err(IntakeError::SignatureRead)?;
        Self::from_image_bytes(&bytes)
    }

    pub fn as_data_url(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
pub(crate) const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89,
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn png_bytes_become_a_data_url() {
        let signature = ConsentSignature::from_image_bytes(TINY_PNG).expect("png is accepted");
        assert!(signature.as_data_url().starts_with("data:image/png;base64,iVBORw0KGgo"));
    }

    #[test]
    fn non_image_bytes_are_rejected() {
        let err = ConsentSignature::from_image_bytes(b"just some text").unwrap_err();
        assert!(matches!(err, IntakeError::SignatureFormat));
    }

    #[test]
    fn reads_signature_from_file() {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(TINY_PNG).expect("write png");

        let signature = ConsentSignature::from_file(file.path()).expect("file is a png");
        assert!(signature.as_data_url().starts_with("data:image/png"));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = ConsentSignature::from_file(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, IntakeError::SignatureRead(_)));
    }
}
