//! Image encoding: screenshot file → base64 text for an inline data URL.
//!
//! The bytes go through untouched: no decoding, resizing, or size cap. The
//! declared MIME type follows [`ImageMimePolicy`]; by default it is derived
//! from the file extension so a JPEG screenshot is not labelled as PNG.

use crate::config::ImageMimePolicy;
use crate::error::HelpGenError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;
use std::path::Path;
use tracing::debug;

const PNG_MIME: &str = "image/png";

/// A screenshot ready for inline transmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// Base64 (standard alphabet, padded) of the raw file bytes.
    pub data: String,
    pub mime_type: &'static str,
}

impl EncodedImage {
    /// `data:<mime>;base64,<data>` as accepted by OpenAI-style `image_url` parts.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Read `path` and base64-encode its bytes.
pub async fn encode_image(
    path: &Path,
    policy: ImageMimePolicy,
) -> Result<EncodedImage, HelpGenError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| HelpGenError::ImageRead {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(encode_bytes(&bytes, mime_for(path, policy)))
}

/// Base64-encode an in-memory image.
pub fn encode_bytes(bytes: &[u8], mime_type: &'static str) -> EncodedImage {
    let data = STANDARD.encode(bytes);
    debug!("Encoded image → {} bytes base64 ({})", data.len(), mime_type);
    EncodedImage { data, mime_type }
}

/// MIME type to declare for `path` under `policy`.
///
/// Unknown extensions fall back to `image/png`.
pub fn mime_for(path: &Path, policy: ImageMimePolicy) -> &'static str {
    match policy {
        ImageMimePolicy::AlwaysPng => PNG_MIME,
        ImageMimePolicy::Detect => ImageFormat::from_path(path)
            .map(|format| format.to_mime_type())
            .unwrap_or(PNG_MIME),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn mime_detection_follows_extension() {
        let detect = ImageMimePolicy::Detect;
        assert_eq!(mime_for(Path::new("a.png"), detect), "image/png");
        assert_eq!(mime_for(Path::new("b.JPG"), detect), "image/jpeg");
        assert_eq!(mime_for(Path::new("c.jpeg"), detect), "image/jpeg");
    }

    #[test]
    fn always_png_ignores_extension() {
        assert_eq!(
            mime_for(Path::new("b.jpg"), ImageMimePolicy::AlwaysPng),
            "image/png"
        );
    }

    #[test]
    fn data_url_layout() {
        let img = encode_bytes(b"abc", "image/jpeg");
        assert_eq!(img.data, "YWJj");
        assert_eq!(img.data_url(), "data:image/jpeg;base64,YWJj");
    }

    #[tokio::test]
    async fn encode_reads_raw_bytes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("Login.png");
        let bytes = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 1, 2, 255];
        std::fs::write(&path, bytes).unwrap();

        let img = encode_image(&path, ImageMimePolicy::Detect).await.unwrap();
        assert_eq!(img.mime_type, "image/png");
        assert_eq!(STANDARD.decode(&img.data).unwrap(), bytes);
    }

    #[tokio::test]
    async fn encode_missing_file_fails() {
        let tmp = TempDir::new().unwrap();
        let err = encode_image(&tmp.path().join("gone.png"), ImageMimePolicy::Detect)
            .await
            .unwrap_err();
        assert!(matches!(err, HelpGenError::ImageRead { .. }));
    }
}
