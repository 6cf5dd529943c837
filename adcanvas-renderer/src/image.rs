//! Image loading utilities.
//!
//! Decodes image bytes from files and `data:` URIs so image objects can be
//! sized from their natural dimensions, and provides a file-backed
//! [`ImageProvider`] for the engine.

use std::path::Path;

use adcanvas_core::{CanvasError, CanvasResult, ImageProvider, ImageSource, LoadedImage};
use async_trait::async_trait;
use base64::Engine;
use tracing::debug;

use crate::error::{RenderError, RenderResult};

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG with alpha support.
    Png,
    /// JPEG (no alpha).
    Jpeg,
    /// GIF (first frame only).
    Gif,
    /// WebP (alpha support).
    WebP,
    /// Unknown/other format.
    Unknown,
}

impl ImageFormat {
    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.len() < 4 {
            return Self::Unknown;
        }
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Self::Png;
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Self::Jpeg;
        }
        if data.starts_with(b"GIF8") {
            return Self::Gif;
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Self::WebP;
        }
        Self::Unknown
    }

    /// MIME type used when embedding as a data URI.
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::WebP => "image/webp",
            Self::Unknown => "application/octet-stream",
        }
    }
}

/// Natural size of encoded image bytes.
///
/// # Errors
///
/// Returns an error if the bytes cannot be decoded.
pub fn image_dimensions(data: &[u8]) -> RenderResult<(u32, u32)> {
    let img = image::load_from_memory(data)
        .map_err(|e| RenderError::Resource(format!("Failed to decode image: {e}")))?;
    Ok((img.width(), img.height()))
}

/// Extract the payload of a `data:` URI.
///
/// Supports both `;base64` and percent-encoded payloads.
///
/// # Errors
///
/// Returns an error if the URI is malformed.
pub fn data_uri_bytes(uri: &str) -> RenderResult<Vec<u8>> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| RenderError::Resource("Not a data URI".to_string()))?;
    let (metadata, encoded) = rest
        .split_once(',')
        .ok_or_else(|| RenderError::Resource("Invalid data URI: missing comma".to_string()))?;

    if metadata.contains(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| RenderError::Resource(format!("Failed to decode base64: {e}")))
    } else {
        percent_decode(encoded)
    }
}

/// Encode image bytes as a base64 `data:` URI, sniffing the MIME type.
#[must_use]
pub fn to_data_uri(data: &[u8]) -> String {
    let mime = ImageFormat::from_magic_bytes(data).mime_type();
    let encoded = base64::engine::general_purpose::STANDARD.encode(data);
    format!("data:{mime};base64,{encoded}")
}

/// Decode bytes into a [`LoadedImage`] whose source is a data URI.
///
/// # Errors
///
/// Returns an error if the bytes are not a decodable image.
pub fn loaded_from_bytes(data: &[u8]) -> RenderResult<LoadedImage> {
    let (natural_width, natural_height) = image_dimensions(data)?;
    Ok(LoadedImage {
        src: to_data_uri(data),
        natural_width,
        natural_height,
    })
}

fn percent_decode(input: &str) -> RenderResult<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let byte = bytes
                .get(i + 1..i + 3)
                .and_then(|hex| std::str::from_utf8(hex).ok())
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .ok_or_else(|| RenderError::Resource("Invalid URL encoding".to_string()))?;
            result.push(byte);
            i += 3;
        } else {
            result.push(bytes[i]);
            i += 1;
        }
    }
    Ok(result)
}

/// Resolves image sources from the local filesystem and inline data URIs.
///
/// Remote URLs are not fetched; supply a provider with network access for
/// those.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileImageProvider;

impl FileImageProvider {
    async fn read_file(path: &Path) -> RenderResult<LoadedImage> {
        let data = tokio::fs::read(path).await?;
        debug!(path = %path.display(), bytes = data.len(), "Read image file");
        loaded_from_bytes(&data)
    }
}

#[async_trait]
impl ImageProvider for FileImageProvider {
    async fn resolve(&self, source: &ImageSource) -> CanvasResult<LoadedImage> {
        match source {
            ImageSource::File(path) => Ok(Self::read_file(path).await?),
            ImageSource::Url(url) if url.starts_with("data:") => {
                let data = data_uri_bytes(url)?;
                let (natural_width, natural_height) = image_dimensions(&data)?;
                Ok(LoadedImage {
                    src: url.clone(),
                    natural_width,
                    natural_height,
                })
            }
            ImageSource::Url(url) => Err(CanvasError::ResourceLoad(format!(
                "remote image not available offline: {url}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1×1 red pixel
    const PNG_BASE64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

    #[test]
    fn test_format_detection_from_magic_bytes() {
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A]),
            ImageFormat::Png
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]),
            ImageFormat::Jpeg
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(b"RIFF\x00\x00\x00\x00WEBP"),
            ImageFormat::WebP
        );
        assert_eq!(ImageFormat::from_magic_bytes(&[1, 2]), ImageFormat::Unknown);
    }

    #[test]
    fn test_data_uri_parsing() {
        let uri = format!("data:image/png;base64,{PNG_BASE64}");
        let bytes = data_uri_bytes(&uri).expect("decode");
        assert_eq!(image_dimensions(&bytes).expect("dims"), (1, 1));
    }

    #[test]
    fn test_percent_encoded_data_uri() {
        let bytes = data_uri_bytes("data:text/plain,a%20b").expect("decode");
        assert_eq!(bytes, b"a b");
        assert!(data_uri_bytes("data:text/plain,%zz").is_err());
    }

    #[test]
    fn test_invalid_data_uri() {
        assert!(data_uri_bytes("not a data uri").is_err());
        assert!(data_uri_bytes("data:image/png").is_err());
    }

    #[test]
    fn test_to_data_uri_sniffs_mime() {
        let bytes = data_uri_bytes(&format!("data:image/png;base64,{PNG_BASE64}")).expect("decode");
        let uri = to_data_uri(&bytes);
        assert!(uri.starts_with("data:image/png;base64,"));
        assert_eq!(data_uri_bytes(&uri).expect("decode"), bytes);
    }
}
