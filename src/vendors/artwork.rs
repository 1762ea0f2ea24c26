//! Cover art download.
//!
//! Adapters only report where a vendor's cover lives. The fetcher downloads
//! it, works out the real image type from the bytes (vendor `Content-Type`
//! headers are unreliable) and re-encodes TIFF as PNG since most tag formats
//! only accept JPEG or PNG pictures.

use std::io::Cursor;

use image::ImageFormat;

use super::domain::VendorError;
use super::http;
use crate::tags::Artwork;

/// Image types we can embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Tiff,
}

impl ImageKind {
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
            ImageKind::Tiff => "image/tiff",
        }
    }
}

/// Identify an image from its leading bytes.
pub fn sniff_image(data: &[u8]) -> Option<ImageKind> {
    match data {
        [0xFF, 0xD8, 0xFF, ..] => Some(ImageKind::Jpeg),
        [0x89, b'P', b'N', b'G', ..] => Some(ImageKind::Png),
        [b'I', b'I', 0x2A, 0x00, ..] | [b'M', b'M', 0x00, 0x2A, ..] => Some(ImageKind::Tiff),
        _ => None,
    }
}

/// Turn downloaded bytes into embeddable artwork.
pub fn prepare_artwork(data: Vec<u8>) -> Result<Artwork, VendorError> {
    match sniff_image(&data) {
        Some(ImageKind::Tiff) => {
            let decoded = image::load_from_memory_with_format(&data, ImageFormat::Tiff)
                .map_err(|e| VendorError::Parse(format!("Unreadable TIFF artwork: {}", e)))?;
            let mut png = Cursor::new(Vec::new());
            decoded
                .write_to(&mut png, ImageFormat::Png)
                .map_err(|e| VendorError::Parse(format!("PNG encode failed: {}", e)))?;
            Ok(Artwork::new(png.into_inner(), ImageKind::Png.mime_type()))
        }
        Some(kind) => Ok(Artwork::new(data, kind.mime_type())),
        None => Err(VendorError::Parse("Artwork is not a JPEG, PNG or TIFF image".to_string())),
    }
}

/// Downloads cover images referenced by vendor metadata.
pub struct ArtworkFetcher {
    http_client: reqwest::Client,
}

impl ArtworkFetcher {
    pub fn new() -> Self {
        Self {
            http_client: http::build_client(),
        }
    }

    pub async fn fetch(&self, url: &str) -> Result<Artwork, VendorError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| VendorError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(http::status_error(status, url, body));
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| VendorError::Network(e.to_string()))?
            .to_vec();

        tracing::debug!("Downloaded {} bytes of artwork from {}", data.len(), url);
        prepare_artwork(data)
    }
}

impl Default for ArtworkFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    fn encode(format: ImageFormat) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, image::Rgb([200, 10, 10])));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_sniff_magic_bytes() {
        assert_eq!(sniff_image(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageKind::Jpeg));
        assert_eq!(sniff_image(b"\x89PNG\r\n\x1a\n"), Some(ImageKind::Png));
        assert_eq!(sniff_image(b"II*\0rest"), Some(ImageKind::Tiff));
        assert_eq!(sniff_image(b"MM\0*rest"), Some(ImageKind::Tiff));
        assert_eq!(sniff_image(b"GIF89a"), None);
        assert_eq!(sniff_image(&[]), None);
    }

    #[test]
    fn test_png_passes_through() {
        let png = encode(ImageFormat::Png);
        let art = prepare_artwork(png.clone()).unwrap();
        assert_eq!(art.mime_type, "image/png");
        assert_eq!(art.data, png);
    }

    #[test]
    fn test_tiff_becomes_png() {
        let tiff = encode(ImageFormat::Tiff);
        assert_eq!(sniff_image(&tiff), Some(ImageKind::Tiff));

        let art = prepare_artwork(tiff).unwrap();

        assert_eq!(art.mime_type, "image/png");
        assert_eq!(sniff_image(&art.data), Some(ImageKind::Png));
    }

    #[test]
    fn test_unknown_image_rejected() {
        let result = prepare_artwork(b"<html>not found</html>".to_vec());
        assert!(matches!(result, Err(VendorError::Parse(_))));
    }
}
