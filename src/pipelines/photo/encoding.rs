// SPDX-License-Identifier: GPL-3.0-only

//! Still image encoding
//!
//! Developed rasters are stored as JPEG, the compressed format every share
//! target and image host accepts.

use crate::constants::encoding;
use crate::errors::{AppError, AppResult};
use image::{DynamicImage, RgbaImage};
use tracing::debug;

/// Encoded image data
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl EncodedImage {
    pub fn mime_type(&self) -> &'static str {
        encoding::MIME_TYPE
    }
}

/// JPEG encoder with a fixed quality
#[derive(Debug, Clone, Copy)]
pub struct PhotoEncoder {
    quality: u8,
}

impl PhotoEncoder {
    /// Quality is clamped to 1..=100
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Encode an RGBA raster; alpha is dropped
    pub fn encode(&self, image: RgbaImage) -> AppResult<EncodedImage> {
        let (width, height) = image.dimensions();
        let rgb = DynamicImage::ImageRgba8(image).to_rgb8();

        let mut buffer = Vec::new();
        let mut encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, self.quality);
        encoder
            .encode(
                rgb.as_raw(),
                width,
                height,
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| AppError::Other(format!("JPEG encoding failed: {}", e)))?;

        debug!(width, height, size = buffer.len(), quality = self.quality, "Encoded JPEG");
        Ok(EncodedImage {
            data: buffer,
            width,
            height,
        })
    }
}

impl Default for PhotoEncoder {
    fn default() -> Self {
        Self::new(encoding::DEFAULT_JPEG_QUALITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_encodes_decodable_jpeg() {
        let image = RgbaImage::from_pixel(16, 8, Rgba([120, 60, 30, 255]));
        let encoded = PhotoEncoder::default().encode(image).unwrap();
        assert_eq!(&encoded.data[..2], &[0xFF, 0xD8]);

        let decoded = image::load_from_memory(&encoded.data).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 8));
    }

    #[test]
    fn test_quality_is_clamped() {
        assert_eq!(PhotoEncoder::new(0).quality(), 1);
        assert_eq!(PhotoEncoder::new(250).quality(), 100);
    }
}
