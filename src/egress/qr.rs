// SPDX-License-Identifier: GPL-3.0-only

//! QR codes for uploaded photo links

use crate::errors::EgressError;
use qrcode::render::unicode::Dense1x2;
use qrcode::{Color, QrCode};

/// An encoded QR symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrImage {
    /// Modules per side, without quiet zone
    width: usize,
    /// Row-major, true = dark
    modules: Vec<bool>,
    text: String,
}

impl QrImage {
    /// Encode `text` (typically a URL)
    pub fn encode(text: &str) -> Result<Self, EgressError> {
        let code = QrCode::new(text.as_bytes())
            .map_err(|e| EgressError::UploadFailed(format!("QR encoding: {}", e)))?;
        let width = code.width();
        let modules = code
            .to_colors()
            .into_iter()
            .map(|c| c == Color::Dark)
            .collect();
        Ok(Self {
            width,
            modules,
            text: text.to_string(),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Encoded text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether module (x, y) is dark; out-of-range modules are light
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.width && self.modules[y * self.width + x]
    }

    /// Grayscale raster with a four-module quiet zone, `scale` pixels per module
    pub fn to_luma(&self, scale: usize) -> (usize, Vec<u8>) {
        let scale = scale.max(1);
        let side = (self.width + 8) * scale;
        let mut pixels = vec![255u8; side * side];
        for y in 0..side {
            for x in 0..side {
                let mx = (x / scale).wrapping_sub(4);
                let my = (y / scale).wrapping_sub(4);
                if self.is_dark(mx, my) {
                    pixels[y * side + x] = 0;
                }
            }
        }
        (side, pixels)
    }

    /// Half-block rendering for terminals (light modules drawn as blocks,
    /// so it scans on dark backgrounds)
    pub fn to_text(&self) -> String {
        let Ok(code) = QrCode::new(self.text.as_bytes()) else {
            return self.text.clone();
        };
        code.render::<Dense1x2>()
            .dark_color(Dense1x2::Light)
            .light_color(Dense1x2::Dark)
            .quiet_zone(true)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_rendering_has_rows() {
        let qr = QrImage::encode("https://i.ibb.co/abc/retrocam.jpg").unwrap();
        let text = qr.to_text();
        assert!(text.lines().count() >= qr.width() / 2);
    }

    #[test]
    fn test_luma_has_quiet_zone() {
        let qr = QrImage::encode("hello").unwrap();
        let (side, pixels) = qr.to_luma(2);
        assert_eq!(side, (qr.width() + 8) * 2);
        assert!(pixels[..side * 8].iter().all(|&p| p == 255));
    }
}
