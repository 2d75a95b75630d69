// SPDX-License-Identifier: MPL-2.0

//! Frame development
//!
//! Turns a live preview frame into a finished still: copy the frame into an
//! offscreen raster at its native resolution, run the preset's filter chain
//! over it, then encode.

use super::encoding::{EncodedImage, PhotoEncoder};
use super::filters::FilterChain;
use crate::backends::camera::types::CameraFrame;
use crate::errors::{AppError, AppResult};
use image::RgbaImage;
use tracing::{debug, info};

/// Copy a frame into an offscreen raster
pub fn snapshot(frame: &CameraFrame) -> AppResult<RgbaImage> {
    frame.to_rgba_image().ok_or_else(|| {
        AppError::Other(format!(
            "frame buffer too small for {}x{} {:?}",
            frame.width, frame.height, frame.format
        ))
    })
}

/// Develops frames with a fixed encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct PhotoDeveloper {
    encoder: PhotoEncoder,
}

impl PhotoDeveloper {
    pub fn new(encoder: PhotoEncoder) -> Self {
        Self { encoder }
    }

    /// Snapshot, filter and encode one frame
    pub fn develop(&self, frame: &CameraFrame, chain: &FilterChain) -> AppResult<EncodedImage> {
        let started = std::time::Instant::now();
        let mut raster = snapshot(frame)?;
        chain.apply(&mut raster);
        debug!(filter = %chain, "Filter applied");

        let encoded = self.encoder.encode(raster)?;
        info!(
            width = encoded.width,
            height = encoded.height,
            size = encoded.data.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Frame developed"
        );
        Ok(encoded)
    }

    /// Filter and encode an already decoded image
    pub fn develop_image(
        &self,
        mut image: RgbaImage,
        chain: &FilterChain,
    ) -> AppResult<EncodedImage> {
        chain.apply(&mut image);
        self.encoder.encode(image)
    }
}
