// SPDX-License-Identifier: GPL-3.0-only
// Shared types for camera backend abstraction

//! Shared types for camera backends

use crate::errors::AcquireError;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Camera backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CameraBackendType {
    /// GStreamer capture (pipewiresrc, falling back to v4l2src)
    #[default]
    GStreamer,
    /// Still image or generated test pattern
    Still,
}

impl std::fmt::Display for CameraBackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CameraBackendType::GStreamer => write!(f, "GStreamer"),
            CameraBackendType::Still => write!(f, "still"),
        }
    }
}

/// Which way the requested camera should face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Selfie camera
    User,
    /// World-facing camera
    #[default]
    Environment,
}

impl FacingMode {
    /// Label fragments that identify a camera facing this way
    pub fn label_hints(&self) -> &'static [&'static str] {
        match self {
            FacingMode::User => &["front", "user", "integrated", "facetime", "webcam"],
            FacingMode::Environment => &["back", "rear", "world", "environment"],
        }
    }

    /// Guess the facing of a device from its label
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.to_lowercase();
        [FacingMode::Environment, FacingMode::User]
            .into_iter()
            .find(|mode| mode.label_hints().iter().any(|hint| label.contains(hint)))
    }
}

impl std::fmt::Display for FacingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FacingMode::User => write!(f, "user"),
            FacingMode::Environment => write!(f, "environment"),
        }
    }
}

/// Constraints for a video-only capture request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Constraints {
    /// Camera-facing preference
    pub facing_mode: Option<FacingMode>,
    /// Ideal width hint (not a hard requirement)
    pub ideal_width: Option<u32>,
    /// Ideal height hint (not a hard requirement)
    pub ideal_height: Option<u32>,
}

impl Constraints {
    pub fn new(facing_mode: FacingMode, ideal_width: u32, ideal_height: u32) -> Self {
        Self {
            facing_mode: Some(facing_mode),
            ideal_width: Some(ideal_width),
            ideal_height: Some(ideal_height),
        }
    }
}

impl std::fmt::Display for Constraints {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let facing = self
            .facing_mode
            .map(|m| m.to_string())
            .unwrap_or_else(|| "any".to_string());
        match (self.ideal_width, self.ideal_height) {
            (Some(w), Some(h)) => write!(f, "facing={} ideal={}x{}", facing, w, h),
            _ => write!(f, "facing={}", facing),
        }
    }
}

/// Kind of an enumerated media device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaDeviceKind {
    VideoInput,
}

/// An enumerated capture device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDeviceInfo {
    /// Backend-specific device id (device path, node id)
    pub device_id: String,
    /// Human-readable label
    pub label: String,
    pub kind: MediaDeviceKind,
    /// Kernel driver name when known
    pub driver: Option<String>,
}

impl MediaDeviceInfo {
    pub fn video_input(device_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            label: label.into(),
            kind: MediaDeviceKind::VideoInput,
            driver: None,
        }
    }

    /// Facing guessed from the label
    pub fn facing(&self) -> Option<FacingMode> {
        FacingMode::from_label(&self.label)
    }
}

/// Pick the device best matching a facing preference
///
/// Falls back to the first device when no label hints at the requested facing.
pub fn select_device(
    devices: &[MediaDeviceInfo],
    facing: Option<FacingMode>,
) -> Option<&MediaDeviceInfo> {
    facing
        .and_then(|wanted| devices.iter().find(|d| d.facing() == Some(wanted)))
        .or_else(|| devices.first())
}

/// Pixel format for camera frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// RGBA - 32-bit with alpha (4 bytes per pixel)
    RGBA,
    /// RGB24 - 24-bit RGB (3 bytes per pixel, no alpha)
    RGB24,
    /// Gray8 - 8-bit grayscale (single channel)
    Gray8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            PixelFormat::RGBA => 4,
            PixelFormat::RGB24 => 3,
            PixelFormat::Gray8 => 1,
        }
    }

    /// Parse format from GStreamer format string
    pub fn from_gst_format(format: &str) -> Option<Self> {
        match format {
            "RGBA" | "RGBx" => Some(Self::RGBA),
            "RGB" => Some(Self::RGB24),
            "GRAY8" => Some(Self::Gray8),
            _ => None,
        }
    }
}

/// A single frame from the camera
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// Pixel rows, `stride` bytes apart
    pub data: Arc<[u8]>,
    pub format: PixelFormat,
    /// Row stride in bytes (may include padding)
    pub stride: u32,
    /// When the frame left the source
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Build a tightly packed RGBA frame
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data: Arc::from(data),
            format: PixelFormat::RGBA,
            stride: width * 4,
            captured_at: Instant::now(),
        }
    }

    /// Build a frame from a decoded image
    pub fn from_image(image: &RgbaImage) -> Self {
        Self::from_rgba(image.width(), image.height(), image.as_raw().clone())
    }

    pub fn data_slice(&self) -> &[u8] {
        &self.data
    }

    /// RGB of the pixel at (x, y), clamped to the frame
    pub fn pixel_rgb(&self, x: u32, y: u32) -> (u8, u8, u8) {
        if self.width == 0 || self.height == 0 {
            return (0, 0, 0);
        }
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        let bpp = self.format.bytes_per_pixel();
        let idx = (y * self.stride + x * bpp) as usize;
        let data = self.data_slice();

        match self.format {
            PixelFormat::RGBA | PixelFormat::RGB24 => {
                if idx + 2 < data.len() {
                    (data[idx], data[idx + 1], data[idx + 2])
                } else {
                    (0, 0, 0)
                }
            }
            PixelFormat::Gray8 => {
                let v = data.get(idx).copied().unwrap_or(0);
                (v, v, v)
            }
        }
    }

    /// Copy the frame into an offscreen raster at its native resolution
    ///
    /// Returns `None` if the buffer is too small for the declared geometry.
    pub fn to_rgba_image(&self) -> Option<RgbaImage> {
        let bpp = self.format.bytes_per_pixel();
        let row_bytes = (self.width * bpp) as usize;
        let stride = self.stride as usize;
        if self.width == 0 || self.height == 0 || stride < row_bytes {
            return None;
        }
        let needed = stride * (self.height as usize - 1) + row_bytes;
        if self.data.len() < needed {
            return None;
        }

        if self.format == PixelFormat::RGBA && stride == row_bytes {
            return RgbaImage::from_raw(self.width, self.height, self.data[..needed].to_vec());
        }

        let mut out = Vec::with_capacity((self.width * self.height * 4) as usize);
        for row in self.data.chunks(stride).take(self.height as usize) {
            let row = &row[..row_bytes];
            match self.format {
                PixelFormat::RGBA => out.extend_from_slice(row),
                PixelFormat::RGB24 => {
                    for px in row.chunks_exact(3) {
                        out.extend_from_slice(&[px[0], px[1], px[2], 255]);
                    }
                }
                PixelFormat::Gray8 => {
                    for &v in row {
                        out.extend_from_slice(&[v, v, v, 255]);
                    }
                }
            }
        }
        RgbaImage::from_raw(self.width, self.height, out)
    }
}

/// Frame receiver type for preview streams
pub type FrameReceiver = futures::channel::mpsc::Receiver<CameraFrame>;

/// Frame sender type for preview streams
pub type FrameSender = futures::channel::mpsc::Sender<CameraFrame>;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, AcquireError>;
