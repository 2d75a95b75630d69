// SPDX-License-Identifier: GPL-3.0-only

//! Still image camera source
//!
//! Streams a single image file, or a generated test pattern, as if it were a
//! live camera. Useful on machines without a camera and in tests.

use super::stream::{MediaStream, MediaTrack, StreamControl, TrackSettings};
use super::types::*;
use super::{MediaDevices, acquire_error_from_io};
use crate::constants::capture;
use crate::errors::AcquireError;
use image::{Rgba, RgbaImage};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use tracing::{debug, info, warn};

/// Device id reported for the generated pattern
const TEST_PATTERN_ID: &str = "still:test-pattern";

/// Still image backend
pub struct StillBackend {
    source: Option<PathBuf>,
}

impl StillBackend {
    /// Create a backend streaming `source`, or a test pattern when `None`
    pub fn new(source: Option<PathBuf>) -> Self {
        Self { source }
    }

    fn device(&self) -> MediaDeviceInfo {
        match &self.source {
            Some(path) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| path.display().to_string());
                MediaDeviceInfo::video_input(
                    format!("still:{}", path.display()),
                    format!("Still Image ({})", name),
                )
            }
            None => MediaDeviceInfo::video_input(TEST_PATTERN_ID, "Test Pattern"),
        }
    }

    fn load_image(&self, constraints: &Constraints) -> BackendResult<RgbaImage> {
        match &self.source {
            Some(path) => {
                let reader = image::ImageReader::open(path)
                    .map_err(|e| acquire_error_from_io(&e, &path.display().to_string()))?
                    .with_guessed_format()
                    .map_err(|e| acquire_error_from_io(&e, &path.display().to_string()))?;
                let decoded = reader.decode().map_err(|e| {
                    AcquireError::not_readable(format!("{}: {}", path.display(), e))
                })?;
                Ok(decoded.to_rgba8())
            }
            None => {
                let width = constraints
                    .ideal_width
                    .unwrap_or(capture::TEST_PATTERN_WIDTH)
                    .max(1);
                let height = constraints
                    .ideal_height
                    .unwrap_or(capture::TEST_PATTERN_HEIGHT)
                    .max(1);
                Ok(test_pattern(width, height))
            }
        }
    }
}

impl MediaDevices for StillBackend {
    fn backend_type(&self) -> CameraBackendType {
        CameraBackendType::Still
    }

    fn is_available(&self) -> bool {
        self.source.as_ref().is_none_or(|p| p.exists())
    }

    fn enumerate_devices(&self) -> BackendResult<Vec<MediaDeviceInfo>> {
        if !self.is_available() {
            return Err(AcquireError::not_found("still image source does not exist"));
        }
        Ok(vec![self.device()])
    }

    fn get_user_media(&mut self, constraints: &Constraints) -> BackendResult<MediaStream> {
        let image = self.load_image(constraints)?;
        let device = self.device();
        let frame = CameraFrame::from_image(&image);

        info!(
            device = %device.label,
            width = frame.width,
            height = frame.height,
            "Opening still image stream"
        );

        let track = MediaTrack::new(
            device.label.clone(),
            TrackSettings {
                width: frame.width,
                height: frame.height,
                frame_rate: Some(1000.0 / capture::STILL_FRAME_INTERVAL.as_millis() as f64),
                facing_mode: constraints.facing_mode,
                device_id: device.device_id.clone(),
            },
        );

        let (mut sender, receiver) = futures::channel::mpsc::channel(capture::FRAME_CHANNEL_DEPTH);

        // First frame is queued before returning so a bound surface has
        // something to show immediately.
        if let Err(e) = sender.try_send(frame.clone()) {
            warn!(error = ?e, "Failed to queue first still frame");
        }

        let running = Arc::new(AtomicBool::new(true));
        let producer = spawn_producer(frame, sender, Arc::clone(&running))
            .map_err(|e| AcquireError::not_readable(format!("producer thread: {}", e)))?;

        Ok(MediaStream::new(
            vec![track],
            receiver,
            Some(Box::new(StillControl {
                running,
                producer: Some(producer),
            })),
        ))
    }
}

fn spawn_producer(
    frame: CameraFrame,
    mut sender: FrameSender,
    running: Arc<AtomicBool>,
) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("still-source".to_string())
        .spawn(move || {
            while running.load(Ordering::Acquire) {
                std::thread::sleep(capture::STILL_FRAME_INTERVAL);
                let mut next = frame.clone();
                next.captured_at = std::time::Instant::now();
                match sender.try_send(next) {
                    Ok(()) => {}
                    Err(e) if e.is_disconnected() => break,
                    // Consumer is slow, drop this frame
                    Err(_) => {}
                }
            }
            debug!("Still source producer exiting");
        })
}

struct StillControl {
    running: Arc<AtomicBool>,
    producer: Option<JoinHandle<()>>,
}

impl StreamControl for StillControl {
    fn halt(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.producer.take()
            && handle.join().is_err()
        {
            warn!("Still source producer panicked");
        }
    }
}

/// Generate color bars with a luminance ramp along the bottom
pub fn test_pattern(width: u32, height: u32) -> RgbaImage {
    const BARS: [[u8; 3]; 7] = [
        [192, 192, 192],
        [192, 192, 0],
        [0, 192, 192],
        [0, 192, 0],
        [192, 0, 192],
        [192, 0, 0],
        [0, 0, 192],
    ];
    let ramp_start = height * 3 / 4;

    RgbaImage::from_fn(width, height, |x, y| {
        if y >= ramp_start {
            let v = (x * 255 / width.max(1)) as u8;
            Rgba([v, v, v, 255])
        } else {
            let bar = (x as usize * BARS.len()) / width.max(1) as usize;
            let [r, g, b] = BARS[bar.min(BARS.len() - 1)];
            Rgba([r, g, b, 255])
        }
    })
}
