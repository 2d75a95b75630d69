// SPDX-License-Identifier: MPL-2.0

//! GStreamer camera backend
//!
//! Capture goes through `pipewiresrc` when PipeWire is present, otherwise
//! through `v4l2src` on the device picked by facing preference. Frames are
//! converted to RGBA and pushed from the streaming thread into the stream's
//! frame channel.

mod pipeline;

pub use pipeline::CapturePipeline;

use super::MediaDevices;
use super::stream::{MediaStream, MediaTrack, TrackSettings};
use super::types::*;
use crate::constants::capture;
use crate::errors::AcquireError;
use tracing::{debug, info};

/// Where the pipeline reads frames from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceElement {
    /// `pipewiresrc`, letting PipeWire pick the camera
    PipeWire,
    /// `v4l2src` on a device node
    V4l2(String),
}

impl SourceElement {
    /// gst-launch fragment for this source
    pub fn launch_fragment(&self) -> String {
        match self {
            SourceElement::PipeWire => "pipewiresrc do-timestamp=true".to_string(),
            SourceElement::V4l2(path) => format!("v4l2src device=\"{}\" do-timestamp=true", path),
        }
    }
}

/// GStreamer backend
pub struct GStreamerBackend {
    initialized: bool,
}

impl GStreamerBackend {
    pub fn new() -> Self {
        Self { initialized: false }
    }

    fn ensure_init(&mut self) -> BackendResult<()> {
        if !self.initialized {
            gstreamer::init().map_err(|e| AcquireError::unavailable(e.to_string()))?;
            self.initialized = true;
            debug!("GStreamer initialized");
        }
        Ok(())
    }

    fn has_element(name: &str) -> bool {
        gstreamer::ElementFactory::find(name).is_some()
    }

    /// Pick the source for a request
    ///
    /// A V4L2 device matching the facing preference wins, since PipeWire
    /// cannot be asked for a facing. Without V4L2 devices PipeWire decides.
    fn pick_source(&self, constraints: &Constraints) -> BackendResult<(SourceElement, String)> {
        let devices = self.enumerate_devices()?;
        if let Some(device) = select_device(&devices, constraints.facing_mode)
            && Self::has_element("v4l2src")
        {
            return Ok((
                SourceElement::V4l2(device.device_id.clone()),
                device.label.clone(),
            ));
        }
        if Self::has_element("pipewiresrc") {
            return Ok((SourceElement::PipeWire, "PipeWire Camera".to_string()));
        }
        Err(AcquireError::not_found("no video input matches the request"))
    }
}

impl Default for GStreamerBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaDevices for GStreamerBackend {
    fn backend_type(&self) -> CameraBackendType {
        CameraBackendType::GStreamer
    }

    fn is_available(&self) -> bool {
        gstreamer::init().is_ok()
            && (Self::has_element("pipewiresrc") || Self::has_element("v4l2src"))
    }

    fn enumerate_devices(&self) -> BackendResult<Vec<MediaDeviceInfo>> {
        #[cfg(feature = "v4l")]
        {
            super::v4l2_utils::enumerate_v4l2_devices()
        }
        #[cfg(not(feature = "v4l"))]
        {
            Ok(Vec::new())
        }
    }

    fn get_user_media(&mut self, constraints: &Constraints) -> BackendResult<MediaStream> {
        self.ensure_init()?;
        let (source, label) = self.pick_source(constraints)?;
        info!(source = ?source, label = %label, constraints = %constraints, "Opening camera");

        let (sender, receiver) = futures::channel::mpsc::channel(capture::FRAME_CHANNEL_DEPTH);
        let pipeline = CapturePipeline::new(&source, constraints, sender)?;

        let (width, height) = pipeline.negotiated_size().unwrap_or((
            constraints.ideal_width.unwrap_or(0),
            constraints.ideal_height.unwrap_or(0),
        ));
        let device_id = match &source {
            SourceElement::PipeWire => "pipewire".to_string(),
            SourceElement::V4l2(path) => path.clone(),
        };
        let facing_mode = FacingMode::from_label(&label).or(constraints.facing_mode);

        let track = MediaTrack::new(
            label,
            TrackSettings {
                width,
                height,
                frame_rate: pipeline.negotiated_frame_rate(),
                facing_mode,
                device_id,
            },
        );

        Ok(MediaStream::new(
            vec![track],
            receiver,
            Some(Box::new(pipeline)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_v4l2_fragment_quotes_device() {
        let source = SourceElement::V4l2("/dev/video0".to_string());
        assert_eq!(
            source.launch_fragment(),
            "v4l2src device=\"/dev/video0\" do-timestamp=true"
        );
    }
}
