// SPDX-License-Identifier: MPL-2.0

//! GStreamer capture pipeline producing RGBA frames

use super::SourceElement;
use crate::backends::camera::stream::StreamControl;
use crate::backends::camera::types::*;
use crate::constants::timing;
use crate::errors::{AcquireError, AcquireErrorKind};
use gstreamer::prelude::*;
use gstreamer_app::AppSink;
use gstreamer_video::VideoInfo;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// A running capture pipeline
///
/// Dropping it, or halting it through [`StreamControl`], sets the pipeline
/// to `Null` and releases the camera.
pub struct CapturePipeline {
    pipeline: gstreamer::Pipeline,
    appsink: AppSink,
    stopped: bool,
}

impl CapturePipeline {
    /// Build and start a pipeline
    ///
    /// The ideal resolution is tried as a caps filter first. If the device
    /// refuses it, the pipeline is rebuilt without size caps so the source
    /// can negotiate whatever it supports.
    pub fn new(
        source: &SourceElement,
        constraints: &Constraints,
        frame_sender: FrameSender,
    ) -> BackendResult<Self> {
        let mut attempts = Vec::with_capacity(2);
        if let (Some(w), Some(h)) = (constraints.ideal_width, constraints.ideal_height) {
            attempts.push(format!(
                "{} ! video/x-raw,width=(int){},height=(int){} ! videoconvert ! \
                 video/x-raw,format=RGBA ! appsink name=sink",
                source.launch_fragment(),
                w,
                h
            ));
        }
        attempts.push(format!(
            "{} ! videoconvert ! video/x-raw,format=RGBA ! appsink name=sink",
            source.launch_fragment()
        ));

        let mut last_error = AcquireError::not_found("no pipeline could be built");
        for description in &attempts {
            match Self::launch(description, frame_sender.clone()) {
                Ok(pipeline) => return Ok(pipeline),
                Err(e) => {
                    debug!(pipeline = %description, error = %e, "Pipeline attempt failed");
                    // Permission problems will not go away with other caps
                    if e.kind == AcquireErrorKind::NotAllowed {
                        return Err(e);
                    }
                    last_error = e;
                }
            }
        }
        error!(error = %last_error, "All pipeline attempts failed");
        Err(last_error)
    }

    fn launch(description: &str, frame_sender: FrameSender) -> BackendResult<Self> {
        info!(pipeline = %description, "Launching capture pipeline");

        let pipeline = gstreamer::parse::launch(description)
            .map_err(|e| AcquireError::unavailable(format!("parse failed: {}", e)))?
            .dynamic_cast::<gstreamer::Pipeline>()
            .map_err(|_| AcquireError::unavailable("launch result is not a pipeline"))?;

        let appsink = pipeline
            .by_name("sink")
            .ok_or_else(|| AcquireError::unavailable("appsink missing"))?
            .dynamic_cast::<AppSink>()
            .map_err(|_| AcquireError::unavailable("sink is not an appsink"))?;

        appsink.set_property("sync", false);
        appsink.set_property("max-buffers", 2u32);
        appsink.set_property("drop", true);
        appsink.set_property("enable-last-sample", false);
        appsink.set_callbacks(frame_callbacks(frame_sender));

        let capture = Self {
            pipeline,
            appsink,
            stopped: false,
        };

        if let Err(e) = capture.pipeline.set_state(gstreamer::State::Playing) {
            let err = capture
                .bus_error()
                .unwrap_or_else(|| AcquireError::not_readable(format!("failed to start: {}", e)));
            return Err(err);
        }

        let (result, state, pending) = capture.pipeline.state(gstreamer::ClockTime::from_seconds(
            timing::START_TIMEOUT_SECS,
        ));
        debug!(?result, ?state, ?pending, "Pipeline state after start");

        let started = state == gstreamer::State::Playing
            || (matches!(result, Ok(gstreamer::StateChangeSuccess::Async))
                && pending == gstreamer::State::Playing);
        if !started {
            let err = capture.bus_error().unwrap_or_else(|| {
                AcquireError::not_readable(format!("pipeline stuck in {:?}", state))
            });
            return Err(err);
        }

        info!("Capture pipeline playing");
        Ok(capture)
    }

    /// Pop the first error off the bus and classify it
    fn bus_error(&self) -> Option<AcquireError> {
        let bus = self.pipeline.bus()?;
        let msg = bus.timed_pop_filtered(
            gstreamer::ClockTime::ZERO,
            &[gstreamer::MessageType::Error],
        )?;
        let gstreamer::MessageView::Error(err) = msg.view() else {
            return None;
        };
        let gerr = err.error();
        let kind = match gerr.kind::<gstreamer::ResourceError>() {
            Some(gstreamer::ResourceError::NotAuthorized) => AcquireErrorKind::NotAllowed,
            Some(gstreamer::ResourceError::NotFound) => AcquireErrorKind::NotFound,
            Some(gstreamer::ResourceError::Settings) => AcquireErrorKind::Overconstrained,
            _ => AcquireErrorKind::NotReadable,
        };
        warn!(error = %gerr, debug = ?err.debug(), "Pipeline bus error");
        Some(AcquireError::new(kind, gerr.to_string()))
    }

    fn negotiated_info(&self) -> Option<VideoInfo> {
        let caps = self.appsink.static_pad("sink")?.current_caps()?;
        VideoInfo::from_caps(&caps).ok()
    }

    /// Width and height once caps are negotiated
    pub fn negotiated_size(&self) -> Option<(u32, u32)> {
        self.negotiated_info().map(|info| (info.width(), info.height()))
    }

    /// Frame rate once caps are negotiated (`None` for variable rate)
    pub fn negotiated_frame_rate(&self) -> Option<f64> {
        let fps = self.negotiated_info()?.fps();
        if fps.numer() > 0 && fps.denom() > 0 {
            Some(fps.numer() as f64 / fps.denom() as f64)
        } else {
            None
        }
    }

    fn shutdown(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        info!("Stopping capture pipeline");

        // Dropping the callbacks drops the frame sender, which closes the
        // surface's channel
        self.appsink
            .set_callbacks(gstreamer_app::AppSinkCallbacks::builder().build());

        if let Err(e) = self.pipeline.set_state(gstreamer::State::Null) {
            warn!(error = %e, "Failed to set pipeline to Null");
            return;
        }
        let (result, state, _) = self.pipeline.state(gstreamer::ClockTime::from_seconds(
            timing::STOP_TIMEOUT_SECS,
        ));
        match result {
            Ok(_) => info!(?state, "Capture pipeline stopped"),
            Err(e) => debug!(error = ?e, ?state, "Pipeline state change had issues"),
        }
    }
}

impl StreamControl for CapturePipeline {
    fn halt(&mut self) {
        self.shutdown();
    }
}

impl Drop for CapturePipeline {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn frame_callbacks(frame_sender: FrameSender) -> gstreamer_app::AppSinkCallbacks {
    let frame_counter = AtomicU64::new(0);

    gstreamer_app::AppSinkCallbacks::builder()
        .new_sample(move |appsink| {
            let frame_start = Instant::now();
            let frame_num = frame_counter.fetch_add(1, Ordering::Relaxed);

            let sample = appsink.pull_sample().map_err(|_| gstreamer::FlowError::Eos)?;
            let buffer = sample.buffer().ok_or(gstreamer::FlowError::Error)?;
            if buffer.flags().contains(gstreamer::BufferFlags::CORRUPTED) {
                debug!(frame = frame_num, "Skipping corrupted buffer");
                return Ok(gstreamer::FlowSuccess::Ok);
            }
            let caps = sample.caps().ok_or(gstreamer::FlowError::Error)?;
            let video_info = VideoInfo::from_caps(caps).map_err(|e| {
                error!(frame = frame_num, error = ?e, "Failed to read video info");
                gstreamer::FlowError::Error
            })?;
            let format = PixelFormat::from_gst_format(video_info.format().to_str())
                .ok_or(gstreamer::FlowError::NotNegotiated)?;
            let map = buffer
                .map_readable()
                .map_err(|_| gstreamer::FlowError::Error)?;

            let frame = CameraFrame {
                width: video_info.width(),
                height: video_info.height(),
                data: Arc::from(map.as_slice()),
                format,
                stride: video_info.stride()[0] as u32,
                captured_at: frame_start,
            };

            let mut sender = frame_sender.clone();
            match sender.try_send(frame) {
                Ok(()) => {
                    if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                        debug!(
                            frame = frame_num,
                            width = video_info.width(),
                            height = video_info.height(),
                            total_us = frame_start.elapsed().as_micros(),
                            "Frame delivered"
                        );
                    }
                }
                Err(e) if e.is_disconnected() => return Err(gstreamer::FlowError::Eos),
                Err(_) => {
                    if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                        debug!(frame = frame_num, "Frame dropped (channel full)");
                    }
                }
            }

            Ok(gstreamer::FlowSuccess::Ok)
        })
        .build()
}
