// SPDX-License-Identifier: GPL-3.0-only

//! Live capture streams and their tracks
//!
//! A [`MediaStream`] is the opaque handle returned by a backend. Track ready
//! state is shared between clones, so anyone holding a [`MediaTrack`] sees the
//! track end when the stream is stopped.

use super::types::{FacingMode, FrameReceiver};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

/// Ready state of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    Live,
    Ended,
}

impl std::fmt::Display for TrackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackState::Live => write!(f, "live"),
            TrackState::Ended => write!(f, "ended"),
        }
    }
}

/// Settings negotiated for a track
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSettings {
    pub width: u32,
    pub height: u32,
    pub frame_rate: Option<f64>,
    pub facing_mode: Option<FacingMode>,
    pub device_id: String,
}

/// A single video track of a stream
#[derive(Debug, Clone)]
pub struct MediaTrack {
    id: Uuid,
    label: String,
    settings: TrackSettings,
    live: Arc<AtomicBool>,
}

impl MediaTrack {
    pub fn new(label: impl Into<String>, settings: TrackSettings) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            settings,
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn settings(&self) -> &TrackSettings {
        &self.settings
    }

    pub fn ready_state(&self) -> TrackState {
        if self.live.load(Ordering::Acquire) {
            TrackState::Live
        } else {
            TrackState::Ended
        }
    }

    pub fn is_live(&self) -> bool {
        self.ready_state() == TrackState::Live
    }

    /// End the track. Idempotent.
    pub fn stop(&self) {
        self.live.store(false, Ordering::Release);
    }
}

/// Backend resources behind a stream (pipeline, producer thread)
pub trait StreamControl: Send {
    /// Release the underlying device. Called once, when the stream stops.
    fn halt(&mut self);
}

/// A live capture stream
pub struct MediaStream {
    id: Uuid,
    tracks: Vec<MediaTrack>,
    frames: Option<FrameReceiver>,
    control: Option<Box<dyn StreamControl>>,
}

impl MediaStream {
    pub fn new(
        tracks: Vec<MediaTrack>,
        frames: FrameReceiver,
        control: Option<Box<dyn StreamControl>>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tracks,
            frames: Some(frames),
            control,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn tracks(&self) -> &[MediaTrack] {
        &self.tracks
    }

    /// True while at least one track is live
    pub fn is_active(&self) -> bool {
        self.tracks.iter().any(MediaTrack::is_live)
    }

    /// Hand the frame channel to a display surface. Only the first call succeeds.
    pub fn take_frames(&mut self) -> Option<FrameReceiver> {
        self.frames.take()
    }

    /// Stop every track and release the device. Idempotent.
    pub fn stop(&mut self) {
        for track in &self.tracks {
            track.stop();
        }
        if let Some(mut control) = self.control.take() {
            control.halt();
        }
    }
}

impl Drop for MediaStream {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaStream")
            .field("id", &self.id)
            .field("tracks", &self.tracks)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct CountingControl(Arc<AtomicUsize>);

    impl StreamControl for CountingControl {
        fn halt(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn settings() -> TrackSettings {
        TrackSettings {
            width: 640,
            height: 480,
            frame_rate: Some(30.0),
            facing_mode: None,
            device_id: "test".to_string(),
        }
    }

    #[test]
    fn test_stop_ends_cloned_tracks_and_halts_once() {
        let halts = Arc::new(AtomicUsize::new(0));
        let (_tx, rx) = futures::channel::mpsc::channel(1);
        let track = MediaTrack::new("Test Camera", settings());
        let observer = track.clone();
        let mut stream = MediaStream::new(
            vec![track],
            rx,
            Some(Box::new(CountingControl(halts.clone()))),
        );

        assert!(stream.is_active());
        stream.stop();
        stream.stop();
        drop(stream);

        assert_eq!(observer.ready_state(), TrackState::Ended);
        assert_eq!(halts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_frames_can_only_be_taken_once() {
        let (_tx, rx) = futures::channel::mpsc::channel(1);
        let mut stream = MediaStream::new(vec![MediaTrack::new("cam", settings())], rx, None);
        assert!(stream.take_frames().is_some());
        assert!(stream.take_frames().is_none());
    }
}
