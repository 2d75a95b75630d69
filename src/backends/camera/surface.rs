// SPDX-License-Identifier: GPL-3.0-only

//! Preview surface
//!
//! The rendering target a capture stream is bound to. It keeps the latest
//! frame so the shot pipeline can snapshot it and the front end can draw it.

use super::types::{CameraFrame, FrameReceiver};
use crate::constants::timing;
use crate::errors::PlaybackError;
use futures::channel::mpsc::TryRecvError;
use tracing::{debug, info};
use uuid::Uuid;

/// Display surface for the live preview
#[derive(Default)]
pub struct PreviewSurface {
    source: Option<Uuid>,
    frames: Option<FrameReceiver>,
    current: Option<CameraFrame>,
    playing: bool,
    ended: bool,
    frame_count: u64,
}

impl PreviewSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a stream's frame channel, replacing any previous source
    ///
    /// `frames` is `None` when the stream's channel was already handed to
    /// another surface; playback then fails with [`PlaybackError::NoFrames`].
    pub fn attach(&mut self, stream_id: Uuid, frames: Option<FrameReceiver>) {
        debug!(%stream_id, has_frames = frames.is_some(), "Attaching stream to surface");
        self.source = Some(stream_id);
        self.frames = frames;
        self.current = None;
        self.playing = false;
        self.ended = false;
        self.frame_count = 0;
    }

    /// Drop the attached source and the last frame
    pub fn detach(&mut self) {
        if let Some(stream_id) = self.source.take() {
            debug!(%stream_id, "Detaching stream from surface");
        }
        self.frames = None;
        self.current = None;
        self.playing = false;
        self.ended = false;
    }

    /// Start rendering the attached source
    pub fn play(&mut self) -> Result<(), PlaybackError> {
        if self.source.is_none() {
            return Err(PlaybackError::NoSource);
        }
        if self.frames.is_none() {
            return Err(PlaybackError::NoFrames);
        }
        self.playing = true;
        self.poll();
        if self.ended {
            return Err(PlaybackError::SourceEnded);
        }
        info!("Preview playing");
        Ok(())
    }

    /// Drain pending frames, keeping the newest. Returns true if a new frame
    /// arrived.
    ///
    /// A closed channel stops playback and discards the last frame, so a dead
    /// source never serves a frozen picture.
    pub fn poll(&mut self) -> bool {
        if !self.playing {
            return false;
        }
        let Some(frames) = self.frames.as_mut() else {
            return false;
        };

        let mut updated = false;
        loop {
            match frames.try_recv() {
                Ok(frame) => {
                    self.current = Some(frame);
                    self.frame_count += 1;
                    updated = true;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Closed) => {
                    if !self.ended {
                        debug!(frames = self.frame_count, "Preview source closed");
                    }
                    self.ended = true;
                    self.playing = false;
                    self.current = None;
                    return false;
                }
            }
        }

        if updated && self.frame_count % timing::FRAME_LOG_INTERVAL == 0 {
            debug!(frames = self.frame_count, "Preview frames received");
        }
        updated
    }

    /// Latest frame, if the surface is playing and one has arrived
    pub fn current_frame(&self) -> Option<&CameraFrame> {
        if self.playing {
            self.current.as_ref()
        } else {
            None
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// True once the source's channel closed
    pub fn has_ended(&self) -> bool {
        self.ended
    }

    pub fn source(&self) -> Option<Uuid> {
        self.source
    }

    /// Frames received since the source was attached
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::mpsc;

    fn frame() -> CameraFrame {
        CameraFrame::from_rgba(1, 1, vec![1, 2, 3, 255])
    }

    #[test]
    fn test_play_without_source_fails() {
        let mut surface = PreviewSurface::new();
        assert_eq!(surface.play(), Err(PlaybackError::NoSource));
    }

    #[test]
    fn test_play_without_frames_fails() {
        let mut surface = PreviewSurface::new();
        surface.attach(Uuid::new_v4(), None);
        assert_eq!(surface.play(), Err(PlaybackError::NoFrames));
        assert!(!surface.is_playing());
    }

    #[test]
    fn test_poll_keeps_newest_frame() {
        let (mut tx, rx) = mpsc::channel(4);
        let mut surface = PreviewSurface::new();
        surface.attach(Uuid::new_v4(), Some(rx));
        tx.try_send(frame()).unwrap();
        tx.try_send(CameraFrame::from_rgba(1, 1, vec![9, 9, 9, 255])).unwrap();

        surface.play().unwrap();
        assert_eq!(surface.current_frame().unwrap().pixel_rgb(0, 0), (9, 9, 9));
        assert_eq!(surface.frame_count(), 2);
    }

    #[test]
    fn test_closed_source_without_frames_is_ended() {
        let (tx, rx) = mpsc::channel::<CameraFrame>(1);
        drop(tx);
        let mut surface = PreviewSurface::new();
        surface.attach(Uuid::new_v4(), Some(rx));
        assert_eq!(surface.play(), Err(PlaybackError::SourceEnded));
        assert!(surface.has_ended());
    }

    #[test]
    fn test_source_closing_mid_stream_drops_frame() {
        let (mut tx, rx) = mpsc::channel(4);
        let mut surface = PreviewSurface::new();
        surface.attach(Uuid::new_v4(), Some(rx));
        tx.try_send(frame()).unwrap();
        surface.play().unwrap();
        assert!(surface.current_frame().is_some());

        drop(tx);
        assert!(!surface.poll());
        assert!(surface.has_ended());
        assert!(!surface.is_playing());
        assert!(surface.current_frame().is_none());

        // Retrying on the dead channel keeps failing
        assert_eq!(surface.play(), Err(PlaybackError::SourceEnded));
        assert!(surface.current_frame().is_none());
    }
}
