// SPDX-License-Identifier: GPL-3.0-only

//! Capture session lifecycle manager
//!
//! Owns at most one live [`MediaStream`]. Every start request tears the
//! previous session down before asking the backend for a new one, and no
//! failure is propagated as an error: outcomes are returned as reports the
//! component logs to its debug console.

use super::MediaDevices;
use super::stream::{MediaStream, TrackState};
use super::surface::PreviewSurface;
use super::types::*;
use crate::errors::{AcquireError, AcquireErrorKind, PlaybackError};
use tracing::{error, info, warn};

/// Camera permission as observed by the last start attempt
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PermissionState {
    /// No attempt has completed yet
    #[default]
    Unknown,
    Granted,
    /// Last attempt failed with this kind and message
    Denied {
        kind: AcquireErrorKind,
        message: String,
    },
}

impl PermissionState {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionState::Granted)
    }
}

/// Label, state and negotiated resolution of one track
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSummary {
    pub label: String,
    pub state: TrackState,
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Display for TrackSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}x{}",
            self.label, self.state, self.width, self.height
        )
    }
}

/// Result of a start request
#[derive(Debug, Clone, PartialEq)]
pub enum StartReport {
    /// Stream acquired and bound
    Started {
        tracks: Vec<TrackSummary>,
        /// Outcome of the playback request on the bound surface
        playback: Result<(), PlaybackError>,
    },
    /// Acquisition failed; permission is now denied
    Failed(AcquireError),
}

/// Capture session manager
pub struct CaptureSessionManager {
    devices: Box<dyn MediaDevices>,
    session: Option<MediaStream>,
    permission: PermissionState,
}

impl CaptureSessionManager {
    pub fn new(devices: Box<dyn MediaDevices>) -> Self {
        info!(backend = %devices.backend_type(), "Creating capture session manager");
        Self {
            devices,
            session: None,
            permission: PermissionState::Unknown,
        }
    }

    pub fn backend_type(&self) -> CameraBackendType {
        self.devices.backend_type()
    }

    pub fn permission(&self) -> &PermissionState {
        &self.permission
    }

    /// Currently held stream, if any
    pub fn session(&self) -> Option<&MediaStream> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.as_ref().is_some_and(MediaStream::is_active)
    }

    /// Request a new video-only session and bind it to `surface`
    ///
    /// Any existing session is stopped before the backend is asked for a
    /// new one, so two sessions never hold the device at once.
    pub fn start(
        &mut self,
        constraints: &Constraints,
        surface: &mut PreviewSurface,
    ) -> StartReport {
        self.stop(surface);

        info!(constraints = %constraints, "Requesting capture session");
        match self.devices.get_user_media(constraints) {
            Ok(stream) => {
                let tracks: Vec<TrackSummary> = stream
                    .tracks()
                    .iter()
                    .map(|track| TrackSummary {
                        label: track.label().to_string(),
                        state: track.ready_state(),
                        width: track.settings().width,
                        height: track.settings().height,
                    })
                    .collect();
                for track in &tracks {
                    info!(
                        label = %track.label,
                        state = %track.state,
                        width = track.width,
                        height = track.height,
                        "Track acquired"
                    );
                }

                self.permission = PermissionState::Granted;
                self.session = Some(stream);
                let playback = self.bind_and_play(surface);
                StartReport::Started { tracks, playback }
            }
            Err(err) => {
                error!(kind = err.kind.name(), message = %err.message, "Capture session failed");
                self.permission = PermissionState::Denied {
                    kind: err.kind,
                    message: err.message.clone(),
                };
                StartReport::Failed(err)
            }
        }
    }

    /// Halt every track of the current session and release it
    ///
    /// No-op without a session. Returns true if a session was stopped.
    pub fn stop(&mut self, surface: &mut PreviewSurface) -> bool {
        let Some(mut stream) = self.session.take() else {
            return false;
        };
        info!(stream = %stream.id(), "Stopping capture session");
        stream.stop();
        if surface.source() == Some(stream.id()) {
            surface.detach();
        }
        true
    }

    /// Best-effort device listing; failures are logged and yield an empty list
    pub fn enumerate(&self) -> Vec<MediaDeviceInfo> {
        match self.devices.enumerate_devices() {
            Ok(devices) => {
                info!(count = devices.len(), "Enumerated video inputs");
                devices
            }
            Err(err) => {
                warn!(error = %err, "Device enumeration failed");
                Vec::new()
            }
        }
    }

    /// Attach the current stream to `surface` and request playback
    ///
    /// Rebinding the same stream only retries playback, which is what the
    /// tap-to-play affordance does.
    pub fn bind_and_play(&mut self, surface: &mut PreviewSurface) -> Result<(), PlaybackError> {
        let Some(stream) = self.session.as_mut() else {
            warn!("No capture session to bind");
            return Err(PlaybackError::NoSource);
        };
        if !stream.is_active() {
            warn!(stream = %stream.id(), "Capture session has ended");
            return Err(PlaybackError::SourceEnded);
        }

        if surface.source() != Some(stream.id()) {
            surface.attach(stream.id(), stream.take_frames());
        }

        surface.play().inspect_err(|err| {
            warn!(error = %err, "Preview playback failed");
        })
    }
}

impl Drop for CaptureSessionManager {
    fn drop(&mut self) {
        if let Some(mut stream) = self.session.take() {
            stream.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::still::StillBackend;

    #[test]
    fn test_start_grants_permission_and_plays() {
        let mut surface = PreviewSurface::new();
        let mut manager = CaptureSessionManager::new(Box::new(StillBackend::new(None)));
        let report = manager.start(&Constraints::new(FacingMode::User, 64, 48), &mut surface);

        match report {
            StartReport::Started { tracks, playback } => {
                assert_eq!(tracks.len(), 1);
                assert_eq!((tracks[0].width, tracks[0].height), (64, 48));
                assert_eq!(playback, Ok(()));
            }
            StartReport::Failed(e) => panic!("unexpected failure: {}", e),
        }
        assert!(manager.permission().is_granted());
        assert!(surface.current_frame().is_some());
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut surface = PreviewSurface::new();
        let mut manager = CaptureSessionManager::new(Box::new(StillBackend::new(None)));
        assert!(!manager.stop(&mut surface));

        manager.start(&Constraints::default(), &mut surface);
        let track = manager.session().unwrap().tracks()[0].clone();
        assert!(manager.stop(&mut surface));
        assert!(!manager.stop(&mut surface));
        assert_eq!(track.ready_state(), TrackState::Ended);
        assert!(surface.source().is_none());
    }

    #[test]
    fn test_failure_denies_permission() {
        let mut surface = PreviewSurface::new();
        let backend = StillBackend::new(Some("/nonexistent/retrocam.jpg".into()));
        let mut manager = CaptureSessionManager::new(Box::new(backend));

        let report = manager.start(&Constraints::default(), &mut surface);
        assert!(matches!(report, StartReport::Failed(_)));
        assert!(matches!(
            manager.permission(),
            PermissionState::Denied {
                kind: AcquireErrorKind::NotFound,
                ..
            }
        ));
        assert!(manager.enumerate().is_empty());
    }
}
