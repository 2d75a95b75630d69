// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the capture session manager

use retrocam::backends::camera::{
    BackendResult, CameraBackendType, CameraFrame, CaptureSessionManager, Constraints, FacingMode,
    FrameSender, MediaDeviceInfo, MediaDevices, MediaStream, MediaTrack, PermissionState,
    PreviewSurface, StartReport, TrackSettings, TrackState,
};
use retrocam::errors::{AcquireError, AcquireErrorKind, PlaybackError};
use std::sync::{Arc, Mutex};

/// Records every track it hands out and how many were still live when the
/// next acquisition began
#[derive(Default, Clone)]
struct Probe {
    issued: Arc<Mutex<Vec<MediaTrack>>>,
    live_at_acquire: Arc<Mutex<Vec<usize>>>,
    fail_next: Arc<Mutex<Option<AcquireError>>>,
}

struct FakeCamera {
    probe: Probe,
    /// Queue one frame on every new stream
    send_frame: bool,
    /// Drop the producer side right away, as a source that died
    close_channel: bool,
    senders: Vec<FrameSender>,
}

impl FakeCamera {
    fn new(probe: &Probe) -> Self {
        Self {
            probe: probe.clone(),
            send_frame: true,
            close_channel: false,
            senders: Vec::new(),
        }
    }
}

impl MediaDevices for FakeCamera {
    fn backend_type(&self) -> CameraBackendType {
        CameraBackendType::Still
    }

    fn is_available(&self) -> bool {
        true
    }

    fn enumerate_devices(&self) -> BackendResult<Vec<MediaDeviceInfo>> {
        Err(AcquireError::unavailable("no device list"))
    }

    fn get_user_media(&mut self, constraints: &Constraints) -> BackendResult<MediaStream> {
        let live = self
            .probe
            .issued
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.is_live())
            .count();
        self.probe.live_at_acquire.lock().unwrap().push(live);

        if let Some(err) = self.probe.fail_next.lock().unwrap().take() {
            return Err(err);
        }

        let track = MediaTrack::new(
            "Fake Camera",
            TrackSettings {
                width: constraints.ideal_width.unwrap_or(4),
                height: constraints.ideal_height.unwrap_or(4),
                frame_rate: None,
                facing_mode: constraints.facing_mode,
                device_id: "fake:0".to_string(),
            },
        );
        self.probe.issued.lock().unwrap().push(track.clone());

        let (mut sender, receiver) = futures::channel::mpsc::channel(2);
        if self.send_frame {
            sender
                .try_send(CameraFrame::from_rgba(1, 1, vec![10, 20, 30, 255]))
                .unwrap();
        }
        if !self.close_channel {
            self.senders.push(sender);
        }
        Ok(MediaStream::new(vec![track], receiver, None))
    }
}

fn constraints() -> Constraints {
    Constraints::new(FacingMode::User, 320, 240)
}

#[test]
fn test_start_stops_previous_session_first() {
    let probe = Probe::default();
    let mut manager = CaptureSessionManager::new(Box::new(FakeCamera::new(&probe)));
    let mut surface = PreviewSurface::new();

    for _ in 0..3 {
        let report = manager.start(&constraints(), &mut surface);
        assert!(matches!(
            report,
            StartReport::Started {
                playback: Ok(()),
                ..
            }
        ));
    }

    // No acquisition ever saw a live track from an earlier session
    assert_eq!(*probe.live_at_acquire.lock().unwrap(), vec![0, 0, 0]);

    let issued = probe.issued.lock().unwrap();
    assert_eq!(issued.len(), 3);
    assert!(!issued[0].is_live());
    assert!(!issued[1].is_live());
    assert!(issued[2].is_live());
    assert_eq!(surface.source(), manager.session().map(MediaStream::id));
}

#[test]
fn test_start_reports_tracks_and_grants_permission() {
    let probe = Probe::default();
    let mut manager = CaptureSessionManager::new(Box::new(FakeCamera::new(&probe)));
    let mut surface = PreviewSurface::new();
    assert_eq!(manager.permission(), &PermissionState::Unknown);

    match manager.start(&constraints(), &mut surface) {
        StartReport::Started { tracks, playback } => {
            assert_eq!(tracks.len(), 1);
            assert_eq!(tracks[0].label, "Fake Camera");
            assert_eq!(tracks[0].state, TrackState::Live);
            assert_eq!((tracks[0].width, tracks[0].height), (320, 240));
            assert_eq!(tracks[0].to_string(), "Fake Camera [live] 320x240");
            assert_eq!(playback, Ok(()));
        }
        other => panic!("unexpected report {:?}", other),
    }
    assert_eq!(manager.permission(), &PermissionState::Granted);
    assert!(surface.is_playing());
    assert!(surface.current_frame().is_some());
}

#[test]
fn test_failed_restart_ends_old_session_and_denies() {
    let probe = Probe::default();
    let mut manager = CaptureSessionManager::new(Box::new(FakeCamera::new(&probe)));
    let mut surface = PreviewSurface::new();
    let _ = manager.start(&constraints(), &mut surface);
    assert!(manager.is_active());

    *probe.fail_next.lock().unwrap() = Some(AcquireError::not_found("no camera"));
    match manager.start(&constraints(), &mut surface) {
        StartReport::Failed(err) => assert_eq!(err.kind, AcquireErrorKind::NotFound),
        other => panic!("unexpected report {:?}", other),
    }

    // The old session was torn down before the failing request
    assert_eq!(*probe.live_at_acquire.lock().unwrap(), vec![0, 0]);
    assert!(!probe.issued.lock().unwrap()[0].is_live());
    assert!(manager.session().is_none());
    assert!(surface.source().is_none());
    assert!(matches!(
        manager.permission(),
        PermissionState::Denied {
            kind: AcquireErrorKind::NotFound,
            ..
        }
    ));

    // Retrying recovers
    let report = manager.start(&constraints(), &mut surface);
    assert!(matches!(report, StartReport::Started { .. }));
    assert!(manager.permission().is_granted());
}

#[test]
fn test_stop_is_idempotent() {
    let probe = Probe::default();
    let mut manager = CaptureSessionManager::new(Box::new(FakeCamera::new(&probe)));
    let mut surface = PreviewSurface::new();

    assert!(!manager.stop(&mut surface));
    let _ = manager.start(&constraints(), &mut surface);
    assert!(manager.stop(&mut surface));
    assert!(!manager.stop(&mut surface));
    assert!(surface.source().is_none());
    assert!(!surface.is_playing());
    assert!(probe.issued.lock().unwrap().iter().all(|t| !t.is_live()));
}

#[test]
fn test_dead_source_fails_playback_but_keeps_session() {
    let probe = Probe::default();
    let mut camera = FakeCamera::new(&probe);
    camera.send_frame = false;
    camera.close_channel = true;
    let mut manager = CaptureSessionManager::new(Box::new(camera));
    let mut surface = PreviewSurface::new();

    match manager.start(&constraints(), &mut surface) {
        StartReport::Started { playback, .. } => {
            assert_eq!(playback, Err(PlaybackError::SourceEnded));
        }
        other => panic!("unexpected report {:?}", other),
    }
    assert!(manager.permission().is_granted());
    assert!(!surface.is_playing());

    // Tap-to-play retries on the same binding
    let source = surface.source();
    assert_eq!(
        manager.bind_and_play(&mut surface),
        Err(PlaybackError::SourceEnded)
    );
    assert_eq!(surface.source(), source);
}

#[test]
fn test_bind_without_session_fails() {
    let probe = Probe::default();
    let mut manager = CaptureSessionManager::new(Box::new(FakeCamera::new(&probe)));
    let mut surface = PreviewSurface::new();
    assert_eq!(
        manager.bind_and_play(&mut surface),
        Err(PlaybackError::NoSource)
    );
}

#[test]
fn test_enumerate_failure_is_empty() {
    let probe = Probe::default();
    let manager = CaptureSessionManager::new(Box::new(FakeCamera::new(&probe)));
    assert!(manager.enumerate().is_empty());
}

#[test]
fn test_drop_stops_session() {
    let probe = Probe::default();
    let mut manager = CaptureSessionManager::new(Box::new(FakeCamera::new(&probe)));
    let mut surface = PreviewSurface::new();
    let _ = manager.start(&constraints(), &mut surface);

    drop(manager);
    assert!(!probe.issued.lock().unwrap()[0].is_live());
}
