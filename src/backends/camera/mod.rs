// SPDX-License-Identifier: MPL-2.0

//! Camera backend abstraction
//!
//! ```text
//! ┌──────────────────────────┐
//! │  CameraApp (component)   │
//! └────────────┬─────────────┘
//!              │
//!              ▼
//! ┌──────────────────────────┐     ┌────────────────┐
//! │ CaptureSessionManager    │ ──▶ │ PreviewSurface │  ← latest frame
//! └────────────┬─────────────┘     └────────────────┘
//!              │
//!              ▼
//! ┌──────────────────────────┐
//! │  MediaDevices trait      │  ← acquire / enumerate
//! └──────┬─────────────┬─────┘
//!        ▼             ▼
//!   ┌─────────┐   ┌─────────┐
//!   │GStreamer│   │  Still  │
//!   └─────────┘   └─────────┘
//! ```

#[cfg(feature = "gstreamer")]
pub mod gstreamer;
pub mod session;
pub mod still;
pub mod stream;
pub mod surface;
pub mod types;
#[cfg(feature = "v4l")]
pub mod v4l2_utils;

pub use session::{CaptureSessionManager, PermissionState, StartReport, TrackSummary};
pub use stream::{MediaStream, MediaTrack, StreamControl, TrackSettings, TrackState};
pub use surface::PreviewSurface;
pub use types::*;

use crate::errors::AcquireError;
use std::path::PathBuf;

/// Media-capture interface implemented by every backend
///
/// Mirrors the two calls a camera component needs from its platform:
/// acquiring a video-only stream under constraints, and listing devices.
pub trait MediaDevices: Send {
    /// Backend type identifier
    fn backend_type(&self) -> CameraBackendType;

    /// Check whether this backend can work on the current system
    fn is_available(&self) -> bool;

    /// List available video inputs
    fn enumerate_devices(&self) -> BackendResult<Vec<MediaDeviceInfo>>;

    /// Acquire a live video stream matching the constraints
    fn get_user_media(&mut self, constraints: &Constraints) -> BackendResult<MediaStream>;
}

/// Get a backend instance for the given type
///
/// `still_source` is only used by the still backend; `None` selects the
/// generated test pattern.
pub fn get_backend(
    backend_type: CameraBackendType,
    still_source: Option<PathBuf>,
) -> Box<dyn MediaDevices> {
    match backend_type {
        CameraBackendType::Still => Box::new(still::StillBackend::new(still_source)),
        #[cfg(feature = "gstreamer")]
        CameraBackendType::GStreamer => Box::new(gstreamer::GStreamerBackend::new()),
        #[cfg(not(feature = "gstreamer"))]
        CameraBackendType::GStreamer => Box::new(UnavailableBackend),
    }
}

/// Stand-in used when the crate is built without GStreamer support
#[cfg(not(feature = "gstreamer"))]
struct UnavailableBackend;

#[cfg(not(feature = "gstreamer"))]
impl MediaDevices for UnavailableBackend {
    fn backend_type(&self) -> CameraBackendType {
        CameraBackendType::GStreamer
    }

    fn is_available(&self) -> bool {
        false
    }

    fn enumerate_devices(&self) -> BackendResult<Vec<MediaDeviceInfo>> {
        Err(AcquireError::unavailable("built without GStreamer support"))
    }

    fn get_user_media(&mut self, _constraints: &Constraints) -> BackendResult<MediaStream> {
        Err(AcquireError::unavailable("built without GStreamer support"))
    }
}

/// Map an I/O error from opening a device or file onto an acquisition failure
pub(crate) fn acquire_error_from_io(err: &std::io::Error, what: &str) -> AcquireError {
    match err.kind() {
        std::io::ErrorKind::PermissionDenied => {
            AcquireError::not_allowed(format!("{}: {}", what, err))
        }
        std::io::ErrorKind::NotFound => AcquireError::not_found(format!("{}: {}", what, err)),
        _ => AcquireError::not_readable(format!("{}: {}", what, err)),
    }
}
