// SPDX-License-Identifier: MPL-2.0

//! Error types for the camera component
//!
//! No error here is fatal to the component: acquisition failures revert to
//! the "not permitted" screen, playback failures offer tap-to-play, and
//! egress failures fall back or become a dismissible notice.

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Camera acquisition errors
    Acquire(AcquireError),
    /// Preview playback errors
    Playback(PlaybackError),
    /// Share/download/upload errors
    Egress(EgressError),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
    /// Generic error with message
    Other(String),
}

/// Failure kinds of a capture session request
///
/// Mirrors the platform taxonomy so the debug console can report the same
/// kind names a browser would.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireErrorKind {
    /// User or system denied camera access
    NotAllowed,
    /// No device matches the constraints
    NotFound,
    /// Device exists but could not be opened (busy, hardware error)
    NotReadable,
    /// Constraints cannot be satisfied by any device
    Overconstrained,
    /// Capture API not available on this system
    Unavailable,
}

impl AcquireErrorKind {
    /// Platform-style error name
    pub fn name(&self) -> &'static str {
        match self {
            AcquireErrorKind::NotAllowed => "NotAllowedError",
            AcquireErrorKind::NotFound => "NotFoundError",
            AcquireErrorKind::NotReadable => "NotReadableError",
            AcquireErrorKind::Overconstrained => "OverconstrainedError",
            AcquireErrorKind::Unavailable => "NotSupportedError",
        }
    }
}

/// Camera acquisition failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquireError {
    pub kind: AcquireErrorKind,
    pub message: String,
}

impl AcquireError {
    pub fn new(kind: AcquireErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_allowed(message: impl Into<String>) -> Self {
        Self::new(AcquireErrorKind::NotAllowed, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(AcquireErrorKind::NotFound, message)
    }

    pub fn not_readable(message: impl Into<String>) -> Self {
        Self::new(AcquireErrorKind::NotReadable, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(AcquireErrorKind::Unavailable, message)
    }
}

/// Preview playback errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// No stream attached to the surface
    NoSource,
    /// Every track of the attached stream has ended
    SourceEnded,
    /// The stream delivers no frames (channel already taken or closed)
    NoFrames,
}

/// Configuration file errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Reading or writing the file failed
    Io(String),
    /// File contents are not valid configuration JSON
    Parse(String),
}

/// Egress errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EgressError {
    /// Photo id not present in the current roll
    PhotoNotFound(u64),
    /// Share surface failed (not a user cancellation)
    ShareFailed(String),
    /// Writing the file failed
    DownloadFailed(String),
    /// Upload not configured (no API key)
    UploadNotConfigured,
    /// Image host rejected the upload or was unreachable
    UploadFailed(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Acquire(e) => write!(f, "Camera error: {}", e),
            AppError::Playback(e) => write!(f, "Playback error: {}", e),
            AppError::Egress(e) => write!(f, "Export error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for AcquireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.name(), self.message)
    }
}

impl fmt::Display for PlaybackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackError::NoSource => write!(f, "No stream attached"),
            PlaybackError::SourceEnded => write!(f, "Stream has ended"),
            PlaybackError::NoFrames => write!(f, "Stream delivers no frames"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "I/O error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl fmt::Display for EgressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EgressError::PhotoNotFound(id) => write!(f, "Photo {} is not on this roll", id),
            EgressError::ShareFailed(msg) => write!(f, "Share failed: {}", msg),
            EgressError::DownloadFailed(msg) => write!(f, "Download failed: {}", msg),
            EgressError::UploadNotConfigured => write!(f, "Upload needs an API key"),
            EgressError::UploadFailed(msg) => write!(f, "Upload failed: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for AcquireError {}
impl std::error::Error for PlaybackError {}
impl std::error::Error for EgressError {}
impl std::error::Error for ConfigError {}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

impl From<AcquireError> for AppError {
    fn from(err: AcquireError) -> Self {
        AppError::Acquire(err)
    }
}

impl From<PlaybackError> for AppError {
    fn from(err: PlaybackError) -> Self {
        AppError::Playback(err)
    }
}

impl From<EgressError> for AppError {
    fn from(err: EgressError) -> Self {
        AppError::Egress(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::Other(format!("Image error: {}", err))
    }
}

impl From<std::io::Error> for EgressError {
    fn from(err: std::io::Error) -> Self {
        EgressError::DownloadFailed(err.to_string())
    }
}

impl From<reqwest::Error> for EgressError {
    fn from(err: reqwest::Error) -> Self {
        EgressError::UploadFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_error_display_uses_platform_name() {
        let err = AcquireError::not_allowed("Permission denied");
        assert_eq!(err.to_string(), "NotAllowedError: Permission denied");
    }

    #[test]
    fn test_io_error_becomes_storage_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: AppError = io.into();
        assert!(matches!(err, AppError::Storage(_)));
    }
}
