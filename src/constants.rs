// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Film roll constants
pub mod film {
    /// Exposures on a fresh roll
    pub const INITIAL_BUDGET: u32 = 24;
}

/// Shot pipeline timing
pub mod timing {
    use super::Duration;

    /// Simulated mechanical delay between shutter press and frame snapshot
    pub const DEVELOP_DELAY: Duration = Duration::from_millis(600);

    /// Shutter-release visual pulse
    pub const SHUTTER_PULSE: Duration = Duration::from_millis(150);

    /// Full-surface flash pulse
    pub const FLASH_PULSE: Duration = Duration::from_millis(120);

    /// How often the host should deliver a tick while anything is pending
    pub const TICK_INTERVAL: Duration = Duration::from_millis(16);

    /// GStreamer pipeline state change timeout on start
    pub const START_TIMEOUT_SECS: u64 = 5;

    /// GStreamer pipeline state change timeout on stop
    pub const STOP_TIMEOUT_SECS: u64 = 2;

    /// Frame counter modulo for periodic logging
    pub const FRAME_LOG_INTERVAL: u64 = 90;
}

/// Debug console constants
pub mod debug {
    use super::Duration;

    /// Taps needed to toggle the debug console
    pub const TAP_THRESHOLD: u32 = 5;

    /// Reset window, restarted on every tap
    pub const TAP_WINDOW: Duration = Duration::from_millis(1000);

    /// Maximum lines kept in the debug log
    pub const LOG_CAPACITY: usize = 50;
}

/// Viewport of the simulated device screen
pub mod viewport {
    /// Logical screen width in pixels
    pub const WIDTH: u32 = 240;

    /// Logical screen height in pixels
    pub const HEIGHT: u32 = 300;
}

/// Capture constraint defaults
pub mod capture {
    /// Ideal capture width hint
    pub const IDEAL_WIDTH: u32 = 1280;

    /// Ideal capture height hint
    pub const IDEAL_HEIGHT: u32 = 720;

    /// Frame channel depth (old frames are dropped when full)
    pub const FRAME_CHANNEL_DEPTH: usize = 4;

    /// Frame interval for still sources (~30fps)
    pub const STILL_FRAME_INTERVAL: std::time::Duration = std::time::Duration::from_millis(33);

    /// Test pattern dimensions when no still image is configured
    pub const TEST_PATTERN_WIDTH: u32 = 640;
    pub const TEST_PATTERN_HEIGHT: u32 = 480;
}

/// Encoding defaults
pub mod encoding {
    /// Default JPEG quality (0-100)
    pub const DEFAULT_JPEG_QUALITY: u8 = 92;

    /// MIME type of encoded stills
    pub const MIME_TYPE: &str = "image/jpeg";

    /// File name prefix for exported photos
    pub const FILE_PREFIX: &str = "retrocam";
}

/// Remote upload constants
pub mod upload {
    use super::Duration;

    /// Default image host endpoint
    pub const DEFAULT_ENDPOINT: &str = "https://api.imgbb.com/1/upload";

    /// Environment variable overriding the configured API key
    pub const API_KEY_ENV: &str = "RETROCAM_UPLOAD_KEY";

    /// Pause between sequential uploads of a roll
    pub const STEP_DELAY: Duration = Duration::from_millis(800);

    /// Request timeout
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
}

/// Application information utilities
pub mod app_info {
    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }
}

/// Resolution labels for the status line
pub fn get_resolution_label(width: u32) -> Option<&'static str> {
    match width {
        w if w >= 3840 => Some("4K"),
        w if w >= 2560 => Some("2K"),
        w if w >= 1920 => Some("FHD"),
        w if w >= 1280 => Some("HD"),
        w if w >= 640 => Some("SD"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_labels() {
        assert_eq!(get_resolution_label(3840), Some("4K"));
        assert_eq!(get_resolution_label(1280), Some("HD"));
        assert_eq!(get_resolution_label(640), Some("SD"));
        assert_eq!(get_resolution_label(320), None);
    }

    #[test]
    fn test_pulses_shorter_than_develop_delay() {
        assert!(timing::SHUTTER_PULSE < timing::DEVELOP_DELAY);
        assert!(timing::FLASH_PULSE < timing::DEVELOP_DELAY);
    }
}
