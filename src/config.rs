// SPDX-License-Identifier: GPL-3.0-only

//! User configuration
//!
//! Stored as JSON at `$XDG_CONFIG_HOME/retrocam/config.json`. Every field
//! has a default, so a partial file is valid.

use crate::backends::camera::{CameraBackendType, Constraints, FacingMode};
use crate::constants::{capture, encoding, upload};
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Image host settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Multipart upload endpoint
    pub endpoint: String,
    /// API key; the `RETROCAM_UPLOAD_KEY` environment variable wins over it
    pub api_key: Option<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            endpoint: upload::DEFAULT_ENDPOINT.to_string(),
            api_key: None,
        }
    }
}

impl UploadConfig {
    /// Effective API key, if any
    pub fn resolved_api_key(&self) -> Option<String> {
        std::env::var(upload::API_KEY_ENV)
            .ok()
            .or_else(|| self.api_key.clone())
            .filter(|key| !key.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Camera backend (gstreamer or still)
    pub backend: CameraBackendType,
    /// Preferred camera facing
    pub facing_mode: FacingMode,
    /// Ideal capture resolution hint
    pub ideal_width: u32,
    pub ideal_height: u32,
    /// Image streamed by the still backend; a test pattern when unset
    pub still_source: Option<PathBuf>,
    /// Mirror the preview horizontally (selfie mode)
    pub mirror_preview: bool,
    /// Flash toggle state at startup
    pub flash_enabled: bool,
    /// JPEG quality for developed photos (1-100)
    pub jpeg_quality: u8,
    /// Where downloads are written; `~/Pictures/RetroCam` when unset
    pub output_dir: Option<PathBuf>,
    pub upload: UploadConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: CameraBackendType::default(),
            facing_mode: FacingMode::default(),
            ideal_width: capture::IDEAL_WIDTH,
            ideal_height: capture::IDEAL_HEIGHT,
            still_source: None,
            mirror_preview: false,
            flash_enabled: false,
            jpeg_quality: encoding::DEFAULT_JPEG_QUALITY,
            output_dir: None,
            upload: UploadConfig::default(),
        }
    }
}

impl Config {
    /// Default location of the config file
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("retrocam").join("config.json"))
    }

    /// Load from the default location, falling back to defaults
    ///
    /// A missing file is normal; an unreadable or invalid one is logged.
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            debug!("No config directory, using defaults");
            return Self::default();
        };
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => {
                info!(path = %path.display(), "Loaded config");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring config file");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Write pretty JSON, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        debug!(path = %path.display(), "Saved config");
        Ok(())
    }

    /// Capture constraints for a start request
    pub fn constraints(&self) -> Constraints {
        Constraints::new(self.facing_mode, self.ideal_width, self.ideal_height)
    }

    /// Download directory
    pub fn photo_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(default_photo_dir)
    }
}

/// `~/Pictures/RetroCam`, or `./RetroCam` without a home directory
pub fn default_photo_dir() -> PathBuf {
    dirs::picture_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Pictures")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("RetroCam")
}
