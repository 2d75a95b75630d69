// SPDX-License-Identifier: GPL-3.0-only

//! Share surface
//!
//! Desktop Linux has no share sheet, so the system implementation hands the
//! photo to the default image handler, from where the user can send it on.

use crate::errors::EgressError;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// A file offered to the share surface
#[derive(Debug, Clone)]
pub struct ShareRequest {
    pub title: String,
    pub text: String,
    pub file_name: String,
    pub mime_type: &'static str,
    pub data: Arc<[u8]>,
}

/// How a share attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    /// The user dismissed the share surface; not an error
    Cancelled,
}

/// Capability to hand files to other applications
pub trait ShareSheet: Send + Sync {
    /// Whether files can be shared right now
    fn can_share_files(&self) -> bool;

    /// Offer a file. Blocks until the surface is dismissed or handed off.
    fn share(&self, request: &ShareRequest) -> Result<ShareOutcome, EgressError>;
}

/// Opens the photo with the desktop's default handler
#[derive(Debug, Clone)]
pub struct SystemShareSheet {
    staging_dir: PathBuf,
}

impl SystemShareSheet {
    pub fn new() -> Self {
        Self {
            staging_dir: std::env::temp_dir().join("retrocam-share"),
        }
    }
}

impl Default for SystemShareSheet {
    fn default() -> Self {
        Self::new()
    }
}

impl ShareSheet for SystemShareSheet {
    fn can_share_files(&self) -> bool {
        ["WAYLAND_DISPLAY", "DISPLAY"]
            .iter()
            .any(|var| std::env::var_os(var).is_some_and(|v| !v.is_empty()))
    }

    fn share(&self, request: &ShareRequest) -> Result<ShareOutcome, EgressError> {
        std::fs::create_dir_all(&self.staging_dir)
            .map_err(|e| EgressError::ShareFailed(e.to_string()))?;
        let path = self.staging_dir.join(&request.file_name);
        std::fs::write(&path, &request.data)
            .map_err(|e| EgressError::ShareFailed(e.to_string()))?;
        debug!(path = %path.display(), title = %request.title, "Staged photo for sharing");

        open::that_detached(&path).map_err(|e| EgressError::ShareFailed(e.to_string()))?;
        info!(path = %path.display(), "Handed photo to default viewer");
        Ok(ShareOutcome::Shared)
    }
}

/// Share surface that is never available (headless hosts)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoShareSheet;

impl ShareSheet for NoShareSheet {
    fn can_share_files(&self) -> bool {
        false
    }

    fn share(&self, _request: &ShareRequest) -> Result<ShareOutcome, EgressError> {
        Err(EgressError::ShareFailed("no share surface".to_string()))
    }
}
