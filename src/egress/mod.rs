// SPDX-License-Identifier: GPL-3.0-only

//! Getting photos out of the camera
//!
//! Export probes the share surface first and dispatches on the result: share
//! when files can be shared, download otherwise. A cancelled or failed share
//! falls back to download. Upload is a separate route that returns a link
//! and a QR code for it.
//!
//! Nothing here touches the film roll; every route works on a clone of an
//! already developed [`Photo`].

pub mod qr;
pub mod share;
pub mod upload;

pub use qr::QrImage;
pub use share::{NoShareSheet, ShareOutcome, ShareRequest, ShareSheet, SystemShareSheet};
pub use upload::{ImageHost, RollUpload};

use crate::constants::encoding;
use crate::errors::EgressError;
use crate::film::Photo;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Delivery route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EgressRoute {
    Share,
    Download,
}

/// Routes to try, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EgressPlan {
    pub primary: EgressRoute,
    pub fallback: Option<EgressRoute>,
}

impl EgressPlan {
    /// Probe the share surface
    pub fn probe(sheet: &dyn ShareSheet) -> Self {
        if sheet.can_share_files() {
            Self {
                primary: EgressRoute::Share,
                fallback: Some(EgressRoute::Download),
            }
        } else {
            Self {
                primary: EgressRoute::Download,
                fallback: None,
            }
        }
    }
}

/// How an export ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Shared,
    /// Written to disk (directly or after the share fell through)
    Downloaded(PathBuf),
}

/// Successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub photo_id: u64,
    pub url: String,
    pub qr: QrImage,
}

/// Build the share request for a photo
pub fn share_request(photo: &Photo) -> ShareRequest {
    let (title, text) = photo.share_text();
    ShareRequest {
        title,
        text,
        file_name: photo.file_name(),
        mime_type: encoding::MIME_TYPE,
        data: Arc::clone(photo.jpeg()),
    }
}

/// Export a photo: share if possible, otherwise download
pub async fn export(
    photo: Photo,
    sheet: Arc<dyn ShareSheet>,
    download_dir: PathBuf,
) -> Result<ExportOutcome, EgressError> {
    let plan = EgressPlan::probe(sheet.as_ref());
    info!(id = photo.id(), ?plan, "Exporting photo");

    if plan.primary == EgressRoute::Share {
        let request = share_request(&photo);
        let shared = tokio::task::spawn_blocking(move || sheet.share(&request))
            .await
            .map_err(|e| EgressError::ShareFailed(e.to_string()))
            .and_then(|r| r);
        match shared {
            Ok(ShareOutcome::Shared) => return Ok(ExportOutcome::Shared),
            Ok(ShareOutcome::Cancelled) => {
                info!(id = photo.id(), "Share cancelled, downloading instead");
            }
            Err(e) => {
                warn!(id = photo.id(), error = %e, "Share failed, downloading instead");
            }
        }
    }

    download(&photo, download_dir)
        .await
        .map(ExportOutcome::Downloaded)
}

/// Write the photo's JPEG into `dir` as `retrocam-<id>.jpg`
pub async fn download(photo: &Photo, dir: PathBuf) -> Result<PathBuf, EgressError> {
    crate::storage::save_bytes(dir, photo.file_name(), photo.jpeg().to_vec())
        .await
        .map_err(|e| {
            warn!(id = photo.id(), error = %e, "Download failed");
            EgressError::from(e)
        })
}

/// Upload a photo and encode its link as a QR code
pub async fn upload(photo: Photo, host: ImageHost) -> Result<UploadOutcome, EgressError> {
    let url = host.upload(&photo).await?;
    let qr = QrImage::encode(&url)?;
    Ok(UploadOutcome {
        photo_id: photo.id(),
        url,
        qr,
    })
}
