// SPDX-License-Identifier: GPL-3.0-only

//! Film and gallery handlers
//!
//! Egress runs as tasks on a clone of the photo; results come back as
//! messages that only touch notices, the QR overlay and the debug log.

use crate::app::state::{CameraApp, Message, Notice, Screen};
use crate::app::task::Task;
use crate::constants::upload;
use crate::egress::{self, ExportOutcome, ImageHost, RollUpload, UploadOutcome};
use crate::errors::EgressError;
use crate::film::Photo;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

impl CameraApp {
    pub(crate) fn handle_reload_film(&mut self) -> Task<Message> {
        if !self.film.is_used() {
            return Task::none();
        }
        self.film.reload();
        self.gallery_index = 0;
        self.qr = None;
        self.screen = Screen::Viewfinder;
        self.debug_log
            .push(format!("Film reloaded ({} exposures)", self.film.remaining()));
        Task::none()
    }

    pub(crate) fn handle_open_gallery(&mut self) -> Task<Message> {
        self.screen = Screen::Gallery;
        self.gallery_index = 0;
        Task::none()
    }

    pub(crate) fn handle_close_gallery(&mut self) -> Task<Message> {
        self.screen = Screen::Viewfinder;
        self.qr = None;
        Task::none()
    }

    pub(crate) fn handle_gallery_step(&mut self, delta: i32) -> Task<Message> {
        let count = self.film.photos().len();
        if count == 0 {
            return Task::none();
        }
        let index = self.gallery_index as i64 + delta as i64;
        self.gallery_index = index.clamp(0, count as i64 - 1) as usize;
        Task::none()
    }

    fn photo_for_egress(&mut self, id: u64) -> Option<Photo> {
        let photo = self.film.photo(id).cloned();
        if photo.is_none() {
            let err = EgressError::PhotoNotFound(id);
            warn!(error = %err, "Egress requested for unknown photo");
            self.notice = Some(Notice::Error(err.to_string()));
        }
        photo
    }

    pub(crate) fn handle_export_photo(&mut self, id: u64) -> Task<Message> {
        let Some(photo) = self.photo_for_egress(id) else {
            return Task::none();
        };
        self.egress_in_flight += 1;
        let sheet = Arc::clone(&self.share_sheet);
        let dir = self.config.photo_dir();
        Task::perform(egress::export(photo, sheet, dir), move |result| {
            Message::ExportFinished(id, result)
        })
    }

    pub(crate) fn handle_download_photo(&mut self, id: u64) -> Task<Message> {
        let Some(photo) = self.photo_for_egress(id) else {
            return Task::none();
        };
        self.egress_in_flight += 1;
        let dir = self.config.photo_dir();
        Task::perform(
            async move { egress::download(&photo, dir).await },
            move |result| Message::DownloadFinished(id, result),
        )
    }

    fn image_host(&mut self) -> Option<ImageHost> {
        match ImageHost::new(&self.config.upload) {
            Ok(host) => Some(host),
            Err(e) => {
                self.debug_log.push(format!("Upload unavailable: {}", e));
                self.notice = Some(Notice::Error(e.to_string()));
                None
            }
        }
    }

    pub(crate) fn handle_upload_photo(&mut self, id: u64) -> Task<Message> {
        let Some(photo) = self.photo_for_egress(id) else {
            return Task::none();
        };
        let Some(host) = self.image_host() else {
            return Task::none();
        };
        self.egress_in_flight += 1;
        self.debug_log.push(format!("Uploading {}", photo.file_name()));
        Task::perform(egress::upload(photo, host), move |result| {
            Message::UploadFinished(id, result)
        })
    }

    pub(crate) fn handle_upload_roll(&mut self) -> Task<Message> {
        if self.film.photos().is_empty() {
            return Task::none();
        }
        let Some(host) = self.image_host() else {
            return Task::none();
        };
        // Oldest first, the order they were shot
        let photos: Vec<Photo> = self.film.photos().iter().rev().cloned().collect();
        self.egress_in_flight += 1;
        self.debug_log
            .push(format!("Uploading roll ({} photos)", photos.len()));
        Task::perform(
            async move { host.upload_roll(&photos, upload::STEP_DELAY).await },
            Message::RollUploadFinished,
        )
    }

    fn egress_done(&mut self) {
        self.egress_in_flight = self.egress_in_flight.saturating_sub(1);
    }

    pub(crate) fn handle_export_finished(
        &mut self,
        id: u64,
        result: Result<ExportOutcome, EgressError>,
    ) -> Task<Message> {
        self.egress_done();
        match result {
            Ok(ExportOutcome::Shared) => {
                info!(id, "Photo shared");
                self.debug_log.push(format!("Shared photo {}", id));
            }
            Ok(ExportOutcome::Downloaded(path)) => self.report_saved(id, path),
            Err(e) => self.report_egress_error(id, e),
        }
        Task::none()
    }

    pub(crate) fn handle_download_finished(
        &mut self,
        id: u64,
        result: Result<PathBuf, EgressError>,
    ) -> Task<Message> {
        self.egress_done();
        match result {
            Ok(path) => self.report_saved(id, path),
            Err(e) => self.report_egress_error(id, e),
        }
        Task::none()
    }

    pub(crate) fn handle_upload_finished(
        &mut self,
        id: u64,
        result: Result<UploadOutcome, EgressError>,
    ) -> Task<Message> {
        self.egress_done();
        match result {
            Ok(outcome) => {
                self.debug_log.push(format!("Uploaded {}: {}", id, outcome.url));
                self.qr = Some(outcome);
            }
            Err(e) => self.report_egress_error(id, e),
        }
        Task::none()
    }

    pub(crate) fn handle_roll_upload_finished(
        &mut self,
        results: Vec<RollUpload>,
    ) -> Task<Message> {
        self.egress_done();
        let total = results.len();
        let mut uploaded = 0;
        for upload in results {
            match upload.result {
                Ok(url) => {
                    uploaded += 1;
                    self.debug_log
                        .push(format!("Uploaded {}: {}", upload.photo_id, url));
                }
                Err(e) => {
                    error!(id = upload.photo_id, error = %e, "Roll upload step failed");
                    self.debug_log
                        .push(format!("Upload of {} failed: {}", upload.photo_id, e));
                }
            }
        }
        let text = format!("Uploaded {} of {} photos", uploaded, total);
        self.notice = Some(if uploaded == total {
            Notice::Info(text)
        } else {
            Notice::Error(text)
        });
        Task::none()
    }

    fn report_saved(&mut self, id: u64, path: PathBuf) {
        info!(id, path = %path.display(), "Photo downloaded");
        self.debug_log.push(format!("Saved {}", path.display()));
        self.notice = Some(Notice::Info(format!("Saved to {}", path.display())));
    }

    fn report_egress_error(&mut self, id: u64, err: EgressError) {
        error!(id, error = %err, "Egress failed");
        self.debug_log.push(format!("Export of {} failed: {}", id, err));
        self.notice = Some(Notice::Error(err.to_string()));
    }
}
