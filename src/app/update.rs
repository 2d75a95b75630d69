// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling
//!
//! `update()` is a dispatcher; the handlers live in the `handlers` submodules
//! grouped by domain:
//!
//! - `handlers::camera`: mount, teardown, restart, tap-to-play, ticks
//! - `handlers::capture`: shutter, development, flash, rotary filter selection
//! - `handlers::gallery`: reload, gallery navigation, export and upload
//! - `handlers::system`: debug console and notices

use super::state::{CameraApp, Message};
use super::task::Task;
use std::time::Instant;

impl CameraApp {
    /// Handle one message at time `now`
    pub fn update(&mut self, message: Message, now: Instant) -> Task<Message> {
        match message {
            // ===== Camera =====
            Message::RestartCamera => self.handle_restart_camera(),
            Message::TapToPlay => self.handle_tap_to_play(),
            Message::Tick => self.handle_tick(now),

            // ===== Capture =====
            Message::Shutter => self.handle_shutter(now),
            Message::ToggleFlash => self.handle_toggle_flash(),
            Message::Rotary(event) => self.handle_rotary(event),

            // ===== Film / gallery =====
            Message::ReloadFilm => self.handle_reload_film(),
            Message::OpenGallery => self.handle_open_gallery(),
            Message::CloseGallery => self.handle_close_gallery(),
            Message::GalleryStep(delta) => self.handle_gallery_step(delta),
            Message::ExportPhoto(id) => self.handle_export_photo(id),
            Message::DownloadPhoto(id) => self.handle_download_photo(id),
            Message::UploadPhoto(id) => self.handle_upload_photo(id),
            Message::UploadRoll => self.handle_upload_roll(),
            Message::ExportFinished(id, result) => self.handle_export_finished(id, result),
            Message::DownloadFinished(id, result) => self.handle_download_finished(id, result),
            Message::UploadFinished(id, result) => self.handle_upload_finished(id, result),
            Message::RollUploadFinished(results) => self.handle_roll_upload_finished(results),

            // ===== System =====
            Message::DebugTap => self.handle_debug_tap(now),
            Message::DismissNotice => self.handle_dismiss_notice(),
            Message::DismissQr => self.handle_dismiss_qr(),
        }
    }
}
