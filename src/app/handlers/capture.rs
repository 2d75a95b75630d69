// SPDX-License-Identifier: GPL-3.0-only

//! Capture handlers
//!
//! Shutter presses, development of the shot once its delay elapsed, the
//! flash toggle and filter selection from the rotary input.

use crate::app::state::{CameraApp, Message, Screen};
use crate::app::task::Task;
use crate::film::Photo;
use crate::input::RotaryEvent;
use crate::pipelines::photo::{ShutterOutcome, ShutterRejection};
use chrono::Local;
use std::time::Instant;
use tracing::{info, warn};

impl CameraApp {
    pub(crate) fn handle_shutter(&mut self, now: Instant) -> Task<Message> {
        match self
            .shot
            .press(now, self.film.remaining(), self.flash.is_enabled())
        {
            ShutterOutcome::Accepted { flash } => {
                if flash {
                    self.flash.fire();
                }
                self.debug_log.push(format!(
                    "Shutter ({} left{})",
                    self.film.remaining(),
                    if flash { ", flash" } else { "" }
                ));
            }
            ShutterOutcome::Ignored(ShutterRejection::OutOfFilm) => {
                self.debug_log.push("Out of film, reload to continue");
            }
            // Re-entrant presses are silently dropped
            ShutterOutcome::Ignored(ShutterRejection::Busy) => {}
        }
        Task::none()
    }

    /// Snapshot the live frame with the filter selected right now
    ///
    /// Without a frame the shot produces nothing and no exposure is used.
    pub(crate) fn develop_shot(&mut self) {
        let Some(frame) = self.surface.current_frame() else {
            warn!("No live frame when the shot was due");
            self.debug_log.push("No frame, nothing captured");
            return;
        };
        let preset = *self.filters.current();

        match self.developer.develop(frame, &preset.chain()) {
            Ok(encoded) => {
                let taken_at = Local::now();
                let photo = Photo::new(self.film.next_id(taken_at), encoded, preset, taken_at);
                let (width, height) = photo.dimensions();
                let label = photo.time_label();
                if self.film.expose(photo) {
                    self.gallery_index = 0;
                    self.debug_log.push(format!(
                        "Developed {}x{} [{}] at {} ({} left)",
                        width,
                        height,
                        preset.label,
                        label,
                        self.film.remaining()
                    ));
                }
            }
            Err(e) => {
                warn!(error = %e, "Development failed");
                self.debug_log.push(format!("Development failed: {}", e));
            }
        }
    }

    pub(crate) fn handle_toggle_flash(&mut self) -> Task<Message> {
        let enabled = self.flash.toggle();
        info!(enabled, "Flash toggled");
        self.debug_log
            .push(format!("Flash {}", if enabled { "on" } else { "off" }));
        self.config.flash_enabled = enabled;
        self.persist_config();
        Task::none()
    }

    fn persist_config(&mut self) {
        let Some(path) = self.config_path.as_deref() else {
            return;
        };
        if let Err(e) = self.config.save_to(path) {
            warn!(path = %path.display(), error = %e, "Failed to save config");
            self.debug_log.push(format!("Config not saved: {}", e));
        }
    }

    /// Rotary turns the filter dial in the viewfinder and scrolls the gallery
    pub(crate) fn handle_rotary(&mut self, event: RotaryEvent) -> Task<Message> {
        match self.screen {
            Screen::Viewfinder => {
                let preset = match event {
                    RotaryEvent::Forward => self.filters.forward(),
                    RotaryEvent::Backward => self.filters.backward(),
                };
                self.debug_log.push(format!("Filter: {}", preset.label));
                Task::none()
            }
            Screen::Gallery => {
                let delta = match event {
                    RotaryEvent::Forward => 1,
                    RotaryEvent::Backward => -1,
                };
                self.handle_gallery_step(delta)
            }
        }
    }
}
