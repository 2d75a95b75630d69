// SPDX-License-Identifier: GPL-3.0-only

//! System handlers
//!
//! The hidden debug console gesture and dismissal of overlays.

use crate::app::state::{CameraApp, Message};
use crate::app::task::Task;
use std::time::Instant;
use tracing::info;

impl CameraApp {
    pub(crate) fn handle_debug_tap(&mut self, now: Instant) -> Task<Message> {
        if self.taps.tap(now) {
            self.debug_visible = !self.debug_visible;
            info!(visible = self.debug_visible, "Debug console toggled");
            self.debug_log.push(format!(
                "Debug console {}",
                if self.debug_visible { "shown" } else { "hidden" }
            ));
        }
        Task::none()
    }

    pub(crate) fn handle_dismiss_notice(&mut self) -> Task<Message> {
        self.notice = None;
        Task::none()
    }

    pub(crate) fn handle_dismiss_qr(&mut self) -> Task<Message> {
        self.qr = None;
        Task::none()
    }
}
