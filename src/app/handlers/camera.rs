// SPDX-License-Identifier: GPL-3.0-only

//! Camera lifecycle handlers
//!
//! Mounting makes one automatic start attempt; teardown always stops the
//! session. Restarting goes through the same start path, which stops the old
//! session before acquiring a new one.

use crate::app::state::{CameraApp, Message};
use crate::app::task::Task;
use crate::backends::camera::StartReport;
use crate::input::{RotaryEvent, RotaryInput};
use std::time::Instant;
use tracing::{debug, info, warn};

impl CameraApp {
    /// Attach the component: subscribe to rotary input and start the camera
    pub fn mount(&mut self, rotary: &mut RotaryInput) -> Task<Message> {
        if self.mounted {
            debug!("Already mounted");
            return Task::none();
        }
        self.mounted = true;
        self.rotary = Some(rotary.subscribe());
        info!("Camera component mounted");

        self.devices = self.sessions.enumerate();
        for device in &self.devices {
            self.debug_log
                .push(format!("Device: {} ({})", device.label, device.device_id));
        }
        self.start_camera();
        Task::none()
    }

    /// Detach the component: stop the camera and drop the rotary subscription
    pub fn unmount(&mut self, rotary: &mut RotaryInput) {
        if let Some((id, _)) = self.rotary.take() {
            rotary.unsubscribe(id);
        }
        if self.sessions.stop(&mut self.surface) {
            self.debug_log.push("Camera stopped");
        }
        self.flash.release();
        self.mounted = false;
        info!("Camera component unmounted");
    }

    pub(crate) fn start_camera(&mut self) {
        let constraints = self.config.constraints();
        self.debug_log.push(format!("Requesting camera ({})", constraints));

        match self.sessions.start(&constraints, &mut self.surface) {
            StartReport::Started { tracks, playback } => {
                for track in &tracks {
                    self.debug_log.push(format!("Track: {}", track));
                }
                match playback {
                    Ok(()) => {
                        self.needs_tap_to_play = false;
                        self.debug_log.push("Preview playing");
                    }
                    Err(e) => {
                        self.needs_tap_to_play = true;
                        self.debug_log.push(format!("Playback failed: {}", e));
                    }
                }
            }
            StartReport::Failed(err) => {
                self.needs_tap_to_play = false;
                self.debug_log.push(format!("Camera error: {}", err));
            }
        }
    }

    pub(crate) fn handle_restart_camera(&mut self) -> Task<Message> {
        info!("Restarting camera");
        self.start_camera();
        Task::none()
    }

    pub(crate) fn handle_tap_to_play(&mut self) -> Task<Message> {
        match self.sessions.bind_and_play(&mut self.surface) {
            Ok(()) => {
                self.needs_tap_to_play = false;
                self.debug_log.push("Preview playing");
            }
            Err(e) => {
                self.debug_log.push(format!("Playback failed: {}", e));
            }
        }
        Task::none()
    }

    pub(crate) fn handle_tick(&mut self, now: Instant) -> Task<Message> {
        let pending: Vec<RotaryEvent> = match self.rotary.as_mut() {
            Some((_, rx)) => std::iter::from_fn(|| rx.try_recv().ok()).collect(),
            None => Vec::new(),
        };
        for event in pending {
            // Rotary handling never produces tasks
            let _ = self.handle_rotary(event);
        }

        let was_playing = self.surface.is_playing();
        self.surface.poll();
        if was_playing && self.surface.has_ended() {
            warn!("Preview source ended");
            self.debug_log.push("Preview source ended");
            self.needs_tap_to_play = true;
        }
        self.taps.expire(now);

        let developing_due = self.shot.poll(now);
        if self.flash.is_lit() && !self.shot.flash_active(now) {
            self.flash.release();
        }
        if developing_due {
            self.develop_shot();
        }
        Task::none()
    }
}
