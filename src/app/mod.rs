// SPDX-License-Identifier: MPL-2.0

//! The camera component
//!
//! This module holds the component state, message handling and the deferred
//! work (egress) the handlers hand back to the host.
//!
//! # Architecture
//!
//! - `state`: component state (`CameraApp`), `Message`, `Screen`, `Notice`
//! - `update`: message dispatch
//! - `handlers`: message handlers grouped by domain
//! - `task`: futures returned from `update` for the host to run
//!
//! The host drives the component: it calls `mount` once, forwards input as
//! messages, delivers `Message::Tick` whenever `next_deadline` is due, runs
//! returned tasks and feeds their results back through `update`.

pub mod handlers;
mod state;
mod task;
mod update;

pub use state::{CameraApp, Message, Notice, Screen};
pub use task::Task;

use crate::backends::camera::get_backend;
use crate::config::Config;
use crate::egress::SystemShareSheet;
use crate::flash::Flash;
use std::sync::Arc;
use tracing::info;

impl CameraApp {
    /// Build the component with the platform backends the config selects
    pub fn from_config(config: Config) -> Self {
        let devices = get_backend(config.backend, config.still_source.clone());
        let flash = Flash::detect(config.flash_enabled);
        info!(
            backend = %config.backend,
            flash_leds = flash.has_leds(),
            "Camera component created"
        );
        Self::new(config, devices, Arc::new(SystemShareSheet::new()), flash)
    }
}
