// SPDX-License-Identifier: MPL-2.0

//! RetroCam - a retro point-and-shoot camera component
//!
//! Simulates a small point-and-shoot on a fixed 240x300 screen: a live
//! camera preview, a filter dial, a film roll with a limited number of
//! exposures, and ways to get photos off the device.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: The camera component (state, messages, handlers)
//! - [`backends`]: Camera acquisition and the preview surface
//! - [`pipelines`]: The shot pipeline, filters and encoding
//! - [`film`]: Film roll and photos
//! - [`egress`]: Share, download and upload of photos
//! - [`flash`]: Flash toggle and LED pulse
//! - [`input`]: Rotary input hub
//! - [`debug`]: Debug console log and tap gesture
//! - [`config`]: User configuration handling
//! - [`storage`]: File storage
//! - [`terminal`]: Terminal host
//!
//! # Example
//!
//! ```ignore
//! // Run in a terminal:
//! // retrocam
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod debug;
pub mod egress;
pub mod errors;
pub mod film;
pub mod flash;
pub mod input;
pub mod pipelines;
pub mod storage;
pub mod terminal;

// Re-export commonly used types
pub use app::{CameraApp, Message};
pub use config::Config;
pub use film::{FilmRoll, Photo};
pub use pipelines::photo::{CATALOG, FilterPreset};
