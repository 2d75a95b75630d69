// SPDX-License-Identifier: MPL-2.0

//! Photo pipeline
//!
//! ```text
//! Shutter → Developing delay → Snapshot → Filter chain → JPEG → Film roll
//!                                  ↑
//!                    latest frame of the preview surface
//! ```
//!
//! # Stages
//!
//! 1. **Shot**: the shutter state machine gates presses and times the delay
//! 2. **Snapshot**: the live frame is copied into an offscreen raster
//! 3. **Filter**: the preset selected at snapshot time is applied in software
//! 4. **Encoding**: the raster is compressed to JPEG

pub mod capture;
pub mod encoding;
pub mod filters;
pub mod presets;
pub mod shot;

pub use capture::{PhotoDeveloper, snapshot};
pub use encoding::{EncodedImage, PhotoEncoder};
pub use filters::{FilterChain, FilterOp, FilterParseError};
pub use presets::{CATALOG, FilterParams, FilterPreset, FilterSelector};
pub use shot::{ShotPipeline, ShotState, ShotTiming, ShutterOutcome, ShutterRejection};
