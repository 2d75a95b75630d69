// SPDX-License-Identifier: MPL-2.0

//! Processing pipelines
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │ Camera Frame │ ──▶ │  Photo Pipeline   │ ──▶ │    Photo     │
//! │   (RGBA)     │     │  - Snapshot       │     │  (JPEG, on   │
//! │              │     │  - Filter chain   │     │  film roll)  │
//! │              │     │  - Encoding       │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`photo`]: Shutter state machine, filter presets and still development

pub mod photo;
