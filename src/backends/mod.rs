// SPDX-License-Identifier: MPL-2.0

//! Backend abstraction layer for camera capture
//!
//! The backend layer hides how frames reach the component. The app only sees
//! the [`camera::MediaDevices`] interface and the session manager on top:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                  App Layer                  │
//! └────────────────────┬────────────────────────┘
//!                      │
//! ┌────────────────────┴────────────────────────┐
//! │              Backend Layer                  │
//! │  ┌───────────────────┐  ┌────────────────┐  │
//! │  │     GStreamer     │  │  Still image   │  │
//! │  │ (PipeWire / V4L2) │  │ (file/pattern) │  │
//! │  └───────────────────┘  └────────────────┘  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`camera`]: Capture sessions, device enumeration and preview surface

pub mod camera;
