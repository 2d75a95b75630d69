// SPDX-License-Identifier: GPL-3.0-only

//! Message handler modules
//!
//! Handlers are grouped by functional domain, each adding methods to
//! `CameraApp`.

pub mod camera;
pub mod capture;
pub mod gallery;
pub mod system;
