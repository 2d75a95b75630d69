// SPDX-License-Identifier: GPL-3.0-only

//! V4L2 device enumeration
//!
//! Lists `/dev/video*` nodes that can capture video, with their card name and
//! driver, for device selection and the diagnostic listing.

use super::acquire_error_from_io;
use super::types::{BackendResult, MediaDeviceInfo};
use tracing::debug;
use v4l::capability::Flags;
use v4l::video::Capture;

/// Enumerate V4L2 capture devices
///
/// Metadata-only nodes (uvcvideo exposes two nodes per camera) are skipped.
/// A node that cannot be opened because of permissions fails the whole
/// enumeration with `NotAllowed`, matching how a denied camera prompt behaves.
pub fn enumerate_v4l2_devices() -> BackendResult<Vec<MediaDeviceInfo>> {
    let mut devices = Vec::new();

    for node in v4l::context::enum_devices() {
        let path = node.path().to_string_lossy().to_string();

        let device = match v4l::Device::with_path(node.path()) {
            Ok(device) => device,
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                return Err(acquire_error_from_io(&e, &path));
            }
            Err(e) => {
                debug!(path, error = %e, "Skipping unreadable V4L2 node");
                continue;
            }
        };

        let caps = match device.query_caps() {
            Ok(caps) => caps,
            Err(e) => {
                debug!(path, error = %e, "VIDIOC_QUERYCAP failed");
                continue;
            }
        };

        // Metadata nodes share the card's capability flags but list no
        // capture formats
        let has_formats = device.enum_formats().is_ok_and(|formats| !formats.is_empty());
        if !caps.capabilities.contains(Flags::VIDEO_CAPTURE) || !has_formats {
            debug!(path, card = %caps.card, "Skipping non-capture node");
            continue;
        }

        let label = node.name().unwrap_or_else(|| caps.card.clone());
        debug!(path, label = %label, driver = %caps.driver, "Found V4L2 capture device");

        devices.push(MediaDeviceInfo {
            driver: Some(caps.driver.clone()),
            ..MediaDeviceInfo::video_input(path, label)
        });
    }

    devices.sort_by(|a, b| a.device_id.cmp(&b.device_id));
    Ok(devices)
}
