// SPDX-License-Identifier: MPL-2.0

//! Integration tests for constants module

use retrocam::constants::{debug, film, get_resolution_label, timing, upload, viewport};

#[test]
fn test_fresh_roll_has_24_exposures() {
    assert_eq!(film::INITIAL_BUDGET, 24);
}

#[test]
fn test_viewport_is_device_screen() {
    assert_eq!((viewport::WIDTH, viewport::HEIGHT), (240, 300));
}

#[test]
fn test_debug_gesture() {
    assert_eq!(debug::TAP_THRESHOLD, 5);
    assert_eq!(debug::TAP_WINDOW.as_millis(), 1000);
    assert!(debug::LOG_CAPACITY > 0);
}

#[test]
fn test_ticks_resolve_pulses() {
    // A tick must land inside every visual pulse
    assert!(timing::TICK_INTERVAL < timing::SHUTTER_PULSE);
    assert!(timing::TICK_INTERVAL < timing::FLASH_PULSE);
}

#[test]
fn test_roll_upload_is_paced() {
    assert!(!upload::STEP_DELAY.is_zero());
    assert!(upload::STEP_DELAY < upload::REQUEST_TIMEOUT);
}

#[test]
fn test_resolution_label_boundaries() {
    assert_eq!(get_resolution_label(1280), Some("HD"));
    assert_eq!(get_resolution_label(1279), Some("SD"));
    assert_eq!(get_resolution_label(639), None);
    assert_eq!(get_resolution_label(3840), Some("4K"));
}
