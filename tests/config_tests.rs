// SPDX-License-Identifier: MPL-2.0

//! Integration tests for configuration module

use retrocam::Config;
use retrocam::backends::camera::{CameraBackendType, FacingMode};
use retrocam::constants::{capture, encoding, upload};
use retrocam::errors::ConfigError;
use std::path::PathBuf;

fn temp_file(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("retrocam-config-{}", uuid::Uuid::new_v4()))
        .join(name)
}

#[test]
fn test_config_default() {
    let config = Config::default();

    assert_eq!(config.backend, CameraBackendType::GStreamer);
    assert_eq!(config.facing_mode, FacingMode::Environment);
    assert_eq!(
        (config.ideal_width, config.ideal_height),
        (capture::IDEAL_WIDTH, capture::IDEAL_HEIGHT)
    );
    assert_eq!(config.jpeg_quality, encoding::DEFAULT_JPEG_QUALITY);
    assert!(!config.flash_enabled);
    assert_eq!(config.upload.endpoint, upload::DEFAULT_ENDPOINT);
    assert!(config.photo_dir().ends_with("RetroCam"));
}

#[test]
fn test_config_round_trip() {
    let path = temp_file("config.json");
    let mut config = Config::default();
    config.backend = CameraBackendType::Still;
    config.facing_mode = FacingMode::User;
    config.still_source = Some(PathBuf::from("/tmp/scene.png"));
    config.mirror_preview = true;
    config.upload.api_key = Some("key".to_string());

    config.save_to(&path).unwrap();
    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);

    std::fs::remove_dir_all(path.parent().unwrap()).ok();
}

#[test]
fn test_partial_file_uses_defaults() {
    let path = temp_file("partial.json");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, r#"{ "backend": "still", "upload": { "api_key": "abc" } }"#).unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.backend, CameraBackendType::Still);
    assert_eq!(config.upload.api_key.as_deref(), Some("abc"));
    assert_eq!(config.upload.endpoint, upload::DEFAULT_ENDPOINT);
    assert_eq!(config.jpeg_quality, encoding::DEFAULT_JPEG_QUALITY);

    std::fs::remove_dir_all(path.parent().unwrap()).ok();
}

#[test]
fn test_invalid_file_is_parse_error() {
    let path = temp_file("broken.json");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{ backend: ").unwrap();

    assert!(matches!(
        Config::load_from(&path),
        Err(ConfigError::Parse(_))
    ));

    std::fs::remove_dir_all(path.parent().unwrap()).ok();
}

#[test]
fn test_missing_file_is_io_error() {
    let path = temp_file("missing.json");
    assert!(matches!(Config::load_from(&path), Err(ConfigError::Io(_))));
}

#[test]
fn test_constraints_follow_config() {
    let config = Config {
        facing_mode: FacingMode::User,
        ideal_width: 640,
        ideal_height: 480,
        ..Config::default()
    };
    let constraints = config.constraints();
    assert_eq!(constraints.facing_mode, Some(FacingMode::User));
    assert_eq!(constraints.ideal_width, Some(640));
    assert_eq!(constraints.ideal_height, Some(480));
}

#[test]
fn test_output_dir_overrides_photo_dir() {
    let config = Config {
        output_dir: Some(PathBuf::from("/srv/photos")),
        ..Config::default()
    };
    assert_eq!(config.photo_dir(), PathBuf::from("/srv/photos"));
}
