// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for camera operations
//!
//! This module provides command-line functionality for:
//! - Listing available cameras
//! - Listing the filter catalog
//! - Shooting a single photo through the full shot pipeline
//! - Developing an existing image with a filter chain

use retrocam::app::{CameraApp, Message};
use retrocam::backends::camera::{CameraBackendType, PermissionState, get_backend};
use retrocam::config::Config;
use retrocam::constants::timing;
use retrocam::input::RotaryInput;
use retrocam::pipelines::photo::{CATALOG, FilterChain, FilterPreset, PhotoDeveloper, PhotoEncoder};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// How long to wait for the first frame
const FIRST_FRAME_TIMEOUT: Duration = Duration::from_secs(5);

/// Time after the first frame before shooting, so exposure settles
const WARMUP: Duration = Duration::from_millis(500);

/// List all available cameras
pub fn list_cameras(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let backend = get_backend(config.backend, config.still_source.clone());
    if !backend.is_available() {
        return Err(format!("{} backend is not available", config.backend).into());
    }

    let devices = backend.enumerate_devices()?;
    if devices.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!("Available cameras ({}):", config.backend);
    println!();
    for (index, device) in devices.iter().enumerate() {
        println!("  [{}] {}", index, device.label);
        println!("      Id: {}", device.device_id);
        if let Some(driver) = &device.driver {
            println!("      Driver: {}", driver);
        }
        if let Some(facing) = device.facing() {
            println!("      Facing: {}", facing);
        }
        println!();
    }

    Ok(())
}

/// Print the filter catalog in dial order
pub fn list_filters() {
    for (index, preset) in CATALOG.iter().enumerate() {
        println!("  [{}] {:<10} {:<10} {}", index, preset.name, preset.label, preset.chain());
    }
}

/// Take one photo through the component: mount, shutter, develop, save
pub fn shoot(
    mut config: Config,
    filter: Option<String>,
    output: Option<PathBuf>,
    still: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = still {
        config.backend = CameraBackendType::Still;
        config.still_source = Some(path);
    }

    let mut app = CameraApp::from_config(config);
    if let Some(name) = filter.as_deref()
        && !app.select_filter(name)
    {
        return Err(format!("Unknown filter: {} (see 'retrocam filters')", name).into());
    }

    let mut rotary = RotaryInput::new();
    let _ = app.mount(&mut rotary);

    let result = shoot_mounted(&mut app, output);
    app.unmount(&mut rotary);
    result
}

fn shoot_mounted(
    app: &mut CameraApp,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let PermissionState::Denied { kind, message } = app.permission() {
        return Err(format!("Camera unavailable ({}): {}", kind.name(), message).into());
    }

    // Wait for frames to stabilize (camera warm-up)
    let start = Instant::now();
    let mut first_frame: Option<Instant> = None;
    loop {
        let now = Instant::now();
        let _ = app.update(Message::Tick, now);
        if app.surface().current_frame().is_some() {
            let seen = *first_frame.get_or_insert(now);
            if now.duration_since(seen) >= WARMUP {
                break;
            }
        } else if now.duration_since(start) > FIRST_FRAME_TIMEOUT {
            return Err("Failed to capture frame from camera".into());
        }
        std::thread::sleep(timing::TICK_INTERVAL);
    }

    println!("Filter: {}", app.current_filter().label);
    println!("Capturing...");
    let _ = app.update(Message::Shutter, Instant::now());
    while app.is_developing() {
        std::thread::sleep(timing::TICK_INTERVAL);
        let _ = app.update(Message::Tick, Instant::now());
    }

    let photo = app
        .film()
        .photos()
        .first()
        .ok_or("No frame was available when the shot developed")?;

    let path = resolve_output(output, &app.config().photo_dir(), &photo.file_name());
    write_file(&path, photo.jpeg())?;

    let (width, height) = photo.dimensions();
    println!("Photo saved: {} ({}x{})", path.display(), width, height);
    Ok(())
}

/// Run a filter chain over an existing image and save it as JPEG
pub fn develop(
    config: &Config,
    input: &Path,
    filter: &str,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let chain = match FilterPreset::by_name(filter) {
        Some(preset) => preset.chain(),
        None => filter.parse::<FilterChain>()?,
    };

    let image = image::open(input)?.to_rgba8();
    let developer = PhotoDeveloper::new(PhotoEncoder::new(config.jpeg_quality));
    let encoded = developer.develop_image(image, &chain)?;

    let default_name = format!(
        "{}-developed.jpg",
        input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image")
    );
    let path = resolve_output(output, &config.photo_dir(), &default_name);
    write_file(&path, &encoded.data)?;

    println!("Filter: {}", chain);
    println!("Saved: {} ({}x{})", path.display(), encoded.width, encoded.height);
    Ok(())
}

/// A directory (or nothing) gets the default name appended
fn resolve_output(output: Option<PathBuf>, default_dir: &Path, file_name: &str) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => path.join(file_name),
        Some(path) => path,
        None => default_dir.join(file_name),
    }
}

fn write_file(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, data)
}
