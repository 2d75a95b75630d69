// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for filter presets and development

use image::{Rgba, RgbaImage};
use retrocam::backends::camera::CameraFrame;
use retrocam::backends::camera::still::test_pattern;
use retrocam::pipelines::photo::{
    CATALOG, FilterChain, FilterOp, FilterPreset, PhotoDeveloper, snapshot,
};

#[test]
fn test_catalog_has_four_distinct_presets() {
    assert_eq!(CATALOG.len(), 4);
    for (i, a) in CATALOG.iter().enumerate() {
        for b in &CATALOG[i + 1..] {
            assert_ne!(a.name, b.name);
            assert_ne!(a.label, b.label);
        }
    }
    assert_eq!(CATALOG[0].label, "Standard");
}

#[test]
fn test_preset_chains_round_trip_as_text() {
    for preset in &CATALOG {
        let chain = preset.chain();
        let text = chain.to_string();
        let parsed: FilterChain = text.parse().unwrap();
        assert_eq!(parsed, chain, "{} -> {}", preset.name, text);
    }
}

#[test]
fn test_identity_preset_leaves_pixels_unchanged() {
    let original = test_pattern(64, 48);
    let mut filtered = original.clone();
    CATALOG[0].chain().apply(&mut filtered);
    assert_eq!(filtered, original);
}

#[test]
fn test_other_presets_change_the_image() {
    let original = test_pattern(64, 48);
    for preset in &CATALOG[1..] {
        let mut filtered = original.clone();
        preset.chain().apply(&mut filtered);
        assert_ne!(filtered, original, "{} should alter pixels", preset.name);
    }
}

#[test]
fn test_mono_preset_is_gray() {
    let mono = FilterPreset::by_name("mono").unwrap();
    let mut image = test_pattern(32, 24);
    mono.chain().apply(&mut image);
    for pixel in image.pixels() {
        let [r, g, b, a] = pixel.0;
        assert_eq!(r, g);
        assert_eq!(g, b);
        assert_eq!(a, 255);
    }
}

#[test]
fn test_chain_order_is_primitive_order() {
    let vintage = FilterPreset::by_name("Vintage").unwrap().chain();
    let names: Vec<&str> = vintage.ops().iter().map(FilterOp::name).collect();
    assert_eq!(names, vec!["sepia", "brightness", "contrast", "hue-rotate"]);
}

#[test]
fn test_snapshot_uses_native_resolution() {
    let image = RgbaImage::from_pixel(33, 17, Rgba([1, 2, 3, 255]));
    let frame = CameraFrame::from_image(&image);
    let raster = snapshot(&frame).unwrap();
    assert_eq!(raster.dimensions(), (33, 17));
    assert_eq!(raster, image);
}

#[test]
fn test_develop_produces_jpeg_of_frame_size() {
    let frame = CameraFrame::from_image(&test_pattern(40, 30));
    let encoded = PhotoDeveloper::default()
        .develop(&frame, &CATALOG[3].chain())
        .unwrap();
    assert_eq!((encoded.width, encoded.height), (40, 30));
    assert_eq!(encoded.mime_type(), "image/jpeg");

    let decoded = image::load_from_memory(&encoded.data).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (40, 30));
}

#[test]
fn test_truncated_frame_fails_to_develop() {
    let mut frame = CameraFrame::from_image(&test_pattern(8, 8));
    frame.height = 100;
    assert!(
        PhotoDeveloper::default()
            .develop(&frame, &FilterChain::identity())
            .is_err()
    );
}
