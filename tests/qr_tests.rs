// SPDX-License-Identifier: GPL-3.0-only

//! Generated QR codes must scan back to the uploaded URL

use retrocam::egress::QrImage;

fn decode(qr: &QrImage, scale: usize) -> String {
    let (side, pixels) = qr.to_luma(scale);
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(side, side, |x, y| {
        pixels[y * side + x]
    });
    let grids = prepared.detect_grids();
    assert_eq!(grids.len(), 1, "expected exactly one QR grid");
    let (_meta, content) = grids[0].decode().unwrap();
    content
}

#[test]
fn test_upload_url_round_trips_through_scanner() {
    let url = "https://i.ibb.co/Xk9Lm2P/retrocam-1718000000123.jpg";
    let qr = QrImage::encode(url).unwrap();
    assert_eq!(decode(&qr, 4), url);
}

#[test]
fn test_large_scale_still_scans() {
    let url = "https://ibb.co/abc";
    let qr = QrImage::encode(url).unwrap();
    assert_eq!(decode(&qr, 10), url);
}

#[test]
fn test_quiet_zone_is_light() {
    let qr = QrImage::encode("https://ibb.co/abc").unwrap();
    let (side, pixels) = qr.to_luma(2);
    assert_eq!(side, (qr.width() + 8) * 2);
    // Four modules of quiet zone on every edge
    for i in 0..side {
        for edge in 0..8 {
            assert_eq!(pixels[edge * side + i], 255);
            assert_eq!(pixels[i * side + edge], 255);
        }
    }
}

#[test]
fn test_finder_pattern_corner_is_dark() {
    let qr = QrImage::encode("https://ibb.co/abc").unwrap();
    assert!(qr.is_dark(0, 0));
    assert!(qr.is_dark(qr.width() - 1, 0));
    assert!(!qr.is_dark(qr.width(), 0));
}
