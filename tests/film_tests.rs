// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the film roll

use chrono::{Duration, Local};
use retrocam::constants::film::INITIAL_BUDGET;
use retrocam::film::{FilmRoll, Photo};
use retrocam::pipelines::photo::{CATALOG, EncodedImage};

fn exposure(roll: &FilmRoll, preset: usize) -> Photo {
    let taken_at = Local::now();
    Photo::new(
        roll.next_id(taken_at),
        EncodedImage {
            data: vec![0xFF, 0xD8, 0xFF, 0xD9],
            width: 1,
            height: 1,
        },
        CATALOG[preset % CATALOG.len()],
        taken_at,
    )
}

#[test]
fn test_budget_invariant_over_mixed_sequence() {
    let mut roll = FilmRoll::default();
    assert_eq!(roll.initial(), INITIAL_BUDGET);

    // Shoot, reload and overshoot in a fixed pattern
    let pattern = [3usize, 0, 30, 7, 1, 24, 25];
    for (round, shots) in pattern.iter().enumerate() {
        for i in 0..*shots {
            let had_film = roll.remaining() > 0;
            let photo = exposure(&roll, i);
            assert_eq!(roll.expose(photo), had_film);
            assert_eq!(
                roll.remaining() as usize + roll.photos().len(),
                INITIAL_BUDGET as usize
            );
        }
        if round % 2 == 1 {
            roll.reload();
            assert_eq!(roll.remaining(), INITIAL_BUDGET);
            assert!(roll.photos().is_empty());
        }
    }
}

#[test]
fn test_ids_are_unique_and_increasing() {
    let mut roll = FilmRoll::default();
    let mut ids = Vec::new();
    for i in 0..10 {
        let photo = exposure(&roll, i);
        ids.push(photo.id());
        assert!(roll.expose(photo));
    }
    assert!(ids.windows(2).all(|w| w[1] > w[0]));

    // Newest first
    let listed: Vec<u64> = roll.photos().iter().map(Photo::id).collect();
    let mut expected = ids.clone();
    expected.reverse();
    assert_eq!(listed, expected);
}

#[test]
fn test_id_follows_capture_time() {
    let roll = FilmRoll::default();
    let taken_at = Local::now() + Duration::seconds(5);
    assert_eq!(roll.next_id(taken_at), taken_at.timestamp_millis() as u64);
}

#[test]
fn test_lookup_and_labels() {
    let mut roll = FilmRoll::new(2);
    let photo = exposure(&roll, 2);
    let id = photo.id();
    assert!(roll.expose(photo));

    let stored = roll.photo(id).unwrap();
    assert_eq!(stored.preset().label, "B&W");
    assert_eq!(stored.file_name(), format!("retrocam-{}.jpg", id));
    assert_eq!(stored.time_label().len(), 8);
    let (title, text) = stored.share_text();
    assert_eq!(title, "RetroCam photo (B&W)");
    assert!(text.contains("B&W"));
    assert!(roll.photo(id + 1).is_none());
}

#[test]
fn test_small_roll_runs_out() {
    let mut roll = FilmRoll::new(2);
    assert!(!roll.is_used());
    assert!(roll.expose(exposure(&roll, 0)));
    assert!(roll.is_used());
    assert!(roll.expose(exposure(&roll, 0)));
    assert!(!roll.expose(exposure(&roll, 0)));
    assert_eq!(roll.remaining(), 0);
    assert_eq!(roll.photos().len(), 2);
}
