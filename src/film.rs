// SPDX-License-Identifier: GPL-3.0-only

//! Film roll and developed photos
//!
//! A roll holds a fixed number of exposures. Each developed photo uses one;
//! reloading puts a fresh roll in and throws every photo away. At all times
//! `remaining + photos.len()` equals the initial budget.

use crate::constants::{encoding, film};
use crate::pipelines::photo::{EncodedImage, FilterPreset};
use chrono::{DateTime, Local};
use std::sync::Arc;
use tracing::info;

/// A developed photo
#[derive(Debug, Clone)]
pub struct Photo {
    /// Creation timestamp in milliseconds since the Unix epoch
    id: u64,
    jpeg: Arc<[u8]>,
    width: u32,
    height: u32,
    preset: FilterPreset,
    taken_at: DateTime<Local>,
}

impl Photo {
    pub fn new(
        id: u64,
        image: EncodedImage,
        preset: FilterPreset,
        taken_at: DateTime<Local>,
    ) -> Self {
        Self {
            id,
            jpeg: Arc::from(image.data),
            width: image.width,
            height: image.height,
            preset,
            taken_at,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Encoded JPEG bytes
    pub fn jpeg(&self) -> &Arc<[u8]> {
        &self.jpeg
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Filter active when the frame was snapshotted
    pub fn preset(&self) -> &FilterPreset {
        &self.preset
    }

    pub fn taken_at(&self) -> DateTime<Local> {
        self.taken_at
    }

    /// Capture time as shown in the gallery
    pub fn time_label(&self) -> String {
        self.taken_at.format("%H:%M:%S").to_string()
    }

    /// File name used for downloads and uploads, without extension
    pub fn file_stem(&self) -> String {
        format!("{}-{}", encoding::FILE_PREFIX, self.id)
    }

    pub fn file_name(&self) -> String {
        format!("{}.jpg", self.file_stem())
    }

    /// Title and caption used when sharing
    pub fn share_text(&self) -> (String, String) {
        (
            format!("RetroCam photo ({})", self.preset.label),
            format!(
                "Shot on RetroCam with the {} filter at {}",
                self.preset.label,
                self.time_label()
            ),
        )
    }
}

/// A roll of film
#[derive(Debug, Clone)]
pub struct FilmRoll {
    initial: u32,
    remaining: u32,
    /// Newest first
    photos: Vec<Photo>,
    last_id: u64,
}

impl FilmRoll {
    pub fn new(initial: u32) -> Self {
        Self {
            initial,
            remaining: initial,
            photos: Vec::new(),
            last_id: 0,
        }
    }

    pub fn initial(&self) -> u32 {
        self.initial
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Photos, newest first
    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn photo(&self, id: u64) -> Option<&Photo> {
        self.photos.iter().find(|p| p.id == id)
    }

    /// True once any exposure has been used; reload is offered from then on
    pub fn is_used(&self) -> bool {
        self.remaining < self.initial || !self.photos.is_empty()
    }

    /// Next photo id for a capture at `taken_at`
    ///
    /// Ids are creation timestamps in milliseconds, bumped by one if two
    /// captures land on the same millisecond.
    pub fn next_id(&self, taken_at: DateTime<Local>) -> u64 {
        let millis = u64::try_from(taken_at.timestamp_millis()).unwrap_or(0);
        millis.max(self.last_id + 1)
    }

    /// Store a developed photo, using one exposure
    ///
    /// Returns false (and stores nothing) if the roll is empty.
    pub fn expose(&mut self, photo: Photo) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.last_id = self.last_id.max(photo.id);
        info!(
            id = photo.id,
            filter = photo.preset.name,
            remaining = self.remaining,
            "Photo stored"
        );
        self.photos.insert(0, photo);
        true
    }

    /// Fresh roll: full budget, no photos
    pub fn reload(&mut self) {
        info!(discarded = self.photos.len(), "Reloading film");
        self.remaining = self.initial;
        self.photos.clear();
    }
}

impl Default for FilmRoll {
    fn default() -> Self {
        Self::new(film::INITIAL_BUDGET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipelines::photo::CATALOG;

    fn photo(roll: &FilmRoll) -> Photo {
        let now = Local::now();
        Photo::new(
            roll.next_id(now),
            EncodedImage {
                data: vec![0xFF, 0xD8, 0xFF, 0xD9],
                width: 4,
                height: 3,
            },
            CATALOG[0],
            now,
        )
    }

    #[test]
    fn test_expose_keeps_budget_invariant() {
        let mut roll = FilmRoll::new(3);
        for _ in 0..5 {
            let p = photo(&roll);
            roll.expose(p);
        }
        assert_eq!(roll.remaining(), 0);
        assert_eq!(roll.photos().len(), 3);
    }

    #[test]
    fn test_newest_first_with_unique_ids() {
        let mut roll = FilmRoll::default();
        let first = photo(&roll);
        roll.expose(first);
        let second = photo(&roll);
        roll.expose(second);
        assert!(roll.photos()[0].id() > roll.photos()[1].id());
    }

    #[test]
    fn test_reload_restores_everything() {
        let mut roll = FilmRoll::default();
        assert!(!roll.is_used());
        let p = photo(&roll);
        roll.expose(p);
        assert!(roll.is_used());
        roll.reload();
        assert_eq!(roll.remaining(), film::INITIAL_BUDGET);
        assert!(roll.photos().is_empty());
    }

    #[test]
    fn test_file_name_uses_id() {
        let roll = FilmRoll::default();
        let p = photo(&roll);
        assert_eq!(p.file_name(), format!("retrocam-{}.jpg", p.id()));
    }
}
