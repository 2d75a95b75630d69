// SPDX-License-Identifier: GPL-3.0-only

//! Film filter presets
//!
//! A fixed catalog of four looks, selected with a cyclic index that the
//! rotary input moves forward and backward.

use super::filters::{FilterChain, FilterOp};
use std::fmt;

/// Visual adjustment magnitudes of a preset
///
/// Terms a preset does not use keep their identity value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterParams {
    pub grayscale: f32,
    pub sepia: f32,
    pub brightness: f32,
    pub contrast: f32,
    pub saturate: f32,
    pub hue_rotate_deg: f32,
}

impl FilterParams {
    pub const IDENTITY: FilterParams = FilterParams {
        grayscale: 0.0,
        sepia: 0.0,
        brightness: 1.0,
        contrast: 1.0,
        saturate: 1.0,
        hue_rotate_deg: 0.0,
    };

    /// Raster primitives in fixed order: grayscale, sepia, brightness,
    /// contrast, saturate, hue-rotate. Identity terms are omitted.
    pub fn to_chain(&self) -> FilterChain {
        let ops = [
            FilterOp::Grayscale(self.grayscale),
            FilterOp::Sepia(self.sepia),
            FilterOp::Brightness(self.brightness),
            FilterOp::Contrast(self.contrast),
            FilterOp::Saturate(self.saturate),
            FilterOp::HueRotate(self.hue_rotate_deg),
        ];
        FilterChain::new(ops.into_iter().filter(|op| !op.is_identity()).collect())
    }
}

impl Default for FilterParams {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A named, fixed look applied at capture time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterPreset {
    /// Symbolic name used on the command line and in logs
    pub name: &'static str,
    /// Label shown on screen and stored with photos
    pub label: &'static str,
    pub params: FilterParams,
}

impl FilterPreset {
    pub fn chain(&self) -> FilterChain {
        self.params.to_chain()
    }

    /// Look up a preset by symbolic name or label, ignoring case
    pub fn by_name(name: &str) -> Option<&'static FilterPreset> {
        CATALOG
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name) || p.label.eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for FilterPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// The preset catalog, in rotary order
pub const CATALOG: [FilterPreset; 4] = [
    FilterPreset {
        name: "standard",
        label: "Standard",
        params: FilterParams::IDENTITY,
    },
    FilterPreset {
        name: "vivid",
        label: "Vivid",
        params: FilterParams {
            contrast: 1.2,
            saturate: 1.4,
            ..FilterParams::IDENTITY
        },
    },
    FilterPreset {
        name: "mono",
        label: "B&W",
        params: FilterParams {
            grayscale: 1.0,
            contrast: 1.1,
            ..FilterParams::IDENTITY
        },
    },
    FilterPreset {
        name: "vintage",
        label: "Vintage",
        params: FilterParams {
            sepia: 0.6,
            brightness: 1.05,
            contrast: 0.9,
            hue_rotate_deg: -10.0,
            ..FilterParams::IDENTITY
        },
    },
];

/// Cyclic index into [`CATALOG`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterSelector {
    index: usize,
}

impl FilterSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &'static FilterPreset {
        &CATALOG[self.index]
    }

    /// Advance one step, wrapping after the last preset
    pub fn forward(&mut self) -> &'static FilterPreset {
        self.index = (self.index + 1) % CATALOG.len();
        self.current()
    }

    /// Step back one, wrapping before the first preset
    pub fn backward(&mut self) -> &'static FilterPreset {
        self.index = (self.index + CATALOG.len() - 1) % CATALOG.len();
        self.current()
    }

    /// Jump to a preset by name. Returns false if no preset matches.
    pub fn select(&mut self, name: &str) -> bool {
        match CATALOG
            .iter()
            .position(|p| p.name.eq_ignore_ascii_case(name) || p.label.eq_ignore_ascii_case(name))
        {
            Some(index) => {
                self.index = index;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_wraps_both_ways() {
        let mut selector = FilterSelector::new();
        assert_eq!(selector.forward().label, "Vivid");
        assert_eq!(selector.index(), 1);

        let mut selector = FilterSelector::new();
        for _ in 0..4 {
            selector.forward();
        }
        assert_eq!(selector.index(), 0);

        let mut selector = FilterSelector::new();
        selector.backward();
        assert_eq!(selector.index(), 3);
    }

    #[test]
    fn test_standard_chain_is_empty() {
        assert!(CATALOG[0].chain().ops().is_empty());
    }

    #[test]
    fn test_chain_keeps_fixed_order() {
        let chain = FilterPreset::by_name("vintage").unwrap().chain();
        assert_eq!(
            chain.to_string(),
            "sepia(0.6) brightness(1.05) contrast(0.9) hue-rotate(-10deg)"
        );
    }

    #[test]
    fn test_lookup_by_label() {
        assert_eq!(FilterPreset::by_name("b&w").unwrap().name, "mono");
        let mut selector = FilterSelector::new();
        assert!(selector.select("Mono"));
        assert_eq!(selector.index(), 2);
        assert!(!selector.select("lomo"));
    }
}
