// SPDX-License-Identifier: GPL-3.0-only

//! Software filter primitives
//!
//! Each primitive is a color matrix from the W3C Filter Effects definitions
//! for the CSS shorthand functions, applied per pixel in sRGB space. Results
//! are clamped to [0, 1] after every primitive, as a browser does.
//!
//! A [`FilterChain`] has a textual form, e.g. `grayscale(1) contrast(1.1)`,
//! that round-trips through `Display` and `FromStr`.

use image::RgbaImage;
use std::fmt;
use std::str::FromStr;

/// A single filter primitive
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterOp {
    /// Amount in [0, 1]
    Grayscale(f32),
    /// Amount in [0, 1]
    Sepia(f32),
    /// Linear multiplier, 1 = identity
    Brightness(f32),
    /// Contrast around mid-gray, 1 = identity
    Contrast(f32),
    /// Saturation, 1 = identity
    Saturate(f32),
    /// Rotation in degrees
    HueRotate(f32),
}

impl FilterOp {
    /// Function name in the textual form
    pub fn name(&self) -> &'static str {
        match self {
            FilterOp::Grayscale(_) => "grayscale",
            FilterOp::Sepia(_) => "sepia",
            FilterOp::Brightness(_) => "brightness",
            FilterOp::Contrast(_) => "contrast",
            FilterOp::Saturate(_) => "saturate",
            FilterOp::HueRotate(_) => "hue-rotate",
        }
    }

    /// True if applying this primitive leaves every pixel unchanged
    pub fn is_identity(&self) -> bool {
        match *self {
            FilterOp::Grayscale(a) | FilterOp::Sepia(a) => a <= 0.0,
            FilterOp::Brightness(a) | FilterOp::Contrast(a) | FilterOp::Saturate(a) => a == 1.0,
            FilterOp::HueRotate(deg) => deg.rem_euclid(360.0) == 0.0,
        }
    }

    /// Affine transform as a 3x3 matrix plus offset
    fn transform(&self) -> ([[f32; 3]; 3], f32) {
        match *self {
            FilterOp::Grayscale(amount) => {
                let s = 1.0 - amount.clamp(0.0, 1.0);
                (
                    [
                        [0.2126 + 0.7874 * s, 0.7152 - 0.7152 * s, 0.0722 - 0.0722 * s],
                        [0.2126 - 0.2126 * s, 0.7152 + 0.2848 * s, 0.0722 - 0.0722 * s],
                        [0.2126 - 0.2126 * s, 0.7152 - 0.7152 * s, 0.0722 + 0.9278 * s],
                    ],
                    0.0,
                )
            }
            FilterOp::Sepia(amount) => {
                let s = 1.0 - amount.clamp(0.0, 1.0);
                (
                    [
                        [0.393 + 0.607 * s, 0.769 - 0.769 * s, 0.189 - 0.189 * s],
                        [0.349 - 0.349 * s, 0.686 + 0.314 * s, 0.168 - 0.168 * s],
                        [0.272 - 0.272 * s, 0.534 - 0.534 * s, 0.131 + 0.869 * s],
                    ],
                    0.0,
                )
            }
            FilterOp::Brightness(a) => {
                let a = a.max(0.0);
                ([[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]], 0.0)
            }
            FilterOp::Contrast(a) => {
                let a = a.max(0.0);
                (
                    [[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]],
                    0.5 - 0.5 * a,
                )
            }
            FilterOp::Saturate(s) => {
                let s = s.max(0.0);
                (
                    [
                        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
                        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
                        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
                    ],
                    0.0,
                )
            }
            FilterOp::HueRotate(deg) => {
                let (sin, cos) = deg.to_radians().sin_cos();
                (
                    [
                        [
                            0.213 + cos * 0.787 - sin * 0.213,
                            0.715 - cos * 0.715 - sin * 0.715,
                            0.072 - cos * 0.072 + sin * 0.928,
                        ],
                        [
                            0.213 - cos * 0.213 + sin * 0.143,
                            0.715 + cos * 0.285 + sin * 0.140,
                            0.072 - cos * 0.072 - sin * 0.283,
                        ],
                        [
                            0.213 - cos * 0.213 - sin * 0.787,
                            0.715 - cos * 0.715 + sin * 0.715,
                            0.072 + cos * 0.928 + sin * 0.072,
                        ],
                    ],
                    0.0,
                )
            }
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            FilterOp::HueRotate(deg) => write!(f, "hue-rotate({}deg)", deg),
            FilterOp::Grayscale(v)
            | FilterOp::Sepia(v)
            | FilterOp::Brightness(v)
            | FilterOp::Contrast(v)
            | FilterOp::Saturate(v) => write!(f, "{}({})", self.name(), v),
        }
    }
}

/// Errors from parsing a filter chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterParseError {
    /// Function name not recognised
    UnknownFunction(String),
    /// Argument is not a valid number, percentage or angle
    InvalidArgument { function: String, argument: String },
    /// Malformed text (missing parenthesis, stray characters)
    Syntax(String),
}

impl fmt::Display for FilterParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterParseError::UnknownFunction(name) => write!(f, "unknown filter '{}'", name),
            FilterParseError::InvalidArgument { function, argument } => {
                write!(f, "invalid argument '{}' for {}()", argument, function)
            }
            FilterParseError::Syntax(msg) => write!(f, "syntax error: {}", msg),
        }
    }
}

impl std::error::Error for FilterParseError {}

/// Ordered list of primitives applied one after another
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterChain {
    ops: Vec<FilterOp>,
}

impl FilterChain {
    pub fn new(ops: Vec<FilterOp>) -> Self {
        Self { ops }
    }

    /// Chain that changes nothing
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[FilterOp] {
        &self.ops
    }

    pub fn is_identity(&self) -> bool {
        self.ops.iter().all(FilterOp::is_identity)
    }

    /// Apply the chain to one RGB pixel
    pub fn apply_pixel(&self, rgb: [u8; 3]) -> [u8; 3] {
        let mut c = rgb.map(|v| v as f32 / 255.0);
        for op in &self.ops {
            let (m, offset) = op.transform();
            c = [
                (m[0][0] * c[0] + m[0][1] * c[1] + m[0][2] * c[2] + offset).clamp(0.0, 1.0),
                (m[1][0] * c[0] + m[1][1] * c[1] + m[1][2] * c[2] + offset).clamp(0.0, 1.0),
                (m[2][0] * c[0] + m[2][1] * c[1] + m[2][2] * c[2] + offset).clamp(0.0, 1.0),
            ];
        }
        c.map(|v| (v * 255.0).round() as u8)
    }

    /// Filter an RGBA raster in place. Alpha is left untouched.
    pub fn apply(&self, image: &mut RgbaImage) {
        let ops: Vec<FilterOp> = self
            .ops
            .iter()
            .copied()
            .filter(|op| !op.is_identity())
            .collect();
        if ops.is_empty() {
            return;
        }
        let active = FilterChain { ops };
        for px in image.pixels_mut() {
            let [r, g, b] = active.apply_pixel([px[0], px[1], px[2]]);
            px[0] = r;
            px[1] = g;
            px[2] = b;
        }
    }
}

impl fmt::Display for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ops.is_empty() {
            return write!(f, "none");
        }
        for (i, op) in self.ops.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", op)?;
        }
        Ok(())
    }
}

impl FromStr for FilterChain {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rest = s.trim();
        if rest.is_empty() || rest == "none" {
            return Ok(Self::identity());
        }

        let mut ops = Vec::new();
        while !rest.is_empty() {
            let open = rest
                .find('(')
                .ok_or_else(|| FilterParseError::Syntax(format!("expected '(' in '{}'", rest)))?;
            let close = rest
                .find(')')
                .ok_or_else(|| FilterParseError::Syntax(format!("missing ')' in '{}'", rest)))?;
            if close < open {
                return Err(FilterParseError::Syntax(format!("unbalanced ')' in '{}'", rest)));
            }

            let name = rest[..open].trim();
            let argument = rest[open + 1..close].trim();
            ops.push(parse_op(name, argument)?);
            rest = rest[close + 1..].trim_start();
        }
        Ok(Self { ops })
    }
}

fn parse_op(name: &str, argument: &str) -> Result<FilterOp, FilterParseError> {
    let invalid = || FilterParseError::InvalidArgument {
        function: name.to_string(),
        argument: argument.to_string(),
    };

    if name == "hue-rotate" {
        let deg = parse_angle(argument).ok_or_else(invalid)?;
        return Ok(FilterOp::HueRotate(deg));
    }

    let amount = parse_amount(argument).ok_or_else(invalid)?;
    if amount < 0.0 {
        return Err(invalid());
    }
    match name {
        "grayscale" => Ok(FilterOp::Grayscale(amount)),
        "sepia" => Ok(FilterOp::Sepia(amount)),
        "brightness" => Ok(FilterOp::Brightness(amount)),
        "contrast" => Ok(FilterOp::Contrast(amount)),
        "saturate" => Ok(FilterOp::Saturate(amount)),
        _ => Err(FilterParseError::UnknownFunction(name.to_string())),
    }
}

/// Number or percentage
fn parse_amount(s: &str) -> Option<f32> {
    match s.strip_suffix('%') {
        Some(pct) => pct.trim().parse::<f32>().ok().map(|v| v / 100.0),
        None => s.parse::<f32>().ok(),
    }
    .filter(|v| v.is_finite())
}

/// Angle in degrees; accepts `deg`, `rad`, `turn` and a bare zero
fn parse_angle(s: &str) -> Option<f32> {
    let deg = if let Some(v) = s.strip_suffix("deg") {
        v.trim().parse::<f32>().ok()
    } else if let Some(v) = s.strip_suffix("rad") {
        v.trim().parse::<f32>().ok().map(f32::to_degrees)
    } else if let Some(v) = s.strip_suffix("turn") {
        v.trim().parse::<f32>().ok().map(|t| t * 360.0)
    } else {
        s.parse::<f32>().ok().filter(|v| *v == 0.0)
    };
    deg.filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_text_round_trip() {
        let chain: FilterChain = "sepia(0.6) brightness(1.05) contrast(0.9) hue-rotate(-10deg)"
            .parse()
            .unwrap();
        assert_eq!(chain.ops().len(), 4);
        assert_eq!(chain.ops()[3], FilterOp::HueRotate(-10.0));
        let reparsed: FilterChain = chain.to_string().parse().unwrap();
        assert_eq!(reparsed, chain);
    }

    #[test]
    fn test_percentages_and_units() {
        let chain: FilterChain = "grayscale(100%) hue-rotate(0.5turn)".parse().unwrap();
        assert_eq!(
            chain.ops(),
            &[FilterOp::Grayscale(1.0), FilterOp::HueRotate(180.0)]
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "blur(2px)".parse::<FilterChain>(),
            Err(FilterParseError::UnknownFunction(_))
        ));
        assert!(matches!(
            "contrast(abc)".parse::<FilterChain>(),
            Err(FilterParseError::InvalidArgument { .. })
        ));
        assert!(matches!(
            "contrast(1.2".parse::<FilterChain>(),
            Err(FilterParseError::Syntax(_))
        ));
        assert!(matches!(
            "hue-rotate(10)".parse::<FilterChain>(),
            Err(FilterParseError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_none_is_identity() {
        let chain: FilterChain = "none".parse().unwrap();
        assert!(chain.is_identity());
        assert_eq!(chain.to_string(), "none");
    }

    #[test]
    fn test_grayscale_equalizes_channels() {
        let chain = FilterChain::new(vec![FilterOp::Grayscale(1.0)]);
        let [r, g, b] = chain.apply_pixel([200, 40, 90]);
        assert_eq!(r, g);
        assert_eq!(g, b);
    }

    #[test]
    fn test_contrast_zero_is_mid_gray() {
        let chain = FilterChain::new(vec![FilterOp::Contrast(0.0)]);
        assert_eq!(chain.apply_pixel([0, 255, 30]), [128, 128, 128]);
    }

    #[test]
    fn test_brightness_clamps() {
        let chain = FilterChain::new(vec![FilterOp::Brightness(2.0)]);
        assert_eq!(chain.apply_pixel([200, 100, 0]), [255, 200, 0]);
    }

    #[test]
    fn test_apply_keeps_alpha() {
        let mut image = RgbaImage::from_pixel(2, 2, Rgba([10, 200, 30, 77]));
        FilterChain::new(vec![FilterOp::Sepia(1.0)]).apply(&mut image);
        assert_eq!(image.get_pixel(1, 1)[3], 77);
        assert_ne!(image.get_pixel(1, 1)[1], 200);
    }

    #[test]
    fn test_full_hue_turn_is_identity() {
        assert!(FilterOp::HueRotate(360.0).is_identity());
        assert!(!FilterOp::HueRotate(-10.0).is_identity());
    }
}
