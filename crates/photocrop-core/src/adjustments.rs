//! Colour filter algorithms and presets.
//!
//! The editor exposes the three CSS filter functions a canvas `filter`
//! string would carry, evaluated in the same order:
//!
//! 1. `brightness(b)`
//! 2. `contrast(c)`
//! 3. `saturate(s)`
//!
//! Each step clamps to the displayable range before the next, like the
//! browser's filter chain.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Adjustments;

/// Apply brightness, contrast and saturation to one RGB sample (0-255 floats).
///
/// # Example
/// ```
/// use photocrop_core::{Adjustments, adjustments::apply_filters};
///
/// let mut adj = Adjustments::default();
/// adj.brightness = 0.5;
/// let out = apply_filters([200.0, 100.0, 50.0], &adj);
/// // Roughly [100.0, 50.0, 25.0]
/// ```
#[inline]
pub fn apply_filters(rgb: [f32; 3], adjustments: &Adjustments) -> [f32; 3] {
    let mut r = rgb[0] / 255.0;
    let mut g = rgb[1] / 255.0;
    let mut b = rgb[2] / 255.0;

    (r, g, b) = apply_brightness(r, g, b, adjustments.brightness);
    (r, g, b) = apply_contrast(r, g, b, adjustments.contrast);
    (r, g, b) = apply_saturation(r, g, b, adjustments.saturation);

    [r * 255.0, g * 255.0, b * 255.0]
}

#[inline]
fn clamp3(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    (r.clamp(0.0, 1.0), g.clamp(0.0, 1.0), b.clamp(0.0, 1.0))
}

/// `brightness(b)`: linear multiplier, 1.0 is identity.
#[inline]
fn apply_brightness(r: f32, g: f32, b: f32, amount: f32) -> (f32, f32, f32) {
    if amount == 1.0 {
        return (r, g, b);
    }
    clamp3(r * amount, g * amount, b * amount)
}

/// `contrast(c)`: scale around mid-grey, 1.0 is identity, 0.0 is flat grey.
///
/// Formula: `output = (input - 0.5) * c + 0.5`
#[inline]
fn apply_contrast(r: f32, g: f32, b: f32, amount: f32) -> (f32, f32, f32) {
    if amount == 1.0 {
        return (r, g, b);
    }
    let mid = 0.5;
    clamp3(
        (r - mid) * amount + mid,
        (g - mid) * amount + mid,
        (b - mid) * amount + mid,
    )
}

/// `saturate(s)`: the Filter Effects saturate matrix. 0.0 is greyscale.
#[inline]
fn apply_saturation(r: f32, g: f32, b: f32, s: f32) -> (f32, f32, f32) {
    if s == 1.0 {
        return (r, g, b);
    }
    clamp3(
        (0.213 + 0.787 * s) * r + (0.715 - 0.715 * s) * g + (0.072 - 0.072 * s) * b,
        (0.213 - 0.213 * s) * r + (0.715 + 0.285 * s) * g + (0.072 - 0.072 * s) * b,
        (0.213 - 0.213 * s) * r + (0.715 - 0.715 * s) * g + (0.072 + 0.928 * s) * b,
    )
}

/// A named brightness/contrast/saturation tuple applied in one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterPreset {
    #[default]
    Original,
    Vivid,
    Bright,
    Muted,
    Dramatic,
    Mono,
}

impl FilterPreset {
    /// All presets in display order.
    pub const ALL: [FilterPreset; 6] = [
        FilterPreset::Original,
        FilterPreset::Vivid,
        FilterPreset::Bright,
        FilterPreset::Muted,
        FilterPreset::Dramatic,
        FilterPreset::Mono,
    ];

    /// `(brightness, contrast, saturation)` for this preset.
    pub fn values(self) -> (f32, f32, f32) {
        match self {
            FilterPreset::Original => (1.0, 1.0, 1.0),
            FilterPreset::Vivid => (1.05, 1.1, 1.35),
            FilterPreset::Bright => (1.15, 1.0, 1.1),
            FilterPreset::Muted => (1.0, 0.9, 0.7),
            FilterPreset::Dramatic => (0.95, 1.35, 1.1),
            FilterPreset::Mono => (1.0, 1.1, 0.0),
        }
    }

    /// Kebab-case identifier used by the UI.
    pub fn name(self) -> &'static str {
        match self {
            FilterPreset::Original => "original",
            FilterPreset::Vivid => "vivid",
            FilterPreset::Bright => "bright",
            FilterPreset::Muted => "muted",
            FilterPreset::Dramatic => "dramatic",
            FilterPreset::Mono => "mono",
        }
    }
}

impl fmt::Display for FilterPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown preset name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown filter preset: {0}")]
pub struct UnknownPreset(pub String);

impl FromStr for FilterPreset {
    type Err = UnknownPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterPreset::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownPreset(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adj(brightness: f32, contrast: f32, saturation: f32) -> Adjustments {
        Adjustments {
            brightness,
            contrast,
            saturation,
            ..Adjustments::default()
        }
    }

    fn apply(rgb: [u8; 3], a: &Adjustments) -> [u8; 3] {
        apply_filters(rgb.map(f32::from), a).map(|v| v.round().clamp(0.0, 255.0) as u8)
    }

    // ===== Identity =====

    #[test]
    fn test_identity() {
        let a = Adjustments::default();
        assert_eq!(apply([128, 64, 192], &a), [128, 64, 192]);
        assert_eq!(apply([0, 0, 0], &a), [0, 0, 0]);
        assert_eq!(apply([255, 255, 255], &a), [255, 255, 255]);
    }

    // ===== Brightness =====

    #[test]
    fn test_brightness_doubles() {
        assert_eq!(apply([50, 60, 70], &adj(2.0, 1.0, 1.0)), [100, 120, 140]);
    }

    #[test]
    fn test_brightness_clips() {
        assert_eq!(apply([200, 10, 10], &adj(2.0, 1.0, 1.0)), [255, 20, 20]);
    }

    #[test]
    fn test_brightness_zero_is_black() {
        assert_eq!(apply([200, 100, 50], &adj(0.0, 1.0, 1.0)), [0, 0, 0]);
    }

    // ===== Contrast =====

    #[test]
    fn test_contrast_zero_is_grey() {
        let out = apply([0, 90, 255], &adj(1.0, 0.0, 1.0));
        for c in out {
            assert!((c as i32 - 128).abs() <= 1, "got {:?}", out);
        }
    }

    #[test]
    fn test_contrast_increase_spreads() {
        let out = apply([64, 128, 192], &adj(1.0, 2.0, 1.0));
        assert!(out[0] < 64);
        assert!((out[1] as i32 - 128).abs() <= 2);
        assert_eq!(out[2], 255);
    }

    // ===== Saturation =====

    #[test]
    fn test_saturation_zero_is_greyscale() {
        let out = apply([200, 100, 30], &adj(1.0, 1.0, 0.0));
        assert!((out[0] as i32 - out[1] as i32).abs() <= 1);
        assert!((out[1] as i32 - out[2] as i32).abs() <= 1);
    }

    #[test]
    fn test_saturation_keeps_grey() {
        assert_eq!(apply([120, 120, 120], &adj(1.0, 1.0, 1.8)), [120, 120, 120]);
    }

    #[test]
    fn test_saturation_boost_spreads_channels() {
        let out = apply([180, 120, 100], &adj(1.0, 1.0, 1.5));
        assert!(out[0] as i32 - out[2] as i32 > 80);
    }

    // ===== Chain =====

    #[test]
    fn test_output_stays_fractional() {
        let out = apply_filters([101.0, 0.0, 255.0], &adj(0.5, 1.0, 1.0));
        assert!((out[0] - 50.5).abs() < 1e-3, "got {:?}", out);
        assert!((out[2] - 127.5).abs() < 1e-3, "got {:?}", out);
    }

    #[test]
    fn test_brightness_clips_before_contrast() {
        // 200 * 2 clips to white first, so contrast 0.5 pulls 255 down, not 400.
        let out = apply([200, 200, 200], &adj(2.0, 0.5, 1.0));
        assert_eq!(out, [191, 191, 191]);
    }

    // ===== Presets =====

    #[test]
    fn test_preset_roundtrip_names() {
        for preset in FilterPreset::ALL {
            assert_eq!(preset.name().parse::<FilterPreset>().unwrap(), preset);
            assert_eq!(preset.to_string(), preset.name());
        }
    }

    #[test]
    fn test_preset_parse_case_insensitive() {
        assert_eq!(" Vivid ".parse::<FilterPreset>(), Ok(FilterPreset::Vivid));
        assert_eq!(
            "sepia".parse::<FilterPreset>(),
            Err(UnknownPreset("sepia".into()))
        );
    }

    #[test]
    fn test_original_preset_is_neutral() {
        assert_eq!(FilterPreset::Original.values(), (1.0, 1.0, 1.0));
        assert_eq!(FilterPreset::default(), FilterPreset::Original);
    }

    #[test]
    fn test_preset_serde_names() {
        let json = serde_json::to_string(&FilterPreset::Dramatic).unwrap();
        assert_eq!(json, "\"dramatic\"");
    }
}
