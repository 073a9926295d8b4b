//! PhotoCrop Core - crop/edit engine for profile and cover photos
//!
//! This crate holds everything the image cropper does that is not browser
//! plumbing: decoding, the pan/zoom/rotate placement, colour filters, the
//! vignette, a software renderer for the live preview and the export, JPEG
//! encoding, and the editor session that ties them together.

pub mod acquire;
pub mod adjustments;
pub mod config;
pub mod decode;
pub mod editor;
pub mod encode;
pub mod export;
pub mod frame;
pub mod mask;
pub mod render;
pub mod resources;
pub mod target;
pub mod transform;

pub use acquire::{AcquireError, FileOrigin, SelectedFile};
pub use adjustments::FilterPreset;
pub use config::{ConfigError, EditorConfig};
pub use decode::{Bitmap, DecodeError};
pub use editor::{CropEditor, EditorError, LoadOutcome, LoadTicket, OpenOptions, RemoteLoad};
pub use encode::EncodeError;
pub use export::{CroppedFile, ExportError, ExportOutcome};
pub use frame::CropFrame;
pub use resources::{PageScroll, ScrollGuard, ScrollLock, TempUrlStore};
pub use target::{CropShape, CropTarget, ImageKind, TargetError};

/// Pan, zoom and rotation of the source image.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TransformState {
    /// Source-to-canvas scale factor.
    pub scale: f64,
    /// Pan offset in canvas pixels.
    pub offset: (f64, f64),
    /// Total rotation in degrees (rotate actions and straightening combined).
    pub rotation: f64,
    /// Current straighten slider position in degrees.
    pub straighten: f64,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: (0.0, 0.0),
            rotation: 0.0,
            straighten: 0.0,
        }
    }
}

impl TransformState {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Colour adjustments applied while drawing.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Adjustments {
    /// Brightness multiplier (1.0 = unchanged)
    pub brightness: f32,
    /// Contrast multiplier (1.0 = unchanged)
    pub contrast: f32,
    /// Saturation multiplier (1.0 = unchanged, 0.0 = greyscale)
    pub saturation: f32,
    /// Vignette strength (0.0 to 1.0)
    pub vignette: f32,
    /// Last preset picked, for highlighting in the UI
    pub active_preset: FilterPreset,
}

impl Default for Adjustments {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            contrast: 1.0,
            saturation: 1.0,
            vignette: 0.0,
            active_preset: FilterPreset::Original,
        }
    }
}

impl Adjustments {
    /// True if the colour filters leave pixels untouched. Ignores the vignette.
    pub fn is_neutral(&self) -> bool {
        self.brightness == 1.0 && self.contrast == 1.0 && self.saturation == 1.0
    }

    /// Check if all values are at their defaults
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Overwrite brightness/contrast/saturation with a preset's values.
    pub fn apply_preset(&mut self, preset: FilterPreset) {
        let (b, c, s) = preset.values();
        self.brightness = b;
        self.contrast = c;
        self.saturation = s;
        self.active_preset = preset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_default() {
        let t = TransformState::default();
        assert!(t.is_default());
        assert_eq!(t.scale, 1.0);
        assert_eq!(t.offset, (0.0, 0.0));
    }

    #[test]
    fn test_adjustments_default() {
        let adj = Adjustments::default();
        assert!(adj.is_default());
        assert!(adj.is_neutral());
        assert_eq!(adj.active_preset, FilterPreset::Original);
    }

    #[test]
    fn test_vignette_does_not_affect_neutral() {
        let mut adj = Adjustments::default();
        adj.vignette = 0.5;
        assert!(adj.is_neutral());
        assert!(!adj.is_default());
    }

    #[test]
    fn test_apply_preset() {
        let mut adj = Adjustments::default();
        adj.vignette = 0.3;
        adj.apply_preset(FilterPreset::Mono);
        assert_eq!(adj.saturation, 0.0);
        assert_eq!(adj.contrast, 1.1);
        assert_eq!(adj.active_preset, FilterPreset::Mono);
        assert_eq!(adj.vignette, 0.3, "presets leave the vignette alone");
    }
}
