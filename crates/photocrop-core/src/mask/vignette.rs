//! Radial vignette darkening.
//!
//! The vignette is an elliptical gradient centred on the crop frame. Inside
//! the inner radius nothing changes; toward the outer edge pixels are pulled
//! toward black by up to `strength`, with a smootherstep falloff so there is
//! no visible ring.

use super::smootherstep;
use crate::frame::CropFrame;
use crate::target::CropShape;

/// Fraction of the radius over which the darkening ramps in.
pub const VIGNETTE_FEATHER: f32 = 0.65;

/// Elliptical vignette over a crop frame.
///
/// # Example
/// ```
/// use photocrop_core::mask::Vignette;
///
/// let v = Vignette::new((50.0, 50.0), (50.0, 50.0), 0.8);
/// assert_eq!(v.factor(50.0, 50.0), 1.0);
/// assert!(v.factor(100.0, 50.0) < 0.25);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vignette {
    center: (f64, f64),
    radius: (f64, f64),
    feather: f32,
    strength: f32,
}

impl Vignette {
    /// Create a vignette with explicit centre and radii (pixels).
    pub fn new(center: (f64, f64), radius: (f64, f64), strength: f32) -> Self {
        Self {
            center,
            radius: (radius.0.max(0.001), radius.1.max(0.001)),
            feather: VIGNETTE_FEATHER,
            strength: strength.clamp(0.0, 1.0),
        }
    }

    /// Fit a vignette to a crop frame.
    ///
    /// Circles get a circular falloff that reaches full strength at the rim.
    /// Rectangles get an ellipse through their corners so the darkest point
    /// is each corner rather than the mid-edges.
    pub fn for_frame(frame: &CropFrame, strength: f32) -> Self {
        let (cx, cy) = frame.center();
        let (rx, ry) = (frame.width / 2.0, frame.height / 2.0);
        let radius = match frame.shape {
            CropShape::Circle => (rx, ry),
            CropShape::Rectangle => (rx * std::f64::consts::SQRT_2, ry * std::f64::consts::SQRT_2),
        };
        Self::new((cx, cy), radius, strength)
    }

    /// True when the vignette has no visible effect.
    pub fn is_noop(&self) -> bool {
        self.strength <= 0.0
    }

    /// Multiplier to apply to a pixel at `(x, y)`: 1.0 untouched, lower is darker.
    #[inline]
    pub fn factor(&self, x: f64, y: f64) -> f32 {
        if self.is_noop() {
            return 1.0;
        }
        let nx = (x - self.center.0) / self.radius.0;
        let ny = (y - self.center.1) / self.radius.1;
        let dist = (nx * nx + ny * ny).sqrt() as f32;

        let inner = 1.0 - self.feather;
        let edge = if dist <= inner {
            0.0
        } else if dist >= 1.0 {
            1.0
        } else {
            smootherstep((dist - inner) / self.feather.max(0.001))
        };
        1.0 - self.strength * edge
    }
}
