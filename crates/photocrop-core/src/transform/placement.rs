//! Source-to-canvas placement of the image under pan, zoom and rotation.
//!
//! The forward transform mirrors the canvas call sequence
//! `translate(center) -> scale(s) -> rotate(θ) -> drawImage(-w/2, -h/2)`:
//!
//! ```text
//! canvas = center + s * R(θ) * (source - source_size / 2)
//! ```
//!
//! with `R(θ) = [[cos, -sin], [sin, cos]]` in y-down coordinates, so positive
//! angles turn the image clockwise on screen. The renderer uses the inverse to
//! find, for every output pixel, the source location that lands there.

/// A 2D point or vector in pixel space.
pub type Point = (f64, f64);

/// Where and how the source image is drawn on a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Surface position of the source image centre.
    pub center: Point,
    /// Uniform scale from source pixels to surface pixels. Always positive.
    pub scale: f64,
    /// Clockwise rotation in degrees.
    pub rotation_degrees: f64,
    /// Source image size in pixels.
    pub source_size: Point,
}

impl Placement {
    /// Build a placement; `scale` is floored to a tiny positive value so the
    /// inverse transform never divides by zero.
    pub fn new(center: Point, scale: f64, rotation_degrees: f64, source_size: Point) -> Self {
        Self {
            center,
            scale: scale.max(f64::EPSILON),
            rotation_degrees,
            source_size,
        }
    }

    #[inline]
    fn sin_cos(&self) -> (f64, f64) {
        self.rotation_degrees.to_radians().sin_cos()
    }

    /// Map surface coordinates back into source pixel space, with the trig
    /// and scale folded together for per-pixel loops.
    pub fn inverse(&self) -> InverseMap {
        let (sin, cos) = self.sin_cos();
        let inv = 1.0 / self.scale;
        InverseMap {
            center: self.center,
            half: (self.source_size.0 / 2.0, self.source_size.1 / 2.0),
            cos: cos * inv,
            sin: sin * inv,
        }
    }
}

/// Inverse transform with the trig and scale already folded together.
#[derive(Debug, Clone, Copy)]
pub struct InverseMap {
    center: Point,
    half: Point,
    cos: f64,
    sin: f64,
}

impl InverseMap {
    #[inline]
    pub fn apply(&self, x: f64, y: f64) -> Point {
        let dx = x - self.center.0;
        let dy = y - self.center.1;
        (
            dx * self.cos + dy * self.sin + self.half.0,
            -dx * self.sin + dy * self.cos + self.half.1,
        )
    }
}
