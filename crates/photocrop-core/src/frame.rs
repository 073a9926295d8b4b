//! On-screen crop frame geometry and scale factors.

use crate::target::{CropShape, CropTarget};

/// Fraction of the limiting viewport dimension the frame fills.
pub const DEFAULT_FRAME_FILL: f64 = 0.9;

/// The crop region as drawn on the viewport, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropFrame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub shape: CropShape,
}

impl CropFrame {
    /// Inscribe the target's aspect ratio in a `viewport` canvas, filling
    /// `fill` of whichever dimension limits it, centred.
    pub fn compute(viewport: (u32, u32), target: &CropTarget, fill: f64) -> Self {
        let (vw, vh) = (viewport.0 as f64, viewport.1 as f64);
        let aspect = target.aspect_ratio();

        let (width, height) = if vw / vh > aspect {
            // Viewport is wider than the target: height limits.
            let h = vh * fill;
            (h * aspect, h)
        } else {
            let w = vw * fill;
            (w, w / aspect)
        };

        Self {
            x: (vw - width) / 2.0,
            y: (vh - height) / 2.0,
            width,
            height,
            shape: target.shape,
        }
    }

    /// A frame covering a whole surface, used when rendering the export.
    pub fn full(width: u32, height: u32, shape: CropShape) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f64,
            height: height as f64,
            shape,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Corners of the bounding rectangle, clockwise from top-left.
    pub fn corners(&self) -> [(f64, f64); 4] {
        let (r, b) = (self.x + self.width, self.y + self.height);
        [(self.x, self.y), (r, self.y), (r, b), (self.x, b)]
    }

    /// Signed distance from `(px, py)` to the frame outline: negative inside.
    ///
    /// Circles use the inscribed circle of the bounding box. Rectangles use
    /// the box distance, which is exact inside and a good enough
    /// approximation outside for stroking.
    pub fn signed_distance(&self, px: f64, py: f64) -> f64 {
        let (cx, cy) = self.center();
        match self.shape {
            CropShape::Circle => {
                let r = self.width.min(self.height) / 2.0;
                ((px - cx).powi(2) + (py - cy).powi(2)).sqrt() - r
            }
            CropShape::Rectangle => {
                let dx = (px - cx).abs() - self.width / 2.0;
                let dy = (py - cy).abs() - self.height / 2.0;
                dx.max(dy)
            }
        }
    }

    /// True if the point is inside the crop shape.
    #[inline]
    pub fn contains(&self, px: f64, py: f64) -> bool {
        self.signed_distance(px, py) <= 0.0
    }

    /// Ratio between output pixels and on-screen frame pixels.
    pub fn export_scale(&self, target: &CropTarget) -> f64 {
        target.width as f64 / self.width.max(f64::EPSILON)
    }
}

/// Scale at which an image just covers the viewport, like CSS
/// `object-fit: cover`: the image's shorter side relative to the viewport
/// fills it exactly and the other side overflows.
pub fn cover_scale(image: (u32, u32), viewport: (u32, u32)) -> f64 {
    if image.0 == 0 || image.1 == 0 {
        return 1.0;
    }
    let sx = viewport.0 as f64 / image.0 as f64;
    let sy = viewport.1 as f64 / image.1 as f64;
    sx.max(sy)
}
