//! Pixel sampling for the inverse-mapped renderer.
//!
//! Coordinates are continuous source-space positions where `(0, 0)` is the
//! top-left corner of the first pixel and `(width, height)` the bottom-right
//! corner of the last, matching how a canvas places `drawImage` output.

use crate::decode::Bitmap;

/// Sample `image` at a continuous position with bilinear interpolation.
///
/// Returns `None` when the position lies outside the image rectangle, so the
/// caller can keep whatever background is already on the surface. Inside the
/// rectangle the four neighbours are clamped to the edge, which keeps borders
/// crisp instead of fading into black.
pub fn sample_bilinear(image: &Bitmap, x: f64, y: f64) -> Option<[f32; 3]> {
    let (w, h) = (image.width as f64, image.height as f64);
    if image.is_empty() || !(0.0..=w).contains(&x) || !(0.0..=h).contains(&y) {
        return None;
    }

    // Shift to pixel centres.
    let sx = (x - 0.5).clamp(0.0, w - 1.0);
    let sy = (y - 0.5).clamp(0.0, h - 1.0);

    let x0 = sx.floor() as u32;
    let y0 = sy.floor() as u32;
    let x1 = (x0 + 1).min(image.width - 1);
    let y1 = (y0 + 1).min(image.height - 1);

    let fx = (sx - x0 as f64) as f32;
    let fy = (sy - y0 as f64) as f32;

    let p00 = image.pixel(x0, y0);
    let p10 = image.pixel(x1, y0);
    let p01 = image.pixel(x0, y1);
    let p11 = image.pixel(x1, y1);

    let mut out = [0.0f32; 3];
    for (i, v) in out.iter_mut().enumerate() {
        *v = p00[i] as f32 * (1.0 - fx) * (1.0 - fy)
            + p10[i] as f32 * fx * (1.0 - fy)
            + p01[i] as f32 * (1.0 - fx) * fy
            + p11[i] as f32 * fx * fy;
    }
    Some(out)
}
