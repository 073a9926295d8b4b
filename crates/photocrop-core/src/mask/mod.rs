//! Masks applied on top of the drawn image.
//!
//! Currently this is the vignette, a radial darkening clipped to the crop
//! shape. The crop clip itself lives on [`CropFrame`](crate::frame::CropFrame).
//!
//! Mask values are evaluated per pixel. Falloffs use the smootherstep
//! function for transitions without visible banding.

pub mod vignette;

pub use vignette::Vignette;

/// Smootherstep interpolation function.
///
/// Returns values from 0.0 to 1.0 with zero velocity and acceleration at boundaries.
///
/// Formula: `6t^5 - 15t^4 + 10t^3`
#[inline]
pub fn smootherstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smootherstep_boundaries() {
        assert!((smootherstep(0.0) - 0.0).abs() < f32::EPSILON);
        assert!((smootherstep(1.0) - 1.0).abs() < f32::EPSILON);
        assert!((smootherstep(0.5) - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_smootherstep_clamping() {
        assert_eq!(smootherstep(-2.0), 0.0);
        assert_eq!(smootherstep(7.0), 1.0);
    }

    #[test]
    fn test_smootherstep_symmetry() {
        let a = smootherstep(0.2);
        let b = smootherstep(0.8);
        assert!((a + b - 1.0).abs() < 1e-6);
    }
}
