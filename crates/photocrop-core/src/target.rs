//! Crop target: the fixed output size and shape of one editing session.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors describing an unusable crop target.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    #[error("Target dimensions must be non-zero, got {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },

    #[error("Unknown image type: {0} (expected \"profile\" or \"cover\")")]
    UnknownKind(String),
}

/// What the image is for. Selects default dimensions and the mask shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Profile,
    Cover,
}

impl ImageKind {
    /// Default `(width, height)` of the exported file.
    pub fn default_size(self) -> (u32, u32) {
        match self {
            ImageKind::Profile => (512, 512),
            ImageKind::Cover => (1600, 400),
        }
    }

    /// Mask shape for this kind.
    pub fn shape(self) -> CropShape {
        match self {
            ImageKind::Profile => CropShape::Circle,
            ImageKind::Cover => CropShape::Rectangle,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ImageKind::Profile => "profile",
            ImageKind::Cover => "cover",
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageKind {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "profile" => Ok(ImageKind::Profile),
            "cover" => Ok(ImageKind::Cover),
            _ => Err(TargetError::UnknownKind(s.to_string())),
        }
    }
}

/// Shape of the crop region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropShape {
    /// Inscribed circle, used for profile photos.
    Circle,
    /// Full rectangle, used for cover images.
    Rectangle,
}

/// Output size and shape, fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropTarget {
    pub kind: ImageKind,
    pub width: u32,
    pub height: u32,
    pub shape: CropShape,
}

impl CropTarget {
    /// Target for `kind`, with optional explicit dimensions overriding the
    /// defaults. Each dimension falls back independently.
    pub fn new(
        kind: ImageKind,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<Self, TargetError> {
        let (default_w, default_h) = kind.default_size();
        let width = width.unwrap_or(default_w);
        let height = height.unwrap_or(default_h);
        if width == 0 || height == 0 {
            return Err(TargetError::ZeroDimension { width, height });
        }
        Ok(Self {
            kind,
            width,
            height,
            shape: kind.shape(),
        })
    }

    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Name of the exported file, e.g. `profile-image.jpg`.
    pub fn file_name(&self) -> String {
        format!("{}-image.jpg", self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_defaults() {
        let t = CropTarget::new(ImageKind::Profile, None, None).unwrap();
        assert_eq!((t.width, t.height), (512, 512));
        assert_eq!(t.shape, CropShape::Circle);
        assert_eq!(t.aspect_ratio(), 1.0);
        assert_eq!(t.file_name(), "profile-image.jpg");
    }

    #[test]
    fn test_cover_defaults() {
        let t = CropTarget::new(ImageKind::Cover, None, None).unwrap();
        assert_eq!((t.width, t.height), (1600, 400));
        assert_eq!(t.shape, CropShape::Rectangle);
        assert_eq!(t.aspect_ratio(), 4.0);
        assert_eq!(t.file_name(), "cover-image.jpg");
    }

    #[test]
    fn test_explicit_dimensions_override() {
        let t = CropTarget::new(ImageKind::Cover, Some(1200), Some(300)).unwrap();
        assert_eq!((t.width, t.height), (1200, 300));
        assert_eq!(t.shape, CropShape::Rectangle);

        let partial = CropTarget::new(ImageKind::Profile, Some(256), None).unwrap();
        assert_eq!((partial.width, partial.height), (256, 512));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert_eq!(
            CropTarget::new(ImageKind::Cover, Some(0), None),
            Err(TargetError::ZeroDimension {
                width: 0,
                height: 400
            })
        );
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("profile".parse::<ImageKind>(), Ok(ImageKind::Profile));
        assert_eq!(" COVER".parse::<ImageKind>(), Ok(ImageKind::Cover));
        assert!(matches!(
            "banner".parse::<ImageKind>(),
            Err(TargetError::UnknownKind(_))
        ));
    }
}
