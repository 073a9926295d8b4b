//! Editor configuration.
//!
//! Every field has a default, so hosts only pass what they want to change:
//!
//! ```json
//! { "maxFileSize": 2097152, "jpegQuality": 85 }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::encode::DEFAULT_JPEG_QUALITY;
use crate::frame::DEFAULT_FRAME_FILL;

/// Errors from loading or validating an [`EditorConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid range for {field}: min {min} must be below max {max}")]
    InvertedRange {
        field: &'static str,
        min: f64,
        max: f64,
    },

    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("straightenLimit must be zero or more, got {0}")]
    StraightenLimit(f64),

    #[error("frameFill must be in (0, 1], got {0}")]
    FrameFill(f64),
}

/// Tunables for one editor instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Largest accepted upload in bytes.
    pub max_file_size: u64,
    /// Same-origin endpoint that streams back off-origin images.
    pub proxy_endpoint: String,
    pub min_scale: f64,
    pub max_scale: f64,
    /// Scale change per wheel tick.
    pub wheel_step: f64,
    /// Straighten slider range in degrees, symmetric around zero.
    pub straighten_limit: f64,
    /// Lower bound for brightness/contrast/saturation.
    pub adjustment_min: f32,
    /// Upper bound for brightness/contrast/saturation.
    pub adjustment_max: f32,
    /// Fraction of the limiting viewport dimension the crop frame fills.
    pub frame_fill: f64,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Fill colour wherever the image does not reach.
    pub background: [u8; 3],
    /// Opacity of the black overlay outside the crop region.
    pub overlay_opacity: f32,
    pub stroke_color: [u8; 3],
    pub stroke_width: f64,
    pub jpeg_quality: u8,
    /// Fill outside a circular crop with the background in the exported file.
    pub clip_export_to_shape: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_file_size: 5 * 1024 * 1024,
            proxy_endpoint: "/api/proxy-image".to_string(),
            min_scale: 0.1,
            max_scale: 10.0,
            wheel_step: 0.05,
            straighten_limit: 30.0,
            adjustment_min: 0.0,
            adjustment_max: 2.0,
            frame_fill: DEFAULT_FRAME_FILL,
            viewport_width: 600,
            viewport_height: 400,
            background: [24, 24, 27],
            overlay_opacity: 0.55,
            stroke_color: [255, 255, 255],
            stroke_width: 2.0,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            clip_export_to_shape: false,
        }
    }
}

impl EditorConfig {
    /// Parse a (possibly partial) JSON config and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check ranges that would otherwise produce degenerate renders.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bounds = [
            ("minScale", self.min_scale),
            ("maxScale", self.max_scale),
            ("wheelStep", self.wheel_step),
            ("straightenLimit", self.straighten_limit),
            ("adjustmentMin", self.adjustment_min as f64),
            ("adjustmentMax", self.adjustment_max as f64),
            ("frameFill", self.frame_fill),
        ];
        // NaN passes every comparison below, and the clamp helpers panic on it.
        if let Some(&(field, value)) = bounds.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::NotFinite { field, value });
        }
        if self.min_scale <= 0.0 {
            return Err(ConfigError::NotPositive {
                field: "minScale",
                value: self.min_scale,
            });
        }
        if self.min_scale >= self.max_scale {
            return Err(ConfigError::InvertedRange {
                field: "scale",
                min: self.min_scale,
                max: self.max_scale,
            });
        }
        if self.adjustment_min >= self.adjustment_max {
            return Err(ConfigError::InvertedRange {
                field: "adjustment",
                min: self.adjustment_min as f64,
                max: self.adjustment_max as f64,
            });
        }
        if self.wheel_step <= 0.0 {
            return Err(ConfigError::NotPositive {
                field: "wheelStep",
                value: self.wheel_step,
            });
        }
        if self.viewport_width == 0 || self.viewport_height == 0 {
            return Err(ConfigError::NotPositive {
                field: "viewport",
                value: self.viewport_width.min(self.viewport_height) as f64,
            });
        }
        if !(self.frame_fill > 0.0 && self.frame_fill <= 1.0) {
            return Err(ConfigError::FrameFill(self.frame_fill));
        }
        if self.straighten_limit < 0.0 {
            return Err(ConfigError::StraightenLimit(self.straighten_limit));
        }
        Ok(())
    }

    /// Clamp a scale into the configured zoom range.
    pub fn clamp_scale(&self, scale: f64) -> f64 {
        scale.clamp(self.min_scale, self.max_scale)
    }

    /// Clamp a brightness/contrast/saturation value.
    pub fn clamp_adjustment(&self, value: f32) -> f32 {
        value.clamp(self.adjustment_min, self.adjustment_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EditorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_file_size, 5 * 1024 * 1024);
        assert_eq!(config.proxy_endpoint, "/api/proxy-image");
        assert_eq!(config.jpeg_quality, 92);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            EditorConfig::from_json(r#"{ "maxFileSize": 1024, "wheelStep": 0.1 }"#).unwrap();
        assert_eq!(config.max_file_size, 1024);
        assert_eq!(config.wheel_step, 0.1);
        assert_eq!(config.max_scale, 10.0);
    }

    #[test]
    fn test_empty_json() {
        assert_eq!(EditorConfig::from_json("{}").unwrap(), EditorConfig::default());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            EditorConfig::from_json("{ nope"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_inverted_scale_range() {
        let result = EditorConfig::from_json(r#"{ "minScale": 5, "maxScale": 2 }"#);
        assert!(matches!(
            result,
            Err(ConfigError::InvertedRange { field: "scale", .. })
        ));
    }

    #[test]
    fn test_zero_viewport_rejected() {
        let mut config = EditorConfig::default();
        config.viewport_height = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive { field: "viewport", .. })
        ));
    }

    #[test]
    fn test_frame_fill_bounds() {
        let mut config = EditorConfig::default();
        config.frame_fill = 1.2;
        assert!(matches!(config.validate(), Err(ConfigError::FrameFill(_))));
        config.frame_fill = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_negative_straighten_limit_rejected() {
        let result = EditorConfig::from_json(r#"{ "straightenLimit": -5 }"#);
        assert!(matches!(result, Err(ConfigError::StraightenLimit(v)) if v == -5.0));
        assert!(EditorConfig::from_json(r#"{ "straightenLimit": 0 }"#).is_ok());
    }

    #[test]
    fn test_non_finite_bounds_rejected() {
        let mut config = EditorConfig::default();
        config.min_scale = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotFinite { field: "minScale", .. })
        ));

        let mut config = EditorConfig::default();
        config.max_scale = f64::INFINITY;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotFinite { field: "maxScale", .. })
        ));

        let mut config = EditorConfig::default();
        config.adjustment_max = f32::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotFinite { field: "adjustmentMax", .. })
        ));

        let mut config = EditorConfig::default();
        config.straighten_limit = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotFinite { field: "straightenLimit", .. })
        ));
    }

    #[test]
    fn test_clamp_helpers() {
        let config = EditorConfig::default();
        assert_eq!(config.clamp_scale(0.0), 0.1);
        assert_eq!(config.clamp_scale(42.0), 10.0);
        assert_eq!(config.clamp_adjustment(-1.0), 0.0);
        assert_eq!(config.clamp_adjustment(1.3), 1.3);
    }
}
