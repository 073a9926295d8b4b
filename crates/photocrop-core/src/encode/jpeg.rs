//! JPEG encoding for the export step.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};
use thiserror::Error;

use crate::decode::Bitmap;

/// Quality used for cropped uploads unless the config overrides it.
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Errors that can occur during JPEG encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel buffer length doesn't match the bitmap dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The encoder itself failed
    #[error("JPEG encoding failed: {0}")]
    EncodingFailed(String),
}

/// Encode a bitmap as baseline JPEG.
///
/// `quality` is clamped to 1-100. The crop editor exports at
/// [`DEFAULT_JPEG_QUALITY`], matching the `0.92` a browser canvas would use.
pub fn encode_jpeg(bitmap: &Bitmap, quality: u8) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = (bitmap.width, bitmap.height);
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected = width as usize * height as usize * 3;
    if bitmap.pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: bitmap.pixels.len(),
        });
    }

    let mut buffer = Cursor::new(Vec::with_capacity(expected / 8));
    JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
        .write_image(&bitmap.pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_jpeg_markers() {
        let bmp = Bitmap::filled(64, 32, [128, 90, 40]);
        let jpeg = encode_jpeg(&bmp, DEFAULT_JPEG_QUALITY).unwrap();

        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
        assert_eq!(&jpeg[jpeg.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_encode_jpeg_roundtrip_dimensions() {
        let bmp = Bitmap::filled(160, 40, [10, 200, 30]);
        let jpeg = encode_jpeg(&bmp, 92).unwrap();

        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (160, 40));
    }

    #[test]
    fn test_encode_jpeg_quality_clamping() {
        let bmp = Bitmap::filled(8, 8, [0, 0, 0]);
        assert!(encode_jpeg(&bmp, 0).is_ok());
        assert!(encode_jpeg(&bmp, 255).is_ok());
    }

    #[test]
    fn test_encode_jpeg_zero_dimensions() {
        let bmp = Bitmap {
            width: 0,
            height: 10,
            pixels: vec![],
        };
        assert!(matches!(
            encode_jpeg(&bmp, 90),
            Err(EncodeError::InvalidDimensions { width: 0, height: 10 })
        ));
    }

    #[test]
    fn test_encode_jpeg_buffer_mismatch() {
        let bmp = Bitmap {
            width: 10,
            height: 10,
            pixels: vec![0; 12],
        };
        match encode_jpeg(&bmp, 90) {
            Err(EncodeError::InvalidPixelData { expected, actual }) => {
                assert_eq!(expected, 300);
                assert_eq!(actual, 12);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
