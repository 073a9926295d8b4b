//! Image decoding with EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageReader};

use super::{Bitmap, DecodeError, Orientation};

/// Decode an encoded image (JPEG, PNG, WebP) into an upright RGB bitmap.
///
/// The format is sniffed from the bytes, not taken from the MIME type the
/// browser reported. EXIF orientation is applied so the returned dimensions
/// are the effective, displayed ones.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if no supported format is detected,
/// `DecodeError::CorruptedFile` if decoding fails part way, and
/// `DecodeError::EmptyImage` for zero-sized results.
pub fn decode_image(bytes: &[u8]) -> Result<Bitmap, DecodeError> {
    let orientation = get_orientation(bytes);

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let bitmap = Bitmap::from_rgb_image(apply_orientation(img, orientation).into_rgb8());
    if bitmap.is_empty() {
        return Err(DecodeError::EmptyImage {
            width: bitmap.width,
            height: bitmap.height,
        });
    }

    log::debug!(
        "Decoded {}x{} image (orientation {:?})",
        bitmap.width,
        bitmap.height,
        orientation
    );
    Ok(bitmap)
}

/// Read the EXIF orientation tag, defaulting to `Normal` when absent.
pub fn get_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};

    fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x * 10) as u8, (y * 10) as u8, 77])
        });
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_png() {
        let bytes = encode(12, 7, ImageFormat::Png);
        let bmp = decode_image(&bytes).unwrap();
        assert_eq!((bmp.width, bmp.height), (12, 7));
        assert_eq!(bmp.pixel(3, 2), [30, 20, 77]);
    }

    #[test]
    fn test_decode_jpeg_dimensions() {
        let bytes = encode(40, 20, ImageFormat::Jpeg);
        let bmp = decode_image(&bytes).unwrap();
        assert_eq!((bmp.width, bmp.height), (40, 20));
    }

    #[test]
    fn test_decode_garbage() {
        let result = decode_image(b"definitely not an image");
        assert!(matches!(result, Err(DecodeError::InvalidFormat)));
    }

    #[test]
    fn test_decode_truncated_png() {
        let bytes = encode(30, 30, ImageFormat::Png);
        let result = decode_image(&bytes[..bytes.len() / 2]);
        assert!(matches!(result, Err(DecodeError::CorruptedFile(_))));
    }

    #[test]
    fn test_orientation_without_exif() {
        let bytes = encode(5, 5, ImageFormat::Png);
        assert_eq!(get_orientation(&bytes), Orientation::Normal);
        assert_eq!(get_orientation(&[]), Orientation::Normal);
    }

    #[test]
    fn test_apply_orientation_swaps() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(8, 3));
        let rotated = apply_orientation(img.clone(), Orientation::Rotate90CW);
        assert_eq!((rotated.width(), rotated.height()), (3, 8));

        let flipped = apply_orientation(img, Orientation::FlipHorizontal);
        assert_eq!((flipped.width(), flipped.height()), (8, 3));
    }
}
