//! Image encoding for cropped exports.
//!
//! The export pipeline renders into an RGB [`Bitmap`](crate::decode::Bitmap)
//! and hands it to [`encode_jpeg`] to produce the bytes that get uploaded.

mod jpeg;

pub use jpeg::{encode_jpeg, EncodeError, DEFAULT_JPEG_QUALITY};
