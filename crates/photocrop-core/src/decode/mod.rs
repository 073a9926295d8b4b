//! Image decoding for the crop editor.
//!
//! Source images arrive as encoded bytes from a file picker, a drag-and-drop,
//! or a proxied remote fetch. This module turns them into an upright RGB
//! [`Bitmap`] that the renderer samples from.
//!
//! All operations are synchronous; the host decides when to call them.

mod reader;
mod types;

pub use reader::{decode_image, get_orientation};
pub use types::{Bitmap, DecodeError, Orientation};
