//! Geometry shared by the live preview and the export render.
//!
//! # Transform Order
//!
//! The image is placed the way a 2D canvas would draw it:
//! 1. Translate to the surface centre plus the pan offset
//! 2. Scale
//! 3. Rotate (one accumulated angle)
//! 4. Draw the source centred on its own dimensions
//!
//! # Coordinate System
//!
//! - Rotation angles are in degrees, positive = clockwise on screen
//! - Surface and source coordinates are in pixels, origin top-left, y down

mod placement;
mod sampling;

pub use placement::{InverseMap, Placement, Point};
pub use sampling::sample_bilinear;
