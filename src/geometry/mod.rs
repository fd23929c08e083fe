//! Reprojection and buffering primitives.

mod buffer;
mod projection;

pub use buffer::{buffer, BufferZone, DEFAULT_QUADRANT_SEGMENTS};
pub use projection::{CoordinateProjector, Frame, LambertAzimuthalEqualArea};
