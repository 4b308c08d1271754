//! Coordinate types shared by the frame controller and backends.
//!
//! Canonical CPU space:
//! - pixels, origin top-left
//! - +X right, +Y down
//!
//! The projection uniform maps this space to clip space each frame.

mod color;
mod projection;
mod viewport;

pub use color::ColorRgba;
pub use projection::Projection;
pub use viewport::Viewport;
