//! Command buffer layout.
//!
//! A frame arrives as three flat blocks:
//! - vertices: `f32` slots, 6 per vertex (`x, y, u, v, color, color_offset`)
//! - indices: `u16` triangle list
//! - batches: `i32` descriptors, 16 fields per batch
//!
//! This module only performs the layout decode; field meaning is applied by the
//! batch executor.

mod batch;
mod decode;
mod vertex;

pub use batch::{BATCH_FIELDS, Batch, BlendMode, ScissorRect, field};
pub use decode::{DecodedFrame, FrameData, decode, vertex_slots_from_bytes};
pub use vertex::{COLOR_WHITE, OFFSET_NONE, VERTEX_SLOTS, Vertex, pack_rgba, unpack_rgba};
