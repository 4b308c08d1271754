//! Host-side packing of sprites into the three command blocks.

use anyhow::{Result, ensure};
use drawbatch::FrameData;
use drawbatch::command::{Batch, BlendMode, OFFSET_NONE, VERTEX_SLOTS, Vertex};
use drawbatch::texture::NO_TEXTURE;

/// Axis-aligned sprite quad in target pixels.
#[derive(Debug, Copy, Clone)]
pub struct Quad {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    /// Packed RGBA8 tint.
    pub color: u32,
    /// Packed RGBA8 offset; [`OFFSET_NONE`] adds nothing.
    pub offset: u32,
}

impl Quad {
    pub fn new(x: f32, y: f32, w: f32, h: f32, color: u32) -> Self {
        Self {
            x,
            y,
            w,
            h,
            color,
            offset: OFFSET_NONE,
        }
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }
}

/// Quads per frame addressable with `u16` indices.
pub const MAX_QUADS: usize = (u16::MAX as usize + 1) / 4;

/// Packs quads into a frame, opening a new batch whenever the texture or
/// blend mode changes.
#[derive(Debug, Default)]
pub struct FrameBuilder {
    vertices: Vec<f32>,
    indices: Vec<u16>,
    batches: Vec<Batch>,
    packed_batches: Vec<i32>,
}

impl FrameBuilder {
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.batches.clear();
        self.packed_batches.clear();
    }

    /// Adds a quad drawn with `texture_id` (or [`NO_TEXTURE`]) and `blend`.
    ///
    /// Fails once the frame holds [`MAX_QUADS`]; indices are 16-bit.
    pub fn push(&mut self, quad: Quad, texture_id: i32, blend: BlendMode) -> Result<()> {
        let quads = self.vertices.len() / VERTEX_SLOTS / 4;
        ensure!(quads < MAX_QUADS, "frame full: {MAX_QUADS} quads");
        let base = (quads * 4) as u16;

        let corners = [
            (quad.x, quad.y, 0.0, 0.0),
            (quad.x + quad.w, quad.y, 1.0, 0.0),
            (quad.x + quad.w, quad.y + quad.h, 1.0, 1.0),
            (quad.x, quad.y + quad.h, 0.0, 1.0),
        ];
        for (x, y, u, v) in corners {
            let vertex = Vertex {
                position: [x, y],
                texcoord: [u, v],
                color: quad.color,
                color_offset: quad.offset,
            };
            self.vertices.extend_from_slice(&vertex.to_slots());
        }

        let start = self.indices.len() as i32;
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);

        match self.batches.last_mut() {
            Some(last) if last.texture_id == texture_id && last.blend_mode == blend => {
                last.triangle_count += 2;
            }
            _ => self.batches.push(Batch {
                index_start: start,
                triangle_count: 2,
                texture_id,
                blend_mode: blend,
                ..Batch::default()
            }),
        }
        Ok(())
    }

    pub fn push_untextured(&mut self, quad: Quad, blend: BlendMode) -> Result<()> {
        self.push(quad, NO_TEXTURE, blend)
    }

    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    /// Packs the batch records and borrows the finished frame.
    pub fn finish(&mut self) -> FrameData<'_> {
        self.packed_batches.clear();
        for batch in &self.batches {
            self.packed_batches.extend_from_slice(&batch.to_fields());
        }
        FrameData::from_slices(&self.vertices, &self.indices, &self.packed_batches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drawbatch::command::{BATCH_FIELDS, COLOR_WHITE, decode};

    #[test]
    fn same_state_quads_share_a_batch() {
        let mut fb = FrameBuilder::default();
        fb.push_untextured(Quad::new(0.0, 0.0, 8.0, 8.0, COLOR_WHITE), BlendMode::Normal).unwrap();
        fb.push_untextured(Quad::new(8.0, 0.0, 8.0, 8.0, COLOR_WHITE), BlendMode::Normal).unwrap();
        assert_eq!(fb.batch_count(), 1);

        let frame = fb.finish();
        assert_eq!(frame.vertex_count, 8);
        assert_eq!(frame.index_count, 12);
        assert_eq!(frame.batch_count, 1);
    }

    #[test]
    fn state_change_opens_a_batch() {
        let mut fb = FrameBuilder::default();
        fb.push_untextured(Quad::new(0.0, 0.0, 8.0, 8.0, COLOR_WHITE), BlendMode::Normal).unwrap();
        fb.push_untextured(Quad::new(0.0, 0.0, 8.0, 8.0, COLOR_WHITE), BlendMode::Add).unwrap();
        fb.push(Quad::new(0.0, 0.0, 8.0, 8.0, COLOR_WHITE), 3, BlendMode::Add).unwrap();

        let frame = fb.finish();
        assert_eq!(frame.batches.len(), 3 * BATCH_FIELDS);

        let decoded = decode(&frame).unwrap();
        let starts: Vec<_> = decoded.batches.iter().map(|b| b.index_start).collect();
        assert_eq!(starts, vec![0, 6, 12]);
        assert_eq!(decoded.batches[2].texture_id, 3);
        assert_eq!(decoded.indices[6..12], [4, 5, 6, 4, 6, 7]);
    }

    #[test]
    fn full_frame_rejects_further_quads() {
        let mut fb = FrameBuilder::default();
        let quad = Quad::new(0.0, 0.0, 1.0, 1.0, COLOR_WHITE);
        for _ in 0..MAX_QUADS {
            fb.push_untextured(quad, BlendMode::Normal).unwrap();
        }
        assert!(fb.push_untextured(quad, BlendMode::Normal).is_err());

        let frame = fb.finish();
        assert_eq!(frame.vertex_count, 65536);
        let decoded = decode(&frame).unwrap();
        assert_eq!(decoded.indices[decoded.indices.len() - 6..], [65532, 65533, 65534, 65532, 65534, 65535]);
    }

    #[test]
    fn clear_resets_everything() {
        let mut fb = FrameBuilder::default();
        fb.push_untextured(Quad::new(0.0, 0.0, 1.0, 1.0, COLOR_WHITE), BlendMode::Normal).unwrap();
        fb.clear();
        assert!(fb.finish().is_empty());
    }
}
