use crate::error::{RenderError, Result};

use super::{BATCH_FIELDS, Batch, VERTEX_SLOTS, Vertex};

/// Raw per-frame input as produced by the layout engine.
///
/// Counts are signed because they travel in the same integer stream as the
/// batch descriptors; negative counts are rejected during decode.
#[derive(Debug, Copy, Clone)]
pub struct FrameData<'a> {
    /// Packed vertex block, `VERTEX_SLOTS` slots per vertex.
    pub vertices: &'a [f32],
    pub vertex_count: i32,
    pub indices: &'a [u16],
    pub index_count: i32,
    /// Packed batch descriptors, `BATCH_FIELDS` fields per batch.
    pub batches: &'a [i32],
    pub batch_count: i32,
}

impl<'a> FrameData<'a> {
    /// Builds frame input whose counts are derived from the slice lengths.
    pub fn from_slices(vertices: &'a [f32], indices: &'a [u16], batches: &'a [i32]) -> Self {
        Self {
            vertices,
            vertex_count: (vertices.len() / VERTEX_SLOTS) as i32,
            indices,
            index_count: indices.len() as i32,
            batches,
            batch_count: (batches.len() / BATCH_FIELDS) as i32,
        }
    }

    /// `true` when the frame has nothing to draw.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertex_count == 0 || self.index_count == 0
    }
}

/// Structured form of one frame's command buffer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedFrame {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
    pub batches: Vec<Batch>,
}

/// Decodes the packed vertex and batch blocks.
///
/// Only layout is checked here: counts must be non-negative and every block must
/// hold at least the declared number of records. Trailing data is ignored.
pub fn decode(frame: &FrameData<'_>) -> Result<DecodedFrame> {
    let vertex_count = checked_count("vertex", frame.vertex_count)?;
    let index_count = checked_count("index", frame.index_count)?;
    let batch_count = checked_count("batch", frame.batch_count)?;

    let vertex_slots = required_len("vertex block", vertex_count, VERTEX_SLOTS, frame.vertices.len())?;
    required_len("index buffer", index_count, 1, frame.indices.len())?;
    let batch_fields = required_len("batch block", batch_count, BATCH_FIELDS, frame.batches.len())?;

    // Lengths are exact multiples of the record stride, so the casts cannot fail.
    let vertices = bytemuck::cast_slice::<f32, [f32; VERTEX_SLOTS]>(&frame.vertices[..vertex_slots])
        .iter()
        .map(Vertex::from_slots)
        .collect();

    let batches = bytemuck::cast_slice::<i32, [i32; BATCH_FIELDS]>(&frame.batches[..batch_fields])
        .iter()
        .map(Batch::from_fields)
        .collect();

    Ok(DecodedFrame {
        vertices,
        indices: frame.indices[..index_count].to_vec(),
        batches,
    })
}

/// Reinterprets a native-endian byte block as vertex slots without copying.
pub fn vertex_slots_from_bytes(bytes: &[u8]) -> Result<&[f32]> {
    bytemuck::try_cast_slice(bytes)
        .map_err(|e| RenderError::invalid_buffer(format!("vertex block bytes: {e:?}")))
}

fn checked_count(what: &str, count: i32) -> Result<usize> {
    usize::try_from(count)
        .map_err(|_| RenderError::invalid_buffer(format!("negative {what} count {count}")))
}

fn required_len(what: &str, count: usize, stride: usize, have: usize) -> Result<usize> {
    let need = count
        .checked_mul(stride)
        .ok_or_else(|| RenderError::invalid_buffer(format!("{what}: {count} records overflow")))?;

    if have < need {
        return Err(RenderError::invalid_buffer(format!(
            "{what} holds {have} slots, {need} required for {count} records"
        )));
    }
    Ok(need)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{BlendMode, OFFSET_NONE, pack_rgba};

    fn quad_slots() -> Vec<f32> {
        let color = f32::from_bits(pack_rgba(255, 0, 0, 255));
        let offset = f32::from_bits(OFFSET_NONE);
        [[0.0, 0.0, 0.0, 0.0], [10.0, 0.0, 1.0, 0.0], [10.0, 10.0, 1.0, 1.0], [0.0, 10.0, 0.0, 1.0]]
            .iter()
            .flat_map(|v| [v[0], v[1], v[2], v[3], color, offset])
            .collect()
    }

    fn one_batch() -> Vec<i32> {
        Batch {
            index_start: 0,
            triangle_count: 2,
            texture_id: 5,
            blend_mode: BlendMode::Add,
            ..Batch::default()
        }
        .to_fields()
        .to_vec()
    }

    #[test]
    fn decodes_vertices_and_batches_in_order() {
        let slots = quad_slots();
        let indices = [0u16, 1, 2, 0, 2, 3];
        let batches = one_batch();
        let decoded = decode(&FrameData::from_slices(&slots, &indices, &batches)).unwrap();

        assert_eq!(decoded.vertices.len(), 4);
        assert_eq!(decoded.vertices[2].position, [10.0, 10.0]);
        assert_eq!(decoded.vertices[2].texcoord, [1.0, 1.0]);
        assert_eq!(decoded.vertices[3].color, pack_rgba(255, 0, 0, 255));
        assert_eq!(decoded.indices, indices);
        assert_eq!(decoded.batches.len(), 1);
        assert_eq!(decoded.batches[0].texture_id, 5);
        assert_eq!(decoded.batches[0].blend_mode, BlendMode::Add);
    }

    #[test]
    fn short_vertex_block_is_invalid() {
        let slots = quad_slots();
        let frame = FrameData {
            vertices: &slots[..23],
            vertex_count: 4,
            indices: &[0, 1, 2],
            index_count: 3,
            batches: &[],
            batch_count: 0,
        };
        assert!(matches!(decode(&frame), Err(RenderError::InvalidBuffer(_))));
    }

    #[test]
    fn negative_counts_are_invalid() {
        let slots = quad_slots();
        for (vc, ic, bc) in [(-1, 0, 0), (4, -3, 0), (4, 0, -1)] {
            let frame = FrameData {
                vertices: &slots,
                vertex_count: vc,
                indices: &[],
                index_count: ic,
                batches: &[],
                batch_count: bc,
            };
            assert!(matches!(decode(&frame), Err(RenderError::InvalidBuffer(_))), "{vc} {ic} {bc}");
        }
    }

    #[test]
    fn short_index_and_batch_blocks_are_invalid() {
        let slots = quad_slots();
        let batches = one_batch();
        let mut frame = FrameData::from_slices(&slots, &[0, 1, 2], &batches);

        frame.index_count = 6;
        assert!(matches!(decode(&frame), Err(RenderError::InvalidBuffer(_))));

        frame.index_count = 3;
        frame.batch_count = 2;
        assert!(matches!(decode(&frame), Err(RenderError::InvalidBuffer(_))));
    }

    #[test]
    fn trailing_data_beyond_counts_is_ignored() {
        let slots = quad_slots();
        let frame = FrameData {
            vertices: &slots,
            vertex_count: 2,
            indices: &[0, 1, 1, 0],
            index_count: 3,
            batches: &[],
            batch_count: 0,
        };
        let decoded = decode(&frame).unwrap();
        assert_eq!(decoded.vertices.len(), 2);
        assert_eq!(decoded.indices, [0, 1, 1]);
    }

    #[test]
    fn byte_block_reinterprets_as_slots() {
        let slots = quad_slots();
        let bytes: &[u8] = bytemuck::cast_slice(&slots);
        assert_eq!(vertex_slots_from_bytes(bytes).unwrap(), &slots[..]);
        assert!(vertex_slots_from_bytes(&bytes[..5]).is_err());
    }
}
