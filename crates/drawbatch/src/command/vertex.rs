use bytemuck::{Pod, Zeroable};

/// Number of 32-bit slots per vertex in the packed vertex block.
pub const VERTEX_SLOTS: usize = 6;

/// One decoded sprite vertex.
///
/// The GPU layout matches the packed block slot for slot, so a decoded vertex
/// array uploads with a plain `cast_slice`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Screen-space position in pixels (top-left origin, +Y down).
    pub position: [f32; 2],
    /// Texture coordinate, normally in `[0, 1]`.
    pub texcoord: [f32; 2],
    /// Packed RGBA8 multiply color (R in the lowest byte).
    pub color: u32,
    /// Packed RGBA8 color offset; `0x80` per channel is zero offset.
    pub color_offset: u32,
}

impl Vertex {
    /// Reads one vertex from its six slots. Packed colors keep their bit patterns.
    #[inline]
    pub fn from_slots(s: &[f32; VERTEX_SLOTS]) -> Self {
        Self {
            position: [s[0], s[1]],
            texcoord: [s[2], s[3]],
            color: s[4].to_bits(),
            color_offset: s[5].to_bits(),
        }
    }

    /// Writes this vertex back into the packed slot layout.
    #[inline]
    pub fn to_slots(self) -> [f32; VERTEX_SLOTS] {
        [
            self.position[0],
            self.position[1],
            self.texcoord[0],
            self.texcoord[1],
            f32::from_bits(self.color),
            f32::from_bits(self.color_offset),
        ]
    }

    const ATTRS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x2, // position
        1 => Float32x2, // texcoord
        2 => Unorm8x4,  // color
        3 => Unorm8x4   // color offset
    ];

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Packs straight RGBA8 channels into the vertex color encoding.
#[inline]
pub const fn pack_rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
    u32::from_le_bytes([r, g, b, a])
}

/// Splits a packed vertex color into normalized channels, as the GPU reads it.
#[inline]
pub fn unpack_rgba(packed: u32) -> [f32; 4] {
    packed.to_le_bytes().map(|c| c as f32 / 255.0)
}

/// Packed white: multiplying by it leaves the texel unchanged.
pub const COLOR_WHITE: u32 = pack_rgba(0xff, 0xff, 0xff, 0xff);

/// Packed neutral offset (every channel remaps to zero).
///
/// `0x80` remaps to `+1/255` rather than exactly zero; the producer convention
/// accepts that bias.
pub const OFFSET_NONE: u32 = pack_rgba(0x80, 0x80, 0x80, 0x80);
