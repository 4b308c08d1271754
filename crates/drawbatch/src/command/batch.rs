/// Number of `i32` fields per batch descriptor (10 defined, 6 reserved).
pub const BATCH_FIELDS: usize = 16;

/// Field offsets inside one batch descriptor.
pub mod field {
    pub const INDEX_START: usize = 0;
    pub const TRIANGLE_COUNT: usize = 1;
    pub const TEXTURE_ID: usize = 2;
    pub const BLEND_MODE: usize = 3;
    pub const MASK_TYPE: usize = 4;
    pub const STENCIL_INDEX: usize = 5;
    pub const SCISSOR_LEFT: usize = 6;
    pub const SCISSOR_TOP: usize = 7;
    pub const SCISSOR_RIGHT: usize = 8;
    pub const SCISSOR_BOTTOM: usize = 9;
}

/// Blend mode requested by a batch.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BlendMode {
    Normal,
    Add,
    /// Unrecognized enumerant; renders like `Normal`.
    Other(i32),
}

impl BlendMode {
    pub const NORMAL: i32 = 0;
    pub const ADD: i32 = 1;

    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        match raw {
            Self::NORMAL => Self::Normal,
            Self::ADD => Self::Add,
            other => Self::Other(other),
        }
    }

    #[inline]
    pub const fn to_raw(self) -> i32 {
        match self {
            Self::Normal => Self::NORMAL,
            Self::Add => Self::ADD,
            Self::Other(raw) => raw,
        }
    }
}

/// Scissor rectangle in target pixels, edges as carried by the descriptor.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct ScissorRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ScissorRect {
    /// Clamps to a `width` x `height` target and returns `(x, y, w, h)`.
    ///
    /// Returns `None` for a zero-area result; the batch then draws nothing.
    pub fn clamped(self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let clamp_x = |v: i32| (v.max(0) as u32).min(width);
        let clamp_y = |v: i32| (v.max(0) as u32).min(height);

        let (x, y) = (clamp_x(self.left), clamp_y(self.top));
        let (x2, y2) = (clamp_x(self.right), clamp_y(self.bottom));
        let (w, h) = (x2.saturating_sub(x), y2.saturating_sub(y));

        if w == 0 || h == 0 { None } else { Some((x, y, w, h)) }
    }
}

/// One decoded batch descriptor.
///
/// Fields are carried exactly as packed; range checks happen in the executor.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Batch {
    pub index_start: i32,
    pub triangle_count: i32,
    pub texture_id: i32,
    pub blend_mode: BlendMode,
    pub mask_type: i32,
    pub stencil_index: i32,
    pub scissor: ScissorRect,
}

impl Batch {
    /// Reads one descriptor from its sixteen fields. Reserved fields are ignored.
    pub fn from_fields(f: &[i32; BATCH_FIELDS]) -> Self {
        Self {
            index_start: f[field::INDEX_START],
            triangle_count: f[field::TRIANGLE_COUNT],
            texture_id: f[field::TEXTURE_ID],
            blend_mode: BlendMode::from_raw(f[field::BLEND_MODE]),
            mask_type: f[field::MASK_TYPE],
            stencil_index: f[field::STENCIL_INDEX],
            scissor: ScissorRect {
                left: f[field::SCISSOR_LEFT],
                top: f[field::SCISSOR_TOP],
                right: f[field::SCISSOR_RIGHT],
                bottom: f[field::SCISSOR_BOTTOM],
            },
        }
    }

    /// Packs this batch into descriptor layout with zeroed reserved fields.
    pub fn to_fields(self) -> [i32; BATCH_FIELDS] {
        let mut f = [0; BATCH_FIELDS];
        f[field::INDEX_START] = self.index_start;
        f[field::TRIANGLE_COUNT] = self.triangle_count;
        f[field::TEXTURE_ID] = self.texture_id;
        f[field::BLEND_MODE] = self.blend_mode.to_raw();
        f[field::MASK_TYPE] = self.mask_type;
        f[field::STENCIL_INDEX] = self.stencil_index;
        f[field::SCISSOR_LEFT] = self.scissor.left;
        f[field::SCISSOR_TOP] = self.scissor.top;
        f[field::SCISSOR_RIGHT] = self.scissor.right;
        f[field::SCISSOR_BOTTOM] = self.scissor.bottom;
        f
    }

    /// Number of indices this batch draws, in 64-bit to avoid overflow on hostile input.
    #[inline]
    pub fn index_len(&self) -> i64 {
        self.triangle_count as i64 * 3
    }

    /// End of the index range (exclusive).
    #[inline]
    pub fn index_end(&self) -> i64 {
        self.index_start as i64 + self.index_len()
    }
}

impl Default for Batch {
    fn default() -> Self {
        Self {
            index_start: 0,
            triangle_count: 0,
            texture_id: crate::texture::NO_TEXTURE,
            blend_mode: BlendMode::Normal,
            mask_type: 0,
            stencil_index: 0,
            scissor: ScissorRect::default(),
        }
    }
}
