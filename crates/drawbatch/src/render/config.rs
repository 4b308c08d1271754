use crate::coords::ColorRgba;
use crate::texture::DEFAULT_TEXTURE_CAPACITY;

/// Renderer configuration.
///
/// Keep this small; every field maps to one observable behavior of a frame.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Number of texture handles in the slot table.
    pub texture_capacity: usize,

    /// Color the target is cleared to at the start of every frame.
    pub clear_color: ColorRgba,

    /// Honor the batch scissor fields.
    ///
    /// Off by default: the scissor test stays disabled for the whole frame and
    /// scissor fields are decoded but ignored.
    pub apply_scissor: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            texture_capacity: DEFAULT_TEXTURE_CAPACITY,
            clear_color: ColorRgba::black(),
            apply_scissor: false,
        }
    }
}
