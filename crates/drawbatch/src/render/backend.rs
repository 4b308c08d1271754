use crate::command::Vertex;
use crate::coords::{ColorRgba, Projection, Viewport};
use crate::error::Result;
use crate::shader::ShaderSource;

/// Blend function applied to subsequent draws.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BlendFunc {
    /// `src * src_alpha + dst * (1 - src_alpha)`
    SrcAlphaOneMinusSrcAlpha,
    /// `src * src_alpha + dst`
    SrcAlphaOne,
}

/// Graphics-API capability driven by the frame controller.
///
/// The surface is a small immediate-mode state machine: state setters affect
/// every following draw until changed. Calls arrive in this order each frame:
///
/// 1. stencil/scissor toggles and `clear`
/// 2. `compile_program` (first non-empty frame only)
/// 3. `upload_geometry`, `use_program`
/// 4. per batch: `bind_texture`, `set_blend`, optional `set_scissor_rect`, `draw_triangles`
/// 5. `release_geometry`
///
/// Implementations choose the native texture and program types; the renderer
/// only stores and hands them back.
pub trait RenderBackend {
    /// Native texture resource stored in the texture pool.
    type Texture;
    /// Compiled shader program.
    type Program;

    /// Current render-target size in pixels.
    fn viewport(&self) -> Viewport;

    fn set_stencil_test(&mut self, enabled: bool);

    fn set_scissor_test(&mut self, enabled: bool);

    /// Scissor rectangle in target pixels; only honored while the scissor test is on.
    fn set_scissor_rect(&mut self, x: u32, y: u32, width: u32, height: u32);

    /// Clears the color and stencil buffers.
    fn clear(&mut self, color: ColorRgba, stencil: u32);

    /// Compiles a program. On failure returns the backend's diagnostic text.
    fn compile_program(&mut self, source: &ShaderSource) -> std::result::Result<Self::Program, String>;

    /// Creates the frame's transient vertex and index buffers.
    fn upload_geometry(&mut self, vertices: &[Vertex], indices: &[u16]) -> Result<()>;

    /// Binds `program` with the given projection uniform.
    fn use_program(&mut self, program: &Self::Program, projection: &Projection);

    /// Binds a texture to unit 0. `None` binds the backend's default texture.
    fn bind_texture(&mut self, texture: Option<&Self::Texture>);

    fn set_blend(&mut self, blend: BlendFunc);

    /// Draws `index_count` indices as a triangle list, starting at `first_index`.
    fn draw_triangles(&mut self, first_index: u32, index_count: u32);

    /// Releases the transient buffers created by `upload_geometry`.
    fn release_geometry(&mut self);
}
