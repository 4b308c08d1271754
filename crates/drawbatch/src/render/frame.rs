use crate::command::{FrameData, decode};
use crate::coords::Projection;
use crate::error::Result;
use crate::shader::ShaderCache;
use crate::texture::{TextureHandle, TexturePool};

use super::executor::{BatchExecutor, FrameStats, validate};
use super::{RenderBackend, RendererConfig};

/// Frame controller: owns the texture slot table and the shader program and
/// turns one packed command buffer into backend calls per frame.
///
/// `T` and `P` are the backend's native texture and program types. The renderer
/// is an explicit context object; there is no process-wide renderer state.
pub struct Renderer<T, P> {
    config: RendererConfig,
    textures: TexturePool<T>,
    shader: ShaderCache<P>,
    executor: BatchExecutor,
    frames: u64,
}

impl<T, P> Default for Renderer<T, P> {
    fn default() -> Self {
        Self::new(RendererConfig::default())
    }
}

impl<T, P> Renderer<T, P> {
    pub fn new(config: RendererConfig) -> Self {
        Self {
            textures: TexturePool::new(config.texture_capacity),
            shader: ShaderCache::default(),
            executor: BatchExecutor::new(config.apply_scissor),
            frames: 0,
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Stores a native texture and returns the handle batches should reference.
    pub fn allocate_texture(&mut self, resource: T) -> Result<TextureHandle> {
        let handle = self.textures.insert(resource)?;
        log::debug!("texture {handle} allocated ({} live)", self.textures.live());
        Ok(handle)
    }

    /// Releases a texture handle and hands the native resource back for destruction.
    pub fn dispose_texture(&mut self, handle: TextureHandle) -> Result<Option<T>> {
        let resource = self.textures.dispose(handle)?;
        log::debug!("texture {handle} disposed ({} live)", self.textures.live());
        Ok(resource)
    }

    #[inline]
    pub fn texture(&self, handle: TextureHandle) -> Option<&T> {
        self.textures.get(handle)
    }

    #[inline]
    pub fn textures(&self) -> &TexturePool<T> {
        &self.textures
    }

    /// Number of frames rendered so far, empty frames included.
    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Renders one frame.
    ///
    /// The target is always cleared first. An empty frame (no vertices or no
    /// indices) stops there. Decode and range errors abort the frame before any
    /// draw call; a shader compile failure is fatal (see [`RenderError::is_fatal`]).
    ///
    /// [`RenderError::is_fatal`]: crate::RenderError::is_fatal
    pub fn render_frame<B>(&mut self, backend: &mut B, frame: &FrameData<'_>) -> Result<FrameStats>
    where
        B: RenderBackend<Texture = T, Program = P> + ?Sized,
    {
        self.frames += 1;

        backend.set_stencil_test(false);
        backend.set_scissor_test(false);
        backend.clear(self.config.clear_color, 0);

        if frame.is_empty() {
            return Ok(FrameStats::default());
        }

        let viewport = backend.viewport();
        let projection = Projection::screen(viewport);

        let program = self.shader.ensure_compiled(backend)?;

        let decoded = decode(frame)?;
        validate(&decoded, self.textures.capacity())?;

        if let Err(err) = backend.upload_geometry(&decoded.vertices, &decoded.indices) {
            backend.release_geometry();
            return Err(err);
        }
        backend.use_program(program, &projection);

        if self.config.apply_scissor {
            backend.set_scissor_test(true);
        }

        let stats = self
            .executor
            .execute(backend, &decoded.batches, &self.textures, viewport);

        backend.release_geometry();

        log::trace!(
            "frame {}: {} batches, {} draws, {} skipped, {} triangles",
            self.frames,
            stats.batches,
            stats.draw_calls,
            stats.skipped,
            stats.triangles
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RenderError;
    use crate::command::{Batch, BlendMode, COLOR_WHITE, OFFSET_NONE};
    use crate::coords::{ColorRgba, Viewport};
    use crate::render::BlendFunc;
    use crate::render::recording::{Call, RecordingBackend};

    struct Packed {
        vertices: Vec<f32>,
        indices: Vec<u16>,
        batches: Vec<i32>,
    }

    impl Packed {
        fn quads(n: usize) -> Self {
            let mut vertices = Vec::new();
            let mut indices = Vec::new();
            for q in 0..n {
                let x = q as f32 * 10.0;
                for (dx, dy, u, v) in [(0.0, 0.0, 0.0, 0.0), (8.0, 0.0, 1.0, 0.0), (8.0, 8.0, 1.0, 1.0), (0.0, 8.0, 0.0, 1.0)] {
                    vertices.extend([x + dx, dy, u, v, f32::from_bits(COLOR_WHITE), f32::from_bits(OFFSET_NONE)]);
                }
                let base = (q * 4) as u16;
                indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
            }
            Self { vertices, indices, batches: Vec::new() }
        }

        fn batch(mut self, b: Batch) -> Self {
            self.batches.extend(b.to_fields());
            self
        }

        fn frame(&self) -> FrameData<'_> {
            FrameData::from_slices(&self.vertices, &self.indices, &self.batches)
        }
    }

    fn quad_batch(quad: i32, texture_id: i32, blend_mode: BlendMode) -> Batch {
        Batch {
            index_start: quad * 6,
            triangle_count: 2,
            texture_id,
            blend_mode,
            ..Batch::default()
        }
    }

    /// Renderer whose first handle is `id`, holding resource `id`.
    fn renderer_with_texture(id: u32) -> Renderer<u32, u32> {
        let mut r = Renderer::new(RendererConfig {
            texture_capacity: id as usize + 1,
            ..RendererConfig::default()
        });
        let handle = r.allocate_texture(id).unwrap();
        assert_eq!(handle, TextureHandle::new(id));
        r
    }

    fn header() -> Vec<Call> {
        vec![
            Call::StencilTest(false),
            Call::ScissorTest(false),
            Call::Clear(ColorRgba::black(), 0),
        ]
    }

    #[test]
    fn empty_frame_only_clears() {
        let mut backend = RecordingBackend::new(640.0, 480.0);
        let mut renderer: Renderer<u32, u32> = Renderer::default();

        let packed = Packed::quads(1).batch(quad_batch(0, -1, BlendMode::Normal));
        let mut frame = packed.frame();
        frame.index_count = 0;
        assert_eq!(renderer.render_frame(&mut backend, &frame).unwrap(), FrameStats::default());

        frame = packed.frame();
        frame.vertex_count = 0;
        renderer.render_frame(&mut backend, &frame).unwrap();

        let mut expected = header();
        expected.extend(header());
        assert_eq!(backend.calls, expected);
        assert!(backend.draws().is_empty());
    }

    #[test]
    fn single_normal_batch_scenario() {
        let mut backend = RecordingBackend::new(640.0, 480.0);
        let mut renderer = renderer_with_texture(5);
        let packed = Packed::quads(1).batch(quad_batch(0, 5, BlendMode::Normal));

        let stats = renderer.render_frame(&mut backend, &packed.frame()).unwrap();

        let mut expected = header();
        expected.extend([
            Call::CompileProgram("sprite"),
            Call::UploadGeometry { vertices: 4, indices: 6 },
            Call::UseProgram(1, Projection::screen(Viewport::new(640.0, 480.0))),
            Call::BindTexture(Some(5)),
            Call::Blend(BlendFunc::SrcAlphaOneMinusSrcAlpha),
            Call::Draw { first: 0, count: 6 },
            Call::ReleaseGeometry,
        ]);
        assert_eq!(backend.calls, expected);
        assert_eq!(stats.draw_calls, 1);
        assert_eq!(stats.triangles, 2);
    }

    #[test]
    fn add_batch_uses_additive_blend() {
        let mut backend = RecordingBackend::new(640.0, 480.0);
        let mut renderer = renderer_with_texture(5);
        let packed = Packed::quads(1).batch(quad_batch(0, 5, BlendMode::Add));

        renderer.render_frame(&mut backend, &packed.frame()).unwrap();

        assert!(backend.calls.contains(&Call::Blend(BlendFunc::SrcAlphaOne)));
        assert_eq!(backend.count(|c| matches!(c, Call::Blend(_))), 1);
        assert_eq!(backend.draws(), vec![(0, 6)]);
    }

    #[test]
    fn later_batches_draw_after_earlier_ones() {
        let mut backend = RecordingBackend::new(640.0, 480.0);
        let mut renderer: Renderer<u32, u32> = Renderer::default();
        // B overlaps A on screen (same quad) and must be issued after it.
        let packed = Packed::quads(2)
            .batch(quad_batch(1, -1, BlendMode::Normal))
            .batch(quad_batch(0, -1, BlendMode::Add))
            .batch(quad_batch(0, -1, BlendMode::Normal));

        renderer.render_frame(&mut backend, &packed.frame()).unwrap();
        assert_eq!(backend.draws(), vec![(6, 6), (0, 6), (0, 6)]);
    }

    #[test]
    fn short_vertex_block_draws_nothing() {
        let mut backend = RecordingBackend::new(640.0, 480.0);
        let mut renderer: Renderer<u32, u32> = Renderer::default();
        let packed = Packed::quads(1).batch(quad_batch(0, -1, BlendMode::Normal));
        let mut frame = packed.frame();
        frame.vertex_count = 5;

        let err = renderer.render_frame(&mut backend, &frame).unwrap_err();
        assert!(matches!(err, RenderError::InvalidBuffer(_)));
        assert!(!err.is_fatal());
        assert!(backend.draws().is_empty());
        assert_eq!(backend.count(|c| matches!(c, Call::UploadGeometry { .. })), 0);
        assert!(backend.calls.contains(&Call::Clear(ColorRgba::black(), 0)));
    }

    #[test]
    fn out_of_range_batch_aborts_before_any_draw() {
        let mut backend = RecordingBackend::new(640.0, 480.0);
        let mut renderer: Renderer<u32, u32> = Renderer::default();
        let packed = Packed::quads(1)
            .batch(quad_batch(0, -1, BlendMode::Normal))
            .batch(quad_batch(1, -1, BlendMode::Normal));

        let err = renderer.render_frame(&mut backend, &packed.frame()).unwrap_err();
        assert!(matches!(err, RenderError::OutOfRange { .. }));
        assert!(backend.draws().is_empty());
    }

    #[test]
    fn compile_failure_is_fatal_and_skips_geometry() {
        let mut backend = RecordingBackend::new(640.0, 480.0);
        backend.compile_error = Some("bad shader".into());
        let mut renderer: Renderer<u32, u32> = Renderer::default();
        let packed = Packed::quads(1).batch(quad_batch(0, -1, BlendMode::Normal));

        let err = renderer.render_frame(&mut backend, &packed.frame()).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(backend.count(|c| matches!(c, Call::UploadGeometry { .. })), 0);

        let again = renderer.render_frame(&mut backend, &packed.frame()).unwrap_err();
        assert_eq!(again, err);
        assert_eq!(backend.count(|c| matches!(c, Call::CompileProgram(_))), 1);
    }

    #[test]
    fn geometry_released_every_frame_and_program_compiled_once() {
        let mut backend = RecordingBackend::new(640.0, 480.0);
        let mut renderer: Renderer<u32, u32> = Renderer::default();
        let packed = Packed::quads(1).batch(quad_batch(0, -1, BlendMode::Normal));

        for _ in 0..3 {
            renderer.render_frame(&mut backend, &packed.frame()).unwrap();
        }
        assert_eq!(renderer.frame_count(), 3);
        assert_eq!(backend.count(|c| matches!(c, Call::CompileProgram(_))), 1);
        assert_eq!(backend.count(|c| matches!(c, Call::UploadGeometry { .. })), 3);
        assert_eq!(backend.count(|c| matches!(c, Call::ReleaseGeometry)), 3);
    }

    #[test]
    fn upload_failure_still_releases_geometry() {
        let mut backend = RecordingBackend::new(640.0, 480.0);
        backend.upload_error = Some("out of memory".into());
        let mut renderer: Renderer<u32, u32> = Renderer::default();
        let packed = Packed::quads(1).batch(quad_batch(0, -1, BlendMode::Normal));

        let err = renderer.render_frame(&mut backend, &packed.frame()).unwrap_err();
        assert_eq!(err, RenderError::Backend("out of memory".into()));
        assert_eq!(backend.calls.last(), Some(&Call::ReleaseGeometry));
        assert!(backend.draws().is_empty());
    }

    #[test]
    fn projection_follows_viewport_changes() {
        let mut backend = RecordingBackend::new(640.0, 480.0);
        let mut renderer: Renderer<u32, u32> = Renderer::default();
        let packed = Packed::quads(1).batch(quad_batch(0, -1, BlendMode::Normal));

        renderer.render_frame(&mut backend, &packed.frame()).unwrap();
        backend.viewport = Viewport::new(800.0, 600.0);
        renderer.render_frame(&mut backend, &packed.frame()).unwrap();

        let projections: Vec<_> = backend
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::UseProgram(_, p) => Some(*p),
                _ => None,
            })
            .collect();
        assert_eq!(
            projections,
            vec![
                Projection::screen(Viewport::new(640.0, 480.0)),
                Projection::screen(Viewport::new(800.0, 600.0)),
            ]
        );
    }

    #[test]
    fn scissor_config_enables_test_after_clear() {
        let mut backend = RecordingBackend::new(640.0, 480.0);
        let mut renderer: Renderer<u32, u32> = Renderer::new(RendererConfig {
            apply_scissor: true,
            ..RendererConfig::default()
        });
        let mut b = quad_batch(0, -1, BlendMode::Normal);
        b.scissor.right = 100;
        b.scissor.bottom = 100;
        let packed = Packed::quads(1).batch(b);

        renderer.render_frame(&mut backend, &packed.frame()).unwrap();
        assert_eq!(&backend.calls[..3], &header()[..]);
        assert!(backend.calls.contains(&Call::ScissorTest(true)));
        assert!(backend.calls.contains(&Call::ScissorRect(0, 0, 100, 100)));
    }

    #[test]
    fn texture_capacity_is_configurable() {
        let mut renderer: Renderer<u32, u32> = Renderer::new(RendererConfig {
            texture_capacity: 2,
            ..RendererConfig::default()
        });
        let a = renderer.allocate_texture(10).unwrap();
        renderer.allocate_texture(11).unwrap();
        assert_eq!(
            renderer.allocate_texture(12),
            Err(RenderError::ResourceExhausted { capacity: 2 })
        );

        assert_eq!(renderer.dispose_texture(a).unwrap(), Some(10));
        assert_eq!(renderer.allocate_texture(13).unwrap(), a);
        assert_eq!(renderer.texture(a), Some(&13));
    }
}
