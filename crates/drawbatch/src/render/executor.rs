use crate::command::{Batch, BlendMode, DecodedFrame};
use crate::coords::Viewport;
use crate::error::{RenderError, Result};
use crate::texture::{TextureHandle, TexturePool};

use super::{BlendFunc, RenderBackend};

/// Counters for one executed frame.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct FrameStats {
    /// Batches in the frame.
    pub batches: usize,
    /// Draw calls issued.
    pub draw_calls: usize,
    /// Batches that drew nothing (zero triangles or empty scissor).
    pub skipped: usize,
    pub triangles: u64,
    pub texture_binds: usize,
    pub blend_changes: usize,
}

/// Blend function for a batch's blend mode.
///
/// Exactly one function per mode; unknown modes render like `Normal`.
#[inline]
pub fn blend_func(mode: BlendMode) -> BlendFunc {
    match mode {
        BlendMode::Normal => BlendFunc::SrcAlphaOneMinusSrcAlpha,
        BlendMode::Add => BlendFunc::SrcAlphaOne,
        BlendMode::Other(_) => BlendFunc::SrcAlphaOneMinusSrcAlpha,
    }
}

/// Checks every batch range and index value before anything is drawn.
///
/// A frame that fails here issues no draw calls at all.
pub fn validate(frame: &DecodedFrame, texture_capacity: usize) -> Result<()> {
    let vertex_count = frame.vertices.len();
    if let Some(&bad) = frame.indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(RenderError::out_of_range("vertex index", bad as i64, vertex_count as i64));
    }

    let index_count = frame.indices.len() as i64;
    for batch in &frame.batches {
        if batch.index_start < 0 {
            return Err(RenderError::out_of_range("batch index start", batch.index_start as i64, index_count));
        }
        if batch.triangle_count < 0 {
            return Err(RenderError::out_of_range("batch triangle count", batch.triangle_count as i64, 0));
        }
        if batch.index_end() > index_count {
            return Err(RenderError::out_of_range("batch index range", batch.index_end(), index_count));
        }
        if batch.texture_id as i64 >= texture_capacity as i64 {
            return Err(RenderError::out_of_range(
                "batch texture id",
                batch.texture_id as i64,
                texture_capacity as i64,
            ));
        }
    }
    Ok(())
}

/// Walks a batch list in order and issues the per-batch state and draw calls.
///
/// Batches are never reordered, merged or culled; later batches overdraw earlier
/// ones. Texture, blend and scissor calls are only issued when they differ from
/// the state left by the previous batch.
#[derive(Debug, Default)]
pub struct BatchExecutor {
    apply_scissor: bool,
    warned_unbound: bool,
}

impl BatchExecutor {
    pub fn new(apply_scissor: bool) -> Self {
        Self {
            apply_scissor,
            warned_unbound: false,
        }
    }

    /// Executes `batches` against the geometry currently uploaded to `backend`.
    ///
    /// Ranges must already have passed [`validate`].
    pub fn execute<B>(
        &mut self,
        backend: &mut B,
        batches: &[Batch],
        textures: &TexturePool<B::Texture>,
        viewport: Viewport,
    ) -> FrameStats
    where
        B: RenderBackend + ?Sized,
    {
        let mut stats = FrameStats {
            batches: batches.len(),
            ..FrameStats::default()
        };

        let mut bound_texture: Option<Option<TextureHandle>> = None;
        let mut bound_blend: Option<BlendFunc> = None;
        let mut bound_scissor: Option<(u32, u32, u32, u32)> = None;

        for batch in batches {
            if batch.triangle_count == 0 {
                stats.skipped += 1;
                continue;
            }

            if self.apply_scissor {
                let clip = batch
                    .scissor
                    .clamped(viewport.width.max(0.0) as u32, viewport.height.max(0.0) as u32);
                let Some(rect) = clip else {
                    stats.skipped += 1;
                    continue;
                };
                if bound_scissor != Some(rect) {
                    let (x, y, w, h) = rect;
                    backend.set_scissor_rect(x, y, w, h);
                    bound_scissor = Some(rect);
                }
            }

            let handle = self.resolve_texture(batch.texture_id, textures);
            if bound_texture != Some(handle) {
                backend.bind_texture(handle.and_then(|h| textures.get(h)));
                bound_texture = Some(handle);
                stats.texture_binds += 1;
            }

            let blend = blend_func(batch.blend_mode);
            if bound_blend != Some(blend) {
                backend.set_blend(blend);
                bound_blend = Some(blend);
                stats.blend_changes += 1;
            }

            // Validated: start >= 0 and end <= index count (a u16-indexed buffer length).
            let count = batch.index_len() as u32;
            backend.draw_triangles(batch.index_start as u32, count);
            stats.draw_calls += 1;
            stats.triangles += batch.triangle_count as u64;
        }

        stats
    }

    /// Maps a batch texture id to a bound handle, or `None` for "no texture".
    fn resolve_texture<T>(&mut self, texture_id: i32, textures: &TexturePool<T>) -> Option<TextureHandle> {
        if texture_id < 0 {
            return None;
        }

        let handle = TextureHandle::new(texture_id as u32);
        if textures.is_bound(handle) {
            return Some(handle);
        }

        if !self.warned_unbound {
            log::warn!("batch references unbound texture {handle}; drawing without texture");
            self.warned_unbound = true;
        }
        None
    }
}
