use anyhow::{Result, bail};
use winit::window::Window;

use crate::command::FrameData;
use crate::device::{Gpu, SurfaceErrorAction};
use crate::gpu::{WgpuBackend, WgpuRenderer};
use crate::render::{FrameStats, RenderCtx, RenderTarget};
use crate::time::FrameTime;

use super::app::AppControl;

/// Per-frame context passed to `core::App::render`.
///
/// `'a` is the callback duration, `'w` the window borrow carried by `Gpu<'w>`.
pub struct FrameCtx<'a, 'w> {
    pub window: &'a Window,
    pub gpu: &'a mut Gpu<'w>,
    pub time: FrameTime,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Acquires a surface frame, runs `draw` against it, then presents.
    ///
    /// Recoverable surface errors skip the frame. An out-of-memory surface and
    /// any error from `draw` are returned; the runtime stops with that error.
    pub fn draw<F>(&mut self, draw: F) -> Result<AppControl>
    where
        F: FnOnce(&RenderCtx<'_>, RenderTarget<'_>) -> Result<AppControl>,
    {
        let size = self.gpu.size();
        if size.width == 0 || size.height == 0 {
            return Ok(AppControl::Continue);
        }

        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                return match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => bail!("surface out of memory"),
                    _ => Ok(AppControl::Continue),
                };
            }
        };

        let control = {
            let rctx = self.gpu.render_ctx();
            let target = self.gpu.render_target(&mut frame);
            draw(&rctx, target)
        };

        self.window.pre_present_notify();
        self.gpu.submit(frame);

        control.map_err(|err| err.context(format!("frame {} failed", self.time.frame_index)))
    }

    /// Renders one packed command buffer with `renderer` on the wgpu backend.
    ///
    /// Per-frame range and decode errors drop the frame and keep the loop
    /// running. A fatal error is returned.
    pub fn render(&mut self, renderer: &mut WgpuRenderer, data: &FrameData<'_>) -> Result<AppControl> {
        self.draw(|rctx, target| {
            let mut backend = WgpuBackend::new(rctx, target);
            frame_outcome(renderer.render_frame(&mut backend, data))
        })
    }
}

/// Maps a frame result onto the host loop: fatal errors propagate, the rest
/// drop the frame with a warning.
pub(crate) fn frame_outcome(result: crate::Result<FrameStats>) -> Result<AppControl> {
    match result {
        Ok(_) => Ok(AppControl::Continue),
        Err(err) if err.is_fatal() => Err(err.into()),
        Err(err) => {
            log::warn!("frame dropped: {err}");
            Ok(AppControl::Continue)
        }
    }
}
