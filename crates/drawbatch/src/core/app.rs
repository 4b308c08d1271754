use anyhow::Result;
use winit::event::WindowEvent;

use crate::device::Gpu;
use crate::time::FrameTime;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application driven by [`Runtime`](crate::window::Runtime).
///
/// Per redraw the runtime calls [`update`](Self::update) and then
/// [`render`](Self::render).
pub trait App {
    /// Called once, after the GPU context exists and before the first frame.
    ///
    /// Create textures here. An error stops the runtime.
    fn init(&mut self, gpu: &Gpu<'_>) -> Result<()> {
        let _ = gpu;
        Ok(())
    }

    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Advances app state by one frame.
    fn update(&mut self, time: FrameTime) -> AppControl {
        let _ = time;
        AppControl::Continue
    }

    /// Draws one frame. An error stops the runtime and is returned from
    /// [`Runtime::run`](crate::window::Runtime::run).
    fn render(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<AppControl>;
}
