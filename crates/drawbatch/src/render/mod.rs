//! Draw-command execution.
//!
//! The [`Renderer`] frame controller decodes a packed command buffer and drives a
//! [`RenderBackend`] through the per-batch state changes and draw calls. The
//! backend is injected per frame; `crate::gpu` provides the wgpu implementation.
//!
//! Convention:
//! - geometry is in pixels (top-left origin, +Y down)
//! - the projection uniform is rebuilt from the backend viewport every frame

mod backend;
mod config;
mod ctx;
mod executor;
mod frame;

#[cfg(test)]
pub(crate) mod recording;

pub use backend::{BlendFunc, RenderBackend};
pub use config::RendererConfig;
pub use ctx::{RenderCtx, RenderTarget};
pub use executor::{BatchExecutor, FrameStats, blend_func, validate};
pub use frame::Renderer;
