//! wgpu implementation of [`RenderBackend`](crate::render::RenderBackend).
//!
//! - [`SpriteTexture`]: pool-resident texture created from RGBA8 pixels
//! - [`SpriteProgram`]: the compiled sprite pipelines
//! - [`WgpuBackend`]: per-frame backend recording into a command encoder

mod backend;
mod program;
mod texture;

pub use backend::WgpuBackend;
pub use program::{SpriteProgram, TargetFormats};
pub use texture::{SPRITE_TEXTURE_FORMAT, SpriteTexture};

/// Renderer specialized to the wgpu backend.
pub type WgpuRenderer = crate::render::Renderer<SpriteTexture, SpriteProgram>;
