//! Batched 2D draw-command interpreter.
//!
//! A host packs a frame into three flat arrays (vertices, 16-bit indices,
//! per-batch records) and hands them to a [`Renderer`], which validates them
//! and issues one draw call per batch through a [`RenderBackend`].
//!
//! The core (`texture`, `command`, `shader`, `render`) is backend-agnostic;
//! `gpu` implements the backend on wgpu, and `device`/`window`/`core`/`time`
//! host it in a winit window.

pub mod error;
pub mod logging;

pub mod coords;
pub mod texture;
pub mod command;
pub mod shader;
pub mod render;

pub mod gpu;
pub mod device;
pub mod window;
pub mod time;
pub mod core;

pub use command::FrameData;
pub use error::{RenderError, Result};
pub use render::{RenderBackend, Renderer, RendererConfig};
pub use texture::TextureHandle;
