//! The sprite shader program.
//!
//! One fixed program draws every batch. Its WGSL lives in `sprite.wgsl`;
//! `shading` mirrors its math on the CPU.

mod cache;
pub mod shading;
mod validate;

pub use cache::ShaderCache;
pub use validate::validate_wgsl;

/// Named shader source handed to a backend for compilation.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ShaderSource {
    pub name: &'static str,
    pub wgsl: &'static str,
    pub vertex_entry: &'static str,
    pub fragment_entry: &'static str,
}

/// The sprite program: projection, tint, color offset, two-stage alpha discard.
pub const SPRITE_SHADER: ShaderSource = ShaderSource {
    name: "sprite",
    wgsl: include_str!("sprite.wgsl"),
    vertex_entry: "vs_main",
    fragment_entry: "fs_main",
};
