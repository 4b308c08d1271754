use bytemuck::{Pod, Zeroable};

use super::Viewport;

/// Column-major 4x4 projection matrix, laid out for a WGSL `mat4x4<f32>` uniform.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Projection {
    pub cols: [[f32; 4]; 4],
}

impl Projection {
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Orthographic projection over the given bounds.
    ///
    /// Depth maps `near..far` to `0..1` (wgpu clip-space convention).
    pub fn ortho(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        let rl = right - left;
        let tb = top - bottom;
        let fn_ = far - near;

        Self {
            cols: [
                [2.0 / rl, 0.0, 0.0, 0.0],
                [0.0, 2.0 / tb, 0.0, 0.0],
                [0.0, 0.0, -1.0 / fn_, 0.0],
                [-(right + left) / rl, -(top + bottom) / tb, -near / fn_, 1.0],
            ],
        }
    }

    /// Pixel-space projection for a viewport: top-left origin, +Y down, near 0, far 1.
    ///
    /// Degenerate sizes are clamped to one pixel so the matrix stays finite.
    pub fn screen(viewport: Viewport) -> Self {
        let w = viewport.width.max(1.0);
        let h = viewport.height.max(1.0);
        Self::ortho(0.0, w, h, 0.0, 0.0, 1.0)
    }

    /// Applies the matrix to a point at depth 0.
    pub fn transform_point(&self, x: f32, y: f32) -> [f32; 4] {
        let c = &self.cols;
        let mut out = [0.0f32; 4];
        for (row, o) in out.iter_mut().enumerate() {
            *o = c[0][row] * x + c[1][row] * y + c[3][row];
        }
        out
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::IDENTITY
    }
}
