//! CPU model of the sprite program's per-vertex and per-fragment math.
//!
//! Mirrors `sprite.wgsl` operation for operation. Used to pin the fragment
//! contract in tests and to predict output colors without a GPU.

/// Vertex-stage remap of a normalized color offset from `[0, 1]` to `[-1, 1]`.
#[inline]
pub fn remap_offset(offset: [f32; 4]) -> [f32; 4] {
    offset.map(|c| (c - 0.5) * 2.0)
}

/// Fragment-stage result for one sample.
///
/// `texel` is the filtered texture sample, `color` the interpolated tint and
/// `offset` the already remapped color offset. Returns `None` when the fragment
/// is discarded.
pub fn shade_fragment(texel: [f32; 4], color: [f32; 4], offset: [f32; 4]) -> Option<[f32; 4]> {
    let a = texel[3];
    if a <= 0.0 {
        return None;
    }

    let straight = [texel[0] / a, texel[1] / a, texel[2] / a, a];
    let mut out = [0.0f32; 4];
    for i in 0..4 {
        out[i] = straight[i] * color[i] + offset[i];
    }

    if out[3] <= 0.0 { None } else { Some(out) }
}
