use thiserror::Error;

use crate::texture::TextureHandle;

/// Errors raised by the draw-command core.
///
/// Per-frame errors (`InvalidBuffer`, `OutOfRange`, `Backend`) abort only the
/// current frame. `ShaderCompileFailure` is fatal: the renderer cannot draw at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// Malformed or undersized input buffers.
    #[error("invalid buffer: {0}")]
    InvalidBuffer(String),

    /// A value addressed memory outside its declared bounds.
    #[error("{what} out of range: {value} (limit {limit})")]
    OutOfRange {
        what: &'static str,
        value: i64,
        limit: i64,
    },

    /// Every texture slot is currently live.
    #[error("texture pool exhausted ({capacity} handles live)")]
    ResourceExhausted { capacity: usize },

    /// The handle is not in a state that permits the requested operation.
    #[error("invalid texture handle {0}")]
    InvalidHandle(TextureHandle),

    /// The backend rejected the shader program.
    #[error("shader `{name}` failed to compile: {log}")]
    ShaderCompileFailure { name: &'static str, log: String },

    /// Backend-specific failure while issuing a frame.
    #[error("backend error: {0}")]
    Backend(String),
}

impl RenderError {
    pub(crate) fn invalid_buffer(msg: impl Into<String>) -> Self {
        Self::InvalidBuffer(msg.into())
    }

    pub(crate) fn out_of_range(what: &'static str, value: i64, limit: i64) -> Self {
        Self::OutOfRange { what, value, limit }
    }

    /// Returns `true` when rendering cannot continue on this renderer.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ShaderCompileFailure { .. })
    }
}

pub type Result<T, E = RenderError> = std::result::Result<T, E>;
