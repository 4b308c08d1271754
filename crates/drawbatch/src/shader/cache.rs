use crate::error::{RenderError, Result};
use crate::render::RenderBackend;

use super::{SPRITE_SHADER, ShaderSource};

enum State<P> {
    Uncompiled,
    Ready(P),
    /// Compilation failed; the error is replayed instead of retrying.
    Failed(RenderError),
}

/// Holds the single shader program of a renderer.
///
/// The program is compiled on the first call to [`ensure_compiled`](Self::ensure_compiled)
/// and kept for the lifetime of the cache. It is never rebuilt.
pub struct ShaderCache<P> {
    source: ShaderSource,
    state: State<P>,
}

impl<P> Default for ShaderCache<P> {
    fn default() -> Self {
        Self::new(SPRITE_SHADER)
    }
}

impl<P> ShaderCache<P> {
    pub fn new(source: ShaderSource) -> Self {
        Self {
            source,
            state: State::Uncompiled,
        }
    }

    #[inline]
    pub fn is_compiled(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    /// Returns the program, compiling it through `backend` on first use.
    ///
    /// A compile failure is fatal and sticky: every later call returns the same
    /// `ShaderCompileFailure` without touching the backend again.
    pub fn ensure_compiled<B>(&mut self, backend: &mut B) -> Result<&P>
    where
        B: RenderBackend<Program = P> + ?Sized,
    {
        if let State::Uncompiled = self.state {
            self.state = match backend.compile_program(&self.source) {
                Ok(program) => {
                    log::debug!("shader `{}` compiled", self.source.name);
                    State::Ready(program)
                }
                Err(log) => {
                    log::error!("shader `{}` failed to compile:\n{log}", self.source.name);
                    State::Failed(RenderError::ShaderCompileFailure {
                        name: self.source.name,
                        log,
                    })
                }
            };
        }

        match &self.state {
            State::Ready(program) => Ok(program),
            State::Failed(err) => Err(err.clone()),
            State::Uncompiled => unreachable!("shader state resolved above"),
        }
    }
}
