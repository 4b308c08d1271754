//! Backend that records calls instead of drawing. Test-only.

use crate::command::Vertex;
use crate::coords::{ColorRgba, Projection, Viewport};
use crate::error::{RenderError, Result};
use crate::shader::ShaderSource;

use super::{BlendFunc, RenderBackend};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    StencilTest(bool),
    ScissorTest(bool),
    ScissorRect(u32, u32, u32, u32),
    Clear(ColorRgba, u32),
    CompileProgram(&'static str),
    UploadGeometry { vertices: usize, indices: usize },
    UseProgram(u32, Projection),
    BindTexture(Option<u32>),
    Blend(BlendFunc),
    Draw { first: u32, count: u32 },
    ReleaseGeometry,
}

pub(crate) struct RecordingBackend {
    pub viewport: Viewport,
    pub calls: Vec<Call>,
    pub compile_error: Option<String>,
    pub upload_error: Option<String>,
    next_program: u32,
}

impl RecordingBackend {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            viewport: Viewport::new(width, height),
            calls: Vec::new(),
            compile_error: None,
            upload_error: None,
            next_program: 0,
        }
    }

    pub fn draws(&self) -> Vec<(u32, u32)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Draw { first, count } => Some((*first, *count)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }
}

impl RenderBackend for RecordingBackend {
    type Texture = u32;
    type Program = u32;

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn set_stencil_test(&mut self, enabled: bool) {
        self.calls.push(Call::StencilTest(enabled));
    }

    fn set_scissor_test(&mut self, enabled: bool) {
        self.calls.push(Call::ScissorTest(enabled));
    }

    fn set_scissor_rect(&mut self, x: u32, y: u32, width: u32, height: u32) {
        self.calls.push(Call::ScissorRect(x, y, width, height));
    }

    fn clear(&mut self, color: ColorRgba, stencil: u32) {
        self.calls.push(Call::Clear(color, stencil));
    }

    fn compile_program(&mut self, source: &ShaderSource) -> std::result::Result<u32, String> {
        self.calls.push(Call::CompileProgram(source.name));
        match &self.compile_error {
            Some(log) => Err(log.clone()),
            None => {
                self.next_program += 1;
                Ok(self.next_program)
            }
        }
    }

    fn upload_geometry(&mut self, vertices: &[Vertex], indices: &[u16]) -> Result<()> {
        if let Some(msg) = &self.upload_error {
            return Err(RenderError::Backend(msg.clone()));
        }
        self.calls.push(Call::UploadGeometry {
            vertices: vertices.len(),
            indices: indices.len(),
        });
        Ok(())
    }

    fn use_program(&mut self, program: &u32, projection: &Projection) {
        self.calls.push(Call::UseProgram(*program, *projection));
    }

    fn bind_texture(&mut self, texture: Option<&u32>) {
        self.calls.push(Call::BindTexture(texture.copied()));
    }

    fn set_blend(&mut self, blend: BlendFunc) {
        self.calls.push(Call::Blend(blend));
    }

    fn draw_triangles(&mut self, first_index: u32, index_count: u32) {
        self.calls.push(Call::Draw {
            first: first_index,
            count: index_count,
        });
    }

    fn release_geometry(&mut self) {
        self.calls.push(Call::ReleaseGeometry);
    }
}
