use std::ops::Range;

use wgpu::util::DeviceExt;

use crate::command::Vertex;
use crate::coords::{ColorRgba, Projection, Viewport};
use crate::error::Result;
use crate::render::{BlendFunc, RenderBackend, RenderCtx, RenderTarget};
use crate::shader::ShaderSource;

use super::program::{SpriteProgram, TargetFormats};
use super::texture::SpriteTexture;

/// State change or draw recorded for the batch pass.
enum PassOp {
    Pipeline(BlendFunc),
    Texture(wgpu::BindGroup),
    Scissor(Option<(u32, u32, u32, u32)>),
    Draw(Range<u32>),
}

struct Geometry {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
}

/// [`RenderBackend`] over wgpu, valid for one frame.
///
/// wgpu has no global pipeline state, so the immediate-mode calls are recorded
/// and replayed into a single render pass when the geometry is released.
/// `clear` is the exception: it encodes its own pass right away.
pub struct WgpuBackend<'a> {
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    formats: TargetFormats,
    viewport: Viewport,
    target: RenderTarget<'a>,

    program: Option<SpriteProgram>,
    globals: Option<wgpu::BindGroup>,
    geometry: Option<Geometry>,

    scissor_test: bool,
    scissor_rect: (u32, u32, u32, u32),
    ops: Vec<PassOp>,
}

impl<'a> WgpuBackend<'a> {
    pub fn new(ctx: &RenderCtx<'a>, target: RenderTarget<'a>) -> Self {
        Self {
            device: ctx.device,
            queue: ctx.queue,
            formats: TargetFormats {
                color: ctx.surface_format,
                stencil: ctx.stencil_format,
            },
            viewport: ctx.viewport,
            target,
            program: None,
            globals: None,
            geometry: None,
            scissor_test: false,
            scissor_rect: (0, 0, 0, 0),
            ops: Vec::new(),
        }
    }

    fn target_size(&self) -> (u32, u32) {
        (
            self.viewport.width.max(1.0) as u32,
            self.viewport.height.max(1.0) as u32,
        )
    }

    fn stencil_attachment(
        &self,
        stencil_load: wgpu::LoadOp<u32>,
        depth_load: wgpu::LoadOp<f32>,
    ) -> Option<wgpu::RenderPassDepthStencilAttachment<'a>> {
        let view = self.target.stencil_view?;
        Some(wgpu::RenderPassDepthStencilAttachment {
            view,
            depth_ops: Some(wgpu::Operations {
                load: depth_load,
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: Some(wgpu::Operations {
                load: stencil_load,
                store: wgpu::StoreOp::Store,
            }),
        })
    }

    fn encode_pass(&mut self, geometry: Geometry, program: SpriteProgram, globals: wgpu::BindGroup) {
        let ops = std::mem::take(&mut self.ops);
        if !ops.iter().any(|op| matches!(op, PassOp::Draw(_))) {
            return;
        }

        let (tw, th) = self.target_size();
        let depth_stencil = self.stencil_attachment(wgpu::LoadOp::Load, wgpu::LoadOp::Load);

        let mut rpass = self.target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("drawbatch batches"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: self.target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: depth_stencil,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_bind_group(0, &globals, &[]);
        rpass.set_bind_group(1, program.default_texture(), &[]);
        rpass.set_pipeline(program.pipeline(BlendFunc::SrcAlphaOneMinusSrcAlpha));
        rpass.set_vertex_buffer(0, geometry.vertices.slice(..));
        rpass.set_index_buffer(geometry.indices.slice(..), wgpu::IndexFormat::Uint16);
        rpass.set_scissor_rect(0, 0, tw, th);

        for op in &ops {
            match op {
                PassOp::Pipeline(blend) => rpass.set_pipeline(program.pipeline(*blend)),
                PassOp::Texture(group) => rpass.set_bind_group(1, group, &[]),
                PassOp::Scissor(None) => rpass.set_scissor_rect(0, 0, tw, th),
                PassOp::Scissor(Some((x, y, w, h))) => {
                    // wgpu rejects rects that leave the target.
                    let x = (*x).min(tw);
                    let y = (*y).min(th);
                    rpass.set_scissor_rect(x, y, (*w).min(tw - x), (*h).min(th - y));
                }
                PassOp::Draw(range) => rpass.draw_indexed(range.clone(), 0, 0..1),
            }
        }
    }
}

impl<'a> RenderBackend for WgpuBackend<'a> {
    type Texture = SpriteTexture;
    type Program = SpriteProgram;

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn set_stencil_test(&mut self, enabled: bool) {
        // Pipelines never test the stencil; there is nothing to switch.
        if enabled {
            log::warn!("stencil test requested; masking is not drawn by the wgpu backend");
        }
    }

    fn set_scissor_test(&mut self, enabled: bool) {
        self.scissor_test = enabled;
        self.ops
            .push(PassOp::Scissor(enabled.then_some(self.scissor_rect)));
    }

    fn set_scissor_rect(&mut self, x: u32, y: u32, width: u32, height: u32) {
        self.scissor_rect = (x, y, width, height);
        if self.scissor_test {
            self.ops.push(PassOp::Scissor(Some(self.scissor_rect)));
        }
    }

    fn clear(&mut self, color: ColorRgba, stencil: u32) {
        let depth_stencil =
            self.stencil_attachment(wgpu::LoadOp::Clear(stencil), wgpu::LoadOp::Clear(1.0));

        let _rpass = self.target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("drawbatch clear"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: self.target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(color.into()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: depth_stencil,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
    }

    fn compile_program(&mut self, source: &ShaderSource) -> std::result::Result<SpriteProgram, String> {
        SpriteProgram::compile(self.device, self.queue, self.formats, source)
    }

    fn upload_geometry(&mut self, vertices: &[Vertex], indices: &[u16]) -> Result<()> {
        let vertices = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("drawbatch frame vbo"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        // create_buffer_init pads to COPY_BUFFER_ALIGNMENT, so odd index counts are fine.
        let indices = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("drawbatch frame ibo"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        self.geometry = Some(Geometry { vertices, indices });
        Ok(())
    }

    fn use_program(&mut self, program: &SpriteProgram, projection: &Projection) {
        self.globals = Some(program.globals(self.device, projection));
        self.program = Some(program.clone());
    }

    fn bind_texture(&mut self, texture: Option<&SpriteTexture>) {
        let Some(program) = self.program.as_ref() else { return };
        let group = match texture {
            Some(texture) => program.texture(self.device, texture).clone(),
            None => program.default_texture().clone(),
        };
        self.ops.push(PassOp::Texture(group));
    }

    fn set_blend(&mut self, blend: BlendFunc) {
        self.ops.push(PassOp::Pipeline(blend));
    }

    fn draw_triangles(&mut self, first_index: u32, index_count: u32) {
        self.ops
            .push(PassOp::Draw(first_index..first_index + index_count));
    }

    fn release_geometry(&mut self) {
        let geometry = self.geometry.take();
        let program = self.program.take();
        let globals = self.globals.take();

        match (geometry, program, globals) {
            (Some(geometry), Some(program), Some(globals)) => {
                self.encode_pass(geometry, program, globals);
            }
            // Upload failed or no program was bound; drop whatever was recorded.
            _ => self.ops.clear(),
        }
    }
}
