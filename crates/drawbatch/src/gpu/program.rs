use std::num::NonZeroU64;

use crate::command::Vertex;
use crate::coords::Projection;
use crate::render::BlendFunc;
use crate::shader::{ShaderSource, validate_wgsl};

use super::texture::SpriteTexture;

/// Compiled sprite program: one pipeline per blend function plus the shared
/// bind group layouts, sampler and default texture.
///
/// Cloning is cheap; wgpu handles are reference counted.
#[derive(Debug, Clone)]
pub struct SpriteProgram {
    globals_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    blend_normal: wgpu::RenderPipeline,
    blend_add: wgpu::RenderPipeline,
    default_texture: wgpu::BindGroup,
}

/// Surface formats a program is built against.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TargetFormats {
    pub color: wgpu::TextureFormat,
    pub stencil: Option<wgpu::TextureFormat>,
}

impl SpriteProgram {
    /// Validates `source` and builds the pipelines.
    ///
    /// WGSL is checked with naga before it reaches the device, so an invalid
    /// program yields a diagnostic string instead of a device error.
    pub fn compile(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        formats: TargetFormats,
        source: &ShaderSource,
    ) -> Result<Self, String> {
        validate_wgsl(source)?;

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(source.name),
            source: wgpu::ShaderSource::Wgsl(source.wgsl.into()),
        });

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("drawbatch globals bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<Projection>() as u64),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("drawbatch texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("drawbatch sprite pipeline layout"),
            bind_group_layouts: &[&globals_layout, &texture_layout],
            immediate_size: 0,
        });

        let pipeline = |blend: BlendFunc| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(match blend {
                    BlendFunc::SrcAlphaOneMinusSrcAlpha => "drawbatch sprite pipeline (normal)",
                    BlendFunc::SrcAlphaOne => "drawbatch sprite pipeline (add)",
                }),
                layout: Some(&layout),

                vertex: wgpu::VertexState {
                    module: &module,
                    entry_point: Some(source.vertex_entry),
                    compilation_options: Default::default(),
                    buffers: &[Vertex::layout()],
                },

                fragment: Some(wgpu::FragmentState {
                    module: &module,
                    entry_point: Some(source.fragment_entry),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: formats.color,
                        blend: Some(blend_state(blend)),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),

                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },

                // Stencil is attached but never tested.
                depth_stencil: formats.stencil.map(|format| wgpu::DepthStencilState {
                    format,
                    depth_write_enabled: false,
                    depth_compare: wgpu::CompareFunction::Always,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        };

        let blend_normal = pipeline(BlendFunc::SrcAlphaOneMinusSrcAlpha);
        let blend_add = pipeline(BlendFunc::SrcAlphaOne);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("drawbatch sprite sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let white = SpriteTexture::white(device, queue).map_err(|e| e.to_string())?;
        let default_texture = texture_bind_group(device, &texture_layout, &sampler, &white);

        Ok(Self {
            globals_layout,
            texture_layout,
            sampler,
            blend_normal,
            blend_add,
            default_texture,
        })
    }

    #[inline]
    pub fn pipeline(&self, blend: BlendFunc) -> &wgpu::RenderPipeline {
        match blend {
            BlendFunc::SrcAlphaOneMinusSrcAlpha => &self.blend_normal,
            BlendFunc::SrcAlphaOne => &self.blend_add,
        }
    }

    /// Bind group for the 1x1 white texture used by untextured batches.
    #[inline]
    pub fn default_texture(&self) -> &wgpu::BindGroup {
        &self.default_texture
    }

    /// Builds the group 0 bind group holding `projection`.
    pub fn globals(&self, device: &wgpu::Device, projection: &Projection) -> wgpu::BindGroup {
        use wgpu::util::DeviceExt;

        let ubo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("drawbatch globals ubo"),
            contents: bytemuck::bytes_of(projection),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("drawbatch globals bind group"),
            layout: &self.globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.as_entire_binding(),
            }],
        })
    }

    /// The group 1 bind group sampling `texture`, created on first use and
    /// cached on the texture.
    pub fn texture<'t>(&self, device: &wgpu::Device, texture: &'t SpriteTexture) -> &'t wgpu::BindGroup {
        texture
            .bind_group
            .get_or_init(|| texture_bind_group(device, &self.texture_layout, &self.sampler, texture))
    }
}

fn texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    texture: &SpriteTexture,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("drawbatch texture bind group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(texture.view()),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

/// Straight-alpha blend states for the two blend functions.
pub(crate) fn blend_state(blend: BlendFunc) -> wgpu::BlendState {
    let dst_factor = match blend {
        BlendFunc::SrcAlphaOneMinusSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
        BlendFunc::SrcAlphaOne => wgpu::BlendFactor::One,
    };
    let component = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor,
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState {
        color: component,
        alpha: component,
    }
}
