use std::sync::OnceLock;

use crate::error::{RenderError, Result};

/// Format of every sprite texture. Pixels are straight (not premultiplied) RGBA8.
pub const SPRITE_TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// A GPU texture plus its default view, stored in the texture pool.
///
/// The sampling bind group is built the first time a program binds the
/// texture and reused for every later batch.
#[derive(Debug, Clone)]
pub struct SpriteTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    pub(super) bind_group: OnceLock<wgpu::BindGroup>,
}

impl SpriteTexture {
    /// Uploads `width * height` RGBA8 pixels, rows top to bottom.
    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::Backend(format!(
                "texture size {width}x{height} has zero area"
            )));
        }

        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(RenderError::invalid_buffer(format!(
                "texture {width}x{height} needs {expected} bytes, got {}",
                pixels.len()
            )));
        }

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("drawbatch sprite texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SPRITE_TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(Self {
            texture,
            view,
            bind_group: OnceLock::new(),
        })
    }

    /// 1x1 opaque white. Bound for batches without a texture so the tint passes through.
    pub fn white(device: &wgpu::Device, queue: &wgpu::Queue) -> Result<Self> {
        Self::from_rgba8(device, queue, 1, 1, &[0xff; 4])
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.texture.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.texture.height()
    }

    #[inline]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}
