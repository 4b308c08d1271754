//! Demo host: packs a small animated scene every frame and draws it through
//! the batched renderer.

mod scene;

use anyhow::{Context, Result};
use drawbatch::command::{BlendMode, COLOR_WHITE, pack_rgba};
use drawbatch::core::{App, AppControl, FrameCtx};
use drawbatch::device::{Gpu, GpuInit};
use drawbatch::gpu::{SpriteTexture, WgpuRenderer};
use drawbatch::logging::{LoggingConfig, init_logging};
use drawbatch::time::FrameTime;
use drawbatch::window::{Runtime, RuntimeConfig};
use drawbatch::{RendererConfig, TextureHandle};

use scene::{FrameBuilder, Quad};

const CHECKER_SIZE: u32 = 64;
const CHECKER_CELL: u32 = 8;

struct Viewer {
    renderer: WgpuRenderer,
    checker: Option<TextureHandle>,
    frame: FrameBuilder,
    t: f32,
}

impl Viewer {
    fn new() -> Self {
        Self {
            renderer: WgpuRenderer::new(RendererConfig::default()),
            checker: None,
            frame: FrameBuilder::default(),
            t: 0.0,
        }
    }

    fn build_scene(&mut self, width: f32, height: f32) -> Result<()> {
        self.frame.clear();

        // Untextured backdrop strip, tinted.
        self.frame.push_untextured(
            Quad::new(0.0, height - 48.0, width, 48.0, pack_rgba(0x20, 0x30, 0x60, 0xff)),
            BlendMode::Normal,
        )?;

        if let Some(checker) = self.checker {
            let id = checker.to_batch_id();
            let wobble = self.t.sin() * 24.0;

            for i in 0..4 {
                let x = 32.0 + i as f32 * 96.0;
                let alpha = 0x40 + i as u8 * 0x3f;
                self.frame.push(
                    Quad::new(x, 48.0 + wobble, 80.0, 80.0, pack_rgba(0xff, 0xff, 0xff, alpha)),
                    id,
                    BlendMode::Normal,
                )?;
            }

            // Red offset pushes the checker toward red.
            self.frame.push(
                Quad::new(32.0, 176.0, 80.0, 80.0, COLOR_WHITE)
                    .with_offset(pack_rgba(0xc0, 0x80, 0x80, 0x80)),
                id,
                BlendMode::Normal,
            )?;
        }

        // Additive glow pair overlapping the strip.
        let pulse = (self.t * 2.0).sin() * 0.5 + 0.5;
        let glow = pack_rgba(0xff, 0x90, 0x20, (pulse * 200.0) as u8);
        for x in [width * 0.5 - 120.0, width * 0.5 - 40.0] {
            self.frame
                .push_untextured(Quad::new(x, height - 96.0, 160.0, 96.0, glow), BlendMode::Add)?;
        }
        Ok(())
    }
}

impl App for Viewer {
    fn init(&mut self, gpu: &Gpu<'_>) -> Result<()> {
        let pixels = checkerboard(CHECKER_SIZE, CHECKER_CELL);
        let texture = SpriteTexture::from_rgba8(
            gpu.device(),
            gpu.queue(),
            CHECKER_SIZE,
            CHECKER_SIZE,
            &pixels,
        )
        .context("failed to create checker texture")?;

        let handle = self.renderer.allocate_texture(texture)?;
        log::info!("checker texture bound to {handle}");
        self.checker = Some(handle);
        Ok(())
    }

    fn update(&mut self, time: FrameTime) -> AppControl {
        self.t += time.dt;
        AppControl::Continue
    }

    fn render(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<AppControl> {
        let size = ctx.gpu.size();
        self.build_scene(size.width as f32, size.height as f32)?;

        let data = self.frame.finish();
        ctx.render(&mut self.renderer, &data)
    }
}

/// Two-tone RGBA8 checkerboard with a transparent hole in the middle cell.
fn checkerboard(size: u32, cell: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    let center = size / cell / 2;
    for y in 0..size {
        for x in 0..size {
            let (cx, cy) = (x / cell, y / cell);
            let texel = if cx == center && cy == center {
                [0, 0, 0, 0]
            } else if (cx + cy) % 2 == 0 {
                [0xf0, 0xf0, 0xf0, 0xff]
            } else {
                [0x30, 0xa0, 0x60, 0xff]
            };
            pixels.extend_from_slice(&texel);
        }
    }
    pixels
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    Runtime::run(
        RuntimeConfig {
            title: "drawbatch viewer".to_string(),
            ..RuntimeConfig::default()
        },
        GpuInit::default(),
        Viewer::new(),
    )
}
