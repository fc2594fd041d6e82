//! Headless overlay-to-PNG render command

use super::script::{self, SimulationArgs};
use anyhow::{Context, Result};
use cursorfx_render::{EffectRenderer, FrameUniforms, WgpuBackend};
use std::path::PathBuf;
use tracing::info;

pub struct RenderArgs {
    pub simulation: SimulationArgs,
    pub output: PathBuf,
    /// Image drawn behind the overlay and sampled for refraction
    pub background: Option<PathBuf>,
}

pub fn run(args: RenderArgs) -> Result<()> {
    let width = args.simulation.script.width as u32;
    let height = args.simulation.script.height as u32;

    // Create the GPU side first so a missing adapter fails fast
    let backend = pollster::block_on(WgpuBackend::new(width, height))
        .context("Failed to create headless render context")?;
    let mut renderer = EffectRenderer::new(backend);

    let background = match &args.background {
        Some(path) => {
            let img = image::open(path)
                .with_context(|| format!("Failed to open background {}", path.display()))?
                .resize_exact(width, height, image::imageops::FilterType::Triangle)
                .to_rgba8();
            renderer
                .set_screen_capture(img.as_raw(), width, height)
                .context("Failed to upload background")?;
            Some(img)
        }
        None => None,
    };

    let mut sim = script::run(&args.simulation)?;
    sim.system.stack.pack();
    let draws = sim.system.stack.draw_data();
    renderer
        .prepare(&draws)
        .context("Failed to create effect pipelines")?;

    let stats = renderer
        .render(
            &draws,
            FrameUniforms {
                screen_size: [width as f32, height as f32],
                time: sim.total_time as f32,
                has_capture: 0.0,
            },
        )
        .context("Failed to render overlay")?;
    info!(
        draw_calls = stats.draw_calls,
        instances = stats.live_instances,
        "overlay rendered"
    );

    let pixels = pollster::block_on(renderer.backend().read_pixels())
        .context("Failed to read back rendered pixels")?;
    let overlay = image::RgbaImage::from_raw(width, height, pixels)
        .context("Failed to create image from pixel data")?;

    let img = match background {
        Some(mut base) => {
            image::imageops::overlay(&mut base, &overlay, 0, 0);
            base
        }
        None => overlay,
    };
    img.save(&args.output)
        .with_context(|| format!("Failed to save image to {}", args.output.display()))?;

    println!(
        "Rendered {} instances from {} effects to {}",
        stats.live_instances,
        stats.draw_calls,
        args.output.display()
    );
    Ok(())
}
