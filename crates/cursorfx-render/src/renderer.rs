//! Turns per-effect draw data into backend calls: one buffer update and one
//! instanced draw per effect with live instances.

use crate::backend::{BufferId, FrameUniforms, RenderBackend, ShaderDesc, ShaderId};
use crate::error::RenderError;
use crate::shaders::{effect_shader, FRAGMENT_ENTRY, QUAD_VERTICES, VERTEX_ENTRY};
use cursorfx_particles::EffectDrawData;
use tracing::{debug, info};

struct EffectSlot {
    name: &'static str,
    buffer: BufferId,
    shader: ShaderId,
}

/// Counts from one rendered frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draw_calls: usize,
    pub live_instances: usize,
}

pub struct EffectRenderer<B: RenderBackend> {
    backend: B,
    slots: Vec<EffectSlot>,
}

impl<B: RenderBackend> EffectRenderer<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            slots: Vec::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Allocate buffers and compile shaders for every effect up front, so
    /// resource failures surface before the first frame
    pub fn prepare(&mut self, draws: &[EffectDrawData<'_>]) -> Result<(), RenderError> {
        for draw in draws {
            self.slot(draw)?;
        }
        info!(effects = self.slots.len(), "effect pipelines ready");
        Ok(())
    }

    /// Screen image sampled by refracting effects
    pub fn set_screen_capture(
        &mut self,
        rgba: &[u8],
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        self.backend.set_screen_capture(rgba, width, height)
    }

    pub fn render(
        &mut self,
        draws: &[EffectDrawData<'_>],
        uniforms: FrameUniforms,
    ) -> Result<FrameStats, RenderError> {
        let mut stats = FrameStats::default();
        self.backend.begin_frame(uniforms)?;
        for draw in draws {
            if draw.live_count == 0 {
                continue;
            }
            let index = self.slot(draw)?;
            let (buffer, shader) = (self.slots[index].buffer, self.slots[index].shader);
            self.backend.update_buffer(buffer, draw.bytes)?;
            self.backend
                .draw_instanced(shader, buffer, QUAD_VERTICES, draw.hard_max as u32)?;
            stats.draw_calls += 1;
            stats.live_instances += draw.live_count;
        }
        self.backend.end_frame()?;
        Ok(stats)
    }

    fn slot(&mut self, draw: &EffectDrawData<'_>) -> Result<usize, RenderError> {
        if let Some(index) = self.slots.iter().position(|s| s.name == draw.name) {
            return Ok(index);
        }

        let shader_src =
            effect_shader(draw.name).ok_or_else(|| RenderError::MissingShader(draw.name.to_string()))?;
        let size = (draw.hard_max * draw.record_size) as u64;
        let buffer = self.backend.create_instance_buffer(draw.name, size)?;
        let source = shader_src.source();
        let shader = self.backend.compile_shader(&ShaderDesc {
            label: draw.name,
            source: &source,
            vertex_entry: VERTEX_ENTRY,
            fragment_entry: FRAGMENT_ENTRY,
            blend: shader_src.blend,
        })?;

        debug!(effect = draw.name, size, "effect resources created");
        self.slots.push(EffectSlot {
            name: draw.name,
            buffer,
            shader,
        });
        Ok(self.slots.len() - 1)
    }
}
