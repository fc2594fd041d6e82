//! cursorfx Render - GPU side of the overlay effects
//!
//! Effects hand over dense instance buffers; this crate owns the narrow
//! backend contract they are drawn through (create buffer, update buffer,
//! compile shader, instanced draw), a wgpu implementation rendering
//! offscreen, and the WGSL SDF shaders that shade every effect procedurally.

pub mod backend;
mod error;
mod headless;
pub mod renderer;
pub mod shaders;
mod wgpu_backend;

pub use backend::{
    BlendMode, BufferId, FrameUniforms, RecordedDraw, RecordedFrame, RecordingBackend,
    RenderBackend, ShaderDesc, ShaderId,
};
pub use error::RenderError;
pub use headless::HeadlessContext;
pub use renderer::{EffectRenderer, FrameStats};
pub use shaders::{effect_shader, EffectShader};
pub use wgpu_backend::WgpuBackend;
