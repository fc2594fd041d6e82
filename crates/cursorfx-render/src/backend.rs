//! The narrow contract between effects and a graphics API.
//!
//! An effect needs four things from the GPU: a storage buffer sized for its
//! full pool, a way to overwrite it each frame, a compiled shader, and an
//! instanced draw of one quad per pool slot. `RecordingBackend` implements the
//! same contract in memory for tests and dry runs.

use crate::error::RenderError;
use bytemuck::{Pod, Zeroable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderId(pub usize);

/// How an effect's fragments combine with what is already on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    Alpha,
    /// src_alpha + one, for glowing effects
    Additive,
}

/// Shader source plus its entry points
#[derive(Debug, Clone)]
pub struct ShaderDesc<'a> {
    pub label: &'a str,
    pub source: &'a str,
    pub vertex_entry: &'a str,
    pub fragment_entry: &'a str,
    pub blend: BlendMode,
}

/// Per-frame uniforms shared by every effect shader. Matches `Frame` in
/// `common.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub screen_size: [f32; 2],
    pub time: f32,
    /// 1.0 when a screen capture texture is bound
    pub has_capture: f32,
}

pub trait RenderBackend {
    /// Allocate a zeroed storage buffer of `size` bytes
    fn create_instance_buffer(&mut self, label: &str, size: u64) -> Result<BufferId, RenderError>;

    /// Overwrite the start of `buffer` with `bytes`
    fn update_buffer(&mut self, buffer: BufferId, bytes: &[u8]) -> Result<(), RenderError>;

    fn compile_shader(&mut self, desc: &ShaderDesc<'_>) -> Result<ShaderId, RenderError>;

    /// Replace the screen capture sampled by refracting effects. `rgba` is
    /// tightly packed, `width * height * 4` bytes.
    fn set_screen_capture(&mut self, rgba: &[u8], width: u32, height: u32)
        -> Result<(), RenderError>;

    fn begin_frame(&mut self, uniforms: FrameUniforms) -> Result<(), RenderError>;

    /// Queue an instanced draw: `vertices` per instance, `instances` instances
    fn draw_instanced(
        &mut self,
        shader: ShaderId,
        buffer: BufferId,
        vertices: u32,
        instances: u32,
    ) -> Result<(), RenderError>;

    /// Submit everything queued since `begin_frame`
    fn end_frame(&mut self) -> Result<(), RenderError>;
}

/// One draw captured by `RecordingBackend`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedDraw {
    pub shader: ShaderId,
    pub buffer: BufferId,
    pub vertices: u32,
    pub instances: u32,
}

#[derive(Debug, Clone, Default)]
pub struct RecordedFrame {
    pub uniforms: FrameUniforms,
    pub draws: Vec<RecordedDraw>,
}

/// In-memory backend: keeps buffer contents, shader labels and every
/// submitted frame
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub buffers: Vec<(String, Vec<u8>)>,
    pub shaders: Vec<(String, BlendMode)>,
    pub frames: Vec<RecordedFrame>,
    pub capture: Option<(u32, u32)>,
    current: Option<RecordedFrame>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self, id: BufferId) -> Option<&[u8]> {
        self.buffers.get(id.0).map(|(_, bytes)| bytes.as_slice())
    }

    pub fn last_frame(&self) -> Option<&RecordedFrame> {
        self.frames.last()
    }
}

impl RenderBackend for RecordingBackend {
    fn create_instance_buffer(&mut self, label: &str, size: u64) -> Result<BufferId, RenderError> {
        let len = usize::try_from(size).map_err(|e| RenderError::BufferAllocation {
            label: label.to_string(),
            message: e.to_string(),
        })?;
        self.buffers.push((label.to_string(), vec![0; len]));
        Ok(BufferId(self.buffers.len() - 1))
    }

    fn update_buffer(&mut self, buffer: BufferId, bytes: &[u8]) -> Result<(), RenderError> {
        let (_, contents) = self
            .buffers
            .get_mut(buffer.0)
            .ok_or(RenderError::InvalidHandle {
                kind: "buffer",
                index: buffer.0,
            })?;
        if bytes.len() > contents.len() {
            return Err(RenderError::UploadTooLarge {
                len: bytes.len(),
                capacity: contents.len() as u64,
            });
        }
        contents[..bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    fn compile_shader(&mut self, desc: &ShaderDesc<'_>) -> Result<ShaderId, RenderError> {
        for entry in [desc.vertex_entry, desc.fragment_entry] {
            if !desc.source.contains(&format!("fn {entry}(")) {
                return Err(RenderError::ShaderCompilation {
                    label: desc.label.to_string(),
                    message: format!("entry point '{entry}' not found"),
                });
            }
        }
        self.shaders.push((desc.label.to_string(), desc.blend));
        Ok(ShaderId(self.shaders.len() - 1))
    }

    fn set_screen_capture(
        &mut self,
        rgba: &[u8],
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(RenderError::CaptureSize {
                expected,
                actual: rgba.len(),
            });
        }
        self.capture = Some((width, height));
        Ok(())
    }

    fn begin_frame(&mut self, uniforms: FrameUniforms) -> Result<(), RenderError> {
        self.current = Some(RecordedFrame {
            uniforms,
            draws: Vec::new(),
        });
        Ok(())
    }

    fn draw_instanced(
        &mut self,
        shader: ShaderId,
        buffer: BufferId,
        vertices: u32,
        instances: u32,
    ) -> Result<(), RenderError> {
        if shader.0 >= self.shaders.len() {
            return Err(RenderError::InvalidHandle {
                kind: "shader",
                index: shader.0,
            });
        }
        if buffer.0 >= self.buffers.len() {
            return Err(RenderError::InvalidHandle {
                kind: "buffer",
                index: buffer.0,
            });
        }
        self.current
            .get_or_insert_with(RecordedFrame::default)
            .draws
            .push(RecordedDraw {
                shader,
                buffer,
                vertices,
                instances,
            });
        Ok(())
    }

    fn end_frame(&mut self) -> Result<(), RenderError> {
        if let Some(frame) = self.current.take() {
            self.frames.push(frame);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "fn vs_main() {}\nfn fs_main() {}";

    fn desc(source: &str) -> ShaderDesc<'_> {
        ShaderDesc {
            label: "test",
            source,
            vertex_entry: "vs_main",
            fragment_entry: "fs_main",
            blend: BlendMode::Alpha,
        }
    }

    #[test]
    fn buffers_start_zeroed_and_accept_prefix_updates() {
        let mut backend = RecordingBackend::new();
        let id = backend.create_instance_buffer("b", 8).unwrap();
        backend.update_buffer(id, &[1, 2, 3]).unwrap();
        assert_eq!(backend.buffer(id), Some(&[1, 2, 3, 0, 0, 0, 0, 0][..]));
        assert!(matches!(
            backend.update_buffer(id, &[0; 9]),
            Err(RenderError::UploadTooLarge { .. })
        ));
    }

    #[test]
    fn missing_entry_point_fails_compilation() {
        let mut backend = RecordingBackend::new();
        assert!(backend.compile_shader(&desc(SOURCE)).is_ok());
        assert!(matches!(
            backend.compile_shader(&desc("fn vs_main() {}")),
            Err(RenderError::ShaderCompilation { .. })
        ));
    }

    #[test]
    fn frames_record_draws_in_order() {
        let mut backend = RecordingBackend::new();
        let shader = backend.compile_shader(&desc(SOURCE)).unwrap();
        let buffer = backend.create_instance_buffer("b", 16).unwrap();
        backend.begin_frame(FrameUniforms::default()).unwrap();
        backend.draw_instanced(shader, buffer, 6, 10).unwrap();
        assert!(backend.draw_instanced(ShaderId(5), buffer, 6, 1).is_err());
        backend.end_frame().unwrap();

        let frame = backend.last_frame().cloned().unwrap_or_default();
        assert_eq!(frame.draws.len(), 1);
        assert_eq!(frame.draws[0].instances, 10);
    }

    #[test]
    fn capture_size_is_checked() {
        let mut backend = RecordingBackend::new();
        assert!(backend.set_screen_capture(&[0; 16], 2, 2).is_ok());
        assert!(backend.set_screen_capture(&[0; 15], 2, 2).is_err());
    }
}
