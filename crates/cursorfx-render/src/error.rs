//! Render error type

use cursorfx_core::FxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to get adapter")]
    AdapterNotFound,
    #[error("Failed to create device: {0}")]
    DeviceCreation(String),
    #[error("Shader '{label}' failed to compile: {message}")]
    ShaderCompilation { label: String, message: String },
    #[error("No shader source for effect '{0}'")]
    MissingShader(String),
    #[error("Buffer '{label}' could not be allocated: {message}")]
    BufferAllocation { label: String, message: String },
    #[error("Unknown {kind} handle {index}")]
    InvalidHandle { kind: &'static str, index: usize },
    #[error("Upload of {len} bytes does not fit buffer of {capacity} bytes")]
    UploadTooLarge { len: usize, capacity: u64 },
    #[error("Screen capture must be {expected} bytes, got {actual}")]
    CaptureSize { expected: usize, actual: usize },
    #[error("Failed to read render buffer: {0}")]
    BufferReadFailed(String),
}

impl From<RenderError> for FxError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::ShaderCompilation { label, message } => {
                FxError::ShaderCompilation { label, message }
            }
            RenderError::BufferAllocation { label, message } => {
                FxError::BufferAllocation { label, message }
            }
            other => FxError::RenderError(other.to_string()),
        }
    }
}
