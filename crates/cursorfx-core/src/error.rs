//! Error types for cursorfx

use thiserror::Error;

/// The main error type for cursorfx operations.
///
/// Per-tick simulation never fails; these variants cover start-up and
/// resource acquisition only.
#[derive(Debug, Error)]
pub enum FxError {
    #[error("Unknown effect: {0}")]
    UnknownEffect(String),

    #[error("Shader compilation failed for {label}: {message}")]
    ShaderCompilation { label: String, message: String },

    #[error("Buffer allocation failed for {label}: {message}")]
    BufferAllocation { label: String, message: String },

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Settings error: {0}")]
    SettingsError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),
}

/// Result type alias for cursorfx operations
pub type Result<T> = std::result::Result<T, FxError>;

impl From<toml::de::Error> for FxError {
    fn from(err: toml::de::Error) -> Self {
        FxError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for FxError {
    fn from(err: toml::ser::Error) -> Self {
        FxError::TomlSerError(err.to_string())
    }
}
