//! Error types for session setup and configuration.
//!
//! The mapping call itself never fails; these cover the values that feed it.

use overlay_models::FrameSize;
use thiserror::Error;

/// Result type for mapper operations.
pub type MapperResult<T> = Result<T, MapperError>;

/// Errors that can occur while building sessions or loading configuration.
#[derive(Debug, Error)]
pub enum MapperError {
    #[error("Invalid frame size {0}: both axes must be between 1 and 2147483647")]
    InvalidFrameSize(FrameSize),

    #[error("Invalid rotation: {0}")]
    InvalidRotation(String),

    #[error("Invalid sensor orientation: {0} degrees")]
    InvalidSensorOrientation(u32),

    #[error("Configuration error for {key}: {message}")]
    Config { key: String, message: String },
}

impl MapperError {
    /// Create a configuration error for an environment key.
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create an invalid rotation error.
    pub fn invalid_rotation(value: impl Into<String>) -> Self {
        Self::InvalidRotation(value.into())
    }
}
