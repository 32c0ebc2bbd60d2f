//! Error types for replay runs.

use std::path::PathBuf;

use overlay_mapper::MapperError;
use thiserror::Error;

/// Result type for replay operations.
pub type ReplayResult<T> = Result<T, ReplayError>;

/// Errors that can occur while loading or running a replay.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("No replay input given; pass a path or set OVERLAY_REPLAY_INPUT")]
    MissingInput,

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid replay script: {0}")]
    InvalidScript(#[from] serde_json::Error),

    #[error("Mapper error: {0}")]
    Mapper(#[from] MapperError),
}

impl ReplayError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
