//! Replay configuration.

use std::path::PathBuf;

use overlay_mapper::MapperConfig;

use crate::error::{ReplayError, ReplayResult};

/// Replay binary configuration.
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Script to replay
    pub input: PathBuf,
    /// Render Prometheus counters to stderr after the run
    pub metrics_enabled: bool,
    /// Mapper and overlay settings
    pub mapper: MapperConfig,
}

impl ReplayConfig {
    /// Create config from the command line and environment variables.
    ///
    /// The first argument wins over `OVERLAY_REPLAY_INPUT`.
    pub fn from_env(args: impl IntoIterator<Item = String>) -> ReplayResult<Self> {
        Self::from_lookup(args, |key| std::env::var(key).ok())
    }

    /// Create config from the command line and an arbitrary key lookup.
    pub fn from_lookup<F>(args: impl IntoIterator<Item = String>, lookup: F) -> ReplayResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let input = args
            .into_iter()
            .next()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| lookup("OVERLAY_REPLAY_INPUT").filter(|s| !s.trim().is_empty()))
            .map(PathBuf::from)
            .ok_or(ReplayError::MissingInput)?;

        Ok(Self {
            input,
            metrics_enabled: lookup("METRICS_ENABLED")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            mapper: MapperConfig::from_lookup(&lookup)?,
        })
    }
}
