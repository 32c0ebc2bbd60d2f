//! Replay scripts and the runner that maps them.
//!
//! A script records one capture session: the analysis resolution chosen for
//! the camera, the display rotation at startup, and an ordered list of
//! rotation notifications and processed frames. Running it feeds rotations
//! through a [`SessionHandle`] and every frame's entities through an
//! [`OverlayBuilder`], producing one [`ReplayOutput`] per frame.

use std::path::Path;

use overlay_mapper::{
    FrameSession, MapperConfig, OverlayBuilder, OverlayItem, SessionHandle, StaticDisplay,
};
use overlay_models::{
    AxisSwapPolicy, CameraFacing, DeviceProfile, Entity, FrameSize, OverlaySize, Rotation,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ReplayError, ReplayResult};

/// A recorded capture session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayScript {
    /// Landscape-first resolution reported by the camera
    pub analysis_resolution: FrameSize,
    pub initial_rotation: Rotation,
    #[serde(default)]
    pub facing: CameraFacing,
    /// Overrides the configured device when present
    #[serde(default)]
    pub device: Option<DeviceProfile>,
    /// Overrides the configured axis-swap policy when present
    #[serde(default)]
    pub axis_swap_policy: Option<AxisSwapPolicy>,
    #[serde(default)]
    pub events: Vec<ReplayEvent>,
}

/// One step of a recorded session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplayEvent {
    /// Display rotation notification
    Rotation { rotation: Rotation },
    /// A processed frame and the display state when its results arrived
    Frame {
        rotation: Rotation,
        overlay: OverlaySize,
        #[serde(default)]
        entities: Vec<Entity>,
    },
}

/// Overlay items for one replayed frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayOutput {
    /// Index among the script's frame events, from 0
    pub frame: usize,
    pub items: Vec<OverlayItem>,
}

impl ReplayScript {
    /// Parse a script from JSON text.
    pub fn from_json(json: &str) -> ReplayResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a script file.
    pub async fn load(path: impl AsRef<Path>) -> ReplayResult<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ReplayError::io(path, e))?;
        Self::from_json(&json)
    }

    pub fn frame_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, ReplayEvent::Frame { .. }))
            .count()
    }
}

/// Runs scripts against a mapper configuration.
#[derive(Debug, Clone, Default)]
pub struct Replayer {
    config: MapperConfig,
}

impl Replayer {
    pub fn new(config: MapperConfig) -> Self {
        Self { config }
    }

    /// Replay every event in order, calling `emit` once per frame.
    pub fn run_with<F>(&self, script: &ReplayScript, mut emit: F) -> ReplayResult<usize>
    where
        F: FnMut(ReplayOutput) -> ReplayResult<()>,
    {
        let device = script.device.unwrap_or(self.config.device);
        let policy = script
            .axis_swap_policy
            .unwrap_or(self.config.axis_swap_policy);

        let session = FrameSession::from_analysis_resolution(
            script.analysis_resolution,
            script.initial_rotation,
            script.facing,
            device,
        )?;
        info!(
            frame = %session.frame(),
            rotation = %session.initial_rotation(),
            facing = script.facing.as_str(),
            policy = policy.as_str(),
            "Starting replay"
        );
        let handle = SessionHandle::new(session);

        let mut frames = 0;
        for event in &script.events {
            match event {
                ReplayEvent::Rotation { rotation } => {
                    handle.on_display_rotation_changed(*rotation);
                }
                ReplayEvent::Frame {
                    rotation,
                    overlay,
                    entities,
                } => {
                    let builder = OverlayBuilder::new(handle.mapper(policy), self.config.overlay);
                    let display = StaticDisplay {
                        rotation: *rotation,
                        overlay: *overlay,
                    };
                    let overlay_frame = builder.build(entities, &display);
                    debug!(frame = frames, items = overlay_frame.len(), "Replayed frame");
                    emit(ReplayOutput {
                        frame: frames,
                        items: overlay_frame.items,
                    })?;
                    frames += 1;
                }
            }
        }

        info!(frames, "Replay complete");
        Ok(frames)
    }

    /// Replay a script and collect the outputs.
    pub fn run(&self, script: &ReplayScript) -> ReplayResult<Vec<ReplayOutput>> {
        let mut outputs = Vec::with_capacity(script.frame_count());
        self.run_with(script, |output| {
            outputs.push(output);
            Ok(())
        })?;
        Ok(outputs)
    }
}
