//! Rotation-aware mapping of detector boxes onto preview overlays.
//!
//! This crate provides:
//! - Rotation remapping between the session orientation and the live display
//! - Cover scaling, centering and front-camera mirroring onto the overlay
//! - Immutable frame sessions with a shared handle for rotation updates
//! - Per-frame dispatch of detection entities into overlay items
//! - Environment configuration and fallback counters

pub mod config;
pub mod error;
pub mod mapper;
pub mod metrics;
pub mod overlay;
pub mod rotation;
pub mod session;

pub use config::MapperConfig;
pub use error::{MapperError, MapperResult};
pub use mapper::{BoundingBoxMapper, DisplayProbe, OverlayProjection, StaticDisplay};
pub use overlay::{OverlayBuilder, OverlayFrame, OverlayItem, OverlayKind, OverlayOptions};
pub use rotation::{mirror_horizontally, relative_rotation, rotate_rect};
pub use session::{spawn_rotation_listener, FrameSession, SessionHandle};
