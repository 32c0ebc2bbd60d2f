//! Shared data models for overlay mapping.
//!
//! This crate provides Serde-serializable types for:
//! - Pixel rectangles, frame and overlay dimensions
//! - Display rotation, camera facing and device profiles
//! - Detection entities reported by the vision SDK
//! - Tracker filter selections

pub mod entity;
pub mod filter;
pub mod orientation;
pub mod rect;

// Re-export common types
pub use entity::{
    BarcodeEntity, ComplexBBox, Entity, LabelClass, LabelEntity, LineEntity, ParagraphEntity,
    ProductEntity, ShelfEntity, SkuInfo, WordEntity,
};
pub use filter::{FilterType, TrackerFilter};
pub use orientation::{
    AxisSwapPolicy, CameraFacing, DeviceClass, DeviceProfile, ModelParseError, Rotation,
    SensorOrientation,
};
pub use rect::{FrameSize, OverlaySize, PixelRect};
