//! Bounding Box Mapping onto the Preview Overlay
//!
//! Provides the mapping between:
//! - **Frame space**: detector output coordinates in the frame orientation
//!   configured for the capture session
//! - **Overlay space**: pixel coordinates of the preview overlay the user sees
//!
//! # Key Concepts
//!
//! ## Relative rotation
//! The display may have turned since the session was configured. The box is
//! first remapped by `(current - initial) mod 4` quarter turns.
//!
//! ## Cover scaling
//! The frame is scaled uniformly with `max(scale_x, scale_y)` so it always
//! covers the overlay. Overflow is cropped and split evenly on both sides,
//! which makes one of the offsets zero and the other negative or zero.
//!
//! ## Mirroring
//! Front camera previews are mirrored, so boxes are flipped horizontally
//! inside the effective frame width before projection.
//!
//! # Usage
//! ```rust
//! use overlay_mapper::{BoundingBoxMapper, FrameSession};
//! use overlay_models::{
//!     AxisSwapPolicy, CameraFacing, DeviceProfile, FrameSize, OverlaySize, PixelRect, Rotation,
//! };
//!
//! let session = FrameSession::new(
//!     FrameSize::new(1080, 1920),
//!     Rotation::Deg0,
//!     CameraFacing::Back,
//!     DeviceProfile::default(),
//! )
//! .unwrap();
//! let mapper = BoundingBoxMapper::new(session, AxisSwapPolicy::default());
//!
//! let rect = mapper.map_to_overlay(
//!     PixelRect::new(100, 200, 300, 400),
//!     Rotation::Deg0,
//!     OverlaySize::new(1080, 1920),
//! );
//! assert_eq!(rect, PixelRect::new(100, 200, 300, 400));
//! ```

use overlay_models::{AxisSwapPolicy, FrameSize, OverlaySize, PixelRect, Rotation};
use tracing::debug;

use crate::metrics;
use crate::rotation::{mirror_horizontally, relative_ordinal, rotate_rect_by_ordinal};
use crate::session::FrameSession;

/// Live display state read at mapping time.
///
/// Implemented by whatever owns the preview: it knows the current display
/// rotation and the overlay's laid-out size.
pub trait DisplayProbe {
    fn current_rotation(&self) -> Rotation;
    fn overlay_size(&self) -> OverlaySize;
}

/// Fixed display state, useful for replays and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticDisplay {
    pub rotation: Rotation,
    pub overlay: OverlaySize,
}

impl DisplayProbe for StaticDisplay {
    fn current_rotation(&self) -> Rotation {
        self.rotation
    }

    fn overlay_size(&self) -> OverlaySize {
        self.overlay
    }
}

/// Scale and centering for projecting the effective frame onto the overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayProjection {
    /// Effective frame after the device axis swap
    pub effective: FrameSize,
    /// Overlay the frame is projected onto
    pub overlay: OverlaySize,
    /// Uniform scale factor, `max(scale_x, scale_y)`
    pub scale: f64,
    /// Horizontal centering offset in overlay pixels
    pub offset_x: f64,
    /// Vertical centering offset in overlay pixels
    pub offset_y: f64,
}

impl OverlayProjection {
    /// Compute cover scaling of `effective` onto `overlay`.
    ///
    /// Returns `None` if either size has a zero axis.
    pub fn compute(effective: FrameSize, overlay: OverlaySize) -> Option<Self> {
        if effective.is_empty() || !overlay.is_laid_out() {
            return None;
        }

        let ew = effective.width as f64;
        let eh = effective.height as f64;
        let ow = overlay.width as f64;
        let oh = overlay.height as f64;

        let scale_x = ow / ew;
        let scale_y = oh / eh;
        let scale = scale_x.max(scale_y);

        Some(Self {
            effective,
            overlay,
            scale,
            offset_x: (ow - ew * scale) / 2.0,
            offset_y: (oh - eh * scale) / 2.0,
        })
    }

    /// Map a point from effective frame space to overlay space.
    #[inline]
    pub fn map_point(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.scale + self.offset_x, y * self.scale + self.offset_y)
    }

    /// Project a frame-space rectangle, truncating each edge toward zero.
    pub fn project(&self, bbox: PixelRect) -> PixelRect {
        let (left, top) = self.map_point(bbox.left as f64, bbox.top as f64);
        let (right, bottom) = self.map_point(bbox.right as f64, bbox.bottom as f64);
        PixelRect::new(left as i32, top as i32, right as i32, bottom as i32)
    }
}

/// Maps detector boxes onto the preview overlay for one frame session.
///
/// Holds no per-call state; a shared reference can be used from any thread.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBoxMapper {
    session: FrameSession,
    policy: AxisSwapPolicy,
}

impl BoundingBoxMapper {
    pub fn new(session: FrameSession, policy: AxisSwapPolicy) -> Self {
        Self { session, policy }
    }

    pub fn session(&self) -> &FrameSession {
        &self.session
    }

    pub fn policy(&self) -> AxisSwapPolicy {
        self.policy
    }

    /// Frame dimensions used for scaling at `relative` rotation.
    pub fn effective_frame(&self, relative: Rotation) -> FrameSize {
        self.effective_frame_for(Some(relative))
    }

    /// An unknown relative rotation matches no swap rule.
    fn effective_frame_for(&self, relative: Option<Rotation>) -> FrameSize {
        let frame = self.session.frame();
        let swap = relative.map_or(false, |relative| {
            self.policy.should_swap(&self.session.device(), relative)
        });
        if swap {
            frame.swapped()
        } else {
            frame
        }
    }

    /// Scale and offsets used at `relative` rotation, if the overlay is laid out.
    pub fn projection(&self, relative: Rotation, overlay: OverlaySize) -> Option<OverlayProjection> {
        OverlayProjection::compute(self.effective_frame(relative), overlay)
    }

    /// Map a frame-space box into overlay pixels, reading the display from `probe`.
    pub fn map_with_probe<P: DisplayProbe + ?Sized>(&self, bbox: PixelRect, probe: &P) -> PixelRect {
        self.map_to_overlay(bbox, probe.current_rotation(), probe.overlay_size())
    }

    /// Map a frame-space box into overlay pixels.
    ///
    /// If the overlay has not been laid out yet the input box is returned
    /// unchanged; the next laid-out frame corrects it.
    pub fn map_to_overlay(
        &self,
        bbox: PixelRect,
        current: Rotation,
        overlay: OverlaySize,
    ) -> PixelRect {
        let ordinal = relative_ordinal(current.ordinal(), self.session.initial_rotation().ordinal());
        self.map_with_relative_ordinal(bbox, ordinal, overlay)
    }

    /// Map with an explicit relative rotation ordinal.
    ///
    /// Ordinals outside `0..=3` fall back to no rotation.
    pub fn map_with_relative_ordinal(
        &self,
        bbox: PixelRect,
        ordinal: i32,
        overlay: OverlaySize,
    ) -> PixelRect {
        if !overlay.is_laid_out() {
            debug!(overlay = %overlay, "Overlay not laid out, passing bbox through");
            metrics::record_not_laid_out();
            return bbox;
        }

        let frame = self.session.frame();
        let rotated = rotate_rect_by_ordinal(bbox, ordinal, frame);

        let effective = self.effective_frame_for(Rotation::from_ordinal(ordinal));
        let projection = match OverlayProjection::compute(effective, overlay) {
            Some(projection) => projection,
            None => {
                metrics::record_not_laid_out();
                return bbox;
            }
        };

        let oriented = if self.session.facing().is_front() {
            mirror_horizontally(rotated, projection.effective.width)
        } else {
            rotated
        };

        let mapped = projection.project(oriented);
        debug!(
            relative = ordinal,
            effective = %projection.effective,
            overlay = %overlay,
            scale = projection.scale,
            input = %bbox,
            output = %mapped,
            "Mapped bbox to overlay"
        );
        metrics::record_box_mapped();
        mapped
    }
}
