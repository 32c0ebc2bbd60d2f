//! Rotation remapping of detector boxes.
//!
//! Detectors report boxes in the frame orientation that was configured when the
//! capture session started. When the display has turned since then, each box is
//! remapped by the relative rotation before it is projected onto the overlay.
//!
//! With frame width `W` and height `H`:
//!
//! | relative | left       | top        | right      | bottom     |
//! |----------|------------|------------|------------|------------|
//! | 0°       | `l`        | `t`        | `r`        | `b`        |
//! | 90°      | `t`        | `W - r`    | `b`        | `W - l`    |
//! | 180°     | `W - r`    | `H - b`    | `W - l`    | `H - t`    |
//! | 270°     | `H - b`    | `l`        | `H - t`    | `r`        |
//!
//! Results are always normalized so `left <= right` and `top <= bottom`.

use overlay_models::{FrameSize, PixelRect, Rotation};
use tracing::warn;

use crate::metrics;

/// Raw relative rotation ordinal: `(current - initial + 4) mod 4`.
///
/// Out-of-range inputs give out-of-range results rather than overflowing.
#[inline]
pub fn relative_ordinal(current: i32, initial: i32) -> i32 {
    ((current as i64 - initial as i64 + 4) % 4) as i32
}

/// Relative rotation between the live display and the session's initial rotation.
pub fn relative_rotation(current: Rotation, initial: Rotation) -> Rotation {
    let ordinal = relative_ordinal(current.ordinal(), initial.ordinal());
    // Both inputs are in 0..=3, so the ordinal is too.
    Rotation::from_ordinal(ordinal).unwrap_or_default()
}

/// `extent - edge` computed wide and clamped back into `i32`.
#[inline]
fn flip(extent: u32, edge: i32) -> i32 {
    (extent as i64 - edge as i64).clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Remap `bbox` by a relative rotation.
///
/// Edges that would leave the `i32` range are clamped to it.
pub fn rotate_rect(bbox: PixelRect, relative: Rotation, frame: FrameSize) -> PixelRect {
    let (w, h) = (frame.width, frame.height);

    let rotated = match relative {
        Rotation::Deg0 => bbox,
        Rotation::Deg90 => PixelRect::new(
            bbox.top,
            flip(w, bbox.right),
            bbox.bottom,
            flip(w, bbox.left),
        ),
        Rotation::Deg180 => PixelRect::new(
            flip(w, bbox.right),
            flip(h, bbox.bottom),
            flip(w, bbox.left),
            flip(h, bbox.top),
        ),
        Rotation::Deg270 => PixelRect::new(
            flip(h, bbox.bottom),
            bbox.left,
            flip(h, bbox.top),
            bbox.right,
        ),
    };

    rotated.normalized()
}

/// Remap `bbox` by a raw relative ordinal.
///
/// Ordinals outside `0..=3` cannot come from [`relative_ordinal`], but platform
/// values are not trusted: they log a warning and leave the box unrotated.
pub fn rotate_rect_by_ordinal(bbox: PixelRect, ordinal: i32, frame: FrameSize) -> PixelRect {
    match Rotation::from_ordinal(ordinal) {
        Some(relative) => rotate_rect(bbox, relative, frame),
        None => {
            warn!(
                relative = ordinal,
                "Unknown relative rotation, using original bbox"
            );
            metrics::record_unknown_rotation();
            bbox.normalized()
        }
    }
}

/// Mirror `bbox` horizontally inside a frame of `width` pixels.
///
/// Applying it twice with the same width returns the original box.
pub fn mirror_horizontally(bbox: PixelRect, width: u32) -> PixelRect {
    PixelRect::new(
        flip(width, bbox.right),
        bbox.top,
        flip(width, bbox.left),
        bbox.bottom,
    )
    .normalized()
}
