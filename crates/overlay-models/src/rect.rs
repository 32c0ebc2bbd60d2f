//! Pixel rectangles and frame/overlay dimensions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Axis-aligned rectangle in integer pixel coordinates.
///
/// Edges are stored the way detectors report them (`left, top, right, bottom`).
/// Every transform returns a new value; nothing mutates a rectangle in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
pub struct PixelRect {
    /// Left edge x-coordinate
    pub left: i32,
    /// Top edge y-coordinate
    pub top: i32,
    /// Right edge x-coordinate
    pub right: i32,
    /// Bottom edge y-coordinate
    pub bottom: i32,
}

impl PixelRect {
    /// Create a new rectangle from its four edges.
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Build a rectangle from two float corners, truncating toward zero.
    ///
    /// The corners may come in any order; the result is normalized.
    pub fn from_corners(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        let (min_x, max_x) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let (min_y, max_y) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        Self::new(min_x as i32, min_y as i32, max_x as i32, max_y as i32)
    }

    /// Width (`right - left`), saturating. Negative for inverted rectangles.
    #[inline]
    pub fn width(&self) -> i32 {
        self.right.saturating_sub(self.left)
    }

    /// Height (`bottom - top`), saturating. Negative for inverted rectangles.
    #[inline]
    pub fn height(&self) -> i32 {
        self.bottom.saturating_sub(self.top)
    }

    /// True when `left <= right` and `top <= bottom`.
    #[inline]
    pub fn is_normalized(&self) -> bool {
        self.left <= self.right && self.top <= self.bottom
    }

    /// Return a copy with edges swapped so that `left <= right` and `top <= bottom`.
    pub fn normalized(&self) -> Self {
        Self {
            left: self.left.min(self.right),
            top: self.top.min(self.bottom),
            right: self.left.max(self.right),
            bottom: self.top.max(self.bottom),
        }
    }

}

impl fmt::Display for PixelRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rect({}, {} - {}, {})",
            self.left, self.top, self.right, self.bottom
        )
    }
}

/// Native detector frame dimensions configured for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Same frame with width and height exchanged.
    pub const fn swapped(&self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    /// True if either axis is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for FrameSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Live pixel size of the overlay view at draw time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
pub struct OverlaySize {
    pub width: u32,
    pub height: u32,
}

impl OverlaySize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A view that has not been laid out yet reports a zero axis.
    pub fn is_laid_out(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl fmt::Display for OverlaySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
