//! Drawing-surface dimensions shared by scenes, emitters, fields and renderers.

use serde::{Deserialize, Serialize};

/// Size of the drawing surface in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSize {
    /// Surface width in pixels.
    pub width: f64,
    /// Surface height in pixels.
    pub height: f64,
}

impl SurfaceSize {
    /// Create a surface size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Surface size multiplied by `factor` on both axes.
    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.width * factor, self.height * factor)
    }

    /// Whether either side has zero (or negative) extent.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// The full surface as a bounds rectangle anchored at the origin.
    pub fn bounds(&self) -> Bounds {
        Bounds {
            left: 0.0,
            top: 0.0,
            width: self.width,
            height: self.height,
        }
    }
}

impl Default for SurfaceSize {
    fn default() -> Self {
        Self::new(512.0, 256.0)
    }
}

/// Half-open rectangle `[left, width) x [top, height)` used by bounds-mode particles.
///
/// `width` and `height` are the right and bottom edges, not extents.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    /// Whether `(x, y)` lies inside the half-open rectangle.
    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x < self.width && y >= self.top && y < self.height
    }
}
