//! Hit regions for line-based collision fields.
//!
//! [`LineHitMap`] rasterizes a capsule of `radius` pixels around a segment
//! into a downsampled bitmap once, so per-particle tests are a couple of
//! shifts and a lookup. Axis-aligned segments skip the bitmap and test
//! against the bounding region directly.

use crate::surface::SurfaceSize;
use crate::vector::Vector;

/// Anything that can answer "is this pixel inside the region".
pub trait HitTest {
    /// Whether pixel position `(x, y)` is inside the region.
    fn test(&self, x: f64, y: f64) -> bool;
}

/// Integer rectangle in downsampled cells, inclusive on both ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Region {
    x0: i64,
    y0: i64,
    x1: i64,
    y1: i64,
}

impl Region {
    fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }

    fn width(&self) -> usize {
        (self.x1 - self.x0 + 1).max(0) as usize
    }

    fn height(&self) -> usize {
        (self.y1 - self.y0 + 1).max(0) as usize
    }
}

/// Downsampled hit bitmap around a line segment.
#[derive(Clone, Debug)]
pub struct LineHitMap {
    factor: u32,
    region: Option<Region>,
    /// `None` for axis-aligned segments, where the region alone decides.
    bits: Option<Vec<bool>>,
}

impl LineHitMap {
    /// Rasterize the capsule around `a → b` on a surface of `size`.
    ///
    /// Coordinates are downsampled by `>> factor`; the radius is scaled the
    /// same way with a floor of one cell. The region is clipped to the surface.
    pub fn new(size: SurfaceSize, a: Vector, b: Vector, radius: f64, factor: u32) -> Self {
        let factor = factor.min(16);
        let empty = Self {
            factor,
            region: None,
            bits: None,
        };
        if ![a.x, a.y, b.x, b.y].iter().all(|v| v.is_finite()) {
            log::warn!("hit region for line ({a}, {b}) has non-finite endpoints");
            return empty;
        }
        let down = |v: f64| (v.floor() as i64) >> factor;

        let sw = down(size.width.max(0.0));
        let sh = down(size.height.max(0.0));
        let r = ((radius.max(0.0) as i64) >> factor).max(1);

        let (ax, ay, bx, by) = (down(a.x), down(a.y), down(b.x), down(b.y));
        let region = Region {
            x0: ax.min(bx).saturating_sub(r).max(0),
            y0: ay.min(by).saturating_sub(r).max(0),
            x1: ax.max(bx).saturating_add(r).min(sw - 1),
            y1: ay.max(by).saturating_add(r).min(sh - 1),
        };
        if region.x1 < region.x0 || region.y1 < region.y0 {
            log::warn!("hit region for line ({a}, {b}) lies outside the surface");
            return empty;
        }

        if ax == bx || ay == by {
            return Self {
                factor,
                region: Some(region),
                bits: None,
            };
        }

        let (w, h) = (region.width(), region.height());
        let mut bits = vec![false; w * h];
        let p0 = Vector::new(ax as f64, ay as f64);
        let p1 = Vector::new(bx as f64, by as f64);
        let r_sq = (r as f64) * (r as f64);
        for cy in 0..h {
            for cx in 0..w {
                let c = Vector::new(
                    (region.x0 + cx as i64) as f64 + 0.5,
                    (region.y0 + cy as i64) as f64 + 0.5,
                );
                bits[cy * w + cx] = segment_distance_sq(c, p0, p1) <= r_sq;
            }
        }

        Self {
            factor,
            region: Some(region),
            bits: Some(bits),
        }
    }

    /// Downsampling shift.
    pub fn factor(&self) -> u32 {
        self.factor
    }

    /// Number of cells that test positive.
    pub fn area(&self) -> usize {
        match (&self.region, &self.bits) {
            (Some(_), Some(bits)) => bits.iter().filter(|b| **b).count(),
            (Some(region), None) => region.width() * region.height(),
            _ => 0,
        }
    }
}

impl HitTest for LineHitMap {
    #[inline]
    fn test(&self, x: f64, y: f64) -> bool {
        let Some(region) = self.region else {
            return false;
        };
        if !x.is_finite() || !y.is_finite() {
            return false;
        }
        let ix = (x.floor() as i64) >> self.factor;
        let iy = (y.floor() as i64) >> self.factor;
        if !region.contains(ix, iy) {
            return false;
        }
        match &self.bits {
            None => true,
            Some(bits) => {
                let i = (iy - region.y0) as usize * region.width() + (ix - region.x0) as usize;
                bits.get(i).copied().unwrap_or(false)
            }
        }
    }
}

fn segment_distance_sq(p: Vector, a: Vector, b: Vector) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return (p - a).length_squared();
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).length_squared()
}
