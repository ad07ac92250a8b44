//! Over-life curves: lookup tables mapping normalized particle age to a multiplier.
//!
//! A curve is pre-sampled into a fixed table and read back with
//! `table[floor(life_index * (len - 1))]`. Tables come from one channel of a
//! color ramp or from a cubic Bezier easing curve.
//!
//! ```ignore
//! // Fade out with an ease-in curve
//! let fade = OverLifeCurve::from_bezier(0.42, 0.0, 1.0, 1.0, 64);
//! emitter.set_over_life("opacity", fade.inverted())?;
//! ```

use crate::error::{ConfigError, Result};
use image::Rgb;
use std::str::FromStr;

/// Default table resolution.
pub const DEFAULT_RESOLUTION: usize = 64;

/// Visual attribute an over-life curve drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverLifeTarget {
    Size,
    Opacity,
    Blur,
    Rotation,
}

impl FromStr for OverLifeTarget {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "size" => Ok(OverLifeTarget::Size),
            "opacity" => Ok(OverLifeTarget::Opacity),
            "blur" => Ok(OverLifeTarget::Blur),
            "rotation" => Ok(OverLifeTarget::Rotation),
            other => Err(ConfigError::UnknownOverLifeTarget(other.to_string())),
        }
    }
}

/// Color channel to read from a ramp.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Channel {
    #[default]
    Red,
    Green,
    Blue,
}

/// Anything that can be sampled for a color at normalized position `t`.
pub trait ColorRamp {
    /// Color at `t` in `[0, 1]`.
    fn color_at(&self, t: f64) -> Rgb<u8>;
}

/// A linear gradient built from color stops.
#[derive(Clone, Debug, Default)]
pub struct Gradient {
    stops: Vec<(f64, Rgb<u8>)>,
}

impl Gradient {
    /// Empty gradient. Samples as black until stops are added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a color stop at `pos` in `[0, 1]`.
    pub fn with_stop(mut self, pos: f64, color: Rgb<u8>) -> Self {
        self.add_stop(pos, color);
        self
    }

    /// Add a color stop at `pos` in `[0, 1]`.
    pub fn add_stop(&mut self, pos: f64, color: Rgb<u8>) -> &mut Self {
        let pos = pos.clamp(0.0, 1.0);
        let at = self.stops.partition_point(|(p, _)| *p <= pos);
        self.stops.insert(at, (pos, color));
        self
    }

    /// Number of stops.
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Whether the gradient has no stops.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}

impl ColorRamp for Gradient {
    fn color_at(&self, t: f64) -> Rgb<u8> {
        let t = t.clamp(0.0, 1.0);
        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Rgb([0, 0, 0]),
        };
        if t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }
        let upper = self.stops.partition_point(|(p, _)| *p <= t);
        let (p0, c0) = self.stops[upper - 1];
        let (p1, c1) = self.stops[upper];
        let span = p1 - p0;
        let f = if span > 0.0 { (t - p0) / span } else { 0.0 };
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * f).round() as u8;
        Rgb([mix(c0[0], c1[0]), mix(c0[1], c1[1]), mix(c0[2], c1[2])])
    }
}

/// Pre-sampled over-life lookup table.
#[derive(Clone, Debug, PartialEq)]
pub struct OverLifeCurve {
    table: Vec<f64>,
}

impl OverLifeCurve {
    /// A curve that always returns `value`.
    pub fn constant(value: f64) -> Self {
        Self { table: vec![value] }
    }

    /// Wrap an existing table. An empty table samples as 0.
    pub fn from_table(table: Vec<f64>) -> Self {
        Self { table }
    }

    /// Sample the red channel of `ramp` at `resolution` points.
    pub fn from_gradient(ramp: &dyn ColorRamp, resolution: usize) -> Self {
        Self::from_gradient_channel(ramp, Channel::Red, resolution)
    }

    /// Sample one channel of `ramp` at `resolution` points, normalized to `[0, 1]`.
    pub fn from_gradient_channel(ramp: &dyn ColorRamp, channel: Channel, resolution: usize) -> Self {
        let n = resolution.max(1);
        let last = (n - 1).max(1) as f64;
        let idx = match channel {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        };
        let table = (0..n)
            .map(|i| ramp.color_at(i as f64 / last)[idx] as f64 / 255.0)
            .collect();
        Self { table }
    }

    /// Cubic Bezier easing from (0,0) to (1,1) with control points
    /// `(c1x, c1y)` and `(c2x, c2y)`, sampled at `resolution` points.
    pub fn from_bezier(c1x: f64, c1y: f64, c2x: f64, c2y: f64, resolution: usize) -> Self {
        let n = resolution.max(1);
        let last = (n - 1).max(1) as f64;
        let easing = CubicEasing::new(c1x, c1y, c2x, c2y);
        let table = (0..n).map(|i| easing.solve(i as f64 / last)).collect();
        Self { table }
    }

    /// `1 - v` for every entry, turning a fade-in into a fade-out.
    pub fn inverted(mut self) -> Self {
        for v in &mut self.table {
            *v = 1.0 - *v;
        }
        self
    }

    /// Multiplier for `life_index` in `[0, 1]`.
    #[inline]
    pub fn sample(&self, life_index: f64) -> f64 {
        let last = self.table.len().saturating_sub(1);
        let i = (last as f64 * life_index.clamp(0.0, 1.0)) as usize;
        self.table.get(i).copied().unwrap_or(0.0)
    }

    /// Number of table entries.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// The raw table.
    pub fn table(&self) -> &[f64] {
        &self.table
    }
}

impl Default for OverLifeCurve {
    fn default() -> Self {
        Self::constant(1.0)
    }
}

/// Cubic Bezier easing solver (Newton iterations with a bisection fallback).
struct CubicEasing {
    ax: f64,
    bx: f64,
    cx: f64,
    ay: f64,
    by: f64,
    cy: f64,
}

impl CubicEasing {
    const EPSILON: f64 = 1.0 / 200.0;

    fn new(c1x: f64, c1y: f64, c2x: f64, c2y: f64) -> Self {
        let cx = 3.0 * c1x;
        let bx = 3.0 * (c2x - c1x) - cx;
        let cy = 3.0 * c1y;
        let by = 3.0 * (c2y - c1y) - cy;
        Self {
            ax: 1.0 - cx - bx,
            bx,
            cx,
            ay: 1.0 - cy - by,
            by,
            cy,
        }
    }

    fn x(&self, t: f64) -> f64 {
        ((self.ax * t + self.bx) * t + self.cx) * t
    }

    fn y(&self, t: f64) -> f64 {
        ((self.ay * t + self.by) * t + self.cy) * t
    }

    fn dx(&self, t: f64) -> f64 {
        (3.0 * self.ax * t + 2.0 * self.bx) * t + self.cx
    }

    fn solve(&self, x: f64) -> f64 {
        self.y(self.t_for_x(x))
    }

    fn t_for_x(&self, x: f64) -> f64 {
        let mut t = x;
        for _ in 0..8 {
            let err = self.x(t) - x;
            if err.abs() < Self::EPSILON {
                return t;
            }
            let d = self.dx(t);
            if d.abs() < 1e-6 {
                break;
            }
            t -= err / d;
        }

        let (mut lo, mut hi) = (0.0, 1.0);
        let mut t = x;
        if t < lo {
            return lo;
        }
        if t > hi {
            return hi;
        }
        for _ in 0..64 {
            let xt = self.x(t);
            if (xt - x).abs() < Self::EPSILON {
                break;
            }
            if x > xt {
                lo = t;
            } else {
                hi = t;
            }
            t = (hi - lo) * 0.5 + lo;
        }
        t
    }
}
