//! Spawn geometry and per-particle parameter sampling.
//!
//! A [`Spawner`] owns everything an emitter needs to place and launch a new
//! particle: the spawn shape, the sweep state of the position and angle
//! parameters, and a seeded RNG.
//!
//! # Spawn types
//!
//! | Type | Position for parameter `t` |
//! |------|----------------------------|
//! | [`SpawnType::Point`] | the emitter origin |
//! | [`SpawnType::Line`] | `lerp(origin, end, t)` |
//! | [`SpawnType::Box`] | `origin + (t - 0.5) * box_radius` per axis |
//! | [`SpawnType::Grid`] | top-left corner of cell `floor(t * cells)` |
//!
//! # Parameter sampling
//!
//! Each axis parameter is either uniform random in `[0, 1)` or a
//! [`LinearSweep`] stepping through `[0, 1]`. Both axes are linear or both
//! random; the y step defaults to the x step. For box and grid shapes the
//! y sweep only advances when the x sweep wraps or bounces, which walks the
//! area row by row.
//!
//! ```ignore
//! let mut spawner = Spawner::new(Some(7));
//! spawner.configure(SpawnShape::Line { end_x: 100.0, end_y: 0.0 });
//! spawner.use_linear_spread(0.1, 0.0);
//! let p = spawner.next_position(); // (10, 0), (20, 0), ...
//! ```

use crate::error::{ConfigError, Result};
use crate::vector::Vector;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Apply the jitter law: `v - spread * v * r` with `r` uniform in `[0, 1)`.
///
/// The result never exceeds `v` and never falls below `v * (1 - spread)`.
#[inline]
pub fn jitter<R: Rng + ?Sized>(value: f64, spread: f64, rng: &mut R) -> f64 {
    value - spread * value * rng.gen::<f64>()
}

/// Where new particles appear.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SpawnType {
    #[default]
    Point,
    Line,
    Box,
    Grid,
}

impl SpawnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpawnType::Point => "point",
            SpawnType::Line => "line",
            SpawnType::Box => "box",
            SpawnType::Grid => "grid",
        }
    }

    /// Whether the position depends on two parameters.
    fn is_2d(&self) -> bool {
        matches!(self, SpawnType::Box | SpawnType::Grid)
    }
}

impl FromStr for SpawnType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "point" => Ok(SpawnType::Point),
            "line" => Ok(SpawnType::Line),
            "box" => Ok(SpawnType::Box),
            "grid" => Ok(SpawnType::Grid),
            other => Err(ConfigError::UnknownSpawnType(other.to_string())),
        }
    }
}

impl TryFrom<String> for SpawnType {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<SpawnType> for String {
    fn from(t: SpawnType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for SpawnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A spawn type together with its type-specific parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpawnShape {
    Point,
    Line { end_x: f64, end_y: f64 },
    Box { radius: f64 },
    Grid { width: f64, height: f64, cells_x: usize, cells_y: usize },
}

impl SpawnShape {
    pub fn spawn_type(&self) -> SpawnType {
        match self {
            SpawnShape::Point => SpawnType::Point,
            SpawnShape::Line { .. } => SpawnType::Line,
            SpawnShape::Box { .. } => SpawnType::Box,
            SpawnShape::Grid { .. } => SpawnType::Grid,
        }
    }
}

/// Parameters of every spawn type. Only the ones of `kind` are used, the
/// rest are kept so switching type back and forth is lossless.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnGeometry {
    pub kind: SpawnType,
    pub origin: Vector,
    /// Line end point.
    pub end: Vector,
    /// Side length of the box.
    pub box_radius: f64,
    pub grid_width: f64,
    pub grid_height: f64,
    pub cells_x: usize,
    pub cells_y: usize,
}

impl Default for SpawnGeometry {
    fn default() -> Self {
        Self {
            kind: SpawnType::Point,
            origin: Vector::ZERO,
            end: Vector::new(100.0, 0.0),
            box_radius: 50.0,
            grid_width: 100.0,
            grid_height: 100.0,
            cells_x: 5,
            cells_y: 5,
        }
    }
}

impl SpawnGeometry {
    /// Apply a shape, switching the spawn type.
    pub fn configure(&mut self, shape: SpawnShape) {
        match shape {
            SpawnShape::Point => {}
            SpawnShape::Line { end_x, end_y } => self.end = Vector::new(end_x, end_y),
            SpawnShape::Box { radius } => self.box_radius = radius,
            SpawnShape::Grid { width, height, cells_x, cells_y } => {
                self.grid_width = width;
                self.grid_height = height;
                self.cells_x = cells_x.max(1);
                self.cells_y = cells_y.max(1);
            }
        }
        self.kind = shape.spawn_type();
    }

    /// Cell size of the grid shape.
    pub fn cell_size(&self) -> (f64, f64) {
        (
            self.grid_width / self.cells_x.max(1) as f64,
            self.grid_height / self.cells_y.max(1) as f64,
        )
    }

    /// Position for parameters `(tx, ty)`. Point ignores both, line ignores `ty`.
    pub fn position(&self, tx: f64, ty: f64) -> Vector {
        match self.kind {
            SpawnType::Point => self.origin,
            SpawnType::Line => self.origin.lerp(self.end, tx),
            SpawnType::Box => self.origin + Vector::new(tx - 0.5, ty - 0.5) * self.box_radius,
            SpawnType::Grid => {
                let (cw, ch) = self.cell_size();
                // t == 1 from a linear sweep stays on the last cell
                let ix = ((tx * self.cells_x as f64) as usize).min(self.cells_x.saturating_sub(1));
                let iy = ((ty * self.cells_y as f64) as usize).min(self.cells_y.saturating_sub(1));
                self.origin + Vector::new(ix as f64 * cw, iy as f64 * ch)
            }
        }
    }

    /// Move the origin and the line end.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        let d = Vector::new(dx, dy);
        self.origin += d;
        self.end += d;
    }

    /// Scale positions and sizes. Cell counts are unchanged.
    pub fn scale(&mut self, f: f64) {
        self.origin *= f;
        self.end *= f;
        self.box_radius *= f;
        self.grid_width *= f;
        self.grid_height *= f;
    }
}

/// Deterministic parameter stepping through `[0, 1]`.
///
/// Each call to [`advance`](LinearSweep::advance) adds `step`. Leaving the
/// range either restarts at 0 or, with ping-pong, clamps to the edge and
/// reverses direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearSweep {
    step: f64,
    value: f64,
    ping_pong: bool,
}

impl LinearSweep {
    pub fn new(step: f64, ping_pong: bool) -> Self {
        Self {
            step,
            value: 0.0,
            ping_pong,
        }
    }

    /// Current step, negative while running backwards.
    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn ping_pong(&self) -> bool {
        self.ping_pong
    }

    pub fn set_ping_pong(&mut self, ping_pong: bool) {
        self.ping_pong = ping_pong;
    }

    /// Step once. Returns `true` if the value left `[0, 1]` and was wrapped or bounced.
    pub fn advance(&mut self) -> bool {
        self.value += self.step;
        if (0.0..=1.0).contains(&self.value) {
            return false;
        }
        if self.ping_pong {
            self.value = if self.value <= 0.0 { 0.0 } else { 1.0 };
            self.step = -self.step;
        } else {
            self.value = 0.0;
        }
        true
    }
}

/// Places and aims new particles.
#[derive(Clone, Debug)]
pub struct Spawner {
    geometry: SpawnGeometry,
    sweep_x: Option<LinearSweep>,
    sweep_y: Option<LinearSweep>,
    sweep_angle: Option<LinearSweep>,
    ping_pong: (bool, bool, bool),
    rng: SmallRng,
}

impl Spawner {
    /// A point spawner. `None` seeds from system entropy.
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            geometry: SpawnGeometry::default(),
            sweep_x: None,
            sweep_y: None,
            sweep_angle: None,
            ping_pong: (false, false, false),
            rng: SmallRng::seed_from_u64(seed.unwrap_or_else(rand::random)),
        }
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
    }

    pub fn geometry(&self) -> &SpawnGeometry {
        &self.geometry
    }

    pub fn geometry_mut(&mut self) -> &mut SpawnGeometry {
        &mut self.geometry
    }

    pub fn spawn_type(&self) -> SpawnType {
        self.geometry.kind
    }

    pub fn configure(&mut self, shape: SpawnShape) {
        self.geometry.configure(shape);
    }

    /// Switch the spawn type, keeping the stored parameters.
    pub fn set_spawn_type(&mut self, kind: SpawnType) {
        self.geometry.kind = kind;
    }

    /// Step positions linearly instead of randomly. `step_x <= 0` makes both
    /// axes random; `step_y <= 0` reuses `step_x` for the y axis. Sweeps
    /// restart from 0.
    pub fn use_linear_spread(&mut self, step_x: f64, step_y: f64) {
        if step_x > 0.0 {
            let step_y = if step_y > 0.0 { step_y } else { step_x };
            self.sweep_x = Some(LinearSweep::new(step_x, self.ping_pong.0));
            self.sweep_y = Some(LinearSweep::new(step_y, self.ping_pong.1));
        } else {
            self.sweep_x = None;
            self.sweep_y = None;
        }
    }

    /// Step the emission angle linearly through the spread. A step `<= 0`
    /// restores random angles.
    pub fn use_linear_angle_spread(&mut self, step: f64) {
        self.sweep_angle = (step > 0.0).then(|| LinearSweep::new(step, self.ping_pong.2));
    }

    /// Ping-pong flags for the x, y and angle sweeps.
    pub fn set_ping_pong(&mut self, x: bool, y: bool, angle: bool) {
        self.ping_pong = (x, y, angle);
        for (sweep, flag) in [(&mut self.sweep_x, x), (&mut self.sweep_y, y), (&mut self.sweep_angle, angle)] {
            if let Some(s) = sweep {
                s.set_ping_pong(flag);
            }
        }
    }

    pub fn ping_pong(&self) -> (bool, bool, bool) {
        self.ping_pong
    }

    /// `(x, y, angle)` linear steps as configured, 0 for random axes.
    pub fn linear_steps(&self) -> (f64, f64, f64) {
        let step = |s: &Option<LinearSweep>| s.map_or(0.0, |s| s.step().abs());
        (step(&self.sweep_x), step(&self.sweep_y), step(&self.sweep_angle))
    }

    /// Uniform sample in `[0, 1)`.
    #[inline]
    pub fn random(&mut self) -> f64 {
        self.rng.gen()
    }

    /// [`jitter`] with this spawner's RNG.
    #[inline]
    pub fn jitter(&mut self, value: f64, spread: f64) -> f64 {
        jitter(value, spread, &mut self.rng)
    }

    fn sample_1d(&mut self) -> f64 {
        match &mut self.sweep_x {
            Some(s) => {
                s.advance();
                s.value()
            }
            None => self.rng.gen(),
        }
    }

    fn sample_2d(&mut self) -> (f64, f64) {
        match (&mut self.sweep_x, &mut self.sweep_y) {
            (Some(sx), Some(sy)) => {
                if sx.advance() {
                    sy.advance();
                }
                (sx.value(), sy.value())
            }
            _ => (self.rng.gen(), self.rng.gen()),
        }
    }

    /// Position for the next particle.
    pub fn next_position(&mut self) -> Vector {
        let (tx, ty) = match self.geometry.kind {
            SpawnType::Point => (0.0, 0.0),
            kind if kind.is_2d() => self.sample_2d(),
            _ => (self.sample_1d(), 0.0),
        };
        self.geometry.position(tx, ty)
    }

    /// Emission angle in radians within `[offset, offset + spread]`.
    pub fn next_angle(&mut self, spread: f64, offset: f64) -> f64 {
        let t = match &mut self.sweep_angle {
            Some(s) => {
                s.advance();
                s.value()
            }
            None => self.rng.gen(),
        };
        spread * t + offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_type_parse_and_display() {
        for name in ["point", "line", "box", "grid"] {
            let t: SpawnType = name.parse().unwrap();
            assert_eq!(t.to_string(), name);
        }
        assert!(matches!("circle".parse::<SpawnType>(), Err(ConfigError::UnknownSpawnType(s)) if s == "circle"));
    }

    #[test]
    fn test_spawn_type_serde_rejects_unknown() {
        let t: SpawnType = serde_json::from_str("\"grid\"").unwrap();
        assert_eq!(t, SpawnType::Grid);
        assert!(serde_json::from_str::<SpawnType>("\"blob\"").is_err());
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let mut rng = SmallRng::seed_from_u64(42);
        for spread in [0.0, 0.25, 0.5, 1.0] {
            for _ in 0..1000 {
                let v = jitter(80.0, spread, &mut rng);
                assert!(v <= 80.0);
                assert!(v >= 80.0 * (1.0 - spread));
            }
        }
    }

    #[test]
    fn test_linear_sweep_wraps_without_ping_pong() {
        let mut s = LinearSweep::new(0.4, false);
        let values: Vec<f64> = (0..4)
            .map(|_| {
                s.advance();
                s.value()
            })
            .collect();
        assert_eq!(values[0], 0.4);
        assert_eq!(values[1], 0.8);
        assert_eq!(values[2], 0.0);
        assert_eq!(values[3], 0.4);
    }

    #[test]
    fn test_linear_sweep_ping_pong_reverses() {
        let mut s = LinearSweep::new(0.5, true);
        s.advance(); // 0.5
        s.advance(); // 1.0
        assert_eq!(s.value(), 1.0);
        assert!(s.advance()); // 1.5 -> clamp to 1, reverse
        assert_eq!(s.value(), 1.0);
        assert_eq!(s.step(), -0.5);
        s.advance();
        assert_eq!(s.value(), 0.5);
    }

    #[test]
    fn test_line_positions_follow_sweep() {
        let mut sp = Spawner::new(Some(1));
        sp.configure(SpawnShape::Line { end_x: 100.0, end_y: 50.0 });
        sp.use_linear_spread(0.25, 0.0);
        let p = sp.next_position();
        assert!((p - Vector::new(25.0, 12.5)).length() < 1e-9);
        let p = sp.next_position();
        assert!((p - Vector::new(50.0, 25.0)).length() < 1e-9);
    }

    #[test]
    fn test_box_positions_stay_inside() {
        let mut sp = Spawner::new(Some(2));
        sp.geometry_mut().origin = Vector::new(100.0, 100.0);
        sp.configure(SpawnShape::Box { radius: 20.0 });
        for _ in 0..200 {
            let p = sp.next_position();
            assert!((90.0..110.0).contains(&p.x));
            assert!((90.0..110.0).contains(&p.y));
        }
    }

    #[test]
    fn test_grid_sweep_walks_rows() {
        let mut sp = Spawner::new(Some(3));
        sp.configure(SpawnShape::Grid { width: 40.0, height: 20.0, cells_x: 4, cells_y: 2 });
        sp.use_linear_spread(0.25, 0.5);
        // x: 0.25, 0.5, 0.75, 1.0 (last cell), then wraps and y advances
        let xs: Vec<Vector> = (0..5).map(|_| sp.next_position()).collect();
        assert_eq!(xs[0], Vector::new(10.0, 0.0));
        assert_eq!(xs[3], Vector::new(30.0, 0.0));
        assert_eq!(xs[4], Vector::new(0.0, 10.0));
    }

    #[test]
    fn test_missing_y_step_reuses_x_step() {
        let mut sp = Spawner::new(Some(6));
        sp.configure(SpawnShape::Grid { width: 20.0, height: 20.0, cells_x: 2, cells_y: 2 });
        sp.use_linear_spread(0.5, 0.0);
        assert_eq!(sp.linear_steps(), (0.5, 0.5, 0.0));
        // x: 0.5, 1.0 (last cell), then wraps to 0 and y advances to 0.5
        let ps: Vec<Vector> = (0..3).map(|_| sp.next_position()).collect();
        assert_eq!(ps[0], Vector::new(10.0, 0.0));
        assert_eq!(ps[1], Vector::new(10.0, 0.0));
        assert_eq!(ps[2], Vector::new(0.0, 10.0));
    }

    #[test]
    fn test_non_positive_x_step_disables_both_axes() {
        let mut sp = Spawner::new(Some(7));
        sp.use_linear_spread(0.25, 0.25);
        sp.use_linear_spread(0.0, 0.5);
        assert_eq!(sp.linear_steps(), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_point_ignores_sweeps() {
        let mut sp = Spawner::new(Some(4));
        sp.geometry_mut().origin = Vector::new(5.0, 6.0);
        sp.use_linear_spread(0.1, 0.1);
        assert_eq!(sp.next_position(), Vector::new(5.0, 6.0));
    }

    #[test]
    fn test_linear_angle_spread() {
        let mut sp = Spawner::new(Some(5));
        sp.use_linear_angle_spread(0.5);
        assert_eq!(sp.next_angle(2.0, 1.0), 2.0);
        assert_eq!(sp.next_angle(2.0, 1.0), 3.0);
        assert_eq!(sp.next_angle(2.0, 1.0), 1.0);
        sp.use_linear_angle_spread(0.0);
        let a = sp.next_angle(2.0, 1.0);
        assert!((1.0..3.0).contains(&a));
    }

    #[test]
    fn test_geometry_scale_and_translate() {
        let mut g = SpawnGeometry::default();
        let before = g;
        g.scale(1.0);
        assert_eq!(g, before);
        g.translate(10.0, -5.0);
        assert_eq!(g.origin, Vector::new(10.0, -5.0));
        assert_eq!(g.end, Vector::new(110.0, -5.0));
    }
}
