use super::ForceField;
use crate::draw::DebugDraw;
use crate::error::{ConfigError, Result};
use crate::particle::Particle;
use crate::surface::SurfaceSize;
use crate::vector::Vector;

/// Spline samples per control-point interval.
const SEGMENTS: usize = 20;

/// Drags particles along a cardinal spline.
///
/// Each frame a particle's position is blended toward the spline point at
/// `(life_index * force * len) mod len` with weight `influence`, so particles
/// travel the path as they age. `force` is the number of laps per lifetime.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    id: String,
    points: Vec<Vector>,
    tension: f64,
    closed: bool,
    curve: Vec<Vector>,
    force: f64,
    influence: f64,
}

impl Path {
    /// Open path through `points` with tension 0.5. Needs at least two points.
    pub fn new(points: Vec<Vector>) -> Result<Self> {
        let mut path = Self {
            id: String::new(),
            points: Vec::new(),
            tension: 0.5,
            closed: false,
            curve: Vec::new(),
            force: 0.0,
            influence: 0.0,
        };
        path.set_path(points, 0.5, false)?;
        Ok(path)
    }

    /// Name used by `Emitter::field_by_id`.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Curve points a particle travels over its life, as a multiple of the curve length.
    pub fn with_force(mut self, force: f64) -> Self {
        self.force = force;
        self
    }

    /// Blend toward the curve point each frame, from 0 (off) to 1 (snap).
    pub fn with_influence(mut self, influence: f64) -> Self {
        self.influence = influence;
        self
    }

    /// Spline tension. Resamples the curve.
    pub fn with_tension(mut self, tension: f64) -> Self {
        self.tension = tension;
        self.curve = spline(&self.points, self.tension, self.closed);
        self
    }

    /// Close the path with a segment from the last point back to the first.
    pub fn closed(mut self, closed: bool) -> Self {
        self.closed = closed;
        self.curve = spline(&self.points, self.tension, self.closed);
        self
    }

    /// Control points.
    pub fn points(&self) -> &[Vector] {
        &self.points
    }

    /// Spline tension.
    pub fn tension(&self) -> f64 {
        self.tension
    }

    /// Whether the last point joins back to the first.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Sampled spline points.
    pub fn curve_points(&self) -> &[Vector] {
        &self.curve
    }

    pub fn force(&self) -> f64 {
        self.force
    }

    pub fn influence(&self) -> f64 {
        self.influence
    }

    /// Replace the control points and resample the spline.
    pub fn set_path(&mut self, points: Vec<Vector>, tension: f64, closed: bool) -> Result<()> {
        if points.len() < 2 {
            return Err(ConfigError::InvalidPath { points: points.len() });
        }
        self.curve = spline(&points, tension, closed);
        self.points = points;
        self.tension = tension;
        self.closed = closed;
        Ok(())
    }

    /// See [`Path::with_force`].
    pub fn set_force(&mut self, force: f64) {
        self.force = force;
    }

    /// See [`Path::with_influence`].
    pub fn set_influence(&mut self, influence: f64) {
        self.influence = influence;
    }
}

impl ForceField for Path {
    fn id(&self) -> &str {
        &self.id
    }

    fn init(&mut self, _size: SurfaceSize) {}

    fn apply(&mut self, p: &mut Particle) {
        if self.influence == 0.0 {
            return;
        }
        let len = self.curve.len().saturating_sub(1);
        if len == 0 {
            return;
        }
        let step = (p.life_index() * self.force * len as f64).trunc();
        if !step.is_finite() {
            return;
        }
        let i = (step as i64).rem_euclid(len as i64) as usize;
        let target = self.curve[i];
        p.position = p.position * (1.0 - self.influence) + target * self.influence;
    }

    fn scale(&mut self, f: f64) {
        self.force *= f;
        for v in self.points.iter_mut().chain(self.curve.iter_mut()) {
            *v *= f;
        }
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        let d = Vector::new(dx, dy);
        for v in self.points.iter_mut().chain(self.curve.iter_mut()) {
            *v += d;
        }
    }

    fn show_debug(&self, draw: &mut dyn DebugDraw) {
        let mut iter = self.curve.iter();
        if let Some(first) = iter.next() {
            draw.move_to(first.x, first.y);
            for p in iter {
                draw.line_to(p.x, p.y);
            }
        }
    }
}

/// Cardinal spline through `points`, `SEGMENTS` samples per interval plus the end point.
fn spline(points: &[Vector], tension: f64, closed: bool) -> Vec<Vector> {
    let n = points.len();
    if n < 2 {
        return points.to_vec();
    }

    let mut padded = Vec::with_capacity(n + 2);
    padded.push(if closed { points[n - 1] } else { points[0] });
    padded.extend_from_slice(points);
    padded.push(if closed { points[0] } else { points[n - 1] });

    let intervals = if closed { n } else { n - 1 };
    let mut out = Vec::with_capacity(intervals * SEGMENTS + 1);

    for i in 1..n {
        hermite(&mut out, padded[i - 1], padded[i], padded[i + 1], padded[i + 2], tension);
    }
    if closed {
        hermite(&mut out, points[n - 2], points[n - 1], points[0], points[1], tension);
    }

    out.push(if closed { points[0] } else { points[n - 1] });
    out
}

fn hermite(out: &mut Vec<Vector>, p0: Vector, p1: Vector, p2: Vector, p3: Vector, tension: f64) {
    let t1 = (p2 - p0) * tension;
    let t2 = (p3 - p1) * tension;
    for s in 0..SEGMENTS {
        let st = s as f64 / SEGMENTS as f64;
        let st2 = st * st;
        let st3 = st2 * st;
        let c1 = 2.0 * st3 - 3.0 * st2 + 1.0;
        let c2 = 3.0 * st2 - 2.0 * st3;
        let c3 = st3 - 2.0 * st2 + st;
        let c4 = st3 - st2;
        out.push(p1 * c1 + p2 * c2 + t1 * c3 + t2 * c4);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Vector> {
        vec![
            Vector::new(0.0, 0.0),
            Vector::new(100.0, 0.0),
            Vector::new(100.0, 100.0),
            Vector::new(0.0, 100.0),
        ]
    }

    #[test]
    fn test_needs_two_points() {
        assert!(matches!(
            Path::new(vec![Vector::ZERO]),
            Err(ConfigError::InvalidPath { points: 1 })
        ));
    }

    #[test]
    fn test_open_curve_passes_through_points() {
        let path = Path::new(square()).unwrap();
        let curve = path.curve_points();
        assert_eq!(curve.len(), 3 * SEGMENTS + 1);
        assert_eq!(curve[0], Vector::new(0.0, 0.0));
        assert_eq!(curve[SEGMENTS], Vector::new(100.0, 0.0));
        assert_eq!(curve[2 * SEGMENTS], Vector::new(100.0, 100.0));
        assert_eq!(*curve.last().unwrap(), Vector::new(0.0, 100.0));
    }

    #[test]
    fn test_closed_curve_returns_to_start() {
        let path = Path::new(square()).unwrap().closed(true);
        let curve = path.curve_points();
        assert_eq!(curve.len(), 4 * SEGMENTS + 1);
        assert_eq!(curve[3 * SEGMENTS], Vector::new(0.0, 100.0));
        assert_eq!(*curve.last().unwrap(), Vector::new(0.0, 0.0));
    }

    #[test]
    fn test_apply_blends_position() {
        let mut path = Path::new(vec![Vector::new(0.0, 0.0), Vector::new(100.0, 0.0)])
            .unwrap()
            .with_force(1.0)
            .with_influence(0.5);
        let mut p = Particle::timed(0.0, 1000.0);
        p.position = Vector::new(0.0, 50.0);
        path.apply(&mut p);
        // life 0 targets the first curve point
        assert_eq!(p.position, Vector::new(0.0, 25.0));
    }

    #[test]
    fn test_negative_force_wraps_index() {
        let mut path = Path::new(square()).unwrap().with_force(-1.0).with_influence(1.0);
        let mut p = Particle::timed(0.0, 100.0);
        p.update_life(50.0);
        path.apply(&mut p);
        assert!(p.position.x.is_finite() && p.position.y.is_finite());
    }

    #[test]
    fn test_zero_influence_is_noop() {
        let mut path = Path::new(square()).unwrap().with_force(1.0);
        let mut p = Particle::timed(0.0, 1000.0);
        p.position = Vector::new(5.0, 5.0);
        path.apply(&mut p);
        assert_eq!(p.position, Vector::new(5.0, 5.0));
    }
}
