use super::{draw_segment, ForceField, HitCallback, HitEvent};
use crate::draw::DebugDraw;
use crate::hitmap::{HitTest, LineHitMap};
use crate::particle::Particle;
use crate::surface::SurfaceSize;
use crate::vector::{Vector, VectorExt};

/// Hit-map downsampling shift for reflectors.
const HIT_FACTOR: u32 = 1;

/// Bounces particles off a line.
///
/// Reflection is edge-triggered: a particle is mirrored about the line's
/// normal when it enters the hit region and then left alone until it has
/// left the region again, using [`Particle::is_hit`] as the latch.
pub struct Reflector {
    id: String,
    start: Vector,
    end: Vector,
    normal: Vector,
    radius: f64,
    absorption: f64,
    active: bool,
    callback: Option<HitCallback>,
    size: Option<SurfaceSize>,
    hit_map: Option<LineHitMap>,
}

impl Reflector {
    /// Bouncing line from `(x1, y1)` to `(x2, y2)` in pixels, radius 2, no absorption.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        let start = Vector::new(x1, y1);
        let end = Vector::new(x2, y2);
        Self {
            id: String::new(),
            start,
            end,
            normal: (end - start).normal(),
            radius: 2.0,
            absorption: 0.0,
            active: true,
            callback: None,
            size: None,
            hit_map: None,
        }
    }

    /// Name used by `Emitter::field_by_id`.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Half-width of the hit zone in pixels. Takes effect at `init`.
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Fraction of speed lost per bounce, `[0, 1]`.
    pub fn with_absorption(mut self, absorption: f64) -> Self {
        self.absorption = absorption;
        self
    }

    /// Called with each particle right after it bounces.
    pub fn with_callback(mut self, callback: impl FnMut(&HitEvent<'_>) + 'static) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }

    /// `(start, end, radius)`.
    pub fn line(&self) -> (Vector, Vector, f64) {
        (self.start, self.end, self.radius)
    }

    /// Unit normal of the line.
    pub fn normal(&self) -> Vector {
        self.normal
    }

    /// Fraction of speed lost per bounce.
    pub fn absorption(&self) -> f64 {
        self.absorption
    }

    /// Inactive reflectors let every particle through.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Move the line. A `radius` of `None` keeps the current one.
    pub fn set_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, radius: Option<f64>) {
        self.start = Vector::new(x1, y1);
        self.end = Vector::new(x2, y2);
        self.normal = (self.end - self.start).normal();
        if let Some(r) = radius {
            self.radius = r;
        }
        self.rebuild();
    }

    /// Fraction of speed lost per bounce, `[0, 1]`.
    pub fn set_absorption(&mut self, absorption: f64) {
        self.absorption = absorption;
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Replace the hit callback. `None` removes it.
    pub fn set_callback(&mut self, callback: Option<HitCallback>) {
        self.callback = callback;
    }

    fn rebuild(&mut self) {
        if let Some(size) = self.size {
            self.hit_map = Some(LineHitMap::new(size, self.start, self.end, self.radius, HIT_FACTOR));
        }
    }
}

impl ForceField for Reflector {
    fn id(&self) -> &str {
        &self.id
    }

    fn init(&mut self, size: SurfaceSize) {
        self.size = Some(size);
        self.rebuild();
    }

    fn apply(&mut self, p: &mut Particle) {
        if !self.active {
            return;
        }
        let Some(map) = &self.hit_map else {
            return;
        };
        if !map.test(p.position.x, p.position.y) {
            p.is_hit = false;
            return;
        }
        if p.is_hit {
            return;
        }

        p.velocity = p.velocity.reflected(self.normal) * (1.0 - self.absorption);
        p.is_hit = true;
        if let Some(cb) = &mut self.callback {
            cb(&HitEvent {
                start: self.start,
                end: self.end,
                particle: p,
            });
        }
    }

    fn scale(&mut self, f: f64) {
        self.radius *= f;
        self.start *= f;
        self.end *= f;
        self.size = self.size.map(|s| s.scaled(f));
        self.rebuild();
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        let d = Vector::new(dx, dy);
        self.start += d;
        self.end += d;
        self.rebuild();
    }

    fn show_debug(&self, draw: &mut dyn DebugDraw) {
        draw_segment(draw, self.start, self.end);
    }
}
