use super::{draw_segment, ForceField, HitCallback, HitEvent};
use crate::draw::DebugDraw;
use crate::hitmap::{HitTest, LineHitMap};
use crate::particle::Particle;
use crate::surface::SurfaceSize;
use crate::vector::Vector;

/// Hit-map downsampling shift for collectors.
const HIT_FACTOR: u32 = 2;

/// Kills particles that touch a line, optionally reporting each catch.
pub struct Collector {
    id: String,
    start: Vector,
    end: Vector,
    radius: f64,
    active: bool,
    callback: Option<HitCallback>,
    size: Option<SurfaceSize>,
    hit_map: Option<LineHitMap>,
}

impl Collector {
    /// Kill line from `(x1, y1)` to `(x2, y2)` in pixels, radius 2.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            id: String::new(),
            start: Vector::new(x1, y1),
            end: Vector::new(x2, y2),
            radius: 2.0,
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

    /// Half-width of the kill zone in pixels. Takes effect at `init`.
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Called with each particle right before it is killed.
    pub fn with_callback(mut self, callback: impl FnMut(&HitEvent<'_>) + 'static) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }

    /// `(start, end, radius)`.
    pub fn line(&self) -> (Vector, Vector, f64) {
        (self.start, self.end, self.radius)
    }

    /// Inactive collectors let every particle through.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Move the line. A `radius` of `None` keeps the current one.
    pub fn set_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, radius: Option<f64>) {
        self.start = Vector::new(x1, y1);
        self.end = Vector::new(x2, y2);
        if let Some(r) = radius {
            self.radius = r;
        }
        self.rebuild();
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

impl ForceField for Collector {
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
        if map.test(p.position.x, p.position.y) {
            if let Some(cb) = &mut self.callback {
                cb(&HitEvent {
                    start: self.start,
                    end: self.end,
                    particle: p,
                });
            }
            p.kill();
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn collector() -> Collector {
        let mut c = Collector::new(0.0, 50.0, 100.0, 50.0).with_radius(8.0);
        c.init(SurfaceSize::new(100.0, 100.0));
        c
    }

    #[test]
    fn test_kills_on_contact_and_reports() {
        let hits = Rc::new(Cell::new(0));
        let seen = hits.clone();
        let mut c = collector().with_callback(move |e| {
            assert!(e.particle.is_active());
            seen.set(seen.get() + 1);
        });

        let mut p = Particle::timed(0.0, 1000.0);
        p.position = Vector::new(40.0, 50.0);
        c.apply(&mut p);
        assert!(!p.is_active());
        assert_eq!(p.life_index(), 1.0);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_misses_leave_particle_alone() {
        let mut c = collector();
        let mut p = Particle::timed(0.0, 1000.0);
        p.position = Vector::new(40.0, 10.0);
        c.apply(&mut p);
        assert!(p.is_active());
    }

    #[test]
    fn test_inactive_collector_is_noop() {
        let mut c = collector();
        c.set_active(false);
        let mut p = Particle::timed(0.0, 1000.0);
        p.position = Vector::new(40.0, 50.0);
        c.apply(&mut p);
        assert!(p.is_active());
    }

    #[test]
    fn test_translate_moves_hit_region() {
        let mut c = collector();
        c.translate(0.0, 30.0);
        let mut p = Particle::timed(0.0, 1000.0);
        p.position = Vector::new(40.0, 50.0);
        c.apply(&mut p);
        assert!(p.is_active());
        p.position = Vector::new(40.0, 80.0);
        c.apply(&mut p);
        assert!(!p.is_active());
    }
}
