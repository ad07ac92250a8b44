use super::{draw_segment, ForceField};
use crate::draw::DebugDraw;
use crate::particle::Particle;
use crate::surface::SurfaceSize;
use crate::vector::{Vector, VectorExt};

/// Constant push in a direction given in degrees.
#[derive(Clone, Debug, PartialEq)]
pub struct Wind {
    id: String,
    angle: f64,
    force: f64,
    v: Vector,
    size: SurfaceSize,
}

impl Wind {
    /// Wind blowing along `angle` degrees with strength `force`.
    pub fn new(angle: f64, force: f64) -> Self {
        let mut wind = Self {
            id: String::new(),
            angle,
            force,
            v: Vector::ZERO,
            size: SurfaceSize::default(),
        };
        wind.update_vector();
        wind
    }

    /// Name used by `Emitter::field_by_id`.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    fn update_vector(&mut self) {
        self.v = Vector::from_angle_mag(self.angle.to_radians(), self.force);
    }

    /// Direction in degrees.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Direction in radians.
    pub fn angle_rad(&self) -> f64 {
        self.angle.to_radians()
    }

    pub fn force(&self) -> f64 {
        self.force
    }

    /// The vector added per frame.
    pub fn vector(&self) -> Vector {
        self.v
    }

    /// Direction in degrees.
    pub fn set_angle(&mut self, degrees: f64) {
        self.angle = degrees;
        self.update_vector();
    }

    /// Direction in radians. Stored as degrees.
    pub fn set_angle_rad(&mut self, radians: f64) {
        self.angle = radians.to_degrees();
        self.update_vector();
    }

    pub fn set_force(&mut self, force: f64) {
        self.force = force;
        self.update_vector();
    }

    /// Direction in degrees and strength together.
    pub fn set_angle_force(&mut self, degrees: f64, force: f64) {
        self.angle = degrees;
        self.force = force;
        self.update_vector();
    }
}

impl ForceField for Wind {
    fn id(&self) -> &str {
        &self.id
    }

    fn init(&mut self, size: SurfaceSize) {
        self.size = size;
    }

    #[inline]
    fn apply(&mut self, p: &mut Particle) {
        if self.force != 0.0 {
            p.velocity += self.v;
        }
    }

    fn scale(&mut self, f: f64) {
        self.size = self.size.scaled(f);
        self.force *= f;
        self.update_vector();
    }

    fn show_debug(&self, draw: &mut dyn DebugDraw) {
        let center = Vector::new(self.size.width * 0.5, self.size.height * 0.5);
        let half = Vector::from_angle_mag(self.angle_rad(), self.size.width * 0.5 * self.force);
        draw_segment(draw, center - half, center + half);
        let tip = center + half;
        draw.rect(tip.x, tip.y - 1.0, 3.0, 3.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blows_along_angle() {
        let mut wind = Wind::new(90.0, 2.0);
        let mut p = Particle::timed(0.0, 1000.0);
        wind.apply(&mut p);
        assert!(p.velocity.x.abs() < 1e-12);
        assert!((p.velocity.y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_force_is_noop() {
        let mut wind = Wind::new(45.0, 0.0);
        let mut p = Particle::timed(0.0, 1000.0);
        p.velocity = Vector::new(1.0, 1.0);
        wind.apply(&mut p);
        assert_eq!(p.velocity, Vector::new(1.0, 1.0));
    }

    #[test]
    fn test_radian_setter_round_trips() {
        let mut wind = Wind::new(0.0, 1.0);
        wind.set_angle_rad(std::f64::consts::PI);
        assert!((wind.angle() - 180.0).abs() < 1e-9);
        assert!((wind.vector().x + 1.0).abs() < 1e-12);
    }
}
