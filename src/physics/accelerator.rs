use super::ForceField;
use crate::particle::Particle;
use crate::surface::SurfaceSize;

/// Speeds particles up (or down, with a negative force) as they age.
#[derive(Clone, Debug, PartialEq)]
pub struct Accelerator {
    id: String,
    force: f64,
}

impl Accelerator {
    /// Velocity grows by `force * life_index` per frame.
    pub fn new(force: f64) -> Self {
        Self {
            id: String::new(),
            force,
        }
    }

    /// Name used by `Emitter::field_by_id`.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn force(&self) -> f64 {
        self.force
    }

    /// Growth rate. Takes effect on the next frame.
    pub fn set_force(&mut self, force: f64) {
        self.force = force;
    }
}

impl ForceField for Accelerator {
    fn id(&self) -> &str {
        &self.id
    }

    fn init(&mut self, _size: SurfaceSize) {}

    #[inline]
    fn apply(&mut self, p: &mut Particle) {
        p.velocity *= 1.0 + self.force * p.life_index();
    }

    // dimensionless
    fn scale(&mut self, _f: f64) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::Vector;

    #[test]
    fn test_growth_follows_life_index() {
        let mut acc = Accelerator::new(0.5);
        let mut p = Particle::timed(0.0, 100.0);
        p.velocity = Vector::new(2.0, 0.0);

        p.update_life(0.0);
        acc.apply(&mut p);
        assert_eq!(p.velocity, Vector::new(2.0, 0.0));

        p.update_life(50.0);
        acc.apply(&mut p);
        assert_eq!(p.velocity, Vector::new(2.5, 0.0));
    }
}
