use super::ForceField;
use crate::particle::Particle;
use crate::surface::SurfaceSize;

/// Air resistance: decays velocity by a constant fraction per frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Air {
    id: String,
    resistance: f64,
}

impl Air {
    /// Damping field. `resistance` is the fraction of velocity removed each frame.
    pub fn new(resistance: f64) -> Self {
        Self {
            id: String::new(),
            resistance,
        }
    }

    /// Name used by `Emitter::field_by_id`.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Fraction of velocity removed per frame, usually in `[0, 1]`.
    pub fn resistance(&self) -> f64 {
        self.resistance
    }

    /// Values above 1 reverse particles; negative values accelerate them.
    pub fn set_resistance(&mut self, resistance: f64) {
        self.resistance = resistance;
    }
}

impl ForceField for Air {
    fn id(&self) -> &str {
        &self.id
    }

    fn init(&mut self, _size: SurfaceSize) {}

    #[inline]
    fn apply(&mut self, p: &mut Particle) {
        p.velocity *= 1.0 - self.resistance;
    }

    fn scale(&mut self, f: f64) {
        self.resistance *= f;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::Vector;

    #[test]
    fn test_decays_velocity() {
        let mut air = Air::new(0.25);
        let mut p = Particle::timed(0.0, 1000.0);
        p.velocity = Vector::new(4.0, -8.0);
        air.apply(&mut p);
        assert_eq!(p.velocity, Vector::new(3.0, -6.0));
    }
}
