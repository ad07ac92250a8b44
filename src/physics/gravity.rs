use super::ForceField;
use crate::error::{ConfigError, Result};
use crate::particle::Particle;
use crate::surface::SurfaceSize;
use crate::vector::{Vector, VectorExt};

/// Constant acceleration added to every particle's velocity.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Gravity {
    id: String,
    g: Vector,
}

impl Gravity {
    /// Constant pull of `(x, y)` added to velocity every frame.
    pub fn new(x: f64, y: f64) -> Self {
        Self::from_vector(Vector::new(x, y))
    }

    /// Constant pull of `g` added to velocity every frame.
    pub fn from_vector(g: Vector) -> Self {
        Self { id: String::new(), g }
    }

    /// Gravity of magnitude `force` pointing along `angle` (radians).
    pub fn from_angle(angle: f64, force: f64) -> Result<Self> {
        let mut gravity = Self::default();
        gravity.set_angle_force(angle, force)?;
        Ok(gravity)
    }

    /// Name used by `Emitter::field_by_id`.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// The vector added per frame.
    pub fn vector(&self) -> Vector {
        self.g
    }

    pub fn x(&self) -> f64 {
        self.g.x
    }

    pub fn y(&self) -> f64 {
        self.g.y
    }

    /// Direction in radians.
    pub fn angle(&self) -> f64 {
        self.g.heading()
    }

    /// Magnitude.
    pub fn force(&self) -> f64 {
        self.g.length()
    }

    pub fn set_xy(&mut self, x: f64, y: f64) {
        self.g = Vector::new(x, y);
    }

    pub fn set_vector(&mut self, g: Vector) {
        self.g = g;
    }

    pub fn set_x(&mut self, x: f64) {
        self.g.x = x;
    }

    pub fn set_y(&mut self, y: f64) {
        self.g.y = y;
    }

    /// Set from an angle (radians) and magnitude. Both must be finite.
    pub fn set_angle_force(&mut self, angle: f64, force: f64) -> Result<()> {
        if !angle.is_finite() || !force.is_finite() {
            return Err(ConfigError::InvalidParameter(format!(
                "gravity angle and force must be finite, got angle={angle} force={force}"
            )));
        }
        self.g = Vector::from_angle_mag(angle, force);
        Ok(())
    }
}

impl ForceField for Gravity {
    fn id(&self) -> &str {
        &self.id
    }

    fn init(&mut self, _size: SurfaceSize) {}

    #[inline]
    fn apply(&mut self, p: &mut Particle) {
        p.velocity += self.g;
    }

    fn scale(&mut self, f: f64) {
        self.g *= f;
    }
}
