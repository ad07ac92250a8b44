use super::ForceField;
use crate::draw::DebugDraw;
use crate::particle::Particle;
use crate::surface::SurfaceSize;
use crate::vector::{Vector, VectorExt};

/// Pulls particles toward a point.
///
/// The pull is `force * (1 - influence * (1 - life_index))`: with influence
/// 0 every particle gets the full force, with influence 1 the pull grows
/// from nothing at birth to full strength at death.
#[derive(Clone, Debug, PartialEq)]
pub struct Target {
    id: String,
    target: Vector,
    force: f64,
    influence: f64,
}

impl Target {
    /// Pull toward `(x, y)` in pixels with strength `force` per frame.
    pub fn new(x: f64, y: f64, force: f64) -> Self {
        Self {
            id: String::new(),
            target: Vector::new(x, y),
            force,
            influence: 0.5,
        }
    }

    /// Name used by `Emitter::field_by_id`.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// How much the pull depends on particle age, from 0 (none) to 1 (full).
    pub fn with_life_influence(mut self, influence: f64) -> Self {
        self.influence = influence;
        self
    }

    /// Target point in pixels.
    pub fn position(&self) -> Vector {
        self.target
    }

    pub fn force(&self) -> f64 {
        self.force
    }

    /// Age weighting of the pull, see [`Target`].
    pub fn life_influence(&self) -> f64 {
        self.influence
    }

    /// Move the target. Pixels.
    pub fn set_position(&mut self, x: f64, y: f64) {
        self.target = Vector::new(x, y);
    }

    pub fn set_x(&mut self, x: f64) {
        self.target.x = x;
    }

    pub fn set_y(&mut self, y: f64) {
        self.target.y = y;
    }

    /// Negative values push particles away.
    pub fn set_force(&mut self, force: f64) {
        self.force = force;
    }

    pub fn set_life_influence(&mut self, influence: f64) {
        self.influence = influence;
    }
}

impl ForceField for Target {
    fn id(&self) -> &str {
        &self.id
    }

    fn init(&mut self, _size: SurfaceSize) {}

    #[inline]
    fn apply(&mut self, p: &mut Particle) {
        if self.force == 0.0 {
            return;
        }
        let a = (self.target - p.position).heading();
        let i = 1.0 - self.influence * (1.0 - p.life_index());
        p.velocity += Vector::from_angle_mag(a, self.force * i);
    }

    fn scale(&mut self, f: f64) {
        self.force *= f;
        self.target *= f;
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.target += Vector::new(dx, dy);
    }

    fn show_debug(&self, draw: &mut dyn DebugDraw) {
        draw.rect(self.target.x - 4.0, self.target.y - 4.0, 8.0, 8.0);
    }
}
