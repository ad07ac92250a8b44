//! Force fields: per-particle velocity (and occasionally position) perturbations.
//!
//! Every field implements [`ForceField`]. Emitters call [`ForceField::apply`]
//! once per active particle per frame, in the order fields were added, then
//! [`ForceField::update_frame`] once per frame after all particles.
//!
//! | Field | Effect | Backing |
//! |-------|--------|---------|
//! | [`Gravity`] | `v += g` | constant vector |
//! | [`Wind`] | `v += (angle, force)` | constant vector |
//! | [`Air`] | `v *= 1 - resistance` | scalar |
//! | [`Accelerator`] | `v *= 1 + force * life` | scalar |
//! | [`Vortex`] | swirl around a center | [`VectorGrid`](crate::grid::VectorGrid) |
//! | [`Nozzle`] | spray out of a sector | [`VectorGrid`](crate::grid::VectorGrid) |
//! | [`Waves`] | sinusoidal direction along x | [`VectorGrid`](crate::grid::VectorGrid) |
//! | [`Turbulence`] | animated noise | stack of grids |
//! | [`Target`] | pull toward a point | none |
//! | [`Path`] | blend position onto a spline | sampled curve |
//! | [`Collector`] | kill on contact with a line | hit map |
//! | [`Reflector`] | bounce off a line | hit map |
//!
//! # Sharing
//!
//! Fields are attached as [`SharedField`] (`Rc<RefCell<dyn ForceField>>`).
//! One field may be attached to several emitters on surfaces of the same
//! size. Mutating or scaling a shared field affects every emitter it is
//! attached to on the next frame. Attach separate instances (most fields
//! are `Clone`) when emitters need independent state.
//!
//! ```ignore
//! let vortex = Rc::new(RefCell::new(Vortex::new(256.0, 128.0).with_force(0.4)));
//! left.add_field(vortex.clone());
//! right.add_field(vortex.clone());
//! vortex.borrow_mut().set_suction(0.2); // both emitters see the change
//! ```

mod accelerator;
mod air;
mod collector;
mod gravity;
mod nozzle;
mod path;
mod reflector;
mod target;
mod turbulence;
mod vortex;
mod waves;
mod wind;

pub use accelerator::Accelerator;
pub use air::Air;
pub use collector::Collector;
pub use gravity::Gravity;
pub use nozzle::Nozzle;
pub use path::Path;
pub use reflector::Reflector;
pub use target::Target;
pub use turbulence::Turbulence;
pub use vortex::{Direction, Vortex, VortexSettings};
pub use waves::Waves;
pub use wind::Wind;

use crate::draw::DebugDraw;
use crate::particle::Particle;
use crate::surface::SurfaceSize;
use crate::vector::Vector;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::cell::RefCell;
use std::rc::Rc;

/// Per-frame information passed to [`ForceField::update_frame`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInfo {
    /// Active particles processed by the emitter this frame.
    pub count: usize,
}

/// A force-field plugin.
pub trait ForceField {
    /// Optional identifier used by [`Emitter::field_by_id`](crate::Emitter::field_by_id).
    fn id(&self) -> &str;

    /// Prepare for a surface of `size`. Grid-backed fields build their grids here.
    fn init(&mut self, size: SurfaceSize);

    /// Perturb one active particle.
    fn apply(&mut self, particle: &mut Particle);

    /// Advance animated state once per frame.
    fn update_frame(&mut self, _frame: &FrameInfo) {}

    /// Rescale size-dependent parameters by `f`.
    fn scale(&mut self, f: f64);

    /// Move position-dependent parameters by `(dx, dy)`.
    fn translate(&mut self, _dx: f64, _dy: f64) {}

    /// Draw a visualization of the field.
    fn show_debug(&self, _draw: &mut dyn DebugDraw) {}
}

/// Passed to collector and reflector callbacks when a particle touches their line.
pub struct HitEvent<'a> {
    /// Line start.
    pub start: Vector,
    /// Line end.
    pub end: Vector,
    /// The particle that hit, after the field's effect was applied.
    pub particle: &'a Particle,
}

/// Callback fired on line hits.
pub type HitCallback = Box<dyn FnMut(&HitEvent<'_>)>;

/// A force field attached by reference.
pub type SharedField = Rc<RefCell<dyn ForceField>>;

/// Wrap a field for attachment to one or more emitters.
pub fn shared<F: ForceField + 'static>(field: F) -> SharedField {
    Rc::new(RefCell::new(field))
}

/// Seeded generator for fields with randomized grids.
pub(crate) fn field_rng(seed: Option<u64>) -> SmallRng {
    SmallRng::seed_from_u64(seed.unwrap_or_else(rand::random))
}

/// Draw a segment from `a` to `b`.
pub(crate) fn draw_segment(draw: &mut dyn DebugDraw, a: Vector, b: Vector) {
    draw.move_to(a.x, a.y);
    draw.line_to(b.x, b.y);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_field_mutation_is_visible_to_all_holders() {
        let gravity = Rc::new(RefCell::new(Gravity::new(0.0, 1.0)));
        let a: SharedField = gravity.clone();
        let b: SharedField = gravity.clone();

        gravity.borrow_mut().set_xy(0.0, 2.0);

        let mut p = Particle::timed(0.0, 1000.0);
        a.borrow_mut().apply(&mut p);
        b.borrow_mut().apply(&mut p);
        assert_eq!(p.velocity, Vector::new(0.0, 4.0));
    }

    #[test]
    fn test_shared_helper_keeps_id() {
        let field = shared(Air::new(0.1).with_id("drag"));
        assert_eq!(field.borrow().id(), "drag");
    }
}
