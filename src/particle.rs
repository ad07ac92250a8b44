//! Per-particle simulation state.
//!
//! A particle follows one of two life policies, chosen when it is created:
//!
//! | Mode | Chosen when | Dies when |
//! |------|-------------|-----------|
//! | [`LifeMode::Timed`] | `life > 0` | `(now - born) / life` reaches 1 |
//! | [`LifeMode::Bounded`] | `life == 0` | its position leaves the bounds rectangle |
//!
//! Once a particle is inactive it is inert: the emitter skips it until the
//! next compaction removes it from the population.

use crate::surface::Bounds;
use crate::vector::{Vector, VectorExt};
use bytemuck::{Pod, Zeroable};

/// Life policy of a particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LifeMode {
    /// Ages with wall-clock time; `life` is the duration in milliseconds.
    Timed {
        /// Life duration in milliseconds.
        life: f64,
    },
    /// Lives until it exits the rectangle. The life index is never advanced.
    Bounded(Bounds),
}

/// A single particle.
///
/// Base values (`base_*`) are the spawn-time values after jitter. The
/// current `size`, `opacity`, `blur` and `rotation` are derived from them
/// each frame through the emitter's over-life curves.
#[derive(Clone, Debug)]
pub struct Particle {
    /// Monotonic identity assigned by the emitter.
    pub id: u64,
    /// Current position.
    pub position: Vector,
    /// Position before the last integration step.
    pub previous: Vector,
    /// Velocity in pixels per nominal frame.
    pub velocity: Vector,
    /// Rotation change per nominal frame (radians).
    pub rotational_velocity: f64,
    /// Emission angle (radians).
    pub angle: f64,

    pub rotation: f64,
    pub base_rotation: f64,
    pub size: f64,
    /// Half the current size.
    pub radius: f64,
    pub base_size: f64,
    pub opacity: f64,
    pub base_opacity: f64,
    pub blur: f64,
    pub base_blur: f64,

    /// Set by edge-triggered collision fields while inside a hit region.
    pub is_hit: bool,

    born: f64,
    mode: LifeMode,
    life_index: f64,
    active: bool,
}

impl Particle {
    /// Create a particle born at `born`. A `life` of zero selects bounds mode.
    pub fn new(born: f64, life: f64, bounds: Bounds) -> Self {
        let mode = if life == 0.0 {
            LifeMode::Bounded(bounds)
        } else {
            LifeMode::Timed { life }
        };
        Self::with_mode(born, mode)
    }

    /// Create a time-bound particle with `life` milliseconds to live.
    pub fn timed(born: f64, life: f64) -> Self {
        Self::with_mode(born, LifeMode::Timed { life })
    }

    /// Create a bounds-bound particle.
    pub fn bounded(born: f64, bounds: Bounds) -> Self {
        Self::with_mode(born, LifeMode::Bounded(bounds))
    }

    fn with_mode(born: f64, mode: LifeMode) -> Self {
        Self {
            id: 0,
            position: Vector::ZERO,
            previous: Vector::ZERO,
            velocity: Vector::ZERO,
            rotational_velocity: 0.0,
            angle: 0.0,
            rotation: 0.0,
            base_rotation: 0.0,
            size: 0.0,
            radius: 0.0,
            base_size: 0.0,
            opacity: 1.0,
            base_opacity: 1.0,
            blur: 0.0,
            base_blur: 0.0,
            is_hit: false,
            born,
            mode,
            life_index: 0.0,
            active: true,
        }
    }

    /// Birth timestamp in milliseconds.
    #[inline]
    pub fn born(&self) -> f64 {
        self.born
    }

    /// Shift the birth timestamp, e.g. to compensate for a pause.
    #[inline]
    pub(crate) fn delay_birth(&mut self, ms: f64) {
        self.born += ms;
    }

    /// Life policy of this particle.
    #[inline]
    pub fn mode(&self) -> LifeMode {
        self.mode
    }

    /// Life duration in milliseconds, or 0 for bounds-mode particles.
    #[inline]
    pub fn life(&self) -> f64 {
        match self.mode {
            LifeMode::Timed { life } => life,
            LifeMode::Bounded(_) => 0.0,
        }
    }

    /// Whether this particle ages with time.
    #[inline]
    pub fn is_timed(&self) -> bool {
        matches!(self.mode, LifeMode::Timed { .. })
    }

    /// Normalized age in `[0, 1]`.
    #[inline]
    pub fn life_index(&self) -> f64 {
        self.life_index
    }

    /// Whether the particle is still alive.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Run the life policy for timestamp `now`. Inactive particles are untouched.
    pub fn update_life(&mut self, now: f64) {
        if !self.active {
            return;
        }
        match self.mode {
            LifeMode::Timed { life } => {
                let lived = now - self.born;
                let index = if life > 0.0 { lived / life } else { 1.0 };
                // never run backwards, even if `now` does
                self.life_index = index.clamp(0.0, 1.0).max(self.life_index);
                self.active = self.life_index < 1.0;
            }
            LifeMode::Bounded(bounds) => {
                self.active = bounds.contains(self.position.x, self.position.y);
            }
        }
    }

    /// Integrate position and rotation by `factor` (time scale × global force).
    #[inline]
    pub fn integrate(&mut self, factor: f64) {
        self.previous = self.position;
        self.position += self.velocity * factor;
        self.rotation += self.rotational_velocity * factor;
    }

    /// Set the current size from the base size and an over-life factor.
    #[inline]
    pub fn set_size(&mut self, factor: f64) {
        self.size = self.base_size * factor;
        self.radius = self.size * 0.5;
    }

    /// Kill the particle: inactive, life index 1, no rotational motion.
    pub fn kill(&mut self) {
        self.active = false;
        self.life_index = 1.0;
        self.velocity = Vector::ZERO;
        self.rotational_velocity = 0.0;
    }

    /// Angle of travel from the previous position to the current one.
    pub fn position_angle(&self) -> f64 {
        (self.position - self.previous).heading()
    }

    /// Angle of the velocity vector.
    pub fn velocity_angle(&self) -> f64 {
        self.velocity.heading()
    }

    /// Distance covered by the last integration step.
    pub fn travelled(&self) -> f64 {
        (self.position - self.previous).length()
    }

    /// Squared distance covered by the last integration step.
    pub fn travelled_sq(&self) -> f64 {
        (self.position - self.previous).length_squared()
    }

    /// Scale position, velocity and base size.
    pub fn scale(&mut self, f: f64) {
        self.position *= f;
        self.previous *= f;
        self.velocity *= f;
        self.base_size *= f;
    }

    /// Move the particle (and its previous position) by `(dx, dy)`.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        let d = Vector::new(dx, dy);
        self.position += d;
        self.previous += d;
    }

    /// Snapshot for renderers that upload particles as raw instance data.
    pub fn to_instance(&self) -> ParticleInstance {
        ParticleInstance {
            position: [self.position.x as f32, self.position.y as f32],
            size: self.size as f32,
            opacity: self.opacity as f32,
            blur: self.blur as f32,
            rotation: self.rotation as f32,
            life_index: self.life_index as f32,
            id: self.id as u32,
        }
    }
}

/// Plain-old-data particle snapshot, laid out for direct buffer upload.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 2],
    pub size: f32,
    pub opacity: f32,
    pub blur: f32,
    pub rotation: f32,
    pub life_index: f32,
    /// Lower 32 bits of the particle id.
    pub id: u32,
}
