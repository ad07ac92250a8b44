//! Scalar noise sources for animated fields.

use ::noise::{NoiseFn, OpenSimplex};

/// A 3D scalar field returning values in `[0, 1]`.
pub trait NoiseField {
    /// Sample the field at normalized coordinates.
    fn noise3(&self, x: f64, y: f64, z: f64) -> f64;
}

/// OpenSimplex noise remapped from `[-1, 1]` to `[0, 1]`.
#[derive(Clone)]
pub struct SimplexNoise {
    seed: u32,
    source: OpenSimplex,
}

impl SimplexNoise {
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            source: OpenSimplex::new(seed),
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }
}

impl std::fmt::Debug for SimplexNoise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimplexNoise").field("seed", &self.seed).finish()
    }
}

impl NoiseField for SimplexNoise {
    #[inline]
    fn noise3(&self, x: f64, y: f64, z: f64) -> f64 {
        (self.source.get([x, y, z]) * 0.5 + 0.5).clamp(0.0, 1.0)
    }
}
