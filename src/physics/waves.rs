use super::{draw_segment, ForceField};
use crate::draw::DebugDraw;
use crate::grid::VectorGrid;
use crate::particle::Particle;
use crate::surface::SurfaceSize;
use crate::vector::{Vector, VectorExt};
use image::{Rgba, RgbaImage};
use std::f64::consts::TAU;

/// Unit vectors whose direction swings sinusoidally along the x axis.
///
/// Cell column `x` of `n` points at `angle + sin(x / (n - 1) * 2π * frequency) * amplitude`.
#[derive(Clone)]
pub struct Waves {
    id: String,
    /// Degrees.
    angle: f64,
    force: f64,
    cells_x: usize,
    cells_y: usize,
    frequency: f64,
    amplitude: f64,
    size: Option<SurfaceSize>,
    grid: Option<VectorGrid>,
}

impl Waves {
    /// Waves pointing at `angle` degrees on average, applied with strength `force`.
    pub fn new(angle: f64, force: f64) -> Self {
        Self {
            id: String::new(),
            angle,
            force,
            cells_x: 32,
            cells_y: 32,
            frequency: 3.0,
            amplitude: 0.5,
            size: None,
            grid: None,
        }
    }

    /// Name used by `Emitter::field_by_id`.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Grid resolution. Counts below 1 are raised to 1.
    pub fn with_cells(mut self, cells_x: usize, cells_y: usize) -> Self {
        self.cells_x = cells_x.max(1);
        self.cells_y = cells_y.max(1);
        self
    }

    /// Full sine periods across the surface width.
    pub fn with_frequency(mut self, frequency: f64) -> Self {
        self.frequency = frequency;
        self
    }

    /// Swing amplitude in radians.
    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Base direction in degrees.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn force(&self) -> f64 {
        self.force
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Swing amplitude in radians.
    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    /// Precomputed directions, `None` before `init`.
    pub fn grid(&self) -> Option<&VectorGrid> {
        self.grid.as_ref()
    }

    /// Base direction in degrees. Regenerates the grid.
    pub fn set_angle(&mut self, degrees: f64) {
        self.angle = degrees;
        self.regenerate();
    }

    /// Strength only; the grid is kept.
    pub fn set_force(&mut self, force: f64) {
        self.force = force;
    }

    /// Regenerates the grid.
    pub fn set_frequency(&mut self, frequency: f64) {
        self.frequency = frequency;
        self.regenerate();
    }

    /// Swing in radians. Regenerates the grid.
    pub fn set_amplitude(&mut self, amplitude: f64) {
        self.amplitude = amplitude;
        self.regenerate();
    }

    /// Rebuild the grid. No-op before `init`.
    pub fn regenerate(&mut self) {
        let Some(size) = self.size else {
            return;
        };
        let mut grid = VectorGrid::new(size.width, size.height, self.cells_x, self.cells_y);
        let last_column = (grid.cells_x() - 1) as f64;
        let pre_freq = TAU * self.frequency;
        let angle = self.angle.to_radians();

        for (x, y) in grid.cells() {
            let fx = if last_column > 0.0 {
                x as f64 / last_column * pre_freq
            } else {
                0.0
            };
            let a = fx.sin() * self.amplitude + angle;
            grid.set_vector_at_cell(x, y, Vector::from_angle_mag(a % TAU, 1.0));
        }

        log::debug!("waves '{}' regenerated {}x{} grid", self.id, self.cells_x, self.cells_y);
        self.grid = Some(grid);
    }

    /// Render the direction grid for debugging, `None` before `init`.
    pub fn map_image(&self, fg: Rgba<u8>, bg: Option<Rgba<u8>>) -> Option<RgbaImage> {
        self.grid.as_ref().map(|g| g.to_image(fg, bg))
    }
}

impl ForceField for Waves {
    fn id(&self) -> &str {
        &self.id
    }

    fn init(&mut self, size: SurfaceSize) {
        self.size = Some(size);
        self.regenerate();
    }

    #[inline]
    fn apply(&mut self, p: &mut Particle) {
        if self.force == 0.0 {
            return;
        }
        if let Some(grid) = &self.grid {
            p.velocity += grid.vector_at_position(p.position.x, p.position.y) * self.force;
        }
    }

    fn scale(&mut self, f: f64) {
        self.size = self.size.map(|s| s.scaled(f));
        self.force *= f;
        if let Some(grid) = &mut self.grid {
            grid.scale(f);
        }
    }

    fn show_debug(&self, draw: &mut dyn DebugDraw) {
        let Some(size) = self.size else {
            return;
        };
        let center = Vector::new(size.width * 0.5, size.height * 0.5);
        let half = Vector::from_angle_mag(self.angle.to_radians(), size.width * 0.5 * self.force);
        draw_segment(draw, center - half, center + half);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_follow_sine() {
        let mut w = Waves::new(0.0, 1.0).with_cells(5, 2).with_frequency(0.25).with_amplitude(1.0);
        w.init(SurfaceSize::new(100.0, 40.0));
        let grid = w.grid().unwrap();

        // first column: sin(0) = 0
        let v0 = grid.vector_at_cell(0, 0).unwrap();
        assert!((v0 - Vector::new(1.0, 0.0)).length() < 1e-12);

        // last column: sin(2π * 0.25) = 1 radian swing
        let v4 = grid.vector_at_cell(4, 1).unwrap();
        assert!((v4.heading() - 1.0).abs() < 1e-12);
        assert!((v4.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_column_grid_is_finite() {
        let mut w = Waves::new(90.0, 1.0).with_cells(1, 1);
        w.init(SurfaceSize::new(10.0, 10.0));
        let v = w.grid().unwrap().vector_at_cell(0, 0).unwrap();
        assert!(v.x.is_finite() && v.y.is_finite());
    }

    #[test]
    fn test_uninitialized_waves_leave_particles_alone() {
        let mut w = Waves::new(0.0, 2.0).with_cells(4, 4);
        w.regenerate();
        assert!(w.grid().is_none());

        let mut p = Particle::timed(0.0, 1000.0);
        p.position = Vector::new(5.0, 5.0);
        w.apply(&mut p);
        assert_eq!(p.velocity, Vector::ZERO);
    }

    #[test]
    fn test_apply_scales_by_force() {
        let mut w = Waves::new(0.0, 2.0).with_cells(4, 4).with_amplitude(0.0);
        w.init(SurfaceSize::new(40.0, 40.0));
        let mut p = Particle::timed(0.0, 1000.0);
        p.position = Vector::new(5.0, 5.0);
        w.apply(&mut p);
        assert!((p.velocity - Vector::new(2.0, 0.0)).length() < 1e-12);
    }
}
