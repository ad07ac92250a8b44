use super::{field_rng, ForceField};
use crate::draw::DebugDraw;
use crate::grid::VectorGrid;
use crate::particle::Particle;
use crate::surface::SurfaceSize;
use crate::vector::{Vector, VectorExt};
use image::{Rgba, RgbaImage};
use rand::rngs::SmallRng;
use rand::Rng;
use std::f64::consts::TAU;

/// Radial spray out of an angular sector, precomputed into a vector grid.
///
/// Cells within `radius` of the center whose direction from the center lies
/// in `[offset, offset + spread)` point straight outward. Everything else
/// stays zero.
#[derive(Clone)]
pub struct Nozzle {
    id: String,
    center: Vector,
    radius: f64,
    cells_x: usize,
    cells_y: usize,
    force: f64,
    inner_force: f64,
    outer_force: f64,
    angle_variation: f64,
    force_variation: f64,
    /// Degrees.
    spread: f64,
    /// Degrees.
    offset: f64,
    size: Option<SurfaceSize>,
    grid: Option<VectorGrid>,
    rng: SmallRng,
}

impl Nozzle {
    /// Full-circle nozzle centered on `(x, y)` with radius 100 and force 0.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            id: String::new(),
            center: Vector::new(x, y),
            radius: 100.0,
            cells_x: 32,
            cells_y: 32,
            force: 0.0,
            inner_force: 1.0,
            outer_force: 0.05,
            angle_variation: 0.0,
            force_variation: 0.0,
            spread: 360.0,
            offset: 0.0,
            size: None,
            grid: None,
            rng: field_rng(None),
        }
    }

    /// Name used by `Emitter::field_by_id`.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Reach in pixels.
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Grid resolution. Counts below 1 are raised to 1.
    pub fn with_cells(mut self, cells_x: usize, cells_y: usize) -> Self {
        self.cells_x = cells_x.max(1);
        self.cells_y = cells_y.max(1);
        self
    }

    /// Multiplier applied to the grid vector at lookup time.
    pub fn with_force(mut self, force: f64) -> Self {
        self.force = force;
        self
    }

    /// Cell magnitude at the center (`inner`) and at the rim (`outer`).
    pub fn with_force_gradient(mut self, inner: f64, outer: f64) -> Self {
        self.inner_force = inner;
        self.outer_force = outer;
        self
    }

    /// Random angle (fraction of a full turn) and force variation per cell.
    pub fn with_variation(mut self, angle: f64, force: f64) -> Self {
        self.angle_variation = angle;
        self.force_variation = force;
        self
    }

    /// Sector as `spread` degrees starting at `offset` degrees.
    pub fn with_sector(mut self, spread: f64, offset: f64) -> Self {
        self.spread = spread;
        self.offset = offset;
        self
    }

    /// Seed for the per-cell variation.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = field_rng(Some(seed));
        self
    }

    /// Center in pixels.
    pub fn center(&self) -> Vector {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn force(&self) -> f64 {
        self.force
    }

    /// `(inner, outer)` cell magnitudes.
    pub fn force_gradient(&self) -> (f64, f64) {
        (self.inner_force, self.outer_force)
    }

    /// `(angle, force)` variation.
    pub fn variation(&self) -> (f64, f64) {
        (self.angle_variation, self.force_variation)
    }

    /// Sector width in degrees.
    pub fn spread(&self) -> f64 {
        self.spread
    }

    /// Sector start in degrees.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Precomputed vectors, `None` before `init`.
    pub fn grid(&self) -> Option<&VectorGrid> {
        self.grid.as_ref()
    }

    /// Move the center. Regenerates the grid.
    pub fn set_position(&mut self, x: f64, y: f64) {
        self.center = Vector::new(x, y);
        self.regenerate();
    }

    /// Regenerates the grid.
    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius;
        self.regenerate();
    }

    /// Multiplier only; the grid is kept.
    pub fn set_force(&mut self, force: f64) {
        self.force = force;
    }

    /// Regenerates the grid.
    pub fn set_force_gradient(&mut self, inner: f64, outer: f64) {
        self.inner_force = inner;
        self.outer_force = outer;
        self.regenerate();
    }

    /// Regenerates the grid with fresh random draws.
    pub fn set_variation(&mut self, angle: f64, force: f64) {
        self.angle_variation = angle;
        self.force_variation = force;
        self.regenerate();
    }

    /// Sector width in degrees. Regenerates the grid.
    pub fn set_spread(&mut self, degrees: f64) {
        self.spread = degrees;
        self.regenerate();
    }

    /// Sector start in degrees. Regenerates the grid.
    pub fn set_offset(&mut self, degrees: f64) {
        self.offset = degrees;
        self.regenerate();
    }

    fn in_sector(&self, angle: f64) -> bool {
        let spread = self.spread.to_radians();
        if spread >= TAU {
            return true;
        }
        (angle - self.offset.to_radians()).rem_euclid(TAU) < spread
    }

    /// Rebuild the grid. No-op before `init`.
    pub fn regenerate(&mut self) {
        let Some(size) = self.size else {
            return;
        };
        let mut grid = VectorGrid::new(size.width, size.height, self.cells_x, self.cells_y);

        let r2 = self.radius * self.radius;
        if r2 > 0.0 {
            let a_var = self.angle_variation * TAU;
            let f_diff = self.outer_force - self.inner_force;
            for (x, y) in grid.cells() {
                let (angle, dist) = grid.angle_dist(x, y, self.center.x, self.center.y);
                if dist <= r2 && self.in_sector(angle) {
                    let a = angle + self.rng.gen::<f64>() * a_var;
                    let m = self.inner_force + f_diff * (dist / r2) * (1.0 - self.rng.gen::<f64>() * self.force_variation);
                    grid.set_vector_at_cell(x, y, Vector::from_angle_mag(a, m));
                }
            }
        } else {
            log::warn!("nozzle '{}' has zero radius, grid left empty", self.id);
        }

        log::debug!("nozzle '{}' regenerated {}x{} grid", self.id, self.cells_x, self.cells_y);
        self.grid = Some(grid);
    }

    /// Render the vector grid for debugging, `None` before `init`.
    pub fn map_image(&self, fg: Rgba<u8>, bg: Option<Rgba<u8>>) -> Option<RgbaImage> {
        self.grid.as_ref().map(|g| g.to_image(fg, bg))
    }
}

impl ForceField for Nozzle {
    fn id(&self) -> &str {
        &self.id
    }

    fn init(&mut self, size: SurfaceSize) {
        self.size = Some(size);
        self.regenerate();
    }

    #[inline]
    fn apply(&mut self, p: &mut Particle) {
        if self.force == 0.0 || self.radius == 0.0 {
            return;
        }
        if let Some(grid) = &self.grid {
            p.velocity += grid.vector_at_position(p.position.x, p.position.y) * self.force;
        }
    }

    fn scale(&mut self, f: f64) {
        self.size = self.size.map(|s| s.scaled(f));
        self.center *= f;
        self.radius *= f;
        self.force *= f;
        if let Some(grid) = &mut self.grid {
            grid.scale(f);
        }
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.center += Vector::new(dx, dy);
        self.regenerate();
    }

    fn show_debug(&self, draw: &mut dyn DebugDraw) {
        draw.circle(self.center.x, self.center.y, self.radius);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nozzle(spread: f64, offset: f64) -> Nozzle {
        let mut n = Nozzle::new(50.0, 50.0)
            .with_radius(45.0)
            .with_cells(10, 10)
            .with_force(1.0)
            .with_sector(spread, offset)
            .with_seed(3);
        n.init(SurfaceSize::new(100.0, 100.0));
        n
    }

    #[test]
    fn test_sector_limits_cells() {
        // 0..90 degrees: +x, +y quadrant (screen down-right)
        let n = nozzle(90.0, 0.0);
        let grid = n.grid().unwrap();
        assert_ne!(grid.vector_at_cell(6, 6), Some(Vector::ZERO));
        assert_eq!(grid.vector_at_cell(3, 3), Some(Vector::ZERO));
        assert_eq!(grid.vector_at_cell(6, 3), Some(Vector::ZERO));
    }

    #[test]
    fn test_sector_wraps_past_full_turn() {
        // 270..360+45 degrees covers the up-right quadrant and the first 45 of down-right
        let n = nozzle(135.0, 270.0);
        let grid = n.grid().unwrap();
        assert_ne!(grid.vector_at_cell(6, 3), Some(Vector::ZERO));
        assert_ne!(grid.vector_at_cell(7, 5), Some(Vector::ZERO));
        assert_eq!(grid.vector_at_cell(3, 6), Some(Vector::ZERO));
    }

    #[test]
    fn test_vectors_point_outward() {
        let n = nozzle(360.0, 0.0);
        let v = n.grid().unwrap().vector_at_cell(8, 5).unwrap();
        assert!(v.x > 0.0);
        assert!((v.heading() - Vector::new(35.0, 5.0).heading()).abs() < 1e-9);
    }

    #[test]
    fn test_zero_radius_is_noop() {
        let mut n = nozzle(360.0, 0.0);
        n.set_radius(0.0);
        let mut p = Particle::timed(0.0, 1000.0);
        p.position = Vector::new(60.0, 60.0);
        n.apply(&mut p);
        assert_eq!(p.velocity, Vector::ZERO);
    }
}
