use super::{field_rng, ForceField};
use crate::draw::DebugDraw;
use crate::grid::VectorGrid;
use crate::particle::Particle;
use crate::surface::SurfaceSize;
use crate::vector::{Vector, VectorExt};
use image::{Rgba, RgbaImage};
use rand::rngs::SmallRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Rotation direction of a vortex.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Clockwise.
    Cw,
    /// Counter-clockwise.
    #[default]
    Ccw,
}

impl Direction {
    fn sign(self) -> f64 {
        match self {
            Direction::Cw => -1.0,
            Direction::Ccw => 1.0,
        }
    }
}

/// Snapshot of a vortex's geometry and forces.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VortexSettings {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub cells_x: usize,
    pub cells_y: usize,
    pub force: f64,
    pub inner_force: f64,
    pub outer_force: f64,
    pub suction: f64,
}

/// Swirl around a center point, precomputed into a vector grid.
///
/// Each cell inside `radius` points tangentially around the center, bent
/// toward (or away from) it by `suction`: 0 is pure rotation, 1 adds a
/// further quarter turn. Magnitude fades from `inner_force` at the center
/// to `outer_force` at the rim, by squared distance.
#[derive(Clone)]
pub struct Vortex {
    id: String,
    center: Vector,
    radius: f64,
    cells_x: usize,
    cells_y: usize,
    force: f64,
    suction: f64,
    direction: Direction,
    inner_force: f64,
    outer_force: f64,
    angle_variation: f64,
    force_variation: f64,
    size: Option<SurfaceSize>,
    grid: Option<VectorGrid>,
    rng: SmallRng,
}

impl Vortex {
    /// Counter-clockwise vortex centered on `(x, y)` with radius 100 and force 0.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            id: String::new(),
            center: Vector::new(x, y),
            radius: 100.0,
            cells_x: 32,
            cells_y: 32,
            force: 0.0,
            suction: 0.0,
            direction: Direction::Ccw,
            inner_force: 1.0,
            outer_force: 0.05,
            angle_variation: 0.0,
            force_variation: 0.0,
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

    /// Pull toward the center: 0 swirls, 1 adds a quarter turn inward.
    pub fn with_suction(mut self, suction: f64) -> Self {
        self.suction = suction;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
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

    /// Seed for the per-cell variation.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = field_rng(Some(seed));
        self
    }

    /// Center in pixels.
    pub fn center(&self) -> Vector {
        self.center
    }

    /// Reach in pixels.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn force(&self) -> f64 {
        self.force
    }

    pub fn suction(&self) -> f64 {
        self.suction
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// `(inner, outer)` force.
    pub fn force_gradient(&self) -> (f64, f64) {
        (self.inner_force, self.outer_force)
    }

    /// `(angle, force)` variation.
    pub fn variation(&self) -> (f64, f64) {
        (self.angle_variation, self.force_variation)
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

    /// Force multiplier. Does not rebuild the grid.
    pub fn set_force(&mut self, force: f64) {
        self.force = force;
    }

    /// Regenerates the grid.
    pub fn set_suction(&mut self, suction: f64) {
        self.suction = suction;
        self.regenerate();
    }

    /// Regenerates the grid if the direction changes.
    pub fn set_direction(&mut self, direction: Direction) {
        if direction != self.direction {
            self.direction = direction;
            self.regenerate();
        }
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

    /// Geometry and forces, without the variation or seed.
    pub fn settings(&self) -> VortexSettings {
        VortexSettings {
            x: self.center.x,
            y: self.center.y,
            radius: self.radius,
            cells_x: self.cells_x,
            cells_y: self.cells_y,
            force: self.force,
            inner_force: self.inner_force,
            outer_force: self.outer_force,
            suction: self.suction,
        }
    }

    /// Apply a settings snapshot and rebuild the grid.
    pub fn set_settings(&mut self, s: VortexSettings) {
        self.center = Vector::new(s.x, s.y);
        self.radius = s.radius;
        self.cells_x = s.cells_x.max(1);
        self.cells_y = s.cells_y.max(1);
        self.force = s.force;
        self.inner_force = s.inner_force;
        self.outer_force = s.outer_force;
        self.suction = s.suction;
        self.regenerate();
    }

    /// Rebuild the grid. No-op before `init`.
    pub fn regenerate(&mut self) {
        let Some(size) = self.size else {
            return;
        };
        let mut grid = VectorGrid::new(size.width, size.height, self.cells_x, self.cells_y);

        let r2 = self.radius * self.radius;
        if r2 > 0.0 {
            let tangent = 0.25 * self.direction.sign() * TAU;
            let suck = tangent * self.suction;
            let f_diff = self.outer_force - self.inner_force;

            for (x, y) in grid.cells() {
                let (angle, dist) = grid.angle_dist(x, y, self.center.x, self.center.y);
                if dist <= r2 {
                    let a = angle + tangent + suck + self.rng.gen::<f64>() * self.angle_variation * TAU;
                    let m = self.inner_force + f_diff * (dist / r2) * (1.0 - self.rng.gen::<f64>() * self.force_variation);
                    grid.set_vector_at_cell(x, y, Vector::from_angle_mag(a, m));
                }
            }
        } else {
            log::warn!("vortex '{}' has zero radius, grid left empty", self.id);
        }

        log::debug!("vortex '{}' regenerated {}x{} grid", self.id, self.cells_x, self.cells_y);
        self.grid = Some(grid);
    }

    /// Debug image of the grid.
    pub fn map_image(&self, fg: Rgba<u8>, bg: Option<Rgba<u8>>) -> Option<RgbaImage> {
        self.grid.as_ref().map(|g| g.to_image(fg, bg))
    }
}

impl ForceField for Vortex {
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
