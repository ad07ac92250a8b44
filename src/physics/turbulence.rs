use super::{field_rng, FrameInfo, ForceField};
use crate::error::{ConfigError, Result};
use crate::grid::{MapObject, VectorGrid};
use crate::noise::{NoiseField, SimplexNoise};
use crate::particle::Particle;
use crate::surface::SurfaceSize;
use crate::vector::{Vector, VectorExt};
use image::{Rgba, RgbaImage};
use rand::rngs::SmallRng;
use rand::Rng;
use std::f64::consts::{PI, TAU};

/// Animated noise field.
///
/// A stack of `slices` grids is built from 3D noise, one depth per slice:
/// one noise source drives direction, another drives magnitude. Every
/// `slice_frames` frames the active grid advances along a jitter sequence
/// that interpolates between random slice indices every `jitter_interval`
/// steps, so motion drifts smoothly without recomputing noise per frame.
pub struct Turbulence {
    id: String,
    cells_x: usize,
    cells_y: usize,
    force: f64,
    slices: usize,
    slice_frames: usize,
    jitter_interval: usize,
    jitter_keys: usize,
    angle_octaves: f64,
    force_octaves: f64,
    direction_variation: f64,
    force_variation: f64,

    size: Option<SurfaceSize>,
    maps: Vec<VectorGrid>,
    jitter: Vec<usize>,
    slice: usize,
    slice_frame: usize,
    current: usize,

    rng: SmallRng,
    angle_noise: Box<dyn NoiseField>,
    force_noise: Box<dyn NoiseField>,
}

impl Turbulence {
    /// Noise turbulence with strength `force`, 32x32 cells and 20 slices.
    pub fn new(force: f64) -> Self {
        let mut rng = field_rng(None);
        let (a, f) = (rng.gen(), rng.gen());
        Self {
            id: String::new(),
            cells_x: 32,
            cells_y: 32,
            force,
            slices: 20,
            slice_frames: 5,
            jitter_interval: 10,
            jitter_keys: 50,
            angle_octaves: 2.0,
            force_octaves: 4.0,
            direction_variation: 0.1,
            force_variation: 0.8,
            size: None,
            maps: Vec::new(),
            jitter: Vec::new(),
            slice: 0,
            slice_frame: 0,
            current: 0,
            rng,
            angle_noise: Box::new(SimplexNoise::new(a)),
            force_noise: Box::new(SimplexNoise::new(f)),
        }
    }

    /// Name used by `Emitter::field_by_id`.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Grid resolution of every slice. Counts below 1 are raised to 1.
    pub fn with_cells(mut self, cells_x: usize, cells_y: usize) -> Self {
        self.cells_x = cells_x.max(1);
        self.cells_y = cells_y.max(1);
        self
    }

    /// Number of noise depths to precompute.
    pub fn with_slices(mut self, slices: usize) -> Self {
        self.slices = slices.max(1);
        self
    }

    /// Frames each slice stays active.
    pub fn with_slice_frames(mut self, frames: usize) -> Self {
        self.slice_frames = frames.max(1);
        self
    }

    /// Steps between jitter keys, and number of keys.
    pub fn with_jitter(mut self, interval: usize, keys: usize) -> Self {
        self.jitter_interval = interval.max(1);
        self.jitter_keys = keys;
        self
    }

    /// Noise frequency multipliers for direction and magnitude. Clamped to at least 1.
    pub fn with_octaves(mut self, angle: f64, force: f64) -> Self {
        self.angle_octaves = angle.max(1.0);
        self.force_octaves = force.max(1.0);
        self
    }

    /// Direction spread (fraction of a full turn) and magnitude damping, both from noise.
    pub fn with_variation(mut self, direction: f64, force: f64) -> Self {
        self.direction_variation = direction;
        self.force_variation = force;
        self
    }

    /// Seed the generator and both default noise sources.
    ///
    /// Replaces noise set with [`with_noise`](Self::with_noise); call that afterwards to combine.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = field_rng(Some(seed));
        let (a, f) = (self.rng.gen(), self.rng.gen());
        self.angle_noise = Box::new(SimplexNoise::new(a));
        self.force_noise = Box::new(SimplexNoise::new(f));
        self
    }

    /// Use custom noise sources for direction and magnitude.
    pub fn with_noise(mut self, angle: impl NoiseField + 'static, force: impl NoiseField + 'static) -> Self {
        self.angle_noise = Box::new(angle);
        self.force_noise = Box::new(force);
        self
    }

    pub fn force(&self) -> f64 {
        self.force
    }

    pub fn slices(&self) -> usize {
        self.slices
    }

    /// Frames each slice stays active.
    pub fn slice_frames(&self) -> usize {
        self.slice_frames
    }

    /// Steps between random key slices in the jitter sequence.
    pub fn jitter_interval(&self) -> usize {
        self.jitter_interval
    }

    /// Random key slices in the jitter sequence.
    pub fn jitter_keys(&self) -> usize {
        self.jitter_keys
    }

    pub fn angle_octaves(&self) -> f64 {
        self.angle_octaves
    }

    pub fn force_octaves(&self) -> f64 {
        self.force_octaves
    }

    pub fn direction_variation(&self) -> f64 {
        self.direction_variation
    }

    pub fn force_variation(&self) -> f64 {
        self.force_variation
    }

    /// Jitter sequence of slice indices.
    pub fn jitter(&self) -> &[usize] {
        &self.jitter
    }

    /// Position in the jitter sequence.
    pub fn slice(&self) -> usize {
        self.slice
    }

    /// Index of the active grid.
    pub fn current_slice(&self) -> usize {
        self.current
    }

    /// All precomputed grids.
    pub fn maps(&self) -> &[VectorGrid] {
        &self.maps
    }

    /// The grid particles currently sample.
    pub fn grid(&self) -> Option<&VectorGrid> {
        self.maps.get(self.current)
    }

    /// Strength only; the slices are kept.
    pub fn set_force(&mut self, force: f64) {
        self.force = force;
    }

    /// Regenerates every slice.
    pub fn set_force_variation(&mut self, variation: f64) {
        self.force_variation = variation;
        self.regenerate();
    }

    /// Fraction of a full turn. Regenerates every slice.
    pub fn set_direction_variation(&mut self, variation: f64) {
        self.direction_variation = variation;
        self.regenerate();
    }

    /// Takes effect when the jitter sequence next wraps.
    pub fn set_jitter_interval(&mut self, interval: usize) {
        self.jitter_interval = interval.max(1);
    }

    /// Frames per slice, at least 1.
    pub fn set_slice_frames(&mut self, frames: usize) {
        self.slice_frames = frames.max(1);
    }

    /// Clamped to at least 1. Regenerates every slice.
    pub fn set_angle_octaves(&mut self, octaves: f64) {
        self.angle_octaves = octaves.max(1.0);
        self.regenerate();
    }

    /// Clamped to at least 1. Regenerates every slice.
    pub fn set_force_octaves(&mut self, octaves: f64) {
        self.force_octaves = octaves.max(1.0);
        self.regenerate();
    }

    /// Export every slice.
    pub fn map_objects(&self) -> Vec<MapObject> {
        self.maps.iter().map(VectorGrid::map_object).collect()
    }

    /// Replace the slice stack with previously exported maps.
    pub fn set_map_objects(&mut self, maps: Vec<MapObject>) -> Result<()> {
        if maps.is_empty() {
            return Err(ConfigError::InvalidMapObject("turbulence needs at least one slice".into()));
        }
        let grids = maps
            .into_iter()
            .map(VectorGrid::from_map_object)
            .collect::<Result<Vec<_>>>()?;
        self.slices = grids.len();
        self.maps = grids;
        self.slice = 0;
        self.slice_frame = 0;
        self.current = 0;
        self.regenerate_jitter();
        Ok(())
    }

    /// Rebuild every slice and the jitter sequence. No-op before `init`.
    pub fn regenerate(&mut self) {
        let Some(size) = self.size else {
            return;
        };

        let ro = TAU * self.rng.gen::<f64>() - PI;
        let (mx, my) = (self.cells_x as f64, self.cells_y as f64);
        let mut maps = Vec::with_capacity(self.slices);

        for z in 0..self.slices {
            let mut grid = VectorGrid::new(size.width, size.height, self.cells_x, self.cells_y);
            let depth = z as f64 / self.slices as f64;
            let depth_a = depth * self.angle_octaves;
            let depth_f = depth * self.force_octaves;

            for (x, y) in grid.cells() {
                let (nx, ny) = (x as f64 / mx, y as f64 / my);
                let a = self.angle_noise.noise3(nx * self.angle_octaves, ny * self.angle_octaves, depth_a);
                let f = self.force_noise.noise3(nx * self.force_octaves, ny * self.force_octaves, depth_f);
                let angle = a * TAU + ro + TAU * self.direction_variation * self.rng.gen::<f64>();
                let mag = (1.0 - f * self.force_variation).clamp(0.0, 1.0);
                grid.set_vector_at_cell(x, y, Vector::from_angle_mag(angle, mag));
            }
            maps.push(grid);
        }

        self.maps = maps;
        self.slice = 0;
        self.slice_frame = 0;
        self.current = 0;
        self.regenerate_jitter();
        log::debug!("turbulence '{}' regenerated {} slices", self.id, self.slices);
    }

    fn regenerate_jitter(&mut self) {
        let interval = self.jitter_interval.max(1);
        let keys = self.jitter_keys;
        let slices = self.maps.len().max(1);
        let total = (keys + 1) * interval - 1;
        let cnt = keys * interval;

        let lerp = |a: usize, b: usize, i: usize| -> usize {
            let t = (i % interval) as f64 / interval as f64;
            (a as f64 + (b as f64 - a as f64) * t) as usize
        };

        let mut jitter = Vec::with_capacity(total);
        let mut from = None;
        let mut to = 0;
        for i in 0..cnt {
            if i % interval == 0 {
                from = Some(match from {
                    None => self.rng.gen_range(0..slices),
                    Some(_) => to,
                });
                to = self.rng.gen_range(0..slices);
            }
            jitter.push(lerp(from.unwrap_or(0), to, i));
        }

        // tail eases back into the first key so the sequence loops
        let from = to;
        let to = jitter.first().copied().unwrap_or(0);
        for i in cnt..total {
            jitter.push(lerp(from, to, i));
        }

        self.jitter = jitter;
    }

    /// Render the active slice for debugging, `None` before `init`.
    pub fn map_image(&self, fg: Rgba<u8>, bg: Option<Rgba<u8>>) -> Option<RgbaImage> {
        self.grid().map(|g| g.to_image(fg, bg))
    }
}

impl ForceField for Turbulence {
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
        if let Some(grid) = self.maps.get(self.current) {
            p.velocity += grid.vector_at_position(p.position.x, p.position.y) * self.force;
        }
    }

    fn update_frame(&mut self, frame: &FrameInfo) {
        if self.maps.is_empty() || self.force == 0.0 || frame.count == 0 {
            return;
        }
        self.slice_frame += 1;
        if self.slice_frame < self.slice_frames {
            return;
        }
        self.slice_frame = 0;
        self.slice += 1;
        if self.slice >= self.jitter.len() {
            self.slice = 0;
            self.regenerate_jitter();
        }
        let last = self.maps.len() - 1;
        self.current = self.jitter.get(self.slice).copied().unwrap_or(0).min(last);
    }

    fn scale(&mut self, f: f64) {
        self.size = self.size.map(|s| s.scaled(f));
        self.force *= f;
        for map in &mut self.maps {
            map.scale(f);
        }
    }
}
