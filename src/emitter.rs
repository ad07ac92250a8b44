//! Particle emitters: spawning, per-frame update and compaction.
//!
//! An [`Emitter`] owns its particle population. Each frame a scene calls,
//! in order:
//!
//! | Step | Method | Work |
//! |------|--------|------|
//! | 1 | [`generate_particles`](Emitter::generate_particles) | append new particles with jittered start values |
//! | 2 | [`render_particles`](Emitter::render_particles) | age, apply fields, integrate, hand to the renderer |
//! | 3 | [`cleanup_particles`](Emitter::cleanup_particles) | drop dead particles, at most once per interval |
//!
//! Dead particles stop rendering at once but stay in the population until
//! the next compaction.
//!
//! # Units
//!
//! The public API uses the units of [`EmitterConfig`]: life in seconds,
//! angles in degrees and velocity scaled by 100 (a velocity of 100 moves a
//! particle one pixel per nominal frame). Internally life is kept in
//! milliseconds and velocity in pixels per frame.
//!
//! # Example
//!
//! ```ignore
//! let mut emitter = Emitter::new(
//!     EmitterConfig::default()
//!         .with_position(256.0, 200.0)
//!         .with_birth_rate(200.0)
//!         .with_spread(60.0, 240.0)
//!         .with_life(2.0),
//! );
//! emitter.add_field(shared(Gravity::new(0.0, 0.05)));
//! emitter.set_renderer(Box::new(PreviewRenderer::new()))?;
//! scene.add_emitter(emitter)?;
//! ```

use crate::curve::{ColorRamp, OverLifeCurve, OverLifeTarget, DEFAULT_RESOLUTION};
use crate::error::{ConfigError, Result};
use crate::particle::Particle;
use crate::physics::{FrameInfo, SharedField};
use crate::renderer::{FrameStats, Renderer};
use crate::spawn::{SpawnShape, SpawnType, Spawner};
use crate::surface::SurfaceSize;
use crate::vector::{Vector, VectorExt};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Added to every particle's life to absorb frame quantization (ms).
pub const LIFE_COMPENSATION: f64 = 16.67;

/// Default compaction interval (ms).
pub const DEFAULT_CLEANUP_INTERVAL: f64 = 1000.0;

/// Called with every particle, alive or dead, before it is updated.
pub type ParticleCallback = Box<dyn FnMut(&mut Particle)>;

/// Jitter spreads in `[0, 1]`. A spread `s` lowers the base value by a
/// random fraction of up to `s`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Randomness {
    #[serde(rename = "randomLife")]
    pub life: f64,
    #[serde(rename = "randomVelocity")]
    pub velocity: f64,
    #[serde(rename = "randomOpacity")]
    pub opacity: f64,
    #[serde(rename = "randomSize")]
    pub size: f64,
    #[serde(rename = "randomBlur")]
    pub blur: f64,
    #[serde(rename = "randomRotation")]
    pub rotation: f64,
}

/// Emitter options.
///
/// Deserializes from the camelCase option object used by scene files
/// (`{"type": "line", "endX": 300, "birthRate": 50, ...}`); missing keys
/// keep their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmitterConfig {
    #[serde(rename = "type")]
    pub spawn_type: SpawnType,
    pub x: f64,
    pub y: f64,
    pub end_x: f64,
    pub end_y: f64,
    pub box_radius: f64,
    pub grid_width: f64,
    pub grid_height: f64,
    pub cells_x: usize,
    pub cells_y: usize,
    /// Particles per second.
    pub birth_rate: f64,
    /// Scaled by 100.
    pub velocity: f64,
    pub global_force: f64,
    pub opacity: f64,
    pub size: f64,
    /// Seconds. Zero makes particles live until they leave the surface.
    pub life: f64,
    pub blur: f64,
    /// Degrees.
    pub rotation: f64,
    /// Degrees.
    pub rotation_offset: f64,
    pub max_particles: usize,
    #[serde(flatten)]
    pub randomness: Randomness,
    /// Degrees.
    pub spread_angle: f64,
    /// Degrees.
    pub spread_offset: f64,
    pub debug: bool,
    pub pre_render: bool,
    pub post_render: bool,
    pub reverse_render_order: bool,
    pub linear_time_step_x: f64,
    pub linear_time_step_y: f64,
    pub linear_time_step_angle: f64,
    pub linear_ping_pong_x: bool,
    pub linear_ping_pong_y: bool,
    pub linear_ping_pong_angle: bool,
    /// RNG seed. `None` seeds from system entropy.
    pub seed: Option<u64>,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            spawn_type: SpawnType::Point,
            x: 0.0,
            y: 0.0,
            end_x: 100.0,
            end_y: 0.0,
            box_radius: 50.0,
            grid_width: 100.0,
            grid_height: 100.0,
            cells_x: 5,
            cells_y: 5,
            birth_rate: 100.0,
            velocity: 100.0,
            global_force: 1.0,
            opacity: 1.0,
            size: 1.0,
            life: 3.0,
            blur: 0.0,
            rotation: 0.0,
            rotation_offset: 0.0,
            max_particles: 8000,
            randomness: Randomness::default(),
            spread_angle: 360.0,
            spread_offset: 0.0,
            debug: false,
            pre_render: false,
            post_render: false,
            reverse_render_order: false,
            linear_time_step_x: 0.0,
            linear_time_step_y: 0.0,
            linear_time_step_angle: 0.0,
            linear_ping_pong_x: false,
            linear_ping_pong_y: false,
            linear_ping_pong_angle: false,
            seed: None,
        }
    }
}

impl EmitterConfig {
    /// Parse a JSON option object. Unknown spawn types are rejected.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes back to the camelCase option object.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn with_spawn_type(mut self, spawn_type: SpawnType) -> Self {
        self.spawn_type = spawn_type;
        self
    }

    /// Spawn origin. Box spawns center on it and grid spawns start at it.
    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Line spawn from the position to `(end_x, end_y)`.
    pub fn with_line_end(mut self, end_x: f64, end_y: f64) -> Self {
        self.spawn_type = SpawnType::Line;
        self.end_x = end_x;
        self.end_y = end_y;
        self
    }

    /// Box spawn of side `radius` centered on the position.
    pub fn with_box_radius(mut self, radius: f64) -> Self {
        self.spawn_type = SpawnType::Box;
        self.box_radius = radius;
        self
    }

    /// Grid spawn anchored at the position.
    pub fn with_grid(mut self, width: f64, height: f64, cells_x: usize, cells_y: usize) -> Self {
        self.spawn_type = SpawnType::Grid;
        self.grid_width = width;
        self.grid_height = height;
        self.cells_x = cells_x;
        self.cells_y = cells_y;
        self
    }

    /// Particles per second. `Emitter::new` clamps negative rates to 0.
    pub fn with_birth_rate(mut self, rate: f64) -> Self {
        self.birth_rate = rate;
        self
    }

    /// Start speed in option units, stored divided by 100.
    pub fn with_velocity(mut self, velocity: f64) -> Self {
        self.velocity = velocity;
        self
    }

    /// Multiplies every frame's time step.
    pub fn with_global_force(mut self, force: f64) -> Self {
        self.global_force = force;
        self
    }

    /// Seconds. Zero makes particles live until they leave the surface.
    pub fn with_life(mut self, seconds: f64) -> Self {
        self.life = seconds;
        self
    }

    /// Clamped to at least 1.
    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    /// Clamped to `[0, 1]`.
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    /// Clamped to `[0, 1]`.
    pub fn with_blur(mut self, blur: f64) -> Self {
        self.blur = blur;
        self
    }

    /// Base rotation and per-particle offset, in degrees.
    pub fn with_rotation(mut self, degrees: f64, offset_degrees: f64) -> Self {
        self.rotation = degrees;
        self.rotation_offset = offset_degrees;
        self
    }

    /// Emit within `spread` degrees starting at `offset` degrees.
    pub fn with_spread(mut self, spread: f64, offset: f64) -> Self {
        self.spread_angle = spread;
        self.spread_offset = offset;
        self
    }

    /// Live particles processed per frame.
    pub fn with_max_particles(mut self, max: usize) -> Self {
        self.max_particles = max;
        self
    }

    pub fn with_randomness(mut self, randomness: Randomness) -> Self {
        self.randomness = randomness;
        self
    }

    /// Sweeps spawn positions instead of sampling them.
    /// A non-positive `step_y` reuses `step_x`.
    pub fn with_linear_spread(mut self, step_x: f64, step_y: f64) -> Self {
        self.linear_time_step_x = step_x;
        self.linear_time_step_y = step_y;
        self
    }

    /// Sweeps the spread angle by `step` degrees per particle.
    pub fn with_linear_angle_spread(mut self, step: f64) -> Self {
        self.linear_time_step_angle = step;
        self
    }

    /// Reverses each sweep at its end instead of wrapping.
    pub fn with_ping_pong(mut self, x: bool, y: bool, angle: bool) -> Self {
        self.linear_ping_pong_x = x;
        self.linear_ping_pong_y = y;
        self.linear_ping_pong_angle = angle;
        self
    }

    pub fn with_reverse_render_order(mut self, reverse: bool) -> Self {
        self.reverse_render_order = reverse;
        self
    }

    /// Enables the pre and post render passes.
    pub fn with_render_hooks(mut self, pre: bool, post: bool) -> Self {
        self.pre_render = pre;
        self.post_render = post;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// The four over-life curves of an emitter.
#[derive(Clone, Debug, Default, PartialEq)]
struct OverLife {
    size: OverLifeCurve,
    opacity: OverLifeCurve,
    blur: OverLifeCurve,
    rotation: OverLifeCurve,
}

impl OverLife {
    fn get(&self, target: OverLifeTarget) -> &OverLifeCurve {
        match target {
            OverLifeTarget::Size => &self.size,
            OverLifeTarget::Opacity => &self.opacity,
            OverLifeTarget::Blur => &self.blur,
            OverLifeTarget::Rotation => &self.rotation,
        }
    }

    fn set(&mut self, target: OverLifeTarget, curve: OverLifeCurve) {
        match target {
            OverLifeTarget::Size => self.size = curve,
            OverLifeTarget::Opacity => self.opacity = curve,
            OverLifeTarget::Blur => self.blur = curve,
            OverLifeTarget::Rotation => self.rotation = curve,
        }
    }

    /// Re-derive the visual attributes of `p` from its base values.
    #[inline]
    fn apply(&self, p: &mut Particle, rotation_offset: f64) {
        let li = p.life_index();
        p.rotation = p.base_rotation * self.rotation.sample(li) + rotation_offset;
        p.opacity = p.base_opacity * self.opacity.sample(li);
        p.blur = p.base_blur * self.blur.sample(li);
        p.set_size(self.size.sample(li));
    }
}

/// A particle source with its own population, force fields and renderer.
pub struct Emitter {
    spawner: Spawner,
    surface: Option<SurfaceSize>,

    birth_rate: f64,
    /// Pixels per nominal frame.
    velocity: f64,
    global_force: f64,
    opacity: f64,
    size: f64,
    /// Milliseconds.
    life: f64,
    blur: f64,
    /// Degrees.
    rotation: f64,
    /// Degrees.
    rotation_offset: f64,
    /// Degrees.
    spread_angle: f64,
    /// Degrees.
    spread_offset: f64,
    max_particles: usize,
    randomness: Randomness,

    debug: bool,
    pre_render: bool,
    post_render: bool,
    reverse_render_order: bool,

    particles: Vec<Particle>,
    fields: Vec<SharedField>,
    renderer: Option<Box<dyn Renderer>>,
    over_life: OverLife,
    callback: Option<ParticleCallback>,

    next_id: u64,
    count: usize,
    /// Fractional particles carried between frames.
    pub(crate) remainder: f64,
    pause_time: Option<f64>,
    clean_stamp: f64,
    clean_interval: f64,
}

impl Emitter {
    /// Builds an emitter that is unbound until `init`.
    pub fn new(config: EmitterConfig) -> Self {
        let mut spawner = Spawner::new(config.seed);
        {
            let g = spawner.geometry_mut();
            g.origin = Vector::new(config.x, config.y);
            g.end = Vector::new(config.end_x, config.end_y);
            g.box_radius = config.box_radius;
            g.grid_width = config.grid_width;
            g.grid_height = config.grid_height;
            g.cells_x = config.cells_x.max(1);
            g.cells_y = config.cells_y.max(1);
        }
        spawner.set_spawn_type(config.spawn_type);
        spawner.set_ping_pong(
            config.linear_ping_pong_x,
            config.linear_ping_pong_y,
            config.linear_ping_pong_angle,
        );
        spawner.use_linear_spread(config.linear_time_step_x, config.linear_time_step_y);
        spawner.use_linear_angle_spread(config.linear_time_step_angle);

        Self {
            spawner,
            surface: None,
            birth_rate: config.birth_rate.max(0.0),
            velocity: config.velocity * 0.01,
            global_force: config.global_force,
            opacity: config.opacity.clamp(0.0, 1.0),
            size: config.size.max(1.0),
            life: config.life.max(0.0) * 1000.0,
            blur: config.blur.clamp(0.0, 1.0),
            rotation: config.rotation,
            rotation_offset: config.rotation_offset,
            spread_angle: config.spread_angle,
            spread_offset: config.spread_offset,
            max_particles: config.max_particles,
            randomness: config.randomness,
            debug: config.debug,
            pre_render: config.pre_render,
            post_render: config.post_render,
            reverse_render_order: config.reverse_render_order,
            particles: Vec::new(),
            fields: Vec::new(),
            renderer: None,
            over_life: OverLife::default(),
            callback: None,
            next_id: 0,
            count: 0,
            remainder: 0.0,
            pause_time: None,
            clean_stamp: 0.0,
            clean_interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }

    /// Parse a JSON option object into a new emitter.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(EmitterConfig::from_json(json)?))
    }

    /// Reseed the spawn RNG.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.spawner.reseed(seed);
        self
    }

    /// Runs for each visited particle before its life is updated.
    pub fn with_callback(mut self, callback: impl FnMut(&mut Particle) + 'static) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Milliseconds between compaction passes.
    pub fn with_cleanup_interval(mut self, ms: f64) -> Self {
        self.clean_interval = ms;
        self
    }

    /// Bind to a surface. Initializes attached fields and the renderer.
    pub fn init(&mut self, size: SurfaceSize) -> Result<()> {
        if size.is_empty() {
            return Err(ConfigError::InvalidParameter(format!(
                "surface size {}x{} must be positive",
                size.width, size.height
            )));
        }
        self.surface = Some(size);
        for field in &self.fields {
            field.borrow_mut().init(size);
        }
        if let Some(renderer) = &mut self.renderer {
            renderer.init(size)?;
        }
        log::debug!(
            "emitter initialized on {}x{} surface with {} fields",
            size.width,
            size.height,
            self.fields.len()
        );
        Ok(())
    }

    /// Surface size from [`init`](Emitter::init), if bound.
    pub fn surface(&self) -> Option<SurfaceSize> {
        self.surface
    }

    // ========== Fields and renderer ==========

    /// Attach a field. It is initialized right away if the emitter is
    /// bound to a surface. Fields apply in the order they were added.
    pub fn add_field(&mut self, field: SharedField) {
        if let Some(size) = self.surface {
            field.borrow_mut().init(size);
        }
        self.fields.push(field);
    }

    /// Field at `index`.
    pub fn field(&self, index: usize) -> Option<SharedField> {
        self.fields.get(index).map(Rc::clone)
    }

    /// First field whose id is `id`.
    pub fn field_by_id(&self, id: &str) -> Option<SharedField> {
        self.fields.iter().find(|f| f.borrow().id() == id).map(Rc::clone)
    }

    pub fn fields(&self) -> &[SharedField] {
        &self.fields
    }

    /// Detach and return the field at `index`.
    pub fn remove_field(&mut self, index: usize) -> Option<SharedField> {
        (index < self.fields.len()).then(|| self.fields.remove(index))
    }

    /// Attach a renderer, initializing it if the emitter is bound.
    pub fn set_renderer(&mut self, mut renderer: Box<dyn Renderer>) -> Result<()> {
        if let Some(size) = self.surface {
            renderer.init(size)?;
        }
        self.renderer = Some(renderer);
        Ok(())
    }

    pub fn renderer_mut(&mut self) -> Option<&mut (dyn Renderer + 'static)> {
        self.renderer.as_deref_mut()
    }

    pub fn take_renderer(&mut self) -> Option<Box<dyn Renderer>> {
        self.debug = false;
        self.renderer.take()
    }

    /// Replaces the per-particle callback.
    pub fn set_callback(&mut self, callback: Option<ParticleCallback>) {
        self.callback = callback;
    }

    // ========== Over-life ==========

    /// Set the curve for a target named `"size"`, `"opacity"`, `"blur"` or `"rotation"`.
    pub fn set_over_life(&mut self, target: &str, curve: OverLifeCurve) -> Result<()> {
        let target: OverLifeTarget = target.parse()?;
        self.set_over_life_target(target, curve);
        Ok(())
    }

    /// Drives `target` from `curve` over each timed particle's life.
    pub fn set_over_life_target(&mut self, target: OverLifeTarget, curve: OverLifeCurve) {
        self.over_life.set(target, curve);
    }

    /// Over-life curve from the red channel of a color ramp.
    pub fn over_life_gradient(&mut self, target: &str, ramp: &dyn ColorRamp, resolution: Option<usize>) -> Result<()> {
        let curve = OverLifeCurve::from_gradient(ramp, resolution.unwrap_or(DEFAULT_RESOLUTION));
        self.set_over_life(target, curve)
    }

    /// Over-life curve from a cubic Bezier easing between (0,0) and (1,1).
    pub fn over_life_bezier(
        &mut self,
        target: &str,
        (c1x, c1y): (f64, f64),
        (c2x, c2y): (f64, f64),
        resolution: Option<usize>,
    ) -> Result<()> {
        let curve = OverLifeCurve::from_bezier(c1x, c1y, c2x, c2y, resolution.unwrap_or(DEFAULT_RESOLUTION));
        self.set_over_life(target, curve)
    }

    pub fn over_life(&self, target: OverLifeTarget) -> &OverLifeCurve {
        self.over_life.get(target)
    }

    // ========== Per-frame ==========

    /// Append `count` particles born at `now`.
    ///
    /// Before [`init`](Emitter::init) the default surface bounds are used
    /// for particles without a life.
    pub fn generate_particles(&mut self, now: f64, count: usize) {
        let bounds = self.surface.unwrap_or_default().bounds();
        let rnd = self.randomness;

        let ool = self.over_life.opacity.sample(0.0);
        let bol = self.over_life.blur.sample(0.0);
        let sol = self.over_life.size.sample(0.0);
        let rol = self.over_life.rotation.sample(0.0);

        let spread = self.spread_angle.to_radians();
        let offset = self.spread_offset.to_radians();
        let rotation = self.rotation.to_radians();
        let rotation_offset = self.rotation_offset.to_radians();

        self.particles.reserve(count);
        for _ in 0..count {
            let position = self.spawner.next_position();

            let life = self.spawner.jitter(self.life, rnd.life) + LIFE_COMPENSATION;
            let velocity = self.spawner.jitter(self.velocity, rnd.velocity);
            let size = self.spawner.jitter(self.size, rnd.size);
            let opacity = self.spawner.jitter(self.opacity, rnd.opacity);
            let blur = self.spawner.jitter(self.blur, rnd.blur);
            let base_rotation = self.spawner.jitter(rotation, rnd.rotation);
            let angle = self.spawner.next_angle(spread, offset);

            let mut p = if self.life == 0.0 {
                Particle::bounded(now, bounds)
            } else {
                Particle::timed(now, life)
            };

            self.next_id += 1;
            p.id = self.next_id;
            p.position = position;
            p.previous = position;
            p.velocity = Vector::from_angle_mag(angle, velocity);
            p.angle = angle;
            p.base_rotation = base_rotation;
            p.rotation = base_rotation * rol + rotation_offset;
            p.base_size = size;
            p.set_size(sol);
            p.base_opacity = opacity;
            p.opacity = opacity * ool;
            p.base_blur = blur;
            p.blur = blur * bol;

            self.particles.push(p);
        }

        log::trace!("spawned {} particles ({} total)", count, self.next_id);
    }

    /// Advance and render the population for timestamp `now`.
    ///
    /// `time_scale` is the frame's time step relative to a 60 fps frame.
    /// At most `max_particles` active particles are processed: the oldest
    /// ones in normal order, the newest with reverse render order. Dead
    /// particles are skipped and not counted.
    pub fn render_particles(&mut self, now: f64, time_scale: f64) {
        let total = self.next_id;
        if self.pre_render {
            if let Some(r) = &mut self.renderer {
                r.pre_render(&FrameStats { count: self.count, total });
            }
        }

        let factor = time_scale * self.global_force;
        let max = self.max_particles;
        let rotation_offset = self.rotation_offset.to_radians();

        let Self {
            particles,
            fields,
            renderer,
            over_life,
            callback,
            reverse_render_order,
            ..
        } = self;

        let order: Box<dyn Iterator<Item = &mut Particle> + '_> = if *reverse_render_order {
            Box::new(particles.iter_mut().rev())
        } else {
            Box::new(particles.iter_mut())
        };

        let mut count = 0;
        for p in order {
            if count >= max {
                break;
            }
            if let Some(cb) = callback.as_mut() {
                cb(&mut *p);
            }

            p.update_life(now);
            if !p.is_active() {
                continue;
            }
            count += 1;

            if p.is_timed() {
                over_life.apply(p, rotation_offset);
            }

            for field in fields.iter() {
                field.borrow_mut().apply(p);
                if !p.is_active() {
                    break;
                }
            }
            // killed by a field
            if !p.is_active() {
                continue;
            }

            p.integrate(factor);

            if p.size > 0.0 && p.opacity > 0.0 {
                if let Some(r) = renderer.as_mut() {
                    r.render_particle(p);
                }
            }
        }

        self.count = count;

        if self.post_render {
            if let Some(r) = &mut self.renderer {
                r.post_render(&FrameStats { count, total });
            }
        }

        if self.debug {
            if let Some(draw) = self.renderer.as_mut().and_then(|r| r.draw_target()) {
                draw.reset();
                for field in &self.fields {
                    field.borrow().show_debug(draw);
                }
            }
        }

        let info = FrameInfo { count };
        for field in &self.fields {
            field.borrow_mut().update_frame(&info);
        }
    }

    /// Drop dead particles if the cleanup interval has passed since the last run.
    pub fn cleanup_particles(&mut self, now: f64) {
        if now - self.clean_interval > self.clean_stamp {
            self.clean_stamp = now;
            let before = self.particles.len();
            self.particles.retain(Particle::is_active);
            log::debug!("compacted particles {} -> {}", before, self.particles.len());
        }
    }

    // ========== Playback ==========

    /// Freeze at `now`. Pausing twice keeps the first timestamp.
    pub fn pause(&mut self, now: f64) {
        if self.pause_time.is_none() {
            self.pause_time = Some(now);
        }
    }

    /// True while frames only redraw.
    pub fn is_paused(&self) -> bool {
        self.pause_time.is_some()
    }

    /// Resume at `now`. Every particle's birth is pushed back by the paused
    /// time plus 1 ms, so remaining life is unchanged.
    pub fn play(&mut self, now: f64) {
        if let Some(paused_at) = self.pause_time.take() {
            let diff = now - paused_at + 1.0;
            for p in &mut self.particles {
                p.delay_birth(diff);
            }
            log::debug!("emitter resumed after {:.1} ms", diff);
        }
    }

    /// Pause and discard every particle.
    pub fn stop(&mut self, now: f64) {
        self.pause(now);
        self.clear(None);
    }

    /// Discard every particle, optionally setting a new birth rate.
    pub fn clear(&mut self, birth_rate: Option<f64>) {
        self.particles.clear();
        if let Some(rate) = birth_rate {
            self.set_birth_rate(rate);
        }
    }

    // ========== Transform ==========

    /// Move the spawn geometry, active particles and attached fields.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        for field in &self.fields {
            field.borrow_mut().translate(dx, dy);
        }
        for p in self.particles.iter_mut().filter(|p| p.is_active()) {
            p.translate(dx, dy);
        }
        self.spawner.geometry_mut().translate(dx, dy);
    }

    /// Scale fields, particles, spawn geometry, particle size and the surface.
    pub fn scale(&mut self, f: f64) {
        for field in &self.fields {
            field.borrow_mut().scale(f);
        }
        for p in &mut self.particles {
            p.scale(f);
        }
        self.spawner.geometry_mut().scale(f);
        self.size *= f;
        self.surface = self.surface.map(|s| s.scaled(f));
    }

    // ========== Stats ==========

    /// Active particles processed by the last [`render_particles`](Emitter::render_particles).
    pub fn count(&self) -> usize {
        self.count
    }

    /// Particles spawned since creation.
    pub fn total_spawned(&self) -> u64 {
        self.next_id
    }

    /// Fractional particles the scene carries into the next frame.
    pub fn remainder(&self) -> f64 {
        self.remainder
    }

    /// The population, including dead particles awaiting compaction.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    // ========== Spawn geometry ==========

    pub fn spawn_type(&self) -> SpawnType {
        self.spawner.spawn_type()
    }

    /// Switch spawn type by name, keeping the stored parameters.
    pub fn set_spawn_type(&mut self, name: &str) -> Result<()> {
        let kind: SpawnType = name.parse()?;
        self.spawner.set_spawn_type(kind);
        Ok(())
    }

    /// Switch spawn type along with its parameters.
    pub fn configure_spawn(&mut self, shape: SpawnShape) {
        self.spawner.configure(shape);
    }

    pub fn position(&self) -> Vector {
        self.spawner.geometry().origin
    }

    /// Moves the spawn origin. Live particles stay put.
    pub fn set_position(&mut self, x: f64, y: f64) {
        self.spawner.geometry_mut().origin = Vector::new(x, y);
    }

    /// `(start, end)` of the line spawn.
    pub fn line(&self) -> (Vector, Vector) {
        let g = self.spawner.geometry();
        (g.origin, g.end)
    }

    /// Line spawn endpoints. The start is also the spawn origin.
    pub fn set_line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) {
        let g = self.spawner.geometry_mut();
        g.origin = Vector::new(x0, y0);
        g.end = Vector::new(x1, y1);
    }

    pub fn box_radius(&self) -> f64 {
        self.spawner.geometry().box_radius
    }

    /// Side length of the box spawn area.
    pub fn set_box_radius(&mut self, radius: f64) {
        self.spawner.geometry_mut().box_radius = radius;
    }

    pub fn grid_size(&self) -> (f64, f64) {
        let g = self.spawner.geometry();
        (g.grid_width, g.grid_height)
    }

    /// Grid extent in surface units, from the origin.
    pub fn set_grid_size(&mut self, width: f64, height: f64) {
        let g = self.spawner.geometry_mut();
        g.grid_width = width;
        g.grid_height = height;
    }

    pub fn grid_cells(&self) -> (usize, usize) {
        let g = self.spawner.geometry();
        (g.cells_x, g.cells_y)
    }

    /// Counts below 1 are clamped to 1.
    pub fn set_grid_cells(&mut self, cells_x: usize, cells_y: usize) {
        let g = self.spawner.geometry_mut();
        g.cells_x = cells_x.max(1);
        g.cells_y = cells_y.max(1);
    }

    /// Step spawn positions linearly. `step_x <= 0` restores random
    /// positions; `step_y <= 0` reuses `step_x`.
    pub fn use_linear_spread(&mut self, step_x: f64, step_y: f64) {
        self.spawner.use_linear_spread(step_x, step_y);
    }

    /// Step emission angles linearly. A step `<= 0` restores random angles.
    pub fn use_linear_angle_spread(&mut self, step: f64) {
        self.spawner.use_linear_angle_spread(step);
    }

    /// `(x, y, angle)` linear steps, 0 where random.
    pub fn linear_spread(&self) -> (f64, f64, f64) {
        self.spawner.linear_steps()
    }

    pub fn set_ping_pong(&mut self, x: bool, y: bool, angle: bool) {
        self.spawner.set_ping_pong(x, y, angle);
    }

    // ========== Particle parameters ==========

    /// Particles per second.
    pub fn birth_rate(&self) -> f64 {
        self.birth_rate
    }

    /// Negative rates are clamped to 0.
    pub fn set_birth_rate(&mut self, rate: f64) {
        self.birth_rate = rate.max(0.0);
    }

    pub fn blur(&self) -> f64 {
        self.blur
    }

    /// Clamped to `[0, 1]`.
    pub fn set_blur(&mut self, blur: f64) {
        self.blur = blur.clamp(0.0, 1.0);
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    /// Clamped to `[0, 1]`.
    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    /// Seconds.
    pub fn life(&self) -> f64 {
        self.life * 0.001
    }

    /// Seconds. Negative values are ignored.
    pub fn set_life(&mut self, seconds: f64) {
        if seconds >= 0.0 {
            self.life = seconds * 1000.0;
        }
    }

    /// Start velocity, scaled by 100.
    pub fn velocity(&self) -> f64 {
        self.velocity * 100.0
    }

    /// Option units, stored divided by 100.
    pub fn set_velocity(&mut self, velocity: f64) {
        self.velocity = velocity * 0.01;
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    /// Sizes below 1 are clamped to 1.
    pub fn set_size(&mut self, size: f64) {
        self.size = size.max(1.0);
    }

    /// Degrees.
    pub fn spread_angle(&self) -> f64 {
        self.spread_angle
    }

    /// Degrees.
    pub fn set_spread_angle(&mut self, degrees: f64) {
        self.spread_angle = degrees;
    }

    /// Degrees.
    pub fn spread_offset(&self) -> f64 {
        self.spread_offset
    }

    pub fn set_spread_offset(&mut self, degrees: f64) {
        self.spread_offset = degrees;
    }

    /// `(rotation, offset)` in degrees.
    pub fn rotation(&self) -> (f64, f64) {
        (self.rotation, self.rotation_offset)
    }

    /// Degrees.
    pub fn set_rotation(&mut self, degrees: f64, offset_degrees: f64) {
        self.rotation = degrees;
        self.rotation_offset = offset_degrees;
    }

    pub fn global_force(&self) -> f64 {
        self.global_force
    }

    /// Multiplies every frame's time step.
    pub fn set_global_force(&mut self, force: f64) {
        self.global_force = force;
    }

    pub fn max_particles(&self) -> usize {
        self.max_particles
    }

    /// Live particles processed per frame. Spawning is not limited.
    pub fn set_max_particles(&mut self, max: usize) {
        self.max_particles = max;
    }

    pub fn randomness(&self) -> Randomness {
        self.randomness
    }

    pub fn set_randomness(&mut self, randomness: Randomness) {
        self.randomness = randomness;
    }

    // ========== Render flags ==========

    pub fn reverse_render_order(&self) -> bool {
        self.reverse_render_order
    }

    /// Draws newest particles first.
    pub fn set_reverse_render_order(&mut self, reverse: bool) {
        self.reverse_render_order = reverse;
    }

    pub fn pre_render(&self) -> bool {
        self.pre_render
    }

    /// Calls the renderer's pre pass before particles are drawn.
    pub fn set_pre_render(&mut self, enabled: bool) {
        self.pre_render = enabled;
    }

    pub fn post_render(&self) -> bool {
        self.post_render
    }

    /// Calls the renderer's post pass after particles are drawn.
    pub fn set_post_render(&mut self, enabled: bool) {
        self.post_render = enabled;
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Draw every field's debug shape after each frame. Needs a renderer
    /// that exposes a draw target.
    pub fn set_debug(&mut self, enabled: bool) -> Result<()> {
        if enabled && self.renderer.as_mut().and_then(|r| r.draw_target()).is_none() {
            return Err(ConfigError::MissingRenderer);
        }
        self.debug = enabled;
        Ok(())
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new(EmitterConfig::default())
    }
}
