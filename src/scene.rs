//! Scenes: a set of emitters sharing one surface and one frame clock.
//!
//! Each [`Scene::render`] computes a time step, spawns the due number of
//! particles per emitter and runs the emitter's update and compaction.
//!
//! # Time step
//!
//! | Mode | `ts` |
//! |------|------|
//! | time-bound (default) | elapsed ms / (1000 / 60) |
//! | frame-bound | 60 / fps |
//!
//! The first frame of a time-bound scene has no previous timestamp and
//! uses `ts = 1`.
//!
//! ```ignore
//! let mut scene = Scene::new(SceneConfig::default().with_size(800.0, 600.0));
//! scene.add_emitter(Emitter::new(EmitterConfig::default().with_position(400.0, 300.0)))?;
//! loop {
//!     scene.tick();
//! }
//! ```

use crate::emitter::Emitter;
use crate::error::Result;
use crate::surface::SurfaceSize;
use crate::time::FrameClock;
use serde::{Deserialize, Serialize};

/// Reference frame length (ms) that `ts = 1` corresponds to.
pub const FRAME_TIME: f64 = 1000.0 / 60.0;

/// Scene options.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SceneConfig {
    pub width: f64,
    pub height: f64,
    /// Use a constant time step of `60 / fps` instead of wall-clock time.
    pub frame_bound: bool,
    #[serde(rename = "FPS", alias = "fps")]
    pub fps: f64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width: 512.0,
            height: 256.0,
            frame_bound: false,
            fps: 60.0,
        }
    }
}

impl SceneConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_frame_bound(mut self, frame_bound: bool) -> Self {
        self.frame_bound = frame_bound;
        self
    }

    pub fn with_fps(mut self, fps: f64) -> Self {
        self.fps = fps;
        self
    }

    pub fn surface(&self) -> SurfaceSize {
        SurfaceSize::new(self.width, self.height)
    }
}

/// Owns emitters and drives them frame by frame.
pub struct Scene {
    config: SceneConfig,
    emitters: Vec<Emitter>,
    last_time: Option<f64>,
    clock: FrameClock,
}

impl Scene {
    pub fn new(config: SceneConfig) -> Self {
        let fps = if config.fps > 0.0 { config.fps } else { 60.0 };
        Self {
            config: SceneConfig { fps, ..config },
            emitters: Vec::new(),
            last_time: None,
            clock: FrameClock::new(),
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn surface(&self) -> SurfaceSize {
        self.config.surface()
    }

    /// Bind `emitter` to this scene's surface and take ownership.
    /// Returns its index.
    pub fn add_emitter(&mut self, mut emitter: Emitter) -> Result<usize> {
        emitter.init(self.config.surface())?;
        self.emitters.push(emitter);
        log::debug!("scene now has {} emitters", self.emitters.len());
        Ok(self.emitters.len() - 1)
    }

    pub fn emitter(&self, index: usize) -> Option<&Emitter> {
        self.emitters.get(index)
    }

    pub fn emitter_mut(&mut self, index: usize) -> Option<&mut Emitter> {
        self.emitters.get_mut(index)
    }

    pub fn emitters(&self) -> &[Emitter] {
        &self.emitters
    }

    pub fn emitters_mut(&mut self) -> &mut [Emitter] {
        &mut self.emitters
    }

    pub fn remove_emitter(&mut self, index: usize) -> Option<Emitter> {
        (index < self.emitters.len()).then(|| self.emitters.remove(index))
    }

    /// Time step for a frame at `now`, updating the last-frame timestamp.
    fn time_step(&mut self, now: f64) -> f64 {
        let ts = if self.config.frame_bound {
            60.0 / self.config.fps
        } else {
            match self.last_time {
                Some(last) => (now - last) / FRAME_TIME,
                None => 1.0,
            }
        };
        self.last_time = Some(now);
        ts
    }

    /// Render one frame at timestamp `now` (ms).
    pub fn render(&mut self, now: f64) {
        let ts = self.time_step(now);
        let fps = self.config.fps;

        for emitter in self.emitters.iter_mut().filter(|e| !e.is_paused()) {
            let mut num = emitter.birth_rate() * ts / fps;
            if num != 0.0 {
                num += emitter.remainder;
                emitter.remainder = num.fract();
                let count = num.trunc();
                if count > 0.0 {
                    emitter.generate_particles(now, count as usize);
                }
            }
            emitter.render_particles(now, ts);
            emitter.cleanup_particles(now);
        }
    }

    /// Update every emitter at `now` without spawning.
    pub fn render_no_generation(&mut self, now: f64) {
        let ts = self.time_step(now);
        for emitter in &mut self.emitters {
            emitter.render_particles(now, ts);
            emitter.cleanup_particles(now);
        }
    }

    /// Render a frame at the internal clock's current time. Returns the timestamp used.
    pub fn tick(&mut self) -> f64 {
        let now = self.clock.tick();
        self.render(now);
        now
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn pause(&mut self, now: f64) {
        for emitter in &mut self.emitters {
            emitter.pause(now);
        }
    }

    pub fn play(&mut self, now: f64) {
        for emitter in &mut self.emitters {
            emitter.play(now);
        }
    }

    pub fn stop(&mut self, now: f64) {
        for emitter in &mut self.emitters {
            emitter.stop(now);
        }
    }

    /// Scale the surface and every emitter.
    pub fn scale(&mut self, f: f64) {
        self.config.width *= f;
        self.config.height *= f;
        for emitter in &mut self.emitters {
            emitter.scale(f);
        }
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        for emitter in &mut self.emitters {
            emitter.translate(dx, dy);
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(SceneConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::EmitterConfig;

    fn frame_bound(fps: f64) -> Scene {
        Scene::new(SceneConfig::default().with_frame_bound(true).with_fps(fps))
    }

    #[test]
    fn test_config_defaults_and_json() {
        let c = SceneConfig::default();
        assert_eq!((c.width, c.height, c.frame_bound, c.fps), (512.0, 256.0, false, 60.0));

        let c = SceneConfig::from_json(r#"{"width": 100, "frameBound": true, "FPS": 30}"#).unwrap();
        assert_eq!(c.width, 100.0);
        assert_eq!(c.height, 256.0);
        assert!(c.frame_bound);
        assert_eq!(c.fps, 30.0);
    }

    #[test]
    fn test_time_step_modes() {
        let mut s = frame_bound(30.0);
        assert_eq!(s.time_step(0.0), 2.0);
        assert_eq!(s.time_step(1000.0), 2.0);

        let mut s = Scene::default();
        assert_eq!(s.time_step(100.0), 1.0);
        assert!((s.time_step(100.0 + 2.0 * FRAME_TIME) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_fractional_birth_rate_accumulates() {
        let mut s = frame_bound(60.0);
        let i = s
            .add_emitter(Emitter::new(EmitterConfig::default().with_birth_rate(30.0).with_seed(1)))
            .unwrap();

        s.render(0.0);
        assert_eq!(s.emitter(i).unwrap().total_spawned(), 0);
        assert_eq!(s.emitter(i).unwrap().remainder(), 0.5);
        s.render(16.0);
        assert_eq!(s.emitter(i).unwrap().total_spawned(), 1);
        assert_eq!(s.emitter(i).unwrap().remainder(), 0.0);
    }

    #[test]
    fn test_paused_emitters_are_skipped() {
        let mut s = frame_bound(60.0);
        s.add_emitter(Emitter::new(EmitterConfig::default().with_birth_rate(600.0).with_seed(2)))
            .unwrap();
        s.pause(0.0);
        s.render(0.0);
        assert_eq!(s.emitters()[0].total_spawned(), 0);
        s.play(10.0);
        s.render(20.0);
        assert_eq!(s.emitters()[0].total_spawned(), 10);
    }

    #[test]
    fn test_render_no_generation_never_spawns() {
        let mut s = frame_bound(60.0);
        s.add_emitter(Emitter::new(EmitterConfig::default().with_seed(3))).unwrap();
        s.render_no_generation(0.0);
        s.render_no_generation(16.0);
        assert_eq!(s.emitters()[0].total_spawned(), 0);
    }

    #[test]
    fn test_add_emitter_binds_surface() {
        let mut s = Scene::new(SceneConfig::default().with_size(320.0, 240.0));
        let i = s.add_emitter(Emitter::default()).unwrap();
        assert_eq!(s.emitter(i).unwrap().surface(), Some(SurfaceSize::new(320.0, 240.0)));

        let mut empty = Scene::new(SceneConfig::default().with_size(0.0, 0.0));
        assert!(empty.add_emitter(Emitter::default()).is_err());
    }

    #[test]
    fn test_stop_clears_everything() {
        let mut s = frame_bound(60.0);
        s.add_emitter(Emitter::new(EmitterConfig::default().with_birth_rate(600.0).with_seed(4)))
            .unwrap();
        s.render(0.0);
        assert!(!s.emitters()[0].particles().is_empty());
        s.stop(16.0);
        assert!(s.emitters()[0].particles().is_empty());
        assert!(s.emitters()[0].is_paused());
    }

    #[test]
    fn test_scale_updates_surface() {
        let mut s = Scene::default();
        s.add_emitter(Emitter::default()).unwrap();
        s.scale(2.0);
        assert_eq!(s.surface(), SurfaceSize::new(1024.0, 512.0));
        assert_eq!(s.emitters()[0].surface(), Some(SurfaceSize::new(1024.0, 512.0)));
    }

    #[test]
    fn test_tick_uses_clock() {
        let mut s = Scene::default();
        let a = s.tick();
        let b = s.tick();
        assert!(b >= a);
        assert_eq!(s.clock().frame(), 2);
    }
}
