//! # Flurry - 2D particle effects engine
//!
//! Real-time 2D particle simulation for visual effects composited onto a
//! drawing surface: emitters spawn particles, force fields push them
//! around, over-life curves fade and shrink them, and a scene drives it
//! all frame by frame.
//!
//! ## Quick Start
//!
//! ```ignore
//! use flurry::prelude::*;
//!
//! fn main() -> flurry::Result<()> {
//!     let mut scene = Scene::new(SceneConfig::default().with_size(512.0, 256.0));
//!
//!     let mut emitter = Emitter::new(
//!         EmitterConfig::default()
//!             .with_position(256.0, 240.0)
//!             .with_spread(40.0, 250.0)
//!             .with_birth_rate(300.0)
//!             .with_size(3.0),
//!     );
//!     emitter.add_field(shared(Gravity::new(0.0, 0.04)));
//!     emitter.add_field(shared(Vortex::new(256.0, 100.0).with_force(0.3)));
//!     emitter.set_over_life("opacity", OverLifeCurve::from_bezier(0.4, 0.0, 1.0, 1.0, 64).inverted())?;
//!     emitter.set_renderer(Box::new(PreviewRenderer::new()))?;
//!
//!     scene.add_emitter(emitter)?;
//!     loop {
//!         scene.tick();
//!     }
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Particles
//!
//! A [`Particle`] either ages with time (`life > 0`) or lives until it
//! leaves the surface (`life == 0`). Size, opacity, blur and rotation are
//! re-derived each frame from the particle's base values and the emitter's
//! [`OverLifeCurve`]s.
//!
//! ### Force fields
//!
//! Fields implement [`ForceField`] and run once per active particle per
//! frame, in the order they were added. They are attached as
//! [`SharedField`] so one field can drive several emitters.
//!
//! | Category | Fields |
//! |----------|--------|
//! | Constant | [`Gravity`], [`Wind`] |
//! | Damping / growth | [`Air`], [`Accelerator`] |
//! | Grid-backed | [`Vortex`], [`Nozzle`], [`Waves`], [`Turbulence`] |
//! | Attraction | [`Target`], [`Path`] |
//! | Lines | [`Collector`], [`Reflector`] |
//!
//! ### Rendering
//!
//! Emitters hand visible particles to a [`Renderer`]. [`PreviewRenderer`]
//! draws into an [`image::RgbaImage`]; [`RecordingRenderer`] keeps
//! snapshots for tests and headless drivers.
//!
//! ## Threading
//!
//! Everything runs on one thread. Shared fields are `Rc<RefCell<_>>`, so
//! emitters and scenes are neither `Send` nor `Sync`.

pub mod curve;
pub mod draw;
pub mod emitter;
pub mod error;
pub mod grid;
pub mod hitmap;
pub mod noise;
pub mod particle;
pub mod physics;
pub mod renderer;
pub mod scene;
pub mod spawn;
pub mod surface;
pub mod time;
pub mod vector;

pub use bytemuck;
pub use glam;
pub use image;
pub use curve::{ColorRamp, Gradient, OverLifeCurve, OverLifeTarget};
pub use draw::{DebugDraw, DebugPath, DrawCommand};
pub use emitter::{Emitter, EmitterConfig, Randomness};
pub use error::{ConfigError, Result};
pub use grid::{MapObject, VectorGrid};
pub use hitmap::{HitTest, LineHitMap};
pub use crate::noise::{NoiseField, SimplexNoise};
pub use particle::{LifeMode, Particle, ParticleInstance};
pub use physics::{
    shared, Accelerator, Air, Collector, Direction, ForceField, Gravity, Nozzle, Path, Reflector, SharedField,
    Target, Turbulence, Vortex, Waves, Wind,
};
pub use renderer::{FrameStats, PreviewRenderer, RecordingRenderer, Renderer};
pub use scene::{Scene, SceneConfig};
pub use spawn::{SpawnShape, SpawnType};
pub use surface::SurfaceSize;
pub use time::FrameClock;
pub use vector::{Vector, VectorExt};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use flurry::prelude::*;
/// ```
pub mod prelude {
    pub use crate::curve::{Gradient, OverLifeCurve};
    pub use crate::emitter::{Emitter, EmitterConfig, Randomness};
    pub use crate::error::{ConfigError, Result};
    pub use crate::particle::Particle;
    pub use crate::physics::{
        shared, Accelerator, Air, Collector, Direction, ForceField, Gravity, Nozzle, Path, Reflector,
        SharedField, Target, Turbulence, Vortex, Waves, Wind,
    };
    pub use crate::renderer::{PreviewRenderer, RecordingRenderer, Renderer};
    pub use crate::scene::{Scene, SceneConfig};
    pub use crate::spawn::{SpawnShape, SpawnType};
    pub use crate::surface::SurfaceSize;
    pub use crate::vector::{Vector, VectorExt};
}
