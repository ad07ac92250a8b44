//! Renderer interface and the two built-in CPU renderers.
//!
//! Emitters hand every visible particle to a [`Renderer`]. The engine never
//! paints pixels itself; backends decide what a particle looks like.
//!
//! | Renderer | Output |
//! |----------|--------|
//! | [`PreviewRenderer`] | Square dots stroked into an `RgbaImage`, optionally clipped to a polygon |
//! | [`RecordingRenderer`] | Per-frame [`ParticleInstance`] snapshots behind a shared [`RenderLog`] handle |
//!
//! ```ignore
//! let renderer = RecordingRenderer::new();
//! let log = renderer.log();
//! emitter.set_renderer(Box::new(renderer))?;
//! scene.render(16.7);
//! println!("{} particles drawn", log.borrow().last_frame().len());
//! ```

use crate::draw::{DebugDraw, DebugPath};
use crate::error::{ConfigError, Result};
use crate::grid::draw_line;
use crate::particle::{Particle, ParticleInstance};
use crate::surface::SurfaceSize;
use crate::vector::Vector;
use image::{Rgba, RgbaImage};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

/// Per-frame counters passed to [`Renderer::pre_render`] and [`Renderer::post_render`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Particles processed in the frame (for `pre_render`: the previous frame).
    pub count: usize,
    /// Particles spawned by the emitter so far.
    pub total: u64,
}

/// Consumer of particle state.
pub trait Renderer {
    /// Prepare for a surface of `size`. Called when the renderer is attached.
    fn init(&mut self, size: SurfaceSize) -> Result<()>;

    /// Called once per frame before particles are updated, if the emitter enables it.
    fn pre_render(&mut self, _stats: &FrameStats) {}

    /// Called once per visible particle.
    fn render_particle(&mut self, particle: &Particle);

    /// Called once per frame after particles are updated, if the emitter enables it.
    fn post_render(&mut self, _stats: &FrameStats) {}

    /// Debug drawing target, if this renderer has one.
    fn draw_target(&mut self) -> Option<&mut dyn DebugDraw> {
        None
    }
}

/// Square-dot CPU renderer into an RGBA image.
///
/// Also a [`DebugDraw`] target: debug strokes land in the same image.
pub struct PreviewRenderer {
    image: RgbaImage,
    color: Rgba<u8>,
    background: Rgba<u8>,
    clip: Option<Vec<Vector>>,
    pen: Vector,
}

impl PreviewRenderer {
    pub fn new() -> Self {
        Self {
            image: RgbaImage::new(1, 1),
            color: Rgba([255, 255, 255, 255]),
            background: Rgba([0, 0, 0, 0]),
            clip: None,
            pen: Vector::ZERO,
        }
    }

    /// Set the dot and stroke color.
    pub fn with_color(mut self, color: Rgba<u8>) -> Self {
        self.color = color;
        self
    }

    /// Set the color the image is cleared to on `pre_render`.
    pub fn with_background(mut self, background: Rgba<u8>) -> Self {
        self.background = background;
        self
    }

    /// Restrict drawing to the inside of a polygon with at least three points.
    pub fn set_clip(&mut self, points: Vec<Vector>) -> Result<()> {
        if points.len() < 3 {
            return Err(ConfigError::InvalidClipPolygon { points: points.len() });
        }
        self.clip = Some(points);
        Ok(())
    }

    /// Remove the clip polygon.
    pub fn clear_clip(&mut self) {
        self.clip = None;
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Write the current image as PNG.
    pub fn save(&self, path: impl AsRef<Path>) -> image::ImageResult<()> {
        self.image.save(path)
    }

    fn clipped(&self, x: f64, y: f64) -> bool {
        match &self.clip {
            Some(poly) => !point_in_polygon(poly, x, y),
            None => false,
        }
    }

    fn plot(&mut self, x: i64, y: i64, alpha: f64) {
        if x < 0 || y < 0 || x >= self.image.width() as i64 || y >= self.image.height() as i64 {
            return;
        }
        if self.clipped(x as f64 + 0.5, y as f64 + 0.5) {
            return;
        }
        let a = (self.color[3] as f64 * alpha.clamp(0.0, 1.0)).round() as u8;
        let px = self.image.get_pixel_mut(x as u32, y as u32);
        let blend = |dst: u8, src: u8| -> u8 {
            let f = a as f64 / 255.0;
            (dst as f64 * (1.0 - f) + src as f64 * f).round() as u8
        };
        *px = Rgba([
            blend(px[0], self.color[0]),
            blend(px[1], self.color[1]),
            blend(px[2], self.color[2]),
            px[3].max(a),
        ]);
    }
}

impl Default for PreviewRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PreviewRenderer {
    fn init(&mut self, size: SurfaceSize) -> Result<()> {
        if size.is_empty() {
            return Err(ConfigError::InvalidParameter(format!(
                "surface {}x{} has no area",
                size.width, size.height
            )));
        }
        self.image = RgbaImage::from_pixel(size.width.ceil() as u32, size.height.ceil() as u32, self.background);
        Ok(())
    }

    fn pre_render(&mut self, _stats: &FrameStats) {
        let bg = self.background;
        for px in self.image.pixels_mut() {
            *px = bg;
        }
    }

    fn render_particle(&mut self, p: &Particle) {
        let x0 = (p.position.x - p.radius).floor() as i64;
        let y0 = (p.position.y - p.radius).floor() as i64;
        let side = p.size.ceil().max(1.0) as i64;
        for y in y0..y0 + side {
            for x in x0..x0 + side {
                self.plot(x, y, p.opacity);
            }
        }
    }

    fn draw_target(&mut self) -> Option<&mut dyn DebugDraw> {
        Some(self as &mut dyn DebugDraw)
    }
}

impl DebugDraw for PreviewRenderer {
    fn move_to(&mut self, x: f64, y: f64) {
        self.pen = Vector::new(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        let to = Vector::new(x, y);
        draw_line(&mut self.image, self.pen, to, self.color);
        self.pen = to;
    }

    fn circle(&mut self, x: f64, y: f64, radius: f64) {
        let steps = (radius * std::f64::consts::TAU).ceil().clamp(8.0, 720.0) as usize;
        let at = |i: usize| {
            let a = i as f64 / steps as f64 * std::f64::consts::TAU;
            Vector::new(x + radius * a.cos(), y + radius * a.sin())
        };
        let start = at(0);
        self.move_to(start.x, start.y);
        for i in 1..=steps {
            let p = at(i);
            self.line_to(p.x, p.y);
        }
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.move_to(x, y);
        self.line_to(x + width, y);
        self.line_to(x + width, y + height);
        self.line_to(x, y + height);
        self.line_to(x, y);
    }

    fn reset(&mut self) {
        self.pen = Vector::ZERO;
    }
}

/// Even-odd point-in-polygon test.
fn point_in_polygon(poly: &[Vector], x: f64, y: f64) -> bool {
    let mut inside = false;
    let mut j = poly.len() - 1;
    for i in 0..poly.len() {
        let (pi, pj) = (poly[i], poly[j]);
        if (pi.y > y) != (pj.y > y) && x < (pj.x - pi.x) * (y - pi.y) / (pj.y - pi.y) + pi.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Everything a [`RecordingRenderer`] has seen.
#[derive(Clone, Debug, Default)]
pub struct RenderLog {
    /// Surface size from the last `init`.
    pub surface: Option<SurfaceSize>,
    /// Completed frames, split on `post_render`.
    pub frames: Vec<Vec<ParticleInstance>>,
    /// Particles rendered since the last `post_render`.
    pub current: Vec<ParticleInstance>,
    /// Stats from every `pre_render` call.
    pub pre_stats: Vec<FrameStats>,
    /// Stats from every `post_render` call.
    pub post_stats: Vec<FrameStats>,
    /// Debug drawing since the last reset.
    pub debug: DebugPath,
}

impl RenderLog {
    /// Particles of the last completed frame, or the in-progress one if none completed.
    pub fn last_frame(&self) -> &[ParticleInstance] {
        self.frames.last().map(Vec::as_slice).unwrap_or(&self.current)
    }

    /// Total particles rendered across all frames.
    pub fn total_rendered(&self) -> usize {
        self.frames.iter().map(Vec::len).sum::<usize>() + self.current.len()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
        self.current.clear();
        self.pre_stats.clear();
        self.post_stats.clear();
        self.debug.reset();
    }
}

/// Renderer that records particle snapshots instead of drawing them.
///
/// The log lives behind an `Rc<RefCell<_>>` so callers keep a handle after
/// the renderer is moved into an emitter.
#[derive(Default)]
pub struct RecordingRenderer {
    log: Rc<RefCell<RenderLog>>,
    draws: bool,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also record debug drawing into [`RenderLog::debug`].
    pub fn with_draw_target(mut self) -> Self {
        self.draws = true;
        self
    }

    /// Shared handle to the recorded log.
    pub fn log(&self) -> Rc<RefCell<RenderLog>> {
        Rc::clone(&self.log)
    }
}

impl Renderer for RecordingRenderer {
    fn init(&mut self, size: SurfaceSize) -> Result<()> {
        self.log.borrow_mut().surface = Some(size);
        Ok(())
    }

    fn pre_render(&mut self, stats: &FrameStats) {
        self.log.borrow_mut().pre_stats.push(*stats);
    }

    fn render_particle(&mut self, particle: &Particle) {
        self.log.borrow_mut().current.push(particle.to_instance());
    }

    fn post_render(&mut self, stats: &FrameStats) {
        let mut log = self.log.borrow_mut();
        let frame = std::mem::take(&mut log.current);
        log.frames.push(frame);
        log.post_stats.push(*stats);
    }

    fn draw_target(&mut self) -> Option<&mut dyn DebugDraw> {
        if self.draws {
            Some(self as &mut dyn DebugDraw)
        } else {
            None
        }
    }
}

impl DebugDraw for RecordingRenderer {
    fn move_to(&mut self, x: f64, y: f64) {
        self.log.borrow_mut().debug.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.log.borrow_mut().debug.line_to(x, y);
    }

    fn circle(&mut self, x: f64, y: f64, radius: f64) {
        self.log.borrow_mut().debug.circle(x, y, radius);
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.log.borrow_mut().debug.rect(x, y, width, height);
    }

    fn reset(&mut self) {
        self.log.borrow_mut().debug.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(x: f64, y: f64, size: f64) -> Particle {
        let mut p = Particle::timed(0.0, 1000.0);
        p.position = Vector::new(x, y);
        p.base_size = size;
        p.set_size(1.0);
        p
    }

    #[test]
    fn test_clip_needs_three_points() {
        let mut r = PreviewRenderer::new();
        let err = r.set_clip(vec![Vector::ZERO, Vector::ONE]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidClipPolygon { points: 2 }));
        assert!(r
            .set_clip(vec![Vector::ZERO, Vector::new(10.0, 0.0), Vector::new(0.0, 10.0)])
            .is_ok());
    }

    #[test]
    fn test_preview_draws_and_clips() {
        let mut r = PreviewRenderer::new().with_background(Rgba([0, 0, 0, 255]));
        r.init(SurfaceSize::new(20.0, 20.0)).unwrap();
        r.set_clip(vec![
            Vector::new(0.0, 0.0),
            Vector::new(10.0, 0.0),
            Vector::new(10.0, 20.0),
            Vector::new(0.0, 20.0),
        ])
        .unwrap();

        r.pre_render(&FrameStats::default());
        r.render_particle(&dot(5.0, 5.0, 2.0));
        r.render_particle(&dot(15.0, 5.0, 2.0));

        assert_eq!(r.image().get_pixel(5, 5), &Rgba([255, 255, 255, 255]));
        assert_eq!(r.image().get_pixel(15, 5), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_preview_rejects_empty_surface() {
        let mut r = PreviewRenderer::new();
        assert!(r.init(SurfaceSize::new(0.0, 10.0)).is_err());
    }

    #[test]
    fn test_preview_debug_strokes() {
        let mut r = PreviewRenderer::new();
        r.init(SurfaceSize::new(20.0, 20.0)).unwrap();
        let target = r.draw_target().unwrap();
        target.move_to(2.0, 10.0);
        target.line_to(18.0, 10.0);
        assert_eq!(r.image().get_pixel(10, 10)[3], 255);
    }

    #[test]
    fn test_recording_splits_frames_on_post_render() {
        let r = RecordingRenderer::new();
        let log = r.log();
        let mut boxed: Box<dyn Renderer> = Box::new(r);
        boxed.init(SurfaceSize::new(10.0, 10.0)).unwrap();

        boxed.render_particle(&dot(1.0, 1.0, 1.0));
        boxed.render_particle(&dot(2.0, 2.0, 1.0));
        boxed.post_render(&FrameStats { count: 2, total: 2 });
        boxed.render_particle(&dot(3.0, 3.0, 1.0));

        let log = log.borrow();
        assert_eq!(log.surface, Some(SurfaceSize::new(10.0, 10.0)));
        assert_eq!(log.frames.len(), 1);
        assert_eq!(log.last_frame().len(), 2);
        assert_eq!(log.total_rendered(), 3);
        assert_eq!(log.post_stats[0].count, 2);
    }

    #[test]
    fn test_recording_draw_target_is_opt_in() {
        let mut plain = RecordingRenderer::new();
        assert!(plain.draw_target().is_none());
        let mut with = RecordingRenderer::new().with_draw_target();
        let log = with.log();
        let target = with.draw_target().unwrap();
        target.circle(1.0, 2.0, 3.0);
        assert_eq!(log.borrow().debug.len(), 1);
    }
}
