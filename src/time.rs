//! Frame clock for driving a scene from wall-clock time.
//!
//! Emitters and scenes work on plain millisecond timestamps (`f64`), so any
//! driver can feed them. [`FrameClock`] is the default driver: a monotonic
//! millisecond clock with a frame counter and a periodically refreshed FPS
//! estimate.
//!
//! ```ignore
//! let mut clock = FrameClock::new();
//! loop {
//!     let now = clock.tick();
//!     scene.render(now);
//!     println!("frame {} at {:.1} fps", clock.frame(), clock.fps());
//! }
//! ```

use std::time::{Duration, Instant};

/// Monotonic millisecond clock with frame statistics.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    /// Milliseconds at the last tick.
    last_ms: f64,
    frame_count: u64,
    fps: f64,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_ms: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Milliseconds since the clock was created.
    #[inline]
    pub fn now_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Start a new frame and return its timestamp in milliseconds.
    pub fn tick(&mut self) -> f64 {
        let now = Instant::now();
        self.last_ms = now.duration_since(self.start).as_secs_f64() * 1000.0;
        self.frame_count += 1;

        let since = now.duration_since(self.fps_update_time);
        if since >= self.fps_update_interval {
            let frames = self.frame_count - self.fps_frame_count;
            self.fps = frames as f64 / since.as_secs_f64();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        self.last_ms
    }

    /// Timestamp of the last [`tick`](FrameClock::tick).
    #[inline]
    pub fn last_ms(&self) -> f64 {
        self.last_ms
    }

    /// Frames ticked so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Measured frames per second, refreshed twice a second.
    #[inline]
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// How often the FPS estimate is refreshed.
    pub fn set_fps_interval(&mut self, interval: Duration) {
        self.fps_update_interval = interval;
    }

    pub fn reset(&mut self) {
        *self = Self {
            fps_update_interval: self.fps_update_interval,
            ..Self::new()
        };
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
