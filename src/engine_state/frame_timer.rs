//! Frames-per-second counter.

use log::debug;
use web_time::{Duration, Instant};

const REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// Counts frames and reports the rate once per second.
#[derive(Debug)]
pub struct FrameTimer {
    window_start: Instant,
    frames: u32,
}

impl FrameTimer {
    /// Starts counting from `now`.
    pub fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            frames: 0,
        }
    }

    /// Counts a frame and logs the frame rate when a second has passed.
    pub fn tick(&mut self) {
        if let Some(fps) = self.tick_at(Instant::now()) {
            debug!("{fps:.1} fps");
        }
    }

    /// Counts a frame finished at `now`.
    ///
    /// # Returns
    /// The average frame rate of the window that just closed, once at least a second has
    /// passed since the window opened
    pub fn tick_at(&mut self, now: Instant) -> Option<f64> {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < REPORT_INTERVAL {
            return None;
        }

        let fps = f64::from(self.frames) / elapsed.as_secs_f64();
        self.window_start = now;
        self.frames = 0;
        Some(fps)
    }
}
