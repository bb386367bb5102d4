//! Variable-rate render loop.
//!
//! One frame per redraw request: update (camera damping and uniform upload),
//! then draw. There is no fixed timestep and no frame skipping; the loop only
//! measures how long frames take so the panel can report it.

use std::time::{Duration, Instant};

/// Whether the loop is still scheduling frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

pub struct RenderLoop {
    state: LoopState,
    start_time: Instant,
    previous_frame: Option<Instant>,
    frame_time: Duration,
    frame_count: u64,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    fn starting_at(start_time: Instant) -> Self {
        Self {
            state: LoopState::Running,
            start_time,
            previous_frame: None,
            frame_time: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Runs one frame: `update`, then `draw`.
    ///
    /// Returns the draw result, or `None` without calling either closure once
    /// the loop has stopped.
    pub fn frame<T>(&mut self, update: impl FnOnce(), draw: impl FnOnce() -> T) -> Option<T> {
        self.frame_at(Instant::now(), update, draw)
    }

    fn frame_at<T>(
        &mut self,
        now: Instant,
        update: impl FnOnce(),
        draw: impl FnOnce() -> T,
    ) -> Option<T> {
        if self.state == LoopState::Stopped {
            return None;
        }

        let since = self.previous_frame.unwrap_or(self.start_time);
        self.frame_time = now.saturating_duration_since(since);
        self.previous_frame = Some(now);

        update();
        let result = draw();
        self.frame_count += 1;
        Some(result)
    }

    /// Stops scheduling. Further calls to [`frame`](Self::frame) do nothing.
    pub fn stop(&mut self) {
        if self.state == LoopState::Running {
            tracing::info!("Render loop stopped after {} frames", self.frame_count);
        }
        self.state = LoopState::Stopped;
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Duration of the most recent frame in milliseconds.
    pub fn frame_time_ms(&self) -> f64 {
        self.frame_time.as_secs_f64() * 1000.0
    }

    /// Instantaneous frame rate derived from the last frame time.
    pub fn fps(&self) -> f64 {
        let ms = self.frame_time_ms();
        if ms > 0.0 { 1000.0 / ms } else { 0.0 }
    }

    pub fn uptime_seconds(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new()
    }
}
