//! Loop-rate measurement for the live views.
//!
//! The uninterpolated view reports the sample rate averaged over the whole
//! run; the interpolated view reports the frame rate over the last few
//! loop iterations, since its cost varies with how often the colorbar is
//! redrawn.

use crate::ring_buffer::RingBuffer;
use std::time::Duration;

/// Iterations averaged by [`FrameRateMeter::windowed`] by default.
pub const DEFAULT_WINDOW: usize = 10;

#[derive(Debug, Clone)]
enum Window {
    Cumulative { total: Duration, count: u64 },
    Recent(RingBuffer<Duration>),
}

/// Averages loop durations into a rate in Hz.
#[derive(Debug, Clone)]
pub struct FrameRateMeter {
    window: Window,
}

impl FrameRateMeter {
    /// Rate over every iteration recorded so far.
    #[must_use]
    pub fn cumulative() -> Self {
        Self { window: Window::Cumulative { total: Duration::ZERO, count: 0 } }
    }

    /// Rate over the last `size` iterations.
    ///
    /// # Panics
    ///
    /// Panics if `size` is 0.
    #[must_use]
    pub fn windowed(size: usize) -> Self {
        Self { window: Window::Recent(RingBuffer::new(size)) }
    }

    /// Record the duration of one loop iteration.
    pub fn record(&mut self, elapsed: Duration) {
        match &mut self.window {
            Window::Cumulative { total, count } => {
                *total += elapsed;
                *count += 1;
            }
            Window::Recent(history) => history.push(elapsed),
        }
    }

    /// Iterations per second, or `None` before anything measurable was
    /// recorded.
    #[must_use]
    pub fn fps(&self) -> Option<f32> {
        let (total, count) = match &self.window {
            Window::Cumulative { total, count } => (*total, *count),
            Window::Recent(history) => (history.iter().sum::<Duration>(), history.len() as u64),
        };

        if count == 0 || total.is_zero() {
            return None;
        }
        Some((count as f64 / total.as_secs_f64()) as f32)
    }

    /// Caption shown in front of the rate.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self.window {
            Window::Cumulative { .. } => "Sample Rate",
            Window::Recent(_) => "Frame Rate",
        }
    }

    /// Status line such as `Frame Rate: 7.9fps`.
    #[must_use]
    pub fn status_line(&self) -> Option<String> {
        self.fps().map(|fps| format!("{}: {fps:2.1}fps", self.label()))
    }
}
