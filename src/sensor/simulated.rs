//! Deterministic synthetic sensor.
//!
//! Produces a warm blob drifting on a circle over a gently graded room
//! background, plus a little fixed-seed noise. Identical construction
//! yields identical frame sequences, which keeps tests and demos
//! reproducible without hardware attached.

use super::{RefreshRate, SensorError, ThermalSensor};
use crate::frame::{Frame, FRAME_COLS, FRAME_ROWS};
use std::thread;
use std::time::Instant;

/// Background temperature at the top of the scene.
const ROOM_C: f32 = 22.0;
/// Peak temperature of the warm blob.
const BLOB_C: f32 = 34.0;
/// Blob radius in pixels.
const BLOB_RADIUS: f32 = 5.0;

/// Synthetic MLX90640 stand-in.
#[derive(Debug, Clone)]
pub struct SimulatedSensor {
    rate: RefreshRate,
    frame_index: u64,
    attempts: u64,
    rng_state: u64,
    pending_transient: u32,
    fatal: Option<String>,
    pace: bool,
    last_frame: Option<Instant>,
}

impl Default for SimulatedSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedSensor {
    /// A sensor that returns frames immediately.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rate: RefreshRate::default(),
            frame_index: 0,
            attempts: 0,
            rng_state: 0x2545_F491_4F6C_DD1D,
            pending_transient: 0,
            fatal: None,
            pace: false,
            last_frame: None,
        }
    }

    /// Block each read until one refresh period has elapsed, like the
    /// real sensor does.
    #[must_use]
    pub fn paced(mut self) -> Self {
        self.pace = true;
        self
    }

    /// Fail the next `count` reads with a transient error.
    #[must_use]
    pub fn with_transient_failures(mut self, count: u32) -> Self {
        self.pending_transient = count;
        self
    }

    /// Fail every read with a fatal error.
    #[must_use]
    pub fn with_fatal_failure(mut self, reason: impl Into<String>) -> Self {
        self.fatal = Some(reason.into());
        self
    }

    /// Number of `read_frame` calls so far, including failed ones.
    #[must_use]
    pub const fn read_attempts(&self) -> u64 {
        self.attempts
    }

    /// Number of frames delivered so far.
    #[must_use]
    pub const fn frames_delivered(&self) -> u64 {
        self.frame_index
    }

    // xorshift64*
    fn next_noise(&mut self) -> f32 {
        self.rng_state ^= self.rng_state >> 12;
        self.rng_state ^= self.rng_state << 25;
        self.rng_state ^= self.rng_state >> 27;
        let bits = self.rng_state.wrapping_mul(0x2545_F491_4F6C_DD1D) >> 40;
        (bits as f32 / (1u64 << 24) as f32) - 0.5
    }

    fn wait_for_next_frame(&mut self) {
        if let Some(last) = self.last_frame {
            let period = self.rate.period();
            let elapsed = last.elapsed();
            if elapsed < period {
                thread::sleep(period - elapsed);
            }
        }
        self.last_frame = Some(Instant::now());
    }

    fn render_scene(&mut self, frame: &mut Frame) {
        let phase = self.frame_index as f32 * 0.15;
        let cx = FRAME_COLS as f32 / 2.0 + 8.0 * phase.cos();
        let cy = FRAME_ROWS as f32 / 2.0 + 5.0 * phase.sin();

        for row in 0..FRAME_ROWS {
            for col in 0..FRAME_COLS {
                let dx = col as f32 - cx;
                let dy = row as f32 - cy;
                let falloff = (-(dx * dx + dy * dy) / (2.0 * BLOB_RADIUS * BLOB_RADIUS)).exp();
                let background = ROOM_C + row as f32 * 0.05;
                let noise = 0.2 * self.next_noise();
                frame.as_mut_slice()[row * FRAME_COLS + col] =
                    background + (BLOB_C - background) * falloff + noise;
            }
        }
    }
}

impl ThermalSensor for SimulatedSensor {
    fn name(&self) -> &str {
        "simulated"
    }

    fn set_refresh_rate(&mut self, rate: RefreshRate) -> Result<(), SensorError> {
        self.rate = rate;
        Ok(())
    }

    fn refresh_rate(&mut self) -> Result<RefreshRate, SensorError> {
        Ok(self.rate)
    }

    fn read_frame(&mut self, frame: &mut Frame) -> Result<(), SensorError> {
        self.attempts += 1;

        if let Some(reason) = &self.fatal {
            return Err(SensorError::Fatal(reason.clone()));
        }
        if self.pending_transient > 0 {
            self.pending_transient -= 1;
            return Err(SensorError::Transient("frame failed validation".to_string()));
        }

        if self.pace {
            self.wait_for_next_frame();
        }
        self.render_scene(frame);
        self.frame_index += 1;
        Ok(())
    }
}
