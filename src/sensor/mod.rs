//! Thermal sensor abstraction and frame acquisition.
//!
//! The driver itself is an external crate; this module only defines the
//! seam ([`ThermalSensor`]) the run modes talk to, and the retry policy
//! applied around frame reads.
//!
//! # Backends
//!
//! - [`SimulatedSensor`]: deterministic synthetic scene, always available
//! - `Mlx90640Sensor`: real hardware over Linux i2c-dev (feature `mlx90640`)

use crate::error::{Error, Result};
use crate::frame::Frame;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::thread;
use std::time::Duration;
use thiserror::Error;

mod simulated;
pub use simulated::SimulatedSensor;

#[cfg(feature = "mlx90640")]
mod mlx90640;
#[cfg(feature = "mlx90640")]
pub use mlx90640::Mlx90640Sensor;

/// Sensor-side sampling frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RefreshRate {
    /// 0.5 Hz.
    Half,
    /// 1 Hz.
    One,
    /// 2 Hz (factory default).
    #[default]
    Two,
    /// 4 Hz.
    Four,
    /// 8 Hz.
    Eight,
    /// 16 Hz.
    Sixteen,
    /// 32 Hz.
    ThirtyTwo,
    /// 64 Hz.
    SixtyFour,
}

impl RefreshRate {
    /// Frames per second.
    #[must_use]
    pub const fn hz(self) -> f32 {
        match self {
            Self::Half => 0.5,
            Self::One => 1.0,
            Self::Two => 2.0,
            Self::Four => 4.0,
            Self::Eight => 8.0,
            Self::Sixteen => 16.0,
            Self::ThirtyTwo => 32.0,
            Self::SixtyFour => 64.0,
        }
    }

    /// Time between two frames.
    #[must_use]
    pub fn period(self) -> Duration {
        Duration::from_secs_f32(1.0 / self.hz())
    }
}

impl fmt::Display for RefreshRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Hz", self.hz())
    }
}

/// Failure reported by a sensor backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SensorError {
    /// The read failed but the next one may succeed (bad frame, bus hiccup,
    /// data not ready yet).
    #[error("transient read error: {0}")]
    Transient(String),

    /// The sensor cannot be used any more.
    #[error("{0}")]
    Fatal(String),
}

impl From<SensorError> for Error {
    fn from(err: SensorError) -> Self {
        match err {
            SensorError::Transient(msg) | SensorError::Fatal(msg) => Error::Sensor(msg),
        }
    }
}

/// A thermal-imaging sensor that delivers full [`Frame`]s.
pub trait ThermalSensor {
    /// Human-readable backend name for log messages.
    fn name(&self) -> &str;

    /// Change the sampling frequency.
    fn set_refresh_rate(&mut self, rate: RefreshRate) -> std::result::Result<(), SensorError>;

    /// Current sampling frequency.
    fn refresh_rate(&mut self) -> std::result::Result<RefreshRate, SensorError>;

    /// Block until a full frame is available and write it into `frame`.
    fn read_frame(&mut self, frame: &mut Frame) -> std::result::Result<(), SensorError>;
}

/// How often a transient read error is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts before giving up; 0 retries forever.
    pub max_attempts: u32,
    /// Pause between attempts.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 50, backoff: Duration::from_millis(5) }
    }
}

impl RetryPolicy {
    /// Retry until a frame arrives, however long that takes.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self { max_attempts: 0, backoff: Duration::ZERO }
    }

    /// Read one frame, retrying transient errors within the budget.
    ///
    /// # Errors
    ///
    /// [`Error::SensorTimeout`] once the budget is spent, [`Error::Sensor`]
    /// immediately on a fatal error.
    pub fn acquire(&self, sensor: &mut dyn ThermalSensor, frame: &mut Frame) -> Result<()> {
        let mut attempts: u32 = 0;

        loop {
            attempts = attempts.saturating_add(1);

            match sensor.read_frame(frame) {
                Ok(()) => {
                    if attempts > 1 {
                        log::debug!("{}: frame acquired after {attempts} attempts", sensor.name());
                    }
                    return Ok(());
                }
                Err(SensorError::Transient(reason)) => {
                    log::debug!("{}: attempt {attempts} failed: {reason}", sensor.name());

                    if self.max_attempts != 0 && attempts >= self.max_attempts {
                        log::warn!(
                            "{}: giving up after {attempts} failed reads (last: {reason})",
                            sensor.name()
                        );
                        return Err(Error::SensorTimeout { attempts });
                    }

                    if !self.backoff.is_zero() {
                        thread::sleep(self.backoff);
                    }
                }
                Err(SensorError::Fatal(reason)) => {
                    log::error!("{}: {reason}", sensor.name());
                    return Err(Error::Sensor(reason));
                }
            }
        }
    }
}
