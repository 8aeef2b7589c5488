//! MLX90640 over Linux i2c-dev.
//!
//! The camera measures in two interleaved subpages; a full frame is only
//! available once both have been read since the previous frame, so
//! [`Mlx90640Sensor::read_frame`] polls the data-ready flag until two
//! subpages have landed.

use super::{RefreshRate, SensorError, ThermalSensor};
use crate::error::{Error, Result};
use crate::frame::Frame;
use linux_embedded_hal::I2cdev;
use mlx9064x::{FrameRate, Mlx90640Camera};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

/// Subpages per full frame.
const SUBPAGES: u32 = 2;

/// MLX90640 attached to an I2C bus.
pub struct Mlx90640Sensor {
    camera: Mlx90640Camera<I2cdev>,
    rate: RefreshRate,
}

impl Mlx90640Sensor {
    /// Open the camera at `address` on `bus` (e.g. `/dev/i2c-1`, `0x33`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Sensor`] if the bus cannot be opened or the camera
    /// does not answer with valid calibration data.
    pub fn open(bus: &Path, address: u8) -> Result<Self> {
        let i2c = I2cdev::new(bus)
            .map_err(|e| Error::Sensor(format!("cannot open {}: {e}", bus.display())))?;
        let camera = Mlx90640Camera::new(i2c, address).map_err(|_| {
            Error::Sensor(format!("no MLX90640 at {address:#04x} on {}", bus.display()))
        })?;
        log::info!("MLX90640 found at {address:#04x} on {}", bus.display());

        Ok(Self { camera, rate: RefreshRate::default() })
    }
}

fn to_driver(rate: RefreshRate) -> FrameRate {
    match rate {
        RefreshRate::Half => FrameRate::Half,
        RefreshRate::One => FrameRate::One,
        RefreshRate::Two => FrameRate::Two,
        RefreshRate::Four => FrameRate::Four,
        RefreshRate::Eight => FrameRate::Eight,
        RefreshRate::Sixteen => FrameRate::Sixteen,
        RefreshRate::ThirtyTwo => FrameRate::ThirtyTwo,
        RefreshRate::SixtyFour => FrameRate::SixtyFour,
    }
}

impl ThermalSensor for Mlx90640Sensor {
    fn name(&self) -> &str {
        "mlx90640"
    }

    fn set_refresh_rate(&mut self, rate: RefreshRate) -> std::result::Result<(), SensorError> {
        self.camera
            .set_frame_rate(to_driver(rate))
            .map_err(|_| SensorError::Fatal(format!("cannot set refresh rate to {rate}")))?;
        self.rate = rate;
        Ok(())
    }

    fn refresh_rate(&mut self) -> std::result::Result<RefreshRate, SensorError> {
        Ok(self.rate)
    }

    fn read_frame(&mut self, frame: &mut Frame) -> std::result::Result<(), SensorError> {
        // Each subpage takes one period; allow one extra before calling it stale
        let deadline = Instant::now() + self.rate.period() * (SUBPAGES + 1);
        let poll = (self.rate.period() / 8).max(Duration::from_millis(1));
        let mut subpages = 0;

        while subpages < SUBPAGES {
            let ready = self
                .camera
                .generate_image_if_ready(frame.as_mut_slice())
                .map_err(|_| SensorError::Transient("i2c transfer failed".to_string()))?;

            if ready {
                subpages += 1;
            } else if Instant::now() >= deadline {
                return Err(SensorError::Transient("frame not ready".to_string()));
            } else {
                thread::sleep(poll);
            }
        }

        if frame.as_slice().iter().any(|t| !t.is_finite()) {
            return Err(SensorError::Transient("non-finite temperature in frame".to_string()));
        }
        Ok(())
    }
}
