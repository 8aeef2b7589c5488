//! # pithermcam
//!
//! MLX90640 thermal camera viewer for the Raspberry Pi.
//!
//! Reads 24x32 temperature frames from the sensor, optionally enlarges them
//! with spline interpolation, and renders them as a false-color image with
//! a colorbar, either once into a PNG or live in the terminal.
//!
//! ## Modes
//!
//! - `mean-temp`: print the mean temperature of one frame
//! - `simple-pic` / `interp-pic`: save one raw or enlarged frame as a PNG
//! - `simple-camera` / `interp-camera`: live raw or enlarged view
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pithermcam::prelude::*;
//!
//! let config = Config::resolve(None)?;
//! let mut sensor = SimulatedSensor::new();
//! let path = pithermcam::modes::interpolated_pic(&mut sensor, &config)?;
//! println!("saved {}", path.display());
//! ```
//!
//! ## Feature Flags
//!
//! - `mlx90640`: real sensor over Linux i2c-dev (`Mlx90640Sensor`)
//!
//! ## References
//!
//! - Unser, M. (1999). "Splines: A Perfect Fit for Signal and Image
//!   Processing." IEEE Signal Processing Magazine.
//! - Melexis. *MLX90640 32x24 IR array datasheet*.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only
#![cfg_attr(test, allow(clippy::unwrap_used))]
// Allow common patterns in graphics code
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Core Modules
// ============================================================================

/// Color types.
pub mod color;

/// Core framebuffer for pixel rendering.
pub mod framebuffer;

/// Integer pixel rectangles.
pub mod geometry;

/// Scale functions for data-to-visual mappings.
pub mod scale;

/// Temperature units.
pub mod temperature;

// ============================================================================
// Acquisition
// ============================================================================

/// Sensor frames and temperature grids.
pub mod frame;

/// Grid enlargement.
pub mod interp;

/// Sensor seam, retry policy and backends.
pub mod sensor;

// ============================================================================
// Rendering Modules
// ============================================================================

/// Thermal image, colorbar and figure.
pub mod render;

/// Output encoders (PNG, terminal).
pub mod output;

/// Live display surfaces.
pub mod display;

/// Key handling.
pub mod input;

// ============================================================================
// Run Loop Support
// ============================================================================

/// Fixed-capacity history.
pub mod ring_buffer;

/// Loop rate measurement.
pub mod frame_rate;

/// Stage timing.
pub mod profiling;

/// The five run modes.
pub mod modes;

// ============================================================================
// Configuration
// ============================================================================

/// YAML configuration.
pub mod config;

/// Log setup.
pub mod logging;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for pithermcam operations.
pub mod error;

pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and traits for convenient imports.
///
/// ```rust,ignore
/// use pithermcam::prelude::*;
/// ```
pub mod prelude {
    pub use crate::color::Rgba;
    pub use crate::config::Config;
    pub use crate::display::{Display, HeadlessDisplay, TerminalDisplay};
    pub use crate::error::{Error, Result};
    pub use crate::frame::{Extent, Frame, Grid, FRAME_COLS, FRAME_PIXELS, FRAME_ROWS};
    pub use crate::framebuffer::Framebuffer;
    pub use crate::geometry::Rect;
    pub use crate::interp::Interpolation;
    pub use crate::modes::Mode;
    pub use crate::render::{Figure, FigureStyle};
    pub use crate::scale::{ColorScale, LinearScale, Palette, Scale};
    pub use crate::sensor::{RefreshRate, RetryPolicy, SensorError, SimulatedSensor, ThermalSensor};
    pub use crate::temperature::TemperatureUnit;
}

// ============================================================================
// Re-exports
// ============================================================================

/// Re-export trueno for direct access to SIMD operations.
pub use trueno;
