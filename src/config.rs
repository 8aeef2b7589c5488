//! Configuration file.
//!
//! YAML, with every key optional. Precedence: CLI > file > defaults. The
//! file is looked up at `--config PATH`, falling back to
//! `<config_dir>/pithermcam/config.yaml`; a missing default file means
//! defaults.

use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::interp::Interpolation;
use crate::modes::Mode;
use crate::scale::Palette;
use crate::sensor::RetryPolicy;
use crate::temperature::TemperatureUnit;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Largest accepted interpolation zoom.
const MAX_ZOOM: usize = 32;
/// Largest accepted snapshot upscale.
const MAX_SNAPSHOT_SCALE: u32 = 16;
/// Longest accepted colorbar refresh period, one day.
const MAX_COLORBAR_UPDATE_SECS: f64 = 86_400.0;

/// Output locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilePaths {
    /// Folder for PNG snapshots and profiling statistics.
    #[serde(default = "default_output_folder")]
    pub output_folder: PathBuf,

    /// Log file used when debug output is off.
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

fn default_output_folder() -> PathBuf {
    PathBuf::from("./")
}
fn default_log_file() -> PathBuf {
    PathBuf::from("pithermcam.log")
}

impl Default for FilePaths {
    fn default() -> Self {
        Self { output_folder: default_output_folder(), log_file: default_log_file() }
    }
}

/// Sensor connection and read retries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig {
    /// I2C bus device.
    #[serde(default = "default_bus")]
    pub bus: PathBuf,

    /// 7-bit I2C address of the camera.
    #[serde(default = "default_address")]
    pub address: u8,

    /// Read attempts before giving up on a frame; 0 retries forever.
    #[serde(default = "default_max_read_attempts")]
    pub max_read_attempts: u32,

    /// Pause between read attempts in milliseconds.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_bus() -> PathBuf {
    PathBuf::from("/dev/i2c-1")
}
fn default_address() -> u8 {
    0x33
}
fn default_max_read_attempts() -> u32 {
    50
}
fn default_retry_backoff_ms() -> u64 {
    5
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            bus: default_bus(),
            address: default_address(),
            max_read_attempts: default_max_read_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl SensorConfig {
    /// Retry policy for frame reads.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_read_attempts,
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}

/// How figures look.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Palette for the interpolated modes.
    #[serde(default)]
    pub palette: Palette,

    /// Interpolation used by the interpolated modes.
    #[serde(default)]
    pub interpolation: Interpolation,

    /// Per-axis enlargement of the interpolated modes.
    #[serde(default = "default_zoom")]
    pub zoom: usize,

    /// Seconds between color limit refreshes in the interpolated live view.
    #[serde(default = "default_colorbar_update_secs")]
    pub colorbar_update_secs: f64,

    /// Colorbar units.
    #[serde(default)]
    pub units: TemperatureUnit,

    /// Figure background as `#RRGGBB`.
    #[serde(default = "default_face_color")]
    pub face_color: String,

    /// Integer enlargement applied to saved snapshots.
    #[serde(default = "default_snapshot_scale")]
    pub snapshot_scale: u32,
}

fn default_zoom() -> usize {
    10
}
fn default_colorbar_update_secs() -> f64 {
    5.0
}
fn default_face_color() -> String {
    Rgba::FACE.to_hex()
}
fn default_snapshot_scale() -> u32 {
    2
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            interpolation: Interpolation::default(),
            zoom: default_zoom(),
            colorbar_update_secs: default_colorbar_update_secs(),
            units: TemperatureUnit::default(),
            face_color: default_face_color(),
            snapshot_scale: default_snapshot_scale(),
        }
    }
}

impl DisplayConfig {
    /// Parsed figure background.
    ///
    /// # Errors
    ///
    /// Returns an error if `face_color` is not a hex color.
    pub fn face(&self) -> Result<Rgba> {
        self.face_color.parse()
    }

    /// Time between full updates in the interpolated live view.
    ///
    /// Out-of-range values saturate; [`Config::validate`] rejects them.
    #[must_use]
    pub fn colorbar_update_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.colorbar_update_secs.max(0.0)).unwrap_or(Duration::MAX)
    }
}

/// Stage timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilingConfig {
    /// Collect and write stage timings.
    #[serde(default)]
    pub enabled: bool,

    /// Full updates to profile before writing the report and stopping.
    #[serde(default = "default_report_after")]
    pub report_after: u32,
}

fn default_report_after() -> u32 {
    20
}

impl Default for ProfilingConfig {
    fn default() -> Self {
        Self { enabled: false, report_after: default_report_after() }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Configuration version.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Mode run when none is given on the command line.
    #[serde(default)]
    pub mode: Mode,

    /// Output locations.
    #[serde(default)]
    pub filepaths: FilePaths,

    /// Sensor settings.
    #[serde(default)]
    pub sensor: SensorConfig,

    /// Figure settings.
    #[serde(default)]
    pub display: DisplayConfig,

    /// Log to stderr at debug level instead of the log file.
    #[serde(default)]
    pub debug: bool,

    /// Stage timing.
    #[serde(default)]
    pub profiling: ProfilingConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            mode: Mode::default(),
            filepaths: FilePaths::default(),
            sensor: SensorConfig::default(),
            display: DisplayConfig::default(),
            debug: false,
            profiling: ProfilingConfig::default(),
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Where the configuration file is looked for when none is given.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pithermcam").join("config.yaml"))
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::ConfigNotFound(path.display().to_string()),
            _ => Error::Io(e),
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error with line number if parsing fails.
    pub fn parse(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| {
            let line = e.location().map_or(0, |l| l.line());
            Error::ConfigParse { line, message: e.to_string() }
        })
    }

    /// File [`Config::resolve`] reads: `explicit` if given, otherwise the
    /// default file if it exists.
    #[must_use]
    pub fn source(explicit: Option<&Path>) -> Option<PathBuf> {
        match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path().filter(|p| p.is_file()),
        }
    }

    /// Load [`Config::source`], or defaults when there is none; then
    /// validate.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file is missing, or if the
    /// file cannot be read, parsed or holds invalid values.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let config = match Self::source(explicit) {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values no mode can work with.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigInvalid`] naming the first offending key.
    pub fn validate(&self) -> Result<()> {
        let invalid = |key: &str, message: String| {
            Err(Error::ConfigInvalid { key: key.to_string(), message })
        };

        if self.version != 1 {
            return invalid("version", format!("unsupported version {}", self.version));
        }
        if self.display.zoom == 0 || self.display.zoom > MAX_ZOOM {
            return invalid("display.zoom", format!("must be between 1 and {MAX_ZOOM}"));
        }
        if self.display.snapshot_scale == 0 || self.display.snapshot_scale > MAX_SNAPSHOT_SCALE {
            return invalid(
                "display.snapshot_scale",
                format!("must be between 1 and {MAX_SNAPSHOT_SCALE}"),
            );
        }
        if !(0.0..=MAX_COLORBAR_UPDATE_SECS).contains(&self.display.colorbar_update_secs) {
            return invalid(
                "display.colorbar_update_secs",
                format!("must be between 0 and {MAX_COLORBAR_UPDATE_SECS}"),
            );
        }
        if let Err(e) = self.display.face() {
            return invalid("display.face_color", e.to_string());
        }
        if self.sensor.address > 0x7F {
            return invalid("sensor.address", "must be a 7-bit I2C address".to_string());
        }
        if self.profiling.report_after == 0 {
            return invalid("profiling.report_after", "must be at least 1".to_string());
        }

        Ok(())
    }
}
