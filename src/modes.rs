//! The five run modes.
//!
//! | Mode            | Refresh | Output                                            |
//! |-----------------|---------|---------------------------------------------------|
//! | `mean-temp`     | as is   | one line with the mean temperature                |
//! | `simple-pic`    | 2 Hz    | `simple_pic.png`, raw 24x32 grid                  |
//! | `simple-camera` | 8 Hz    | live raw grid, limits and colorbar every frame    |
//! | `interp-pic`    | 4 Hz    | `interp_pic.png`, enlarged grid                   |
//! | `interp-camera` | 8 Hz    | live enlarged grid, limits every few seconds      |
//!
//! Every mode except `mean-temp` sets the sensor refresh rate. Each mode
//! allocates one [`Frame`] and reuses it for each read.

use crate::config::Config;
use crate::display::Display;
use crate::error::Result;
use crate::frame::{Frame, FRAME_COLS, FRAME_ROWS};
use crate::frame_rate::{FrameRateMeter, DEFAULT_WINDOW};
use crate::input::Action;
use crate::output::PngEncoder;
use crate::profiling::{Profiler, Stage};
use crate::render::{Figure, FigureStyle};
use crate::scale::Palette;
use crate::sensor::{RefreshRate, ThermalSensor};
use crate::temperature::c_to_f;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

/// Pixels per sensor cell in the raw-grid figures.
const SIMPLE_CELL: u32 = 10;

/// Initial color limits of the raw-grid figures.
const SIMPLE_CLIM: (f32, f32) = (0.0, 60.0);
/// Initial color limits of the enlarged-grid figures.
const INTERP_CLIM: (f32, f32) = (25.0, 45.0);

/// What the program does when started.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Print the mean temperature of one frame.
    #[default]
    MeanTemp,
    /// Save one raw frame as a PNG.
    SimplePic,
    /// Live raw frames.
    SimpleCamera,
    /// Save one enlarged frame as a PNG.
    InterpPic,
    /// Live enlarged frames.
    InterpCamera,
}

impl Mode {
    /// Sensor refresh rate the mode runs at; `None` keeps the current rate.
    #[must_use]
    pub const fn refresh_rate(self) -> Option<RefreshRate> {
        match self {
            Self::MeanTemp => None,
            Self::SimplePic => Some(RefreshRate::Two),
            Self::InterpPic => Some(RefreshRate::Four),
            Self::SimpleCamera | Self::InterpCamera => Some(RefreshRate::Eight),
        }
    }

    /// Whether the mode needs a live display.
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(self, Self::SimpleCamera | Self::InterpCamera)
    }

    /// Kebab-case name as used on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MeanTemp => "mean-temp",
            Self::SimplePic => "simple-pic",
            Self::SimpleCamera => "simple-camera",
            Self::InterpPic => "interp-pic",
            Self::InterpCamera => "interp-camera",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a live loop did before it stopped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveSummary {
    /// Frames presented.
    pub frames: u64,
    /// Frames that also refreshed the color limits.
    pub full_updates: u64,
    /// Snapshots saved on request.
    pub snapshots: Vec<PathBuf>,
    /// Profiling report, when profiling was on and completed.
    pub profile_report: Option<PathBuf>,
    /// Last reported rate.
    pub fps: Option<f32>,
}

/// Run `mode` to completion.
///
/// `display` is used by the live modes only; `max_frames` ends a live loop
/// after that many frames.
///
/// # Errors
///
/// Returns the first sensor, rendering or output error.
pub fn run(
    mode: Mode,
    sensor: &mut dyn ThermalSensor,
    config: &Config,
    display: &mut dyn Display,
    max_frames: Option<u64>,
) -> Result<()> {
    log::info!("running {mode} with {}", sensor.name());

    match mode {
        Mode::MeanTemp => {
            print_mean_temp(sensor, config, &mut std::io::stdout())?;
        }
        Mode::SimplePic => {
            let path = simple_pic(sensor, config)?;
            println!("Saved {}", path.display());
        }
        Mode::SimpleCamera => {
            let summary = simple_camera_read(sensor, config, display, max_frames)?;
            log::info!("simple camera stopped after {} frames", summary.frames);
        }
        Mode::InterpPic => {
            let path = interpolated_pic(sensor, config)?;
            println!("Saved {}", path.display());
        }
        Mode::InterpCamera => {
            let summary = interpolated_camera_read(sensor, config, display, max_frames)?;
            log::info!(
                "interpolated camera stopped after {} frames ({} full updates)",
                summary.frames,
                summary.full_updates
            );
        }
    }
    Ok(())
}

/// Mean of one frame in Celsius and Fahrenheit.
///
/// Writes `Average MLX90640 Temperature: 23.4C (74.1F)` to `out`.
///
/// # Errors
///
/// Returns an error if no frame could be read or `out` fails.
pub fn print_mean_temp(
    sensor: &mut dyn ThermalSensor,
    config: &Config,
    out: &mut dyn Write,
) -> Result<(f32, f32)> {
    apply_refresh_rate(sensor, Mode::MeanTemp)?;

    let mut frame = Frame::new();
    config.sensor.retry_policy().acquire(sensor, &mut frame)?;

    let temp_c = frame.mean();
    let temp_f = c_to_f(temp_c);
    writeln!(out, "Average MLX90640 Temperature: {temp_c:2.1}C ({temp_f:2.1}F)")?;

    Ok((temp_c, temp_f))
}

/// Save one raw frame as `simple_pic.png`.
///
/// # Errors
///
/// Returns an error if no frame could be read or the file cannot be written.
pub fn simple_pic(sensor: &mut dyn ThermalSensor, config: &Config) -> Result<PathBuf> {
    apply_refresh_rate(sensor, Mode::SimplePic)?;
    let mut figure = simple_figure(config)?;

    let mut frame = Frame::new();
    config.sensor.retry_policy().acquire(sensor, &mut frame)?;
    figure.update(&frame.to_display_grid(), true)?;

    save(&figure, config, "simple_pic.png")
}

/// Live raw frames with the color limits following every frame.
///
/// Reports the rate over the whole run as `Sample Rate: 7.9fps`.
///
/// # Errors
///
/// Returns the first sensor, rendering or display error.
pub fn simple_camera_read(
    sensor: &mut dyn ThermalSensor,
    config: &Config,
    display: &mut dyn Display,
    max_frames: Option<u64>,
) -> Result<LiveSummary> {
    apply_refresh_rate(sensor, Mode::SimpleCamera)?;
    let mut figure = simple_figure(config)?;
    display.present(figure.framebuffer(), figure.framebuffer().bounds())?;

    let retry = config.sensor.retry_policy();
    let mut profiler = profiler(config);
    let mut meter = FrameRateMeter::cumulative();
    let mut summary = LiveSummary::default();
    let mut frame = Frame::new();

    while max_frames.map_or(true, |max| summary.frames < max) {
        let started = Instant::now();

        profiler.time(Stage::Acquire, || retry.acquire(&mut *sensor, &mut frame))?;
        let grid = profiler.time(Stage::Interpolate, || frame.to_display_grid());
        let damage = profiler.time(Stage::Render, || figure.update(&grid, true))?;
        profiler.time(Stage::Present, || display.present(figure.framebuffer(), damage))?;

        summary.frames += 1;
        summary.full_updates += 1;
        profiler.full_update();

        meter.record(started.elapsed());
        if let Some(status) = meter.status_line() {
            log::debug!("{status}");
            display.set_status(&status)?;
        }

        if profiler.is_done() {
            summary.profile_report = Some(profiler.write_report(&config.filepaths.output_folder)?);
            break;
        }
        if !handle_input(display, &figure, config, "simple_camera.png", &mut summary)? {
            break;
        }
    }

    summary.fps = meter.fps();
    Ok(summary)
}

/// Save one enlarged frame as `interp_pic.png`.
///
/// # Errors
///
/// Returns an error if no frame could be read, interpolation fails or the
/// file cannot be written.
pub fn interpolated_pic(sensor: &mut dyn ThermalSensor, config: &Config) -> Result<PathBuf> {
    apply_refresh_rate(sensor, Mode::InterpPic)?;
    let mut figure = interp_figure(config)?;

    let mut frame = Frame::new();
    config.sensor.retry_policy().acquire(sensor, &mut frame)?;
    let grid = frame.to_display_grid().zoom(config.display.zoom, config.display.interpolation)?;
    figure.update(&grid, true)?;

    save(&figure, config, "interp_pic.png")
}

/// Live enlarged frames.
///
/// The first frame and then one frame every `colorbar_update_secs` refresh
/// the color limits and the colorbar; the frames in between only redraw
/// the image with the current limits. The rate over the last ten frames is
/// reported as `Frame Rate: 7.9fps` on each full update.
///
/// # Errors
///
/// Returns the first sensor, interpolation, rendering or display error.
pub fn interpolated_camera_read(
    sensor: &mut dyn ThermalSensor,
    config: &Config,
    display: &mut dyn Display,
    max_frames: Option<u64>,
) -> Result<LiveSummary> {
    apply_refresh_rate(sensor, Mode::InterpCamera)?;
    let mut figure = interp_figure(config)?;
    display.present(figure.framebuffer(), figure.framebuffer().bounds())?;

    let retry = config.sensor.retry_policy();
    let (zoom, method) = (config.display.zoom, config.display.interpolation);
    let colorbar_interval = config.display.colorbar_update_interval();
    let mut profiler = profiler(config);
    let mut meter = FrameRateMeter::windowed(DEFAULT_WINDOW);
    let mut summary = LiveSummary::default();
    let mut frame = Frame::new();
    let mut last_full: Option<Instant> = None;

    while max_frames.map_or(true, |max| summary.frames < max) {
        let started = Instant::now();
        let full_update =
            last_full.map_or(true, |t| started.duration_since(t) >= colorbar_interval);
        if full_update {
            last_full = Some(started);
        }

        profiler.time(Stage::Acquire, || retry.acquire(&mut *sensor, &mut frame))?;
        let grid =
            profiler.time(Stage::Interpolate, || frame.to_display_grid().zoom(zoom, method))?;
        let damage = profiler.time(Stage::Render, || figure.update(&grid, full_update))?;
        profiler.time(Stage::Present, || display.present(figure.framebuffer(), damage))?;

        summary.frames += 1;
        meter.record(started.elapsed());

        if full_update {
            summary.full_updates += 1;
            profiler.full_update();

            if let Some(status) = meter.status_line() {
                log::debug!("{status}");
                display.set_status(&status)?;
            }
            if profiler.is_done() {
                summary.profile_report =
                    Some(profiler.write_report(&config.filepaths.output_folder)?);
                break;
            }
        }
        if !handle_input(display, &figure, config, "interp_camera.png", &mut summary)? {
            break;
        }
    }

    summary.fps = meter.fps();
    Ok(summary)
}

/// Raw-grid figure: default palette, 0-60 °C until the first frame.
fn simple_figure(config: &Config) -> Result<Figure> {
    let style = FigureStyle {
        palette: Palette::Viridis,
        units: config.display.units,
        face: config.display.face()?,
    };
    let (width, height) = (FRAME_COLS as u32 * SIMPLE_CELL, FRAME_ROWS as u32 * SIMPLE_CELL);
    Figure::new(width, height, &style, SIMPLE_CLIM)
}

/// Enlarged-grid figure drawn one pixel per sample, 25-45 °C until the
/// first frame.
fn interp_figure(config: &Config) -> Result<Figure> {
    let style = FigureStyle {
        palette: config.display.palette,
        units: config.display.units,
        face: config.display.face()?,
    };
    let zoom = config.display.zoom as u32;
    Figure::new(FRAME_COLS as u32 * zoom, FRAME_ROWS as u32 * zoom, &style, INTERP_CLIM)
}

fn apply_refresh_rate(sensor: &mut dyn ThermalSensor, mode: Mode) -> Result<()> {
    if let Some(rate) = mode.refresh_rate() {
        sensor.set_refresh_rate(rate)?;
    }
    Ok(())
}

fn profiler(config: &Config) -> Profiler {
    if config.profiling.enabled {
        Profiler::new(config.profiling.report_after)
    } else {
        Profiler::disabled()
    }
}

fn save(figure: &Figure, config: &Config, name: &str) -> Result<PathBuf> {
    PngEncoder::save_snapshot(
        figure.framebuffer(),
        &config.filepaths.output_folder,
        name,
        config.display.snapshot_scale,
    )
}

/// Drain user input; `false` means stop.
fn handle_input(
    display: &mut dyn Display,
    figure: &Figure,
    config: &Config,
    snapshot_name: &str,
    summary: &mut LiveSummary,
) -> Result<bool> {
    loop {
        match display.poll()? {
            Action::None => return Ok(true),
            Action::Quit => return Ok(false),
            Action::Snapshot => summary.snapshots.push(save(figure, config, snapshot_name)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::HeadlessDisplay;
    use crate::frame::FRAME_PIXELS;
    use crate::sensor::{SensorError, SimulatedSensor};

    /// Sensor that always reads the same value.
    struct ConstantSensor {
        value: f32,
        rate: RefreshRate,
    }

    impl ThermalSensor for ConstantSensor {
        fn name(&self) -> &str {
            "constant"
        }

        fn set_refresh_rate(&mut self, rate: RefreshRate) -> std::result::Result<(), SensorError> {
            self.rate = rate;
            Ok(())
        }

        fn refresh_rate(&mut self) -> std::result::Result<RefreshRate, SensorError> {
            Ok(self.rate)
        }

        fn read_frame(&mut self, frame: &mut Frame) -> std::result::Result<(), SensorError> {
            frame.as_mut_slice().fill(self.value);
            Ok(())
        }
    }

    fn test_config(dir: &tempfile::TempDir) -> Config {
        let mut config = Config::new();
        config.filepaths.output_folder = dir.path().to_path_buf();
        config.display.snapshot_scale = 1;
        config.display.zoom = 2;
        config
    }

    #[test]
    fn test_mode_refresh_rates() {
        assert_eq!(Mode::MeanTemp.refresh_rate(), None);
        assert_eq!(Mode::SimplePic.refresh_rate(), Some(RefreshRate::Two));
        assert_eq!(Mode::SimpleCamera.refresh_rate(), Some(RefreshRate::Eight));
        assert_eq!(Mode::InterpPic.refresh_rate(), Some(RefreshRate::Four));
        assert_eq!(Mode::InterpCamera.refresh_rate(), Some(RefreshRate::Eight));
        assert!(Mode::InterpCamera.is_live());
        assert!(!Mode::InterpPic.is_live());
        assert_eq!(Mode::SimpleCamera.to_string(), "simple-camera");
    }

    #[test]
    fn test_print_mean_temp_line() {
        let mut sensor = ConstantSensor { value: 25.0, rate: RefreshRate::Sixteen };
        let mut out = Vec::new();

        let (c, f) = print_mean_temp(&mut sensor, &Config::new(), &mut out).unwrap();

        assert_eq!(c, 25.0);
        assert_eq!(f, 77.0);
        assert_eq!(sensor.rate, RefreshRate::Sixteen, "mean-temp keeps the sensor rate");
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Average MLX90640 Temperature: 25.0C (77.0F)\n"
        );
    }

    #[test]
    fn test_simple_pic_writes_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let mut sensor = SimulatedSensor::new();

        let path = simple_pic(&mut sensor, &test_config(&dir)).unwrap();

        assert_eq!(path, dir.path().join("simple_pic.png"));
        assert!(path.exists());
        assert_eq!(sensor.frames_delivered(), 1);
    }

    #[test]
    fn test_interpolated_pic_writes_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let mut sensor = SimulatedSensor::new();

        let path = interpolated_pic(&mut sensor, &test_config(&dir)).unwrap();
        assert_eq!(path.file_name().unwrap(), "interp_pic.png");
        assert!(path.exists());
    }

    #[test]
    fn test_simple_camera_full_update_every_frame() {
        let dir = tempfile::tempdir().unwrap();
        let mut sensor = SimulatedSensor::new();
        let mut display = HeadlessDisplay::new();

        let summary =
            simple_camera_read(&mut sensor, &test_config(&dir), &mut display, Some(5)).unwrap();

        assert_eq!(summary.frames, 5);
        assert_eq!(summary.full_updates, 5);
        // The initial full draw plus one per frame
        assert_eq!(display.frames(), 6);
        assert!(display.status().starts_with("Sample Rate: "));
    }

    #[test]
    fn test_interpolated_camera_partial_updates_between_refreshes() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(&dir);
        config.display.colorbar_update_secs = 3600.0;
        let mut sensor = SimulatedSensor::new();
        let mut display = HeadlessDisplay::new();

        let summary =
            interpolated_camera_read(&mut sensor, &config, &mut display, Some(4)).unwrap();

        assert_eq!(summary.frames, 4);
        assert_eq!(summary.full_updates, 1);
        assert!(display.status().starts_with("Frame Rate: "));

        // Partial updates only damage the axes: 32x24 samples at zoom 2
        let damage = display.last_damage().unwrap();
        assert_eq!((damage.width, damage.height), (64, 48));
    }

    #[test]
    fn test_quit_stops_live_loop() {
        let dir = tempfile::tempdir().unwrap();
        let mut sensor = SimulatedSensor::new();
        // Frame 1 is the initial draw
        let mut display = HeadlessDisplay::new().with_action(3, Action::Quit);

        let summary =
            interpolated_camera_read(&mut sensor, &test_config(&dir), &mut display, None).unwrap();
        assert_eq!(summary.frames, 2);
    }

    #[test]
    fn test_snapshot_key_saves_figure() {
        let dir = tempfile::tempdir().unwrap();
        let mut sensor = SimulatedSensor::new();
        let mut display = HeadlessDisplay::new().with_action(2, Action::Snapshot);

        let summary =
            simple_camera_read(&mut sensor, &test_config(&dir), &mut display, Some(3)).unwrap();

        assert_eq!(summary.snapshots, vec![dir.path().join("simple_camera.png")]);
        assert!(summary.snapshots[0].exists());
    }

    #[test]
    fn test_profiling_stops_after_report_after_full_updates() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(&dir);
        config.profiling.enabled = true;
        config.profiling.report_after = 3;
        config.display.colorbar_update_secs = 0.0;
        let mut sensor = SimulatedSensor::new();
        let mut display = HeadlessDisplay::new();

        let summary = interpolated_camera_read(&mut sensor, &config, &mut display, None).unwrap();

        assert_eq!(summary.full_updates, 3);
        let report = summary.profile_report.unwrap();
        assert!(std::fs::read_to_string(report).unwrap().contains("acquire"));
    }

    #[test]
    fn test_simple_figure_tracks_data_range() {
        let mut figure = simple_figure(&Config::new()).unwrap();
        assert_eq!(figure.clim(), SIMPLE_CLIM);

        let frame = Frame::from_slice(&[30.0; FRAME_PIXELS]).unwrap();
        figure.update(&frame.to_display_grid(), true).unwrap();
        // A constant frame is widened around its value
        assert_eq!(figure.clim(), (29.5, 30.5));
    }

    #[test]
    fn test_sensor_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let mut sensor = SimulatedSensor::new().with_fatal_failure("bus gone");
        let mut display = HeadlessDisplay::new();

        let result = simple_camera_read(&mut sensor, &test_config(&dir), &mut display, Some(3));
        assert!(result.is_err());
    }
}
