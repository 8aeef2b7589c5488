//! Run-mode tests against the simulated sensor.
//!
//! Every mode is driven end to end: sensor rate setup, acquisition with
//! retries, rendering, and PNG or display output.
//!
//! Run: cargo test --test modes_test

#![allow(clippy::unwrap_used)]

use std::io::Write;
use std::path::Path;

use pithermcam::config::Config;
use pithermcam::display::{HeadlessDisplay, TerminalDisplay};
use pithermcam::error::Error;
use pithermcam::frame::Frame;
use pithermcam::input::Action;
use pithermcam::modes::{self, Mode};
use pithermcam::render::FigureLayout;
use pithermcam::sensor::{RefreshRate, SensorError, SimulatedSensor, ThermalSensor};
use pithermcam::temperature::TemperatureUnit;

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

fn config_in(folder: &Path) -> Config {
    let mut config = Config::new();
    config.filepaths.output_folder = folder.to_path_buf();
    config
}

/// Uniform scene with one pixel a single float step warmer.
struct NearlyUniformSensor {
    base: f32,
    rate: RefreshRate,
}

impl ThermalSensor for NearlyUniformSensor {
    fn name(&self) -> &str {
        "nearly-uniform"
    }

    fn set_refresh_rate(&mut self, rate: RefreshRate) -> Result<(), SensorError> {
        self.rate = rate;
        Ok(())
    }

    fn refresh_rate(&mut self) -> Result<RefreshRate, SensorError> {
        Ok(self.rate)
    }

    fn read_frame(&mut self, frame: &mut Frame) -> Result<(), SensorError> {
        let pixels = frame.as_mut_slice();
        pixels.fill(self.base);
        pixels[0] = f32::from_bits(self.base.to_bits() + 1);
        Ok(())
    }
}

/// Width and height from the IHDR chunk.
fn png_size(path: &Path) -> (u32, u32) {
    let bytes = std::fs::read(path).unwrap();
    assert_eq!(&bytes[0..8], &PNG_SIGNATURE, "{} is not a PNG", path.display());
    assert_eq!(&bytes[12..16], b"IHDR");
    (
        u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]),
        u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]),
    )
}

// ============================================================================
// Snapshots
// ============================================================================

#[test]
fn test_simple_pic_size_follows_layout_and_scale() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir.path().join("captures"));
    let mut sensor = SimulatedSensor::new();

    let path = modes::simple_pic(&mut sensor, &config).unwrap();

    let layout = FigureLayout::new(320, 240);
    let scale = config.display.snapshot_scale;
    assert_eq!(path, dir.path().join("captures").join("simple_pic.png"));
    assert_eq!(png_size(&path), (layout.width * scale, layout.height * scale));
}

#[test]
fn test_interp_pic_size_follows_zoom() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.display.zoom = 4;
    config.display.snapshot_scale = 1;
    let mut sensor = SimulatedSensor::new();

    let path = modes::interpolated_pic(&mut sensor, &config).unwrap();

    let layout = FigureLayout::new(32 * 4, 24 * 4);
    assert_eq!(png_size(&path), (layout.width, layout.height));
    assert_eq!(sensor.refresh_rate().unwrap(), RefreshRate::Four);
}

#[test]
fn test_snapshot_into_unwritable_folder_fails() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not_a_folder");
    std::fs::File::create(&blocker).unwrap().write_all(b"x").unwrap();

    let mut sensor = SimulatedSensor::new();
    let result = modes::simple_pic(&mut sensor, &config_in(&blocker));
    assert!(matches!(result, Err(Error::Io(_))));
}

// ============================================================================
// Acquisition retries
// ============================================================================

#[test]
fn test_mean_temp_survives_transient_errors() {
    let mut sensor = SimulatedSensor::new().with_transient_failures(10);
    let mut out = Vec::new();

    let (c, f) = modes::print_mean_temp(&mut sensor, &Config::new(), &mut out).unwrap();

    assert!((15.0..40.0).contains(&c), "implausible mean {c}");
    assert!((f - (c * 9.0 / 5.0 + 32.0)).abs() < 1e-3);
    assert_eq!(sensor.read_attempts(), 11);
    let line = String::from_utf8(out).unwrap();
    assert!(line.starts_with("Average MLX90640 Temperature: "));
    assert!(line.trim_end().ends_with("F)"));
}

#[test]
fn test_mean_temp_gives_up_after_budget() {
    let mut config = Config::new();
    config.sensor.max_read_attempts = 3;
    config.sensor.retry_backoff_ms = 0;
    let mut sensor = SimulatedSensor::new().with_transient_failures(5);

    let err = modes::print_mean_temp(&mut sensor, &config, &mut Vec::new()).unwrap_err();

    assert!(matches!(err, Error::SensorTimeout { attempts: 3 }));
    assert_eq!(sensor.read_attempts(), 3);
}

#[test]
fn test_mean_temp_keeps_sensor_rate() {
    let mut sensor = SimulatedSensor::new();
    sensor.set_refresh_rate(RefreshRate::Sixteen).unwrap();

    modes::print_mean_temp(&mut sensor, &Config::new(), &mut Vec::new()).unwrap();
    assert_eq!(sensor.refresh_rate().unwrap(), RefreshRate::Sixteen);
}

#[test]
fn test_unbounded_retry_waits_out_long_outage() {
    let mut config = Config::new();
    config.sensor.max_read_attempts = 0;
    config.sensor.retry_backoff_ms = 0;
    let mut sensor = SimulatedSensor::new().with_transient_failures(500);

    modes::print_mean_temp(&mut sensor, &config, &mut Vec::new()).unwrap();
    assert_eq!(sensor.read_attempts(), 501);
}

// ============================================================================
// Live loops
// ============================================================================

#[test]
fn test_interp_camera_in_terminal_redraws_only_axes_lines() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.display.zoom = 2;
    config.display.colorbar_update_secs = 3600.0;
    let mut sensor = SimulatedSensor::new();
    let mut display = TerminalDisplay::with_writer(Vec::new(), 120, 40);

    let summary =
        modes::interpolated_camera_read(&mut sensor, &config, &mut display, Some(3)).unwrap();

    assert_eq!(summary.frames, 3);
    assert_eq!(summary.full_updates, 1);
    let text = String::from_utf8(display.writer().clone()).unwrap();
    assert!(text.contains('▀'));
    assert!(text.contains("Frame Rate: "));
}

#[test]
fn test_fahrenheit_live_views_survive_nearly_uniform_scene() {
    for base in [20.0_f32, 25.0, 30.0, 33.3] {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.display.units = TemperatureUnit::Fahrenheit;
        config.display.zoom = 2;
        config.display.colorbar_update_secs = 0.0;
        let mut sensor = NearlyUniformSensor { base, rate: RefreshRate::Two };

        let summary = modes::interpolated_camera_read(
            &mut sensor,
            &config,
            &mut HeadlessDisplay::new(),
            Some(3),
        )
        .unwrap();
        assert_eq!(summary.full_updates, 3, "base {base}");

        let summary =
            modes::simple_camera_read(&mut sensor, &config, &mut HeadlessDisplay::new(), Some(2))
                .unwrap();
        assert_eq!(summary.frames, 2, "base {base}");
    }
}

#[test]
fn test_run_dispatches_live_mode() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.display.zoom = 2;
    let mut sensor = SimulatedSensor::new();
    let mut display = HeadlessDisplay::new();

    modes::run(Mode::InterpCamera, &mut sensor, &config, &mut display, Some(2)).unwrap();

    assert_eq!(sensor.frames_delivered(), 2);
    assert_eq!(sensor.refresh_rate().unwrap(), RefreshRate::Eight);
    // Initial draw plus two frames
    assert_eq!(display.frames(), 3);
}

#[test]
fn test_live_snapshot_then_quit() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.display.zoom = 2;
    let mut sensor = SimulatedSensor::new();
    let mut display =
        HeadlessDisplay::new().with_action(2, Action::Snapshot).with_action(3, Action::Quit);

    let summary =
        modes::interpolated_camera_read(&mut sensor, &config, &mut display, None).unwrap();

    assert_eq!(summary.frames, 2);
    assert_eq!(summary.snapshots, vec![dir.path().join("interp_camera.png")]);
}

#[test]
fn test_profiled_run_writes_stats_and_stops() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.profiling.enabled = true;
    config.profiling.report_after = 4;
    let mut sensor = SimulatedSensor::new();
    let mut display = HeadlessDisplay::new();

    // Every simple-camera frame is a full update
    let summary = modes::simple_camera_read(&mut sensor, &config, &mut display, None).unwrap();

    assert_eq!(summary.frames, 4);
    let report = std::fs::read_to_string(dir.path().join("profiling_stats.txt")).unwrap();
    assert!(report.starts_with("4 full updates profiled"));
    for stage in ["acquire", "interpolate", "render", "present"] {
        assert!(report.contains(stage), "report lacks {stage}:\n{report}");
    }
}

#[test]
fn test_fatal_sensor_error_ends_live_loop() {
    let mut sensor = SimulatedSensor::new().with_fatal_failure("i2c bus unplugged");
    let mut display = HeadlessDisplay::new();

    let err = modes::simple_camera_read(&mut sensor, &Config::new(), &mut display, Some(10))
        .unwrap_err();
    assert!(matches!(err, Error::Sensor(ref msg) if msg.contains("unplugged")));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_file_drives_mode() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.yaml");
    std::fs::write(
        &config_path,
        format!(
            "mode: simple-pic\nfilepaths:\n  output_folder: {}\ndisplay:\n  snapshot_scale: 1\n",
            dir.path().join("out").display()
        ),
    )
    .unwrap();

    let config = Config::resolve(Some(&config_path)).unwrap();
    assert_eq!(config.mode, Mode::SimplePic);

    let mut sensor = SimulatedSensor::new();
    modes::run(config.mode, &mut sensor, &config, &mut HeadlessDisplay::new(), None).unwrap();
    assert!(dir.path().join("out").join("simple_pic.png").exists());
}

#[test]
fn test_bad_config_reports_line() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.yaml");
    std::fs::write(&config_path, "version: 1\nsensor:\n  address: [1, 2]\n").unwrap();

    let err = Config::resolve(Some(&config_path)).unwrap_err();
    assert!(matches!(err, Error::ConfigParse { .. }), "got {err}");
    assert!(err.to_string().contains("line"));
}
