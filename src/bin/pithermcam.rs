//! pithermcam: MLX90640 thermal camera viewer
//!
//! Reads the sensor over I2C and shows the frames as a false-color image,
//! live in the terminal or saved as PNG snapshots.
//!
//! Run: `pithermcam --mode interp-camera`
//! Without hardware: `pithermcam --simulate --mode interp-camera`

use pithermcam::config::Config;
use pithermcam::display::{HeadlessDisplay, TerminalDisplay};
use pithermcam::logging;
use pithermcam::modes::{self, Mode};
use pithermcam::sensor::{SimulatedSensor, ThermalSensor};

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

/// pithermcam: MLX90640 thermal camera viewer
#[derive(Parser, Debug)]
#[command(name = "pithermcam")]
#[command(version)]
#[command(about = "MLX90640 thermal camera viewer", long_about = None)]
struct Cli {
    /// Run mode (defaults to the configured mode)
    #[arg(short, long, value_enum)]
    mode: Option<Mode>,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output folder for snapshots and profiling statistics
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Use a synthetic scene instead of the sensor
    #[arg(long)]
    simulate: bool,

    /// Log to stderr at debug level
    #[arg(long)]
    debug: bool,

    /// Time each loop stage and write profiling_stats.txt
    #[arg(long)]
    profile: bool,

    /// Stop a live mode after this many frames
    #[arg(long)]
    frames: Option<u64>,

    /// Run live modes without the terminal view
    #[arg(long)]
    headless: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::resolve(cli.config.as_deref()).context("loading configuration")?;
    if let Some(output) = &cli.output {
        config.filepaths.output_folder.clone_from(output);
    }
    config.debug |= cli.debug;
    config.profiling.enabled |= cli.profile;

    logging::init(config.debug, &config.filepaths.log_file)?;
    match Config::source(cli.config.as_deref()) {
        Some(path) => log::debug!("loaded configuration from {}", path.display()),
        None => log::debug!("no configuration file, using defaults"),
    }

    let mode = cli.mode.unwrap_or(config.mode);
    let mut sensor = open_sensor(&cli, &config)?;

    if mode.is_live() && !cli.headless {
        let mut display = TerminalDisplay::open().context("opening terminal view")?;
        modes::run(mode, sensor.as_mut(), &config, &mut display, cli.frames)?;
    } else {
        let mut display = HeadlessDisplay::new();
        modes::run(mode, sensor.as_mut(), &config, &mut display, cli.frames)?;
        if !display.status().is_empty() {
            println!("{}", display.status());
        }
    }

    Ok(())
}

fn open_sensor(cli: &Cli, config: &Config) -> Result<Box<dyn ThermalSensor>> {
    if cli.simulate {
        log::info!("using simulated sensor");
        return Ok(Box::new(SimulatedSensor::new().paced()));
    }
    open_hardware(config)
}

#[cfg(feature = "mlx90640")]
fn open_hardware(config: &Config) -> Result<Box<dyn ThermalSensor>> {
    use pithermcam::sensor::Mlx90640Sensor;

    let sensor = Mlx90640Sensor::open(&config.sensor.bus, config.sensor.address)
        .with_context(|| format!("opening MLX90640 on {}", config.sensor.bus.display()))?;
    Ok(Box::new(sensor))
}

#[cfg(not(feature = "mlx90640"))]
fn open_hardware(_config: &Config) -> Result<Box<dyn ThermalSensor>> {
    anyhow::bail!("built without the `mlx90640` feature; rebuild with it or pass --simulate")
}
