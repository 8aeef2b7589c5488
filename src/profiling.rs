//! Stage timing for the live loops.
//!
//! A [`Profiler`] accumulates wall-clock time per [`Stage`] and counts full
//! updates. Once enough full updates were profiled the loop writes the
//! report to `profiling_stats.txt` and stops.

use crate::error::Result;
use std::fmt::{self, Write as FmtWrite};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Name of the report file in the output folder.
pub const REPORT_FILE: &str = "profiling_stats.txt";

/// A timed part of one loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Reading a frame from the sensor, retries included.
    Acquire,
    /// Flipping and enlarging the frame.
    Interpolate,
    /// Drawing into the figure.
    Render,
    /// Pushing pixels to the display.
    Present,
}

impl Stage {
    /// Every stage, in loop order.
    pub const ALL: [Self; 4] = [Self::Acquire, Self::Interpolate, Self::Render, Self::Present];

    const fn index(self) -> usize {
        match self {
            Self::Acquire => 0,
            Self::Interpolate => 1,
            Self::Render => 2,
            Self::Present => 3,
        }
    }

    /// Lowercase stage name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Acquire => "acquire",
            Self::Interpolate => "interpolate",
            Self::Render => "render",
            Self::Present => "present",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accumulated time of one stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageStats {
    /// Times the stage ran.
    pub calls: u64,
    /// Total time spent in the stage.
    pub cumulative: Duration,
}

impl StageStats {
    /// Mean time per call.
    #[must_use]
    pub fn per_call(&self) -> Duration {
        if self.calls == 0 {
            Duration::ZERO
        } else {
            self.cumulative / u32::try_from(self.calls).unwrap_or(u32::MAX)
        }
    }
}

/// Per-stage timers plus a full-update budget.
#[derive(Debug, Clone)]
pub struct Profiler {
    enabled: bool,
    report_after: u32,
    full_updates: u32,
    stats: [StageStats; 4],
    started: Instant,
}

impl Profiler {
    /// A profiler that records nothing and never asks the loop to stop.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            report_after: 0,
            full_updates: 0,
            stats: [StageStats::default(); 4],
            started: Instant::now(),
        }
    }

    /// Profile until `report_after` full updates were seen.
    #[must_use]
    pub fn new(report_after: u32) -> Self {
        Self { enabled: true, report_after: report_after.max(1), ..Self::disabled() }
    }

    /// Run `f` and charge its duration to `stage`.
    pub fn time<T>(&mut self, stage: Stage, f: impl FnOnce() -> T) -> T {
        if !self.enabled {
            return f();
        }
        let start = Instant::now();
        let out = f();
        self.record(stage, start.elapsed());
        out
    }

    /// Charge `elapsed` to `stage`.
    pub fn record(&mut self, stage: Stage, elapsed: Duration) {
        if self.enabled {
            let stats = &mut self.stats[stage.index()];
            stats.calls += 1;
            stats.cumulative += elapsed;
        }
    }

    /// Count a full update.
    pub fn full_update(&mut self) {
        if self.enabled {
            self.full_updates = self.full_updates.saturating_add(1);
        }
    }

    /// Full updates counted so far.
    #[must_use]
    pub const fn full_updates(&self) -> u32 {
        self.full_updates
    }

    /// Enough full updates were profiled; the loop should report and stop.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.enabled && self.full_updates >= self.report_after
    }

    /// Totals for one stage.
    #[must_use]
    pub const fn stats(&self, stage: Stage) -> StageStats {
        self.stats[stage.index()]
    }

    /// Stages ordered by cumulative time, largest first.
    #[must_use]
    pub fn ranked(&self) -> Vec<(Stage, StageStats)> {
        let mut ranked: Vec<_> = Stage::ALL.iter().map(|&s| (s, self.stats(s))).collect();
        ranked.sort_by(|a, b| b.1.cumulative.cmp(&a.1.cumulative));
        ranked
    }

    /// Plain-text report sorted by cumulative time.
    #[must_use]
    pub fn report(&self) -> String {
        let wall = self.started.elapsed();
        let total: Duration = self.stats.iter().map(|s| s.cumulative).sum();

        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} full updates profiled in {:.3} s ({:.3} s in timed stages)",
            self.full_updates,
            wall.as_secs_f64(),
            total.as_secs_f64()
        );
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{:<12} {:>8} {:>14} {:>14} {:>7}",
            "stage", "calls", "cumtime (s)", "percall (ms)", "share"
        );

        for (stage, stats) in self.ranked() {
            let share = if total.is_zero() {
                0.0
            } else {
                stats.cumulative.as_secs_f64() / total.as_secs_f64() * 100.0
            };
            let _ = writeln!(
                out,
                "{:<12} {:>8} {:>14.4} {:>14.3} {:>6.1}%",
                stage.name(),
                stats.calls,
                stats.cumulative.as_secs_f64(),
                stats.per_call().as_secs_f64() * 1000.0,
                share
            );
        }
        out
    }

    /// Write [`Profiler::report`] to `folder/profiling_stats.txt`.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder or file cannot be written.
    pub fn write_report(&self, folder: &Path) -> Result<PathBuf> {
        fs::create_dir_all(folder)?;
        let path = folder.join(REPORT_FILE);
        fs::write(&path, self.report())?;
        log::info!("wrote profiling statistics to {}", path.display());
        Ok(path)
    }
}

impl Default for Profiler {
    fn default() -> Self {
        Self::disabled()
    }
}
