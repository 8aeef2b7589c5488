//! Log setup.
//!
//! With debug output on, records at `debug` and above go to stderr.
//! Otherwise warnings and errors are appended to the configured log file
//! so they do not tear the live terminal view. `RUST_LOG` overrides the
//! level either way.

use crate::error::Result;
use env_logger::{Builder, Env, Target};
use log::LevelFilter;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::time::Instant;

/// Where log records go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget<'a> {
    /// Standard error.
    Stderr,
    /// Append to a file.
    File(&'a Path),
}

/// Default level for a run.
#[must_use]
pub const fn default_level(debug: bool) -> LevelFilter {
    if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}

/// Build a logger writing to `target` at `level` unless `RUST_LOG` says
/// otherwise.
///
/// Records look like `[+0012ms] WARN  [pithermcam::sensor:161] message`.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened.
pub fn builder(target: LogTarget<'_>, level: LevelFilter) -> Result<Builder> {
    let mut builder = Builder::from_env(Env::default().default_filter_or(level.as_str()));

    let start = Instant::now();
    builder.format(move |buf, record| {
        writeln!(
            buf,
            "[+{:04}ms] {:<5} [{}:{}] {}",
            start.elapsed().as_millis(),
            record.level(),
            record.module_path().unwrap_or("?"),
            record.line().unwrap_or(0),
            record.args()
        )
    });

    match target {
        LogTarget::Stderr => {
            builder.target(Target::Stderr);
        }
        LogTarget::File(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.target(Target::Pipe(Box::new(file)));
        }
    }

    Ok(builder)
}

/// Install the global logger.
///
/// A second call is a no-op.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened.
pub fn init(debug: bool, log_file: &Path) -> Result<()> {
    let target = if debug { LogTarget::Stderr } else { LogTarget::File(log_file) };
    let mut builder = builder(target, default_level(debug))?;

    // Already installed, e.g. by a test harness
    if builder.try_init().is_err() {
        log::debug!("logger already initialized");
    }
    Ok(())
}
