//! Error types for pithermcam operations.

use std::io;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while acquiring, rendering or saving thermal frames.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error (file operations, terminal output).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// PNG encoding error.
    #[error("PNG encoding error: {0}")]
    PngEncoding(#[from] png::EncodingError),

    /// Invalid dimensions for a framebuffer, grid or layout.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// Buffer length does not match the declared shape.
    #[error("Data length mismatch: expected {expected} elements, got {actual}")]
    DataLengthMismatch {
        /// Length implied by the shape.
        expected: usize,
        /// Length actually provided.
        actual: usize,
    },

    /// Empty data provided where non-empty is required.
    #[error("Empty data provided")]
    EmptyData,

    /// Scale domain error (e.g., equal min and max).
    #[error("Scale domain error: {0}")]
    ScaleDomain(String),

    /// Color parsing error.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// The sensor driver reported a non-transient failure.
    #[error("sensor error: {0}")]
    Sensor(String),

    /// Every read attempt in the retry budget failed.
    #[error("sensor did not deliver a frame after {attempts} attempts")]
    SensorTimeout {
        /// Number of attempts made.
        attempts: u32,
    },

    /// Configuration parsing error with line number.
    #[error("configuration error at line {line}: {message}")]
    ConfigParse {
        /// Line number where the error occurred (1-indexed, 0 if unknown).
        line: usize,
        /// Error message describing the issue.
        message: String,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {0}")]
    ConfigNotFound(String),

    /// Invalid configuration value.
    #[error("invalid configuration value for '{key}': {message}")]
    ConfigInvalid {
        /// The configuration key with invalid value.
        key: String,
        /// Error message describing why the value is invalid.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidDimensions { width: 0, height: 100 };
        assert!(err.to_string().contains("Invalid dimensions"));
    }

    #[test]
    fn test_data_length_mismatch() {
        let err = Error::DataLengthMismatch { expected: 768, actual: 767 };
        assert!(err.to_string().contains("768"));
        assert!(err.to_string().contains("767"));
    }

    #[test]
    fn test_sensor_timeout_reports_attempts() {
        let err = Error::SensorTimeout { attempts: 50 };
        assert_eq!(err.to_string(), "sensor did not deliver a frame after 50 attempts");
    }

    #[test]
    fn test_config_parse_reports_line() {
        let err = Error::ConfigParse { line: 4, message: "bad".to_string() };
        assert!(err.to_string().contains("line 4"));
    }

    #[test]
    fn test_io_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
