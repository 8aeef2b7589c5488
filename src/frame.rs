//! Temperature frames and grids.
//!
//! A [`Frame`] is the raw 768-value buffer the sensor writes into. It is
//! allocated once per run mode and overwritten on every acquisition. For
//! display it is reshaped into a 24x32 [`Grid`] and mirrored left-to-right,
//! since the sensor looks at the scene from the opposite side.

use crate::error::{Error, Result};
use crate::interp::{self, Interpolation};
use trueno::Vector;

/// Sensor rows.
pub const FRAME_ROWS: usize = 24;
/// Sensor columns.
pub const FRAME_COLS: usize = 32;
/// Pixels per frame.
pub const FRAME_PIXELS: usize = FRAME_ROWS * FRAME_COLS;

/// Minimum and maximum of a set of readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    /// Smallest value.
    pub min: f32,
    /// Largest value.
    pub max: f32,
}

impl Extent {
    fn of(values: &[f32]) -> Self {
        let vec = Vector::from_vec(values.to_vec());
        let min =
            vec.min().unwrap_or_else(|_| values.iter().copied().fold(f32::INFINITY, f32::min));
        let max =
            vec.max().unwrap_or_else(|_| values.iter().copied().fold(f32::NEG_INFINITY, f32::max));
        Self { min, max }
    }

    /// `max - min`.
    #[must_use]
    pub fn span(&self) -> f32 {
        self.max - self.min
    }
}

/// One full sensor reading in degrees Celsius, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    values: Box<[f32; FRAME_PIXELS]>,
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl Frame {
    /// A zero-filled frame.
    #[must_use]
    pub fn new() -> Self {
        Self { values: Box::new([0.0; FRAME_PIXELS]) }
    }

    /// Build a frame from exactly [`FRAME_PIXELS`] values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataLengthMismatch`] for any other length.
    pub fn from_slice(values: &[f32]) -> Result<Self> {
        if values.len() != FRAME_PIXELS {
            return Err(Error::DataLengthMismatch { expected: FRAME_PIXELS, actual: values.len() });
        }
        let mut frame = Self::new();
        frame.values.copy_from_slice(values);
        Ok(frame)
    }

    /// The readings.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.values[..]
    }

    /// Mutable access for the sensor to write into.
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.values[..]
    }

    /// Arithmetic mean of all readings.
    ///
    /// Falls back to an `f64` sum when the SIMD sum overflows.
    #[must_use]
    pub fn mean(&self) -> f32 {
        Vector::from_vec(self.values.to_vec())
            .mean()
            .ok()
            .filter(|m| m.is_finite())
            .unwrap_or_else(|| {
                let sum: f64 = self.values.iter().map(|&v| f64::from(v)).sum();
                (sum / FRAME_PIXELS as f64) as f32
            })
    }

    /// Coldest and hottest reading.
    #[must_use]
    pub fn extent(&self) -> Extent {
        Extent::of(self.as_slice())
    }

    /// Reshape into a 24x32 grid.
    #[must_use]
    pub fn to_grid(&self) -> Grid {
        Grid { rows: FRAME_ROWS, cols: FRAME_COLS, data: self.values.to_vec() }
    }

    /// Reshape and mirror left-to-right, ready for display.
    #[must_use]
    pub fn to_display_grid(&self) -> Grid {
        let mut grid = self.to_grid();
        grid.fliplr_in_place();
        grid
    }
}

/// A 2-D matrix of temperatures in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Grid {
    /// Create a grid from row-major data.
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is zero or the data length does
    /// not equal `rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidDimensions { width: cols as u32, height: rows as u32 });
        }
        if data.len() != rows * cols {
            return Err(Error::DataLengthMismatch { expected: rows * cols, actual: data.len() });
        }
        Ok(Self { rows, cols, data })
    }

    /// A grid filled with one value.
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is zero.
    pub fn filled(rows: usize, cols: usize, value: f32) -> Result<Self> {
        Self::from_vec(rows, cols, vec![value; rows * cols])
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Row-major values.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Value at (`row`, `col`), if in bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    /// One row as a slice.
    #[must_use]
    pub fn row(&self, row: usize) -> &[f32] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Mirror left-to-right.
    #[must_use]
    pub fn fliplr(&self) -> Self {
        let mut out = self.clone();
        out.fliplr_in_place();
        out
    }

    /// Mirror left-to-right without allocating.
    pub fn fliplr_in_place(&mut self) {
        for row in self.data.chunks_exact_mut(self.cols) {
            row.reverse();
        }
    }

    /// Coldest and hottest value.
    #[must_use]
    pub fn extent(&self) -> Extent {
        Extent::of(&self.data)
    }

    /// Enlarge each axis by `factor` using the given interpolation.
    ///
    /// # Errors
    ///
    /// Returns an error if `factor` is zero.
    pub fn zoom(&self, factor: usize, method: Interpolation) -> Result<Self> {
        interp::zoom(self, factor, method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn ramp_frame() -> Frame {
        let values: Vec<f32> = (0..FRAME_PIXELS).map(|i| i as f32).collect();
        Frame::from_slice(&values).unwrap()
    }

    #[test]
    fn test_frame_size() {
        assert_eq!(FRAME_PIXELS, 768);
        assert_eq!(Frame::new().as_slice().len(), 768);
    }

    #[test]
    fn test_frame_from_wrong_length() {
        assert!(matches!(
            Frame::from_slice(&[0.0; 767]),
            Err(Error::DataLengthMismatch { expected: 768, actual: 767 })
        ));
    }

    #[test]
    fn test_reshape_is_row_major() {
        let grid = ramp_frame().to_grid();
        assert_eq!(grid.rows(), 24);
        assert_eq!(grid.cols(), 32);
        assert_eq!(grid.get(0, 0), Some(0.0));
        assert_eq!(grid.get(0, 31), Some(31.0));
        assert_eq!(grid.get(1, 0), Some(32.0));
        assert_eq!(grid.get(23, 31), Some(767.0));
        assert_eq!(grid.get(24, 0), None);
    }

    #[test]
    fn test_display_grid_is_mirrored() {
        let grid = ramp_frame().to_display_grid();
        assert_eq!(grid.get(0, 0), Some(31.0));
        assert_eq!(grid.get(0, 31), Some(0.0));
        assert_eq!(grid.get(5, 0), Some(5.0 * 32.0 + 31.0));
    }

    #[test]
    fn test_mean() {
        let frame = ramp_frame();
        assert_relative_eq!(frame.mean(), 383.5, epsilon = 1e-3);
    }

    #[test]
    fn test_mean_of_extreme_readings_stays_finite() {
        let mut frame = Frame::new();
        frame.as_mut_slice().fill(f32::MAX);
        assert_relative_eq!(frame.mean(), f32::MAX, max_relative = 1e-6);

        frame.as_mut_slice()[..FRAME_PIXELS / 2].fill(f32::MIN);
        assert_relative_eq!(frame.mean(), 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_extent() {
        let extent = ramp_frame().extent();
        assert_eq!(extent.min, 0.0);
        assert_eq!(extent.max, 767.0);
        assert_eq!(extent.span(), 767.0);
    }

    #[test]
    fn test_grid_shape_validation() {
        assert!(Grid::from_vec(0, 3, vec![]).is_err());
        assert!(Grid::from_vec(2, 3, vec![0.0; 5]).is_err());
        assert!(Grid::from_vec(2, 3, vec![0.0; 6]).is_ok());
    }

    proptest! {
        #[test]
        fn prop_mean_is_arithmetic_mean(values in prop::collection::vec(-40.0f32..300.0, FRAME_PIXELS)) {
            let frame = Frame::from_slice(&values).unwrap();
            let expected = values.iter().map(|v| f64::from(*v)).sum::<f64>() / FRAME_PIXELS as f64;
            prop_assert!((f64::from(frame.mean()) - expected).abs() < 5e-2,
                "mean {} != {}", frame.mean(), expected);
        }

        #[test]
        fn prop_reshape_is_deterministic(values in prop::collection::vec(-40.0f32..300.0, FRAME_PIXELS)) {
            let frame = Frame::from_slice(&values).unwrap();
            let grid = frame.to_grid();
            prop_assert_eq!(grid.rows(), FRAME_ROWS);
            prop_assert_eq!(grid.cols(), FRAME_COLS);
            prop_assert_eq!(grid.as_slice(), &values[..]);
            prop_assert_eq!(frame.to_grid(), grid);
        }

        #[test]
        fn prop_fliplr_is_involution(
            rows in 1usize..30,
            cols in 1usize..40,
            seed in any::<u32>(),
        ) {
            let data: Vec<f32> = (0..rows * cols)
                .map(|i| ((i as u32).wrapping_mul(2_654_435_761) ^ seed) as f32)
                .collect();
            let grid = Grid::from_vec(rows, cols, data).unwrap();
            prop_assert_eq!(grid.fliplr().fliplr(), grid);
        }
    }
}
