//! Thermal image artist.
//!
//! Draws a temperature [`Grid`] as colored cells into a pixel box. Each
//! output pixel takes the color of the grid cell under it (nearest
//! sampling), so a 24x32 grid drawn into a 240x320 box gives 10x10 blocks
//! and an already-interpolated 240x320 grid maps one to one.

use crate::error::Result;
use crate::frame::Grid;
use crate::framebuffer::Framebuffer;
use crate::geometry::Rect;
use crate::scale::{ColorScale, Palette, Scale};

/// Heatmap of one temperature grid with adjustable color limits.
#[derive(Debug, Clone)]
pub struct ThermalImage {
    scale: ColorScale,
}

impl ThermalImage {
    /// Create an artist for `palette` with initial limits `clim` (Celsius).
    ///
    /// # Errors
    ///
    /// Returns an error if the limits are not finite or are equal.
    pub fn new(palette: Palette, clim: (f32, f32)) -> Result<Self> {
        Ok(Self { scale: ColorScale::from_palette(palette, clim)? })
    }

    /// Change the color limits.
    ///
    /// # Errors
    ///
    /// Returns an error if the limits are not finite.
    pub fn set_clim(&mut self, min: f32, max: f32) -> Result<()> {
        self.scale = self.scale.with_limits(min, max)?;
        Ok(())
    }

    /// Current color limits.
    #[must_use]
    pub fn clim(&self) -> (f32, f32) {
        self.scale.domain()
    }

    /// The value-to-color mapping in use.
    #[must_use]
    pub fn color_scale(&self) -> &ColorScale {
        &self.scale
    }

    /// Draw `grid` stretched over `rect`.
    pub fn draw(&self, fb: &mut Framebuffer, grid: &Grid, rect: Rect) {
        let rect = rect.clip(fb.width(), fb.height());
        if rect.is_empty() {
            return;
        }

        let (rows, cols) = (grid.rows(), grid.cols());
        let col_of: Vec<usize> = (0..rect.width)
            .map(|px| ((px as usize * cols) / rect.width as usize).min(cols - 1))
            .collect();

        for py in 0..rect.height {
            let row = ((py as usize * rows) / rect.height as usize).min(rows - 1);
            let values = grid.row(row);

            let mut run_start = 0u32;
            while run_start < rect.width {
                // Adjacent pixels of the same cell share one color lookup
                let cell = col_of[run_start as usize];
                let mut run_end = run_start + 1;
                while run_end < rect.width && col_of[run_end as usize] == cell {
                    run_end += 1;
                }

                let color = self.scale.scale(values[cell]);
                fb.fill_rect(
                    Rect::new(rect.x + run_start, rect.y + py, run_end - run_start, 1),
                    color,
                );
                run_start = run_end;
            }
        }
    }
}
