//! Figure: thermal image axes plus colorbar on a face-colored canvas.
//!
//! The static parts (face, axes frame, colorbar title) are drawn once. The
//! empty axes are then saved, and every [`Figure::update`] restores that
//! saved background before drawing the new image, so only the axes box has
//! to be pushed to the display. A full update additionally recomputes the
//! color limits from the data and redraws the colorbar.

use crate::color::Rgba;
use crate::error::Result;
use crate::frame::Grid;
use crate::framebuffer::{Framebuffer, Region};
use crate::geometry::Rect;
use crate::render::colorbar::{Colorbar, ColorbarLayout};
use crate::render::font;
use crate::render::image::ThermalImage;
use crate::scale::Palette;
use crate::temperature::TemperatureUnit;

/// Padding around the figure content.
const MARGIN: u32 = 12;
/// Space between the axes and the colorbar.
const COLORBAR_GAP: u32 = 14;
/// Colorbar width.
const COLORBAR_WIDTH: u32 = 14;
/// Space between tick labels and the title.
const TITLE_GAP: u32 = 6;

/// Pixel positions of every figure element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FigureLayout {
    /// Canvas width.
    pub width: u32,
    /// Canvas height.
    pub height: u32,
    /// Where the thermal image goes.
    pub axes: Rect,
    /// Colorbar parts.
    pub colorbar: ColorbarLayout,
}

impl FigureLayout {
    /// Lay out a figure whose axes are `axes_width` x `axes_height` pixels.
    #[must_use]
    pub fn new(axes_width: u32, axes_height: u32) -> Self {
        let half_text = font::text_height(1).div_ceil(2);

        let axes = Rect::new(MARGIN, MARGIN, axes_width, axes_height);
        let bar = Rect::new(axes.right() + COLORBAR_GAP, MARGIN, COLORBAR_WIDTH, axes_height);
        let ticks = Rect::new(
            bar.right() + 1,
            MARGIN - half_text,
            ColorbarLayout::tick_area_width(),
            axes_height + 2 * half_text,
        );
        let title = Rect::new(ticks.right() + TITLE_GAP, MARGIN, font::GLYPH_HEIGHT, axes_height);

        Self {
            width: title.right() + MARGIN,
            height: axes_height + 2 * MARGIN,
            axes,
            colorbar: ColorbarLayout { bar, ticks, title },
        }
    }

    /// One-pixel frame drawn around the axes.
    #[must_use]
    pub const fn axes_frame(&self) -> Rect {
        Rect::new(self.axes.x - 1, self.axes.y - 1, self.axes.width + 2, self.axes.height + 2)
    }
}

/// Appearance shared by every figure of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureStyle {
    /// Image palette.
    pub palette: Palette,
    /// Colorbar units.
    pub units: TemperatureUnit,
    /// Canvas background.
    pub face: Rgba,
}

impl Default for FigureStyle {
    fn default() -> Self {
        Self { palette: Palette::default(), units: TemperatureUnit::default(), face: Rgba::FACE }
    }
}

/// A thermal image with colorbar, rendered into its own framebuffer.
#[derive(Debug, Clone)]
pub struct Figure {
    fb: Framebuffer,
    layout: FigureLayout,
    image: ThermalImage,
    colorbar: Colorbar,
    background: Region,
}

impl Figure {
    /// Draw the static figure with initial color limits `clim` (Celsius) and
    /// cache the empty axes.
    ///
    /// # Errors
    ///
    /// Returns an error if the axes are empty or `clim` is invalid.
    pub fn new(
        axes_width: u32,
        axes_height: u32,
        style: &FigureStyle,
        clim: (f32, f32),
    ) -> Result<Self> {
        let layout = FigureLayout::new(axes_width, axes_height);
        let mut fb = Framebuffer::new(layout.width, layout.height)?;
        let image = ThermalImage::new(style.palette, clim)?;
        let colorbar = Colorbar::new(style.units, style.face);

        fb.clear(style.face);
        fb.stroke_rect(layout.axes_frame(), Rgba::BLACK);
        fb.fill_rect(layout.axes, Rgba::WHITE);
        colorbar.draw_title(&mut fb, &layout.colorbar);
        colorbar.draw(&mut fb, &layout.colorbar, image.color_scale())?;

        let background = fb.copy_region(layout.axes);
        log::debug!(
            "figure {}x{} with {}x{} axes, clim {:?}",
            layout.width,
            layout.height,
            axes_width,
            axes_height,
            clim
        );

        Ok(Self { fb, layout, image, colorbar, background })
    }

    /// Redraw the image from `grid` and return the area that changed.
    ///
    /// A full update first sets the color limits to the data range and
    /// redraws the colorbar; a partial one keeps the current limits and only
    /// touches the axes.
    ///
    /// # Errors
    ///
    /// Returns an error if the grid holds non-finite values during a full
    /// update.
    pub fn update(&mut self, grid: &Grid, full_update: bool) -> Result<Rect> {
        let mut damage = self.layout.axes;

        if full_update {
            let extent = grid.extent();
            self.set_clim(extent.min, extent.max)?;
            damage = damage.union(&self.layout.colorbar.dynamic_area());
        }

        self.fb.restore_region(&self.background)?;
        self.image.draw(&mut self.fb, grid, self.layout.axes);

        Ok(damage)
    }

    /// Change the color limits and redraw the colorbar.
    ///
    /// # Errors
    ///
    /// Returns an error if the limits are not finite.
    pub fn set_clim(&mut self, min: f32, max: f32) -> Result<()> {
        self.image.set_clim(min, max)?;
        self.colorbar.draw(&mut self.fb, &self.layout.colorbar, self.image.color_scale())
    }

    /// Current color limits in Celsius.
    #[must_use]
    pub fn clim(&self) -> (f32, f32) {
        self.image.clim()
    }

    /// The rendered canvas.
    #[must_use]
    pub const fn framebuffer(&self) -> &Framebuffer {
        &self.fb
    }

    /// Element positions.
    #[must_use]
    pub const fn layout(&self) -> &FigureLayout {
        &self.layout
    }
}
