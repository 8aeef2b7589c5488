//! Vertical colorbar with tick labels and a rotated title.

use crate::color::Rgba;
use crate::error::Result;
use crate::framebuffer::Framebuffer;
use crate::geometry::Rect;
use crate::render::font;
use crate::scale::{widen_degenerate, ColorScale, LinearScale, Scale};
use crate::temperature::TemperatureUnit;

/// Tick mark length in pixels.
const TICK_LENGTH: u32 = 4;
/// Approximate number of labelled ticks.
const TARGET_TICKS: usize = 6;
/// Gap between a tick mark and its label.
const LABEL_GAP: u32 = 3;
/// Widest tick label the layout reserves room for.
pub const WIDEST_LABEL: &str = "-000.00";

/// Where the parts of a colorbar go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorbarLayout {
    /// The gradient itself.
    pub bar: Rect,
    /// Tick marks and tick labels to the right of the bar.
    pub ticks: Rect,
    /// Rotated title to the right of the labels.
    pub title: Rect,
}

impl ColorbarLayout {
    /// Width needed for tick marks plus labels.
    #[must_use]
    pub fn tick_area_width() -> u32 {
        TICK_LENGTH + LABEL_GAP + font::text_width(WIDEST_LABEL, 1)
    }

    /// Everything that changes when the color limits change.
    #[must_use]
    pub fn dynamic_area(&self) -> Rect {
        self.bar.union(&self.ticks)
    }
}

/// Colorbar artist.
#[derive(Debug, Clone)]
pub struct Colorbar {
    units: TemperatureUnit,
    face: Rgba,
    ink: Rgba,
}

impl Colorbar {
    /// A colorbar labelled in `units`, drawn over a `face` background.
    #[must_use]
    pub fn new(units: TemperatureUnit, face: Rgba) -> Self {
        Self { units, face, ink: Rgba::BLACK }
    }

    /// Title text, e.g. `Temperature [°C]`.
    #[must_use]
    pub fn title(&self) -> String {
        self.units.axis_label()
    }

    /// Draw the static title.
    pub fn draw_title(&self, fb: &mut Framebuffer, layout: &ColorbarLayout) {
        let text = self.title();
        let length = font::text_width(&text, 1);
        let y = layout.title.y + layout.title.height.saturating_sub(length) / 2;
        font::draw_text_vertical(fb, layout.title.x, y, &text, self.ink, 1);
    }

    /// Redraw gradient, ticks and labels for the limits of `scale`.
    ///
    /// # Errors
    ///
    /// Returns an error if the limits cannot be mapped onto the bar.
    pub fn draw(
        &self,
        fb: &mut Framebuffer,
        layout: &ColorbarLayout,
        scale: &ColorScale,
    ) -> Result<()> {
        let bar = layout.bar;
        let (lo, hi) = scale.domain();

        fb.fill_rect(layout.ticks, self.face);

        // Gradient, hottest at the top
        for row in 0..bar.height {
            let t = (row as f32 + 0.5) / bar.height as f32;
            let value = hi - t * (hi - lo);
            fb.fill_rect(Rect::new(bar.x, bar.y + row, bar.width, 1), scale.scale(value));
        }
        fb.stroke_rect(bar, self.ink);

        let shown = widen_degenerate(self.units.from_celsius(lo), self.units.from_celsius(hi));
        let position = LinearScale::new(shown, ((bar.bottom() - 1) as f32, bar.y as f32))?;
        let ticks = position.nice_ticks(TARGET_TICKS);
        let decimals = tick_decimals(&ticks);

        let (top, bottom) = (bar.y as f32, (bar.bottom() - 1) as f32);
        let text_h = font::text_height(1);
        for tick in ticks {
            let y = position.scale(tick).round().clamp(top, bottom) as u32;
            fb.fill_rect(Rect::new(layout.ticks.x, y, TICK_LENGTH, 1), self.ink);

            let label = format!("{tick:.decimals$}");
            let label_y = y
                .saturating_sub(text_h / 2)
                .min(layout.ticks.bottom().saturating_sub(text_h))
                .max(layout.ticks.y);
            let label_x = layout.ticks.x + TICK_LENGTH + LABEL_GAP;
            font::draw_text(fb, label_x, label_y, &label, self.ink, 1);
        }

        Ok(())
    }
}

/// Decimal places needed to tell neighbouring ticks apart.
fn tick_decimals(ticks: &[f32]) -> usize {
    let step = match ticks {
        [a, b, ..] => (b - a).abs(),
        _ => return 1,
    };
    if step >= 1.0 {
        0
    } else if step >= 0.1 {
        1
    } else {
        2
    }
}
