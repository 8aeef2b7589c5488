//! Terminal output encoder (Unicode half blocks + ANSI 24-bit color).
//!
//! Each character cell shows two vertically stacked pixels: the upper half
//! block `▀` in the foreground color and the background color below it. The
//! encoder works line by line so a display can rewrite only the terminal
//! rows that cover a damaged area of the framebuffer.

use crate::framebuffer::Framebuffer;
use crate::geometry::Rect;
use std::fmt::Write as FmtWrite;
use std::ops::Range;

/// Terminal encoder configuration.
#[derive(Debug, Clone, Default)]
pub struct TerminalEncoder {
    width: Option<u32>,
    height: Option<u32>,
}

impl TerminalEncoder {
    /// Create a new terminal encoder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target width in characters.
    /// If not set, uses framebuffer width capped at 80.
    #[must_use]
    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width.max(1));
        self
    }

    /// Set the target height in terminal lines.
    /// If not set, calculates from width to preserve aspect ratio.
    #[must_use]
    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height.max(1));
        self
    }

    /// Largest size that fits `max_cols` x `max_lines` while keeping the
    /// framebuffer's aspect ratio.
    #[must_use]
    pub fn fit(self, fb: &Framebuffer, max_cols: u32, max_lines: u32) -> Self {
        let fb_aspect = fb.width() as f32 / fb.height() as f32;
        let max_cols = max_cols.max(1);
        let max_lines = max_lines.max(1);

        // One line holds two pixel rows
        let cols_for_lines = (max_lines as f32 * 2.0 * fb_aspect).floor() as u32;
        let cols = max_cols.min(cols_for_lines).max(1);
        let lines = ((cols as f32 / fb_aspect) / 2.0).ceil() as u32;
        self.width(cols).height(lines.min(max_lines))
    }

    /// Output size in (characters, lines).
    #[must_use]
    pub fn dimensions(&self, fb: &Framebuffer) -> (u32, u32) {
        let fb_aspect = fb.width() as f32 / fb.height() as f32;

        match (self.width, self.height) {
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) => (w, half_lines(w as f32 / fb_aspect)),
            (None, Some(h)) => (((h * 2) as f32 * fb_aspect).round().max(1.0) as u32, h),
            (None, None) => {
                let w = 80u32.min(fb.width());
                (w, half_lines(w as f32 / fb_aspect))
            }
        }
    }

    /// Render a framebuffer to a string, one terminal line per text line.
    #[must_use]
    pub fn render(&self, fb: &Framebuffer) -> String {
        let mut output = String::new();
        for line in self.render_lines(fb) {
            output.push_str(&line);
            output.push('\n');
        }
        output
    }

    /// Render every terminal line.
    #[must_use]
    pub fn render_lines(&self, fb: &Framebuffer) -> Vec<String> {
        let (_, lines) = self.dimensions(fb);
        self.render_range(fb, 0..lines).into_iter().map(|(_, line)| line).collect()
    }

    /// Render the terminal lines in `lines`, tagged with their index.
    #[must_use]
    pub fn render_range(&self, fb: &Framebuffer, lines: Range<u32>) -> Vec<(u32, String)> {
        let (target_w, target_lines) = self.dimensions(fb);
        let scale_x = fb.width() as f32 / target_w as f32;
        let scale_y = fb.height() as f32 / (target_lines * 2) as f32;

        lines
            .filter(|line| *line < target_lines)
            .map(|line| {
                let mut output = String::with_capacity(target_w as usize * 40 + 4);
                let y = line * 2;
                for x in 0..target_w {
                    let top = sample_color(fb, x, y, scale_x, scale_y);
                    let bottom = sample_color(fb, x, y + 1, scale_x, scale_y);

                    // ▀ U+2580 = upper half block
                    let _ = write!(
                        output,
                        "\x1b[38;2;{};{};{}m\x1b[48;2;{};{};{}m▀",
                        top.0, top.1, top.2, bottom.0, bottom.1, bottom.2
                    );
                }
                output.push_str("\x1b[0m");
                (line, output)
            })
            .collect()
    }

    /// Terminal lines that show any pixel of `rect`.
    #[must_use]
    pub fn lines_covering(&self, fb: &Framebuffer, rect: Rect) -> Range<u32> {
        let (_, target_lines) = self.dimensions(fb);
        if rect.is_empty() {
            return 0..0;
        }
        let pixels_per_line = fb.height() as f32 / target_lines as f32;

        let start = (rect.y as f32 / pixels_per_line).floor() as u32;
        let end = (rect.bottom() as f32 / pixels_per_line).ceil() as u32;
        start.min(target_lines)..end.min(target_lines)
    }
}

/// Lines needed for `pixel_rows` rows at two rows per line.
fn half_lines(pixel_rows: f32) -> u32 {
    ((pixel_rows / 2.0).round() as u32).max(1)
}

/// Sample color at a scaled position.
fn sample_color(fb: &Framebuffer, x: u32, y: u32, scale_x: f32, scale_y: f32) -> (u8, u8, u8) {
    let fx = (x as f32 * scale_x).min((fb.width() - 1) as f32);
    let fy = (y as f32 * scale_y).min((fb.height() - 1) as f32);

    fb.get_pixel(fx as u32, fy as u32).map_or((0, 0, 0), |p| (p.r, p.g, p.b))
}
