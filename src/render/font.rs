//! Fixed 5x7 bitmap font for tick labels and the colorbar title.
//!
//! Only the characters the figure prints are defined: digits, sign and
//! decimal point, the degree sign, brackets, unit letters and the letters of
//! "Temperature". Anything else advances the pen without drawing.

use crate::color::Rgba;
use crate::framebuffer::Framebuffer;
use crate::geometry::Rect;

/// Glyph width in font pixels.
pub const GLYPH_WIDTH: u32 = 5;
/// Glyph height in font pixels.
pub const GLYPH_HEIGHT: u32 = 7;
/// Horizontal pen advance per character, including spacing.
pub const ADVANCE: u32 = GLYPH_WIDTH + 1;

/// Rows top to bottom; bit 4 is the leftmost column.
type Glyph = [u8; GLYPH_HEIGHT as usize];

#[rustfmt::skip]
const GLYPHS: &[(char, Glyph)] = &[
    ('0', [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110]),
    ('1', [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110]),
    ('2', [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111]),
    ('3', [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110]),
    ('4', [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010]),
    ('5', [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110]),
    ('6', [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110]),
    ('7', [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000]),
    ('8', [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110]),
    ('9', [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100]),
    ('-', [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000]),
    ('.', [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100]),
    (':', [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000]),
    ('°', [0b01100, 0b10010, 0b10010, 0b01100, 0b00000, 0b00000, 0b00000]),
    ('[', [0b01110, 0b01000, 0b01000, 0b01000, 0b01000, 0b01000, 0b01110]),
    (']', [0b01110, 0b00010, 0b00010, 0b00010, 0b00010, 0b00010, 0b01110]),
    ('C', [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110]),
    ('F', [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000]),
    ('K', [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001]),
    ('T', [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100]),
    ('a', [0b00000, 0b00000, 0b01110, 0b00001, 0b01111, 0b10001, 0b01111]),
    ('e', [0b00000, 0b00000, 0b01110, 0b10001, 0b11111, 0b10000, 0b01110]),
    ('m', [0b00000, 0b00000, 0b11010, 0b10101, 0b10101, 0b10001, 0b10001]),
    ('p', [0b00000, 0b00000, 0b11110, 0b10001, 0b11110, 0b10000, 0b10000]),
    ('r', [0b00000, 0b00000, 0b10110, 0b11001, 0b10000, 0b10000, 0b10000]),
    ('t', [0b01000, 0b01000, 0b11100, 0b01000, 0b01000, 0b01001, 0b00110]),
    ('u', [0b00000, 0b00000, 0b10001, 0b10001, 0b10001, 0b10011, 0b01101]),
];

/// Bitmap for `c`, if the font has one.
#[must_use]
pub fn glyph(c: char) -> Option<&'static Glyph> {
    GLYPHS.iter().find(|(g, _)| *g == c).map(|(_, bits)| bits)
}

/// Width in pixels of `text` drawn at `scale`.
#[must_use]
pub fn text_width(text: &str, scale: u32) -> u32 {
    let chars = text.chars().count() as u32;
    if chars == 0 {
        return 0;
    }
    (chars * ADVANCE - 1) * scale
}

/// Height in pixels of one line of text at `scale`.
#[must_use]
pub const fn text_height(scale: u32) -> u32 {
    GLYPH_HEIGHT * scale
}

/// Draw `text` left to right with its top-left corner at (`x`, `y`).
///
/// Returns the box the text occupies.
pub fn draw_text(
    fb: &mut Framebuffer,
    x: u32,
    y: u32,
    text: &str,
    color: Rgba,
    scale: u32,
) -> Rect {
    for (i, c) in text.chars().enumerate() {
        let Some(bits) = glyph(c) else { continue };
        let pen = x + i as u32 * ADVANCE * scale;

        for_each_set_pixel(bits, |gx, gy| {
            fb.fill_rect(Rect::new(pen + gx * scale, y + gy * scale, scale, scale), color);
        });
    }

    Rect::new(x, y, text_width(text, scale), text_height(scale))
}

/// Draw `text` rotated 90 degrees counter-clockwise (reading bottom to
/// top), with the top-left corner of its box at (`x`, `y`).
///
/// Returns the box the text occupies.
pub fn draw_text_vertical(
    fb: &mut Framebuffer,
    x: u32,
    y: u32,
    text: &str,
    color: Rgba,
    scale: u32,
) -> Rect {
    let length = text_width(text, scale);

    for (i, c) in text.chars().enumerate() {
        let Some(bits) = glyph(c) else { continue };
        let pen = i as u32 * ADVANCE * scale;

        for_each_set_pixel(bits, |gx, gy| {
            let along = pen + gx * scale;
            let cell = Rect::new(x + gy * scale, y + length - along - scale, scale, scale);
            fb.fill_rect(cell, color);
        });
    }

    Rect::new(x, y, text_height(scale), length)
}

fn for_each_set_pixel(bits: &Glyph, mut f: impl FnMut(u32, u32)) {
    for (gy, row) in bits.iter().enumerate() {
        for gx in 0..GLYPH_WIDTH {
            if row & (1 << (GLYPH_WIDTH - 1 - gx)) != 0 {
                f(gx, gy as u32);
            }
        }
    }
}
