//! RGBA pixel buffer the figure is drawn into.
//!
//! Besides plain pixel access this provides the two primitives blitting is
//! built on: saving a rectangular region ([`Framebuffer::copy_region`]) and
//! writing it back later ([`Framebuffer::restore_region`]).

use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::geometry::Rect;

/// Row alignment in bytes.
const ROW_ALIGNMENT: usize = 64;

/// Row-aligned RGBA framebuffer.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    /// Width in pixels.
    width: u32,
    /// Height in pixels.
    height: u32,
    /// RGBA pixels in row-major order, `stride` bytes per row.
    pixels: Vec<u8>,
    /// Stride in bytes (may include padding for alignment).
    stride: usize,
}

/// A saved copy of a rectangular part of a framebuffer.
///
/// Produced by [`Framebuffer::copy_region`]; the pixels are tightly packed.
#[derive(Debug, Clone)]
pub struct Region {
    rect: Rect,
    pixels: Vec<u8>,
}

impl Region {
    /// The area this region was copied from.
    #[must_use]
    pub const fn rect(&self) -> Rect {
        self.rect
    }
}

impl Framebuffer {
    /// Create a new framebuffer with the given dimensions.
    ///
    /// # Errors
    ///
    /// Returns an error if width or height is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use pithermcam::framebuffer::Framebuffer;
    ///
    /// let fb = Framebuffer::new(320, 240).unwrap();
    /// assert_eq!(fb.width(), 320);
    /// assert_eq!(fb.height(), 240);
    /// ```
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }

        let row_bytes = (width as usize) * 4;
        let stride = (row_bytes + ROW_ALIGNMENT - 1) & !(ROW_ALIGNMENT - 1);

        Ok(Self { width, height, pixels: vec![0; stride * (height as usize)], stride })
    }

    /// Get the width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Get the height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Get the stride (row width in bytes, including any padding).
    #[must_use]
    pub const fn stride(&self) -> usize {
        self.stride
    }

    /// The whole surface as a rectangle.
    #[must_use]
    pub const fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// Get a row of pixels as a slice.
    #[must_use]
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = (y as usize) * self.stride;
        Some(&self.pixels[start..start + (self.width as usize) * 4])
    }

    /// Clear the framebuffer to a solid color.
    pub fn clear(&mut self, color: Rgba) {
        self.fill_rect(self.bounds(), color);
    }

    /// Fill a rectangular region with a solid color.
    ///
    /// The rectangle is clipped to the framebuffer bounds.
    pub fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        let rect = rect.clip(self.width, self.height);
        if rect.is_empty() {
            return;
        }

        let rgba = color.to_array();
        for row_y in rect.y..rect.bottom() {
            let start = self.pixel_index(rect.x, row_y);
            let row = &mut self.pixels[start..start + (rect.width as usize) * 4];
            for chunk in row.chunks_exact_mut(4) {
                chunk.copy_from_slice(&rgba);
            }
        }
    }

    /// Draw a one-pixel rectangle outline.
    pub fn stroke_rect(&mut self, rect: Rect, color: Rgba) {
        if rect.is_empty() {
            return;
        }
        self.fill_rect(Rect::new(rect.x, rect.y, rect.width, 1), color);
        self.fill_rect(Rect::new(rect.x, rect.bottom() - 1, rect.width, 1), color);
        self.fill_rect(Rect::new(rect.x, rect.y, 1, rect.height), color);
        self.fill_rect(Rect::new(rect.right() - 1, rect.y, 1, rect.height), color);
    }

    /// Get the color at a specific pixel coordinate.
    ///
    /// Returns `None` if the coordinates are out of bounds.
    #[must_use]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let idx = self.pixel_index(x, y);
        Some(Rgba::from_array([
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]))
    }

    /// Set the color at a specific pixel coordinate.
    ///
    /// Does nothing if the coordinates are out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }

        let idx = self.pixel_index(x, y);
        self.pixels[idx..idx + 4].copy_from_slice(&color.to_array());
    }

    /// Save the pixels under `rect` (clipped to the surface).
    #[must_use]
    pub fn copy_region(&self, rect: Rect) -> Region {
        let rect = rect.clip(self.width, self.height);
        let row_bytes = (rect.width as usize) * 4;
        let mut pixels = Vec::with_capacity(row_bytes * rect.height as usize);

        for row_y in rect.y..rect.bottom() {
            let start = self.pixel_index(rect.x, row_y);
            pixels.extend_from_slice(&self.pixels[start..start + row_bytes]);
        }

        Region { rect, pixels }
    }

    /// Write a previously saved region back to where it was copied from.
    ///
    /// # Errors
    ///
    /// Returns an error if the region does not fit this framebuffer.
    pub fn restore_region(&mut self, region: &Region) -> Result<()> {
        let rect = region.rect;
        if rect.right() > self.width || rect.bottom() > self.height {
            return Err(Error::InvalidDimensions { width: rect.right(), height: rect.bottom() });
        }

        let row_bytes = (rect.width as usize) * 4;
        for (i, row_y) in (rect.y..rect.bottom()).enumerate() {
            let start = self.pixel_index(rect.x, row_y);
            self.pixels[start..start + row_bytes]
                .copy_from_slice(&region.pixels[i * row_bytes..(i + 1) * row_bytes]);
        }

        Ok(())
    }

    /// Nearest-neighbour upscale by an integer factor.
    ///
    /// # Errors
    ///
    /// Returns an error if `factor` is zero.
    pub fn upscale(&self, factor: u32) -> Result<Self> {
        if factor == 0 {
            return Err(Error::InvalidDimensions { width: 0, height: 0 });
        }
        if factor == 1 {
            return Ok(self.clone());
        }

        let mut out = Self::new(self.width * factor, self.height * factor)?;
        for y in 0..out.height {
            let src_start = ((y / factor) as usize) * self.stride;
            let dst_start = (y as usize) * out.stride;
            for x in 0..out.width as usize {
                let src = src_start + (x / factor as usize) * 4;
                let dst = dst_start + x * 4;
                out.pixels[dst..dst + 4].copy_from_slice(&self.pixels[src..src + 4]);
            }
        }

        Ok(out)
    }

    /// Calculate the byte index for a pixel coordinate.
    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        (y as usize) * self.stride + (x as usize) * 4
    }

    /// Get pixel data as a compact buffer without stride padding.
    ///
    /// This is what PNG encoding expects.
    #[must_use]
    pub fn to_compact_pixels(&self) -> Vec<u8> {
        let row_bytes = (self.width as usize) * 4;

        if self.stride == row_bytes {
            return self.pixels[..row_bytes * (self.height as usize)].to_vec();
        }

        let mut compact = Vec::with_capacity(row_bytes * (self.height as usize));
        for y in 0..self.height {
            let start = (y as usize) * self.stride;
            compact.extend_from_slice(&self.pixels[start..start + row_bytes]);
        }
        compact
    }
}
