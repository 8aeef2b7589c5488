//! Color type used by the renderer.
//!
//! 8-bit RGBA with linear interpolation and `#RRGGBB` parsing for the
//! face color set in the configuration file.

use crate::error::{Error, Result};
use std::str::FromStr;

/// RGBA color with 8-bit components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct Rgba {
    /// Red component (0-255).
    pub r: u8,
    /// Green component (0-255).
    pub g: u8,
    /// Blue component (0-255).
    pub b: u8,
    /// Alpha component (0-255, 255 = fully opaque).
    pub a: u8,
}

impl Rgba {
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    /// Opaque red.
    pub const RED: Self = Self::new(255, 0, 0, 255);
    /// Opaque blue.
    pub const BLUE: Self = Self::new(0, 0, 255, 255);
    /// Off-white figure background used for saved snapshots.
    pub const FACE: Self = Self::rgb(0xFC, 0xFC, 0xFC);

    /// Create a new RGBA color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color (alpha = 255).
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Convert to array representation.
    #[must_use]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Create from array representation.
    #[must_use]
    pub const fn from_array(arr: [u8; 4]) -> Self {
        Self::new(arr[0], arr[1], arr[2], arr[3])
    }

    /// Linear interpolation between two colors.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let inv_t = 1.0 - t;

        Self::new(
            (f32::from(self.r) * inv_t + f32::from(other.r) * t).round() as u8,
            (f32::from(self.g) * inv_t + f32::from(other.g) * t).round() as u8,
            (f32::from(self.b) * inv_t + f32::from(other.b) * t).round() as u8,
            (f32::from(self.a) * inv_t + f32::from(other.a) * t).round() as u8,
        )
    }

    /// Parse a `#RRGGBB` or `#RRGGBBAA` hex string.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !(digits.len() == 6 || digits.len() == 8) || !digits.is_ascii() {
            return Err(Error::InvalidColor(hex.to_string()));
        }

        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| Error::InvalidColor(hex.to_string()))
        };

        let alpha = if digits.len() == 8 { channel(6)? } else { 255 };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?, alpha))
    }

    /// Format as `#RRGGBB`.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgba {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_constants() {
        assert_eq!(Rgba::BLACK, Rgba::rgb(0, 0, 0));
        assert_eq!(Rgba::WHITE, Rgba::rgb(255, 255, 255));
        assert_eq!(Rgba::RED.r, 255);
        assert_eq!(Rgba::BLUE.b, 255);
    }

    #[test]
    fn test_rgba_lerp() {
        let mid = Rgba::BLACK.lerp(Rgba::WHITE, 0.5);
        assert_eq!(mid.r, 128);
        assert_eq!(mid.g, 128);
        assert_eq!(mid.b, 128);
    }

    #[test]
    fn test_lerp_boundaries() {
        assert_eq!(Rgba::RED.lerp(Rgba::BLUE, 0.0), Rgba::RED);
        assert_eq!(Rgba::RED.lerp(Rgba::BLUE, 1.0), Rgba::BLUE);
        // Out-of-range t is clamped
        assert_eq!(Rgba::RED.lerp(Rgba::BLUE, 7.0), Rgba::BLUE);
    }

    #[test]
    fn test_from_hex() {
        assert_eq!(Rgba::from_hex("#FCFCFC").unwrap(), Rgba::FACE);
        assert_eq!(Rgba::from_hex("ff000080").unwrap(), Rgba::new(255, 0, 0, 128));
    }

    #[test]
    fn test_from_hex_invalid() {
        assert!(Rgba::from_hex("#FCF").is_err());
        assert!(Rgba::from_hex("#GGGGGG").is_err());
        assert!("#ÿÿÿ".parse::<Rgba>().is_err());
    }

    #[test]
    fn test_hex_round_trip() {
        let c = Rgba::rgb(18, 52, 86);
        assert_eq!(c.to_hex(), "#123456");
        assert_eq!(c.to_hex().parse::<Rgba>().unwrap(), c);
    }
}
