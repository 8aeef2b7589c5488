//! Scale functions for data-to-visual mappings.
//!
//! [`ColorScale`] maps temperatures to palette colors over the current color
//! limits; [`LinearScale`] maps temperatures to pixel positions along the
//! colorbar.

use crate::color::Rgba;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Narrowest limit span drawn as is; anything closer is widened.
pub const MIN_SPAN: f32 = 1e-3;

/// Widen `(min, max)` by half a unit on each side when the span is below
/// [`MIN_SPAN`] relative to the magnitude of the limits.
#[must_use]
pub fn widen_degenerate(min: f32, max: f32) -> (f32, f32) {
    let magnitude = min.abs().max(max.abs()).max(1.0);
    if (max - min).abs() < MIN_SPAN * magnitude {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    }
}

/// Trait for scale functions that map domain values to range values.
pub trait Scale<D, R> {
    /// Transform a domain value to a range value.
    fn scale(&self, value: D) -> R;

    /// Get the domain extent.
    fn domain(&self) -> (D, D);

    /// Get the range extent.
    fn range(&self) -> (R, R);
}

/// Linear scale for continuous-to-continuous mapping.
#[derive(Debug, Clone, Copy)]
pub struct LinearScale {
    domain_min: f32,
    domain_max: f32,
    range_min: f32,
    range_max: f32,
}

impl LinearScale {
    /// Create a new linear scale.
    ///
    /// # Errors
    ///
    /// Returns an error if domain_min equals domain_max.
    pub fn new(domain: (f32, f32), range: (f32, f32)) -> Result<Self> {
        if (domain.0 - domain.1).abs() < f32::EPSILON {
            return Err(Error::ScaleDomain("Domain min and max cannot be equal".to_string()));
        }

        Ok(Self {
            domain_min: domain.0,
            domain_max: domain.1,
            range_min: range.0,
            range_max: range.1,
        })
    }

    /// Round tick values inside the domain, at most roughly `target` of them.
    ///
    /// Steps are 1, 2 or 5 times a power of ten.
    #[must_use]
    pub fn nice_ticks(&self, target: usize) -> Vec<f32> {
        let (lo, hi) = if self.domain_min <= self.domain_max {
            (self.domain_min, self.domain_max)
        } else {
            (self.domain_max, self.domain_min)
        };
        let target = target.max(1);

        let raw_step = (hi - lo) / target as f32;
        let magnitude = 10f32.powf(raw_step.log10().floor());
        let step = [1.0, 2.0, 5.0, 10.0]
            .into_iter()
            .map(|m| m * magnitude)
            .find(|s| *s >= raw_step)
            .unwrap_or(10.0 * magnitude);

        let first = (lo / step).ceil() as i64;
        let last = (hi / step).floor() as i64;
        (first..=last).map(|i| i as f32 * step).collect()
    }
}

impl Scale<f32, f32> for LinearScale {
    fn scale(&self, value: f32) -> f32 {
        let t = (value - self.domain_min) / (self.domain_max - self.domain_min);
        self.range_min + t * (self.range_max - self.range_min)
    }

    fn domain(&self) -> (f32, f32) {
        (self.domain_min, self.domain_max)
    }

    fn range(&self) -> (f32, f32) {
        (self.range_min, self.range_max)
    }
}

/// Color palette for the thermal image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Palette {
    /// Diverging blue-white-red.
    #[default]
    Bwr,
    /// Viridis (perceptually uniform, colorblind-safe).
    Viridis,
    /// Magma (perceptually uniform).
    Magma,
    /// Heat (black-red-yellow-white).
    Heat,
    /// Greyscale.
    Greyscale,
}

impl Palette {
    /// Color stops from low to high.
    #[must_use]
    pub fn stops(self) -> Vec<Rgba> {
        match self {
            Self::Bwr => vec![Rgba::rgb(0, 0, 255), Rgba::WHITE, Rgba::rgb(255, 0, 0)],
            Self::Viridis => vec![
                Rgba::rgb(68, 1, 84),
                Rgba::rgb(59, 82, 139),
                Rgba::rgb(33, 145, 140),
                Rgba::rgb(94, 201, 98),
                Rgba::rgb(253, 231, 37),
            ],
            Self::Magma => vec![
                Rgba::rgb(0, 0, 4),
                Rgba::rgb(81, 18, 124),
                Rgba::rgb(183, 55, 121),
                Rgba::rgb(252, 137, 97),
                Rgba::rgb(252, 253, 191),
            ],
            Self::Heat => vec![
                Rgba::rgb(0, 0, 0),
                Rgba::rgb(128, 0, 0),
                Rgba::rgb(255, 0, 0),
                Rgba::rgb(255, 128, 0),
                Rgba::rgb(255, 255, 0),
                Rgba::rgb(255, 255, 255),
            ],
            Self::Greyscale => vec![Rgba::BLACK, Rgba::WHITE],
        }
    }
}

/// Color scale for mapping values to colors.
#[derive(Debug, Clone)]
pub struct ColorScale {
    colors: Vec<Rgba>,
    domain_min: f32,
    domain_max: f32,
}

impl ColorScale {
    /// Create a new color scale.
    ///
    /// # Errors
    ///
    /// Returns an error if colors is empty or domain is invalid.
    pub fn new(colors: Vec<Rgba>, domain: (f32, f32)) -> Result<Self> {
        if colors.is_empty() {
            return Err(Error::ScaleDomain("Color scale requires at least one color".to_string()));
        }

        if !domain.0.is_finite() || !domain.1.is_finite() {
            return Err(Error::ScaleDomain("Domain must be finite".to_string()));
        }

        if (domain.0 - domain.1).abs() < f32::EPSILON {
            return Err(Error::ScaleDomain("Domain min and max cannot be equal".to_string()));
        }

        Ok(Self { colors, domain_min: domain.0, domain_max: domain.1 })
    }

    /// Create a scale for a palette.
    ///
    /// # Errors
    ///
    /// Returns an error if the domain is invalid.
    pub fn from_palette(palette: Palette, domain: (f32, f32)) -> Result<Self> {
        Self::new(palette.stops(), domain)
    }

    /// Same colors over new limits.
    ///
    /// A degenerate range (all pixels equal) is widened by half a degree on
    /// each side so the image still renders.
    ///
    /// # Errors
    ///
    /// Returns an error if the limits are not finite.
    pub fn with_limits(&self, min: f32, max: f32) -> Result<Self> {
        Self::new(self.colors.clone(), widen_degenerate(min, max))
    }
}

impl Scale<f32, Rgba> for ColorScale {
    fn scale(&self, value: f32) -> Rgba {
        let t = ((value - self.domain_min) / (self.domain_max - self.domain_min)).clamp(0.0, 1.0);

        if self.colors.len() == 1 {
            return self.colors[0];
        }

        let segment_count = self.colors.len() - 1;
        let segment = (t * segment_count as f32).floor() as usize;
        let segment = segment.min(segment_count - 1);

        let local_t = t * segment_count as f32 - segment as f32;

        self.colors[segment].lerp(self.colors[segment + 1], local_t)
    }

    fn domain(&self) -> (f32, f32) {
        (self.domain_min, self.domain_max)
    }

    fn range(&self) -> (Rgba, Rgba) {
        (*self.colors.first().unwrap_or(&Rgba::BLACK), *self.colors.last().unwrap_or(&Rgba::WHITE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_scale() {
        let scale = LinearScale::new((0.0, 100.0), (0.0, 1.0)).expect("operation should succeed");
        assert!((scale.scale(0.0) - 0.0).abs() < 0.001);
        assert!((scale.scale(50.0) - 0.5).abs() < 0.001);
        assert!((scale.scale(100.0) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_linear_scale_inverted_range() {
        // Colorbar: high temperatures at the top (small y)
        let scale = LinearScale::new((20.0, 40.0), (200.0, 0.0)).expect("operation should succeed");
        assert!((scale.scale(40.0) - 0.0).abs() < 0.001);
        assert!((scale.scale(30.0) - 100.0).abs() < 0.001);
    }

    #[test]
    fn test_linear_scale_equal_domain_error() {
        assert!(LinearScale::new((5.0, 5.0), (0.0, 1.0)).is_err());
    }

    #[test]
    fn test_nice_ticks() {
        let scale = LinearScale::new((25.0, 45.0), (0.0, 1.0)).expect("operation should succeed");
        assert_eq!(scale.nice_ticks(5), vec![25.0, 30.0, 35.0, 40.0, 45.0]);

        let scale = LinearScale::new((21.3, 23.9), (0.0, 1.0)).expect("operation should succeed");
        let ticks = scale.nice_ticks(5);
        assert!(ticks.iter().all(|t| (21.3..=23.9).contains(t)));
        assert!(ticks.len() >= 2);
    }

    #[test]
    fn test_color_scale() {
        let scale = ColorScale::new(vec![Rgba::BLACK, Rgba::WHITE], (0.0, 1.0))
            .expect("color scale creation should succeed");

        let mid = scale.scale(0.5);
        assert!(mid.r > 100 && mid.r < 150);
    }

    #[test]
    fn test_color_scale_clamping() {
        let scale = ColorScale::new(vec![Rgba::BLACK, Rgba::WHITE], (0.0, 1.0))
            .expect("color scale creation should succeed");
        assert_eq!(scale.scale(-1.0), Rgba::BLACK);
        assert_eq!(scale.scale(2.0), Rgba::WHITE);
    }

    #[test]
    fn test_bwr_endpoints_and_center() {
        let scale = ColorScale::from_palette(Palette::Bwr, (25.0, 45.0)).expect("valid domain");
        assert_eq!(scale.scale(25.0), Rgba::rgb(0, 0, 255));
        assert_eq!(scale.scale(35.0), Rgba::WHITE);
        assert_eq!(scale.scale(45.0), Rgba::rgb(255, 0, 0));
    }

    #[test]
    fn test_with_limits() {
        let scale =
            ColorScale::from_palette(Palette::Greyscale, (0.0, 60.0)).expect("valid domain");
        let rescaled = scale.with_limits(20.0, 30.0).expect("valid limits");
        assert_eq!(rescaled.domain(), (20.0, 30.0));
        assert_eq!(rescaled.scale(30.0), Rgba::WHITE);
    }

    #[test]
    fn test_with_limits_constant_frame() {
        let scale = ColorScale::from_palette(Palette::Heat, (0.0, 1.0)).expect("valid domain");
        let rescaled = scale.with_limits(22.0, 22.0).expect("widened");
        assert_eq!(rescaled.domain(), (21.5, 22.5));
    }

    #[test]
    fn test_with_limits_nearly_constant_frame() {
        let scale = ColorScale::from_palette(Palette::Heat, (0.0, 1.0)).expect("valid domain");
        let base = 33.3_f32;
        let next = f32::from_bits(base.to_bits() + 1);
        let (lo, hi) = scale.with_limits(base, next).expect("widened").domain();
        assert!(hi - lo >= 1.0, "({lo}, {hi})");
    }

    #[test]
    fn test_widen_degenerate_keeps_real_ranges() {
        assert_eq!(widen_degenerate(20.0, 20.5), (20.0, 20.5));
        assert_eq!(widen_degenerate(300.0, 300.0), (299.5, 300.5));
    }

    #[test]
    fn test_color_scale_rejects_nan() {
        assert!(ColorScale::from_palette(Palette::Bwr, (f32::NAN, 1.0)).is_err());
    }

    #[test]
    fn test_color_scale_invalid_empty() {
        assert!(ColorScale::new(vec![], (0.0, 1.0)).is_err());
    }

    #[test]
    fn test_every_palette_builds() {
        for palette in
            [Palette::Bwr, Palette::Viridis, Palette::Magma, Palette::Heat, Palette::Greyscale]
        {
            let scale = ColorScale::from_palette(palette, (0.0, 1.0)).expect("valid domain");
            let (lo, hi) = scale.range();
            assert_ne!(lo, hi, "palette {palette:?} should span two colors");
        }
    }
}
