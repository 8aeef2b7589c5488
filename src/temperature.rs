//! Temperature units.

use serde::{Deserialize, Serialize};

/// Convert a temperature from Celsius to Fahrenheit.
#[must_use]
pub fn c_to_f(celsius: f32) -> f32 {
    (9.0 / 5.0) * celsius + 32.0
}

/// Unit used for display and the colorbar label.
///
/// The sensor always reports Celsius; conversion happens at display time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemperatureUnit {
    /// Degrees Celsius.
    #[default]
    Celsius,
    /// Degrees Fahrenheit.
    Fahrenheit,
}

impl TemperatureUnit {
    /// Convert a Celsius reading into this unit.
    #[must_use]
    pub fn from_celsius(self, celsius: f32) -> f32 {
        match self {
            Self::Celsius => celsius,
            Self::Fahrenheit => c_to_f(celsius),
        }
    }

    /// Single-letter unit symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "C",
            Self::Fahrenheit => "F",
        }
    }

    /// Colorbar title.
    #[must_use]
    pub fn axis_label(self) -> String {
        format!("Temperature [°{}]", self.symbol())
    }
}
