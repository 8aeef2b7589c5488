//! Figure rendering.
//!
//! - [`ThermalImage`]: temperature grid to colored pixels
//! - [`Colorbar`]: gradient, ticks and title for the current color limits
//! - [`Figure`]: layout of both plus the cached-background update cycle
//! - [`font`]: the bitmap font used for labels

pub mod font;

mod colorbar;
mod figure;
mod image;

pub use colorbar::{Colorbar, ColorbarLayout};
pub use figure::{Figure, FigureLayout, FigureStyle};
pub use image::ThermalImage;
