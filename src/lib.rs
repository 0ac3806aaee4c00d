//! Geo Raster View
//!
//! Renders georeferenced rasters of 8-bit and 16-bit depth over a map.
//! 16-bit grayscale rasters keep their full precision on the GPU and are
//! displayed through an adjustable linear window with gamma.

pub mod config;
pub mod error;
pub mod geo;
pub mod iced_app;
pub mod layers;
pub mod raster;
pub mod render;

pub use error::{Error, Result};
