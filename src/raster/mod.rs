//! Raster sample arrays: generation, decoding, packing and windowing.

pub mod descriptor;
pub mod pack;
pub mod ramp;
pub mod source;
pub mod window;

pub use descriptor::{RasterDescriptor, RasterFormat, RasterPreset};
pub use pack::{pack, ComponentType, PackedTexture, PixelFormat};
pub use window::{WindowParameters, WindowSettings};
