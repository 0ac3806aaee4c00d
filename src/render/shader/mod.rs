//! GPU rendering of map layers.
//!
//! This module provides wgpu-based rendering through iced's
//! `shader::Primitive` trait: solid fills and lines, 8-bit rasters, and the
//! windowed program for 16-bit rasters.

mod frame;
mod pipeline;
mod primitive;
mod quad;
mod textures;

pub use frame::build_frame;
pub use pipeline::RasterPipeline;
pub use primitive::MapPrimitive;
pub use quad::{DrawCommand, DrawKind, QuadBatch, QuadVertex};
pub use textures::{
    upload_layout, GpuRasterTexture, GpuTextureAllocator, RasterParams, SampleMode, UploadLayout,
};
