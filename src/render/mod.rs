//! Rendering backend using iced and wgpu.

pub mod shader;
pub mod software;

pub use shader::{build_frame, MapPrimitive, QuadBatch, RasterPipeline};
pub use software::{render_to_image, HeadlessOptions};
