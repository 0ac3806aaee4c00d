//! Map shader primitive implementation.

use super::{QuadBatch, RasterPipeline};
use crate::layers::DrawList;
use iced::widget::shader::{self, Viewport};
use iced::Rectangle;
use std::sync::Arc;

/// Primitive data for rendering one map frame.
///
/// This is created each frame from the current draw list. The associated
/// `RasterPipeline` holds persistent GPU resources, including the layer
/// textures, so a new primitive never re-uploads unchanged rasters.
#[derive(Debug)]
pub struct MapPrimitive {
    /// Layers in paint order; source of the textures to keep alive.
    pub list: Arc<DrawList>,
    /// Quads in logical pixels, scaled to physical pixels during prepare.
    pub quads: QuadBatch,
    /// Upload 16-bit rasters as `R16Unorm` when possible.
    pub prefer_native16: bool,
}

impl MapPrimitive {
    pub fn new(list: Arc<DrawList>, quads: QuadBatch) -> Self {
        Self {
            list,
            quads,
            prefer_native16: true,
        }
    }

    pub fn empty() -> Self {
        Self::new(Arc::new(DrawList::default()), QuadBatch::new())
    }
}

impl shader::Primitive for MapPrimitive {
    type Pipeline = RasterPipeline;

    fn prepare(
        &self,
        pipeline: &mut Self::Pipeline,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bounds: &Rectangle,
        viewport: &Viewport,
    ) {
        let scale = viewport.scale_factor();
        let physical_bounds = Rectangle::new(
            iced::Point::new(bounds.x * scale, bounds.y * scale),
            iced::Size::new(bounds.width * scale, bounds.height * scale),
        );

        pipeline.set_prefer_native16(device, self.prefer_native16);
        let scaled = self.quads.scaled(scale);
        pipeline.prepare(device, queue, &physical_bounds, &self.list, &scaled);
    }

    fn render(
        &self,
        pipeline: &Self::Pipeline,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        clip_bounds: &Rectangle<u32>,
    ) {
        pipeline.render(encoder, target, clip_bounds);
    }
}
