//! Quad vertex format and batching for GPU rendering.

use std::ops::Range;

use iced::Rectangle;

use crate::raster::WindowParameters;

/// Vertex format for map quads.
///
/// Each quad consists of 4 vertices; lines are emitted as thin quads.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    /// Position in screen coordinates (pixels from top-left).
    pub position: [f32; 2],
    /// Texture coordinates, row 0 at the north edge.
    pub tex_coords: [f32; 2],
    /// Vertex color, straight alpha. Rasters carry their opacity here.
    pub color: [f32; 4],
}

impl QuadVertex {
    /// Vertex buffer layout for wgpu.
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        // position(8) tex_coords(8) color(16)
        const F: wgpu::VertexFormat = wgpu::VertexFormat::Float32x2;
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute { offset: 0, shader_location: 0, format: F },
                wgpu::VertexAttribute { offset: 8, shader_location: 1, format: F },
                wgpu::VertexAttribute { offset: 16, shader_location: 2, format: wgpu::VertexFormat::Float32x4 },
            ],
        }
    }
}

/// Which program draws a run of indices.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawKind {
    /// Untextured fill: background, basemap and vector lines.
    Solid,
    /// 8-bit texture sampled as-is.
    Plain { layer_id: String, opacity: f32 },
    /// 16-bit texture through the contrast window.
    Windowed {
        layer_id: String,
        opacity: f32,
        window: WindowParameters,
    },
}

impl DrawKind {
    pub fn layer_id(&self) -> Option<&str> {
        match self {
            Self::Solid => None,
            Self::Plain { layer_id, .. } | Self::Windowed { layer_id, .. } => Some(layer_id),
        }
    }
}

/// A contiguous index range drawn with one program and texture.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub kind: DrawKind,
    pub indices: Range<u32>,
}

/// Batched quad collection for efficient GPU rendering.
///
/// Collects quads in paint order, then uploads to GPU in one batch. Each
/// texture switch starts a new [`DrawCommand`]; consecutive solid quads
/// share one.
#[derive(Debug, Default, Clone)]
pub struct QuadBatch {
    /// Vertex data for all quads.
    pub vertices: Vec<QuadVertex>,
    /// Index data (6 indices per quad: 2 triangles).
    pub indices: Vec<u32>,
    pub commands: Vec<DrawCommand>,
}

impl QuadBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of quads in the batch.
    pub fn quad_count(&self) -> usize {
        self.indices.len() / 6
    }

    /// Start a run of quads drawn with `kind`.
    pub fn begin(&mut self, kind: DrawKind) {
        let start = self.indices.len() as u32;
        if let Some(last) = self.commands.last_mut() {
            if last.kind == kind && last.indices.end == start {
                return;
            }
            if last.indices.is_empty() {
                self.commands.pop();
            }
        }
        self.commands.push(DrawCommand {
            kind,
            indices: start..start,
        });
    }

    /// Push a quad from four corners (TL, TR, BR, BL order).
    pub fn push_quad(&mut self, corners: [[f32; 2]; 4], uvs: [[f32; 2]; 4], color: [f32; 4]) {
        if self.commands.is_empty() {
            self.begin(DrawKind::Solid);
        }
        let base_index = self.vertices.len() as u32;
        for (position, tex_coords) in corners.into_iter().zip(uvs) {
            self.vertices.push(QuadVertex {
                position,
                tex_coords,
                color,
            });
        }

        // Two triangles: TL-TR-BR and TL-BR-BL
        self.indices.extend_from_slice(&[
            base_index,
            base_index + 1,
            base_index + 2,
            base_index,
            base_index + 2,
            base_index + 3,
        ]);
        if let Some(last) = self.commands.last_mut() {
            last.indices.end = self.indices.len() as u32;
        }
    }

    /// Push a solid color rectangle.
    pub fn push_solid(&mut self, bounds: Rectangle, color: [f32; 4]) {
        self.begin(DrawKind::Solid);
        let (x0, y0) = (bounds.x, bounds.y);
        let (x1, y1) = (bounds.x + bounds.width, bounds.y + bounds.height);
        self.push_quad([[x0, y0], [x1, y0], [x1, y1], [x0, y1]], [[0.0, 0.0]; 4], color);
    }

    /// Push a line segment as a quad `width` pixels thick.
    pub fn push_line(&mut self, a: [f32; 2], b: [f32; 2], width: f32, color: [f32; 4]) {
        let (dx, dy) = (b[0] - a[0], b[1] - a[1]);
        let len = (dx * dx + dy * dy).sqrt();
        if len <= f32::EPSILON || width <= 0.0 {
            return;
        }
        let (nx, ny) = (-dy / len * width * 0.5, dx / len * width * 0.5);
        self.begin(DrawKind::Solid);
        self.push_quad(
            [
                [a[0] + nx, a[1] + ny],
                [b[0] + nx, b[1] + ny],
                [b[0] - nx, b[1] - ny],
                [a[0] - nx, a[1] - ny],
            ],
            [[0.0, 0.0]; 4],
            color,
        );
    }

    /// Multiply every vertex position by `scale` (logical to physical pixels).
    pub fn scaled(&self, scale: f32) -> QuadBatch {
        let mut scaled = self.clone();
        for vertex in scaled.vertices.iter_mut() {
            vertex.position[0] *= scale;
            vertex.position[1] *= scale;
        }
        scaled
    }
}
