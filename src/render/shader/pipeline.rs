//! GPU pipeline for map rendering.
//!
//! [`shader::Pipeline::new`] runs once per GPU device acquisition, which is
//! the point where layer textures can first be created. The pipeline owns
//! those textures through a [`TextureLifecycle`]: the first `prepare` after
//! construction (or after [`RasterPipeline::request_rebuild`]) runs a full
//! rebuild, later frames only sync what changed.

use super::quad::{DrawKind, QuadBatch, QuadVertex};
use super::textures::{
    create_bind_group_layout, create_sampler, supports_native16, GpuRasterTexture,
    GpuTextureAllocator, RasterParams,
};
use crate::layers::{DrawList, SyncReport, TextureLifecycle};
use iced::widget::shader;
use iced::Rectangle;
use std::mem;
use std::ops::Range;
use wgpu::util::DeviceExt;

/// Uniform buffer data for the shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    /// Projection matrix (orthographic, screen coords to clip space).
    projection: [[f32; 4]; 4],
}

impl Uniforms {
    fn new(width: f32, height: f32) -> Self {
        // Orthographic projection: (0,0) top-left, (width,height) bottom-right
        // Maps to clip space (-1,-1) to (1,1), with Y flipped
        let projection = [
            [2.0 / width, 0.0, 0.0, 0.0],
            [0.0, -2.0 / height, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [-1.0, 1.0, 0.0, 1.0],
        ];
        Self { projection }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Program {
    Solid,
    Plain,
    Windowed,
}

/// A draw command resolved against the live textures.
#[derive(Debug, Clone)]
struct PreparedDraw {
    program: Program,
    layer_id: Option<String>,
    indices: Range<u32>,
}

/// GPU pipeline holding persistent rendering resources.
pub struct RasterPipeline {
    solid: wgpu::RenderPipeline,
    plain: wgpu::RenderPipeline,
    windowed: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    raster_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    /// Vertex buffer (resized as needed).
    vertex_buffer: wgpu::Buffer,
    /// Index buffer (resized as needed).
    index_buffer: wgpu::Buffer,
    vertex_capacity: usize,
    index_capacity: usize,
    viewport_size: (u32, u32),
    native16: bool,
    textures: TextureLifecycle<GpuRasterTexture>,
    rebuild_pending: bool,
    draws: Vec<PreparedDraw>,
}

impl std::fmt::Debug for RasterPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterPipeline")
            .field("vertex_capacity", &self.vertex_capacity)
            .field("index_capacity", &self.index_capacity)
            .field("viewport_size", &self.viewport_size)
            .field("native16", &self.native16)
            .field("live_textures", &self.textures.live_count())
            .finish()
    }
}

impl RasterPipeline {
    /// Create the pipelines and empty buffers for a new device.
    pub fn with_options(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        prefer_native16: bool,
    ) -> Self {
        let (uniform_buffer, uniform_bind_group_layout, uniform_bind_group) =
            create_uniform_resources(device);
        let raster_layout = create_bind_group_layout(device);
        let sampler = create_sampler(device);

        let quad_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Quad Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("quad.wgsl").into()),
        });
        let windowed_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Windowed Raster Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("windowed.wgsl").into()),
        });

        let solid_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Solid Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });
        let raster_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Raster Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout, &raster_layout],
            push_constant_ranges: &[],
        });

        let solid = create_pipeline(device, format, &solid_layout, &quad_shader, "fs_solid", "Solid");
        let plain = create_pipeline(
            device,
            format,
            &raster_pipeline_layout,
            &quad_shader,
            "fs_plain",
            "Plain Raster",
        );
        let windowed = create_pipeline(
            device,
            format,
            &raster_pipeline_layout,
            &windowed_shader,
            "fs_windowed",
            "Windowed Raster",
        );

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Map Vertex Buffer"),
            size: 4096,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let index_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Map Index Buffer"),
            size: 4096,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let native16 = prefer_native16 && supports_native16(device);
        tracing::info!(
            "Raster pipeline created for {:?} target, 16-bit textures as {}",
            format,
            if native16 { "R16Unorm" } else { "Rg8Unorm" }
        );

        Self {
            solid,
            plain,
            windowed,
            uniform_buffer,
            uniform_bind_group,
            raster_layout,
            sampler,
            vertex_buffer,
            index_buffer,
            vertex_capacity: 4096,
            index_capacity: 4096,
            viewport_size: (0, 0),
            native16,
            textures: TextureLifecycle::new(),
            rebuild_pending: true,
            draws: Vec::new(),
        }
    }

    /// Force the next `prepare` to release and recreate every texture.
    pub fn request_rebuild(&mut self) {
        self.rebuild_pending = true;
    }

    pub fn live_textures(&self) -> usize {
        self.textures.live_count()
    }

    pub fn uses_native16(&self) -> bool {
        self.native16
    }

    /// Switch the 16-bit upload path; textures are rebuilt if it changes.
    pub fn set_prefer_native16(&mut self, device: &wgpu::Device, prefer: bool) {
        let native16 = prefer && supports_native16(device);
        if native16 != self.native16 {
            self.native16 = native16;
            self.rebuild_pending = true;
        }
    }

    /// Bring layer textures in line with the draw list.
    pub fn sync_textures(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        list: &DrawList,
    ) -> SyncReport {
        let sources = list.texture_sources();
        let mut allocator = GpuTextureAllocator {
            device,
            queue,
            layout: &self.raster_layout,
            sampler: &self.sampler,
            native16: self.native16,
        };
        if self.rebuild_pending {
            self.rebuild_pending = false;
            let report = self.textures.rebuild(&mut allocator, &sources);
            let bytes: u64 = sources
                .iter()
                .filter_map(|(id, _)| self.textures.get(id))
                .map(|t| t.byte_size)
                .sum();
            tracing::info!(
                "GPU context ready: {} layer textures, {} bytes",
                self.textures.live_count(),
                bytes
            );
            report
        } else {
            self.textures.sync(&mut allocator, &sources)
        }
    }

    /// Upload textures, layer parameters and quad data for one frame.
    ///
    /// `bounds` is in physical pixels and `quads` already scaled to match.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bounds: &Rectangle,
        list: &DrawList,
        quads: &QuadBatch,
    ) {
        let width = bounds.width as u32;
        let height = bounds.height as u32;

        // Update projection if size changed
        if self.viewport_size != (width, height) {
            self.viewport_size = (width, height);
            let uniforms = Uniforms::new(bounds.width.max(1.0), bounds.height.max(1.0));
            queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));
        }

        self.sync_textures(device, queue, list);

        self.draws.clear();
        for command in &quads.commands {
            if command.indices.is_empty() {
                continue;
            }
            let program = match &command.kind {
                DrawKind::Solid => Program::Solid,
                DrawKind::Plain { layer_id, opacity } => {
                    let Some(texture) = self.textures.get(layer_id) else {
                        continue;
                    };
                    texture.write_params(queue, &RasterParams::plain(texture.mode, *opacity));
                    Program::Plain
                }
                DrawKind::Windowed {
                    layer_id,
                    opacity,
                    window,
                } => {
                    let Some(texture) = self.textures.get(layer_id) else {
                        continue;
                    };
                    texture.write_params(
                        queue,
                        &RasterParams::windowed(texture.mode, *opacity, window),
                    );
                    Program::Windowed
                }
            };
            self.draws.push(PreparedDraw {
                program,
                layer_id: command.kind.layer_id().map(str::to_string),
                indices: command.indices.clone(),
            });
        }

        // Resize vertex buffer if needed
        let vertex_size = quads.vertices.len() * mem::size_of::<QuadVertex>();
        if vertex_size > self.vertex_capacity {
            self.vertex_capacity = vertex_size.next_power_of_two().max(4096);
            self.vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Map Vertex Buffer"),
                size: self.vertex_capacity as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
        }

        // Resize index buffer if needed
        let index_size = quads.indices.len() * mem::size_of::<u32>();
        if index_size > self.index_capacity {
            self.index_capacity = index_size.next_power_of_two().max(4096);
            self.index_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Map Index Buffer"),
                size: self.index_capacity as u64,
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
        }

        if !quads.vertices.is_empty() {
            queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&quads.vertices));
        }
        if !quads.indices.is_empty() {
            queue.write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(&quads.indices));
        }
    }

    /// Render the prepared frame on top of the target's contents.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        clip_bounds: &Rectangle<u32>,
    ) {
        self.render_with(encoder, target, clip_bounds, wgpu::LoadOp::Load, "Map Render Pass");
    }

    /// Render with a clear operation (for standalone/headless rendering).
    pub fn render_clear(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        clip_bounds: &Rectangle<u32>,
        clear_color: [f32; 4],
    ) {
        let clear = wgpu::LoadOp::Clear(wgpu::Color {
            r: clear_color[0] as f64,
            g: clear_color[1] as f64,
            b: clear_color[2] as f64,
            a: clear_color[3] as f64,
        });
        self.render_with(encoder, target, clip_bounds, clear, "Map Render Pass (Clear)");
    }

    fn render_with(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        clip_bounds: &Rectangle<u32>,
        load: wgpu::LoadOp<wgpu::Color>,
        label: &str,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        // Set viewport to match clip bounds - this ensures coordinates map correctly
        render_pass.set_viewport(
            clip_bounds.x as f32,
            clip_bounds.y as f32,
            clip_bounds.width as f32,
            clip_bounds.height as f32,
            0.0,
            1.0,
        );
        render_pass.set_scissor_rect(
            clip_bounds.x,
            clip_bounds.y,
            clip_bounds.width,
            clip_bounds.height,
        );

        render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

        for draw in &self.draws {
            match draw.program {
                Program::Solid => render_pass.set_pipeline(&self.solid),
                Program::Plain | Program::Windowed => {
                    let Some(texture) = draw.layer_id.as_deref().and_then(|id| self.textures.get(id))
                    else {
                        continue;
                    };
                    let pipeline = if draw.program == Program::Plain {
                        &self.plain
                    } else {
                        &self.windowed
                    };
                    render_pass.set_pipeline(pipeline);
                    render_pass.set_bind_group(1, texture.bind_group(), &[]);
                }
            }
            render_pass.draw_indexed(draw.indices.clone(), 0, 0..1);
        }
    }
}

impl shader::Pipeline for RasterPipeline {
    fn new(device: &wgpu::Device, _queue: &wgpu::Queue, format: wgpu::TextureFormat) -> Self {
        Self::with_options(device, format, true)
    }
}

/// Create one render pipeline over the shared vertex layout.
fn create_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    layout: &wgpu::PipelineLayout,
    module: &wgpu::ShaderModule,
    fragment_entry: &str,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: Some("vs_main"),
            buffers: &[QuadVertex::desc()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some(fragment_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None, // lines and mirrored quads may wind either way
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

/// Create uniform buffer, bind group layout, and bind group for the projection matrix.
fn create_uniform_resources(
    device: &wgpu::Device,
) -> (wgpu::Buffer, wgpu::BindGroupLayout, wgpu::BindGroup) {
    let uniforms = Uniforms::new(1920.0, 1080.0);
    let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Map Uniform Buffer"),
        contents: bytemuck::cast_slice(&[uniforms]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });

    let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Map Uniform Bind Group Layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Map Uniform Bind Group"),
        layout: &layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: uniform_buffer.as_entire_binding(),
        }],
    });

    (uniform_buffer, layout, bind_group)
}
