//! Headless GPU rendering for producing screenshots.
//!
//! Uses the same wgpu shader pipeline as the iced viewer but drives it
//! without a window, reading the frame back into an `RgbaImage`.

use iced::{Rectangle, Size};
use image::RgbaImage;

use super::shader::{build_frame, RasterPipeline};
use crate::geo::{Equirectangular, ViewState};
use crate::layers::{color_to_f32, DrawList, LayerConfig};
use crate::{Error, Result};

/// Linear target, so read-back bytes equal the fragment outputs.
pub const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Create a headless wgpu device and queue.
///
/// `TEXTURE_FORMAT_16BIT_NORM` is requested when the adapter has it.
pub fn create_headless_device() -> Result<(wgpu::Device, wgpu::Queue)> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });

    pollster::block_on(async {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| Error::Other(format!("no GPU adapter: {e}")))?;

        let features = adapter.features() & wgpu::Features::TEXTURE_FORMAT_16BIT_NORM;
        adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Headless Map Device"),
                required_features: features,
                ..Default::default()
            })
            .await
            .map_err(|e| Error::Other(format!("GPU device request failed: {e}")))
    })
}

/// Create a render target texture and its view.
fn create_render_target(
    device: &wgpu::Device,
    width: u32,
    height: u32,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Screenshot Render Target"),
        size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TARGET_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

/// Copy render target to a readable buffer and read back pixels into an image.
fn read_back_pixels(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    mut encoder: wgpu::CommandEncoder,
    render_texture: &wgpu::Texture,
    width: u32,
    height: u32,
) -> Result<RgbaImage> {
    let bytes_per_row = (width * 4).next_multiple_of(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);
    let output_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Screenshot Output Buffer"),
        size: (bytes_per_row * height) as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture: render_texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &output_buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
    );

    queue.submit(std::iter::once(encoder.finish()));

    let buffer_slice = output_buffer.slice(..);
    let (sender, receiver) = std::sync::mpsc::channel();
    buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = sender.send(result);
    });
    let _ = device.poll(wgpu::PollType::Wait {
        submission_index: None,
        timeout: Some(std::time::Duration::from_secs(10)),
    });
    receiver
        .recv()
        .map_err(|_| Error::Other("screenshot buffer was never mapped".into()))?
        .map_err(|e| Error::Other(format!("failed to map screenshot buffer: {e}")))?;

    let data = buffer_slice.get_mapped_range();
    let mut img = RgbaImage::new(width, height);
    for y in 0..height {
        let src_offset = (y * bytes_per_row) as usize;
        let row = &data[src_offset..src_offset + (width * 4) as usize];
        for x in 0..width {
            let i = (x * 4) as usize;
            img.put_pixel(x, y, image::Rgba([row[i], row[i + 1], row[i + 2], row[i + 3]]));
        }
    }

    Ok(img)
}

/// Clear color for a draw list: its background layer, else black.
pub fn clear_color(list: &DrawList) -> [f32; 4] {
    list.layers
        .iter()
        .find_map(|layer| match layer {
            LayerConfig::Background { color, .. } => Some(color_to_f32(*color)),
            _ => None,
        })
        .unwrap_or([0.0, 0.0, 0.0, 1.0])
}

/// Options for a headless frame.
#[derive(Debug, Clone, Copy)]
pub struct HeadlessOptions {
    pub width: u32,
    pub height: u32,
    pub view: ViewState,
    pub prefer_native16: bool,
}

/// Render a draw list on an existing device.
pub fn render_with_device(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    list: &DrawList,
    options: &HeadlessOptions,
) -> Result<RgbaImage> {
    let (width, height) = (options.width, options.height);
    if width == 0 || height == 0 {
        return Err(Error::EmptyRaster { width, height });
    }

    let size = Size::new(width as f32, height as f32);
    let projection = Equirectangular::new(options.view, size.width as f64, size.height as f64);
    let batch = build_frame(list, &projection, size);

    let mut pipeline = RasterPipeline::with_options(device, TARGET_FORMAT, options.prefer_native16);
    let (render_texture, render_view) = create_render_target(device, width, height);

    let bounds = Rectangle::new(iced::Point::ORIGIN, size);
    pipeline.prepare(device, queue, &bounds, list, &batch);

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Screenshot Encoder"),
    });
    let clip_bounds = Rectangle { x: 0u32, y: 0u32, width, height };
    pipeline.render_clear(&mut encoder, &render_view, &clip_bounds, clear_color(list));

    read_back_pixels(device, queue, encoder, &render_texture, width, height)
}

/// Render a draw list to an RGBA image using a fresh headless device.
pub fn render_to_image(list: &DrawList, options: &HeadlessOptions) -> Result<RgbaImage> {
    let (device, queue) = create_headless_device()?;
    render_with_device(&device, &queue, list, options)
}

/// Save a rendered frame as PNG, or lossless WebP for `.webp` paths.
pub fn save_image(img: &RgbaImage, path: &std::path::Path) -> Result<()> {
    let is_webp = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("webp"));
    if is_webp {
        let encoder = webp::Encoder::from_rgba(img.as_raw(), img.width(), img.height());
        let encoded = encoder.encode_lossless();
        std::fs::write(path, &*encoded)?;
    } else {
        img.save(path)?;
    }
    tracing::info!("Saved {}x{} frame to {}", img.width(), img.height(), path.display());
    Ok(())
}
