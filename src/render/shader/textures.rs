//! Uploading packed rasters as wgpu textures.
//!
//! wgpu has neither luminance formats nor 3-byte texels, so packed buffers
//! are mapped onto the closest formats at upload time:
//!
//! | packed format     | texture format             | bytes changed        |
//! |-------------------|----------------------------|----------------------|
//! | `Luminance`       | `R8Unorm`                  | no                   |
//! | `LuminanceAlpha`  | `Rg8Unorm` or `R16Unorm`   | no                   |
//! | `Rgb`             | `Rgba8Unorm`               | alpha 255 appended   |
//! | `Rgba`            | `Rgba8Unorm`               | no                   |
//!
//! The 16-bit bytes are little-endian, so the same buffer is a valid
//! `R16Unorm` texel stream when the device supports that format.

use std::borrow::Cow;

use wgpu::util::DeviceExt;

use crate::layers::TextureAllocator;
use crate::raster::{PackedTexture, PixelFormat, WindowParameters};
use crate::{Error, Result};

/// How the fragment program turns a texel into a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum SampleMode {
    /// `.r` broadcast to gray.
    Luminance = 0,
    Rgba = 1,
    /// `.r` is the low byte and `.g` the high byte of a 16-bit sample.
    Split8 = 2,
    /// `.r` is the whole 16-bit sample.
    Native16 = 3,
}

/// Bytes and format for one `write_texture` call.
#[derive(Debug)]
pub struct UploadLayout<'a> {
    pub format: wgpu::TextureFormat,
    pub mode: SampleMode,
    pub bytes: Cow<'a, [u8]>,
    pub bytes_per_row: u32,
}

/// Map a packed texture onto a wgpu format.
pub fn upload_layout(texture: &PackedTexture, native16: bool) -> UploadLayout<'_> {
    let width = texture.width;
    match texture.pixel_format {
        PixelFormat::Luminance => UploadLayout {
            format: wgpu::TextureFormat::R8Unorm,
            mode: SampleMode::Luminance,
            bytes: Cow::Borrowed(&texture.bytes),
            bytes_per_row: texture.row_stride() as u32,
        },
        PixelFormat::LuminanceAlpha if native16 => UploadLayout {
            format: wgpu::TextureFormat::R16Unorm,
            mode: SampleMode::Native16,
            bytes: Cow::Borrowed(&texture.bytes),
            bytes_per_row: texture.row_stride() as u32,
        },
        PixelFormat::LuminanceAlpha => UploadLayout {
            format: wgpu::TextureFormat::Rg8Unorm,
            mode: SampleMode::Split8,
            bytes: Cow::Borrowed(&texture.bytes),
            bytes_per_row: texture.row_stride() as u32,
        },
        PixelFormat::Rgb => {
            let mut rgba = Vec::with_capacity(texture.bytes.len() / 3 * 4);
            for rgb in texture.bytes.chunks_exact(3) {
                rgba.extend_from_slice(rgb);
                rgba.push(255);
            }
            UploadLayout {
                format: wgpu::TextureFormat::Rgba8Unorm,
                mode: SampleMode::Rgba,
                bytes: Cow::Owned(rgba),
                bytes_per_row: width * 4,
            }
        }
        PixelFormat::Rgba => UploadLayout {
            format: wgpu::TextureFormat::Rgba8Unorm,
            mode: SampleMode::Rgba,
            bytes: Cow::Borrowed(&texture.bytes),
            bytes_per_row: texture.row_stride() as u32,
        },
    }
}

/// Per-layer uniform block, matching `RasterParams` in the WGSL programs.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RasterParams {
    pub lower: f32,
    pub upper: f32,
    pub gamma: f32,
    pub opacity: f32,
    pub mode: u32,
    pub _pad: [u32; 3],
}

impl RasterParams {
    pub fn plain(mode: SampleMode, opacity: f32) -> Self {
        Self::windowed(mode, opacity, &WindowParameters::full_range())
    }

    pub fn windowed(mode: SampleMode, opacity: f32, window: &WindowParameters) -> Self {
        Self {
            lower: window.lower(),
            upper: window.upper(),
            gamma: window.gamma(),
            opacity,
            mode: mode as u32,
            _pad: [0; 3],
        }
    }
}

/// Device texture of one raster layer.
#[derive(Debug)]
pub struct GpuRasterTexture {
    texture: wgpu::Texture,
    params: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    pub mode: SampleMode,
    pub format: wgpu::TextureFormat,
    pub byte_size: u64,
}

impl GpuRasterTexture {
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    /// Rewrite the window and opacity. The texture itself is untouched.
    pub fn write_params(&self, queue: &wgpu::Queue, params: &RasterParams) {
        queue.write_buffer(&self.params, 0, bytemuck::cast_slice(&[*params]));
    }
}

/// Nearest-neighbour, clamp-to-edge sampler shared by all raster layers.
///
/// Linear filtering would blend the low and high bytes of neighbouring
/// 16-bit samples independently and corrupt the reconstruction.
pub fn create_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("Raster Sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Nearest,
        min_filter: wgpu::FilterMode::Nearest,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}

/// Texture, sampler and parameter block of one raster layer.
pub fn create_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Raster Bind Group Layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: false },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
    })
}

/// Whether 16-bit rasters can use `R16Unorm`.
pub fn supports_native16(device: &wgpu::Device) -> bool {
    device
        .features()
        .contains(wgpu::Features::TEXTURE_FORMAT_16BIT_NORM)
}

/// Creates layer textures on one device. Borrowed for the length of a
/// rebuild or sync.
pub struct GpuTextureAllocator<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub layout: &'a wgpu::BindGroupLayout,
    pub sampler: &'a wgpu::Sampler,
    pub native16: bool,
}

impl GpuTextureAllocator<'_> {
    fn exhausted(layer_id: &str, reason: impl Into<String>) -> Error {
        Error::ResourceExhaustion {
            layer: layer_id.to_string(),
            reason: reason.into(),
        }
    }
}

impl TextureAllocator for GpuTextureAllocator<'_> {
    type Handle = GpuRasterTexture;

    fn allocate(&mut self, layer_id: &str, packed: &PackedTexture) -> Result<GpuRasterTexture> {
        let max = self.device.limits().max_texture_dimension_2d;
        if packed.width > max || packed.height > max {
            return Err(Self::exhausted(
                layer_id,
                format!("{}x{} exceeds the device limit of {max}", packed.width, packed.height),
            ));
        }

        let upload = upload_layout(packed, self.native16);
        let size = wgpu::Extent3d {
            width: packed.width,
            height: packed.height,
            depth_or_array_layers: 1,
        };

        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(layer_id),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: upload.format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        if let Some(e) = pollster::block_on(self.device.pop_error_scope()) {
            texture.destroy();
            return Err(Self::exhausted(layer_id, e.to_string()));
        }

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &upload.bytes,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(upload.bytes_per_row),
                rows_per_image: Some(packed.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let params = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Raster Params"),
            contents: bytemuck::cast_slice(&[RasterParams::plain(upload.mode, 1.0)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Raster Bind Group"),
            layout: self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params.as_entire_binding(),
                },
            ],
        });

        Ok(GpuRasterTexture {
            texture,
            params,
            bind_group,
            mode: upload.mode,
            format: upload.format,
            byte_size: upload.bytes.len() as u64,
        })
    }

    fn release(&mut self, handle: GpuRasterTexture) {
        tracing::debug!(
            "Releasing {:?} texture ({} bytes)",
            handle.format,
            handle.byte_size
        );
        handle.texture.destroy();
        handle.params.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{pack, ramp, RasterFormat};

    fn packed(format: RasterFormat) -> PackedTexture {
        pack(&ramp::vertical_ramp(5, 3, format).unwrap()).unwrap()
    }

    #[test]
    fn rgb_is_expanded_only_at_upload() {
        let texture = packed(RasterFormat::RGB8);
        let upload = upload_layout(&texture, false);
        assert_eq!(upload.format, wgpu::TextureFormat::Rgba8Unorm);
        assert_eq!(upload.bytes.len(), 5 * 3 * 4);
        assert_eq!(upload.bytes_per_row, 20);
        assert_eq!(texture.bytes.len(), 5 * 3 * 3);
        assert!(upload.bytes.chunks_exact(4).all(|px| px[3] == 255));
    }

    #[test]
    fn sixteen_bit_bytes_are_shared_by_both_paths() {
        let texture = packed(RasterFormat::GRAY16);
        let split = upload_layout(&texture, false);
        let native = upload_layout(&texture, true);
        assert_eq!(split.format, wgpu::TextureFormat::Rg8Unorm);
        assert_eq!(split.mode, SampleMode::Split8);
        assert_eq!(native.format, wgpu::TextureFormat::R16Unorm);
        assert_eq!(native.mode, SampleMode::Native16);
        assert_eq!(split.bytes, native.bytes);
        assert!(matches!(split.bytes, Cow::Borrowed(_)));
        assert_eq!(split.bytes_per_row, 10);
    }

    #[test]
    fn eight_bit_gray_uses_a_single_channel() {
        let texture = packed(RasterFormat::GRAY8);
        let upload = upload_layout(&texture, true);
        assert_eq!(upload.format, wgpu::TextureFormat::R8Unorm);
        assert_eq!(upload.mode, SampleMode::Luminance);
        assert_eq!(upload.bytes_per_row, 5);
    }

    #[test]
    fn params_block_is_32_bytes() {
        assert_eq!(std::mem::size_of::<RasterParams>(), 32);
        let window = WindowParameters::new(100.0, 200.0, 2.0).unwrap();
        let params = RasterParams::windowed(SampleMode::Split8, 0.5, &window);
        assert_eq!((params.lower, params.upper, params.gamma), (100.0, 200.0, 2.0));
        assert_eq!(params.mode, 2);
    }
}
