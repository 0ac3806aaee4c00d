//! Packing sample arrays into GPU-uploadable byte buffers.
//!
//! Each supported raster layout maps onto an 8-bit-per-channel pixel format:
//!
//! | raster     | pixel format      | bytes/pixel | unpack alignment |
//! |------------|-------------------|-------------|------------------|
//! | gray, 8    | `Luminance`       | 1           | 1                |
//! | RGB, 8     | `Rgb`             | 3           | 1                |
//! | RGBA, 8    | `Rgba`            | 4           | 4                |
//! | gray, 16   | `LuminanceAlpha`  | 2           | 2                |
//!
//! 16-bit gray samples are split little-endian: the low byte goes to the
//! luminance channel and the high byte to the alpha channel. The windowed
//! shader recombines them.

use std::sync::atomic::{AtomicU64, Ordering};

use super::descriptor::{RasterDescriptor, RasterFormat};
use crate::Result;

/// Channel layout of a packed texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Luminance,
    LuminanceAlpha,
    Rgb,
    Rgba,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Luminance => 1,
            Self::LuminanceAlpha => 2,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// Per-component storage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    UnsignedByte,
}

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// A byte buffer laid out for direct texture upload.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedTexture {
    pub bytes: Vec<u8>,
    pub pixel_format: PixelFormat,
    pub component_type: ComponentType,
    pub unpack_alignment: u32,
    pub width: u32,
    pub height: u32,
    /// Raster layout the bytes were packed from.
    pub source_format: RasterFormat,
    /// Process-unique id; a new pack always gets a new generation.
    pub generation: u64,
}

impl PackedTexture {
    pub fn bytes_per_pixel(&self) -> usize {
        self.pixel_format.bytes_per_pixel()
    }

    /// Bytes per row, rounded up to the unpack alignment.
    pub fn row_stride(&self) -> usize {
        let row = self.width as usize * self.bytes_per_pixel();
        let align = self.unpack_alignment as usize;
        row.div_ceil(align) * align
    }

    pub fn is_high_bit_depth(&self) -> bool {
        self.pixel_format == PixelFormat::LuminanceAlpha
    }

    /// Recover the original samples from the packed bytes.
    pub fn decode(&self) -> Vec<u32> {
        match self.pixel_format {
            PixelFormat::LuminanceAlpha => self
                .bytes
                .chunks_exact(2)
                .map(|lh| u16::from_le_bytes([lh[0], lh[1]]) as u32)
                .collect(),
            _ => self.bytes.iter().map(|&b| b as u32).collect(),
        }
    }
}

/// Pack a raster for upload.
///
/// Fails before any GPU work when the layout is unsupported or the samples
/// violate the descriptor invariants.
pub fn pack(desc: &RasterDescriptor) -> Result<PackedTexture> {
    desc.validate()?;

    let (pixel_format, unpack_alignment, bytes) = match desc.format {
        RasterFormat::GRAY16 => {
            let mut bytes = Vec::with_capacity(desc.samples.len() * 2);
            for &sample in &desc.samples {
                bytes.extend_from_slice(&(sample as u16).to_le_bytes());
            }
            (PixelFormat::LuminanceAlpha, 2, bytes)
        }
        RasterFormat::GRAY8 => (PixelFormat::Luminance, 1, narrow(&desc.samples)),
        // Rows of 3-byte pixels are rarely 4-byte aligned; padding must not be assumed.
        RasterFormat::RGB8 => (PixelFormat::Rgb, 1, narrow(&desc.samples)),
        RasterFormat::RGBA8 => (PixelFormat::Rgba, 4, narrow(&desc.samples)),
        other => {
            // validate() already rejected this
            return Err(crate::Error::UnsupportedFormat {
                channels: other.channels,
                bits: other.bits,
            });
        }
    };

    let packed = PackedTexture {
        bytes,
        pixel_format,
        component_type: ComponentType::UnsignedByte,
        unpack_alignment,
        width: desc.width,
        height: desc.height,
        source_format: desc.format,
        generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
    };
    debug_assert_eq!(
        packed.bytes.len(),
        packed.row_stride() * packed.height as usize
    );
    Ok(packed)
}

fn narrow(samples: &[u32]) -> Vec<u8> {
    samples.iter().map(|&s| s as u8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::ramp::{constant, vertical_ramp};
    use crate::Error;

    #[test]
    fn packs_sixteen_bit_little_endian() {
        let desc = RasterDescriptor::new(1, 1, RasterFormat::GRAY16, vec![0x1234]).unwrap();
        let packed = pack(&desc).unwrap();
        assert_eq!(packed.bytes, vec![0x34, 0x12]);
        assert_eq!(packed.pixel_format, PixelFormat::LuminanceAlpha);
        assert_eq!(packed.unpack_alignment, 2);
    }

    #[test]
    fn sixteen_bit_byte_order_holds_for_every_pixel() {
        let desc = constant(7, 3, RasterFormat::GRAY16, 0x1234).unwrap();
        let packed = pack(&desc).unwrap();
        assert_eq!(packed.bytes.len(), 7 * 3 * 2);
        for pair in packed.bytes.chunks_exact(2) {
            assert_eq!(pair, &[0x34, 0x12]);
        }
    }

    #[test]
    fn format_table() {
        let cases = [
            (RasterFormat::GRAY8, PixelFormat::Luminance, 1, 1),
            (RasterFormat::RGB8, PixelFormat::Rgb, 3, 1),
            (RasterFormat::RGBA8, PixelFormat::Rgba, 4, 4),
            (RasterFormat::GRAY16, PixelFormat::LuminanceAlpha, 2, 2),
        ];
        for (format, pixel_format, bpp, align) in cases {
            let packed = pack(&vertical_ramp(5, 3, format).unwrap()).unwrap();
            assert_eq!(packed.pixel_format, pixel_format, "{format}");
            assert_eq!(packed.bytes_per_pixel(), bpp, "{format}");
            assert_eq!(packed.unpack_alignment, align, "{format}");
            assert_eq!(packed.component_type, ComponentType::UnsignedByte);
            assert_eq!(packed.bytes.len(), 5 * 3 * bpp, "{format}");
        }
    }

    #[test]
    fn rgb_rows_are_not_padded() {
        let packed = pack(&constant(5, 2, RasterFormat::RGB8, 9).unwrap()).unwrap();
        assert_eq!(packed.row_stride(), 15);
        assert_eq!(packed.bytes.len(), 30);
    }

    #[test]
    fn round_trip_for_every_supported_format() {
        for format in [
            RasterFormat::GRAY8,
            RasterFormat::RGB8,
            RasterFormat::RGBA8,
            RasterFormat::GRAY16,
        ] {
            let desc = vertical_ramp(9, 33, format).unwrap();
            let packed = pack(&desc).unwrap();
            assert_eq!(packed.decode(), desc.samples, "{format}");
        }
    }

    #[test]
    fn generations_are_unique() {
        let desc = constant(1, 1, RasterFormat::GRAY8, 0).unwrap();
        let a = pack(&desc).unwrap();
        let b = pack(&desc).unwrap();
        assert_ne!(a.generation, b.generation);
    }

    #[test]
    fn invalid_descriptor_fails_before_packing() {
        let desc = RasterDescriptor {
            width: 1,
            height: 1,
            format: RasterFormat::new(2, 16),
            samples: vec![0, 0],
        };
        assert!(matches!(pack(&desc), Err(Error::UnsupportedFormat { channels: 2, bits: 16 })));
    }
}
