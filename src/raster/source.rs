//! Decoding raster files into sample arrays.

use std::path::Path;

use image::DynamicImage;

use super::descriptor::{RasterDescriptor, RasterFormat};
use crate::{Error, Result};

/// Convert a decoded image into a raster descriptor without changing bit depth.
///
/// Only 8-bit gray, RGB, RGBA and 16-bit gray images map onto a packable layout.
pub fn from_image(img: DynamicImage) -> Result<RasterDescriptor> {
    let (width, height) = (img.width(), img.height());
    let (format, samples): (RasterFormat, Vec<u32>) = match img {
        DynamicImage::ImageLuma8(buf) => (RasterFormat::GRAY8, widen(buf.into_raw())),
        DynamicImage::ImageRgb8(buf) => (RasterFormat::RGB8, widen(buf.into_raw())),
        DynamicImage::ImageRgba8(buf) => (RasterFormat::RGBA8, widen(buf.into_raw())),
        DynamicImage::ImageLuma16(buf) => (RasterFormat::GRAY16, widen(buf.into_raw())),
        other => {
            let color = other.color();
            return Err(Error::UnsupportedFormat {
                channels: color.channel_count(),
                bits: (color.bits_per_pixel() / color.channel_count() as u16) as u8,
            });
        }
    };
    RasterDescriptor::new(width, height, format, samples)
}

/// Load a raster from an image file on disk.
pub fn load_image(path: &Path) -> Result<RasterDescriptor> {
    let img = image::open(path)?;
    tracing::debug!("Decoded raster {} ({:?})", path.display(), img.color());
    from_image(img)
}

fn widen<T: Into<u32>>(raw: Vec<T>) -> Vec<u32> {
    raw.into_iter().map(Into::into).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, Rgb};

    #[test]
    fn luma16_keeps_full_precision() {
        let buf: ImageBuffer<Luma<u16>, Vec<u16>> =
            ImageBuffer::from_raw(2, 1, vec![0x1234, 0xffff]).unwrap();
        let desc = from_image(DynamicImage::ImageLuma16(buf)).unwrap();
        assert_eq!(desc.format, RasterFormat::GRAY16);
        assert_eq!(desc.samples, vec![0x1234, 0xffff]);
    }

    #[test]
    fn rgb8_is_interleaved() {
        let buf: ImageBuffer<Rgb<u8>, Vec<u8>> =
            ImageBuffer::from_raw(1, 2, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let desc = from_image(DynamicImage::ImageRgb8(buf)).unwrap();
        assert_eq!(desc.format, RasterFormat::RGB8);
        assert_eq!(desc.pixel(0, 1), &[4, 5, 6]);
    }

    #[test]
    fn rgba16_is_unsupported() {
        let img = DynamicImage::new_rgba16(2, 2);
        let err = from_image(img).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { channels: 4, bits: 16 }));
    }
}
