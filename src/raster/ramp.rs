//! Synthetic sample buffers.
//!
//! The demo payload is a vertical luminance ramp: every pixel of row `j`
//! carries `trunc(j / height * max)`, so brightness grows from the first row
//! to the last and is constant across each row.

use super::descriptor::{RasterDescriptor, RasterFormat};
use crate::Result;

/// Luminance of row `row` in a ramp of `height` rows at the given bit depth.
pub fn ramp_luminance(row: u32, height: u32, format: RasterFormat) -> u32 {
    (row as f64 / height as f64 * format.max_value() as f64) as u32
}

/// Vertical luminance ramp in any supported format.
///
/// Color channels replicate the luminance; RGBA alpha is fully opaque.
pub fn vertical_ramp(width: u32, height: u32, format: RasterFormat) -> Result<RasterDescriptor> {
    format.ensure_supported()?;
    let channels = format.channels as usize;
    let mut samples = Vec::with_capacity(width as usize * height as usize * channels);
    for row in 0..height {
        let pixel = pixel_for(ramp_luminance(row, height, format), format);
        for _ in 0..width {
            samples.extend_from_slice(&pixel[..channels]);
        }
    }
    RasterDescriptor::new(width, height, format, samples)
}

/// Raster where every pixel has luminance `value`.
pub fn constant(width: u32, height: u32, format: RasterFormat, value: u32) -> Result<RasterDescriptor> {
    format.ensure_supported()?;
    let channels = format.channels as usize;
    let pixel = pixel_for(value, format);
    let samples = pixel[..channels].repeat(width as usize * height as usize);
    RasterDescriptor::new(width, height, format, samples)
}

fn pixel_for(luminance: u32, format: RasterFormat) -> [u32; 4] {
    [luminance, luminance, luminance, format.max_value()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gray16_ramp_rows() {
        let ramp = vertical_ramp(4, 256, RasterFormat::GRAY16).unwrap();
        assert_eq!(ramp.samples.len(), 4 * 256);
        assert_eq!(ramp.pixel(0, 0), &[0]);
        assert_eq!(ramp.pixel(3, 128), &[32767]);
        assert_eq!(ramp.pixel(2, 255), &[65279]);
    }

    #[test]
    fn gray8_ramp_truncates() {
        let ramp = vertical_ramp(1, 256, RasterFormat::GRAY8).unwrap();
        // 1/256 * 255 = 0.996 -> 0
        assert_eq!(ramp.pixel(0, 1), &[0]);
        assert_eq!(ramp.pixel(0, 2), &[1]);
        assert_eq!(ramp.pixel(0, 255), &[254]);
    }

    #[test]
    fn rgba_ramp_is_opaque_gray() {
        let ramp = vertical_ramp(2, 4, RasterFormat::RGBA8).unwrap();
        assert_eq!(ramp.pixel(1, 2), &[127, 127, 127, 255]);
    }

    #[test]
    fn ramp_is_monotonic_down_the_rows() {
        let ramp = vertical_ramp(1, 300, RasterFormat::GRAY16).unwrap();
        assert!(ramp.samples.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn constant_fills_every_channel() {
        let raster = constant(3, 2, RasterFormat::RGB8, 200).unwrap();
        assert_eq!(raster.samples.len(), 18);
        assert!(raster.samples.iter().all(|&s| s == 200));
    }

    #[test]
    fn unsupported_format_is_rejected() {
        assert!(vertical_ramp(2, 2, RasterFormat::new(2, 8)).is_err());
    }
}
