//! Raw raster sample arrays and their declared layout.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Channel count and bit depth of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RasterFormat {
    pub channels: u8,
    pub bits: u8,
}

impl RasterFormat {
    pub const GRAY8: Self = Self { channels: 1, bits: 8 };
    pub const RGB8: Self = Self { channels: 3, bits: 8 };
    pub const RGBA8: Self = Self { channels: 4, bits: 8 };
    pub const GRAY16: Self = Self { channels: 1, bits: 16 };

    pub fn new(channels: u8, bits: u8) -> Self {
        Self { channels, bits }
    }

    /// Largest sample value representable at this bit depth.
    pub fn max_value(&self) -> u32 {
        if self.bits >= 32 {
            u32::MAX
        } else {
            (1u32 << self.bits) - 1
        }
    }

    /// Fails with `UnsupportedFormat` unless this is one of the four packable layouts.
    pub fn ensure_supported(&self) -> Result<()> {
        match *self {
            Self::GRAY8 | Self::RGB8 | Self::RGBA8 | Self::GRAY16 => Ok(()),
            _ => Err(Error::UnsupportedFormat {
                channels: self.channels,
                bits: self.bits,
            }),
        }
    }
}

impl std::fmt::Display for RasterFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ch/{}bit", self.channels, self.bits)
    }
}

/// Named raster layouts used by configuration and tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RasterPreset {
    Gray8,
    Rgb24,
    Rgba32,
    Gray16,
}

impl RasterPreset {
    pub fn format(self) -> RasterFormat {
        match self {
            Self::Gray8 => RasterFormat::GRAY8,
            Self::Rgb24 => RasterFormat::RGB8,
            Self::Rgba32 => RasterFormat::RGBA8,
            Self::Gray16 => RasterFormat::GRAY16,
        }
    }
}

/// A decoded raster: `width * height * channels` samples in row-major,
/// channel-interleaved order.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterDescriptor {
    pub width: u32,
    pub height: u32,
    pub format: RasterFormat,
    pub samples: Vec<u32>,
}

impl RasterDescriptor {
    /// Build a descriptor, checking every invariant up front.
    pub fn new(width: u32, height: u32, format: RasterFormat, samples: Vec<u32>) -> Result<Self> {
        let desc = Self {
            width,
            height,
            format,
            samples,
        };
        desc.validate()?;
        Ok(desc)
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn expected_len(&self) -> usize {
        self.pixel_count() * self.format.channels as usize
    }

    /// Check dimensions, supported layout, sample count and sample range.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::EmptyRaster {
                width: self.width,
                height: self.height,
            });
        }
        self.format.ensure_supported()?;

        let expected = self.expected_len();
        if self.samples.len() != expected {
            return Err(Error::SampleCountMismatch {
                expected,
                actual: self.samples.len(),
            });
        }

        let max = self.format.max_value();
        if let Some((index, &value)) = self.samples.iter().enumerate().find(|(_, v)| **v > max) {
            return Err(Error::SampleOutOfRange {
                index,
                value,
                bits: self.format.bits,
            });
        }
        Ok(())
    }

    /// Samples of pixel `(x, y)`, one per channel.
    pub fn pixel(&self, x: u32, y: u32) -> &[u32] {
        let channels = self.format.channels as usize;
        let start = (y as usize * self.width as usize + x as usize) * channels;
        &self.samples[start..start + channels]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unsupported_combinations() {
        for (channels, bits) in [(2, 8), (3, 16), (4, 16), (1, 12), (1, 32)] {
            let format = RasterFormat::new(channels, bits);
            let err = format.ensure_supported().unwrap_err();
            assert!(
                matches!(err, Error::UnsupportedFormat { .. }),
                "{format} should be unsupported, got {err:?}"
            );
        }
    }

    #[test]
    fn rejects_wrong_sample_count() {
        let err = RasterDescriptor::new(2, 2, RasterFormat::RGB8, vec![0; 11]).unwrap_err();
        assert!(matches!(err, Error::SampleCountMismatch { expected: 12, actual: 11 }));
    }

    #[test]
    fn rejects_out_of_range_sample() {
        let err = RasterDescriptor::new(2, 1, RasterFormat::GRAY8, vec![10, 256]).unwrap_err();
        assert!(matches!(err, Error::SampleOutOfRange { index: 1, value: 256, bits: 8 }));

        let ok = RasterDescriptor::new(2, 1, RasterFormat::GRAY16, vec![0, 65535]);
        assert!(ok.is_ok());
        let err = RasterDescriptor::new(1, 1, RasterFormat::GRAY16, vec![65536]).unwrap_err();
        assert!(matches!(err, Error::SampleOutOfRange { bits: 16, .. }));
    }

    #[test]
    fn rejects_empty_raster() {
        let err = RasterDescriptor::new(0, 4, RasterFormat::GRAY8, vec![]).unwrap_err();
        assert!(matches!(err, Error::EmptyRaster { width: 0, height: 4 }));
    }

    #[test]
    fn pixel_returns_interleaved_channels() {
        let desc =
            RasterDescriptor::new(2, 1, RasterFormat::RGB8, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(desc.pixel(1, 0), &[4, 5, 6]);
    }
}
