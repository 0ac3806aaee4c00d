//! Layer configurations, one variant per kind of renderable.
//!
//! Every variant is built through a validating constructor, so a windowed
//! raster without window parameters or with an 8-bit texture cannot exist.

use std::sync::Arc;

use crate::geo::{CoordinateSystem, GeoBoundsQuad, LineGeometry};
use crate::raster::{PackedTexture, PixelFormat, WindowParameters};
use crate::{Error, Result};

/// RGBA color, 0-255 per channel.
pub type Color = [u8; 4];

/// Convert an 8-bit color to normalized floats.
pub fn color_to_f32(color: Color) -> [f32; 4] {
    color.map(|c| c as f32 / 255.0)
}

/// Kind tag of a layer, used for ordering and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerKind {
    Background,
    Basemap,
    RasterPlain,
    RasterWindowed,
    VectorLine,
}

impl LayerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Basemap => "basemap",
            Self::RasterPlain => "raster-plain",
            Self::RasterWindowed => "raster-windowed",
            Self::VectorLine => "vector-line",
        }
    }
}

/// A texture draped over a box.
///
/// With `CoordinateSystem::Pixel` the box is in screen pixels from the
/// viewport's top-left: west/east are x, north/south are y.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterLayer {
    pub id: String,
    pub bounds: GeoBoundsQuad,
    pub coordinate_system: CoordinateSystem,
    pub texture: Arc<PackedTexture>,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayerConfig {
    Background {
        id: String,
        bounds: GeoBoundsQuad,
        color: Color,
    },
    Basemap {
        id: String,
        geometry: Arc<LineGeometry>,
        color: Color,
    },
    RasterPlain(RasterLayer),
    RasterWindowed {
        raster: RasterLayer,
        window: WindowParameters,
    },
    VectorLine {
        id: String,
        geometry: Arc<LineGeometry>,
        color: Color,
        width_px: f32,
    },
}

impl LayerConfig {
    /// Solid fill over the whole globe.
    pub fn background(id: impl Into<String>, color: Color) -> Self {
        Self::Background {
            id: id.into(),
            bounds: GeoBoundsQuad::world(),
            color,
        }
    }

    pub fn basemap(id: impl Into<String>, geometry: Arc<LineGeometry>, color: Color) -> Self {
        Self::Basemap {
            id: id.into(),
            geometry,
            color,
        }
    }

    /// 8-bit gray, RGB or RGBA texture drawn as-is.
    pub fn raster_plain(
        id: impl Into<String>,
        bounds: GeoBoundsQuad,
        texture: Arc<PackedTexture>,
        opacity: f32,
    ) -> Result<Self> {
        let id = id.into();
        if texture.is_high_bit_depth() {
            return Err(mismatch(&id, "8-bit", &texture));
        }
        let opacity = checked_opacity(&id, opacity)?;
        Ok(Self::RasterPlain(RasterLayer {
            id,
            bounds,
            coordinate_system: CoordinateSystem::LngLat,
            texture,
            opacity,
        }))
    }

    /// 16-bit gray texture shown through a contrast window.
    pub fn raster_windowed(
        id: impl Into<String>,
        bounds: GeoBoundsQuad,
        texture: Arc<PackedTexture>,
        opacity: f32,
        window: WindowParameters,
    ) -> Result<Self> {
        let id = id.into();
        if texture.pixel_format != PixelFormat::LuminanceAlpha {
            return Err(mismatch(&id, "16-bit gray", &texture));
        }
        let opacity = checked_opacity(&id, opacity)?;
        Ok(Self::RasterWindowed {
            raster: RasterLayer {
                id,
                bounds,
                coordinate_system: CoordinateSystem::LngLat,
                texture,
                opacity,
            },
            window,
        })
    }

    pub fn vector_line(
        id: impl Into<String>,
        geometry: Arc<LineGeometry>,
        color: Color,
        width_px: f32,
    ) -> Self {
        Self::VectorLine {
            id: id.into(),
            geometry,
            color,
            width_px: width_px.max(0.0),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Background { id, .. }
            | Self::Basemap { id, .. }
            | Self::VectorLine { id, .. } => id,
            Self::RasterPlain(raster) | Self::RasterWindowed { raster, .. } => &raster.id,
        }
    }

    pub fn kind(&self) -> LayerKind {
        match self {
            Self::Background { .. } => LayerKind::Background,
            Self::Basemap { .. } => LayerKind::Basemap,
            Self::RasterPlain(_) => LayerKind::RasterPlain,
            Self::RasterWindowed { .. } => LayerKind::RasterWindowed,
            Self::VectorLine { .. } => LayerKind::VectorLine,
        }
    }

    pub fn raster(&self) -> Option<&RasterLayer> {
        match self {
            Self::RasterPlain(raster) | Self::RasterWindowed { raster, .. } => Some(raster),
            _ => None,
        }
    }

    /// Read a raster's box in `coordinate_system`. Other layers are
    /// returned unchanged.
    pub fn in_coordinate_system(mut self, coordinate_system: CoordinateSystem) -> Self {
        if let Self::RasterPlain(raster) | Self::RasterWindowed { raster, .. } = &mut self {
            raster.coordinate_system = coordinate_system;
        }
        self
    }

    /// A copy of this windowed layer with a different window.
    ///
    /// The texture is shared, so no repacking happens.
    pub fn with_window(&self, window: WindowParameters) -> Result<Self> {
        match self {
            Self::RasterWindowed { raster, .. } => Ok(Self::RasterWindowed {
                raster: raster.clone(),
                window,
            }),
            other => Err(Error::Other(format!(
                "layer '{}' is {}, not a windowed raster",
                other.id(),
                other.kind().as_str()
            ))),
        }
    }
}

fn checked_opacity(id: &str, opacity: f32) -> Result<f32> {
    if opacity.is_nan() {
        return Err(Error::Other(format!("layer '{id}': opacity is NaN")));
    }
    Ok(opacity.clamp(0.0, 1.0))
}

fn mismatch(id: &str, expected: &str, texture: &PackedTexture) -> Error {
    Error::LayerTextureMismatch {
        layer: id.to_string(),
        expected: expected.to_string(),
        actual: texture.source_format.to_string(),
    }
}
