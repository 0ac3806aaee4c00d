//! Viewer configuration persistence.
//!
//! Stores the initial view, layer colors and the raster layer list as JSON
//! at `~/.local/share/geo-raster-view/config.json`. Loaded once on startup;
//! saved on every change so the file is always current.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::geo::{CoordinateSystem, GeoBoundsQuad, ViewState};
use crate::raster::{RasterPreset, WindowSettings};

/// Default config file path.
pub fn default_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("geo-raster-view")
        .join("config.json")
}

/// One raster layer of the default scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterLayerSettings {
    pub id: String,
    pub preset: RasterPreset,
    pub bounds: GeoBoundsQuad,
    /// `pixel` pins the raster to the screen instead of the map.
    #[serde(default)]
    pub coordinate_system: CoordinateSystem,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    /// Present only for windowed 16-bit layers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<WindowSettings>,
}

/// Persisted viewer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default)]
    pub initial_view: ViewState,
    #[serde(default = "default_background")]
    pub background_color: [u8; 3],
    #[serde(default = "default_basemap_color")]
    pub basemap_color: [u8; 3],
    #[serde(default = "default_latlon_line_color")]
    pub latlon_line_color: [u8; 3],
    /// Outline color for raster footprints.
    #[serde(default = "default_latlon_grid_color")]
    pub latlon_grid_color: [u8; 3],
    /// Outline color for the footprint of windowed rasters.
    #[serde(default = "default_highlight_color")]
    pub highlight_color: [u8; 4],
    #[serde(default)]
    pub show_footprints: bool,
    /// Local GeoJSON land polygons. The basemap is skipped when unset.
    #[serde(default)]
    pub basemap_path: Option<PathBuf>,
    #[serde(default = "default_basemap_url")]
    pub basemap_url: String,
    #[serde(default = "default_raster_size")]
    pub raster_width: u32,
    #[serde(default = "default_raster_size")]
    pub raster_height: u32,
    #[serde(default = "default_rasters")]
    pub rasters: Vec<RasterLayerSettings>,
    #[serde(default = "default_graticule_step")]
    pub graticule_step_degrees: f64,
    #[serde(default = "default_line_width")]
    pub line_width_px: f32,
    /// Upload 16-bit rasters as `R16Unorm` when the device supports it.
    #[serde(default = "default_true")]
    pub prefer_native_16bit: bool,
    /// Path the config was loaded from (not serialized).
    #[serde(skip)]
    path: PathBuf,
}

fn default_background() -> [u8; 3] { [32, 32, 32] }
fn default_basemap_color() -> [u8; 3] { [64, 64, 64] }
fn default_latlon_line_color() -> [u8; 3] { [127, 127, 127] }
fn default_latlon_grid_color() -> [u8; 3] { [127, 255, 127] }
fn default_highlight_color() -> [u8; 4] { [255, 127, 127, 127] }
fn default_basemap_url() -> String {
    "https://d2ad6b4ur7yvpq.cloudfront.net/naturalearth-3.3.0/ne_50m_land.geojson".into()
}
fn default_raster_size() -> u32 { 256 }
fn default_opacity() -> f32 { 0.75 }
fn default_graticule_step() -> f64 { 10.0 }
fn default_line_width() -> f32 { 1.0 }
fn default_true() -> bool { true }

fn default_rasters() -> Vec<RasterLayerSettings> {
    let layer = |id: &str, preset, west, east| RasterLayerSettings {
        id: id.into(),
        preset,
        bounds: GeoBoundsQuad::new(west, 20.0, east, 60.0),
        coordinate_system: CoordinateSystem::LngLat,
        opacity: default_opacity(),
        window: None,
    };
    vec![
        layer("grayscale8bpp-bitmap-layer", RasterPreset::Gray8, 100.0, 109.0),
        layer("rgba32bpp-bitmap-layer", RasterPreset::Rgba32, 90.0, 99.0),
        layer("rgb24bpp-bitmap-layer", RasterPreset::Rgb24, 80.0, 89.0),
        RasterLayerSettings {
            window: Some(WindowSettings {
                lower: 0.0,
                upper: 65535.0,
                gamma: 1.0,
            }),
            ..layer("grayscale16bpp-bitmap-layer", RasterPreset::Gray16, 120.0, 160.0)
        },
    ]
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            initial_view: ViewState::default(),
            background_color: default_background(),
            basemap_color: default_basemap_color(),
            latlon_line_color: default_latlon_line_color(),
            latlon_grid_color: default_latlon_grid_color(),
            highlight_color: default_highlight_color(),
            show_footprints: false,
            basemap_path: None,
            basemap_url: default_basemap_url(),
            raster_width: default_raster_size(),
            raster_height: default_raster_size(),
            rasters: default_rasters(),
            graticule_step_degrees: default_graticule_step(),
            line_width_px: default_line_width(),
            prefer_native_16bit: true,
            path: default_path(),
        }
    }
}

impl ViewerConfig {
    /// Load from the default location, falling back to defaults on any error.
    pub fn load() -> Self {
        Self::load_from(&default_path())
    }

    /// Load from `path`, falling back to defaults on any error.
    pub fn load_from(path: &Path) -> Self {
        let mut config = match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        };
        config.path = path.to_path_buf();
        config
    }

    /// Persist current config to disk.
    pub fn save(&self) {
        if let Err(e) = self.save_to(&self.path) {
            tracing::warn!("Failed to save config to {}: {}", self.path.display(), e);
        }
    }

    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Defaults with a different size for the generated rasters.
    pub fn with_raster_size(width: u32, height: u32) -> Self {
        Self {
            raster_width: width,
            raster_height: height,
            ..Self::default()
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store new window settings for a layer. Returns false if no such layer.
    pub fn set_window(&mut self, layer_id: &str, window: WindowSettings) -> bool {
        match self.rasters.iter_mut().find(|r| r.id == layer_id) {
            Some(raster) => {
                raster.window = Some(window);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_four_rasters() {
        let config = ViewerConfig::default();
        assert_eq!(config.rasters.len(), 4);
        let windowed: Vec<_> = config.rasters.iter().filter(|r| r.window.is_some()).collect();
        assert_eq!(windowed.len(), 1);
        assert_eq!(windowed[0].preset, RasterPreset::Gray16);
        assert!(config.rasters.iter().all(|r| !r.bounds.is_degenerate()));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: ViewerConfig = serde_json::from_str(r#"{"raster_width": 64}"#).unwrap();
        assert_eq!(config.raster_width, 64);
        assert_eq!(config.raster_height, 256);
        assert_eq!(config.background_color, [32, 32, 32]);
        assert_eq!(config.initial_view, ViewState::default());
    }

    #[test]
    fn raster_size_constructor_keeps_other_defaults() {
        let config = ViewerConfig::with_raster_size(8, 4);
        assert_eq!((config.raster_width, config.raster_height), (8, 4));
        assert_eq!(config.rasters, ViewerConfig::default().rasters);
        assert_eq!(config.path(), default_path().as_path());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut config = ViewerConfig::default();
        config.graticule_step_degrees = 15.0;
        assert!(config.set_window(
            "grayscale16bpp-bitmap-layer",
            WindowSettings { lower: 100.0, upper: 200.0, gamma: 2.2 },
        ));
        config.save_to(&path).unwrap();

        let loaded = ViewerConfig::load_from(&path);
        assert_eq!(loaded.graticule_step_degrees, 15.0);
        assert_eq!(loaded.rasters, config.rasters);
        assert_eq!(loaded.path(), path.as_path());
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let config = ViewerConfig::load_from(&path);
        assert_eq!(config.rasters.len(), 4);
    }
}
