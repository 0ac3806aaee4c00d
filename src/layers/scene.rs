//! The default scene: background, land outlines, the four demo rasters and
//! the lat/lon graticule.

use std::sync::Arc;

use super::composition::{compose, DrawList};
use super::layer::{Color, LayerConfig};
use crate::config::{RasterLayerSettings, ViewerConfig};
use crate::geo::{graticule, CoordinateSystem, LineGeometry};
use crate::raster::{pack, ramp, WindowParameters};
use crate::{Error, Result};

pub const BACKGROUND_ID: &str = "background-layer";
pub const BASEMAP_ID: &str = "map-layer";
pub const LATLON_ID: &str = "latlon-line-layer";
pub const FOOTPRINTS_ID: &str = "raster-footprints";
pub const WINDOWED_FOOTPRINTS_ID: &str = "windowed-footprints";

/// Layer configurations plus the layers that could not be built.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub layers: Vec<LayerConfig>,
    pub rejected: Vec<(String, String)>,
}

impl Scene {
    pub fn draw_list(&self) -> Result<DrawList> {
        compose(&self.layers)
    }

    /// Replace the window of a windowed raster with a new configuration.
    pub fn set_window(&mut self, layer_id: &str, window: WindowParameters) -> Result<()> {
        let slot = self
            .layers
            .iter_mut()
            .find(|l| l.id() == layer_id)
            .ok_or_else(|| Error::Other(format!("no layer '{layer_id}'")))?;
        *slot = slot.with_window(window)?;
        Ok(())
    }

    /// Current window of a windowed raster.
    pub fn window(&self, layer_id: &str) -> Option<WindowParameters> {
        self.layers.iter().find_map(|l| match l {
            LayerConfig::RasterWindowed { raster, window } if raster.id == layer_id => {
                Some(*window)
            }
            _ => None,
        })
    }

    /// Id of the first windowed raster, if any.
    pub fn first_windowed(&self) -> Option<&str> {
        self.layers.iter().find_map(|l| match l {
            LayerConfig::RasterWindowed { raster, .. } => Some(raster.id.as_str()),
            _ => None,
        })
    }
}

fn opaque(rgb: [u8; 3]) -> Color {
    [rgb[0], rgb[1], rgb[2], 255]
}

/// Read the basemap named in the config, if any.
pub fn load_basemap(config: &ViewerConfig) -> Option<Arc<LineGeometry>> {
    let Some(path) = &config.basemap_path else {
        tracing::info!("No basemap_path set, skipping basemap ({})", config.basemap_url);
        return None;
    };
    match LineGeometry::load_geojson(path) {
        Ok(geometry) => Some(Arc::new(geometry)),
        Err(e) => {
            tracing::warn!("Basemap {} not loaded: {}", path.display(), e);
            None
        }
    }
}

fn build_raster(
    settings: &RasterLayerSettings,
    width: u32,
    height: u32,
) -> Result<LayerConfig> {
    let descriptor = ramp::vertical_ramp(width, height, settings.preset.format())?;
    let texture = Arc::new(pack(&descriptor)?);
    let layer = match settings.window {
        Some(window) => LayerConfig::raster_windowed(
            settings.id.clone(),
            settings.bounds,
            texture,
            settings.opacity,
            WindowParameters::try_from(window)?,
        ),
        None => LayerConfig::raster_plain(
            settings.id.clone(),
            settings.bounds,
            texture,
            settings.opacity,
        ),
    }?;
    Ok(layer.in_coordinate_system(settings.coordinate_system))
}

fn footprint(settings: &RasterLayerSettings) -> Vec<[f64; 2]> {
    let corners = settings.bounds.corners();
    let mut ring = corners.to_vec();
    ring.push(corners[0]);
    ring
}

/// Build every layer of the default scene.
///
/// A raster that fails to build is left out and recorded in
/// [`Scene::rejected`]; the rest of the scene is unaffected.
pub fn build_scene(config: &ViewerConfig, basemap: Option<Arc<LineGeometry>>) -> Scene {
    let mut scene = Scene::default();
    scene
        .layers
        .push(LayerConfig::background(BACKGROUND_ID, opaque(config.background_color)));
    if let Some(geometry) = basemap {
        scene
            .layers
            .push(LayerConfig::basemap(BASEMAP_ID, geometry, opaque(config.basemap_color)));
    }

    for settings in &config.rasters {
        match build_raster(settings, config.raster_width, config.raster_height) {
            Ok(layer) => scene.layers.push(layer),
            Err(e) => {
                tracing::warn!("Raster layer '{}' left out: {}", settings.id, e);
                scene.rejected.push((settings.id.clone(), e.to_string()));
            }
        }
    }

    scene.layers.push(LayerConfig::vector_line(
        LATLON_ID,
        Arc::new(graticule(config.graticule_step_degrees)),
        opaque(config.latlon_line_color),
        config.line_width_px,
    ));

    if config.show_footprints {
        let (windowed, plain): (Vec<_>, Vec<_>) = config
            .rasters
            .iter()
            .filter(|r| r.coordinate_system == CoordinateSystem::LngLat)
            .partition(|r| r.window.is_some());
        scene.layers.push(LayerConfig::vector_line(
            FOOTPRINTS_ID,
            Arc::new(LineGeometry { lines: plain.into_iter().map(footprint).collect() }),
            opaque(config.latlon_grid_color),
            config.line_width_px,
        ));
        scene.layers.push(LayerConfig::vector_line(
            WINDOWED_FOOTPRINTS_ID,
            Arc::new(LineGeometry { lines: windowed.into_iter().map(footprint).collect() }),
            config.highlight_color,
            config.line_width_px,
        ));
    }

    tracing::debug!(
        "Built scene with {} layers ({} rejected)",
        scene.layers.len(),
        scene.rejected.len()
    );
    scene
}
