//! Ordered draw list for one frame.

use std::collections::HashSet;
use std::sync::Arc;

use super::layer::{LayerConfig, LayerKind};
use crate::geo::CoordinateSystem;
use crate::raster::PackedTexture;
use crate::{Error, Result};

/// A layer left out of the draw list and why.
#[derive(Debug, Clone, PartialEq)]
pub struct OmittedLayer {
    pub id: String,
    pub reason: String,
}

/// Layers in paint order: later entries composite over earlier ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    pub layers: Vec<LayerConfig>,
    pub omitted: Vec<OmittedLayer>,
}

impl DrawList {
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.layers.iter().map(LayerConfig::id).collect()
    }

    /// Textures the draw list needs on the GPU, keyed by layer id.
    pub fn texture_sources(&self) -> Vec<(&str, &Arc<PackedTexture>)> {
        self.layers
            .iter()
            .filter_map(|layer| layer.raster().map(|r| (r.id.as_str(), &r.texture)))
            .collect()
    }
}

fn paint_rank(kind: LayerKind) -> u8 {
    match kind {
        LayerKind::Background => 0,
        LayerKind::Basemap => 1,
        LayerKind::RasterPlain | LayerKind::RasterWindowed => 2,
        LayerKind::VectorLine => 3,
    }
}

/// Build the draw list from the current layer configurations.
///
/// Background first, then basemap, rasters in declaration order, and line
/// overlays last. Rasters whose bounds have zero area are omitted.
pub fn compose(layers: &[LayerConfig]) -> Result<DrawList> {
    let mut seen = HashSet::new();
    for layer in layers {
        if !seen.insert(layer.id()) {
            return Err(Error::DuplicateLayerId(layer.id().to_string()));
        }
    }

    let mut list = DrawList::default();
    for layer in layers {
        if let Some(raster) = layer.raster() {
            if let Err(e) = raster.bounds.validate() {
                tracing::warn!("Omitting layer '{}': {}", raster.id, e);
                list.omitted.push(OmittedLayer {
                    id: raster.id.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
            if raster.coordinate_system == CoordinateSystem::LngLat && raster.bounds.is_inverted() {
                tracing::warn!(
                    "Layer '{}' has inverted bounds {:?}: texture will be mirrored",
                    raster.id,
                    raster.bounds
                );
            }
        }
        list.layers.push(layer.clone());
    }

    // stable: rasters keep their declared order
    list.layers.sort_by_key(|layer| paint_rank(layer.kind()));

    tracing::debug!(
        "Composed {} layers ({} omitted)",
        list.layers.len(),
        list.omitted.len()
    );
    Ok(list)
}
