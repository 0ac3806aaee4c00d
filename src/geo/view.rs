//! Map view state and the flat projection used by the viewer.

use serde::{Deserialize, Serialize};

/// World width in pixels at zoom 0.
pub const WORLD_SIZE_PX: f64 = 512.0;

const MIN_ZOOM: f64 = 0.0;
const MAX_ZOOM: f64 = 20.0;

/// Camera over the map: view center and zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub longitude: f64,
    pub latitude: f64,
    pub zoom: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            longitude: 140.0,
            latitude: 40.0,
            zoom: 1.0,
        }
    }
}

impl ViewState {
    pub fn pixels_per_degree(&self) -> f64 {
        WORLD_SIZE_PX / 360.0 * self.zoom.exp2()
    }

    /// Move the center by a screen-space drag of `(dx, dy)` pixels.
    pub fn panned_by(self, dx: f64, dy: f64) -> Self {
        let ppd = self.pixels_per_degree();
        Self {
            // Features are not repeated across the antimeridian, so the
            // center stops at the map edge instead of wrapping.
            longitude: (self.longitude - dx / ppd).clamp(-180.0, 180.0),
            latitude: (self.latitude + dy / ppd).clamp(-90.0, 90.0),
            zoom: self.zoom,
        }
    }

    /// Change zoom by `delta` levels, keeping the screen point `anchor`
    /// (relative to the viewport of `size`) fixed on the map.
    pub fn zoomed_at(self, delta: f64, anchor: [f64; 2], size: [f64; 2]) -> Self {
        let before = Equirectangular::new(self, size[0], size[1]);
        let pinned = before.unproject(anchor[0], anchor[1]);
        let zoomed = Self {
            zoom: (self.zoom + delta).clamp(MIN_ZOOM, MAX_ZOOM),
            ..self
        };
        let after = Equirectangular::new(zoomed, size[0], size[1]);
        let drift = after.project(pinned[0], pinned[1]);
        zoomed.panned_by(anchor[0] - drift[0], anchor[1] - drift[1])
    }
}

/// Maps geographic coordinates to viewport pixels.
pub trait Projection {
    /// Pixel position (from the viewport's top-left) of `lon`/`lat`.
    fn project(&self, lon: f64, lat: f64) -> [f64; 2];

    /// Inverse of [`Projection::project`].
    fn unproject(&self, x: f64, y: f64) -> [f64; 2];
}

/// Plate carrée projection centered on a [`ViewState`].
#[derive(Debug, Clone, Copy)]
pub struct Equirectangular {
    view: ViewState,
    width: f64,
    height: f64,
    ppd: f64,
}

impl Equirectangular {
    pub fn new(view: ViewState, width: f64, height: f64) -> Self {
        Self {
            view,
            width,
            height,
            ppd: view.pixels_per_degree(),
        }
    }

    pub fn view(&self) -> ViewState {
        self.view
    }
}

impl Projection for Equirectangular {
    fn project(&self, lon: f64, lat: f64) -> [f64; 2] {
        [
            self.width / 2.0 + (lon - self.view.longitude) * self.ppd,
            self.height / 2.0 - (lat - self.view.latitude) * self.ppd,
        ]
    }

    fn unproject(&self, x: f64, y: f64) -> [f64; 2] {
        [
            self.view.longitude + (x - self.width / 2.0) / self.ppd,
            self.view.latitude - (y - self.height / 2.0) / self.ppd,
        ]
    }
}
