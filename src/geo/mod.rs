//! Geographic placement: bounding boxes, the map view and vector overlays.

pub mod bounds;
pub mod vector;
pub mod view;

pub use bounds::{place_quad, CoordinateSystem, GeoBoundsQuad, PlacedQuad};
pub use vector::{graticule, LineGeometry, LineString};
pub use view::{Equirectangular, Projection, ViewState};
