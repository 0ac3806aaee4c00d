//! Geographic bounding boxes and textured-quad placement.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Longitude/latitude rectangle in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBoundsQuad {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl GeoBoundsQuad {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// The whole globe.
    pub fn world() -> Self {
        Self::new(-180.0, -90.0, 180.0, 90.0)
    }

    /// Zero width or height, or a non-finite edge.
    pub fn is_degenerate(&self) -> bool {
        let edges = [self.west, self.south, self.east, self.north];
        edges.iter().any(|v| !v.is_finite()) || self.west == self.east || self.south == self.north
    }

    /// West above east or south above north; still drawable, just mirrored.
    pub fn is_inverted(&self) -> bool {
        self.west > self.east || self.south > self.north
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_degenerate() {
            return Err(Error::DegenerateBounds {
                west: self.west,
                south: self.south,
                east: self.east,
                north: self.north,
            });
        }
        Ok(())
    }

    /// Corners in draw order: north-west, north-east, south-east, south-west.
    pub fn corners(&self) -> [[f64; 2]; 4] {
        [
            [self.west, self.north],
            [self.east, self.north],
            [self.east, self.south],
            [self.west, self.south],
        ]
    }
}

/// Space the corner coordinates of a quad are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateSystem {
    /// Longitude/latitude degrees, projected by the view.
    #[default]
    LngLat,
    /// Screen pixels from the top-left of the viewport.
    Pixel,
}

/// Texture coordinates matching [`GeoBoundsQuad::corners`]: row 0 of the
/// texture sits on the north edge.
pub const QUAD_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// A validated quad ready for the host quad primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedQuad {
    pub corners: [[f64; 2]; 4],
    pub uvs: [[f32; 2]; 4],
    pub coordinate_system: CoordinateSystem,
}

/// Place a texture over `bounds`.
///
/// Degenerate boxes come back as `DegenerateBounds` so the caller can drop
/// the quad; inverted boxes are placed as given. Runs every frame, so it
/// does not log.
pub fn place_quad(bounds: &GeoBoundsQuad, coordinate_system: CoordinateSystem) -> Result<PlacedQuad> {
    bounds.validate()?;
    Ok(PlacedQuad {
        corners: bounds.corners(),
        uvs: QUAD_UVS,
        coordinate_system,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_width_or_height_is_degenerate() {
        assert!(GeoBoundsQuad::new(10.0, 0.0, 10.0, 5.0).is_degenerate());
        assert!(GeoBoundsQuad::new(0.0, 5.0, 10.0, 5.0).is_degenerate());
        assert!(GeoBoundsQuad::new(0.0, f64::NAN, 10.0, 5.0).is_degenerate());
        assert!(!GeoBoundsQuad::new(120.0, 20.0, 160.0, 60.0).is_degenerate());
    }

    #[test]
    fn degenerate_placement_is_an_error_not_a_panic() {
        let err = place_quad(&GeoBoundsQuad::new(1.0, 1.0, 1.0, 1.0), CoordinateSystem::LngLat)
            .unwrap_err();
        assert!(matches!(err, Error::DegenerateBounds { .. }));
    }

    #[test]
    fn inverted_bounds_still_place() {
        let bounds = GeoBoundsQuad::new(100.0, 60.0, 109.0, 20.0);
        assert!(bounds.is_inverted());
        let quad = place_quad(&bounds, CoordinateSystem::LngLat).unwrap();
        assert_eq!(quad.corners[0], [100.0, 20.0]);
    }

    #[test]
    fn texture_top_row_sits_on_north_edge() {
        let quad = place_quad(&GeoBoundsQuad::new(120.0, 20.0, 160.0, 60.0), CoordinateSystem::LngLat)
            .unwrap();
        for (corner, uv) in quad.corners.iter().zip(quad.uvs) {
            let expected_lat = if uv[1] == 0.0 { 60.0 } else { 20.0 };
            assert_eq!(corner[1], expected_lat);
        }
    }
}
