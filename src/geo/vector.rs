//! Line geometry for basemap outlines and the lat/lon graticule.

use std::path::Path;

use serde_json::Value;

use crate::{Error, Result};

/// A polyline of `[lon, lat]` vertices.
pub type LineString = Vec<[f64; 2]>;

/// Collection of polylines sharing one style.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineGeometry {
    pub lines: Vec<LineString>,
}

impl LineGeometry {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn segment_count(&self) -> usize {
        self.lines.iter().map(|l| l.len().saturating_sub(1)).sum()
    }

    /// Parse GeoJSON text. Polygon rings become closed polylines.
    pub fn from_geojson_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        let mut geometry = Self::default();
        collect_lines(&value, &mut geometry.lines)?;
        Ok(geometry)
    }

    pub fn load_geojson(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let geometry = Self::from_geojson_str(&text)?;
        tracing::debug!(
            "Loaded {} polylines from {}",
            geometry.lines.len(),
            path.display()
        );
        Ok(geometry)
    }
}

fn collect_lines(value: &Value, out: &mut Vec<LineString>) -> Result<()> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::GeoJson("object without a \"type\"".into()))?;

    match kind {
        "FeatureCollection" => {
            for feature in array_field(value, "features")? {
                collect_lines(feature, out)?;
            }
        }
        "Feature" => match value.get("geometry") {
            Some(Value::Null) | None => {}
            Some(geometry) => collect_lines(geometry, out)?,
        },
        "GeometryCollection" => {
            for geometry in array_field(value, "geometries")? {
                collect_lines(geometry, out)?;
            }
        }
        "LineString" => out.push(parse_ring(coordinates(value)?)?),
        "MultiLineString" | "Polygon" => {
            for ring in as_array(coordinates(value)?)? {
                out.push(parse_ring(ring)?);
            }
        }
        "MultiPolygon" => {
            for polygon in as_array(coordinates(value)?)? {
                for ring in as_array(polygon)? {
                    out.push(parse_ring(ring)?);
                }
            }
        }
        "Point" | "MultiPoint" => {}
        other => return Err(Error::GeoJson(format!("unknown geometry type {other}"))),
    }
    Ok(())
}

fn array_field<'a>(value: &'a Value, key: &str) -> Result<&'a Vec<Value>> {
    value
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| Error::GeoJson(format!("missing \"{key}\" array")))
}

fn coordinates(value: &Value) -> Result<&Value> {
    value
        .get("coordinates")
        .ok_or_else(|| Error::GeoJson("geometry without coordinates".into()))
}

fn as_array(value: &Value) -> Result<&Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| Error::GeoJson("expected a coordinate array".into()))
}

fn parse_ring(value: &Value) -> Result<LineString> {
    as_array(value)?
        .iter()
        .map(|pos| {
            let pos = as_array(pos)?;
            match (pos.first().and_then(Value::as_f64), pos.get(1).and_then(Value::as_f64)) {
                (Some(lon), Some(lat)) => Ok([lon, lat]),
                _ => Err(Error::GeoJson("position needs two numbers".into())),
            }
        })
        .collect()
}

/// Meridians and parallels every `step` degrees.
///
/// Lines are densified at the same step so they stay smooth under
/// non-linear projections.
pub fn graticule(step: f64) -> LineGeometry {
    let step = if step.is_finite() && step > 0.0 { step } else { 10.0 };
    let mut lines = Vec::new();

    for lon in stops(-180.0, 180.0, step) {
        lines.push(stops(-90.0, 90.0, step).map(|lat| [lon, lat]).collect());
    }
    for lat in stops(-90.0, 90.0, step) {
        lines.push(stops(-180.0, 180.0, step).map(|lon| [lon, lat]).collect());
    }
    LineGeometry { lines }
}

/// `start, start + step, ...` up to and including `end`.
fn stops(start: f64, end: f64, step: f64) -> impl Iterator<Item = f64> {
    let count = ((end - start) / step).floor() as usize;
    let last = start + count as f64 * step;
    let tail = (last < end).then_some(end);
    (0..=count).map(move |i| start + i as f64 * step).chain(tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graticule_covers_the_globe() {
        let grid = graticule(10.0);
        // 37 meridians + 19 parallels
        assert_eq!(grid.lines.len(), 37 + 19);
        let first = &grid.lines[0];
        assert_eq!(first.first(), Some(&[-180.0, -90.0]));
        assert_eq!(first.last(), Some(&[-180.0, 90.0]));
    }

    #[test]
    fn graticule_with_uneven_step_reaches_the_edge() {
        let grid = graticule(25.0);
        for line in &grid.lines {
            let end = line.last().unwrap();
            assert!(end[0] == 180.0 || end[1] == 90.0, "line ends at {end:?}");
        }
    }

    #[test]
    fn parses_polygons_and_lines() {
        let text = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {}, "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0,0],[10,0],[10,10],[0,0]]]
                }},
                {"type": "Feature", "properties": {}, "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [[[[1,1],[2,1],[2,2],[1,1]]], [[[5,5],[6,5],[6,6],[5,5]]]]
                }},
                {"type": "Feature", "properties": {}, "geometry": {
                    "type": "LineString", "coordinates": [[0,0],[1,1]]
                }},
                {"type": "Feature", "properties": {}, "geometry": null}
            ]
        }"#;
        let geometry = LineGeometry::from_geojson_str(text).unwrap();
        assert_eq!(geometry.lines.len(), 4);
        assert_eq!(geometry.segment_count(), 3 + 3 + 3 + 1);
    }

    #[test]
    fn rejects_malformed_positions() {
        let text = r#"{"type": "LineString", "coordinates": [[0], [1, 1]]}"#;
        assert!(matches!(
            LineGeometry::from_geojson_str(text),
            Err(Error::GeoJson(_))
        ));
    }
}
