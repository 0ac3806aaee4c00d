//! Turns a draw list into screen-space quads for one frame.

use iced::{Point, Rectangle, Size};

use super::quad::{DrawKind, QuadBatch};
use crate::geo::{place_quad, CoordinateSystem, GeoBoundsQuad, LineGeometry, Projection};
use crate::layers::{color_to_f32, Color, DrawList, LayerConfig, RasterLayer};

/// Basemap outlines are always this wide.
const BASEMAP_LINE_WIDTH: f32 = 1.0;

/// Tessellate `list` for a viewport of `size` logical pixels.
pub fn build_frame(list: &DrawList, projection: &impl Projection, size: Size) -> QuadBatch {
    let mut batch = QuadBatch::new();
    let viewport = Rectangle::new(Point::ORIGIN, size);

    for layer in &list.layers {
        match layer {
            LayerConfig::Background { bounds, color, .. } => {
                if let Some(rect) = screen_rect(bounds, projection, viewport) {
                    batch.push_solid(rect, color_to_f32(*color));
                }
            }
            LayerConfig::Basemap { geometry, color, .. } => {
                push_lines(&mut batch, geometry, projection, viewport, BASEMAP_LINE_WIDTH, *color);
            }
            LayerConfig::VectorLine {
                geometry,
                color,
                width_px,
                ..
            } => {
                push_lines(&mut batch, geometry, projection, viewport, *width_px, *color);
            }
            LayerConfig::RasterPlain(raster) => {
                batch.begin(DrawKind::Plain {
                    layer_id: raster.id.clone(),
                    opacity: raster.opacity,
                });
                push_raster(&mut batch, raster, projection);
            }
            LayerConfig::RasterWindowed { raster, window } => {
                batch.begin(DrawKind::Windowed {
                    layer_id: raster.id.clone(),
                    opacity: raster.opacity,
                    window: *window,
                });
                push_raster(&mut batch, raster, projection);
            }
        }
    }
    batch
}

fn project(projection: &impl Projection, p: [f64; 2]) -> [f32; 2] {
    let [x, y] = projection.project(p[0], p[1]);
    [x as f32, y as f32]
}

/// Projected `bounds` clipped to the viewport.
fn screen_rect(
    bounds: &GeoBoundsQuad,
    projection: &impl Projection,
    viewport: Rectangle,
) -> Option<Rectangle> {
    let [x0, y0] = project(projection, [bounds.west, bounds.north]);
    let [x1, y1] = project(projection, [bounds.east, bounds.south]);
    let rect = Rectangle::new(
        Point::new(x0.min(x1), y0.min(y1)),
        Size::new((x1 - x0).abs(), (y1 - y0).abs()),
    );
    rect.intersection(&viewport)
}

fn push_raster(batch: &mut QuadBatch, raster: &RasterLayer, projection: &impl Projection) {
    // compose() already dropped degenerate boxes
    let Ok(quad) = place_quad(&raster.bounds, raster.coordinate_system) else {
        return;
    };
    let corners = match quad.coordinate_system {
        CoordinateSystem::LngLat => quad.corners.map(|c| project(projection, c)),
        CoordinateSystem::Pixel => quad.corners.map(|[x, y]| [x as f32, y as f32]),
    };
    // opacity is applied by the fragment program
    batch.push_quad(corners, quad.uvs, [1.0; 4]);
}

fn push_lines(
    batch: &mut QuadBatch,
    geometry: &LineGeometry,
    projection: &impl Projection,
    viewport: Rectangle,
    width: f32,
    color: Color,
) {
    let color = color_to_f32(color);
    let margin = width.max(1.0);
    for line in &geometry.lines {
        for pair in line.windows(2) {
            let a = project(projection, pair[0]);
            let b = project(projection, pair[1]);
            if outside_same_side(a, b, viewport, margin) {
                continue;
            }
            batch.push_line(a, b, width, color);
        }
    }
}

/// Both endpoints beyond the same viewport edge.
fn outside_same_side(a: [f32; 2], b: [f32; 2], viewport: Rectangle, margin: f32) -> bool {
    let (left, top) = (viewport.x - margin, viewport.y - margin);
    let (right, bottom) = (
        viewport.x + viewport.width + margin,
        viewport.y + viewport.height + margin,
    );
    (a[0] < left && b[0] < left)
        || (a[0] > right && b[0] > right)
        || (a[1] < top && b[1] < top)
        || (a[1] > bottom && b[1] > bottom)
}
