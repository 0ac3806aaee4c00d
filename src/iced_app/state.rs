//! Input state shared between the shader program and the update loop.

use iced::Point;

/// Mouse input over the map, in map-local coordinates.
#[derive(Debug, Clone, Copy)]
pub enum CanvasMessage {
    MouseMove(Point),
    MouseDown(Point),
    MouseUp(Point),
}
