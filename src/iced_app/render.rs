//! Shader rendering implementation.

use std::sync::Arc;

use iced::mouse;
use iced::widget::shader;
use iced::{Event, Point, Rectangle};

use crate::geo::Equirectangular;
use crate::render::{build_frame, MapPrimitive};

use super::app::App;
use super::state::CanvasMessage;
use super::Message;

/// Zoom levels per wheel line.
const ZOOM_PER_LINE: f32 = 0.25;

/// Shader program implementation for GPU rendering of the map.
impl shader::Program<Message> for &App {
    type State = ();
    type Primitive = MapPrimitive;

    fn update(
        &self,
        _state: &mut Self::State,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<shader::Action<Message>> {
        let Event::Mouse(mouse_event) = event else {
            return None;
        };
        match mouse_event {
            mouse::Event::CursorMoved { position } => {
                if bounds.contains(*position) || self.drag_origin.is_some() {
                    let local = Point::new(position.x - bounds.x, position.y - bounds.y);
                    return Some(shader::Action::publish(Message::CanvasEvent(
                        CanvasMessage::MouseMove(local),
                    )));
                }
            }
            mouse::Event::ButtonPressed(mouse::Button::Left) => {
                if let Some(pos) = cursor.position_in(bounds) {
                    return Some(shader::Action::publish(Message::CanvasEvent(
                        CanvasMessage::MouseDown(pos),
                    )));
                }
            }
            mouse::Event::ButtonReleased(mouse::Button::Left) => {
                if self.drag_origin.is_some() {
                    let pos = cursor.position_in(bounds).unwrap_or(Point::ORIGIN);
                    return Some(shader::Action::publish(Message::CanvasEvent(
                        CanvasMessage::MouseUp(pos),
                    )));
                }
            }
            mouse::Event::WheelScrolled { delta } => {
                let anchor = cursor.position_in(bounds)?;
                let lines = match delta {
                    mouse::ScrollDelta::Lines { y, .. } => *y,
                    mouse::ScrollDelta::Pixels { y, .. } => *y / 30.0,
                };
                return Some(shader::Action::publish(Message::Zoom {
                    delta: lines * ZOOM_PER_LINE,
                    anchor,
                }));
            }
            _ => {}
        }
        None
    }

    fn draw(
        &self,
        _state: &Self::State,
        _cursor: mouse::Cursor,
        bounds: Rectangle,
    ) -> Self::Primitive {
        let size = bounds.size();
        self.screen_size.set(size);

        let projection = Equirectangular::new(self.view, size.width as f64, size.height as f64);
        let quads = build_frame(&self.draw_list, &projection, size);

        MapPrimitive {
            list: Arc::clone(&self.draw_list),
            quads,
            prefer_native16: self.config.prefer_native_16bit,
        }
    }

    fn mouse_interaction(
        &self,
        _state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if self.drag_origin.is_some() {
            mouse::Interaction::Grabbing
        } else if cursor.is_over(bounds) {
            mouse::Interaction::Grab
        } else {
            mouse::Interaction::default()
        }
    }
}
