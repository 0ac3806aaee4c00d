//! App::update() method and related logic.

use iced::{Point, Task};

use crate::raster::{WindowParameters, WindowSettings};

use super::app::App;
use super::state::CanvasMessage;
use super::Message;

impl App {
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::CanvasEvent(canvas_msg) => self.handle_canvas_event(canvas_msg),
            Message::Zoom { delta, anchor } => self.handle_zoom(delta, anchor),
            Message::LowerChanged(val) => {
                self.window_input.lower = val;
                self.apply_window_input();
            }
            Message::UpperChanged(val) => {
                self.window_input.upper = val;
                self.apply_window_input();
            }
            Message::GammaChanged(val) => {
                self.window_input.gamma = val;
                self.apply_window_input();
            }
            Message::ToggleFootprints => {
                self.config.show_footprints = !self.config.show_footprints;
                self.config.save();
                self.rebuild_scene();
            }
            Message::ResetView => self.view = self.config.initial_view,
            Message::SaveScreenshot => self.handle_save_screenshot(),
        }

        Task::none()
    }

    // ── Event handlers ──────────────────────────────────────────────────

    fn handle_canvas_event(&mut self, canvas_msg: CanvasMessage) {
        match canvas_msg {
            CanvasMessage::MouseDown(pos) => self.drag_origin = Some(pos),
            CanvasMessage::MouseMove(pos) => self.handle_mouse_move(pos),
            CanvasMessage::MouseUp(_) => self.drag_origin = None,
        }
    }

    fn handle_mouse_move(&mut self, pos: Point) {
        let Some(origin) = self.drag_origin else {
            return;
        };
        let (dx, dy) = (pos.x - origin.x, pos.y - origin.y);
        self.view = self.view.panned_by(dx as f64, dy as f64);
        self.drag_origin = Some(pos);
    }

    fn handle_zoom(&mut self, delta: f32, anchor: Point) {
        let size = self.screen_size.get();
        self.view = self.view.zoomed_at(
            delta as f64,
            [anchor.x as f64, anchor.y as f64],
            [size.width as f64, size.height as f64],
        );
    }

    /// Validate the slider values and, when valid, give the active layer a
    /// new window. The texture is untouched; only its uniform changes.
    fn apply_window_input(&mut self) {
        let Some(layer_id) = self.active_layer.clone() else {
            return;
        };
        let WindowSettings { lower, upper, gamma } = self.window_input;
        let window = match WindowParameters::new(lower, upper, gamma) {
            Ok(window) => window,
            Err(e) => {
                // Keep the last valid window on screen.
                self.status = e.to_string();
                return;
            }
        };

        if let Err(e) = self.scene.set_window(&layer_id, window) {
            tracing::warn!("Window update for '{layer_id}' failed: {e}");
            self.status = e.to_string();
            return;
        }
        self.recompose();
        self.status = format!(
            "{layer_id}: window {:.0}..{:.0}, gamma {:.2}",
            window.lower(),
            window.upper(),
            window.gamma()
        );

        if self.config.set_window(&layer_id, window.into()) {
            self.config.save();
        }
    }
}
