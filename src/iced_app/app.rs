//! App struct and initialization.

use std::cell::{Cell, RefCell};
use std::sync::Arc;

use iced::{Point, Size, Task};

use crate::config::ViewerConfig;
use crate::geo::{LineGeometry, ViewState};
use crate::layers::{build_scene, load_basemap, DrawList, Scene};
use crate::raster::{WindowParameters, WindowSettings};

use super::Message;

thread_local! {
    pub static INIT_CONFIG: RefCell<Option<ViewerConfig>> = const { RefCell::new(None) };
}

/// Map viewer state.
pub struct App {
    pub(crate) config: ViewerConfig,
    /// Parsed once; reused when the scene is rebuilt.
    pub(crate) basemap: Option<Arc<LineGeometry>>,
    pub(crate) scene: Scene,
    pub(crate) draw_list: Arc<DrawList>,
    pub(crate) view: ViewState,
    /// Windowed raster driven by the sliders.
    pub(crate) active_layer: Option<String>,
    /// Slider values. May be inverted while the user drags; only valid
    /// combinations reach the scene.
    pub(crate) window_input: WindowSettings,
    pub(crate) status: String,
    pub(crate) drag_origin: Option<Point>,
    /// Last map size seen by `draw`, used for zoom anchoring.
    pub(crate) screen_size: Cell<Size>,
}

impl App {
    pub fn title(_state: &Self) -> String {
        "Geo Raster View".to_string()
    }

    pub fn boot() -> (Self, Task<Message>) {
        let config = INIT_CONFIG
            .with(|cell| cell.borrow_mut().take())
            .unwrap_or_else(ViewerConfig::load);
        (Self::from_config(config), Task::none())
    }

    /// Build the viewer state: load the basemap, build the scene and
    /// compose the first draw list.
    pub fn from_config(config: ViewerConfig) -> Self {
        let basemap = load_basemap(&config);
        let scene = build_scene(&config, basemap.clone());
        let active_layer = scene.first_windowed().map(str::to_string);
        let window_input = active_layer
            .as_deref()
            .and_then(|id| scene.window(id))
            .unwrap_or_else(WindowParameters::full_range)
            .into();

        let status = if scene.rejected.is_empty() {
            format!("{} layers", scene.layers.len())
        } else {
            format!(
                "{} layers, {} rejected",
                scene.layers.len(),
                scene.rejected.len()
            )
        };

        let mut app = Self {
            view: config.initial_view,
            config,
            basemap,
            scene,
            draw_list: Arc::new(DrawList::default()),
            active_layer,
            window_input,
            status,
            drag_origin: None,
            screen_size: Cell::new(Size::new(1024.0, 768.0)),
        };
        app.recompose();
        app
    }

    /// Recompose the draw list from the current scene.
    pub(crate) fn recompose(&mut self) {
        match self.scene.draw_list() {
            Ok(list) => {
                for omitted in &list.omitted {
                    tracing::warn!("Layer '{}' omitted: {}", omitted.id, omitted.reason);
                }
                self.draw_list = Arc::new(list);
            }
            Err(e) => {
                tracing::error!("Scene composition failed: {e}");
                self.status = e.to_string();
                self.draw_list = Arc::new(DrawList::default());
            }
        }
    }

    /// Rebuild the scene from the config, e.g. after toggling footprints.
    pub(crate) fn rebuild_scene(&mut self) {
        self.scene = build_scene(&self.config, self.basemap.clone());
        self.recompose();
    }

    pub fn draw_list(&self) -> &Arc<DrawList> {
        &self.draw_list
    }

    pub fn view_state(&self) -> ViewState {
        self.view
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Window currently applied to the active layer.
    pub fn active_window(&self) -> Option<WindowParameters> {
        self.scene.window(self.active_layer.as_deref()?)
    }
}
