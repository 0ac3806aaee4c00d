//! Iced-based map viewer.
//!
//! This module is split into several submodules:
//! - `app`: App struct and initialization
//! - `state`: canvas input messages
//! - `styles`: UI styling functions and color palette
//! - `view`: App::view()
//! - `update`: App::update() and message handling
//! - `render`: shader program that turns the draw list into a primitive
//! - `screenshot`: headless capture of the current view

mod app;
mod render;
mod screenshot;
mod state;
mod styles;
mod update;
mod view;

use crate::config::ViewerConfig;

pub use app::App;
pub use state::CanvasMessage;
pub use styles::palette;

use app::INIT_CONFIG;

/// Application messages.
#[derive(Debug, Clone)]
pub enum Message {
    CanvasEvent(CanvasMessage),
    /// Wheel zoom by `delta` levels around a point in map coordinates.
    Zoom { delta: f32, anchor: iced::Point },
    LowerChanged(f32),
    UpperChanged(f32),
    GammaChanged(f32),
    ToggleFootprints,
    ResetView,
    SaveScreenshot,
}

/// Run the viewer with the given configuration.
pub fn run_viewer(config: ViewerConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Store in thread-local for the boot function
    INIT_CONFIG.with(|cell| *cell.borrow_mut() = Some(config));

    iced::application(App::boot, App::update, App::view)
        .title(App::title)
        .run()?;

    Ok(())
}
