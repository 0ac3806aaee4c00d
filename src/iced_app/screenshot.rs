//! Screenshot capture for the running app.

use std::path::Path;

use crate::render::software::{render_to_image, save_image, HeadlessOptions};

use super::app::App;

const SCREENSHOT_PATH: &str = "geo-raster-view.png";

impl App {
    /// Render the current view offscreen at the map's size and save it.
    pub(crate) fn handle_save_screenshot(&mut self) {
        let size = self.screen_size.get();
        let options = HeadlessOptions {
            width: size.width.max(1.0) as u32,
            height: size.height.max(1.0) as u32,
            view: self.view,
            prefer_native16: self.config.prefer_native_16bit,
        };
        let output = Path::new(SCREENSHOT_PATH);

        let result = render_to_image(&self.draw_list, &options).and_then(|img| save_image(&img, output));
        self.status = match result {
            Ok(()) => format!("Saved {}", output.display()),
            Err(e) => {
                tracing::warn!("Screenshot failed: {e}");
                format!("Screenshot failed: {e}")
            }
        };
    }
}
