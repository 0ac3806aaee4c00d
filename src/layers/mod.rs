//! Layer configurations, draw-list composition and GPU texture ownership.

pub mod composition;
pub mod layer;
pub mod lifecycle;
pub mod scene;

pub use composition::{compose, DrawList, OmittedLayer};
pub use layer::{color_to_f32, Color, LayerConfig, LayerKind, RasterLayer};
pub use lifecycle::{SyncReport, TextureAllocator, TextureLifecycle};
pub use scene::{build_scene, load_basemap, Scene};
