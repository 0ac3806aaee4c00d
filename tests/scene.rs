//! Scene building, draw-list composition and texture lifecycle.

use std::sync::Arc;

use geo_raster_view::config::{RasterLayerSettings, ViewerConfig};
use geo_raster_view::geo::{place_quad, CoordinateSystem, GeoBoundsQuad};
use geo_raster_view::layers::scene::{BACKGROUND_ID, LATLON_ID};
use geo_raster_view::layers::{
    build_scene, compose, LayerConfig, LayerKind, TextureAllocator, TextureLifecycle,
};
use geo_raster_view::raster::{pack, ramp, PackedTexture, RasterFormat, RasterPreset, WindowParameters};
use geo_raster_view::{Error, Result};

fn small_config() -> ViewerConfig {
    ViewerConfig::with_raster_size(16, 16)
}

#[test]
fn rasters_sit_between_background_and_graticule() {
    let scene = build_scene(&small_config(), None);
    let list = scene.draw_list().unwrap();
    let kinds: Vec<_> = list.layers.iter().map(LayerConfig::kind).collect();

    assert_eq!(list.layers.first().map(LayerConfig::id), Some(BACKGROUND_ID));
    assert_eq!(list.layers.last().map(LayerConfig::id), Some(LATLON_ID));
    assert_eq!(
        kinds.iter().filter(|k| **k == LayerKind::RasterWindowed).count(),
        1
    );
    assert_eq!(kinds.iter().filter(|k| **k == LayerKind::RasterPlain).count(), 3);
}

#[test]
fn degenerate_raster_disappears_without_breaking_scene() {
    let mut config = small_config();
    config.rasters.push(RasterLayerSettings {
        id: "flat".into(),
        preset: RasterPreset::Gray8,
        bounds: GeoBoundsQuad::new(10.0, 20.0, 10.0, 30.0),
        coordinate_system: CoordinateSystem::LngLat,
        opacity: 1.0,
        window: None,
    });

    let list = build_scene(&config, None).draw_list().unwrap();
    assert!(!list.ids().contains(&"flat"));
    assert_eq!(list.omitted.len(), 1);
    assert_eq!(list.omitted[0].id, "flat");
    assert_eq!(list.texture_sources().len(), 4);
}

#[test]
fn degenerate_bounds_fail_placement() {
    let bounds = GeoBoundsQuad::new(0.0, 5.0, 10.0, 5.0);
    assert!(matches!(
        place_quad(&bounds, CoordinateSystem::LngLat),
        Err(Error::DegenerateBounds { .. })
    ));
}

#[test]
fn window_change_builds_new_layer_with_same_texture() {
    let mut scene = build_scene(&small_config(), None);
    let id = scene.first_windowed().unwrap().to_string();
    let before = scene.draw_list().unwrap();

    scene
        .set_window(&id, WindowParameters::new(32768.0, 65535.0, 2.0).unwrap())
        .unwrap();
    let after = scene.draw_list().unwrap();

    let texture_of = |list: &geo_raster_view::layers::DrawList| {
        list.texture_sources()
            .into_iter()
            .find(|(layer, _)| *layer == id)
            .map(|(_, t)| Arc::clone(t))
            .unwrap()
    };
    assert!(Arc::ptr_eq(&texture_of(&before), &texture_of(&after)));
    assert_eq!(scene.window(&id).unwrap().lower(), 32768.0);
    assert_ne!(before, after);
}

#[test]
fn windowed_layer_requires_sixteen_bit_texture() {
    let texture = Arc::new(pack(&ramp::vertical_ramp(4, 4, RasterFormat::GRAY8).unwrap()).unwrap());
    let err = LayerConfig::raster_windowed(
        "wrong",
        GeoBoundsQuad::new(0.0, 0.0, 1.0, 1.0),
        texture,
        1.0,
        WindowParameters::full_range(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::LayerTextureMismatch { .. }));
}

#[test]
fn duplicate_layer_ids_are_rejected() {
    let layers = vec![
        LayerConfig::background("same", [0, 0, 0, 255]),
        LayerConfig::background("same", [1, 1, 1, 255]),
    ];
    assert!(matches!(compose(&layers), Err(Error::DuplicateLayerId(id)) if id == "same"));
}

/// Allocator that tracks how many handles are alive.
#[derive(Default)]
struct LiveCounter {
    live: usize,
    next: u32,
}

impl TextureAllocator for LiveCounter {
    type Handle = u32;

    fn allocate(&mut self, _layer_id: &str, _texture: &PackedTexture) -> Result<u32> {
        self.live += 1;
        self.next += 1;
        Ok(self.next)
    }

    fn release(&mut self, _handle: u32) {
        self.live -= 1;
    }
}

#[test]
fn repeated_context_ready_does_not_leak_textures() {
    let list = build_scene(&small_config(), None).draw_list().unwrap();
    let sources = list.texture_sources();

    let mut allocator = LiveCounter::default();
    let mut lifecycle = TextureLifecycle::new();
    for _ in 0..5 {
        let report = lifecycle.rebuild(&mut allocator, &sources);
        assert!(report.failures.is_empty());
    }

    assert_eq!(allocator.live, sources.len());
    assert_eq!(lifecycle.live_count(), sources.len());
    assert_eq!(lifecycle.rebuilds(), 5);

    lifecycle.release_all(&mut allocator);
    assert_eq!(allocator.live, 0);
}
