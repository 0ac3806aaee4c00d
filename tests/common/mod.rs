//! Common test utilities.

use std::sync::Arc;

use geo_raster_view::geo::{GeoBoundsQuad, ViewState};
use geo_raster_view::layers::{compose, DrawList, LayerConfig};
use geo_raster_view::raster::{pack, ramp, RasterFormat, WindowParameters};

/// Try to create a wgpu device for GPU tests.
/// Returns None if no adapter is available (e.g., headless CI).
#[allow(dead_code)]
pub fn try_create_gpu_device() -> Option<(wgpu::Device, wgpu::Queue)> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });

    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::LowPower,
        compatible_surface: None,
        force_fallback_adapter: false,
    }))
    .ok()?;

    let features = adapter.features() & wgpu::Features::TEXTURE_FORMAT_16BIT_NORM;
    let (device, queue) = pollster::block_on(adapter.request_device(
        &wgpu::DeviceDescriptor {
            label: Some("Test GPU Device"),
            required_features: features,
            ..Default::default()
        },
    ))
    .ok()?;

    Some((device, queue))
}

/// Ramp raster size used by the rendering scenarios.
#[allow(dead_code)]
pub const RAMP_SIZE: u32 = 256;

/// Bounds and view that put a `RAMP_SIZE` square raster exactly over a
/// `RAMP_SIZE` square viewport: 180° at zoom 0 is 256 px.
#[allow(dead_code)]
pub fn full_viewport_placement() -> (GeoBoundsQuad, ViewState) {
    let bounds = GeoBoundsQuad::new(-90.0, -90.0, 90.0, 90.0);
    let view = ViewState {
        longitude: 0.0,
        latitude: 0.0,
        zoom: 0.0,
    };
    (bounds, view)
}

/// Black background plus one fully opaque 16-bit ramp behind `window`.
#[allow(dead_code)]
pub fn windowed_ramp_list(window: WindowParameters) -> DrawList {
    let (bounds, _) = full_viewport_placement();
    let desc = ramp::vertical_ramp(RAMP_SIZE, RAMP_SIZE, RasterFormat::GRAY16)
        .expect("ramp descriptor");
    let texture = Arc::new(pack(&desc).expect("pack ramp"));
    let layers = vec![
        LayerConfig::background("background-layer", [0, 0, 0, 255]),
        LayerConfig::raster_windowed("ramp", bounds, texture, 1.0, window)
            .expect("windowed layer"),
    ];
    compose(&layers).expect("compose")
}
