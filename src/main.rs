use tracing_subscriber::EnvFilter;
use geo_raster_view::config::ViewerConfig;
use geo_raster_view::iced_app::run_viewer;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ViewerConfig::load();
    tracing::info!("Loaded config from {}", config.path().display());

    run_viewer(config)
}
