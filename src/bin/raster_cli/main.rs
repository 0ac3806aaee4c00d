//! Geo Raster View CLI - standalone tools that need no window.
//!
//! Usage:
//!   raster-cli screenshot -o out.png          # Render the default scene headless
//!   raster-cli layers                         # Print the ordered draw list
//!   raster-cli pack --preset gray16           # Inspect the packed texture of a ramp
//!   raster-cli pack --input dem.png           # Inspect the packed texture of an image
//!   raster-cli window --lower 0 --upper 1000 0 500 1000

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use geo_raster_view::config::ViewerConfig;
use geo_raster_view::layers::{build_scene, load_basemap, DrawList, LayerConfig};
use geo_raster_view::raster::{pack, ramp, source, PackedTexture, RasterPreset, WindowParameters};
use geo_raster_view::render::software::{render_to_image, save_image, HeadlessOptions};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "raster-cli")]
#[command(about = "Geo Raster View tools (headless rendering and raster inspection)")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the configured scene to an image file
    Screenshot {
        /// Output file path (.png, or .webp for lossless WebP)
        #[arg(short, long, default_value = "screenshot.png")]
        output: PathBuf,

        /// Image width in pixels
        #[arg(long, default_value_t = 1024)]
        width: u32,

        /// Image height in pixels
        #[arg(long, default_value_t = 768)]
        height: u32,

        /// Viewer config file (defaults to the viewer's own)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the draw list in paint order
    Layers {
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Pack a raster and print the resulting texture layout
    Pack {
        /// Ramp layout to generate when no input is given
        #[arg(long, value_enum, default_value_t = PresetArg::Gray16)]
        preset: PresetArg,

        /// Decode this image instead of generating a ramp
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[arg(long, default_value_t = 256)]
        width: u32,

        #[arg(long, default_value_t = 256)]
        height: u32,

        /// Write the packed bytes here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Evaluate the display window for raw 16-bit values
    Window {
        #[arg(long, default_value_t = 0.0)]
        lower: f32,

        #[arg(long, default_value_t = 65535.0)]
        upper: f32,

        #[arg(long, default_value_t = 1.0)]
        gamma: f32,

        /// Raw sample values
        #[arg(required = true)]
        values: Vec<f32>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PresetArg {
    Gray8,
    Rgb24,
    Rgba32,
    Gray16,
}

impl From<PresetArg> for RasterPreset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Gray8 => RasterPreset::Gray8,
            PresetArg::Rgb24 => RasterPreset::Rgb24,
            PresetArg::Rgba32 => RasterPreset::Rgba32,
            PresetArg::Gray16 => RasterPreset::Gray16,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Screenshot { output, width, height, config } => {
            take_screenshot(&output, width, height, config.as_deref())
        }
        Commands::Layers { config } => print_layers(config.as_deref()),
        Commands::Pack { preset, input, width, height, output } => {
            pack_raster(preset.into(), input.as_deref(), width, height, output.as_deref())
        }
        Commands::Window { lower, upper, gamma, values } => {
            evaluate_window(lower, upper, gamma, &values)
        }
    };
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn load_config(path: Option<&Path>) -> ViewerConfig {
    match path {
        Some(p) => ViewerConfig::load_from(p),
        None => ViewerConfig::load(),
    }
}

fn compose_scene(config: &ViewerConfig) -> geo_raster_view::Result<DrawList> {
    let scene = build_scene(config, load_basemap(config));
    for (id, reason) in &scene.rejected {
        eprintln!("Rejected layer {}: {}", id, reason);
    }
    scene.draw_list()
}

fn describe_texture(texture: &PackedTexture) -> String {
    format!(
        "{}x{} {} -> {:?}/{:?}, alignment {}, {} bytes",
        texture.width,
        texture.height,
        texture.source_format,
        texture.pixel_format,
        texture.component_type,
        texture.unpack_alignment,
        texture.bytes.len()
    )
}

// ── Subcommand handlers ─────────────────────────────────────────────

fn take_screenshot(
    output: &Path,
    width: u32,
    height: u32,
    config: Option<&Path>,
) -> geo_raster_view::Result<()> {
    let config = load_config(config);
    let list = compose_scene(&config)?;
    let options = HeadlessOptions {
        width,
        height,
        view: config.initial_view,
        prefer_native16: config.prefer_native_16bit,
    };
    let img = render_to_image(&list, &options)?;
    save_image(&img, output)?;
    println!("Saved {}x{} screenshot to {}", width, height, output.display());
    Ok(())
}

fn print_layers(config: Option<&Path>) -> geo_raster_view::Result<()> {
    let config = load_config(config);
    let list = compose_scene(&config)?;

    for (i, layer) in list.layers.iter().enumerate() {
        let detail = match layer {
            LayerConfig::RasterWindowed { raster, window } => format!(
                "{} opacity {:.2} window {}..{} gamma {}",
                describe_texture(&raster.texture),
                raster.opacity,
                window.lower(),
                window.upper(),
                window.gamma()
            ),
            LayerConfig::RasterPlain(raster) => format!(
                "{} opacity {:.2}",
                describe_texture(&raster.texture),
                raster.opacity
            ),
            _ => String::new(),
        };
        println!("{:2}. {:<16} {:<32} {}", i, layer.kind().as_str(), layer.id(), detail);
    }
    for omitted in &list.omitted {
        println!("    omitted {}: {}", omitted.id, omitted.reason);
    }
    Ok(())
}

fn pack_raster(
    preset: RasterPreset,
    input: Option<&Path>,
    width: u32,
    height: u32,
    output: Option<&Path>,
) -> geo_raster_view::Result<()> {
    let desc = match input {
        Some(path) => source::load_image(path)?,
        None => ramp::vertical_ramp(width, height, preset.format())?,
    };
    let texture = pack(&desc)?;
    println!("{}", describe_texture(&texture));
    println!("row stride {} bytes", texture.row_stride());

    let shown = desc.format.channels as usize * 4;
    println!("first samples: {:?}", &desc.samples[..shown.min(desc.samples.len())]);
    let shown_bytes = texture.bytes_per_pixel() * 4;
    println!("first bytes:   {:?}", &texture.bytes[..shown_bytes.min(texture.bytes.len())]);

    if let Some(path) = output {
        std::fs::write(path, &texture.bytes)?;
        println!("Wrote {} bytes to {}", texture.bytes.len(), path.display());
    }
    Ok(())
}

fn evaluate_window(lower: f32, upper: f32, gamma: f32, values: &[f32]) -> geo_raster_view::Result<()> {
    let window = WindowParameters::new(lower, upper, gamma)?;
    for &raw in values {
        let display = window.apply(raw);
        println!("{:>8} -> {:.4} ({})", raw, display, (display * 255.0).round() as u8);
    }
    Ok(())
}
