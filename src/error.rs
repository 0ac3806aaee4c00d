use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported raster format: {channels} channel(s) at {bits} bits")]
    UnsupportedFormat { channels: u8, bits: u8 },

    #[error("Sample count mismatch: expected {expected}, got {actual}")]
    SampleCountMismatch { expected: usize, actual: usize },

    #[error("Sample {index} has value {value}, outside the {bits}-bit range")]
    SampleOutOfRange { index: usize, value: u32, bits: u8 },

    #[error("Raster has no pixels ({width}x{height})")]
    EmptyRaster { width: u32, height: u32 },

    #[error("Degenerate bounds: west={west}, south={south}, east={east}, north={north}")]
    DegenerateBounds {
        west: f64,
        south: f64,
        east: f64,
        north: f64,
    },

    #[error("Inverted window: lower={lower} is above upper={upper}")]
    InvertedWindow { lower: f32, upper: f32 },

    #[error("Gamma must be finite and > 0, got {0}")]
    InvalidGamma(f32),

    #[error("Window bounds must be finite")]
    NonFiniteWindow,

    #[error("Texture allocation failed for layer '{layer}': {reason}")]
    ResourceExhaustion { layer: String, reason: String },

    #[error("Duplicate layer id: {0}")]
    DuplicateLayerId(String),

    #[error("Layer '{layer}' needs a {expected} texture, got {actual}")]
    LayerTextureMismatch {
        layer: String,
        expected: String,
        actual: String,
    },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
