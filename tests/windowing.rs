//! Display window math shared by the CPU reference and the shaders.

use geo_raster_view::raster::window::{reconstruct_split8, shade_windowed, RAW16_MAX};
use geo_raster_view::raster::{pack, ramp, RasterFormat, WindowParameters};
use geo_raster_view::Error;

fn window(lower: f32, upper: f32, gamma: f32) -> WindowParameters {
    WindowParameters::new(lower, upper, gamma).expect("valid window")
}

#[test]
fn output_never_decreases_with_raw_value() {
    for w in [
        window(0.0, 65535.0, 1.0),
        window(1000.0, 2000.0, 2.2),
        window(30000.0, 40000.0, 0.45),
        window(500.0, 500.0, 1.0),
    ] {
        let mut previous = 0.0f32;
        for raw in (0..=65535u32).step_by(97) {
            let out = w.apply(raw as f32);
            assert!(out >= previous, "{w:?}: {raw} gave {out} after {previous}");
            previous = out;
        }
    }
}

#[test]
fn values_outside_window_saturate() {
    let w = window(10000.0, 20000.0, 1.0);
    for raw in [0.0, 5000.0, 10000.0] {
        assert_eq!(w.apply(raw), 0.0, "raw {raw}");
    }
    for raw in [20000.0, 30000.0, RAW16_MAX] {
        assert_eq!(w.apply(raw), 1.0, "raw {raw}");
    }
}

#[test]
fn inside_window_follows_gamma_curve() {
    for gamma in [0.5f32, 1.0, 1.8, 3.0] {
        let (lower, upper) = (1000.0f32, 9000.0f32);
        let w = window(lower, upper, gamma);
        for raw in [1001.0f32, 2500.0, 5000.0, 8999.0] {
            let expected = ((raw - lower) / (upper - lower)).powf(1.0 / gamma);
            let got = w.apply(raw);
            assert!((got - expected).abs() < 1e-4, "gamma {gamma}, raw {raw}: {got} vs {expected}");
        }
    }
}

#[test]
fn degenerate_window_is_a_deterministic_threshold() {
    let w = window(4000.0, 4000.0, 1.0);
    assert!(w.is_degenerate());
    for raw in (0..=65535u32).step_by(251) {
        let out = w.apply(raw as f32);
        assert!(!out.is_nan(), "NaN at {raw}");
        assert!(out == 0.0 || out == 1.0, "{raw} gave {out}");
    }
    assert_eq!(w.apply(3999.0), 0.0);
    assert_eq!(w.apply(4001.0), 1.0);
}

#[test]
fn inverted_window_is_rejected() {
    let err = WindowParameters::new(2000.0, 1000.0, 1.0).unwrap_err();
    assert!(matches!(err, Error::InvertedWindow { .. }), "{err}");
}

#[test]
fn invalid_gamma_and_non_finite_bounds_are_rejected() {
    assert!(matches!(
        WindowParameters::new(0.0, 1.0, 0.0),
        Err(Error::InvalidGamma(_))
    ));
    assert!(matches!(
        WindowParameters::new(0.0, 1.0, f32::NAN),
        Err(Error::InvalidGamma(_))
    ));
    assert!(matches!(
        WindowParameters::new(f32::NEG_INFINITY, 1.0, 1.0),
        Err(Error::NonFiniteWindow)
    ));
}

/// Texel channels as the texture unit delivers them for packed bytes.
fn sampled(bytes: &[u8]) -> (f32, f32) {
    (bytes[0] as f32 / 255.0, bytes[1] as f32 / 255.0)
}

#[test]
fn packed_ramp_reconstructs_exact_raw_values() {
    let desc = ramp::vertical_ramp(1, 256, RasterFormat::GRAY16).unwrap();
    let packed = pack(&desc).unwrap();
    for (row, texel) in packed.bytes.chunks_exact(2).enumerate() {
        let (low, high) = sampled(texel);
        assert_eq!(reconstruct_split8(low, high), desc.samples[row] as f32, "row {row}");
    }
}

#[test]
fn full_range_ramp_shades_row_fraction() {
    let desc = ramp::vertical_ramp(1, 256, RasterFormat::GRAY16).unwrap();
    let packed = pack(&desc).unwrap();
    let w = window(0.0, 65535.0, 1.0);
    for (row, texel) in packed.bytes.chunks_exact(2).enumerate() {
        let (low, high) = sampled(texel);
        let [r, g, b, a] = shade_windowed(low, high, &w, 0.75);
        let expected = row as f32 / 256.0;
        assert!((r - expected).abs() <= 1.0 / 65535.0 + 1e-6, "row {row}: {r} vs {expected}");
        assert_eq!((r, r), (g, b));
        assert_eq!(a, 0.75);
    }
}

#[test]
fn upper_half_window_blacks_out_lower_rows() {
    let desc = ramp::vertical_ramp(1, 256, RasterFormat::GRAY16).unwrap();
    let packed = pack(&desc).unwrap();
    let w = window(32768.0, 65535.0, 1.0);
    for (row, texel) in packed.bytes.chunks_exact(2).enumerate() {
        let (low, high) = sampled(texel);
        let [d, ..] = shade_windowed(low, high, &w, 1.0);
        if desc.samples[row] < 32768 {
            assert_eq!(d, 0.0, "row {row}");
        } else {
            assert!(d >= 0.0 && d <= 1.0);
        }
    }
}
