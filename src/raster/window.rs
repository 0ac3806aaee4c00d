//! Contrast window and gamma curve for high-bit-depth gray rasters.
//!
//! The functions here are the CPU counterpart of
//! `render/shader/windowed.wgsl` and must stay numerically identical to it.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Smallest divisor used for the window span, in raw sample units.
///
/// With integer-rounded inputs this turns `lower == upper` into a threshold:
/// values at or below `lower` give 0, values above give 1.
pub const WINDOW_EPSILON: f32 = 1e-3;

/// Largest 16-bit sample value.
pub const RAW16_MAX: f32 = 65535.0;

/// Linear contrast window plus gamma, in raw sample units.
///
/// Immutable once built; change the window by building a new value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WindowSettings", into = "WindowSettings")]
pub struct WindowParameters {
    lower: f32,
    upper: f32,
    gamma: f32,
}

/// Unvalidated serialized form of [`WindowParameters`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowSettings {
    pub lower: f32,
    pub upper: f32,
    #[serde(default = "default_gamma")]
    pub gamma: f32,
}

fn default_gamma() -> f32 {
    1.0
}

impl WindowParameters {
    /// Validate and build a window.
    ///
    /// `lower == upper` is accepted as a degenerate threshold. An inverted
    /// window (`upper < lower`) and non-positive gamma are rejected.
    pub fn new(lower: f32, upper: f32, gamma: f32) -> Result<Self> {
        if !lower.is_finite() || !upper.is_finite() {
            return Err(Error::NonFiniteWindow);
        }
        if !gamma.is_finite() || gamma <= 0.0 {
            return Err(Error::InvalidGamma(gamma));
        }
        if upper < lower {
            return Err(Error::InvertedWindow { lower, upper });
        }
        if upper == lower {
            tracing::warn!("Degenerate window at {lower}: rendering as a threshold");
        }
        Ok(Self { lower, upper, gamma })
    }

    /// Full 16-bit range, gamma 1.
    pub fn full_range() -> Self {
        Self {
            lower: 0.0,
            upper: RAW16_MAX,
            gamma: 1.0,
        }
    }

    pub fn lower(&self) -> f32 {
        self.lower
    }

    pub fn upper(&self) -> f32 {
        self.upper
    }

    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    pub fn is_degenerate(&self) -> bool {
        self.upper == self.lower
    }

    /// Divisor of the linear stretch, never below [`WINDOW_EPSILON`].
    pub fn span(&self) -> f32 {
        (self.upper - self.lower).max(WINDOW_EPSILON)
    }

    /// Linear stretch of `raw` into [0, 1], saturating outside the window.
    pub fn stretch(&self, raw: f32) -> f32 {
        ((raw - self.lower) / self.span()).clamp(0.0, 1.0)
    }

    /// Window followed by gamma: the displayed gray level for `raw`.
    pub fn apply(&self, raw: f32) -> f32 {
        let windowed = self.stretch(raw);
        if windowed <= 0.0 {
            0.0
        } else {
            windowed.powf(1.0 / self.gamma)
        }
    }
}

impl Default for WindowParameters {
    fn default() -> Self {
        Self::full_range()
    }
}

impl TryFrom<WindowSettings> for WindowParameters {
    type Error = Error;

    fn try_from(s: WindowSettings) -> Result<Self> {
        Self::new(s.lower, s.upper, s.gamma)
    }
}

impl From<WindowParameters> for WindowSettings {
    fn from(w: WindowParameters) -> Self {
        Self {
            lower: w.lower,
            upper: w.upper,
            gamma: w.gamma,
        }
    }
}

/// Rebuild the raw 16-bit value from the two normalized channels of a
/// split texel (`low`, `high` are byte / 255).
pub fn reconstruct_split8(low: f32, high: f32) -> f32 {
    (low * 255.0 + high * 255.0 * 256.0).round()
}

/// Rebuild the raw 16-bit value from a normalized native 16-bit texel.
pub fn reconstruct_native16(value: f32) -> f32 {
    (value * RAW16_MAX).round()
}

/// Color emitted for one texel of a split 16-bit texture.
pub fn shade_windowed(low: f32, high: f32, window: &WindowParameters, opacity: f32) -> [f32; 4] {
    let display = window.apply(reconstruct_split8(low, high));
    [display, display, display, opacity]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texel(raw: u16) -> (f32, f32) {
        let [lo, hi] = raw.to_le_bytes();
        (lo as f32 / 255.0, hi as f32 / 255.0)
    }

    #[test]
    fn reconstructs_every_split_value() {
        for raw in (0..=u16::MAX).step_by(97).chain([u16::MAX]) {
            let (lo, hi) = texel(raw);
            assert_eq!(reconstruct_split8(lo, hi), raw as f32, "raw {raw}");
        }
    }

    #[test]
    fn reconstructs_native_values() {
        for raw in [0u16, 1, 4660, 32768, 65535] {
            assert_eq!(reconstruct_native16(raw as f32 / RAW16_MAX), raw as f32);
        }
    }

    #[test]
    fn saturates_outside_the_window() {
        let w = WindowParameters::new(1000.0, 2000.0, 1.0).unwrap();
        assert_eq!(w.apply(0.0), 0.0);
        assert_eq!(w.apply(1000.0), 0.0);
        assert_eq!(w.apply(2000.0), 1.0);
        assert_eq!(w.apply(65535.0), 1.0);
    }

    #[test]
    fn gamma_curve_inside_the_window() {
        for gamma in [0.5f32, 1.0, 2.2, 4.0] {
            let w = WindowParameters::new(100.0, 60000.0, gamma).unwrap();
            for raw in [101.0f32, 5000.0, 30000.0, 59999.0] {
                let expected = ((raw - 100.0) / (60000.0 - 100.0)).powf(1.0 / gamma);
                assert!(
                    (w.apply(raw) - expected).abs() < 1e-4,
                    "gamma {gamma} raw {raw}: {} vs {expected}",
                    w.apply(raw)
                );
            }
        }
    }

    #[test]
    fn gamma_above_one_brightens_midtones() {
        let linear = WindowParameters::new(0.0, 100.0, 1.0).unwrap();
        let bright = WindowParameters::new(0.0, 100.0, 2.0).unwrap();
        let dark = WindowParameters::new(0.0, 100.0, 0.5).unwrap();
        assert!(bright.apply(50.0) > linear.apply(50.0));
        assert!(dark.apply(50.0) < linear.apply(50.0));
    }

    #[test]
    fn monotonic_in_raw_value() {
        let w = WindowParameters::new(12000.0, 41000.0, 1.7).unwrap();
        let mut prev = 0.0f32;
        for raw in 0..=u16::MAX {
            let (lo, hi) = texel(raw);
            let out = shade_windowed(lo, hi, &w, 1.0)[0];
            assert!(out >= prev, "output decreased at raw {raw}");
            prev = out;
        }
    }

    #[test]
    fn degenerate_window_is_a_threshold() {
        let w = WindowParameters::new(500.0, 500.0, 1.0).unwrap();
        assert!(w.is_degenerate());
        for raw in 0..=u16::MAX {
            let (lo, hi) = texel(raw);
            let out = shade_windowed(lo, hi, &w, 1.0)[0];
            assert!(!out.is_nan());
            let expected = if raw <= 500 { 0.0 } else { 1.0 };
            assert_eq!(out, expected, "raw {raw}");
        }
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert!(matches!(
            WindowParameters::new(10.0, 5.0, 1.0),
            Err(Error::InvertedWindow { .. })
        ));
        assert!(matches!(WindowParameters::new(0.0, 5.0, 0.0), Err(Error::InvalidGamma(_))));
        assert!(matches!(WindowParameters::new(0.0, 5.0, -1.0), Err(Error::InvalidGamma(_))));
        assert!(matches!(
            WindowParameters::new(f32::NAN, 5.0, 1.0),
            Err(Error::NonFiniteWindow)
        ));
    }

    #[test]
    fn opacity_goes_to_alpha() {
        let (lo, hi) = texel(65535);
        let color = shade_windowed(lo, hi, &WindowParameters::full_range(), 0.75);
        assert_eq!(color, [1.0, 1.0, 1.0, 0.75]);
    }

    #[test]
    fn serde_validates() {
        let ok: WindowParameters =
            serde_json::from_str(r#"{"lower": 0.0, "upper": 100.0}"#).unwrap();
        assert_eq!(ok.gamma(), 1.0);
        let bad: std::result::Result<WindowParameters, _> =
            serde_json::from_str(r#"{"lower": 10.0, "upper": 1.0, "gamma": 1.0}"#);
        assert!(bad.is_err());
    }
}
