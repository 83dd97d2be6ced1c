//! Power-to-colour rendering with a "breathing" intensity waveform.
//!
//! Hue encodes the power reading: `power_min` (or below) shows `hue_max`
//! (blue by default), `power_max` (or above) shows hue 0 (red).  Intensity
//! ignores power entirely and follows
//!
//! ```text
//! (exp(sin(t / 2000 · π)) − 1/e) · 108
//! ```
//!
//! which rises quickly and decays slowly, so the LEDs look like they are
//! breathing.  One breath takes 4 s.  The result is lifted into
//! `[70, 255]` so the indicator never goes fully dark, then scaled by the
//! configured brightness.
//!
//! All elements on the strip show the same colour.
//!
//! ## Colour conversion
//!
//! [`IndicatorColour::to_rgb`] uses `smart_leds::hsv::hsv2rgb`, a
//! six-sector spectrum map where pure blue sits at hue 170.  Hue values are
//! kept in the 0..=160 scale of FastLED's rainbow map, so the cold end of
//! the scale renders as blue with a little green and mid-scale hues lean
//! toward yellow-green.  Raise `hue_max` to 170 for a pure-blue minimum.

use core::f32::consts::{E, PI};

use smart_leds::RGB8;
use smart_leds::hsv::{Hsv, hsv2rgb};

use crate::config::DisplayConfig;

/// Period of the breathing waveform.
pub const BREATH_PERIOD_MS: u64 = 4_000;

/// Amplitude applied to the raw exponential-sine waveform.
const BREATH_SCALE: f32 = 108.0;

/// Darkest intensity before brightness scaling.
const INTENSITY_FLOOR: u32 = 70;

/// One frame of indicator output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndicatorColour {
    pub hue: u8,
    pub saturation: u8,
    pub intensity: u8,
}

impl IndicatorColour {
    pub const OFF: Self = Self {
        hue: 0,
        saturation: 0,
        intensity: 0,
    };

    pub fn to_rgb(self) -> RGB8 {
        hsv2rgb(Hsv::from(self))
    }
}

impl From<IndicatorColour> for Hsv {
    fn from(c: IndicatorColour) -> Self {
        Hsv {
            hue: c.hue,
            sat: c.saturation,
            val: c.intensity,
        }
    }
}

/// Compute the indicator colour for a reading at `now_ms`.
pub fn render(
    power: i32,
    power_min: i32,
    power_max: i32,
    brightness: f32,
    hue_max: u8,
    now_ms: u64,
) -> IndicatorColour {
    IndicatorColour {
        hue: power_to_hue(power, power_min, power_max, hue_max),
        saturation: u8::MAX,
        intensity: breathing_intensity(now_ms, brightness),
    }
}

/// [`render`] driven from a [`DisplayConfig`].
pub fn render_config(config: &DisplayConfig, hue_max: u8, now_ms: u64) -> IndicatorColour {
    render(
        config.current_power,
        config.power_min,
        config.power_max,
        config.brightness,
        hue_max,
        now_ms,
    )
}

/// Clamp `power` into the bounds and map it linearly onto `[hue_max, 0]`.
///
/// Integer arithmetic, truncating toward zero.  Degenerate bounds
/// (`min >= max`) yield `hue_max`.
pub fn power_to_hue(power: i32, power_min: i32, power_max: i32, hue_max: u8) -> u8 {
    if power_min >= power_max {
        return hue_max;
    }
    let clamped = i64::from(power.clamp(power_min, power_max));
    let min = i64::from(power_min);
    let span = i64::from(power_max) - min;
    let top = i64::from(hue_max);
    let hue = (clamped - min) * -top / span + top;
    hue.clamp(0, top) as u8
}

/// Intensity of the breathing waveform at `now_ms`, scaled by `brightness`.
pub fn breathing_intensity(now_ms: u64, brightness: f32) -> u8 {
    let phase = (now_ms % BREATH_PERIOD_MS) as f32 / 2000.0 * PI;
    // `as u8` saturates, so float noise just below zero lands on 0.
    let raw = ((phase.sin().exp() - E.recip()) * BREATH_SCALE) as u8;
    let lifted = u32::from(raw) * (255 - INTENSITY_FLOOR) / 255 + INTENSITY_FLOOR;
    (lifted as f32 * brightness.max(0.0)) as u8
}
