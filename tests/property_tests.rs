//! Property and fuzz-style tests for the decoding and rendering core.
//!
//! Runs on host (x86_64) only; proptest is not available for ESP32 targets.
//! On ESP32, these tests are compiled out.

#![cfg(not(target_os = "espidf"))]

use powerdisplay::config::DisplayConfig;
use powerdisplay::payload::{MAX_PAYLOAD_LEN, decode_float, decode_int};
use powerdisplay::render::{BREATH_PERIOD_MS, breathing_intensity, power_to_hue, render};
use powerdisplay::session::timer::IntervalTimer;
use proptest::prelude::*;

// ── Payload decoding ─────────────────────────────────────────

proptest! {
    /// Arbitrary bytes never panic either decoder.
    #[test]
    fn decoders_are_total(bytes in proptest::collection::vec(any::<u8>(), 0..128)) {
        let _ = decode_int(&bytes);
        let _ = decode_float(&bytes);
    }

    /// Anything longer than the payload limit decodes to zero.
    #[test]
    fn oversized_payloads_decode_to_zero(extra in 1usize..64, digit in b'1'..=b'9') {
        let bytes = vec![digit; MAX_PAYLOAD_LEN + extra];
        prop_assert_eq!(decode_int(&bytes), 0);
        prop_assert_eq!(decode_float(&bytes), 0.0);
    }

    /// Canonical integer text decodes to itself.
    #[test]
    fn integer_text_round_trips(n in any::<i32>()) {
        prop_assert_eq!(decode_int(n.to_string().as_bytes()), n);
    }

    /// Trailing garbage after a number is ignored.
    #[test]
    fn trailing_garbage_ignored(n in -100_000i32..100_000, tail in "[a-zW ]{0,8}") {
        let text = format!("{n}{tail}");
        prop_assert_eq!(decode_int(text.as_bytes()), n);
    }
}

// ── Display configuration ────────────────────────────────────

proptest! {
    /// Bounds stay strictly ordered whatever sequence of updates arrives.
    #[test]
    fn bounds_stay_ordered(updates in proptest::collection::vec((any::<bool>(), any::<i32>()), 0..32)) {
        let mut cfg = DisplayConfig::default();
        for (is_min, value) in updates {
            let _ = if is_min { cfg.set_power_min(value) } else { cfg.set_power_max(value) };
            prop_assert!(cfg.power_min < cfg.power_max);
        }
    }

    /// Stored brightness always lies inside the clamp bounds.
    #[test]
    fn brightness_is_clamped(scale in any::<f32>()) {
        let mut cfg = DisplayConfig::default();
        let stored = cfg.set_brightness(scale, 0.0, 1.0);
        prop_assert!((0.0..=1.0).contains(&stored));
    }
}

// ── Rendering ────────────────────────────────────────────────

proptest! {
    /// Hue never rises as power rises.
    #[test]
    fn hue_is_monotonic(
        min in -10_000i32..10_000,
        span in 1i32..20_000,
        a in -40_000i32..40_000,
        b in -40_000i32..40_000,
    ) {
        let max = min + span;
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(power_to_hue(lo, min, max, 160) >= power_to_hue(hi, min, max, 160));
    }

    /// Hue stays in `[0, hue_max]`, even for extreme inputs.
    #[test]
    fn hue_in_range(power in any::<i32>(), min in any::<i32>(), max in any::<i32>(), hue_max in any::<u8>()) {
        prop_assert!(power_to_hue(power, min, max, hue_max) <= hue_max);
    }

    /// The breathing waveform repeats exactly every period.
    #[test]
    fn breathing_is_periodic(t in 0u64..1_000_000_000, k in 1u64..1_000) {
        prop_assert_eq!(
            breathing_intensity(t, 1.0),
            breathing_intensity(t + k * BREATH_PERIOD_MS, 1.0)
        );
    }

    /// Full brightness never drops below the floor; any brightness never
    /// exceeds the unscaled value.
    #[test]
    fn intensity_bounds(t in any::<u64>(), brightness in 0.0f32..=1.0) {
        let full = breathing_intensity(t, 1.0);
        prop_assert!(full >= 70);
        prop_assert!(breathing_intensity(t, brightness) <= full);
    }

    /// Saturation is always full.
    #[test]
    fn render_is_saturated(power in any::<i32>(), t in any::<u64>()) {
        prop_assert_eq!(render(power, 200, 1000, 1.0, 160, t).saturation, 255);
    }
}

// ── Timers ───────────────────────────────────────────────────

proptest! {
    /// A periodic timer fires at most once per `poll`, never before its
    /// period has elapsed since the last expiry.
    #[test]
    fn periodic_timer_spacing(period in 1u32..20_000, steps in proptest::collection::vec(1u64..5_000, 1..64)) {
        let mut timer = IntervalTimer::periodic(period);
        timer.start(0);
        let mut now = 0u64;
        let mut last_fire = 0u64;
        for step in steps {
            now += step;
            if timer.poll(now) {
                prop_assert!(now - last_fire >= u64::from(period));
                last_fire = now;
            }
        }
    }
}
