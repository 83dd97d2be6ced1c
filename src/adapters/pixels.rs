//! Addressable LED strip adapter.
//!
//! Implements `smart_leds::SmartLedsWrite<Color = RGB8>` for the indicator
//! strip.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: [`Ws2811Rmt`] clocks WS2811 frames out of
//!   one RMT channel.
//! - **all targets**: [`FrameRecorder`] keeps every written frame in
//!   memory for host-side tests and simulation.

use smart_leds::{RGB8, SmartLedsWrite};

/// Byte order on the wire.  The display board's WS2811 elements take RGB;
/// most WS2812 strips take GRB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColourOrder {
    #[default]
    Rgb,
    Grb,
}

impl ColourOrder {
    pub fn bytes(self, c: RGB8) -> [u8; 3] {
        match self {
            Self::Rgb => [c.r, c.g, c.b],
            Self::Grb => [c.g, c.r, c.b],
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Frame recorder (host)
// ───────────────────────────────────────────────────────────────

/// Records frames instead of driving hardware.
///
/// Keeps only the most recent `capacity` frames; `frames_written` counts
/// all of them.
pub struct FrameRecorder {
    frames: std::collections::VecDeque<Vec<RGB8>>,
    capacity: usize,
    frames_written: u64,
}

impl FrameRecorder {
    pub fn new(capacity: usize) -> Self {
        Self {
            frames: std::collections::VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            frames_written: 0,
        }
    }

    pub fn last_frame(&self) -> Option<&[RGB8]> {
        self.frames.back().map(Vec::as_slice)
    }

    pub fn frames(&self) -> impl Iterator<Item = &[RGB8]> {
        self.frames.iter().map(Vec::as_slice)
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }
}

impl SmartLedsWrite for FrameRecorder {
    type Error = core::convert::Infallible;
    type Color = RGB8;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        if self.frames.len() == self.capacity {
            self.frames.pop_front();
        }
        self.frames
            .push_back(iterator.into_iter().map(Into::into).collect());
        self.frames_written += 1;
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// WS2811 over RMT (ESP-IDF)
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub use esp::Ws2811Rmt;

#[cfg(target_os = "espidf")]
mod esp {
    use core::time::Duration;

    use esp_idf_hal::gpio::OutputPin;
    use esp_idf_hal::peripheral::Peripheral;
    use esp_idf_hal::rmt::config::TransmitConfig;
    use esp_idf_hal::rmt::{PinState, Pulse, RmtChannel, TxRmtDriver, VariableLengthSignal};
    use esp_idf_svc::sys::EspError;
    use smart_leds::{RGB8, SmartLedsWrite};

    use super::ColourOrder;

    // WS2811 fast mode (800 kHz) bit timings.
    const T0H_NS: u64 = 250;
    const T0L_NS: u64 = 1000;
    const T1H_NS: u64 = 600;
    const T1L_NS: u64 = 650;

    pub struct Ws2811Rmt<'d> {
        tx: TxRmtDriver<'d>,
        order: ColourOrder,
        zero: [Pulse; 2],
        one: [Pulse; 2],
    }

    impl<'d> Ws2811Rmt<'d> {
        pub fn new<C: RmtChannel>(
            channel: impl Peripheral<P = C> + 'd,
            pin: impl Peripheral<P = impl OutputPin> + 'd,
            order: ColourOrder,
        ) -> Result<Self, EspError> {
            let config = TransmitConfig::new().clock_divider(1);
            let tx = TxRmtDriver::new(channel, pin, &config)?;
            let hz = tx.counter_clock()?;

            let pulse = |state, ns| Pulse::new_with_duration(hz, state, &Duration::from_nanos(ns));
            let zero = [
                pulse(PinState::High, T0H_NS)?,
                pulse(PinState::Low, T0L_NS)?,
            ];
            let one = [
                pulse(PinState::High, T1H_NS)?,
                pulse(PinState::Low, T1L_NS)?,
            ];

            Ok(Self {
                tx,
                order,
                zero,
                one,
            })
        }
    }

    impl SmartLedsWrite for Ws2811Rmt<'_> {
        type Error = EspError;
        type Color = RGB8;

        fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
        where
            T: IntoIterator<Item = I>,
            I: Into<Self::Color>,
        {
            let mut signal = VariableLengthSignal::new();
            for colour in iterator {
                for byte in self.order.bytes(colour.into()) {
                    for bit in (0..8).rev() {
                        let bit_pulses = if byte & (1 << bit) != 0 {
                            &self.one
                        } else {
                            &self.zero
                        };
                        signal.push(bit_pulses)?;
                    }
                }
            }
            self.tx.start_blocking(&signal)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_keeps_latest() {
        let mut rec = FrameRecorder::new(2);
        for v in 1..=3u8 {
            rec.write(core::iter::repeat_n(RGB8::new(v, 0, 0), 3)).unwrap();
        }
        assert_eq!(rec.frames_written(), 3);
        assert_eq!(rec.frames().count(), 2);
        assert_eq!(rec.last_frame().unwrap(), &[RGB8::new(3, 0, 0); 3]);
    }

    #[test]
    fn grb_swaps_red_and_green() {
        let c = RGB8::new(1, 2, 3);
        assert_eq!(ColourOrder::Rgb.bytes(c), [1, 2, 3]);
        assert_eq!(ColourOrder::Grb.bytes(c), [2, 1, 3]);
    }
}
