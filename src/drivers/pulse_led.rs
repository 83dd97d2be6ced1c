//! Heartbeat LED driver.
//!
//! Wraps any `embedded_hal` output pin.  The onboard LEDs on the display
//! board are wired active-low, so "on" drives the pin LOW.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: an `esp_idf_hal::gpio::PinDriver` in output mode.
//! On host/test: any mock implementing `OutputPin`.

use embedded_hal::digital::OutputPin;
use log::warn;

pub struct PulseLed<P> {
    pin: P,
    active_low: bool,
    lit: bool,
}

impl<P: OutputPin> PulseLed<P> {
    /// Take ownership of `pin` and drive it to the off level.
    pub fn new(pin: P, active_low: bool) -> Self {
        let mut led = Self {
            pin,
            active_low,
            lit: true,
        };
        led.off();
        led
    }

    pub fn on(&mut self) {
        self.drive(true);
    }

    pub fn off(&mut self) {
        self.drive(false);
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    /// Release the underlying pin.
    pub fn into_inner(self) -> P {
        self.pin
    }

    fn drive(&mut self, lit: bool) {
        let high = lit != self.active_low;
        let result = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        match result {
            Ok(()) => self.lit = lit,
            Err(e) => warn!("PulseLed: pin write failed: {:?}", e),
        }
    }
}
