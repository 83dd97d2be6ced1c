//! Output drivers layered over `embedded_hal` pins.

pub mod pulse_led;
