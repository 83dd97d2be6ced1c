//! GPIO assignments for the display board.
//!
//! Defaults only: [`DeviceSettings`](crate::config::DeviceSettings)
//! carries the values actually used, so a different board just
//! overrides them at startup.

/// WS2811 data line for the three status elements.
pub const STRIP_DATA_GPIO: i32 = 5;

/// Onboard blue LED next to the antenna.  Flashes on every heartbeat.
/// Active LOW.
pub const HEARTBEAT_LED_GPIO: i32 = 2;

/// Second onboard LED.  Held off; kept here so bootstrap can drive it to a
/// known level.  Active LOW.
pub const AUX_LED_GPIO: i32 = 16;
