//! System configuration parameters
//!
//! Two layers:
//!
//! - [`DeviceSettings`]: deployment parameters injected once at startup
//!   (broker, topics, timing, pins).  Immutable while running.
//! - [`DisplayConfig`]: the live rendering parameters, mutated only by
//!   inbound MQTT messages on the control-loop thread.

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::pins;

/// Fixed-capacity topic / host string.
pub type ShortString = String<64>;

/// Longest accepted keep-alive period.  Upstream monitors mark the device
/// offline after 15 s without a status message.
pub const MAX_KEEP_ALIVE_MS: u32 = 15_000;

// ---------------------------------------------------------------------------
// Topics
// ---------------------------------------------------------------------------

/// The fixed set of MQTT topics the display talks to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topics {
    /// Inbound: instantaneous power reading (ASCII integer, watts).
    pub power: ShortString,
    /// Inbound: upper bound of the colour scale (ASCII integer).
    pub max_power: ShortString,
    /// Inbound: lower bound of the colour scale (ASCII integer).
    pub min_power: ShortString,
    /// Inbound: brightness scale (ASCII float).
    pub brightness: ShortString,
    /// Outbound: `ONLINE` heartbeats and the `OFFLINE` last will.
    pub status: ShortString,
}

impl Topics {
    /// The four topics subscribed on every (re)connect, in subscribe order.
    pub fn subscriptions(&self) -> [&str; 4] {
        [
            self.power.as_str(),
            self.max_power.as_str(),
            self.min_power.as_str(),
            self.brightness.as_str(),
        ]
    }
}

impl Default for Topics {
    fn default() -> Self {
        Self {
            power: short("31/data/power"),
            max_power: short("emon/kingswood/monitor/maxpower"),
            min_power: short("emon/kingswood/monitor/minpower"),
            brightness: short("emon/kingswood/monitor/brightness"),
            status: short("emon/kingswood/monitor/status"),
        }
    }
}

// ---------------------------------------------------------------------------
// Device settings
// ---------------------------------------------------------------------------

/// Deployment configuration injected at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSettings {
    // --- Broker ---
    /// Broker host name or dotted IPv4 address.
    pub broker_host: ShortString,
    /// Broker TCP port.
    pub broker_port: u16,
    /// Prefix of the random per-session client id.
    pub client_id_prefix: String<24>,
    /// MQTT topic set.
    pub topics: Topics,

    // --- Session timing ---
    /// Fixed delay between failed connection attempts (milliseconds).
    pub retry_interval_ms: u32,
    /// How long a started connection attempt may stay pending (milliseconds).
    pub connect_timeout_ms: u32,
    /// Period of the `ONLINE` status publish (milliseconds, <= 15 s).
    pub keep_alive_interval_ms: u32,
    /// How long the heartbeat LED stays lit per announcement (milliseconds).
    pub pulse_duration_ms: u32,

    // --- Rendering ---
    /// Hue at (and below) `power_min`.  160 is blue on the rainbow scale.
    pub hue_max: u8,
    /// Number of addressable elements on the strip.
    pub element_count: u8,
    /// Lower clamp for the brightness scale.
    pub brightness_floor: f32,
    /// Upper clamp for the brightness scale.
    pub brightness_ceiling: f32,

    // --- Pins ---
    /// Data line of the addressable strip.
    pub strip_data_gpio: i32,
    /// Heartbeat LED.
    pub heartbeat_led_gpio: i32,
    /// Heartbeat LED is lit when the pin is driven LOW.
    pub heartbeat_active_low: bool,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            broker_host: short("192.168.1.30"),
            broker_port: 1883,
            client_id_prefix: String::try_from("ESP32Client").unwrap_or_default(),
            topics: Topics::default(),

            retry_interval_ms: 5_000,
            connect_timeout_ms: 5_000,
            keep_alive_interval_ms: 10_000,
            pulse_duration_ms: 100,

            hue_max: 160,
            element_count: 3,
            brightness_floor: 0.0,
            brightness_ceiling: 1.0,

            strip_data_gpio: pins::STRIP_DATA_GPIO,
            heartbeat_led_gpio: pins::HEARTBEAT_LED_GPIO,
            heartbeat_active_low: true,
        }
    }
}

/// Reasons a [`DeviceSettings`] value is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsError {
    /// The JSON document could not be parsed.
    Malformed,
    /// A field failed range validation.
    Invalid(&'static str),
}

impl core::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Malformed => write!(f, "settings JSON malformed"),
            Self::Invalid(field) => write!(f, "invalid setting: {}", field),
        }
    }
}

impl DeviceSettings {
    /// Parse a JSON override and validate it.  Missing fields are not
    /// allowed; start from `Default` and serialise to get a template.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json).map_err(|_| SettingsError::Malformed)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.broker_host.is_empty() {
            return Err(SettingsError::Invalid("broker_host"));
        }
        if self.broker_port == 0 {
            return Err(SettingsError::Invalid("broker_port"));
        }
        if self.keep_alive_interval_ms == 0 || self.keep_alive_interval_ms > MAX_KEEP_ALIVE_MS {
            return Err(SettingsError::Invalid("keep_alive_interval_ms"));
        }
        if self.pulse_duration_ms >= self.keep_alive_interval_ms {
            return Err(SettingsError::Invalid("pulse_duration_ms"));
        }
        if self.retry_interval_ms == 0 {
            return Err(SettingsError::Invalid("retry_interval_ms"));
        }
        if self.connect_timeout_ms == 0 {
            return Err(SettingsError::Invalid("connect_timeout_ms"));
        }
        if self.element_count == 0 {
            return Err(SettingsError::Invalid("element_count"));
        }
        if !(self.brightness_floor >= 0.0 && self.brightness_floor < self.brightness_ceiling) {
            return Err(SettingsError::Invalid("brightness_floor"));
        }
        if self.brightness_ceiling > 1.0 {
            return Err(SettingsError::Invalid("brightness_ceiling"));
        }
        Ok(())
    }

    /// `mqtt://host:port` form used by the ESP-IDF client.
    pub fn broker_url(&self) -> String<96> {
        let mut url = String::new();
        use core::fmt::Write;
        let _ = write!(url, "mqtt://{}:{}", self.broker_host, self.broker_port);
        url
    }
}

// ---------------------------------------------------------------------------
// Live display configuration
// ---------------------------------------------------------------------------

/// Rendering parameters driven by the message feed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Latest power reading (watts).
    pub current_power: i32,
    /// Power mapped to the maximum hue.
    pub power_min: i32,
    /// Power mapped to hue 0.
    pub power_max: i32,
    /// Intensity multiplier, already clamped to the device bounds.
    pub brightness: f32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            current_power: 0,
            power_min: 200,
            power_max: 1000,
            brightness: 1.0,
        }
    }
}

/// A bounds update that would break `power_min < power_max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundsRejected {
    pub power_min: i32,
    pub power_max: i32,
}

impl DisplayConfig {
    pub fn set_power(&mut self, watts: i32) {
        self.current_power = watts;
    }

    /// Update the lower bound; refused unless it stays below `power_max`.
    pub fn set_power_min(&mut self, watts: i32) -> Result<(), BoundsRejected> {
        if watts >= self.power_max {
            return Err(BoundsRejected {
                power_min: watts,
                power_max: self.power_max,
            });
        }
        self.power_min = watts;
        Ok(())
    }

    /// Update the upper bound; refused unless it stays above `power_min`.
    pub fn set_power_max(&mut self, watts: i32) -> Result<(), BoundsRejected> {
        if watts <= self.power_min {
            return Err(BoundsRejected {
                power_min: self.power_min,
                power_max: watts,
            });
        }
        self.power_max = watts;
        Ok(())
    }

    /// Store a brightness scale clamped into `[floor, ceiling]`.
    /// NaN collapses to `floor`.  Returns the stored value.
    pub fn set_brightness(&mut self, scale: f32, floor: f32, ceiling: f32) -> f32 {
        self.brightness = if scale.is_nan() {
            floor
        } else {
            scale.clamp(floor, ceiling)
        };
        self.brightness
    }
}

fn short(s: &str) -> ShortString {
    ShortString::try_from(s).unwrap_or_default()
}
