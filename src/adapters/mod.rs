//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements                 | Connects to              |
//! |-------------|----------------------------|--------------------------|
//! | `mqtt`      | MqttPort                   | ESP-IDF MQTT client      |
//! | `pixels`    | SmartLedsWrite             | WS2811 strip over RMT    |
//! | `log_sink`  | EventSink                  | Serial log output        |
//! | `time`      | (loop clock)               | ESP32 system timer       |
//! | `wifi`      | (network bring-up)         | ESP-IDF WiFi STA         |
//! | `device_id` | (identity, RNG seed)       | eFuse MAC, hardware RNG  |

pub mod device_id;
pub mod log_sink;
pub mod mqtt;
pub mod pixels;
pub mod time;
pub mod wifi;
