//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production, stderr on host).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(cfg) => {
                info!(
                    "START | power={}W bounds=[{}, {}]W brightness={:.2}",
                    cfg.current_power, cfg.power_min, cfg.power_max, cfg.brightness
                );
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {} -> {}", from.name(), to.name());
            }
            AppEvent::ConnectAttempt { attempt, client_id } => {
                info!("MQTT  | attempt #{} as '{}'", attempt, client_id);
            }
            AppEvent::ConnectFailed {
                attempt,
                retry_in_ms,
            } => {
                warn!(
                    "MQTT  | attempt #{} failed, retry in {}ms",
                    attempt, retry_in_ms
                );
            }
            AppEvent::LinkLost => {
                warn!("MQTT  | link lost");
            }
            AppEvent::ConfigUpdated { field, config } => {
                info!(
                    "CONFIG| {:?} -> power={}W bounds=[{}, {}]W brightness={:.2}",
                    field, config.current_power, config.power_min, config.power_max, config.brightness
                );
            }
            AppEvent::ConfigRejected { field, value } => {
                warn!("CONFIG| {:?}={} rejected", field, value);
            }
            AppEvent::Heartbeat { count } => {
                info!("ALIVE | #{}", count);
            }
        }
    }
}
