//! MQTT session state machine.
//!
//! ```text
//!                 attempt due                 broker ack + 4 subscribes
//! ┌──────────────┐ ─────────▶ ┌────────────┐ ─────────────────▶ ┌───────────┐
//! │ Disconnected │            │ Connecting │                    │ Connected │
//! └──────────────┘ ◀───────── └────────────┘                    └───────────┘
//!        ▲        refused / timeout (retry in 5 s)                    │
//!        └────────────────────────── link lost (retry now) ───────────┘
//! ```
//!
//! [`SessionManager::tick`] is called once per control-loop iteration and
//! always returns immediately.  Retries are unbounded at a fixed interval:
//! a headless display has nothing better to do than keep trying.
//!
//! Every attempt uses a fresh random client id and registers a retained
//! `OFFLINE` last will on the status topic.  While connected, the
//! keep-alive timer publishes `ONLINE` and starts the heartbeat pulse.

pub mod timer;

use core::fmt::Write;

use heapless::String;
use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::app::events::{AppEvent, ConfigField};
use crate::app::ports::{
    EventSink, InboundMessage, LastWill, MqttPort, QoS, SessionOptions, TransportError,
};
use crate::config::{DeviceSettings, DisplayConfig, Topics};
use crate::payload::{try_decode_float, try_decode_int};
use timer::IntervalTimer;

/// Status payload published on every keep-alive.
pub const STATUS_ONLINE: &[u8] = b"ONLINE";

/// Last-will payload published by the broker when the session dies.
pub const STATUS_OFFLINE: &[u8] = b"OFFLINE";

/// Per-session client identifier, `<prefix>-<hex>`.
pub type ClientId = String<32>;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ConnectionState {
    Disconnected = 0,
    Connecting = 1,
    Connected = 2,
}

impl ConnectionState {
    pub fn name(self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting",
            Self::Connected => "Connected",
        }
    }
}

// ---------------------------------------------------------------------------
// Session manager
// ---------------------------------------------------------------------------

pub struct SessionManager {
    state: ConnectionState,
    topics: Topics,
    client_id_prefix: String<24>,
    retry_interval_ms: u32,
    connect_timeout_ms: u32,
    brightness_floor: f32,
    brightness_ceiling: f32,

    /// Uptime at which the next attempt may start.
    next_attempt_at: u64,
    /// Uptime at which the pending attempt started.
    attempt_started_at: u64,

    keep_alive: IntervalTimer,
    pulse: IntervalTimer,
    rng: SmallRng,

    attempts: u32,
    consecutive_failures: u32,
    heartbeats_sent: u32,
}

impl SessionManager {
    /// `seed` feeds the client-id generator; pass hardware entropy on target.
    pub fn new(settings: &DeviceSettings, seed: u64) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            topics: settings.topics.clone(),
            client_id_prefix: settings.client_id_prefix.clone(),
            retry_interval_ms: settings.retry_interval_ms,
            connect_timeout_ms: settings.connect_timeout_ms,
            brightness_floor: settings.brightness_floor,
            brightness_ceiling: settings.brightness_ceiling,
            next_attempt_at: 0,
            attempt_started_at: 0,
            keep_alive: IntervalTimer::periodic(settings.keep_alive_interval_ms),
            pulse: IntervalTimer::one_shot(settings.pulse_duration_ms),
            rng: SmallRng::seed_from_u64(seed),
            attempts: 0,
            consecutive_failures: 0,
            heartbeats_sent: 0,
        }
    }

    // ── Connection servicing ──────────────────────────────────

    /// Service the connection.  Never blocks.
    ///
    /// 1. Detect link loss while connected.
    /// 2. Start an attempt when disconnected and the retry delay has passed.
    /// 3. Complete (subscribe) or time out a pending attempt.
    pub fn tick(&mut self, now_ms: u64, mqtt: &mut impl MqttPort, sink: &mut impl EventSink) {
        if self.state == ConnectionState::Connected && !mqtt.is_connected() {
            warn!("Session: link lost, reconnecting");
            sink.emit(&AppEvent::LinkLost);
            self.keep_alive.stop();
            self.transition(ConnectionState::Disconnected, sink);
            self.next_attempt_at = now_ms;
        }

        if self.state == ConnectionState::Disconnected && now_ms >= self.next_attempt_at {
            self.begin_attempt(now_ms, mqtt, sink);
        }

        if self.state == ConnectionState::Connecting {
            self.poll_attempt(now_ms, mqtt, sink);
        }
    }

    fn begin_attempt(&mut self, now_ms: u64, mqtt: &mut impl MqttPort, sink: &mut impl EventSink) {
        self.attempts = self.attempts.wrapping_add(1);
        let client_id = self.next_client_id();
        info!(
            "Session: attempting MQTT connection as '{}' (attempt {})",
            client_id, self.attempts
        );
        sink.emit(&AppEvent::ConnectAttempt {
            attempt: self.attempts,
            client_id: client_id.clone(),
        });

        self.transition(ConnectionState::Connecting, sink);
        self.attempt_started_at = now_ms;

        let options = SessionOptions {
            client_id: client_id.as_str(),
            will: LastWill {
                topic: self.topics.status.as_str(),
                payload: STATUS_OFFLINE,
                qos: QoS::AtLeastOnce,
                retain: true,
            },
        };
        if let Err(e) = mqtt.connect(&options) {
            self.fail_attempt(now_ms, e, sink);
        }
    }

    fn poll_attempt(&mut self, now_ms: u64, mqtt: &mut impl MqttPort, sink: &mut impl EventSink) {
        if mqtt.is_connected() {
            match self.subscribe_all(mqtt) {
                Ok(()) => {
                    info!(
                        "Session: connected, {} topics subscribed",
                        self.topics.subscriptions().len()
                    );
                    self.consecutive_failures = 0;
                    self.keep_alive.start(now_ms);
                    self.transition(ConnectionState::Connected, sink);
                }
                Err(e) => {
                    mqtt.disconnect();
                    self.fail_attempt(now_ms, e, sink);
                }
            }
        } else if now_ms.saturating_sub(self.attempt_started_at)
            >= u64::from(self.connect_timeout_ms)
        {
            mqtt.disconnect();
            self.fail_attempt(now_ms, TransportError::TimedOut, sink);
        }
    }

    fn subscribe_all(&self, mqtt: &mut impl MqttPort) -> Result<(), TransportError> {
        for topic in self.topics.subscriptions() {
            mqtt.subscribe(topic, QoS::AtMostOnce)?;
            debug!("Session: subscribed to '{}'", topic);
        }
        Ok(())
    }

    fn fail_attempt(&mut self, now_ms: u64, reason: TransportError, sink: &mut impl EventSink) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        warn!(
            "Session: failed, rc={} try again in {} seconds",
            reason,
            self.retry_interval_ms / 1000
        );
        self.next_attempt_at = now_ms.saturating_add(u64::from(self.retry_interval_ms));
        self.transition(ConnectionState::Disconnected, sink);
        sink.emit(&AppEvent::ConnectFailed {
            attempt: self.attempts,
            retry_in_ms: self.retry_interval_ms,
        });
    }

    fn next_client_id(&mut self) -> ClientId {
        let mut id = ClientId::new();
        let suffix: u32 = self.rng.random_range(0..0xffff);
        let _ = write!(id, "{}-{:x}", self.client_id_prefix, suffix);
        id
    }

    fn transition(&mut self, next: ConnectionState, sink: &mut impl EventSink) {
        if next == self.state {
            return;
        }
        info!("Session transition: {} -> {}", self.state.name(), next.name());
        let from = self.state;
        self.state = next;
        sink.emit(&AppEvent::StateChanged { from, to: next });
    }

    // ── Liveness ──────────────────────────────────────────────

    /// Publish `ONLINE` when the keep-alive period has elapsed.
    ///
    /// Returns `true` when an announcement went out and the heartbeat
    /// pulse was started.
    pub fn service_keep_alive(
        &mut self,
        now_ms: u64,
        mqtt: &mut impl MqttPort,
        sink: &mut impl EventSink,
    ) -> bool {
        if !self.keep_alive.poll(now_ms) || self.state != ConnectionState::Connected {
            return false;
        }
        match mqtt.publish(
            self.topics.status.as_str(),
            STATUS_ONLINE,
            QoS::AtMostOnce,
            false,
        ) {
            Ok(()) => {
                self.heartbeats_sent = self.heartbeats_sent.wrapping_add(1);
                self.pulse.start(now_ms);
                sink.emit(&AppEvent::Heartbeat {
                    count: self.heartbeats_sent,
                });
                true
            }
            Err(e) => {
                warn!("Session: status publish failed: {}", e);
                false
            }
        }
    }

    /// `true` once, when the heartbeat pulse has run its course.
    pub fn pulse_expired(&mut self, now_ms: u64) -> bool {
        self.pulse.poll(now_ms)
    }

    pub fn pulse_active(&self) -> bool {
        self.pulse.is_running()
    }

    // ── Dispatch ──────────────────────────────────────────────

    /// Which configuration field `topic` feeds, if any.
    pub fn route(&self, topic: &str) -> Option<ConfigField> {
        let t = &self.topics;
        if topic == t.power.as_str() {
            Some(ConfigField::Power)
        } else if topic == t.max_power.as_str() {
            Some(ConfigField::PowerMax)
        } else if topic == t.min_power.as_str() {
            Some(ConfigField::PowerMin)
        } else if topic == t.brightness.as_str() {
            Some(ConfigField::Brightness)
        } else {
            None
        }
    }

    /// Decode `msg` into `config`.  Unknown topics are ignored; bound updates
    /// that would break `power_min < power_max` are refused.
    pub fn dispatch(
        &self,
        msg: &InboundMessage,
        config: &mut DisplayConfig,
        sink: &mut impl EventSink,
    ) -> Option<ConfigField> {
        let Some(field) = self.route(msg.topic.as_str()) else {
            debug!("Session: ignoring message on '{}'", msg.topic);
            return None;
        };

        let Some(applied) = self.apply(field, &msg.payload, config) else {
            debug!("Session: oversized payload on '{}' dropped", msg.topic);
            return None;
        };

        match applied {
            Ok(()) => {
                sink.emit(&AppEvent::ConfigUpdated {
                    field,
                    config: *config,
                });
                Some(field)
            }
            Err(value) => {
                warn!(
                    "Config: {:?}={} rejected, bounds stay [{}, {}]",
                    field, value, config.power_min, config.power_max
                );
                sink.emit(&AppEvent::ConfigRejected { field, value });
                None
            }
        }
    }

    /// Write the decoded payload into `config`.  `None` leaves `config`
    /// untouched because the payload was oversized; `Some(Err(value))` is a
    /// refused bound update.
    fn apply(
        &self,
        field: ConfigField,
        payload: &[u8],
        config: &mut DisplayConfig,
    ) -> Option<Result<(), i32>> {
        let applied = match field {
            ConfigField::Power => {
                config.set_power(try_decode_int(payload)?);
                info!("Power: {}W", config.current_power);
                Ok(())
            }
            ConfigField::PowerMax => {
                let value = try_decode_int(payload)?;
                config
                    .set_power_max(value)
                    .map(|()| info!("Max power: {}W", config.power_max))
                    .map_err(|_| value)
            }
            ConfigField::PowerMin => {
                let value = try_decode_int(payload)?;
                config
                    .set_power_min(value)
                    .map(|()| info!("Min power: {}W", config.power_min))
                    .map_err(|_| value)
            }
            ConfigField::Brightness => {
                let stored = config.set_brightness(
                    try_decode_float(payload)?,
                    self.brightness_floor,
                    self.brightness_ceiling,
                );
                info!("LED max brightness: {:.2}", stored);
                Ok(())
            }
        };
        Some(applied)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Connection attempts started since boot.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Failed attempts since the last successful connect.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// `ONLINE` announcements published since boot.
    pub fn heartbeats_sent(&self) -> u32 {
        self.heartbeats_sent
    }

    /// Uptime at which the next connection attempt is allowed.
    pub fn next_attempt_at(&self) -> u64 {
        self.next_attempt_at
    }

    pub fn topics(&self) -> &Topics {
        &self.topics
    }
}
