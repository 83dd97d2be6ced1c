//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controller / SessionManager (domain)
//! ```
//!
//! Driven adapters (MQTT client, event sinks) implement these traits.  The
//! domain consumes them via generics, so it never touches the network
//! stack directly.  The pixel strip and the heartbeat LED use the ecosystem
//! traits instead (`smart_leds::SmartLedsWrite`,
//! `embedded_hal::digital::OutputPin`).

use heapless::{String, Vec};

// ───────────────────────────────────────────────────────────────
// Inbound message
// ───────────────────────────────────────────────────────────────

/// Longest topic an adapter will queue.
pub const MAX_TOPIC_LEN: usize = 64;

/// Largest payload an adapter will queue.  Anything longer is dropped at
/// the adapter; the decoder applies its own tighter limit.
pub const MAX_QUEUED_PAYLOAD: usize = 64;

/// A message received on a subscribed topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String<MAX_TOPIC_LEN>,
    pub payload: Vec<u8, MAX_QUEUED_PAYLOAD>,
}

impl InboundMessage {
    /// Copy a received message into fixed buffers.  `None` when either part
    /// exceeds its capacity.
    pub fn new(topic: &str, payload: &[u8]) -> Option<Self> {
        let mut t = String::new();
        t.push_str(topic).ok()?;
        let p = Vec::from_slice(payload).ok()?;
        Some(Self {
            topic: t,
            payload: p,
        })
    }
}

// ───────────────────────────────────────────────────────────────
// MQTT port
// ───────────────────────────────────────────────────────────────

/// Delivery guarantee requested from the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QoS {
    AtMostOnce,
    AtLeastOnce,
}

/// Message the broker publishes on our behalf if the session dies uncleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastWill<'a> {
    pub topic: &'a str,
    pub payload: &'a [u8],
    pub qos: QoS,
    pub retain: bool,
}

/// Parameters of one connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions<'a> {
    pub client_id: &'a str,
    pub will: LastWill<'a>,
}

/// Publish/subscribe transport as seen by the session manager.
///
/// `connect` only *starts* an attempt.  Synchronous transports may report
/// `is_connected() == true` straight away; asynchronous ones (ESP-IDF)
/// flip it later from their own task.
pub trait MqttPort {
    /// Begin a new session, dropping any previous one.
    fn connect(&mut self, options: &SessionOptions<'_>) -> Result<(), TransportError>;

    /// Tear down the current session or pending attempt.
    fn disconnect(&mut self);

    /// Whether the broker has acknowledged the session and it is still up.
    fn is_connected(&self) -> bool;

    fn subscribe(&mut self, topic: &str, qos: QoS) -> Result<(), TransportError>;

    fn publish(
        &mut self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
        retain: bool,
    ) -> Result<(), TransportError>;

    /// Next pending inbound message, if any.  Never blocks.
    fn poll(&mut self) -> Option<InboundMessage>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`MqttPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// The operation needs an established session.
    NotConnected,
    /// The broker or client rejected the connection attempt.
    /// Carries the platform return code.
    ConnectRefused(i32),
    /// A started attempt was not acknowledged in time.
    TimedOut,
    /// Subscribe request could not be queued.
    SubscribeFailed,
    /// Publish request could not be queued.
    PublishFailed,
}

impl core::fmt::Display for TransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotConnected => write!(f, "not connected"),
            Self::ConnectRefused(rc) => write!(f, "connect refused (rc={})", rc),
            Self::TimedOut => write!(f, "connect timed out"),
            Self::SubscribeFailed => write!(f, "subscribe failed"),
            Self::PublishFailed => write!(f, "publish failed"),
        }
    }
}
