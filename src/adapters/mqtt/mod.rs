//! MQTT client adapter.
//!
//! Implements [`MqttPort`] on top of a broker connection.  Received
//! messages are queued into an [`Inbox`] by the client task and drained by
//! the control loop through [`MqttPort::poll`].
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: [`EspMqttAdapter`] wraps
//!   `esp_idf_svc::mqtt::client::EspMqttClient`.  Connection state is
//!   tracked from the client's event callback, which runs on the ESP-IDF
//!   MQTT task.
//! - **all other targets**: [`SimMqttAdapter`], an in-process broker
//!   stand-in with scripted connection failures for host-side tests.
//!
//! ## Session model
//!
//! Every `connect()` builds a fresh client with a new client id and last
//! will.  `disconnect()` drops the client.  Reconnection policy lives in
//! the session manager, never in the adapter.

pub mod inbox;

#[cfg(target_os = "espidf")]
mod esp_impl;

pub use inbox::Inbox;

#[cfg(target_os = "espidf")]
pub use esp_impl::EspMqttAdapter;

#[cfg(not(target_os = "espidf"))]
pub use sim::SimMqttAdapter;

// ───────────────────────────────────────────────────────────────
// Host simulation
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod sim {
    use log::{info, warn};

    use super::Inbox;
    use crate::app::ports::{InboundMessage, MqttPort, QoS, SessionOptions, TransportError};

    /// A message accepted by [`SimMqttAdapter::publish`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Published {
        pub topic: String,
        pub payload: Vec<u8>,
        pub qos: QoS,
        pub retain: bool,
    }

    /// Client id and last will of one connection attempt.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct AttemptRecord {
        pub client_id: String,
        pub will_topic: String,
        pub will_payload: Vec<u8>,
        pub will_qos: QoS,
        pub will_retain: bool,
    }

    /// In-process broker stand-in.
    ///
    /// The first `refusals` connection attempts are refused with rc `-2`
    /// (the classic "identifier rejected" code).  After that, attempts are
    /// acknowledged immediately, or left pending when `manual_ack` is set
    /// until [`acknowledge`](Self::acknowledge) is called.
    pub struct SimMqttAdapter {
        inbox: Inbox,
        connected: bool,
        pending: bool,
        refusals: u32,
        manual_ack: bool,
        attempts: Vec<AttemptRecord>,
        subscriptions: Vec<(String, QoS)>,
        published: Vec<Published>,
    }

    impl Default for SimMqttAdapter {
        fn default() -> Self {
            Self::new()
        }
    }

    impl SimMqttAdapter {
        pub fn new() -> Self {
            Self {
                inbox: Inbox::new(),
                connected: false,
                pending: false,
                refusals: 0,
                manual_ack: false,
                attempts: Vec::new(),
                subscriptions: Vec::new(),
                published: Vec::new(),
            }
        }

        /// Refuse the next `count` connection attempts.
        pub fn refuse_next(&mut self, count: u32) {
            self.refusals = count;
        }

        /// Leave attempts pending until [`acknowledge`](Self::acknowledge).
        pub fn set_manual_ack(&mut self, manual: bool) {
            self.manual_ack = manual;
        }

        /// Complete a pending attempt.
        pub fn acknowledge(&mut self) {
            if self.pending {
                self.pending = false;
                self.connected = true;
                info!("MQTT(sim): session acknowledged");
            }
        }

        /// Simulate the broker going away.  Subscriptions die with the session.
        pub fn drop_link(&mut self) {
            if self.connected {
                warn!("MQTT(sim): link dropped");
            }
            self.connected = false;
            self.pending = false;
            self.subscriptions.clear();
        }

        /// Deliver a message as if the broker had forwarded it.  Only
        /// subscribed topics reach the inbox.
        pub fn inject(&mut self, topic: &str, payload: &[u8]) -> bool {
            if !self.connected || !self.subscriptions.iter().any(|(t, _)| t == topic) {
                return false;
            }
            self.inbox.push(topic, payload)
        }

        pub fn attempts(&self) -> &[AttemptRecord] {
            &self.attempts
        }

        pub fn subscriptions(&self) -> &[(String, QoS)] {
            &self.subscriptions
        }

        pub fn published(&self) -> &[Published] {
            &self.published
        }
    }

    impl MqttPort for SimMqttAdapter {
        fn connect(&mut self, options: &SessionOptions<'_>) -> Result<(), TransportError> {
            self.drop_link();
            self.inbox.clear();
            self.attempts.push(AttemptRecord {
                client_id: options.client_id.into(),
                will_topic: options.will.topic.into(),
                will_payload: options.will.payload.to_vec(),
                will_qos: options.will.qos,
                will_retain: options.will.retain,
            });

            if self.refusals > 0 {
                self.refusals -= 1;
                return Err(TransportError::ConnectRefused(-2));
            }
            if self.manual_ack {
                self.pending = true;
            } else {
                self.connected = true;
            }
            Ok(())
        }

        fn disconnect(&mut self) {
            self.drop_link();
        }

        fn is_connected(&self) -> bool {
            self.connected
        }

        fn subscribe(&mut self, topic: &str, qos: QoS) -> Result<(), TransportError> {
            if !self.connected {
                return Err(TransportError::NotConnected);
            }
            self.subscriptions.push((topic.into(), qos));
            Ok(())
        }

        fn publish(
            &mut self,
            topic: &str,
            payload: &[u8],
            qos: QoS,
            retain: bool,
        ) -> Result<(), TransportError> {
            if !self.connected {
                return Err(TransportError::NotConnected);
            }
            self.published.push(Published {
                topic: topic.into(),
                payload: payload.to_vec(),
                qos,
                retain,
            });
            Ok(())
        }

        fn poll(&mut self) -> Option<InboundMessage> {
            self.inbox.pop()
        }
    }

}

#[cfg(not(target_os = "espidf"))]
pub use sim::{AttemptRecord, Published};
