//! ESP-IDF MQTT client.
//!
//! Compiled only for `target_os = "espidf"`.  The client callback runs on
//! the ESP-IDF MQTT task: it flips the shared `connected` flag and copies
//! received messages into the static [`Inbox`].  Nothing else crosses the
//! task boundary.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use esp_idf_svc::mqtt::client::{
    Details, EspMqttClient, EventPayload, LwtConfiguration, MqttClientConfiguration,
    QoS as EspQoS,
};
use log::{info, warn};

use super::Inbox;
use crate::app::ports::{InboundMessage, MqttPort, QoS, SessionOptions, TransportError};

fn map_qos(qos: QoS) -> EspQoS {
    match qos {
        QoS::AtMostOnce => EspQoS::AtMostOnce,
        QoS::AtLeastOnce => EspQoS::AtLeastOnce,
    }
}

pub struct EspMqttAdapter {
    url: heapless::String<96>,
    inbox: &'static Inbox,
    connected: Arc<AtomicBool>,
    client: Option<EspMqttClient<'static>>,
}

impl EspMqttAdapter {
    /// `url` is the full broker URL (`mqtt://host:port`).
    pub fn new(url: heapless::String<96>, inbox: &'static Inbox) -> Self {
        Self {
            url,
            inbox,
            connected: Arc::new(AtomicBool::new(false)),
            client: None,
        }
    }
}

impl MqttPort for EspMqttAdapter {
    fn connect(&mut self, options: &SessionOptions<'_>) -> Result<(), TransportError> {
        self.disconnect();

        let conf = MqttClientConfiguration {
            client_id: Some(options.client_id),
            lwt: Some(LwtConfiguration {
                topic: options.will.topic,
                payload: options.will.payload,
                qos: map_qos(options.will.qos),
                retain: options.will.retain,
            }),
            ..Default::default()
        };

        // A fresh flag per client so a late callback from a dropped client
        // cannot mark the new session as up.
        let connected = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&connected);
        let inbox = self.inbox;

        let client = EspMqttClient::new_cb(self.url.as_str(), &conf, move |event| {
            match event.payload() {
                EventPayload::Connected(_) => {
                    flag.store(true, Ordering::Release);
                }
                EventPayload::Disconnected => {
                    flag.store(false, Ordering::Release);
                }
                EventPayload::Received {
                    topic: Some(topic),
                    data,
                    details: Details::Complete,
                    ..
                } => {
                    inbox.push(topic, data);
                }
                EventPayload::Received { .. } => {
                    warn!("MQTT: ignoring fragmented or topicless message");
                }
                EventPayload::Error(e) => {
                    warn!("MQTT: client error: {:?}", e);
                }
                _ => {}
            }
        })
        .map_err(|e| TransportError::ConnectRefused(e.code()))?;

        info!("MQTT: client '{}' started for {}", options.client_id, self.url);
        self.connected = connected;
        self.client = Some(client);
        Ok(())
    }

    fn disconnect(&mut self) {
        if self.client.take().is_some() {
            info!("MQTT: client dropped");
        }
        self.connected.store(false, Ordering::Release);
        self.inbox.clear();
    }

    fn is_connected(&self) -> bool {
        self.client.is_some() && self.connected.load(Ordering::Acquire)
    }

    fn subscribe(&mut self, topic: &str, qos: QoS) -> Result<(), TransportError> {
        let client = self.client.as_mut().ok_or(TransportError::NotConnected)?;
        client.subscribe(topic, map_qos(qos)).map_err(|e| {
            warn!("MQTT: subscribe '{}' failed: {}", topic, e);
            TransportError::SubscribeFailed
        })?;
        Ok(())
    }

    fn publish(
        &mut self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
        retain: bool,
    ) -> Result<(), TransportError> {
        let client = self.client.as_mut().ok_or(TransportError::NotConnected)?;
        client
            .publish(topic, map_qos(qos), retain, payload)
            .map_err(|e| {
                warn!("MQTT: publish '{}' failed: {}", topic, e);
                TransportError::PublishFailed
            })?;
        Ok(())
    }

    fn poll(&mut self) -> Option<InboundMessage> {
        self.inbox.pop()
    }
}
