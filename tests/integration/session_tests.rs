//! Session lifecycle against the simulated broker: retry cadence, client
//! ids, last will, subscriptions and link-loss recovery.

use powerdisplay::adapters::mqtt::SimMqttAdapter;
use powerdisplay::app::events::AppEvent;
use powerdisplay::app::ports::QoS;
use powerdisplay::config::Topics;
use powerdisplay::session::{ConnectionState, STATUS_OFFLINE};

use crate::mock_hw::{Rig, SubscribeRefusingBroker};

#[test]
fn first_tick_connects_and_subscribes_all_four_topics() {
    let mut rig = Rig::new();
    let mut mqtt = SimMqttAdapter::new();

    rig.tick(0, &mut mqtt);

    assert_eq!(rig.controller.connection_state(), ConnectionState::Connected);
    let topics = Topics::default();
    let subscribed: Vec<&str> = mqtt.subscriptions().iter().map(|(t, _)| t.as_str()).collect();
    assert_eq!(subscribed, topics.subscriptions().to_vec());
    assert!(
        mqtt.subscriptions()
            .iter()
            .all(|(_, qos)| *qos == QoS::AtMostOnce)
    );
}

#[test]
fn refused_attempts_retry_every_five_seconds() {
    let mut rig = Rig::new();
    let mut mqtt = SimMqttAdapter::new();
    mqtt.refuse_next(2);

    rig.tick(0, &mut mqtt);
    assert_eq!(mqtt.attempts().len(), 1);
    assert_eq!(rig.controller.connection_state(), ConnectionState::Disconnected);

    // Nothing happens inside the retry window.
    rig.tick(2_500, &mut mqtt);
    rig.tick(4_999, &mut mqtt);
    assert_eq!(mqtt.attempts().len(), 1);

    rig.tick(5_000, &mut mqtt);
    assert_eq!(mqtt.attempts().len(), 2);
    assert_eq!(rig.controller.connection_state(), ConnectionState::Disconnected);

    rig.tick(10_000, &mut mqtt);
    assert_eq!(mqtt.attempts().len(), 3);
    assert_eq!(rig.controller.connection_state(), ConnectionState::Connected);
    assert_eq!(mqtt.subscriptions().len(), 4);
    assert_eq!(rig.controller.session().consecutive_failures(), 0);

    let failures = rig.sink.count(|e| {
        matches!(
            e,
            AppEvent::ConnectFailed {
                retry_in_ms: 5_000,
                ..
            }
        )
    });
    assert_eq!(failures, 2);
}

#[test]
fn every_attempt_registers_retained_offline_will() {
    let mut rig = Rig::new();
    let mut mqtt = SimMqttAdapter::new();
    mqtt.refuse_next(1);

    rig.tick(0, &mut mqtt);
    rig.tick(5_000, &mut mqtt);

    let status = Topics::default().status;
    for attempt in mqtt.attempts() {
        assert_eq!(attempt.will_topic, status.as_str());
        assert_eq!(attempt.will_payload, STATUS_OFFLINE);
        assert_eq!(attempt.will_qos, QoS::AtLeastOnce);
        assert!(attempt.will_retain);
        assert!(attempt.client_id.starts_with("ESP32Client-"));
    }
}

#[test]
fn pending_attempt_times_out() {
    let mut rig = Rig::new();
    let mut mqtt = SimMqttAdapter::new();
    mqtt.set_manual_ack(true);

    rig.tick(0, &mut mqtt);
    assert_eq!(rig.controller.connection_state(), ConnectionState::Connecting);

    rig.tick(4_999, &mut mqtt);
    assert_eq!(rig.controller.connection_state(), ConnectionState::Connecting);

    rig.tick(5_000, &mut mqtt);
    assert_eq!(rig.controller.connection_state(), ConnectionState::Disconnected);
    assert_eq!(rig.controller.session().next_attempt_at(), 10_000);
}

#[test]
fn acknowledged_attempt_completes_on_next_tick() {
    let mut rig = Rig::new();
    let mut mqtt = SimMqttAdapter::new();
    mqtt.set_manual_ack(true);

    rig.tick(0, &mut mqtt);
    mqtt.acknowledge();
    rig.tick(20, &mut mqtt);

    assert_eq!(rig.controller.connection_state(), ConnectionState::Connected);
    assert_eq!(mqtt.subscriptions().len(), 4);
}

#[test]
fn link_loss_reconnects_immediately() {
    let mut rig = Rig::new();
    let mut mqtt = SimMqttAdapter::new();

    rig.tick(0, &mut mqtt);
    mqtt.drop_link();
    rig.tick(3_000, &mut mqtt);

    assert_eq!(rig.sink.count(|e| *e == AppEvent::LinkLost), 1);
    assert_eq!(mqtt.attempts().len(), 2);
    assert_eq!(rig.controller.connection_state(), ConnectionState::Connected);
    assert_eq!(mqtt.subscriptions().len(), 4);
}

#[test]
fn subscribe_failure_abandons_session_and_retries() {
    let mut rig = Rig::new();
    let mut broker = SubscribeRefusingBroker::new(3);

    rig.tick(0, &mut broker);
    assert_eq!(rig.controller.connection_state(), ConnectionState::Disconnected);
    assert_eq!(broker.disconnects, 1);

    rig.tick(4_000, &mut broker);
    assert_eq!(broker.connects, 1);

    rig.tick(5_000, &mut broker);
    assert_eq!(broker.connects, 2);
}

#[test]
fn state_changes_follow_the_lifecycle() {
    let mut rig = Rig::new();
    let mut mqtt = SimMqttAdapter::new();

    rig.tick(0, &mut mqtt);

    let transitions: Vec<(ConnectionState, ConnectionState)> = rig
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::StateChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        transitions,
        vec![
            (ConnectionState::Disconnected, ConnectionState::Connecting),
            (ConnectionState::Connecting, ConnectionState::Connected),
        ]
    );
}
