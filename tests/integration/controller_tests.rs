//! Controller pipeline: inbound message → display config → rendered
//! frame, plus the heartbeat publish and LED pulse.

use powerdisplay::adapters::mqtt::SimMqttAdapter;
use powerdisplay::app::events::{AppEvent, ConfigField};
use powerdisplay::app::ports::QoS;
use powerdisplay::config::{DeviceSettings, Topics};
use powerdisplay::render::IndicatorColour;
use powerdisplay::session::STATUS_ONLINE;
use smart_leds::RGB8;

use crate::mock_hw::Rig;

fn connected_rig() -> (Rig, SimMqttAdapter) {
    let mut rig = Rig::new();
    let mut mqtt = SimMqttAdapter::new();
    rig.tick(0, &mut mqtt);
    assert!(rig.controller.session().is_connected());
    (rig, mqtt)
}

#[test]
fn start_blanks_strip_and_heartbeat_led() {
    let rig = Rig::new();
    assert_eq!(rig.io.strip.last_frame().unwrap(), &[RGB8::default(); 3]);
    // Active-low: HIGH is off.
    assert_eq!(rig.pin.level(), Some(true));
    assert!(matches!(rig.sink.events.first(), Some(AppEvent::Started(_))));
}

#[test]
fn power_reading_sets_hue_end_to_end() {
    let (mut rig, mut mqtt) = connected_rig();
    assert!(mqtt.inject(Topics::default().power.as_str(), b"600"));

    rig.tick(1_000, &mut mqtt);

    assert_eq!(rig.controller.config().current_power, 600);
    let colour = rig.controller.last_colour();
    assert_eq!(
        colour,
        IndicatorColour {
            hue: 80,
            saturation: 255,
            intensity: 253,
        }
    );
    assert_eq!(rig.io.strip.last_frame().unwrap(), &[colour.to_rgb(); 3]);
}

#[test]
fn brightness_scales_intensity() {
    let (mut rig, mut mqtt) = connected_rig();
    mqtt.inject(Topics::default().brightness.as_str(), b"0.5");

    rig.tick(1_000, &mut mqtt);

    assert_eq!(rig.controller.last_colour().intensity, 126);
}

#[test]
fn bounds_updates_move_the_scale() {
    let (mut rig, mut mqtt) = connected_rig();
    let topics = Topics::default();
    mqtt.inject(topics.max_power.as_str(), b"3000");
    mqtt.inject(topics.min_power.as_str(), b"1000");
    mqtt.inject(topics.power.as_str(), b"1000");

    rig.tick(1_000, &mut mqtt);

    let cfg = rig.controller.config();
    assert_eq!((cfg.power_min, cfg.power_max), (1_000, 3_000));
    assert_eq!(rig.controller.last_colour().hue, 160);
}

#[test]
fn inverted_bound_is_rejected() {
    let (mut rig, mut mqtt) = connected_rig();
    mqtt.inject(Topics::default().min_power.as_str(), b"1500");

    rig.tick(500, &mut mqtt);

    assert_eq!(rig.controller.config().power_min, 200);
    assert_eq!(
        rig.sink.count(|e| matches!(
            e,
            AppEvent::ConfigRejected {
                field: ConfigField::PowerMin,
                value: 1500,
            }
        )),
        1
    );
}

#[test]
fn heartbeat_publishes_once_and_pulses_led() {
    let (mut rig, mut mqtt) = connected_rig();

    let mut t = 50;
    while t <= 10_200 {
        rig.tick(t, &mut mqtt);
        if t == 10_000 || t == 10_050 {
            assert_eq!(rig.pin.level(), Some(false), "LED lit at {t}ms");
        }
        t += 50;
    }

    let published = mqtt.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].topic, Topics::default().status.as_str());
    assert_eq!(published[0].payload, STATUS_ONLINE);
    assert_eq!(published[0].qos, QoS::AtMostOnce);
    assert!(!published[0].retain);

    assert_eq!(rig.pin.falling_edges(), 1);
    assert_eq!(rig.pin.level(), Some(true));
    assert_eq!(rig.controller.session().heartbeats_sent(), 1);
}

#[test]
fn no_heartbeat_while_disconnected() {
    let mut rig = Rig::new();
    let mut mqtt = SimMqttAdapter::new();
    mqtt.refuse_next(u32::MAX);

    for t in (0..=30_000).step_by(100) {
        rig.tick(t, &mut mqtt);
    }

    assert!(mqtt.published().is_empty());
    assert_eq!(rig.pin.falling_edges(), 0);
    // Rendering never stops.
    assert!(rig.controller.last_colour().intensity >= 70);
}

#[test]
fn every_tick_writes_a_full_frame() {
    let mut settings = DeviceSettings::default();
    settings.element_count = 5;
    let mut rig = Rig::with_settings(&settings);
    let mut mqtt = SimMqttAdapter::new();

    for t in 0..10 {
        rig.tick(t * 10, &mut mqtt);
    }

    // One blanking frame at start plus one per iteration.
    assert_eq!(rig.io.strip.frames_written(), 11);
    assert_eq!(rig.io.strip.last_frame().unwrap().len(), 5);
    assert_eq!(rig.controller.iterations(), 10);
}
