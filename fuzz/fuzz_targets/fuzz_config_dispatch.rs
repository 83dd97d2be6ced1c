//! Fuzz target: `SessionManager::dispatch`
//!
//! The first byte of each chunk picks a topic, the rest is the payload.
//! Whatever arrives, the display bounds stay ordered and brightness stays
//! inside its clamp.
//!
//! cargo fuzz run fuzz_config_dispatch

#![no_main]

use libfuzzer_sys::fuzz_target;
use powerdisplay::app::events::AppEvent;
use powerdisplay::app::ports::{EventSink, InboundMessage};
use powerdisplay::config::{DeviceSettings, DisplayConfig};
use powerdisplay::session::SessionManager;

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let settings = DeviceSettings::default();
    let session = SessionManager::new(&settings, 0);
    let topics = settings.topics.subscriptions();
    let mut config = DisplayConfig::default();

    for chunk in data.split(|b| *b == 0) {
        let Some((selector, payload)) = chunk.split_first() else {
            continue;
        };
        let topic = topics[usize::from(*selector) % topics.len()];
        if let Some(msg) = InboundMessage::new(topic, payload) {
            session.dispatch(&msg, &mut config, &mut Discard);
        }
        assert!(config.power_min < config.power_max);
        let clamp = settings.brightness_floor..=settings.brightness_ceiling;
        assert!(clamp.contains(&config.brightness));
    }
});
