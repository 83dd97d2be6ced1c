//! Mock hardware for integration tests.
//!
//! Records every pin level and application event so tests can assert on
//! the full history without touching real GPIO or a broker.  The strip
//! is the library's own `FrameRecorder`; MQTT is `SimMqttAdapter` unless a
//! test needs a broker that misbehaves in a specific way.

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, OutputPin};
use powerdisplay::adapters::pixels::FrameRecorder;
use powerdisplay::app::events::AppEvent;
use powerdisplay::app::ports::{
    EventSink, InboundMessage, MqttPort, QoS, SessionOptions, TransportError,
};
use powerdisplay::app::service::{Controller, Indicators};
use powerdisplay::config::DeviceSettings;
use powerdisplay::drivers::pulse_led::PulseLed;

// ── MockPin ───────────────────────────────────────────────────

/// Output pin whose level history is shared with the test.
#[derive(Clone, Default)]
pub struct MockPin {
    pub levels: Rc<RefCell<Vec<bool>>>,
}

#[allow(dead_code)]
impl MockPin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last driven level (`true` = HIGH).
    pub fn level(&self) -> Option<bool> {
        self.levels.borrow().last().copied()
    }

    /// Number of HIGH→LOW edges seen.
    pub fn falling_edges(&self) -> usize {
        self.levels
            .borrow()
            .windows(2)
            .filter(|w| w[0] && !w[1])
            .count()
    }
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.levels.borrow_mut().push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.levels.borrow_mut().push(true);
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── SubscribeRefusingBroker ───────────────────────────────────

/// Accepts every session but refuses the n-th subscribe of each one.
#[allow(dead_code)]
pub struct SubscribeRefusingBroker {
    pub refuse_at: usize,
    pub connected: bool,
    pub subscribes_this_session: usize,
    pub connects: u32,
    pub disconnects: u32,
}

#[allow(dead_code)]
impl SubscribeRefusingBroker {
    pub fn new(refuse_at: usize) -> Self {
        Self {
            refuse_at,
            connected: false,
            subscribes_this_session: 0,
            connects: 0,
            disconnects: 0,
        }
    }
}

impl MqttPort for SubscribeRefusingBroker {
    fn connect(&mut self, _options: &SessionOptions<'_>) -> Result<(), TransportError> {
        self.connects += 1;
        self.connected = true;
        self.subscribes_this_session = 0;
        Ok(())
    }

    fn disconnect(&mut self) {
        self.disconnects += 1;
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn subscribe(&mut self, _topic: &str, _qos: QoS) -> Result<(), TransportError> {
        self.subscribes_this_session += 1;
        if self.subscribes_this_session == self.refuse_at {
            return Err(TransportError::SubscribeFailed);
        }
        Ok(())
    }

    fn publish(&mut self, _: &str, _: &[u8], _: QoS, _: bool) -> Result<(), TransportError> {
        Ok(())
    }

    fn poll(&mut self) -> Option<InboundMessage> {
        None
    }
}

// ── Rig ───────────────────────────────────────────────────────

pub type MockIndicators = Indicators<FrameRecorder, MockPin>;

/// A started controller plus its mock outputs.  `pin` shares its level
/// history with the pin inside `io`.
pub struct Rig {
    pub controller: Controller,
    pub io: MockIndicators,
    pub pin: MockPin,
    pub sink: RecordingSink,
}

#[allow(dead_code)]
impl Rig {
    pub fn new() -> Self {
        Self::with_settings(&DeviceSettings::default())
    }

    pub fn with_settings(settings: &DeviceSettings) -> Self {
        let pin = MockPin::new();
        let mut io = Indicators::new(
            FrameRecorder::new(16),
            PulseLed::new(pin.clone(), settings.heartbeat_active_low),
        );
        let mut sink = RecordingSink::new();
        let mut controller = Controller::new(settings, 42);
        controller.start(&mut io, &mut sink);
        Self {
            controller,
            io,
            pin,
            sink,
        }
    }

    pub fn tick(&mut self, now_ms: u64, mqtt: &mut impl MqttPort) {
        self.controller
            .tick(now_ms, mqtt, &mut self.io, &mut self.sink);
    }
}
