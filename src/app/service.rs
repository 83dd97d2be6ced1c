//! Control loop, the hexagonal core.
//!
//! [`Controller`] owns the session manager and the live display
//! configuration.  All I/O flows through ports injected at call sites,
//! making the whole loop testable with mock adapters.
//!
//! ```text
//!  MqttPort ──▶ ┌──────────────────────────┐ ──▶ SmartLedsWrite (strip)
//!               │        Controller         │ ──▶ OutputPin (heartbeat)
//!               │ Session · Decode · Render │ ──▶ EventSink
//!               └──────────────────────────┘
//! ```

use core::fmt::Debug;

use embedded_hal::digital::OutputPin;
use log::{info, warn};
use smart_leds::{RGB8, SmartLedsWrite};

use crate::config::{DeviceSettings, DisplayConfig};
use crate::drivers::pulse_led::PulseLed;
use crate::render::{IndicatorColour, render_config};
use crate::session::{ConnectionState, SessionManager};

use super::events::AppEvent;
use super::ports::{EventSink, MqttPort};

// ───────────────────────────────────────────────────────────────
// Indicator outputs
// ───────────────────────────────────────────────────────────────

/// The two visual outputs: the addressable strip and the heartbeat LED.
pub struct Indicators<S, P> {
    pub strip: S,
    pub pulse: PulseLed<P>,
}

impl<S, P> Indicators<S, P>
where
    S: SmartLedsWrite<Color = RGB8>,
    S::Error: Debug,
    P: OutputPin,
{
    pub fn new(strip: S, pulse: PulseLed<P>) -> Self {
        Self { strip, pulse }
    }

    /// Push the same colour to all `count` elements.
    fn show(&mut self, colour: IndicatorColour, count: u8) {
        let rgb = colour.to_rgb();
        if let Err(e) = self
            .strip
            .write(core::iter::repeat_n(rgb, usize::from(count)))
        {
            warn!("Strip write failed: {:?}", e);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Controller
// ───────────────────────────────────────────────────────────────

pub struct Controller {
    session: SessionManager,
    config: DisplayConfig,
    hue_max: u8,
    element_count: u8,
    iterations: u64,
    last_colour: IndicatorColour,
}

impl Controller {
    /// `seed` feeds the session client-id generator.
    pub fn new(settings: &DeviceSettings, seed: u64) -> Self {
        Self {
            session: SessionManager::new(settings, seed),
            config: DisplayConfig::default(),
            hue_max: settings.hue_max,
            element_count: settings.element_count,
            iterations: 0,
            last_colour: IndicatorColour::OFF,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Blank the strip, switch the heartbeat LED off, announce startup.
    pub fn start<S, P>(&mut self, io: &mut Indicators<S, P>, sink: &mut impl EventSink)
    where
        S: SmartLedsWrite<Color = RGB8>,
        S::Error: Debug,
        P: OutputPin,
    {
        io.show(IndicatorColour::OFF, self.element_count);
        io.pulse.off();
        sink.emit(&AppEvent::Started(self.config));
        info!(
            "Controller started: {} elements, bounds [{}, {}]W",
            self.element_count, self.config.power_min, self.config.power_max
        );
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// Run one loop iteration and return the colour that was shown.
    ///
    /// 1. Service the session (non-blocking connect / reconnect).
    /// 2. Apply every pending inbound message.
    /// 3. Keep-alive expiry → `ONLINE` publish, heartbeat LED on.
    /// 4. Render and push the frame (every iteration).
    /// 5. Pulse expiry → heartbeat LED off.
    pub fn tick<S, P>(
        &mut self,
        now_ms: u64,
        mqtt: &mut impl MqttPort,
        io: &mut Indicators<S, P>,
        sink: &mut impl EventSink,
    ) -> IndicatorColour
    where
        S: SmartLedsWrite<Color = RGB8>,
        S::Error: Debug,
        P: OutputPin,
    {
        self.iterations = self.iterations.wrapping_add(1);

        // 1. Session
        self.session.tick(now_ms, mqtt, sink);

        // 2. Inbound configuration
        while let Some(msg) = mqtt.poll() {
            self.session.dispatch(&msg, &mut self.config, sink);
        }

        // 3. Liveness
        if self.session.service_keep_alive(now_ms, mqtt, sink) {
            io.pulse.on();
        }

        // 4. Render
        let colour = render_config(&self.config, self.hue_max, now_ms);
        io.show(colour, self.element_count);
        self.last_colour = colour;

        // 5. Heartbeat pulse off
        if self.session.pulse_expired(now_ms) {
            io.pulse.off();
        }

        colour
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.session.state()
    }

    /// Loop iterations since startup.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn last_colour(&self) -> IndicatorColour {
        self.last_colour
    }
}
