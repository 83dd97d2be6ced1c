//! Power Display Firmware: Main Entry Point
//!
//! Hexagonal architecture with a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  EspMqttAdapter   Ws2811Rmt        PulseLed      Esp32Time     │
//! │  (MqttPort)       (SmartLedsWrite) (OutputPin)   (loop clock)  │
//! │  WifiAdapter      LogEventSink                                 │
//! │  (bring-up)       (EventSink)                                  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              Controller (pure logic)                   │    │
//! │  │  Session · Decode · Render                             │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{AnyOutputPin, PinDriver};
use esp_idf_hal::prelude::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::log::EspLogger;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::info;

use powerdisplay::adapters::device_id;
use powerdisplay::adapters::log_sink::LogEventSink;
use powerdisplay::adapters::mqtt::{EspMqttAdapter, Inbox};
use powerdisplay::adapters::pixels::{ColourOrder, Ws2811Rmt};
use powerdisplay::adapters::time::Esp32TimeAdapter;
use powerdisplay::adapters::wifi::{WifiAdapter, WifiCredentials};
use powerdisplay::app::service::{Controller, Indicators};
use powerdisplay::config::{DeviceSettings, ShortString};
use powerdisplay::drivers::pulse_led::PulseLed;
use powerdisplay::error::Error;
use powerdisplay::pins;

/// Messages handed over from the MQTT task.
static INBOX: Inbox = Inbox::new();

/// Delay between WiFi association attempts.
const WIFI_RETRY_MS: u32 = 500;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    EspLogger::initialize_default();

    info!("╔══════════════════════════════════════╗");
    info!("║  Power Display v{}                ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let mac = device_id::read_mac();
    info!("Device: {}", device_id::device_id(&mac));

    // ── 2. Settings ───────────────────────────────────────────
    let mut settings = DeviceSettings::default();
    settings.broker_host =
        ShortString::try_from(env!("MQTT_BROKER")).map_err(|()| Error::Init("MQTT_BROKER too long"))?;
    settings.validate().map_err(Error::from)?;

    // ── 3. Peripherals ────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sys_loop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // The strip is cleared by the controller on start; the spare onboard
    // LED just needs to be dark.
    let mut aux_led = PinDriver::output(unsafe { AnyOutputPin::new(pins::AUX_LED_GPIO) })?;
    aux_led.set_high()?;

    let strip = Ws2811Rmt::new(
        peripherals.rmt.channel0,
        unsafe { AnyOutputPin::new(settings.strip_data_gpio) },
        ColourOrder::Rgb,
    )?;
    let heartbeat = PinDriver::output(unsafe { AnyOutputPin::new(settings.heartbeat_led_gpio) })?;
    let mut io = Indicators::new(strip, PulseLed::new(heartbeat, settings.heartbeat_active_low));

    let mut sink = LogEventSink::new();
    let mut controller = Controller::new(&settings, device_id::rng_seed(&mac));
    controller.start(&mut io, &mut sink);

    // ── 4. Network ────────────────────────────────────────────
    // `wifi` must outlive the loop; dropping it stops the driver.
    let creds = WifiCredentials::new(env!("WIFI_SSID"), env!("WIFI_PASSWORD")).map_err(Error::from)?;
    let mut wifi = WifiAdapter::new(peripherals.modem, sys_loop, nvs)?;
    wifi.bring_up(&creds, WIFI_RETRY_MS, FreeRtos::delay_ms)
        .map_err(Error::from)?;

    let mut mqtt = EspMqttAdapter::new(settings.broker_url(), &INBOX);
    let clock = Esp32TimeAdapter::new();

    // ── 5. Control loop ───────────────────────────────────────
    info!("Entering control loop");
    loop {
        controller.tick(clock.uptime_ms(), &mut mqtt, &mut io, &mut sink);
        FreeRtos::delay_ms(1);
    }
}
