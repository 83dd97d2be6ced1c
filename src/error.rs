//! Unified error types for the power display firmware.
//!
//! A single `Error` enum that every subsystem converts into, so `main`
//! handles startup failures uniformly.  All variants are `Copy`.
//!
//! Runtime faults (a refused broker, a failed strip write) never reach
//! this type: the session manager and controller log them and retry.

use core::fmt;

use crate::adapters::wifi::ConnectivityError;
use crate::app::ports::TransportError;
use crate::config::SettingsError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A communication subsystem failed.
    Comms(CommsError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(SettingsError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    Wifi(ConnectivityError),
    Mqtt(TransportError),
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wifi(e) => write!(f, "WiFi: {e}"),
            Self::Mqtt(e) => write!(f, "MQTT: {e}"),
        }
    }
}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

impl From<ConnectivityError> for Error {
    fn from(e: ConnectivityError) -> Self {
        Self::Comms(CommsError::Wifi(e))
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Comms(CommsError::Mqtt(e))
    }
}

impl From<SettingsError> for Error {
    fn from(e: SettingsError) -> Self {
        Self::Config(e)
    }
}

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
