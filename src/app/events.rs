//! Outbound application events.
//!
//! The session manager and controller emit these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them (serial log, test recorder).

use crate::config::DisplayConfig;
use crate::session::ConnectionState;

/// Which configuration field an inbound message targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigField {
    Power,
    PowerMax,
    PowerMin,
    Brightness,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The controller has started (carries the initial display config).
    Started(DisplayConfig),

    /// The session state machine moved.
    StateChanged {
        from: ConnectionState,
        to: ConnectionState,
    },

    /// A connection attempt was started with this client id.
    ConnectAttempt { attempt: u32, client_id: heapless::String<32> },

    /// A connection attempt failed; the next one is due after `retry_in_ms`.
    ConnectFailed { attempt: u32, retry_in_ms: u32 },

    /// An established session dropped.
    LinkLost,

    /// An inbound message changed the display configuration.
    ConfigUpdated { field: ConfigField, config: DisplayConfig },

    /// An inbound bound update was refused (would break min < max).
    ConfigRejected { field: ConfigField, value: i32 },

    /// An `ONLINE` status was published.
    Heartbeat { count: u32 },
}
