//! Application core: pure domain logic, zero I/O.
//!
//! The control loop, its events, and the port traits it is driven
//! through.  Hardware and network access happen only via the traits in
//! [`ports`], keeping this layer fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
