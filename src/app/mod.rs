//! Application core: pure domain logic, zero I/O.
//!
//! [`service::LaserCore`] owns the configuration, the resolved PWM timing
//! and the output state machine. All interaction with hardware happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
