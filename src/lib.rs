//! Laser PWM output library.
//!
//! Turns host spindle commands (on/off, direction, power in "rpm" units)
//! into PWM timer programming for a laser driver. Pure logic lives in
//! `control` and `drivers`; hardware is reached through the port traits
//! in `app::ports`.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod drivers;
pub mod error;

pub use error::{Error, Result};
