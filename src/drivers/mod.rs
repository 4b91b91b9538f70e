//! Output drivers.

pub mod laser;
