//! Unified error types for the laser power-control core.
//!
//! A single `Error` enum that every fallible operation funnels into. All
//! variants are `Copy` so they can be carried inside [`LaserEvent`]s and
//! returned from the configuration path without allocation.
//!
//! [`LaserEvent`]: crate::app::events::LaserEvent

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// `rpm_max <= rpm_min`: there is no variable-power range. The caller
    /// falls back to fixed on/off mode instead of aborting.
    InvalidRange,
    /// The prescale search ran past what the timer's prescaler register can
    /// hold, or the requested frequency is above the timer clock.
    PeriodUnreachable,
    /// The signal is not wired on this board variant (enable pin, pulse
    /// timer).
    BackendUnavailable,
    /// A configuration value failed validation.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRange => write!(f, "rpm_max must be greater than rpm_min"),
            Self::PeriodUnreachable => write!(f, "PWM period does not fit the timer"),
            Self::BackendUnavailable => write!(f, "output not available on this board"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl From<crate::app::ports::ConfigError> for Error {
    fn from(e: crate::app::ports::ConfigError) -> Self {
        match e {
            crate::app::ports::ConfigError::ValidationFailed(msg) => Self::Config(msg),
            _ => Self::Config("settings unavailable"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
