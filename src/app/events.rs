//! Outbound laser events.
//!
//! [`LaserCore`](super::service::LaserCore) emits these through the
//! [`EventSink`](super::ports::EventSink) port on configuration changes.

use crate::error::Error;

use super::service::Capabilities;

/// Structured events emitted by the laser core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LaserEvent {
    /// Variable-power mode is active with freshly programmed timing.
    Configured {
        prescale: u32,
        period: u16,
        always_on: bool,
        capabilities: Capabilities,
    },

    /// Variable power is unavailable; the laser runs as a fixed on/off
    /// output. Carries the reason.
    FixedMode(Error),

    /// An active output was forced off before the timer was reprogrammed.
    ForcedStop,
}
