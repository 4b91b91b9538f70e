//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing laser events to the `log` facade
//! (UART / USB-CDC in production, the test logger on host).

use log::{info, warn};

use crate::app::events::LaserEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`LaserEvent`].
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &LaserEvent) {
        match event {
            LaserEvent::Configured {
                prescale,
                period,
                always_on,
                capabilities,
            } => {
                info!(
                    "LASER | variable | prescale={} period={} always_on={} pulse={}",
                    prescale, period, always_on, capabilities.pulse
                );
            }
            LaserEvent::FixedMode(reason) => {
                warn!("LASER | fixed on/off | {}", reason);
            }
            LaserEvent::ForcedStop => {
                info!("LASER | output forced off for reconfiguration");
            }
        }
    }
}
