//! Test doubles shared by the integration tests.
//!
//! The timer/pin side uses the crate's own `SimOutput`; this module adds
//! an event sink that records everything the core emits.

use laserpwm::adapters::sim::{OutputWrite, SimOutput};
use laserpwm::app::events::LaserEvent;
use laserpwm::app::ports::EventSink;

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<LaserEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn last(&self) -> Option<&LaserEvent> {
        self.events.last()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &LaserEvent) {
        self.events.push(*event);
    }
}

// ── Helpers ───────────────────────────────────────────────────

/// Snapshot of the sim write history.
pub fn writes(hw: &SimOutput) -> Vec<OutputWrite> {
    hw.history().iter().copied().collect()
}
