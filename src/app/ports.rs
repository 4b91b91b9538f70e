//! Port traits: the boundary between the laser core and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ LaserCore (domain)
//! ```
//!
//! The timer/pin backend, the pulse timer, the settings store and the
//! event reporting side all implement these traits. The
//! [`LaserCore`](super::service::LaserCore) takes them as parameters at
//! each call, so the domain core never touches registers directly.

use crate::config::LaserConfig;

// ───────────────────────────────────────────────────────────────
// Output port (driven adapter: domain → timer + enable pin)
// ───────────────────────────────────────────────────────────────

/// Timer base settings handed to [`LaserOutputPort::program_timer_base`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerProgram {
    /// Clock divisor (the adapter writes `prescale - 1` where the
    /// hardware wants it).
    pub prescale: u32,
    /// Counter ticks per PWM cycle.
    pub period: u16,
    /// Compare output polarity (and idle state) inverted.
    pub polarity_inverted: bool,
}

/// Write-side port for the laser's enable pin and PWM timer.
///
/// Writes are plain register/pin operations and cannot fail at this
/// level; adapters log driver errors themselves.
pub trait LaserOutputPort {
    /// False when the enable pin is not wired on this board variant. All
    /// enable-pin operations are then skipped by the core.
    fn has_enable_pin(&self) -> bool;

    /// Drive the physical enable pin level (polarity already applied).
    fn set_enable_pin(&mut self, high: bool);

    /// Read back the physical enable pin level.
    fn read_enable_pin(&mut self) -> bool;

    /// Write the PWM compare register.
    fn set_duty_register(&mut self, value: u16);

    /// False when the timer has no master output enable bit. The core then
    /// idles the line by writing a zero compare value instead.
    fn has_master_output_enable(&self) -> bool {
        true
    }

    /// Gate the compare output onto the pin.
    fn set_master_output_enable(&mut self, on: bool);

    /// Start or stop the timer counter.
    fn set_counter_enable(&mut self, on: bool);

    /// Reprogram prescaler, auto-reload and output polarity. Called with the
    /// counter stopped.
    fn program_timer_base(&mut self, program: TimerProgram);
}

/// One-shot pulse timer for pulsed laser firing.
pub trait PulseOutputPort {
    /// Load `length` ticks into the pulse timer and start it.
    fn start_pulse(&mut self, length: u16);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The core emits [`LaserEvent`](super::events::LaserEvent)s through this
/// port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::LaserEvent);
}

// ───────────────────────────────────────────────────────────────
// Settings port (driven adapter: domain ↔ persistent settings)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the laser settings blob.
///
/// Implementations MUST validate values before persisting; invalid ranges
/// are rejected with [`ConfigError::ValidationFailed`], not clamped.
pub trait SettingsStore {
    /// Load settings from persistent storage.
    fn load(&self) -> Result<LaserConfig, ConfigError>;

    /// Validate and persist settings.
    fn save(&self, config: &LaserConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`SettingsStore`] operations and config validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No settings found in storage (first boot).
    NotFound,
    /// Stored blob failed deserialization.
    Corrupted,
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "settings not found"),
            Self::Corrupted => write!(f, "settings corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
