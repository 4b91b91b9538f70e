//! Laser configuration parameters
//!
//! The settings blob the host's settings subsystem hands us on every
//! "settings changed" notification, plus the host-wide spindle flags and
//! the construction-time feature set of the board variant.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::{ConfigError, SettingsStore};

/// Invert mask for the laser signals.
///
/// Bit 0 inverts the enable output, bit 1 inverts the PWM output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvertFlags(u8);

impl InvertFlags {
    pub const ENABLE: u8 = 0b0000_0001;
    pub const PWM: u8 = 0b0000_0010;

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & (Self::ENABLE | Self::PWM))
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn enable(self) -> bool {
        self.0 & Self::ENABLE != 0
    }

    pub const fn pwm(self) -> bool {
        self.0 & Self::PWM != 0
    }

    pub fn set_enable(&mut self, on: bool) {
        self.set(Self::ENABLE, on);
    }

    pub fn set_pwm(&mut self, on: bool) {
        self.set(Self::PWM, on);
    }

    fn set(&mut self, mask: u8, on: bool) {
        if on {
            self.0 |= mask;
        } else {
            self.0 &= !mask;
        }
    }
}

/// Laser PWM settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaserConfig {
    /// Maximum S word power.
    pub rpm_max: f32,
    /// Minimum S word power.
    pub rpm_min: f32,
    /// PWM frequency in Hz.
    pub pwm_freq_hz: f32,
    /// Duty (0-100%) driven while the laser is "off". Non-zero means always-on.
    pub off_percent: f32,
    /// Duty (0-100%) at `rpm_min`.
    pub min_percent: f32,
    /// Duty (0-100%) at `rpm_max`.
    pub max_percent: f32,
    /// Laser offset from the spindle, X axis (mm).
    pub x_offset_mm: f32,
    /// Laser offset from the spindle, Y axis (mm).
    pub y_offset_mm: f32,
    pub invert: InvertFlags,
}

impl Default for LaserConfig {
    fn default() -> Self {
        Self {
            rpm_max: 255.0,
            rpm_min: 0.0,
            pwm_freq_hz: 1000.0,
            off_percent: 0.0,
            min_percent: 0.0,
            max_percent: 100.0,
            x_offset_mm: 0.0,
            y_offset_mm: 0.0,
            invert: InvertFlags::default(),
        }
    }
}

const MAX_OFFSET_MM: f32 = 1000.0;

impl LaserConfig {
    /// Range-check every field.
    ///
    /// `rpm_max <= rpm_min` is accepted: it selects fixed on/off mode
    /// rather than being a configuration error.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            self.rpm_max,
            self.rpm_min,
            self.pwm_freq_hz,
            self.off_percent,
            self.min_percent,
            self.max_percent,
            self.x_offset_mm,
            self.y_offset_mm,
        ];
        if fields.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::ValidationFailed("all values must be finite"));
        }
        if self.pwm_freq_hz <= 0.0 {
            return Err(ConfigError::ValidationFailed("pwm_freq_hz must be > 0"));
        }
        if self.rpm_min < 0.0 {
            return Err(ConfigError::ValidationFailed("rpm_min must be >= 0"));
        }
        for pct in [self.off_percent, self.min_percent, self.max_percent] {
            if !(0.0..=100.0).contains(&pct) {
                return Err(ConfigError::ValidationFailed(
                    "PWM off/min/max values must be 0-100 percent",
                ));
            }
        }
        if self.min_percent > self.max_percent {
            return Err(ConfigError::ValidationFailed(
                "min_percent must be <= max_percent",
            ));
        }
        for offset in [self.x_offset_mm, self.y_offset_mm] {
            if !(-MAX_OFFSET_MM..=MAX_OFFSET_MM).contains(&offset) {
                return Err(ConfigError::ValidationFailed(
                    "laser offsets must be -1000 to 1000 mm",
                ));
            }
        }
        Ok(())
    }

    /// True when the rpm range supports variable power.
    pub fn has_power_range(&self) -> bool {
        self.rpm_max > self.rpm_min
    }
}

/// Host-wide spindle flags that change how the laser output behaves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostSpindleFlags {
    /// The PWM level alone signals "off"; `set_state` leaves the enable pin
    /// alone and speed transitions drive it instead.
    pub enable_rpm_controlled: bool,
    /// Variable power is disabled host-wide; run as a fixed on/off output.
    pub pwm_disable: bool,
}

/// One-shot pulse timer limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseConfig {
    /// Longest pulse the pulse timer accepts, in timer ticks.
    pub max_length: u16,
}

/// Optional behaviours of the board variant, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaserFeatures {
    pub supports_direction: bool,
    pub supports_rpm_readback: bool,
    pub pulse_mode: Option<PulseConfig>,
}

impl Default for LaserFeatures {
    fn default() -> Self {
        Self {
            supports_direction: true,
            supports_rpm_readback: false,
            pulse_mode: None,
        }
    }
}

/// Load settings, restoring and persisting the defaults if the stored blob
/// is missing, corrupt, or fails validation.
pub fn load_or_restore(store: &impl SettingsStore) -> LaserConfig {
    match store.load() {
        Ok(cfg) => match cfg.validate() {
            Ok(()) => return cfg,
            Err(e) => warn!("Laser settings invalid ({}), restoring defaults", e),
        },
        Err(e) => warn!("Laser settings load failed ({}), restoring defaults", e),
    }

    let defaults = LaserConfig::default();
    match store.save(&defaults) {
        Ok(()) => info!("Laser settings restored to defaults"),
        Err(e) => warn!("Laser default settings could not be saved: {}", e),
    }
    defaults
}
