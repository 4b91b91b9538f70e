//! Laser output state machine (enable pin + PWM compare).
//!
//! Translates on/off/speed commands into enable-pin, compare-register and
//! master-output-enable writes, using the timing resolved by
//! [`pwm_curve`](crate::control::pwm_curve).
//!
//! ## States
//!
//! ```text
//!            value != off_value
//!   Idle ─────────────────────────▶ ActiveDuty
//!    ▲   (enable pin, then duty)        │
//!    └──────────────────────────────────┘
//!            value == off_value
//!   (duty/MOE first, always_on keeps off_value on the line)
//! ```
//!
//! ## Ordering
//!
//! Rising edge: the enable pin is asserted before the first non-zero duty
//! is written. Falling edge: the duty/output-enable change is visible
//! before anything else changes. The laser never sees a transient duty
//! with the enable pin in the wrong state.
//!
//! The backend port is passed in on every call; the controller only holds
//! the logical state.

use log::{debug, trace};

use crate::app::ports::LaserOutputPort;
use crate::control::pwm_curve::PwmDescriptor;
use crate::error::{Error, Result};

/// How the output is driven.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    /// No usable power range: the enable pin is the only signal.
    Fixed,
    /// Variable power with the given timing.
    Variable(PwmDescriptor),
}

/// Logical output state, owned by [`OutputController`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OutputState {
    /// Active duty is being driven (vs. idle/off).
    pub pwm_enabled: bool,
    /// Last programmed S value.
    pub commanded_rpm: f32,
    /// Last `set_state` on/off request.
    pub commanded_on: bool,
    /// Last `set_state` direction (always false without direction support).
    pub ccw: bool,
}

/// On/off + direction as reported to the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpindleState {
    pub on: bool,
    pub ccw: bool,
}

pub struct OutputController {
    mode: OutputMode,
    state: OutputState,
    invert_enable: bool,
    rpm_controlled_enable: bool,
    supports_direction: bool,
}

impl OutputController {
    pub fn new(supports_direction: bool) -> Self {
        Self {
            mode: OutputMode::Fixed,
            state: OutputState::default(),
            invert_enable: false,
            rpm_controlled_enable: false,
            supports_direction,
        }
    }

    /// Install a new mode. Active duty is dropped; callers stop the output
    /// first (see [`force_stop`](Self::force_stop)).
    pub fn reset(&mut self, mode: OutputMode, invert_enable: bool, rpm_controlled_enable: bool) {
        self.mode = mode;
        self.invert_enable = invert_enable;
        self.rpm_controlled_enable = rpm_controlled_enable;
        self.state.pwm_enabled = false;
    }

    pub fn mode(&self) -> &OutputMode {
        &self.mode
    }

    pub fn descriptor(&self) -> Option<&PwmDescriptor> {
        match &self.mode {
            OutputMode::Variable(d) => Some(d),
            OutputMode::Fixed => None,
        }
    }

    pub fn state(&self) -> OutputState {
        self.state
    }

    // ── Commands ──────────────────────────────────────────────

    /// Start or stop the laser.
    pub fn set_state(&mut self, hw: &mut impl LaserOutputPort, on: bool, ccw: bool, rpm: f32) {
        self.state.commanded_on = on;
        self.state.ccw = ccw && self.supports_direction;

        match self.mode {
            OutputMode::Fixed => {
                self.drive_enable(hw, on);
            }
            OutputMode::Variable(desc) if on => {
                if !self.rpm_controlled_enable {
                    self.drive_enable(hw, true);
                }
                self.update_speed(hw, desc.counter_for_rpm(rpm));
            }
            OutputMode::Variable(desc) => {
                self.update_speed(hw, desc.off_value);
                if !self.rpm_controlled_enable {
                    self.drive_enable(hw, false);
                }
            }
        }
        self.state.commanded_rpm = rpm;
        debug!("laser set_state on={} ccw={} S={}", on, self.state.ccw, rpm);
    }

    /// Re-program the power for the current on/off state.
    pub fn update_rpm(&mut self, hw: &mut impl LaserOutputPort, rpm: f32) {
        if let OutputMode::Variable(desc) = self.mode {
            let value = if self.state.commanded_on {
                desc.counter_for_rpm(rpm)
            } else {
                desc.off_value
            };
            self.update_speed(hw, value);
        }
        self.state.commanded_rpm = rpm;
    }

    /// Drive a raw compare value. Ignored in fixed mode.
    pub fn update_speed(&mut self, hw: &mut impl LaserOutputPort, value: u16) {
        let OutputMode::Variable(desc) = self.mode else {
            return;
        };

        if value == desc.off_value {
            self.state.pwm_enabled = false;
            if desc.always_on {
                hw.set_duty_register(desc.off_value);
                if hw.has_master_output_enable() {
                    hw.set_master_output_enable(true);
                }
            } else if hw.has_master_output_enable() {
                hw.set_master_output_enable(false);
            } else {
                hw.set_duty_register(0);
            }
            if self.rpm_controlled_enable {
                self.drive_enable(hw, false);
            }
        } else {
            if !self.state.pwm_enabled {
                self.drive_enable(hw, true);
                self.state.pwm_enabled = true;
            }
            hw.set_duty_register(value);
            if hw.has_master_output_enable() {
                hw.set_master_output_enable(true);
            }
        }
        trace!("laser duty={} active={}", value, self.state.pwm_enabled);
    }

    /// Stop an active output. Returns true if it was active.
    pub fn force_stop(&mut self, hw: &mut impl LaserOutputPort) -> bool {
        if !self.state.pwm_enabled {
            return false;
        }
        self.set_state(hw, false, false, 0.0);
        true
    }

    // ── Queries ───────────────────────────────────────────────

    /// Report on/off from the physical enable pin, falling back to the last
    /// command when the pin is not wired.
    pub fn get_state(&self, hw: &mut impl LaserOutputPort) -> SpindleState {
        let on = match self.enable_level(hw) {
            Ok(level) => level,
            Err(_) => self.state.commanded_on,
        };
        SpindleState {
            on,
            ccw: self.state.ccw,
        }
    }

    /// Compare value for `rpm`, without touching the output.
    pub fn get_pwm(&self, rpm: f32) -> Option<u16> {
        self.descriptor().map(|d| d.counter_for_rpm(rpm))
    }

    /// Logical (polarity-corrected) enable pin level.
    pub fn enable_level(&self, hw: &mut impl LaserOutputPort) -> Result<bool> {
        if !hw.has_enable_pin() {
            return Err(Error::BackendUnavailable);
        }
        Ok(hw.read_enable_pin() ^ self.invert_enable)
    }

    /// Drive the enable pin to the logical level `on`.
    pub fn drive_enable(&self, hw: &mut impl LaserOutputPort, on: bool) {
        if hw.has_enable_pin() {
            hw.set_enable_pin(on ^ self.invert_enable);
        }
    }
}
