//! Laser service: the hexagonal core.
//!
//! [`LaserCore`] owns the settings, the resolved PWM timing and the output
//! state machine. It is constructed once and threaded through every call;
//! there is no process-wide state. Hardware is reached only through the
//! port traits passed in at each call site.
//!
//! ```text
//!  settings changed ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                       │       LaserCore         │
//!  spindle commands ──▶ │  PwmCurve · Controller  │ ──▶ LaserOutputPort
//!                       └────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::{HostSpindleFlags, LaserConfig, LaserFeatures};
use crate::control::pwm_curve::{self, PwmDescriptor};
use crate::drivers::laser::{OutputController, OutputMode, OutputState, SpindleState};
use crate::error::{Error, Result};

use super::events::LaserEvent;
use super::ports::{EventSink, LaserOutputPort, PulseOutputPort};

/// What the laser output can do under the current configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Variable power (PWM) is available.
    pub variable: bool,
    pub laser: bool,
    pub pwm_invert: bool,
    pub direction: bool,
    /// The host may not override the rpm range.
    pub rpm_range_locked: bool,
    pub pulse: bool,
}

/// Programmed vs. configured power, for host read-back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpindleData {
    pub rpm_low_limit: f32,
    pub rpm_high_limit: f32,
    pub rpm_programmed: f32,
    pub state: SpindleState,
}

// ───────────────────────────────────────────────────────────────
// LaserCore
// ───────────────────────────────────────────────────────────────

pub struct LaserCore {
    config: LaserConfig,
    host: HostSpindleFlags,
    features: LaserFeatures,
    output: OutputController,
    capabilities: Capabilities,
}

impl LaserCore {
    /// Construct the core from settings.
    ///
    /// Starts in fixed on/off mode. Call [`configure`](Self::configure)
    /// once the timer clock is known.
    pub fn new(config: LaserConfig, features: LaserFeatures) -> Self {
        let capabilities = Capabilities {
            variable: false,
            laser: true,
            pwm_invert: true,
            direction: features.supports_direction,
            rpm_range_locked: true,
            pulse: features.pulse_mode.is_some(),
        };
        Self {
            config,
            host: HostSpindleFlags::default(),
            features,
            output: OutputController::new(features.supports_direction),
            capabilities,
        }
    }

    // ── Configuration ─────────────────────────────────────────

    /// Apply new settings from the host and reconfigure.
    ///
    /// Invalid settings are rejected and the previous configuration stays
    /// in effect.
    pub fn on_settings_changed(
        &mut self,
        hw: &mut impl LaserOutputPort,
        config: LaserConfig,
        host: HostSpindleFlags,
        clock_hz: u32,
        sink: &mut impl EventSink,
    ) -> Result<Capabilities> {
        if let Err(e) = config.validate() {
            warn!("Laser settings rejected: {}", e);
            return Err(e.into());
        }
        self.config = config;
        self.host = host;
        Ok(self.configure(hw, clock_hz, sink))
    }

    /// Resolve PWM timing for a timer fed by `clock_hz` and program it.
    ///
    /// Falls back to fixed on/off mode when variable power is disabled or
    /// the timing cannot be resolved; never leaves the laser unconfigured.
    /// The fallback stops the PWM timer, so no idle duty stays on the line.
    pub fn configure(
        &mut self,
        hw: &mut impl LaserOutputPort,
        clock_hz: u32,
        sink: &mut impl EventSink,
    ) -> Capabilities {
        let resolved = if self.host.pwm_disable {
            Err(Error::Config("PWM disabled by host"))
        } else {
            pwm_curve::compute(clock_hz, &self.config)
        };

        if self.output.force_stop(hw) {
            sink.emit(&LaserEvent::ForcedStop);
        }

        match resolved {
            Ok(desc) => {
                critical_section::with(|_| {
                    hw.set_counter_enable(false);
                    hw.program_timer_base(desc.timer_program());
                    hw.set_duty_register(0);
                    hw.set_counter_enable(true);
                });
                self.reset_output(OutputMode::Variable(desc));
                self.capabilities.variable = true;
                info!(
                    "Laser PWM: {} Hz, prescale={} period={} off={} min={} max={}",
                    self.config.pwm_freq_hz,
                    desc.prescale,
                    desc.period,
                    desc.off_value,
                    desc.min_value,
                    desc.max_value
                );
                sink.emit(&LaserEvent::Configured {
                    prescale: desc.prescale,
                    period: desc.period,
                    always_on: desc.always_on,
                    capabilities: self.capabilities,
                });
            }
            Err(reason) => {
                // An always-on idle duty is not covered by force_stop.
                critical_section::with(|_| {
                    if hw.has_master_output_enable() {
                        hw.set_master_output_enable(false);
                    }
                    hw.set_duty_register(0);
                    hw.set_counter_enable(false);
                });
                self.reset_output(OutputMode::Fixed);
                self.capabilities.variable = false;
                warn!("Laser PWM unavailable ({}), using fixed on/off output", reason);
                sink.emit(&LaserEvent::FixedMode(reason));
            }
        }

        self.capabilities
    }

    fn reset_output(&mut self, mode: OutputMode) {
        self.output.reset(
            mode,
            self.config.invert.enable(),
            self.host.enable_rpm_controlled,
        );
    }

    // ── Commands ──────────────────────────────────────────────

    /// Start or stop the laser at power `rpm`.
    pub fn set_state(&mut self, hw: &mut impl LaserOutputPort, on: bool, ccw: bool, rpm: f32) {
        self.output.set_state(hw, on, ccw, rpm);
    }

    /// Change power without changing on/off state.
    pub fn update_rpm(&mut self, hw: &mut impl LaserOutputPort, rpm: f32) {
        self.output.update_rpm(hw, rpm);
    }

    /// Drive a precomputed compare value (from [`get_pwm`](Self::get_pwm)).
    pub fn update_pwm(&mut self, hw: &mut impl LaserOutputPort, value: u16) {
        self.output.update_speed(hw, value);
    }

    /// Fire a single laser pulse of `length` pulse-timer ticks.
    pub fn pulse_on<H>(&mut self, hw: &mut H, length: u16) -> Result<()>
    where
        H: LaserOutputPort + PulseOutputPort,
    {
        let Some(pulse) = self.features.pulse_mode else {
            return Err(Error::BackendUnavailable);
        };
        hw.start_pulse(length.min(pulse.max_length));
        self.output.drive_enable(hw, true);
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn get_state(&self, hw: &mut impl LaserOutputPort) -> SpindleState {
        self.output.get_state(hw)
    }

    /// Compare value for `rpm`; `None` in fixed on/off mode.
    pub fn get_pwm(&self, rpm: f32) -> Option<u16> {
        self.output.get_pwm(rpm)
    }

    /// Programmed power read-back, when the board supports it.
    pub fn spindle_data(&self, hw: &mut impl LaserOutputPort) -> Option<SpindleData> {
        if !self.features.supports_rpm_readback {
            return None;
        }
        Some(SpindleData {
            rpm_low_limit: self.config.rpm_min,
            rpm_high_limit: self.config.rpm_max,
            rpm_programmed: self.output.state().commanded_rpm,
            state: self.get_state(hw),
        })
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn config(&self) -> &LaserConfig {
        &self.config
    }

    pub fn descriptor(&self) -> Option<&PwmDescriptor> {
        self.output.descriptor()
    }

    pub fn output_state(&self) -> OutputState {
        self.output.state()
    }
}
