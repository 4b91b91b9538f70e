//! `embedded-hal` 1.0 output adapter.
//!
//! Drives the enable pin through [`StatefulOutputPin`] and the compare
//! register through [`SetDutyCycle`]. Timer-base programming (prescaler,
//! auto-reload, polarity, master output enable) has no `embedded-hal`
//! trait, so the board crate supplies it through [`TimerBase`].
//!
//! The PWM channel's `max_duty_cycle()` is expected to track the period
//! most recently handed to [`TimerBase::program`], so compare values are
//! raw counter ticks.

use embedded_hal::digital::{Error as _, PinState, StatefulOutputPin};
use embedded_hal::pwm::{Error as _, SetDutyCycle};
use log::warn;

use crate::app::ports::{LaserOutputPort, TimerProgram};

/// Board-specific timer base control.
pub trait TimerBase {
    /// Apply prescaler, auto-reload and output polarity. Called with the
    /// counter stopped.
    fn program(&mut self, program: TimerProgram);

    fn set_counter_enable(&mut self, on: bool);

    /// False for timers without a master output enable (break/dead-time)
    /// block.
    fn has_master_output_enable(&self) -> bool {
        true
    }

    fn set_master_output_enable(&mut self, on: bool);
}

pub struct HalOutput<EN, PWM, TB> {
    /// `None` when the board has no laser enable pin.
    enable: Option<EN>,
    pwm: PWM,
    timer: TB,
}

impl<EN, PWM, TB> HalOutput<EN, PWM, TB>
where
    EN: StatefulOutputPin,
    PWM: SetDutyCycle,
    TB: TimerBase,
{
    pub fn new(enable: Option<EN>, pwm: PWM, timer: TB) -> Self {
        Self { enable, pwm, timer }
    }

    /// Give the peripherals back.
    pub fn release(self) -> (Option<EN>, PWM, TB) {
        (self.enable, self.pwm, self.timer)
    }
}

impl<EN, PWM, TB> LaserOutputPort for HalOutput<EN, PWM, TB>
where
    EN: StatefulOutputPin,
    PWM: SetDutyCycle,
    TB: TimerBase,
{
    fn has_enable_pin(&self) -> bool {
        self.enable.is_some()
    }

    fn set_enable_pin(&mut self, high: bool) {
        if let Some(pin) = self.enable.as_mut() {
            if let Err(e) = pin.set_state(PinState::from(high)) {
                warn!("laser enable pin write failed: {:?}", e.kind());
            }
        }
    }

    fn read_enable_pin(&mut self) -> bool {
        let Some(pin) = self.enable.as_mut() else {
            return false;
        };
        match pin.is_set_high() {
            Ok(level) => level,
            Err(e) => {
                warn!("laser enable pin read failed: {:?}", e.kind());
                false
            }
        }
    }

    fn set_duty_register(&mut self, value: u16) {
        let value = value.min(self.pwm.max_duty_cycle());
        if let Err(e) = self.pwm.set_duty_cycle(value) {
            warn!("laser PWM duty write failed: {:?}", e.kind());
        }
    }

    fn has_master_output_enable(&self) -> bool {
        self.timer.has_master_output_enable()
    }

    fn set_master_output_enable(&mut self, on: bool) {
        self.timer.set_master_output_enable(on);
    }

    fn set_counter_enable(&mut self, on: bool) {
        self.timer.set_counter_enable(on);
    }

    fn program_timer_base(&mut self, program: TimerProgram) {
        self.timer.program(program);
    }
}
