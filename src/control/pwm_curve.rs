//! PWM curve: timer prescale/period resolution and speed-to-duty mapping.
//!
//! Turns an input clock and a [`LaserConfig`] into a [`PwmDescriptor`]:
//! the counter period that realises the requested PWM frequency within a
//! 16-bit counter, the off/min/max compare thresholds, and the duty
//! gradient used to map a commanded S value onto a compare value.
//!
//! Pure computation. Programming the timer with the result is the
//! caller's job.

use crate::app::ports::TimerProgram;
use crate::config::LaserConfig;
use crate::error::{Error, Result};

/// Largest period the 16-bit counter accepts (the auto-reload register
/// holds `period - 1`, and 65535 is kept free).
pub const MAX_PERIOD: u32 = 65_534;

/// Largest prescale factor: the 16-bit prescaler register holds
/// `prescale - 1`.
pub const MAX_PRESCALE: u32 = 65_536;

/// Fully resolved timer timing, rebuilt from scratch on every
/// configuration change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PwmDescriptor {
    /// Counter ticks per PWM cycle.
    pub period: u16,
    /// Compare value driven while "off". Polarity-adjusted.
    ///
    /// `min_value`/`max_value` are not, so with inverted PWM and
    /// `off_percent == 0` a `max_percent` of 100 makes `max_value` equal to
    /// `off_value`, and full power drives the output off.
    pub off_value: u16,
    /// Compare value at `rpm_min`. Not polarity-adjusted.
    pub min_value: u16,
    /// Compare value at `rpm_max`. Not polarity-adjusted.
    pub max_value: u16,
    /// Compare ticks per S unit.
    pub gradient: f32,
    /// Non-zero off duty: "off" still drives `off_value`.
    pub always_on: bool,
    /// PWM output polarity is inverted.
    pub invert: bool,
    /// Divisor applied to the input clock ahead of the counter.
    pub prescale: u32,
    pub rpm_min: f32,
    pub rpm_max: f32,
}

impl PwmDescriptor {
    /// Map a commanded S value onto a compare value.
    ///
    /// Zero, negative, NaN, and below-range values are "off". Everything
    /// else is interpolated along the gradient and clamped to
    /// `[min_value, max_value]`; `rpm_max` and above saturate.
    pub fn counter_for_rpm(&self, rpm: f32) -> u16 {
        if rpm.is_nan() || rpm <= 0.0 || rpm < self.rpm_min {
            return self.off_value;
        }
        if rpm >= self.rpm_max {
            return self.max_value;
        }
        let min = f32::from(self.min_value);
        let max = f32::from(self.max_value);
        let value = (min + self.gradient * (rpm - self.rpm_min)).round();
        value.clamp(min, max) as u16
    }

    /// Timer base settings for this descriptor.
    pub fn timer_program(&self) -> TimerProgram {
        TimerProgram {
            prescale: self.prescale,
            period: self.period,
            polarity_inverted: self.invert,
        }
    }
}

/// Resolve the PWM descriptor for a timer fed by `clock_hz`.
///
/// The prescale factor is searched linearly from 1 until the period fits
/// [`MAX_PERIOD`], so the result carries the smallest prescale that works.
pub fn compute(clock_hz: u32, config: &LaserConfig) -> Result<PwmDescriptor> {
    if clock_hz == 0 {
        return Err(Error::Config("timer clock must be > 0"));
    }
    config.validate()?;
    if !config.has_power_range() {
        return Err(Error::InvalidRange);
    }

    let ticks_per_cycle = f64::from(clock_hz) / f64::from(config.pwm_freq_hz);

    let mut prescale = 1;
    let mut period = candidate_period(ticks_per_cycle, prescale);
    while period > u64::from(MAX_PERIOD) {
        prescale += 1;
        if prescale > MAX_PRESCALE {
            return Err(Error::PeriodUnreachable);
        }
        period = candidate_period(ticks_per_cycle, prescale);
    }
    if period == 0 {
        return Err(Error::PeriodUnreachable);
    }

    Ok(resolve(period as u16, prescale, config))
}

fn candidate_period(ticks_per_cycle: f64, prescale: u32) -> u64 {
    (ticks_per_cycle / f64::from(prescale)).round() as u64
}

fn resolve(period: u16, prescale: u32, config: &LaserConfig) -> PwmDescriptor {
    let invert = config.invert.pwm();

    let off_value = if config.off_percent == 0.0 {
        if invert { period } else { 0 }
    } else {
        invert_value(period, percent_of(period, config.off_percent), invert)
    };
    let min_value = percent_of(period, config.min_percent);
    let max_value = percent_of(period, config.max_percent);
    let gradient =
        f32::from(max_value - min_value) / (config.rpm_max - config.rpm_min);

    PwmDescriptor {
        period,
        off_value,
        min_value,
        max_value,
        gradient,
        always_on: config.off_percent != 0.0,
        invert,
        prescale,
        rpm_min: config.rpm_min,
        rpm_max: config.rpm_max,
    }
}

fn percent_of(period: u16, percent: f32) -> u16 {
    let ticks = (f64::from(period) * f64::from(percent) / 100.0).round();
    (ticks as u16).min(period)
}

fn invert_value(period: u16, value: u16, invert: bool) -> u16 {
    if invert {
        period.saturating_sub(value).saturating_sub(1)
    } else {
        value
    }
}
