//! Control algorithms: PWM timing resolution and speed-to-duty mapping.

pub mod pwm_curve;
