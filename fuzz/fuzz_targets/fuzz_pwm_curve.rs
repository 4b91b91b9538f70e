//! Fuzz target: `pwm_curve::compute` + `counter_for_rpm`
//!
//! Builds a `LaserConfig` and a timer clock from raw bytes and checks:
//! - No panics for any input, including NaN/inf fields
//! - A resolved period always fits the 16-bit auto-reload register
//! - Every compare value is either `off_value` or inside `[min, max]`
//!
//! cargo fuzz run fuzz_pwm_curve

#![no_main]

use laserpwm::config::{InvertFlags, LaserConfig};
use laserpwm::control::pwm_curve::{self, MAX_PERIOD};
use libfuzzer_sys::fuzz_target;

fn f32_at(data: &[u8], i: usize) -> f32 {
    let mut b = [0u8; 4];
    b.copy_from_slice(&data[i * 4..i * 4 + 4]);
    f32::from_le_bytes(b)
}

fuzz_target!(|data: &[u8]| {
    // 4 bytes clock, 6 f32 fields, 1 flags byte, 1 f32 probe.
    if data.len() < 4 + 6 * 4 + 1 + 4 {
        return;
    }
    let clock = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    let fields = &data[4..];

    let config = LaserConfig {
        rpm_max: f32_at(fields, 0),
        rpm_min: f32_at(fields, 1),
        pwm_freq_hz: f32_at(fields, 2),
        off_percent: f32_at(fields, 3),
        min_percent: f32_at(fields, 4),
        max_percent: f32_at(fields, 5),
        invert: InvertFlags::from_bits(fields[24]),
        ..LaserConfig::default()
    };
    let probe = f32_at(&fields[25..], 0);

    let Ok(desc) = pwm_curve::compute(clock, &config) else {
        return;
    };
    assert!(u32::from(desc.period) <= MAX_PERIOD);
    assert!(desc.min_value <= desc.max_value);

    let value = desc.counter_for_rpm(probe);
    assert!(value == desc.off_value || (desc.min_value..=desc.max_value).contains(&value));
});
