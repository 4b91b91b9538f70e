//! Integration tests for the LaserCore → OutputController → backend chain.

use laserpwm::Error;
use laserpwm::adapters::sim::{OutputWrite, SimOutput};
use laserpwm::app::events::LaserEvent;
use laserpwm::app::ports::TimerProgram;
use laserpwm::app::service::LaserCore;
use laserpwm::config::{HostSpindleFlags, LaserConfig, LaserFeatures, PulseConfig};

use crate::mock_hw::{RecordingSink, writes};

const CLOCK_HZ: u32 = 1_000_000;

fn configured(config: LaserConfig) -> (LaserCore, SimOutput, RecordingSink) {
    let mut core = LaserCore::new(config, LaserFeatures::default());
    let mut hw = SimOutput::new();
    let mut sink = RecordingSink::new();
    core.configure(&mut hw, CLOCK_HZ, &mut sink);
    hw.clear_history();
    sink.clear();
    (core, hw, sink)
}

// ── Reconfiguration ───────────────────────────────────────────

#[test]
fn reconfigure_stops_active_output_before_reprogramming() {
    let (mut core, mut hw, mut sink) = configured(LaserConfig::default());
    core.set_state(&mut hw, true, false, 255.0);
    assert_eq!(hw.line_duty(), 1000);
    hw.clear_history();

    let faster = LaserConfig {
        pwm_freq_hz: 2000.0,
        ..LaserConfig::default()
    };
    let caps = core
        .on_settings_changed(&mut hw, faster, HostSpindleFlags::default(), CLOCK_HZ, &mut sink)
        .unwrap();
    assert!(caps.variable);

    assert_eq!(
        writes(&hw),
        vec![
            OutputWrite::MasterOutput(false),
            OutputWrite::EnablePin(false),
            OutputWrite::Counter(false),
            OutputWrite::TimerBase(TimerProgram {
                prescale: 1,
                period: 500,
                polarity_inverted: false,
            }),
            OutputWrite::Duty(0),
            OutputWrite::Counter(true),
        ]
    );
    assert_eq!(sink.events.len(), 2);
    assert_eq!(sink.events[0], LaserEvent::ForcedStop);
    assert!(matches!(
        sink.events[1],
        LaserEvent::Configured {
            prescale: 1,
            period: 500,
            always_on: false,
            ..
        }
    ));
    assert!(!core.output_state().pwm_enabled);
}

#[test]
fn reconfigure_while_idle_emits_no_stop() {
    let (mut core, mut hw, mut sink) = configured(LaserConfig::default());
    core.configure(&mut hw, CLOCK_HZ, &mut sink);
    assert_eq!(sink.events.len(), 1);
    assert!(matches!(sink.events[0], LaserEvent::Configured { .. }));
}

#[test]
fn unreachable_frequency_falls_back_to_fixed_mode() {
    let config = LaserConfig {
        pwm_freq_hz: 10_000.0,
        ..LaserConfig::default()
    };
    let mut core = LaserCore::new(config, LaserFeatures::default());
    let mut hw = SimOutput::new();
    let mut sink = RecordingSink::new();

    let caps = core.configure(&mut hw, 1000, &mut sink);
    assert!(!caps.variable);
    assert_eq!(sink.last(), Some(&LaserEvent::FixedMode(Error::PeriodUnreachable)));
    assert!(hw.timer().is_none());
    assert_eq!(core.get_pwm(100.0), None);

    core.set_state(&mut hw, true, false, 100.0);
    assert!(hw.enable_pin_level());
    assert_eq!(hw.duty(), 0);
    assert!(core.get_state(&mut hw).on);
}

#[test]
fn empty_rpm_range_selects_fixed_mode() {
    let config = LaserConfig {
        rpm_min: 100.0,
        rpm_max: 100.0,
        ..LaserConfig::default()
    };
    let mut core = LaserCore::new(config, LaserFeatures::default());
    let mut hw = SimOutput::new();
    let mut sink = RecordingSink::new();

    let caps = core.configure(&mut hw, CLOCK_HZ, &mut sink);
    assert!(!caps.variable);
    assert_eq!(sink.last(), Some(&LaserEvent::FixedMode(Error::InvalidRange)));
}

#[test]
fn fixed_fallback_clears_always_on_idle_duty() {
    let config = LaserConfig {
        off_percent: 10.0,
        ..LaserConfig::default()
    };
    let (mut core, mut hw, mut sink) = configured(config);
    core.set_state(&mut hw, false, false, 0.0);
    assert_eq!(hw.line_duty(), 100);

    let no_range = LaserConfig {
        rpm_min: 100.0,
        rpm_max: 100.0,
        ..config
    };
    let caps = core
        .on_settings_changed(&mut hw, no_range, HostSpindleFlags::default(), CLOCK_HZ, &mut sink)
        .unwrap();
    assert!(!caps.variable);
    assert_eq!(hw.line_duty(), 0);
    assert!(!hw.master_output_enabled());
    assert!(!hw.counter_enabled());

    core.set_state(&mut hw, false, false, 0.0);
    assert_eq!(hw.line_duty(), 0);
    core.set_state(&mut hw, true, false, 0.0);
    assert!(hw.enable_pin_level());
    assert_eq!(hw.line_duty(), 0);
}

#[test]
fn invalid_settings_keep_previous_configuration() {
    let (mut core, mut hw, mut sink) = configured(LaserConfig::default());
    let bad = LaserConfig {
        max_percent: 150.0,
        ..LaserConfig::default()
    };
    let result = core.on_settings_changed(
        &mut hw,
        bad,
        HostSpindleFlags::default(),
        CLOCK_HZ,
        &mut sink,
    );
    assert!(matches!(result, Err(Error::Config(_))));
    assert!(sink.events.is_empty());
    assert!(hw.history().is_empty());
    assert_eq!(core.config(), &LaserConfig::default());
    assert_eq!(core.descriptor().map(|d| d.period), Some(1000));
}

// ── Output behaviour ──────────────────────────────────────────

#[test]
fn power_tracks_rpm_updates() {
    let (mut core, mut hw, _sink) = configured(LaserConfig::default());
    core.set_state(&mut hw, true, false, 51.0);
    assert_eq!(hw.line_duty(), 200);

    core.update_rpm(&mut hw, 255.0);
    assert_eq!(hw.line_duty(), 1000);

    let value = core.get_pwm(102.0).unwrap();
    assert_eq!(value, 400);
    core.update_pwm(&mut hw, value);
    assert_eq!(hw.line_duty(), 400);

    core.update_rpm(&mut hw, 0.0);
    assert_eq!(hw.line_duty(), 0);
    assert!(!core.output_state().pwm_enabled);
}

#[test]
fn always_on_holds_off_duty_below_range() {
    let config = LaserConfig {
        off_percent: 10.0,
        rpm_min: 10.0,
        ..LaserConfig::default()
    };
    let (mut core, mut hw, _sink) = configured(config);
    core.set_state(&mut hw, true, false, 9.0);
    assert!(!core.output_state().pwm_enabled);
    assert!(hw.master_output_enabled());
    assert_eq!(hw.line_duty(), 100);

    core.set_state(&mut hw, false, false, 0.0);
    assert_eq!(hw.line_duty(), 100);
}

#[test]
fn state_reads_back_from_pin() {
    let mut config = LaserConfig::default();
    config.invert.set_enable(true);
    let (mut core, mut hw, _sink) = configured(config);

    core.set_state(&mut hw, true, true, 100.0);
    assert!(!hw.enable_pin_level());
    let state = core.get_state(&mut hw);
    assert!(state.on);
    assert!(state.ccw);

    hw.force_enable_pin(true);
    assert!(!core.get_state(&mut hw).on);
}

#[test]
fn rpm_controlled_enable_follows_power() {
    let host = HostSpindleFlags {
        enable_rpm_controlled: true,
        ..HostSpindleFlags::default()
    };
    let mut core = LaserCore::new(LaserConfig::default(), LaserFeatures::default());
    let mut hw = SimOutput::new();
    let mut sink = RecordingSink::new();
    core.on_settings_changed(&mut hw, LaserConfig::default(), host, CLOCK_HZ, &mut sink)
        .unwrap();

    core.set_state(&mut hw, true, false, 0.0);
    assert!(!hw.enable_pin_level());
    core.update_rpm(&mut hw, 128.0);
    assert!(hw.enable_pin_level());
    core.set_state(&mut hw, false, false, 0.0);
    assert!(!hw.enable_pin_level());
}

// ── Pulse mode ────────────────────────────────────────────────

#[test]
fn pulse_is_clamped_and_enables_laser() {
    let features = LaserFeatures {
        pulse_mode: Some(PulseConfig { max_length: 500 }),
        ..LaserFeatures::default()
    };
    let mut core = LaserCore::new(LaserConfig::default(), features);
    let mut hw = SimOutput::new();
    let mut sink = RecordingSink::new();
    assert!(core.configure(&mut hw, CLOCK_HZ, &mut sink).pulse);

    core.pulse_on(&mut hw, 2000).unwrap();
    assert_eq!(hw.last_pulse(), Some(500));
    assert!(hw.enable_pin_level());
}

#[test]
fn pulse_without_pulse_timer_is_rejected() {
    let (mut core, mut hw, _sink) = configured(LaserConfig::default());
    assert_eq!(core.pulse_on(&mut hw, 10), Err(Error::BackendUnavailable));
    assert_eq!(hw.last_pulse(), None);
}
