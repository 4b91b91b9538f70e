//! Boot flow: settings store → LaserCore → log sink.

use laserpwm::adapters::log_sink::LogEventSink;
use laserpwm::adapters::nvs::NvsSettings;
use laserpwm::adapters::sim::SimOutput;
use laserpwm::app::ports::SettingsStore;
use laserpwm::app::service::LaserCore;
use laserpwm::config::{LaserConfig, LaserFeatures, load_or_restore};

#[test]
fn first_boot_runs_on_defaults() {
    let store = NvsSettings::new();
    let config = load_or_restore(&store);
    assert_eq!(config, LaserConfig::default());
    assert!(store.raw().is_some(), "defaults persisted");

    let mut core = LaserCore::new(config, LaserFeatures::default());
    let mut hw = SimOutput::new();
    let caps = core.configure(&mut hw, 72_000_000, &mut LogEventSink::new());
    assert!(caps.variable);
    assert_eq!(hw.timer().map(|t| t.prescale), Some(2));
}

#[test]
fn saved_settings_survive_reload() {
    let store = NvsSettings::new();
    let mut config = LaserConfig {
        pwm_freq_hz: 20_000.0,
        min_percent: 5.0,
        max_percent: 90.0,
        ..LaserConfig::default()
    };
    config.invert.set_pwm(true);
    store.save(&config).unwrap();

    let reopened = NvsSettings::with_blob(&store.raw().unwrap());
    let loaded = load_or_restore(&reopened);
    assert_eq!(loaded, config);

    let mut core = LaserCore::new(loaded, LaserFeatures::default());
    let mut hw = SimOutput::new();
    core.configure(&mut hw, 1_000_000, &mut LogEventSink::new());
    let program = hw.timer().unwrap();
    assert_eq!(program.period, 50);
    assert!(program.polarity_inverted);
}
