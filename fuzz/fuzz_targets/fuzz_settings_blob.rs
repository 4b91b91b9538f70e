//! Fuzz target: settings blob decoding
//!
//! Feeds arbitrary bytes to the settings store and checks that
//! `load_or_restore` never panics and always returns a configuration
//! that passes validation.
//!
//! cargo fuzz run fuzz_settings_blob

#![no_main]

use laserpwm::adapters::nvs::NvsSettings;
use laserpwm::config::load_or_restore;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let store = NvsSettings::with_blob(data);
    let config = load_or_restore(&store);
    assert!(config.validate().is_ok());

    // Whatever was restored must re-encode and decode identically.
    let bytes = postcard::to_allocvec(&config).expect("encode");
    let back: laserpwm::config::LaserConfig = postcard::from_bytes(&bytes).expect("decode");
    assert_eq!(back, config);
});
