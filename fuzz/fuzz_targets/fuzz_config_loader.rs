#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // TOML parsing of Config must never panic; parse errors and validation
    // rejections are both acceptable outcomes.
    if let Ok(cfg) = toml::from_str::<mask_config::Config>(data) {
        let _ = cfg.validate();
    }
});
