#![no_main]

use flakerun::search::SearchConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Must never panic; anything accepted must also validate
        if let Ok(config) = SearchConfig::from_toml_str(input) {
            assert!(config.validate().is_ok());
            let _ = config.exploration_max_runs();
        }
    }
});
