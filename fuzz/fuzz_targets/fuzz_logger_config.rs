//! Fuzz target for logger configuration parsing.
//!
//! Tests that JSON and TOML config parsing handle arbitrary input without
//! panicking, and that validation never panics on what parses.

#![no_main]

use libfuzzer_sys::fuzz_target;
use lf_logger::LoggerConfig;

fuzz_target!(|data: &str| {
    for parsed in [LoggerConfig::from_json_str(data), LoggerConfig::from_toml_str(data)] {
        if let Ok(config) = parsed {
            let _ = config.validate();
        }
    }
});
