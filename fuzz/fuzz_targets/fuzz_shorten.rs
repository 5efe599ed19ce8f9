//! Fuzz target for field extraction.
//!
//! Shortening arbitrary bytes must never panic. When the payload is valid
//! JSON, any non-empty result must be valid JSON too.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use lf_filter::{FieldConfig, Shortener};

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    fields: Vec<&'a str>,
    payload: &'a [u8],
}

fuzz_target!(|input: Input<'_>| {
    let shortener = Shortener::new(FieldConfig::new([("h", input.fields)]));
    let out = shortener.shorten("h", input.payload);

    if !out.is_empty() && serde_json::from_slice::<serde_json::Value>(input.payload).is_ok() {
        assert!(serde_json::from_slice::<serde_json::Value>(&out).is_ok());
    }
});
