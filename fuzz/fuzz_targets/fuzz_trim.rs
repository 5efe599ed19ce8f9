//! Fuzz target for field redaction.
//!
//! Trimming arbitrary bytes must never panic. On valid JSON it must be
//! idempotent and keep the payload valid.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use lf_filter::{FieldConfig, Trimmer};

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    fields: Vec<&'a str>,
    payload: &'a [u8],
}

fuzz_target!(|input: Input<'_>| {
    let trimmer = Trimmer::new(FieldConfig::new([("h", input.fields)]));
    let once = trimmer.trim("h", input.payload).into_owned();

    if serde_json::from_slice::<serde_json::Value>(input.payload).is_ok() {
        assert!(serde_json::from_slice::<serde_json::Value>(&once).is_ok());
        let twice = trimmer.trim("h", &once);
        assert_eq!(once.as_slice(), twice.as_ref());
    }
});
