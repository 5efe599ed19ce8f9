//! Fuzz target for key occurrence search.
//!
//! Every reported occurrence must have ordered, in-bounds spans.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use lf_filter::find_all;

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    key: &'a str,
    payload: &'a [u8],
}

fuzz_target!(|input: Input<'_>| {
    for occurrence in find_all(input.payload, input.key) {
        assert!(occurrence.key.start < occurrence.key.end);
        assert!(occurrence.key.end <= occurrence.value.start);
        assert!(occurrence.value.start < occurrence.value.end);
        assert!(occurrence.value.end <= input.payload.len());
    }
});
