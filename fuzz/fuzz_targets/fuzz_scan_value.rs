//! Fuzz target for value span scanning.
//!
//! Scanning arbitrary bytes from an arbitrary offset must never panic, and a
//! successful scan must end inside the buffer.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use lf_filter::scan::scan_value;

#[derive(Arbitrary, Debug)]
struct Input {
    offset: u16,
    data: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let offset = input.offset as usize;
    if let Ok(end) = scan_value(&input.data, offset) {
        assert!(offset < end && end <= input.data.len());
    }
});
