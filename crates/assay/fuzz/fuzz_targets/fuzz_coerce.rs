//! Fuzz target for cell coercion.
//!
//! Number and datetime parsing must never panic on arbitrary text.

#![no_main]

use libfuzzer_sys::fuzz_target;
use assay::input::coerce::{parse_datetime_auto, parse_number};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = parse_number(s);
        let _ = parse_datetime_auto(s);
    }
});
