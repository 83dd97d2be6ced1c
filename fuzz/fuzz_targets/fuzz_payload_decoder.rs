//! Fuzz target: `decode_int` / `decode_float`
//!
//! Arbitrary payload bytes must never panic either decoder, and anything
//! over the payload limit must decode to zero.
//!
//! cargo fuzz run fuzz_payload_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use powerdisplay::payload::{MAX_PAYLOAD_LEN, decode_float, decode_int};

fuzz_target!(|data: &[u8]| {
    let i = decode_int(data);
    let f = decode_float(data);

    if data.len() > MAX_PAYLOAD_LEN {
        assert_eq!(i, 0);
        assert_eq!(f, 0.0);
    }
});
