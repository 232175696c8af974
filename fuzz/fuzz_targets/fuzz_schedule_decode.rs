//! Fuzz target: `codec::decode_schedule`
//!
//! The schedule string comes straight out of flash, so it may be truncated
//! or garbage after a brown-out.  Decoding must never panic, and anything it
//! accepts must be a well-ordered window that re-encodes to the same text.
//!
//! cargo fuzz run fuzz_schedule_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use relaytimer::codec::{decode_schedule, encode_schedule};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };

    if let Ok(schedule) = decode_schedule(text) {
        assert!(schedule.off_time >= schedule.on_time, "inverted window accepted");

        let encoded = encode_schedule(&schedule).expect("decoded window must re-encode");
        assert_eq!(encoded.as_str(), text, "decode/encode is not canonical");
    }
});
