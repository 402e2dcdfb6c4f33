//! Fuzz target for message-source prefix parsing (`nick!user@host`).

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::str;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = str::from_utf8(data) {
        if input.len() > 512 {
            return;
        }
        let _ = slirc_proto::PrefixRef::parse(input);
        let _ = slirc_proto::Prefix::new_from_str(input);
    }
});
