//! Fuzz target for CTCP payload parsing.
//!
//! Exercises the `\x01...\x01` unwrap/format path; should never panic
//! regardless of how the delimiters are placed or nested.

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::str;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = str::from_utf8(data) {
        if input.len() > 512 {
            return;
        }
        let _ = slirc_proto::Ctcp::parse(input);
        let _ = slirc_proto::CtcpOwned::parse(input);
    }
});
