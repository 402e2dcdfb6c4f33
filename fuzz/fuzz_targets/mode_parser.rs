//! Fuzz target for channel/user mode-string parsing.
//!
//! Splits the input on whitespace to emulate already-tokenized message
//! parameters, the shape `Mode::as_channel_modes`/`as_user_modes` expect.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slirc_proto::{ChannelMode, Mode, UserMode};
use std::str;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = str::from_utf8(data) {
        if input.len() > 512 {
            return;
        }
        let pieces: Vec<&str> = input.split_whitespace().collect();
        let _ = Mode::<ChannelMode>::as_channel_modes(&pieces);
        let _ = Mode::<UserMode>::as_user_modes(&pieces);
    }
});
