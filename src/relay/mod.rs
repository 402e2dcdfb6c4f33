//! Binary relay codec: typed objects shipped over length-prefixed,
//! optionally compressed frames, plus the inbound command decoder and
//! nicklist diff encoder that sit on top of it (spec §4.6).
//!
//! Grounded on `relay-weechat-msg.c` (frame/object encoding) and
//! `relay-weechat-protocol.c` (command dispatch, handshake/init auth,
//! sync flags).

mod frame;
mod nicklist;
mod object;
mod protocol;

pub use frame::{decode_frame, encode_frame, Compression};
pub use nicklist::{encode_nicklist_diff, encode_nicklist_full, DiffKind, NicklistItem};
pub use object::{
    string_hashtable, FieldKind, Hdata, HdataRow, InfolistItem, Object, ObjectKind, Reader,
};
pub use protocol::{
    check_password, parse_command, parse_handshake, parse_init, pong_payload, AuthOutcome,
    ClientCommand, HandshakeParams, InitParams, SyncFlags, SyncTarget,
};

/// Errors arising from the relay wire codec and command decoder.
///
/// `Truncated` is the distinguished "need more bytes" case: per the
/// malformed-input invariant, a short read off a live socket is never a
/// hard failure, just a request to wait for more bytes.
#[derive(Clone, Debug, thiserror::Error)]
pub enum RelayError {
    /// The buffer ended `need` bytes short of completing the current
    /// read. Not a protocol violation — ask the transport for more.
    #[error("truncated input, need {need} more bytes")]
    Truncated {
        /// How many additional bytes would complete the pending read.
        need: usize,
    },

    /// A 3-byte object tag that doesn't match any known [`ObjectKind`].
    #[error("unknown object tag {:?}", String::from_utf8_lossy(.0))]
    UnknownObjectTag([u8; 3]),

    /// A frame's compression byte named a scheme this build cannot
    /// decode (zstd is recognized but not implemented).
    #[error("unsupported compression scheme {0}")]
    UnsupportedCompression(u8),

    /// Handshake/init authentication did not succeed; `&'static str`
    /// names which check failed (`"password"`, `"totp"`, `"hash_algo"`).
    #[error("authentication failed: {0}")]
    AuthFailed(&'static str),

    /// A structurally well-formed frame whose contents don't parse as
    /// a valid object or command (bad UTF-8 in a decimal/pointer field,
    /// an unparseable hdata keys-with-types string, and so on).
    #[error("malformed relay data: {0}")]
    Malformed(String),
}
