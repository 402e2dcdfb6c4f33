//! Transport-adjacent helpers: a buffered line transport and a zero-copy
//! streaming transport, both gated behind the `tokio` feature.
//!
//! This crate does not own socket setup, TLS handshakes, or SASL auth
//! (those remain the embedding application's responsibility); it only
//! provides the framing/parsing glue once a connected stream exists.

pub mod error;
pub mod framed;
pub mod zero_copy;

pub use framed::{Transport, TransportReadError, MAX_IRC_LINE_LEN};
pub use zero_copy::{
    LendingStream, ZeroCopyTransport, ZeroCopyTransportEnum, ZeroCopyWebSocketTransport,
};
