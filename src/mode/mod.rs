//! User and channel mode parsing.

pub mod parse;
mod types;

pub use self::types::{ChannelMode, Mode, ModeType, UserMode};
