mod borrowed;
mod nom_parser;
mod parse;
mod positions;
mod serialize;
pub mod tags;
mod types;

pub use self::borrowed::MessageRef;
pub use self::positions::ParsePositions;
pub use self::types::{Message, Tag};
