//! `Display` impl for the owned [`Message`], the inverse of [`super::parse`].

use std::fmt::{self, Display, Formatter};

use super::tags::escape_tag_value;
use super::types::Message;

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(ref tags) = self.tags {
            write!(f, "@")?;
            for (i, tag) in tags.iter().enumerate() {
                if i > 0 {
                    write!(f, ";")?;
                }
                write!(f, "{}", tag.0)?;
                if let Some(ref value) = tag.1 {
                    write!(f, "=")?;
                    escape_tag_value(f, value)?;
                }
            }
            write!(f, " ")?;
        }

        if let Some(ref prefix) = self.prefix {
            write!(f, ":{prefix} ")?;
        }

        write!(f, "{}", self.command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Tag;

    #[test]
    fn roundtrip_through_parse() {
        let original = Message::privmsg("#test", "Hello, world!")
            .with_tag("time", Some("2023-01-01T00:00:00Z"))
            .with_tag("msgid", Some("abc123"));

        let serialized = original.to_string();
        let parsed: Message = serialized.parse().expect("should parse");
        assert_eq!(original, parsed);
    }

    #[test]
    fn tag_value_escaped_on_output() {
        let msg = Message::privmsg("#chan", "hi").with_message_tags(vec![Tag::new(
            "x",
            Some("a b;c".to_string()),
        )]);
        assert_eq!(msg.to_string(), "@x=a\\sb\\:c PRIVMSG #chan :hi");
    }

    #[test]
    fn no_tags_no_at_sign() {
        let msg = Message::join("#chan");
        assert_eq!(msg.to_string(), "JOIN #chan");
    }
}
