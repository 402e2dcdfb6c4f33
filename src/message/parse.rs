//! Message parsing implementation.
//!
//! Implements `FromStr` for the owned [`Message`] on top of the zero-copy
//! nom parser, adding tag unescaping and key interning.

use std::borrow::Cow;
use std::str::FromStr;

use crate::error::ProtocolError;

use super::nom_parser::ParsedMessage;
use super::tags::unescape_tag_value;
use super::types::{Message, Tag};

/// Intern common tag keys to avoid allocating a fresh `String` for the
/// handful of tags that dominate real traffic.
#[inline]
fn intern_tag_key(key: &str) -> Cow<'static, str> {
    match key {
        "msgid" => Cow::Borrowed("msgid"),
        "time" => Cow::Borrowed("time"),
        "batch" => Cow::Borrowed("batch"),
        "account" => Cow::Borrowed("account"),
        "label" => Cow::Borrowed("label"),
        "echo-message" => Cow::Borrowed("echo-message"),
        "message-tags" => Cow::Borrowed("message-tags"),
        "+typing" => Cow::Borrowed("+typing"),
        "+draft/typing" => Cow::Borrowed("+draft/typing"),
        "+draft/reply" => Cow::Borrowed("+draft/reply"),
        "+draft/react" => Cow::Borrowed("+draft/react"),
        _ => Cow::Owned(key.to_owned()),
    }
}

/// Parse a raw tags string (without the leading `@`) into ordered `Tag`s.
fn parse_tags_string(tags_str: &str) -> Vec<Tag> {
    tags_str
        .split(';')
        .filter(|s| !s.is_empty())
        .map(|tag| {
            let mut iter = tag.splitn(2, '=');
            let key = iter.next().unwrap_or("");
            let value = iter.next().map(unescape_tag_value);
            let interned_key = if key.is_empty() {
                Cow::Owned(String::new())
            } else {
                intern_tag_key(key)
            };
            Tag(interned_key, value)
        })
        .collect()
}

impl FromStr for Message {
    type Err = ProtocolError;

    /// Parses a raw IRC line into an owned [`Message`].
    ///
    /// The raw structural parse (tags/prefix/command/params, spec §4.1)
    /// is total: an empty line or one the grammar can't find a command
    /// token in yields a record with an empty command rather than an
    /// error, mirroring `irc_message_parse`'s "never reject" contract.
    /// An `Err` here can still surface from the *structured* step that
    /// follows — building a typed [`Command`](crate::command::Command)
    /// from the parsed params can reject malformed arguments (e.g. a
    /// `MODE` line with an invalid mode string); that is deliberately a
    /// different, narrower failure than rejecting the whole message.
    fn from_str(s: &str) -> Result<Message, Self::Err> {
        let parsed = ParsedMessage::parse(s).unwrap_or_else(|_parse_err| ParsedMessage {
            tags: None,
            prefix: None,
            command: "",
            params: Vec::new(),
            trailing: false,
        });

        let tags = parsed.tags.map(parse_tags_string);

        Message::with_tags(tags, parsed.prefix, parsed.command, parsed.params.clone()).map_err(
            |cause| ProtocolError::InvalidMessage {
                string: s.to_owned(),
                cause,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;

    #[test]
    fn parse_simple_ping() {
        let msg: Message = "PING :server\r\n".parse().unwrap();
        assert!(matches!(msg.command, Command::PING(_, _)));
    }

    #[test]
    fn parse_tagged_privmsg() {
        let msg: Message = "@time=2019-08-03T12:13:00.000Z :nick!user@host PRIVMSG #channel :the message"
            .parse()
            .unwrap();
        assert_eq!(msg.tag_value("time"), Some("2019-08-03T12:13:00.000Z"));
        assert_eq!(msg.source_nickname(), Some("nick"));
        match msg.command {
            Command::PRIVMSG(chan, text) => {
                assert_eq!(chan, "#channel");
                assert_eq!(text, "the message");
            }
            other => panic!("expected PRIVMSG, got {other:?}"),
        }
    }

    #[test]
    fn parse_escaped_tag_value() {
        let msg: Message = "@key=value\\swith\\sspace PING :test\r\n".parse().unwrap();
        assert_eq!(msg.tag_value("key"), Some("value with space"));
    }

    #[test]
    fn parse_empty_message_is_total() {
        // spec §4.1: parsing never rejects input; an empty line comes back
        // as a record with an empty/unset command rather than an error.
        let msg: Message = "".parse().unwrap();
        assert!(msg.tags.is_none());
        assert!(msg.prefix.is_none());
        match msg.command {
            Command::Raw(name, args) => {
                assert!(name.is_empty());
                assert!(args.is_empty());
            }
            other => panic!("expected empty Raw command, got {other:?}"),
        }
    }

    #[test]
    fn parse_whitespace_only_message_is_total() {
        let msg: Message = "   ".parse().unwrap();
        match msg.command {
            Command::Raw(name, args) => {
                assert!(name.is_empty());
                assert!(args.is_empty());
            }
            other => panic!("expected empty Raw command, got {other:?}"),
        }
    }

    #[test]
    fn intern_common_tags_borrowed() {
        assert!(matches!(intern_tag_key("msgid"), Cow::Borrowed(_)));
        assert!(matches!(intern_tag_key("unknown-tag"), Cow::Owned(_)));
    }
}
