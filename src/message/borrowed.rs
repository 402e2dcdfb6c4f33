
use crate::chan::{self, DEFAULT_CHANTYPES};
use crate::command::CommandRef;
use crate::error::MessageParseError;
use crate::prefix::PrefixRef;

use super::nom_parser::ParsedMessage;
use super::positions::{offset_of, ParsePositions};

#[derive(Clone, PartialEq, Debug)]
pub struct MessageRef<'a> {
    pub tags: Option<&'a str>,
    pub prefix: Option<PrefixRef<'a>>,
    pub command: CommandRef<'a>,
    pub raw: &'a str,
    /// Whether the last parameter was colon-introduced on the wire.
    trailing: bool,
    /// Byte offsets into `raw` (spec §3.2, §8.2 scenario 1).
    pub positions: ParsePositions,
}

impl<'a> MessageRef<'a> {
    /// Parses a single line into its component fields.
    ///
    /// Total: per spec §4.1, parsing never rejects input. An empty line
    /// or one the grammar can't find a command token in (mirroring
    /// `irc_message_parse`, which nulls every out-field and returns
    /// rather than failing) comes back as a record with an empty
    /// command, no prefix, and no params instead of an error.
    pub fn parse(s: &'a str) -> Result<MessageRef<'a>, MessageParseError> {
        let trimmed = s.trim_end_matches(['\r', '\n']);

        let parsed = match ParsedMessage::parse(trimmed) {
            Ok(m) => m,
            Err(_e) => ParsedMessage {
                tags: None,
                prefix: None,
                command: "",
                params: Vec::new(),
                trailing: false,
            },
        };

        let prefix = parsed.prefix.map(PrefixRef::parse);
        let positions = compute_positions(trimmed, &parsed);
        let command = CommandRef::new(parsed.command, parsed.params.clone());

        Ok(MessageRef {
            tags: parsed.tags,
            prefix,
            command,
            raw: s,
            trailing: parsed.trailing,
            positions,
        })
    }

    /// The channel-slot parameter (rule 6): the first parameter that passes
    /// the channel-sigil test, or for numeric replies, the first such
    /// parameter after the leading recipient nick.
    pub fn channel(&self) -> Option<&'a str> {
        let is_numeric =
            !self.command.name.is_empty() && self.command.name.bytes().all(|b| b.is_ascii_digit());
        let candidates: &[&str] = if is_numeric && self.command.args.len() > 1 {
            &self.command.args[1..]
        } else {
            &self.command.args[..]
        };
        candidates
            .iter()
            .find(|p| chan::is_channel_name(p, DEFAULT_CHANTYPES))
            .copied()
    }

    /// The trailing (colon-introduced) parameter's body, if present.
    ///
    /// For `JOIN`/`PART`, a trailing parameter holding a single channel
    /// (the WeeChat `irc-message.c` quirk, spec §4.1 rule 5) is returned
    /// here with the colon already stripped, identically to any other
    /// trailing parameter.
    pub fn text(&self) -> Option<&'a str> {
        if !self.trailing {
            return None;
        }
        self.command.args.last().copied()
    }

    pub fn to_raw_owned(&self) -> String {
        let mut s = String::new();
        if let Some(tags) = &self.tags {
            s.push('@');
            s.push_str(tags);
            s.push(' ');
        }
        if let Some(prefix) = &self.prefix {
            s.push(':');
            s.push_str(prefix.raw);
            s.push(' ');
        }
        s.push_str(self.command.name);
        if !self.command.args.is_empty() {
            s.push(' ');
            s.push_str(&self.command.args.join(" "));
        }
        s
    }

    /// Reserializes the message with its tag block dropped, for relay
    /// clients that did not negotiate `message-tags`.
    pub fn without_tags(&self) -> String {
        let mut s = String::new();
        if let Some(prefix) = &self.prefix {
            s.push(':');
            s.push_str(prefix.raw);
            s.push(' ');
        }
        s.push_str(self.command.name);
        if !self.command.args.is_empty() {
            s.push(' ');
            s.push_str(&self.command.args.join(" "));
        }
        s
    }
}

/// Determines byte offsets for the parsed line per spec §3.2/§4.1 rule 6.
fn compute_positions(trimmed: &str, parsed: &ParsedMessage<'_>) -> ParsePositions {
    let pos_command = offset_of(trimmed, parsed.command);
    let pos_arguments = parsed
        .params
        .first()
        .map(|p| offset_of(trimmed, p))
        .unwrap_or(pos_command + parsed.command.len());

    let is_numeric = !parsed.command.is_empty() && parsed.command.bytes().all(|b| b.is_ascii_digit());
    let channel_candidates: &[&str] = if is_numeric && parsed.params.len() > 1 {
        &parsed.params[1..]
    } else {
        &parsed.params[..]
    };
    let pos_channel = channel_candidates
        .iter()
        .find(|p| chan::is_channel_name(p, DEFAULT_CHANTYPES))
        .map(|p| offset_of(trimmed, p));

    let pos_text = if parsed.trailing {
        parsed.params.last().map(|p| offset_of(trimmed, p))
    } else {
        None
    };

    ParsePositions {
        pos_command,
        pos_arguments,
        pos_channel,
        pos_text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_privmsg_positions_match_scenario() {
        let line =
            "@time=2019-08-03T12:13:00.000Z :nick!user@host PRIVMSG #channel :the message";
        let msg = MessageRef::parse(line).unwrap();
        assert_eq!(msg.positions.pos_command, 47);
        assert_eq!(msg.positions.pos_arguments, 55);
        assert_eq!(msg.positions.pos_channel, Some(55));
        assert_eq!(msg.positions.pos_text, Some(65));
        assert_eq!(msg.channel(), Some("#channel"));
        assert_eq!(msg.text(), Some("the message"));
    }

    #[test]
    fn numeric_reply_channel_skips_recipient_nick() {
        let msg = MessageRef::parse(":irc.example.net 353 mynick = #channel :nick1 nick2").unwrap();
        assert_eq!(msg.channel(), Some("#channel"));
    }

    #[test]
    fn join_trailing_colon_quirk_fills_channel() {
        // Some servers send JOIN's sole channel as a colon-introduced
        // trailing parameter instead of a plain one.
        let msg = MessageRef::parse(":nick!user@host JOIN :#channel").unwrap();
        assert_eq!(msg.channel(), Some("#channel"));
        assert_eq!(msg.text(), Some("#channel"));
    }

    #[test]
    fn plain_join_has_no_trailing_text() {
        let msg = MessageRef::parse(":nick!user@host JOIN #channel").unwrap();
        assert_eq!(msg.channel(), Some("#channel"));
        assert_eq!(msg.text(), None);
    }
}
