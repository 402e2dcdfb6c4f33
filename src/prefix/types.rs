//! Owned and borrowed message source ("prefix") types.

/// The source of a message: `nick[!user][@host]`, or a bare server name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Prefix {
    /// The raw prefix text, exactly as it appeared on the wire (without the leading `:`).
    pub raw: String,
    /// Nickname, if the prefix decomposed as a user prefix.
    pub nick: Option<String>,
    /// Username, present only when the prefix contained `!`.
    pub user: Option<String>,
    /// Host part, or the whole raw text when the prefix was a bare server name.
    pub host: Option<String>,
}

/// A borrowed view of a [`Prefix`], avoiding allocation during parsing.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PrefixRef<'a> {
    /// The raw prefix text (without the leading `:`).
    pub raw: &'a str,
    /// Nickname, if the prefix decomposed as a user prefix.
    pub nick: Option<&'a str>,
    /// Username, present only when the prefix contained `!`.
    pub user: Option<&'a str>,
    /// Host part, or the whole raw text when the prefix was a bare server name.
    pub host: Option<&'a str>,
}

/// Decompose a raw prefix string into (nick, user, host).
///
/// Per the wire grammar: if the text contains `!` before any `@`, the nick is
/// everything before `!`, the user is between `!` and `@`, and the host is
/// the whole text. If only `@` is present, the nick is everything before `@`
/// and the host is the whole text. If neither is present, the prefix is a
/// bare server name and nick/user/host are all unset except `host`, which
/// mirrors the raw text so callers that only care about "where did this come
/// from" don't need a separate code path.
///
/// A prefix containing `@` but no `!` is ambiguous against some historical
/// servers (is the part before `@` a nick or the start of a server name?);
/// this parser preserves the documented behavior of treating it as a nick,
/// since that matches what real-world ambient traffic expects.
fn decompose(raw: &str) -> (Option<&str>, Option<&str>, Option<&str>) {
    match (raw.find('!'), raw.find('@')) {
        (Some(bang), Some(at)) if bang < at => {
            (Some(&raw[..bang]), Some(&raw[bang + 1..at]), Some(raw))
        }
        (None, Some(at)) => (Some(&raw[..at]), None, Some(raw)),
        (Some(bang), _) => {
            // `!` with no `@`, or `@` appearing before `!`: still a nick!user form
            // without a host; treat everything after `!` as user, no host.
            (Some(&raw[..bang]), Some(&raw[bang + 1..]), None)
        }
        (None, None) => (None, None, Some(raw)),
    }
}

impl<'a> PrefixRef<'a> {
    /// Parse a raw prefix slice (without the leading `:`).
    pub fn parse(raw: &'a str) -> PrefixRef<'a> {
        let (nick, user, host) = decompose(raw);
        PrefixRef {
            raw,
            nick,
            user,
            host,
        }
    }

    /// Copy this borrowed prefix into an owned [`Prefix`].
    pub fn to_owned(&self) -> Prefix {
        Prefix {
            raw: self.raw.to_string(),
            nick: self.nick.map(str::to_string),
            user: self.user.map(str::to_string),
            host: self.host.map(str::to_string),
        }
    }
}

impl Prefix {
    /// Parse a raw prefix string (without the leading `:`).
    pub fn new_from_str(raw: &str) -> Prefix {
        PrefixRef::parse(raw).to_owned()
    }

    /// Build a `nick!user@host` prefix directly from its parts.
    pub fn new(nick: &str, user: Option<&str>, host: Option<&str>) -> Prefix {
        let mut raw = String::from(nick);
        if let Some(user) = user {
            raw.push('!');
            raw.push_str(user);
        }
        if let Some(host) = host {
            raw.push('@');
            raw.push_str(host);
        }
        Prefix {
            raw,
            nick: Some(nick.to_string()),
            user: user.map(str::to_string),
            host: host.map(str::to_string),
        }
    }
}

impl std::fmt::Display for Prefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Returns true if `s` is plausible prefix text: non-empty and containing no
/// whitespace (a prefix is always exactly one wire token).
pub fn is_valid_prefix_str(s: &str) -> bool {
    !s.is_empty() && !s.contains(' ')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nick_user_host() {
        let p = Prefix::new_from_str("nick!user@host");
        assert_eq!(p.nick.as_deref(), Some("nick"));
        assert_eq!(p.user.as_deref(), Some("user"));
        assert_eq!(p.host.as_deref(), Some("host"));
    }

    #[test]
    fn test_nick_host_only() {
        let p = Prefix::new_from_str("nick@host");
        assert_eq!(p.nick.as_deref(), Some("nick"));
        assert_eq!(p.user, None);
        assert_eq!(p.host.as_deref(), Some("nick@host"));
    }

    #[test]
    fn test_server_name() {
        let p = Prefix::new_from_str("irc.example.com");
        assert_eq!(p.nick, None);
        assert_eq!(p.host.as_deref(), Some("irc.example.com"));
    }

    #[test]
    fn test_is_valid_prefix_str() {
        assert!(is_valid_prefix_str("nick!user@host"));
        assert!(!is_valid_prefix_str(""));
        assert!(!is_valid_prefix_str("has space"));
    }
}
