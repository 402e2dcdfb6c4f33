//! Mode flag types shared by user and channel mode parsing.

/// A single mode change, optionally carrying an argument.
///
/// `NoPrefix` covers the (rare) case of a mode string with no leading
/// `+`/`-`, which some servers emit in numeric replies listing a user's
/// current modes.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode<T> {
    /// Mode is being added (`+`).
    Plus(T, Option<String>),
    /// Mode is being removed (`-`).
    Minus(T, Option<String>),
    /// Mode with no sign prefix.
    NoPrefix(T),
}

impl<T: ModeType> Mode<T> {
    /// The wire representation of the sign and letter, e.g. `"+o"`, `"-b"`, or `"o"`.
    pub fn flag(&self) -> String {
        match self {
            Mode::Plus(m, _) => format!("+{}", m.to_char()),
            Mode::Minus(m, _) => format!("-{}", m.to_char()),
            Mode::NoPrefix(m) => m.to_char().to_string(),
        }
    }

    /// The mode's argument, if it carries one.
    pub fn arg(&self) -> Option<&str> {
        match self {
            Mode::Plus(_, a) | Mode::Minus(_, a) => a.as_deref(),
            Mode::NoPrefix(_) => None,
        }
    }
}

/// A mode letter that can be parsed from and serialized to a single character,
/// with the parser-relevant metadata of whether it takes an argument.
pub trait ModeType: Copy + Clone + PartialEq + Eq + std::fmt::Debug {
    /// Map a mode letter to its typed representation. Unknown letters become
    /// an `Unknown` variant rather than failing, since IRC servers routinely
    /// advertise non-standard modes.
    fn from_char(c: char) -> Self;

    /// The mode letter this value serializes to.
    fn to_char(&self) -> char;

    /// Whether setting/unsetting this mode carries a parameter.
    fn takes_arg(&self) -> bool;

    /// Whether this is a "list" mode (type A in ISUPPORT CHANMODES terms):
    /// querying it with no argument lists the current entries rather than
    /// being an error.
    fn is_list_mode(&self) -> bool {
        false
    }
}

/// Per-channel mode letters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ChannelMode {
    /// `b` - ban mask (list).
    Ban,
    /// `e` - ban exception mask (list).
    Exception,
    /// `I` - invite exception mask (list).
    InviteException,
    /// `q` - quiet mask (list, on networks using `q` this way).
    Quiet,
    /// `k` - channel key.
    Key,
    /// `l` - user limit.
    Limit,
    /// `i` - invite-only.
    InviteOnly,
    /// `m` - moderated.
    Moderated,
    /// `n` - no external messages.
    NoExternalMessages,
    /// `s` - secret.
    Secret,
    /// `p` - private.
    Private,
    /// `t` - topic settable by ops only.
    TopicProtected,
    /// `o` - channel operator status (carries a nick).
    Oper,
    /// `h` - half-operator status (carries a nick).
    HalfOp,
    /// `v` - voice status (carries a nick).
    Voice,
    /// Any mode letter this crate does not model explicitly.
    Unknown(char),
}

/// Per-user mode letters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum UserMode {
    /// `i` - invisible.
    Invisible,
    /// `w` - receives wallops.
    Wallops,
    /// `o` - network operator.
    Oper,
    /// `O` - local operator.
    LocalOper,
    /// `r` - restricted connection.
    Restricted,
    /// `s` - receives server notices.
    ServerNotices,
    /// Any mode letter this crate does not model explicitly.
    Unknown(char),
}

impl ModeType for ChannelMode {
    fn from_char(c: char) -> Self {
        match c {
            'b' => ChannelMode::Ban,
            'e' => ChannelMode::Exception,
            'I' => ChannelMode::InviteException,
            'q' => ChannelMode::Quiet,
            'k' => ChannelMode::Key,
            'l' => ChannelMode::Limit,
            'i' => ChannelMode::InviteOnly,
            'm' => ChannelMode::Moderated,
            'n' => ChannelMode::NoExternalMessages,
            's' => ChannelMode::Secret,
            'p' => ChannelMode::Private,
            't' => ChannelMode::TopicProtected,
            'o' => ChannelMode::Oper,
            'h' => ChannelMode::HalfOp,
            'v' => ChannelMode::Voice,
            other => ChannelMode::Unknown(other),
        }
    }

    fn to_char(&self) -> char {
        match self {
            ChannelMode::Ban => 'b',
            ChannelMode::Exception => 'e',
            ChannelMode::InviteException => 'I',
            ChannelMode::Quiet => 'q',
            ChannelMode::Key => 'k',
            ChannelMode::Limit => 'l',
            ChannelMode::InviteOnly => 'i',
            ChannelMode::Moderated => 'm',
            ChannelMode::NoExternalMessages => 'n',
            ChannelMode::Secret => 's',
            ChannelMode::Private => 'p',
            ChannelMode::TopicProtected => 't',
            ChannelMode::Oper => 'o',
            ChannelMode::HalfOp => 'h',
            ChannelMode::Voice => 'v',
            ChannelMode::Unknown(c) => *c,
        }
    }

    fn takes_arg(&self) -> bool {
        matches!(
            self,
            ChannelMode::Ban
                | ChannelMode::Exception
                | ChannelMode::InviteException
                | ChannelMode::Quiet
                | ChannelMode::Key
                | ChannelMode::Limit
                | ChannelMode::Oper
                | ChannelMode::HalfOp
                | ChannelMode::Voice
        )
    }

    fn is_list_mode(&self) -> bool {
        matches!(
            self,
            ChannelMode::Ban | ChannelMode::Exception | ChannelMode::InviteException | ChannelMode::Quiet
        )
    }
}

impl ModeType for UserMode {
    fn from_char(c: char) -> Self {
        match c {
            'i' => UserMode::Invisible,
            'w' => UserMode::Wallops,
            'o' => UserMode::Oper,
            'O' => UserMode::LocalOper,
            'r' => UserMode::Restricted,
            's' => UserMode::ServerNotices,
            other => UserMode::Unknown(other),
        }
    }

    fn to_char(&self) -> char {
        match self {
            UserMode::Invisible => 'i',
            UserMode::Wallops => 'w',
            UserMode::Oper => 'o',
            UserMode::LocalOper => 'O',
            UserMode::Restricted => 'r',
            UserMode::ServerNotices => 's',
            UserMode::Unknown(c) => *c,
        }
    }

    fn takes_arg(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_mode_roundtrip() {
        for c in ['b', 'e', 'I', 'q', 'k', 'l', 'i', 'm', 'n', 's', 'p', 't', 'o', 'h', 'v'] {
            assert_eq!(ChannelMode::from_char(c).to_char(), c);
        }
        assert_eq!(ChannelMode::from_char('z').to_char(), 'z');
    }

    #[test]
    fn test_user_mode_roundtrip() {
        for c in ['i', 'w', 'o', 'O', 'r', 's'] {
            assert_eq!(UserMode::from_char(c).to_char(), c);
        }
    }

    #[test]
    fn test_mode_flag_and_arg() {
        let m = Mode::Plus(ChannelMode::Ban, Some("*!*@x".to_string()));
        assert_eq!(m.flag(), "+b");
        assert_eq!(m.arg(), Some("*!*@x"));

        let m: Mode<ChannelMode> = Mode::NoPrefix(ChannelMode::InviteOnly);
        assert_eq!(m.flag(), "i");
        assert_eq!(m.arg(), None);
    }
}
