//! Channel-sigil helpers.
//!
//! Generalizes the hardcoded `#&+!` prefix test used by earlier IRC daemons
//! into one driven by the server's advertised ISUPPORT `CHANTYPES` token
//! (spec §3.1, §6.2), since different networks advertise different sigil
//! sets (most commonly `#&`, occasionally including `+` or `!`).

/// Default `CHANTYPES` value assumed before a server's 005 line arrives.
pub const DEFAULT_CHANTYPES: &str = "#&";

/// Returns true if `name` begins with one of the bytes in `chantypes` and
/// is otherwise a plausible channel name (non-empty, no space/comma/NUL/BEL).
pub fn is_channel_name(name: &str, chantypes: &str) -> bool {
    let mut chars = name.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return false,
    };

    if !chantypes.contains(first) {
        return false;
    }

    for c in chars {
        if c == ' ' || c == ',' || c == '\x07' || c == '\0' {
            return false;
        }
    }

    true
}

/// Strips the leading run of sigil bytes from a channel name, yielding the
/// `name2` form used for case-insensitive, prefix-free sorting (spec §3.3).
pub fn strip_sigil<'a>(name: &'a str, chantypes: &str) -> &'a str {
    name.trim_start_matches(|c| chantypes.contains(c))
}

/// Extension trait mirroring the ecosystem convention of a `str`-level
/// channel test, fixed to the default `#&` sigil set. Prefer
/// [`is_channel_name`] with the server's actual `CHANTYPES` when one is
/// known.
pub trait ChannelExt {
    /// Check if this string is a channel name under the default sigil set.
    fn is_channel_name(&self) -> bool;
}

impl ChannelExt for &str {
    fn is_channel_name(&self) -> bool {
        is_channel_name(self, DEFAULT_CHANTYPES)
    }
}

impl ChannelExt for String {
    fn is_channel_name(&self) -> bool {
        self.as_str().is_channel_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sigils() {
        assert!("#channel".is_channel_name());
        assert!("&local".is_channel_name());
        assert!(!"channel".is_channel_name());
        assert!(!"#chan nel".is_channel_name());
        assert!(!"".is_channel_name());
    }

    #[test]
    fn custom_chantypes() {
        assert!(is_channel_name("+modeless", "#&+!"));
        assert!(is_channel_name("!safe12345", "#&+!"));
        assert!(!is_channel_name("+modeless", "#&"));
    }

    #[test]
    fn strip_sigil_basic() {
        assert_eq!(strip_sigil("#channel", "#&"), "channel");
        assert_eq!(strip_sigil("&&local", "#&"), "local");
        assert_eq!(strip_sigil("no-sigil", "#&"), "no-sigil");
    }
}
