//! Per-connection server state aggregate (spec §3.1, §3.5, §3.6).
//!
//! `Server` is a plain data aggregate mutated by the free functions living
//! in `message`, `split`, `colors`, `list`, `notify` — it performs no I/O
//! of its own, matching the teacher's existing style of protocol logic as
//! functions over borrowed state rather than a god-object connection type
//! (see `caps::parse_request`, `mode::parse_modes`).
//!
//! Channels and their nicks are held in insertion-ordered arenas (`Vec`s)
//! rather than the original's intrusive doubly-linked lists with parent
//! back-pointers (design note §9): cross-links become plain `usize`
//! indices, and freeing the whole thing is an `O(n)` `Vec` drop.

mod prefix_mask;
mod raw_ring;

pub use self::prefix_mask::PrefixMask;
pub use self::raw_ring::{RawFlags, RawMessageEntry, RawMessageRing};

use std::collections::HashSet;

use crate::error::ProtocolError;
use crate::isupport::Isupport;
use crate::list::ListState;
use crate::notify::NotifyState;

/// Maximum number of simultaneously advertised `PREFIX` modes a
/// [`PrefixMask`] can represent (design note §9, DESIGN.md: "bitmask
/// only, no promotion path").
pub const MAX_PREFIX_MODES: usize = 32;

/// ISUPPORT `UTF8MAPPING` nick-validity policy (spec §3.1).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Utf8Mapping {
    /// No UTF-8-aware nick validation (legacy ASCII-only rules).
    #[default]
    None,
    /// RFC 8265 ("PRECIS") nick validity rules.
    Rfc8265,
}

impl Utf8Mapping {
    fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("rfc8265") {
            Utf8Mapping::Rfc8265
        } else {
            Utf8Mapping::None
        }
    }
}

/// One nick's presence within a single channel (spec §3.5).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Nick {
    /// Nickname.
    pub name: String,
    /// Full user@host, when known (from extended-join, WHO, etc.).
    pub host: Option<String>,
    /// Services account name, when known (`account-notify`, extended-join).
    pub account: Option<String>,
    /// Real name / gecos, when known.
    pub realname: Option<String>,
    /// Set of channel status modes currently held, as a bitmask positional
    /// against the server's current `prefix_modes` string.
    pub prefixes: PrefixMask,
}

impl Nick {
    /// Creates a nick with no status modes set.
    pub fn new(name: impl Into<String>) -> Self {
        Nick {
            name: name.into(),
            host: None,
            account: None,
            realname: None,
            prefixes: PrefixMask::default(),
        }
    }

    /// The single highest-ranked set prefix character, if any (spec
    /// §3.5: "index 0 is highest").
    pub fn highest_prefix_char(&self, server: &Server) -> Option<char> {
        self.prefixes.highest_char(&server.prefix_chars)
    }
}

/// One joined channel and its nick arena (spec §3.1 "channels").
#[derive(Clone, Debug, Default)]
pub struct Channel {
    /// Channel name, including sigil.
    pub name: String,
    /// Topic text, if known.
    pub topic: Option<String>,
    /// Insertion-ordered nick arena; stable indices are referenced by
    /// nothing outside this struct today, but kept `Vec`-backed (rather
    /// than a `HashMap`) so iteration order matches join order, matching
    /// the teacher's ordered-collection convention elsewhere (`cap_list`
    /// negotiation order, `Isupport` entry order).
    pub nicks: Vec<Nick>,
}

impl Channel {
    /// Creates an empty channel record.
    pub fn new(name: impl Into<String>) -> Self {
        Channel {
            name: name.into(),
            topic: None,
            nicks: Vec::new(),
        }
    }

    /// Finds a nick by name (case-sensitive; callers needing casemapped
    /// lookup should use [`crate::casemap::irc_eq`]).
    pub fn find_nick(&self, name: &str) -> Option<&Nick> {
        self.nicks.iter().find(|n| n.name == name)
    }

    /// Finds a nick by name, mutably.
    pub fn find_nick_mut(&mut self, name: &str) -> Option<&mut Nick> {
        self.nicks.iter_mut().find(|n| n.name == name)
    }

    /// Removes a nick by name, returning it if present.
    pub fn remove_nick(&mut self, name: &str) -> Option<Nick> {
        let idx = self.nicks.iter().position(|n| n.name == name)?;
        Some(self.nicks.remove(idx))
    }
}

/// Per-connection server state (spec §3.1).
#[derive(Clone, Debug)]
pub struct Server {
    /// Stable identifier (not necessarily the network name).
    pub name: String,
    /// Whether the transport socket is currently connected.
    pub is_connected: bool,
    /// Whether the current connection is over TLS.
    pub tls_connected: bool,
    /// Current nickname.
    pub nick: String,
    /// Current `user@host`, once known (from a `CHGHOST`, WHO reply, etc.).
    pub host: Option<String>,
    /// ISUPPORT `PREFIX=(modes)chars` mode letters, highest rank first.
    pub prefix_modes: String,
    /// ISUPPORT `PREFIX=(modes)chars` prefix characters, parallel to
    /// `prefix_modes` (`|prefix_modes| == |prefix_chars|`).
    pub prefix_chars: String,
    /// ISUPPORT `CHANTYPES`; default `"#&"` before the first 005 line.
    pub chantypes: String,
    /// ISUPPORT `UTF8MAPPING`.
    pub utf8mapping: Utf8Mapping,
    /// ISUPPORT `NICKLEN`; 0 means unknown.
    pub nick_max_length: usize,
    /// ISUPPORT `USERLEN`; 0 means unknown.
    pub user_max_length: usize,
    /// ISUPPORT `HOSTLEN`; 0 means unknown.
    pub host_max_length: usize,
    /// Outgoing line budget; default 512, 0 disables splitting.
    pub msg_max_length: usize,
    /// `draft/multiline` `max-bytes` value.
    pub multiline_max_bytes: usize,
    /// `draft/multiline` `max-lines` value.
    pub multiline_max_lines: usize,
    /// Enabled IRCv3 capability tokens.
    pub cap_list: HashSet<String>,
    /// Server-advertised maximum monitored-nick count; 0 means MONITOR
    /// is unsupported.
    pub monitor: usize,
    /// Joined channels, insertion order.
    pub channels: Vec<Channel>,
    /// Presence/notify engine state for this server.
    pub notify: NotifyState,
    /// `/LIST` pipeline state for this server.
    pub list: ListState,
}

impl Server {
    /// Creates a fresh, unconnected server record with the documented
    /// pre-ISUPPORT defaults.
    pub fn new(name: impl Into<String>) -> Self {
        Server {
            name: name.into(),
            is_connected: false,
            tls_connected: false,
            nick: String::new(),
            host: None,
            prefix_modes: "ov".to_string(),
            prefix_chars: "@+".to_string(),
            chantypes: crate::chan::DEFAULT_CHANTYPES.to_string(),
            utf8mapping: Utf8Mapping::default(),
            nick_max_length: 0,
            user_max_length: 0,
            host_max_length: 0,
            msg_max_length: 512,
            multiline_max_bytes: 4096,
            multiline_max_lines: 24,
            cap_list: HashSet::new(),
            monitor: 0,
            channels: Vec::new(),
            notify: NotifyState::default(),
            list: ListState::default(),
        }
    }

    /// Applies a parsed ISUPPORT (005) line's tokens, updating every
    /// derived field this crate honors (spec §6.2). When `PREFIX`
    /// changes, every nick's [`PrefixMask`] across every joined channel
    /// is atomically reallocated to track the new mode ordering (spec
    /// §3.5 invariant).
    pub fn apply_isupport(&mut self, params: &[&str]) -> Result<(), ProtocolError> {
        let isupport = Isupport::parse_params(params);

        if let Some(spec) = isupport.prefix() {
            if spec.modes.len() != spec.prefixes.len() {
                // Malformed PREFIX token; ignore rather than corrupt state
                // (spec §7: protocol violations are tolerated, not fatal).
            } else if spec.modes.len() > MAX_PREFIX_MODES {
                crate::log_fatal!(
                    modes = spec.modes.len(),
                    max = MAX_PREFIX_MODES,
                    "server advertised more PREFIX modes than this crate's bitmask can track"
                );
                return Err(ProtocolError::TooManyPrefixModes(spec.modes.len(), MAX_PREFIX_MODES));
            } else if spec.modes != self.prefix_modes {
                let old_modes = self.prefix_modes.clone();
                self.prefix_modes = spec.modes.to_string();
                self.prefix_chars = spec.prefixes.to_string();
                for channel in &mut self.channels {
                    for nick in &mut channel.nicks {
                        nick.prefixes = nick.prefixes.reallocate(&old_modes, &self.prefix_modes);
                    }
                }
            }
        }

        if let Some(chantypes) = isupport.chantypes() {
            self.chantypes = chantypes.to_string();
        }
        if let Some(mapping) = isupport.get("UTF8MAPPING").flatten() {
            self.utf8mapping = Utf8Mapping::parse(mapping);
        }
        if let Some(Some(v)) = isupport.get("NICKLEN") {
            self.nick_max_length = v.parse().unwrap_or(self.nick_max_length);
        }
        if let Some(Some(v)) = isupport.get("USERLEN") {
            self.user_max_length = v.parse().unwrap_or(self.user_max_length);
        }
        if let Some(Some(v)) = isupport.get("HOSTLEN") {
            self.host_max_length = v.parse().unwrap_or(self.host_max_length);
        }
        if let Some(Some(v)) = isupport.get("MONITOR") {
            self.monitor = v.parse().unwrap_or(self.monitor);
        }

        Ok(())
    }

    /// Finds a joined channel by name (case-sensitive).
    pub fn find_channel(&self, name: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.name == name)
    }

    /// Finds a joined channel by name, mutably.
    pub fn find_channel_mut(&mut self, name: &str) -> Option<&mut Channel> {
        self.channels.iter_mut().find(|c| c.name == name)
    }

    /// Removes a joined channel by name, returning it if present (e.g.
    /// on a local PART or KICK).
    pub fn remove_channel(&mut self, name: &str) -> Option<Channel> {
        let idx = self.channels.iter().position(|c| c.name == name)?;
        Some(self.channels.remove(idx))
    }

    /// A [`crate::split::SplitContext`] derived from this server's current
    /// ISUPPORT- and capability-driven limits, ready to pass to
    /// [`crate::split::split`].
    pub fn split_context(&self) -> crate::split::SplitContext {
        crate::split::SplitContext {
            msg_max_length: self.msg_max_length,
            nick_max: if self.nick_max_length > 0 { self.nick_max_length } else { 30 },
            user_max: if self.user_max_length > 0 { self.user_max_length } else { 10 },
            host_max: if self.host_max_length > 0 { self.host_max_length } else { 63 },
            batch_enabled: self.cap_list.contains("batch"),
            multiline_enabled: self.cap_list.contains("draft/multiline"),
            multiline_max_bytes: self.multiline_max_bytes,
            multiline_max_lines: self.multiline_max_lines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_isupport_updates_prefix_and_chantypes() {
        let mut server = Server::new("libera");
        server.apply_isupport(&["nick", "PREFIX=(qaohv)~&@%+", "CHANTYPES=#&!"]).unwrap();
        assert_eq!(server.prefix_modes, "qaohv");
        assert_eq!(server.prefix_chars, "~&@%+");
        assert_eq!(server.chantypes, "#&!");
    }

    #[test]
    fn apply_isupport_reallocates_existing_nick_prefixes() {
        let mut server = Server::new("libera");
        let mut chan = Channel::new("#rust");
        let mut nick = Nick::new("alice");
        nick.prefixes = nick.prefixes.set(0); // 'o' under the default "ov"
        chan.nicks.push(nick);
        server.channels.push(chan);

        server.apply_isupport(&["nick", "PREFIX=(ov)@+"]).unwrap();
        // modes unchanged in content, so no remap is needed, but the code
        // path still runs; verify the bit survives a no-op reallocation.
        assert!(server.channels[0].nicks[0].prefixes.is_set(0));

        server.apply_isupport(&["nick", "PREFIX=(vo)+@"]).unwrap();
        // 'o' moved from bit 0 to bit 1; the nick's operator status must
        // follow it rather than silently becoming voice.
        assert!(server.channels[0].nicks[0].prefixes.is_set(1));
        assert!(!server.channels[0].nicks[0].prefixes.is_set(0));
    }

    #[test]
    fn too_many_prefix_modes_is_rejected() {
        let mut server = Server::new("test");
        let modes: String = "a".repeat(MAX_PREFIX_MODES + 1);
        let prefixes: String = "!".repeat(MAX_PREFIX_MODES + 1);
        let token = format!("PREFIX=({modes}){prefixes}");
        let err = server.apply_isupport(&["nick", &token]).unwrap_err();
        assert!(matches!(err, ProtocolError::TooManyPrefixModes(n, MAX_PREFIX_MODES) if n == MAX_PREFIX_MODES + 1));
    }
}
