//! Inbound command decoder, handshake/init auth, and sync-flag tracking
//! for the relay protocol (spec §4.6 "Decoder contract" / "Auth" /
//! "Sync flags"). Grounded on `relay-weechat-protocol.c`'s command
//! dispatch table and `relay_weechat_protocol_is_sync`.

use std::collections::HashMap;

use super::RelayError;

/// Minimal, dependency-free bitflags macro in the spirit of the
/// teacher's hand-rolled `RawFlags` newtype rather than pulling in the
/// `bitflags` crate for a 4-bit set.
macro_rules! bitflags_lite {
    (
        $(#[$outer:meta])*
        pub struct $name:ident: $ty:ty {
            $(const $variant:ident = $value:expr;)*
        }
    ) => {
        $(#[$outer])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
        pub struct $name($ty);

        impl $name {
            $(pub const $variant: $name = $name($value);)*

            /// The empty set.
            pub fn empty() -> Self {
                $name(0)
            }

            /// Whether `self` contains every bit set in `other`.
            pub fn contains(self, other: Self) -> bool {
                (self.0 & other.0) == other.0
            }

            /// Whether no bits are set.
            pub fn is_empty(self) -> bool {
                self.0 == 0
            }
        }

        impl std::ops::BitOr for $name {
            type Output = $name;
            fn bitor(self, rhs: $name) -> $name {
                $name(self.0 | rhs.0)
            }
        }

        impl std::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: $name) {
                self.0 |= rhs.0;
            }
        }

        impl std::ops::Not for $name {
            type Output = $name;
            fn not(self) -> $name {
                $name(!self.0)
            }
        }

        impl std::ops::BitAndAssign for $name {
            fn bitand_assign(&mut self, rhs: $name) {
                self.0 &= rhs.0;
            }
        }
    };
}

/// One parsed inbound command, its optional request id, and its
/// whitespace-delimited argument tail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientCommand {
    /// The `(id)` tag, if the client supplied one.
    pub id: Option<String>,
    /// The command verb, lowercased.
    pub verb: String,
    /// Raw argument text following the verb (not yet tokenized further,
    /// since several verbs — `input`, `hdata` — have their own internal
    /// grammar).
    pub args: String,
}

const KNOWN_VERBS: &[(&str, usize)] = &[
    ("handshake", 0),
    ("init", 0),
    ("hdata", 1),
    ("info", 1),
    ("infolist", 1),
    ("nicklist", 0),
    ("input", 1),
    ("completion", 0),
    ("sync", 0),
    ("desync", 0),
    ("test", 0),
    ("ping", 0),
    ("quit", 0),
];

fn min_argc(verb: &str) -> Option<usize> {
    KNOWN_VERBS.iter().find(|(name, _)| *name == verb).map(|(_, argc)| *argc)
}

/// Parses one decoded client line into a [`ClientCommand`]. Returns
/// `Ok(None)` for an unrecognized verb (dropped silently per the
/// decoder contract, not a protocol error) or a blank line.
pub fn parse_command(line: &str) -> Result<Option<ClientCommand>, RelayError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        return Ok(None);
    }

    let (id, rest) = if let Some(stripped) = line.strip_prefix('(') {
        match stripped.find(')') {
            Some(end) => (Some(stripped[..end].to_string()), stripped[end + 1..].trim_start()),
            None => return Err(RelayError::Malformed("unterminated (id) tag".to_string())),
        }
    } else {
        (None, line)
    };

    let (verb, args) = match rest.split_once(char::is_whitespace) {
        Some((verb, args)) => (verb, args.trim_start()),
        None => (rest, ""),
    };
    let verb = verb.to_ascii_lowercase();

    let Some(min) = min_argc(&verb) else {
        return Ok(None);
    };
    let argc = if args.is_empty() { 0 } else { args.split_whitespace().count() };
    if argc < min {
        return Err(RelayError::Malformed(format!(
            "{verb} requires at least {min} argument(s), got {argc}"
        )));
    }

    Ok(Some(ClientCommand { id, verb, args: args.to_string() }))
}

/// Parsed `handshake` arguments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HandshakeParams {
    /// Hash algorithms the client offers, strongest-preference order as
    /// the client sent them (server picks the strongest it also knows).
    pub password_hash_algo: Vec<String>,
    /// Compression schemes the client offers, in preference order.
    pub compression: Vec<String>,
    /// Whether the client wants command-argument escaping.
    pub escape_commands: bool,
}

/// Parsed `init` arguments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InitParams {
    /// Cleartext password, if `password=` was sent.
    pub password: Option<String>,
    /// `(algo, params, hex_digest)` from `password_hash=algo[:params]:hex`.
    pub password_hash: Option<(String, Option<String>, String)>,
    /// TOTP code, if sent.
    pub totp: Option<String>,
}

fn parse_kv(args: &str) -> HashMap<String, String> {
    args.split(',')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}

/// Parses a `handshake` command's argument string.
pub fn parse_handshake(args: &str) -> HandshakeParams {
    let kv = parse_kv(args);
    HandshakeParams {
        password_hash_algo: kv
            .get("password_hash_algo")
            .map(|v| v.split(':').map(str::to_string).collect())
            .unwrap_or_default(),
        compression: kv
            .get("compression")
            .map(|v| v.split(':').map(str::to_string).collect())
            .unwrap_or_default(),
        escape_commands: kv.get("escape_commands").map(|v| v == "on").unwrap_or(false),
    }
}

/// Parses an `init` command's argument string.
pub fn parse_init(args: &str) -> InitParams {
    let kv = parse_kv(args);
    let password_hash = kv.get("password_hash").and_then(|v| {
        let mut parts = v.rsplitn(2, ':');
        let hex = parts.next()?.to_string();
        let head = parts.next()?;
        let mut head_parts = head.splitn(2, ':');
        let algo = head_parts.next()?.to_string();
        let params = head_parts.next().map(str::to_string);
        Some((algo, params, hex))
    });
    InitParams {
        password: kv.get("password").cloned(),
        password_hash,
        totp: kv.get("totp").cloned(),
    }
}

/// Result of validating an `init` against a server-side secret.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Password (and TOTP, if required) matched.
    Success,
    /// Password or hash did not match.
    BadPassword,
    /// Password matched but a required TOTP was missing or wrong.
    BadTotp,
}

/// Validates an `init` against the expected cleartext `password` and an
/// optional expected `totp`. Hash-based auth is validated by the caller
/// before this is reached (it depends on the `scram`/hashing backend
/// negotiated during handshake); this covers the plain-password path.
pub fn check_password(init: &InitParams, expected_password: &str, expected_totp: Option<&str>) -> AuthOutcome {
    match init.password.as_deref() {
        Some(p) if p == expected_password => {}
        _ => return AuthOutcome::BadPassword,
    }
    match expected_totp {
        None => AuthOutcome::Success,
        Some(expected) => {
            if init.totp.as_deref() == Some(expected) {
                AuthOutcome::Success
            } else {
                AuthOutcome::BadTotp
            }
        }
    }
}

bitflags_lite! {
    /// A single buffer's (or `"*"`'s) sync subscription bits (spec §4.6
    /// "Sync flags").
    pub struct SyncFlags: u8 {
        const BUFFER = 1 << 0;
        const NICKLIST = 1 << 1;
        const BUFFERS = 1 << 2;
        const UPGRADE = 1 << 3;
    }
}

/// Per-client map from buffer full-name (or `"*"` for all buffers) to
/// its subscribed [`SyncFlags`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncTarget {
    map: HashMap<String, SyncFlags>,
}

impl SyncTarget {
    /// An empty subscription set.
    pub fn new() -> Self {
        SyncTarget::default()
    }

    /// Applies a `sync [buffer[,buffer...]] [flags]` command, OR-ing the
    /// named flags into each named buffer (or `"*"` if no buffer is
    /// given). An empty flag list means the default `{buffer, nicklist}`
    /// per the original's `sync` verb behavior.
    pub fn sync(&mut self, args: &str) {
        let (targets, flags) = parse_sync_args(args);
        for target in targets {
            let entry = self.map.entry(target).or_insert(SyncFlags::empty());
            *entry |= flags;
        }
    }

    /// Applies a `desync` command, AND-NOT-ing the named flags out of
    /// each named buffer.
    pub fn desync(&mut self, args: &str) {
        let (targets, flags) = parse_sync_args(args);
        for target in targets {
            if let Some(entry) = self.map.get_mut(&target) {
                *entry &= !flags;
                if entry.is_empty() {
                    self.map.remove(&target);
                }
            }
        }
    }

    /// Whether `buffer` is currently subscribed to `flag`, considering
    /// both its own entry and the wildcard `"*"` entry.
    pub fn is_synced(&self, buffer: &str, flag: SyncFlags) -> bool {
        self.map.get("*").is_some_and(|f| f.contains(flag))
            || self.map.get(buffer).is_some_and(|f| f.contains(flag))
    }
}

fn parse_sync_args(args: &str) -> (Vec<String>, SyncFlags) {
    let mut parts = args.split_whitespace();
    let targets = match parts.next() {
        Some(list) => list.split(',').map(str::to_string).collect(),
        None => vec!["*".to_string()],
    };
    let flags = match parts.next() {
        Some(list) => list
            .split(',')
            .fold(SyncFlags::empty(), |acc, name| acc | flag_from_name(name)),
        None => SyncFlags::BUFFER | SyncFlags::NICKLIST,
    };
    (targets, flags)
}

fn flag_from_name(name: &str) -> SyncFlags {
    match name {
        "buffer" => SyncFlags::BUFFER,
        "nicklist" => SyncFlags::NICKLIST,
        "buffers" => SyncFlags::BUFFERS,
        "upgrade" => SyncFlags::UPGRADE,
        _ => SyncFlags::empty(),
    }
}

/// Builds the verbatim-echo `pong` frame payload for a `ping` command
/// (spec §4.6 supplemental: "elicits one pong object-stream frame
/// echoing the arguments verbatim, with no `(id)` tag").
pub fn pong_payload(ping_args: &str) -> Vec<u8> {
    let mut out = Vec::new();
    // payload id string: empty, since a pong frame carries no (id) tag.
    out.extend_from_slice(&0i32.to_be_bytes());
    super::object::Object::Str(Some(ping_args.to_string())).write_tagged(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_id_tag_verb_and_args() {
        let cmd = parse_command("(123) input buffer text hello").unwrap().unwrap();
        assert_eq!(cmd.id.as_deref(), Some("123"));
        assert_eq!(cmd.verb, "input");
        assert_eq!(cmd.args, "buffer text hello");
    }

    #[test]
    fn parses_command_without_id() {
        let cmd = parse_command("ping").unwrap().unwrap();
        assert_eq!(cmd.id, None);
        assert_eq!(cmd.verb, "ping");
        assert_eq!(cmd.args, "");
    }

    #[test]
    fn unknown_verb_is_dropped_not_errored() {
        assert_eq!(parse_command("bogus foo").unwrap(), None);
    }

    #[test]
    fn verb_below_min_argc_is_malformed() {
        let err = parse_command("input").unwrap_err();
        assert!(matches!(err, RelayError::Malformed(_)));
    }

    #[test]
    fn blank_line_yields_none() {
        assert_eq!(parse_command("").unwrap(), None);
        assert_eq!(parse_command("\r\n").unwrap(), None);
    }

    #[test]
    fn handshake_params_parse_colon_lists() {
        let params = parse_handshake("password_hash_algo=plain:sha256,compression=zlib,escape_commands=on");
        assert_eq!(params.password_hash_algo, vec!["plain", "sha256"]);
        assert_eq!(params.compression, vec!["zlib"]);
        assert!(params.escape_commands);
    }

    #[test]
    fn init_params_parse_password_hash_triplet() {
        let init = parse_init("password_hash=sha256:iterations=100:deadbeef,totp=123456");
        assert_eq!(init.totp.as_deref(), Some("123456"));
        let (algo, params, hex) = init.password_hash.unwrap();
        assert_eq!(algo, "sha256");
        assert_eq!(params.as_deref(), Some("iterations=100"));
        assert_eq!(hex, "deadbeef");
    }

    #[test]
    fn check_password_matches_and_rejects() {
        let init = InitParams { password: Some("secret".to_string()), ..Default::default() };
        assert_eq!(check_password(&init, "secret", None), AuthOutcome::Success);
        assert_eq!(check_password(&init, "other", None), AuthOutcome::BadPassword);
    }

    #[test]
    fn check_password_requires_totp_when_configured() {
        let init = InitParams { password: Some("secret".to_string()), totp: None, ..Default::default() };
        assert_eq!(check_password(&init, "secret", Some("000000")), AuthOutcome::BadTotp);
    }

    #[test]
    fn sync_defaults_to_buffer_and_nicklist_for_wildcard() {
        let mut sync = SyncTarget::new();
        sync.sync("");
        assert!(sync.is_synced("#chan", SyncFlags::BUFFER));
        assert!(sync.is_synced("#chan", SyncFlags::NICKLIST));
        assert!(!sync.is_synced("#chan", SyncFlags::BUFFERS));
    }

    #[test]
    fn desync_clears_named_flags() {
        let mut sync = SyncTarget::new();
        sync.sync("#chan buffer,nicklist");
        sync.desync("#chan nicklist");
        assert!(sync.is_synced("#chan", SyncFlags::BUFFER));
        assert!(!sync.is_synced("#chan", SyncFlags::NICKLIST));
    }

    #[test]
    fn pong_echoes_ping_arguments_verbatim() {
        let payload = pong_payload("1234567890");
        assert!(payload.len() > 4);
    }
}
