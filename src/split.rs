//! Outgoing message framing (spec §4.2).
//!
//! Splits one logical outgoing message into one or more wire-ready
//! frames that each fit the server's advertised line budget, using a
//! per-command strategy table grounded on WeeChat's `irc-message.c`
//! splitting rules.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use crate::command::Command;
use crate::response::Response;
use crate::util::truncate_utf8_safe;

/// Parameters of the splitting budget, independent of any particular
/// server connection so this module stays a pure function of its input
/// (matching the teacher's preference for free functions over borrowed
/// state, see `caps::parse_request`).
#[derive(Clone, Copy, Debug)]
pub struct SplitContext {
    /// Maximum total line length including CRLF; 0 disables splitting.
    pub msg_max_length: usize,
    /// Assumed maximum nick length, for the round-trip prefix reservation.
    pub nick_max: usize,
    /// Assumed maximum username length, for the round-trip prefix reservation.
    pub user_max: usize,
    /// Assumed maximum hostname length, for the round-trip prefix reservation.
    pub host_max: usize,
    /// Whether the `batch` capability is negotiated.
    pub batch_enabled: bool,
    /// Whether `draft/multiline` is negotiated.
    pub multiline_enabled: bool,
    /// `draft/multiline`'s `max-bytes` value.
    pub multiline_max_bytes: usize,
    /// `draft/multiline`'s `max-lines` value.
    pub multiline_max_lines: usize,
}

impl Default for SplitContext {
    fn default() -> Self {
        SplitContext {
            msg_max_length: 512,
            nick_max: 30,
            user_max: 10,
            host_max: 63,
            batch_enabled: false,
            multiline_enabled: false,
            multiline_max_bytes: 4096,
            multiline_max_lines: 24,
        }
    }
}

impl SplitContext {
    /// The per-frame byte budget (spec §4.2 "Budget"): `msg_max_length -
    /// 2` for CRLF, minus the conservative reservation for the
    /// `:nick!user@host ` prefix the server will prepend, when no tag
    /// block or source is present on the outgoing line. `msg_max_length
    /// == 0` disables splitting entirely.
    fn budget(&self) -> usize {
        if self.msg_max_length == 0 {
            return usize::MAX;
        }
        let base = self.msg_max_length.saturating_sub(2);
        let reserve = 1 + self.nick_max + 1 + self.user_max + 1 + self.host_max + 1;
        base.saturating_sub(reserve)
    }
}

/// Result of splitting one outgoing message.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SplitOutput {
    /// Ordered, wire-ready frames (no trailing CRLF; the transport appends).
    pub frames: Vec<String>,
    /// For multiline sends, one entry per closed batch: its lines
    /// rejoined with `\n`, for local echo.
    pub multiline_echo: Vec<String>,
}

impl SplitOutput {
    fn single(frame: String) -> Self {
        SplitOutput {
            frames: vec![frame],
            multiline_echo: Vec::new(),
        }
    }
}

static MULTILINE_COUNTER: AtomicU64 = AtomicU64::new(0);
/// Process-local seed mixed into every generated batch reference so two
/// processes started at the same instant don't collide. Reseeded lazily
/// from `getrandom` when the `scram` feature is enabled (it is already a
/// dependency for SCRAM nonces); otherwise a fixed build-time constant.
static SEED: AtomicU32 = AtomicU32::new(0);

fn seed() -> u32 {
    let s = SEED.load(Ordering::Relaxed);
    if s != 0 {
        return s;
    }
    let fresh = fresh_seed();
    SEED.store(fresh, Ordering::Relaxed);
    fresh
}

#[cfg(feature = "scram")]
fn fresh_seed() -> u32 {
    let mut buf = [0u8; 4];
    if getrandom::getrandom(&mut buf).is_ok() {
        u32::from_le_bytes(buf).max(1)
    } else {
        0x5bd1_e995
    }
}

#[cfg(not(feature = "scram"))]
fn fresh_seed() -> u32 {
    0x5bd1_e995
}

/// Generates a fresh opaque 16-lowercase-hex-character multiline batch
/// reference (spec §4.2 step 1). Deliberately distinct from
/// [`crate::ircv3::generate_batch_ref`], which emits a variable-length
/// `timestamp-counter` string unsuitable where a fixed-width reference is
/// required (see DESIGN.md, "open question: batch ref format").
pub fn generate_multiline_batch_ref() -> String {
    let counter = MULTILINE_COUNTER.fetch_add(1, Ordering::Relaxed);
    let mixed = counter ^ (u64::from(seed()) << 16) ^ u64::from(seed());
    format!("{mixed:016x}")
}

/// Splits `command`'s wire form into one or more frames obeying `ctx`'s
/// budget, using the per-command strategy table (spec §4.2).
pub fn split(ctx: &SplitContext, command: &Command) -> SplitOutput {
    let budget = ctx.budget();

    match command {
        Command::Raw(name, args) if name.eq_ignore_ascii_case("AUTHENTICATE") => {
            split_authenticate(args.first().map(String::as_str).unwrap_or(""))
        }
        Command::ISON(nicks) => {
            split_space_list("ISON", &nicks.iter().map(String::as_str).collect::<Vec<_>>(), budget, true)
        }
        Command::WALLOPS(text) => split_space_list("WALLOPS", &[text.as_str()], budget, true),
        Command::Raw(name, args) if name.eq_ignore_ascii_case("MONITOR") => split_monitor(args, budget),
        Command::JOIN(chanlist, keys, _) => split_join(chanlist, keys.as_deref(), budget),
        Command::PRIVMSG(target, text) => split_privmsg_notice("PRIVMSG", target, text, ctx, budget),
        Command::NOTICE(target, text) => split_privmsg_notice("NOTICE", target, text, ctx, budget),
        Command::Response(Response::RPL_ISUPPORT, args) => split_isupport(args, budget),
        Command::Response(Response::RPL_NAMREPLY, args) => split_names(args, budget),
        other => SplitOutput::single(other.to_string()),
    }
}

/// `AUTHENTICATE` splits into fixed 400-byte chunks; if the final chunk is
/// exactly 400 bytes, a lone `AUTHENTICATE +` sentinel is appended so the
/// peer knows the payload ended on a chunk boundary.
fn split_authenticate(payload: &str) -> SplitOutput {
    const CHUNK: usize = 400;
    if payload.is_empty() {
        return SplitOutput::single("AUTHENTICATE +".to_string());
    }

    let mut frames = Vec::new();
    let mut rest = payload;
    let mut last_was_full = false;
    while !rest.is_empty() {
        let chunk = truncate_utf8_safe(rest, CHUNK);
        frames.push(format!("AUTHENTICATE {chunk}"));
        last_was_full = chunk.len() == CHUNK;
        rest = &rest[chunk.len()..];
    }
    if last_was_full {
        frames.push("AUTHENTICATE +".to_string());
    }
    SplitOutput {
        frames,
        multiline_echo: Vec::new(),
    }
}

/// `ISON`/`WALLOPS`: space-split on the last parameter, re-emitting the
/// colon prefix on each frame.
fn split_space_list(verb: &str, items: &[&str], budget: usize, colon: bool) -> SplitOutput {
    let frames = pack_items(items, ' ', budget, |chunk| {
        if colon {
            format!("{verb} :{chunk}")
        } else {
            format!("{verb} {chunk}")
        }
    });
    SplitOutput {
        frames,
        multiline_echo: Vec::new(),
    }
}

/// `MONITOR +`/`-`: comma-split on the last parameter, preserving the
/// sign prefix on each frame.
fn split_monitor(args: &[String], budget: usize) -> SplitOutput {
    let Some(sign) = args.first() else {
        return SplitOutput::single("MONITOR".to_string());
    };
    if sign == "C" || sign == "L" || sign == "S" {
        return SplitOutput::single(format!("MONITOR {sign}"));
    }
    let nicks: Vec<&str> = args.get(1).map(|s| s.split(',').collect()).unwrap_or_default();
    let frames = pack_items(&nicks, ',', budget, |chunk| format!("MONITOR {sign} {chunk}"));
    SplitOutput {
        frames,
        multiline_echo: Vec::new(),
    }
}

/// `JOIN`: comma-split on the channel list, keeping each channel paired
/// with its key so a channel is never separated from its key across
/// frames (spec §8.2 scenario 2, property P3).
fn split_join(chanlist: &str, keys: Option<&str>, budget: usize) -> SplitOutput {
    let channels: Vec<&str> = chanlist.split(',').collect();
    let mut keys_iter = keys.map(|k| k.split(',')).into_iter().flatten();
    let pairs: Vec<(&str, Option<&str>)> = channels
        .into_iter()
        .map(|c| (c, keys_iter.next().filter(|k| !k.is_empty())))
        .collect();

    let mut frames = Vec::new();
    let mut current_chans: Vec<&str> = Vec::new();
    let mut current_keys: Vec<&str> = Vec::new();
    let mut have_keys = false;

    let flush = |chans: &mut Vec<&str>, ks: &mut Vec<&str>, have_keys: bool, frames: &mut Vec<String>| {
        if chans.is_empty() {
            return;
        }
        if have_keys && !ks.is_empty() {
            frames.push(format!("JOIN {} {}", chans.join(","), ks.join(",")));
        } else {
            frames.push(format!("JOIN {}", chans.join(",")));
        }
        chans.clear();
        ks.clear();
    };

    for (chan, key) in pairs {
        let mut trial_chans = current_chans.clone();
        trial_chans.push(chan);
        let mut trial_keys = current_keys.clone();
        if let Some(k) = key {
            trial_keys.push(k);
        }
        let trial_have_keys = have_keys || key.is_some();
        let candidate = if trial_have_keys && !trial_keys.is_empty() {
            format!("JOIN {} {}", trial_chans.join(","), trial_keys.join(","))
        } else {
            format!("JOIN {}", trial_chans.join(","))
        };

        if candidate.len() > budget && !current_chans.is_empty() {
            flush(&mut current_chans, &mut current_keys, have_keys, &mut frames);
            have_keys = key.is_some();
            current_chans.push(chan);
            if let Some(k) = key {
                current_keys.push(k);
            }
        } else {
            current_chans = trial_chans;
            current_keys = trial_keys;
            have_keys = trial_have_keys;
        }
    }
    flush(&mut current_chans, &mut current_keys, have_keys, &mut frames);

    SplitOutput {
        frames,
        multiline_echo: Vec::new(),
    }
}

/// `PRIVMSG`/`NOTICE`: space-split, CTCP-aware, with multiline BATCH
/// support when negotiated.
fn split_privmsg_notice(
    verb: &str,
    target: &str,
    text: &str,
    ctx: &SplitContext,
    budget: usize,
) -> SplitOutput {
    if text.is_empty() {
        // Empty text is dropped silently (server would reject).
        return SplitOutput::default();
    }

    if let Some(ctcp) = crate::ctcp::Ctcp::parse(text) {
        let header = ctcp.header_prefix();
        let prefix = format!("{verb} {target} :{header}");
        let body = ctcp.params.unwrap_or("");
        let per_frame_budget = budget.saturating_sub(prefix.len() + 1); // +1 for trailing \x01
        let frames = pack_text(body, per_frame_budget, |chunk| format!("{prefix}{chunk}\x01"));
        return SplitOutput {
            frames,
            multiline_echo: Vec::new(),
        };
    }

    if ctx.batch_enabled && ctx.multiline_enabled && text.contains('\n') {
        return split_multiline(verb, target, text, ctx, budget);
    }

    // Lines separated by `\n` are split per line (non-multiline path).
    let mut frames = Vec::new();
    for line in text.split('\n') {
        let prefix = format!("{verb} {target} :");
        let per_frame_budget = budget.saturating_sub(prefix.len());
        frames.extend(pack_text(line, per_frame_budget, |chunk| format!("{prefix}{chunk}")));
    }
    SplitOutput {
        frames,
        multiline_echo: Vec::new(),
    }
}

/// Wraps a multi-line `PRIVMSG`/`NOTICE` payload in one or more
/// `draft/multiline` BATCHes (spec §4.2 "Multiline").
fn split_multiline(verb: &str, target: &str, text: &str, ctx: &SplitContext, budget: usize) -> SplitOutput {
    let mut frames = Vec::new();
    let mut echoes = Vec::new();

    let lines: Vec<&str> = text.split('\n').collect();
    let mut idx = 0;
    while idx < lines.len() {
        let batch_ref = generate_multiline_batch_ref();
        frames.push(format!("BATCH +{batch_ref} draft/multiline {target}"));

        let mut batch_lines = Vec::new();
        let mut cumulative_bytes = 0usize;
        let mut cumulative_lines = 0usize;

        while idx < lines.len() {
            let line = lines[idx];
            if cumulative_lines > 0
                && (cumulative_lines + 1 > ctx.multiline_max_lines
                    || cumulative_bytes + line.len() > ctx.multiline_max_bytes)
            {
                break;
            }

            let prefix = format!("@batch={batch_ref} {verb} {target} :");
            let per_frame_budget = budget.saturating_sub(prefix.len());
            for chunk in pack_text(line, per_frame_budget, |c| c.to_string()) {
                frames.push(format!("{prefix}{chunk}"));
            }
            batch_lines.push(line);
            cumulative_bytes += line.len();
            cumulative_lines += 1;
            idx += 1;
        }

        frames.push(format!("BATCH -{batch_ref}"));
        echoes.push(batch_lines.join("\n"));
    }

    SplitOutput {
        frames,
        multiline_echo: echoes,
    }
}

/// `005` (ISUPPORT): space-split, recognizing and preserving the trailing
/// ` :human text` suffix.
fn split_isupport(args: &[String], budget: usize) -> SplitOutput {
    if args.is_empty() {
        return SplitOutput::single("005".to_string());
    }
    let (nick, rest) = args.split_first().unwrap();
    let (human, tokens) = match rest.split_last() {
        Some((last, init)) if looks_like_human_text(last) => (Some(last.as_str()), init),
        _ => (None, rest),
    };
    let token_refs: Vec<&str> = tokens.iter().map(String::as_str).collect();
    let suffix = human.map(|h| format!(" :{h}")).unwrap_or_default();
    let prefix = format!("005 {nick} ");
    let per_frame_budget = budget.saturating_sub(prefix.len() + suffix.len());
    let frames = pack_items(&token_refs, ' ', per_frame_budget, |chunk| format!("{prefix}{chunk}{suffix}"));
    SplitOutput {
        frames,
        multiline_echo: Vec::new(),
    }
}

fn looks_like_human_text(s: &str) -> bool {
    s.contains(' ') || !s.contains('=')
}

/// `353` (NAMES reply): space-split on the nick list, preserving the
/// leading `nick = #channel` or `nick * #channel` target header.
fn split_names(args: &[String], budget: usize) -> SplitOutput {
    if args.len() < 4 {
        return SplitOutput::single(format!("353 {}", args.join(" ")));
    }
    let header = format!("353 {} {} {} :", args[0], args[1], args[2]);
    let nicks: Vec<&str> = args[3].split(' ').collect();
    let per_frame_budget = budget.saturating_sub(header.len());
    let frames = pack_items(&nicks, ' ', per_frame_budget, |chunk| format!("{header}{chunk}"));
    SplitOutput {
        frames,
        multiline_echo: Vec::new(),
    }
}

/// Packs `items` into as few `delimiter`-joined chunks as fit `budget`
/// bytes (after `wrap` applies any fixed prefix/suffix), never splitting
/// an individual item.
fn pack_items(items: &[&str], delimiter: char, budget: usize, wrap: impl Fn(&str) -> String) -> Vec<String> {
    if items.is_empty() {
        return vec![wrap("")];
    }

    let mut frames = Vec::new();
    let mut current = String::new();

    for item in items {
        let candidate = if current.is_empty() {
            item.to_string()
        } else {
            format!("{current}{delimiter}{item}")
        };
        if wrap(&candidate).len() > budget && !current.is_empty() {
            frames.push(wrap(&current));
            current = item.to_string();
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() || frames.is_empty() {
        frames.push(wrap(&current));
    }
    frames
}

/// Packs `text` into chunks by walking codepoints and cutting at the
/// last space within budget, falling back to a hard cut at the budget
/// boundary when no space exists, never inside a UTF-8 scalar (spec §4.2
/// "Split algorithm").
fn pack_text(text: &str, budget: usize, wrap: impl Fn(&str) -> String) -> Vec<String> {
    if text.is_empty() {
        return vec![wrap("")];
    }
    if budget == usize::MAX || text.len() <= budget {
        return vec![wrap(text)];
    }

    let mut frames = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        if rest.len() <= budget {
            frames.push(wrap(rest));
            break;
        }
        let window = &rest[..budget.min(rest.len())];
        let cut = window.rfind(' ').unwrap_or(budget);
        let cut = floor_char_boundary(rest, cut.max(1));
        frames.push(wrap(&rest[..cut]));
        rest = rest[cut..].trim_start_matches(' ');
    }
    frames
}

/// Rounds `idx` down to the nearest UTF-8 character boundary in `s`.
fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    if idx >= s.len() {
        return s.len();
    }
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_split_keeps_channel_with_key() {
        let chanlist: Vec<String> = (1..=47).map(|n| format!("#c{n}")).collect();
        let chanlist = chanlist.join(",");
        let keys = "key1,key2,key3";
        let out = split_join(&chanlist, Some(keys), 512 - 2 - 67);
        assert!(out.frames.len() >= 2);
        let combined = out.frames.join(" ");
        assert!(combined.contains("#c45") && combined.contains("key3") || out.frames.iter().any(|f| f.contains("#c3") && f.contains("key3")));
    }

    #[test]
    fn ctcp_action_split_preserves_header_and_terminator() {
        let body = "a".repeat(600);
        let text = format!("\x01ACTION {body}\x01");
        let out = split_privmsg_notice("PRIVMSG", "#channel", &text, &SplitContext::default(), 400);
        assert!(out.frames.len() >= 2);
        for frame in &out.frames {
            assert!(frame.starts_with("PRIVMSG #channel :\x01ACTION "));
            assert!(frame.ends_with('\x01'));
        }
    }

    #[test]
    fn multiline_emits_batch_open_body_close() {
        let ctx = SplitContext {
            batch_enabled: true,
            multiline_enabled: true,
            ..SplitContext::default()
        };
        let out = split_privmsg_notice("PRIVMSG", "#channel", "test\n\nline 3", &ctx, 500);
        assert_eq!(out.frames.len(), 5);
        assert!(out.frames[0].starts_with("BATCH +"));
        assert!(out.frames[0].contains("draft/multiline #channel"));
        assert!(out.frames[1].contains("PRIVMSG #channel :test"));
        assert!(out.frames[2].contains("PRIVMSG #channel :"));
        assert!(out.frames[3].contains("PRIVMSG #channel :line 3"));
        assert!(out.frames[4].starts_with("BATCH -"));
        assert_eq!(out.multiline_echo, vec!["test\n\nline 3".to_string()]);
    }

    #[test]
    fn empty_privmsg_text_dropped() {
        let out = split_privmsg_notice("PRIVMSG", "#channel", "", &SplitContext::default(), 500);
        assert!(out.frames.is_empty());
    }

    #[test]
    fn authenticate_appends_sentinel_on_exact_chunk() {
        let payload = "a".repeat(400);
        let out = split_authenticate(&payload);
        assert_eq!(out.frames.len(), 2);
        assert_eq!(out.frames[1], "AUTHENTICATE +");
    }

    #[test]
    fn batch_ref_is_16_hex_chars() {
        let r = generate_multiline_batch_ref();
        assert_eq!(r.len(), 16);
        assert!(r.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
