//! mIRC/ANSI formatting codec (spec §4.3).
//!
//! Three independent directions share the same palette data:
//! - [`decode`] turns raw IRC-formatted bytes into a [`Vec<ColorEvent>`],
//!   resolving mIRC/hex color sentinels against the 99-entry palette and
//!   any caller-supplied remap tables.
//! - [`encode`] is the inverse, turning `ColorEvent`s back into an
//!   IRC-formatted `String`.
//! - [`decode_ansi`] turns a terminal-style ANSI/CSI-colored string into
//!   the same `ColorEvent` stream, so renderers that only understand one
//!   intermediate form can consume traffic that started as either mIRC or
//!   ANSI.
//!
//! Decoding to a structured event stream rather than directly to another
//! string keeps [`decode`]/[`encode`] exact inverses of each other (the
//! P5 property), whereas the teacher's existing [`FormattedStringExt`]
//! strip-only helpers remain for callers that just want plain text.

use std::borrow::Cow;
use std::collections::HashMap;

/// Bold toggle.
pub const BOLD: u8 = 0x02;
/// mIRC color sentinel.
pub const COLOR: u8 = 0x03;
/// 24-bit hex color sentinel.
pub const HEX_COLOR: u8 = 0x04;
/// Reset all attributes and colors.
pub const RESET: u8 = 0x0F;
/// Fixed-width font toggle. Consumed, never re-emitted downstream.
pub const FIXED_WIDTH: u8 = 0x11;
/// Reverse/inverse video toggle.
pub const REVERSE: u8 = 0x16;
/// Italic toggle.
pub const ITALIC: u8 = 0x1D;
/// Underline toggle.
pub const UNDERLINE: u8 = 0x1F;

/// IRC format control characters recognized by the plain strip helpers.
const FORMAT_CHARS: &[char] = &['\x02', '\x03', '\x0F', '\x16', '\x1F'];

/// Terminal color index (0-15) to mIRC palette index, grounded on
/// `irc_color_term2irc` in `irc-color.c`. Shared by the ANSI decoder
/// (terminal → IRC) and the hex-color path of the IRC decoder (which
/// resolves through the same terminal numbering before falling back to
/// this table).
pub const TERM2IRC: [u8; 16] = [1, 5, 3, 7, 2, 6, 10, 15, 14, 4, 9, 8, 12, 13, 11, 0];

/// The 99-entry mIRC color palette, grounded on `irc_color_to_weechat` in
/// `irc-color.c`. Indices 0-15 are named colors; 16-98 are 256-color
/// terminal indices expressed as their decimal string.
pub const PALETTE: [&str; 99] = [
    "white", "black", "blue", "green", "lightred", "red", "magenta", "brown", "yellow",
    "lightgreen", "cyan", "lightcyan", "lightblue", "lightmagenta", "darkgray", "gray", "52",
    "94", "100", "58", "22", "29", "23", "24", "17", "54", "53", "89", "88", "130", "142", "64",
    "28", "35", "30", "25", "18", "91", "90", "125", "124", "166", "184", "106", "34", "49", "37",
    "33", "19", "129", "127", "161", "196", "208", "226", "154", "46", "86", "51", "75", "21",
    "171", "201", "198", "203", "215", "227", "191", "83", "122", "87", "111", "63", "177", "207",
    "205", "217", "223", "229", "193", "157", "158", "159", "153", "147", "183", "219", "212",
    "16", "233", "235", "237", "239", "241", "244", "247", "250", "254", "231",
];

/// Sentinel used when a caller asks for the palette name at index 99.
pub const PALETTE_DEFAULT: &str = "default";

/// Resolves a mIRC index (already taken modulo 100) to its palette name.
fn palette_name(index: u8) -> &'static str {
    let index = index % 100;
    if index == 99 {
        PALETTE_DEFAULT
    } else {
        PALETTE.get(index as usize).copied().unwrap_or(PALETTE_DEFAULT)
    }
}

/// A resolved color target: either a named palette entry or a remap
/// override string supplied by the caller.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ColorSpec {
    /// A name resolved from [`PALETTE`] (or [`PALETTE_DEFAULT`]).
    Named(Cow<'static, str>),
    /// A caller-supplied remap override, verbatim.
    Remapped(String),
}

impl ColorSpec {
    /// The spec's textual form, for re-encoding or display.
    pub fn as_str(&self) -> &str {
        match self {
            ColorSpec::Named(s) => s,
            ColorSpec::Remapped(s) => s,
        }
    }
}

/// One decoded formatting event, in stream order with literal text runs.
#[derive(Clone, PartialEq, Debug)]
pub enum ColorEvent {
    /// A run of plain text (already formatting-free), as the exact raw
    /// bytes that were between sentinels. Carried as `Vec<u8>` rather than
    /// `String` because a byte below `0x20` that isn't a recognized
    /// sentinel is passed through literally (spec §9 open question) and
    /// is not guaranteed to be valid UTF-8 on its own; re-encoding it
    /// through `char`/`String` would silently produce a different byte
    /// sequence than the input.
    Text(Vec<u8>),
    /// Bold toggle.
    Bold,
    /// Reverse/inverse toggle.
    Reverse,
    /// Italic toggle.
    Italic,
    /// Underline toggle.
    Underline,
    /// Reset all attributes and colors.
    Reset,
    /// mIRC or hex color change; `None` fields mean "unspecified", a bare
    /// `Color { fg: None, bg: None }` means "reset color only".
    Color {
        fg: Option<ColorSpec>,
        bg: Option<ColorSpec>,
    },
}

/// Remap table keyed `"fg,bg"` (decimal indices) to an override spec
/// string, consulted before falling back to the default palette mapping.
pub type RemapTable = HashMap<String, String>;

fn remap_lookup<'a>(table: &'a RemapTable, fg: Option<u32>, bg: Option<u32>) -> Option<&'a str> {
    let key = match (fg, bg) {
        (Some(f), Some(b)) => format!("{f},{b}"),
        (Some(f), None) => format!("{f},"),
        (None, Some(b)) => format!(",{b}"),
        (None, None) => return None,
    };
    table.get(&key).map(String::as_str)
}

fn resolve_mirc(fg: Option<u32>, bg: Option<u32>, remap: &RemapTable) -> (Option<ColorSpec>, Option<ColorSpec>) {
    if let Some(over) = remap_lookup(remap, fg, bg) {
        // A single combined override applies to the foreground slot;
        // background is left unspecified so the renderer keeps its prior bg.
        return (Some(ColorSpec::Remapped(over.to_string())), None);
    }
    let fg = fg.map(|f| ColorSpec::Named(Cow::Borrowed(palette_name((f % 100) as u8))));
    let bg = bg.map(|b| ColorSpec::Named(Cow::Borrowed(palette_name((b % 100) as u8))));
    (fg, bg)
}

/// Decodes up to two ASCII-digit groups (`fg[,bg]`) starting at `bytes[i]`,
/// returning the updated cursor and parsed values.
fn take_decimal_pair(bytes: &[u8], mut i: usize, max_digits: usize) -> (usize, Option<u32>, Option<u32>) {
    let start = i;
    let mut n = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() && i - start < max_digits {
        i += 1;
        n += 1;
    }
    let fg = if n > 0 {
        std::str::from_utf8(&bytes[start..i]).ok().and_then(|s| s.parse().ok())
    } else {
        None
    };

    if i < bytes.len() && bytes[i] == b',' {
        let comma = i;
        i += 1;
        let start2 = i;
        let mut n2 = 0;
        while i < bytes.len() && bytes[i].is_ascii_digit() && i - start2 < max_digits {
            i += 1;
            n2 += 1;
        }
        if n2 > 0 {
            let bg = std::str::from_utf8(&bytes[start2..i]).ok().and_then(|s| s.parse().ok());
            return (i, fg, bg);
        }
        // comma not followed by digits: don't consume it
        return (comma, fg, None);
    }

    (i, fg, None)
}

/// Decodes a hex color digit group starting at `bytes[i]` (up to 6 hex
/// digits), returning the updated cursor and parsed RGB value if any.
fn take_hex_pair(bytes: &[u8], mut i: usize) -> (usize, Option<u32>, Option<u32>) {
    let start = i;
    while i < bytes.len() && bytes[i].is_ascii_hexdigit() && i - start < 6 {
        i += 1;
    }
    let fg = if i > start {
        u32::from_str_radix(std::str::from_utf8(&bytes[start..i]).unwrap(), 16).ok()
    } else {
        None
    };

    if i < bytes.len() && bytes[i] == b',' {
        let comma = i;
        i += 1;
        let start2 = i;
        while i < bytes.len() && bytes[i].is_ascii_hexdigit() && i - start2 < 6 {
            i += 1;
        }
        if i > start2 {
            let bg = u32::from_str_radix(std::str::from_utf8(&bytes[start2..i]).unwrap(), 16).ok();
            return (i, fg, bg);
        }
        return (comma, fg, None);
    }

    (i, fg, None)
}

/// Standard 16-color terminal palette, approximate xterm RGB values.
const ANSI_16_RGB: [(u8, u8, u8); 16] = [
    (0, 0, 0),
    (128, 0, 0),
    (0, 128, 0),
    (128, 128, 0),
    (0, 0, 128),
    (128, 0, 128),
    (0, 128, 128),
    (192, 192, 192),
    (128, 128, 128),
    (255, 0, 0),
    (0, 255, 0),
    (255, 255, 0),
    (0, 0, 255),
    (255, 0, 255),
    (0, 255, 255),
    (255, 255, 255),
];

/// Converts a 24-bit RGB value to its nearest terminal color index (0-15).
/// The true conversion is delegated to the renderer in a full 256-color
/// terminal; this is the deterministic nearest-of-16 fallback used when no
/// renderer hook is supplied. Since every caller immediately reduces the
/// result modulo 16 via [`TERM2IRC`], resolving directly against the
/// 16-entry table keeps the fallback and the renderer-delegated path
/// agreeing on the same final IRC index for exact/near matches.
pub fn rgb_to_term_index(rgb: u32) -> u8 {
    let r = ((rgb >> 16) & 0xFF) as i32;
    let g = ((rgb >> 8) & 0xFF) as i32;
    let b = (rgb & 0xFF) as i32;

    let mut best = 0u8;
    let mut best_dist = i32::MAX;
    for (idx, &(cr, cg, cb)) in ANSI_16_RGB.iter().enumerate() {
        let dr = r - cr as i32;
        let dg = g - cg as i32;
        let db = b - cb as i32;
        let dist = dr * dr + dg * dg + db * db;
        if dist < best_dist {
            best_dist = dist;
            best = idx as u8;
        }
    }
    best
}

/// Decodes raw IRC-formatted bytes into a structured event stream
/// (spec §4.3.1). `mirc_remap`/`term_remap` are keyed `"fg,bg"` with
/// decimal mIRC/terminal indices respectively; a key miss falls back to
/// the default palette mapping. When `keep_colors` is false, all
/// sentinels (including the fixed-width no-op) are dropped and only text
/// is emitted.
pub fn decode(
    input: &str,
    keep_colors: bool,
    mirc_remap: &RemapTable,
    term_remap: &RemapTable,
) -> Vec<ColorEvent> {
    let bytes = input.as_bytes();
    let mut events = Vec::new();
    let mut text: Vec<u8> = Vec::new();
    let mut i = 0;

    macro_rules! flush_text {
        () => {
            if !text.is_empty() {
                events.push(ColorEvent::Text(std::mem::take(&mut text)));
            }
        };
    }

    while i < bytes.len() {
        let b = bytes[i];
        match b {
            BOLD if keep_colors => {
                flush_text!();
                events.push(ColorEvent::Bold);
                i += 1;
            }
            RESET if keep_colors => {
                flush_text!();
                events.push(ColorEvent::Reset);
                i += 1;
            }
            REVERSE if keep_colors => {
                flush_text!();
                events.push(ColorEvent::Reverse);
                i += 1;
            }
            ITALIC if keep_colors => {
                flush_text!();
                events.push(ColorEvent::Italic);
                i += 1;
            }
            UNDERLINE if keep_colors => {
                flush_text!();
                events.push(ColorEvent::Underline);
                i += 1;
            }
            FIXED_WIDTH => {
                // No-op toggle: always consumed, never re-emitted.
                i += 1;
            }
            BOLD | RESET | REVERSE | ITALIC | UNDERLINE => {
                // keep_colors == false: drop the sentinel, keep no event.
                i += 1;
            }
            COLOR => {
                let (next, fg, bg) = take_decimal_pair(bytes, i + 1, 2);
                i = next;
                if keep_colors {
                    flush_text!();
                    if fg.is_none() && bg.is_none() {
                        events.push(ColorEvent::Color { fg: None, bg: None });
                    } else {
                        let (fg, bg) = resolve_mirc(fg, bg, mirc_remap);
                        events.push(ColorEvent::Color { fg, bg });
                    }
                }
            }
            HEX_COLOR => {
                let (next, fg, bg) = take_hex_pair(bytes, i + 1);
                i = next;
                if keep_colors {
                    flush_text!();
                    if fg.is_none() && bg.is_none() {
                        events.push(ColorEvent::Color { fg: None, bg: None });
                    } else {
                        let fg_term = fg.map(rgb_to_term_index);
                        let bg_term = bg.map(rgb_to_term_index);
                        let fg_spec = fg_term.map(|t| {
                            remap_lookup(term_remap, Some(t as u32), bg_term.map(|b| b as u32))
                                .map(|s| ColorSpec::Remapped(s.to_string()))
                                .unwrap_or_else(|| {
                                    ColorSpec::Named(Cow::Borrowed(palette_name(TERM2IRC[(t % 16) as usize])))
                                })
                        });
                        let bg_spec = bg_term.map(|t| {
                            ColorSpec::Named(Cow::Borrowed(palette_name(TERM2IRC[(t % 16) as usize])))
                        });
                        events.push(ColorEvent::Color {
                            fg: fg_spec,
                            bg: bg_spec,
                        });
                    }
                }
            }
            _ if b < 0x20 => {
                // Unrecognized control byte: passed through literally, even
                // though it may not be valid UTF-8 on its own (spec open
                // question: decoded text is not guaranteed UTF-8-safe). Kept
                // as the raw byte, never re-encoded through `char`.
                text.push(b);
                i += 1;
            }
            _ => {
                // Copied verbatim regardless of UTF-8 validity, by scalar
                // width so a sentinel byte is never cut out of the middle
                // of a multi-byte codepoint.
                let width = utf8_scalar_len(b);
                let end = (i + width).min(bytes.len());
                text.extend_from_slice(&bytes[i..end]);
                i = end;
            }
        }
    }

    flush_text!();
    events
}

/// Length in bytes of the UTF-8 scalar starting with leading byte `b`.
fn utf8_scalar_len(b: u8) -> usize {
    if b & 0x80 == 0 {
        1
    } else if b & 0xE0 == 0xC0 {
        2
    } else if b & 0xF0 == 0xE0 {
        3
    } else if b & 0xF8 == 0xF0 {
        4
    } else {
        1
    }
}

/// Re-encodes a decoded event stream into IRC-wire bytes (spec §4.3.2),
/// the inverse of [`decode`]. When `keep_colors` is false every
/// non-`Text` event is dropped.
///
/// Returns `Vec<u8>`, not `String`, for the same reason [`ColorEvent::Text`]
/// does: a `Text` run decoded from adversarial input may not be valid
/// UTF-8, and `encode` must reproduce it byte-exact rather than lossily
/// re-stringifying it.
pub fn encode(events: &[ColorEvent], keep_colors: bool) -> Vec<u8> {
    let mut out = Vec::new();
    for event in events {
        match event {
            ColorEvent::Text(s) => out.extend_from_slice(s),
            ColorEvent::Bold if keep_colors => out.push(BOLD),
            ColorEvent::Reset if keep_colors => out.push(RESET),
            ColorEvent::Reverse if keep_colors => out.push(REVERSE),
            ColorEvent::Italic if keep_colors => out.push(ITALIC),
            ColorEvent::Underline if keep_colors => out.push(UNDERLINE),
            ColorEvent::Color { fg, bg } if keep_colors => {
                out.push(COLOR);
                if let Some(fg) = fg {
                    if let Some(idx) = palette_index(fg.as_str()) {
                        out.extend_from_slice(format!("{idx:02}").as_bytes());
                    }
                }
                if let Some(bg) = bg {
                    out.push(b',');
                    if let Some(idx) = palette_index(bg.as_str()) {
                        out.extend_from_slice(format!("{idx:02}").as_bytes());
                    }
                }
            }
            _ => {}
        }
    }
    out
}

/// Reverse lookup of a palette name (or remap override left as-is) back
/// to its mIRC index, used by [`encode`] to round-trip [`decode`] output.
fn palette_index(name: &str) -> Option<usize> {
    PALETTE.iter().position(|&p| p == name)
}

/// ANSI/CSI attribute state carried across sequences so style sentinels
/// are only emitted on transition (spec §4.3.3).
#[derive(Default)]
struct AnsiState {
    bold: bool,
    italic: bool,
    underline: bool,
}

/// Decodes a string containing ANSI CSI `ESC '[' params 'm'` sequences
/// into the same [`ColorEvent`] stream [`decode`] produces, so a renderer
/// needs only one consumer for either wire format.
pub fn decode_ansi(input: &str, keep_colors: bool) -> Vec<ColorEvent> {
    let mut events = Vec::new();
    let mut text: Vec<u8> = Vec::new();
    let mut state = AnsiState::default();
    let mut chars = input.chars().peekable();

    macro_rules! flush_text {
        () => {
            if !text.is_empty() {
                events.push(ColorEvent::Text(std::mem::take(&mut text)));
            }
        };
    }

    while let Some(c) = chars.next() {
        if c == '\x1B' && chars.peek() == Some(&'[') {
            chars.next();
            let mut params_str = String::new();
            let mut terminated = false;
            for p in chars.by_ref() {
                if p == 'm' {
                    terminated = true;
                    break;
                }
                params_str.push(p);
            }
            if !terminated {
                continue;
            }
            let params: Vec<i64> = params_str
                .split(';')
                .map(|s| s.parse().unwrap_or(0))
                .collect();
            if keep_colors {
                flush_text!();
                apply_ansi_params(&params, &mut state, &mut events);
            }
        } else {
            let mut buf = [0u8; 4];
            text.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
        }
    }

    flush_text!();
    events
}

fn apply_ansi_params(params: &[i64], state: &mut AnsiState, events: &mut Vec<ColorEvent>) {
    if params.is_empty() {
        events.push(ColorEvent::Reset);
        *state = AnsiState::default();
        return;
    }

    let mut i = 0;
    while i < params.len() {
        match params[i] {
            0 => {
                events.push(ColorEvent::Reset);
                *state = AnsiState::default();
            }
            1 | 22 => {
                let want = params[i] == 1;
                if state.bold != want {
                    state.bold = want;
                    events.push(ColorEvent::Bold);
                }
            }
            2 | 21 => {
                if state.bold {
                    state.bold = false;
                    events.push(ColorEvent::Bold);
                }
            }
            3 | 23 => {
                let want = params[i] == 3;
                if state.italic != want {
                    state.italic = want;
                    events.push(ColorEvent::Italic);
                }
            }
            4 | 24 => {
                let want = params[i] == 4;
                if state.underline != want {
                    state.underline = want;
                    events.push(ColorEvent::Underline);
                }
            }
            n @ 30..=37 => {
                let irc = TERM2IRC[(n - 30) as usize];
                events.push(ColorEvent::Color {
                    fg: Some(ColorSpec::Named(Cow::Borrowed(palette_name(irc)))),
                    bg: None,
                });
            }
            38 => {
                if params.get(i + 1) == Some(&2) && params.len() >= i + 5 {
                    let (r, g, b) = (params[i + 2] as u32, params[i + 3] as u32, params[i + 4] as u32);
                    let term = rgb_to_term_index((r << 16) | (g << 8) | b);
                    events.push(ColorEvent::Color {
                        fg: Some(ColorSpec::Named(Cow::Borrowed(palette_name(TERM2IRC[(term % 16) as usize])))),
                        bg: None,
                    });
                    i += 4;
                } else if params.get(i + 1) == Some(&5) && params.len() >= i + 3 {
                    let n = params[i + 2] as u8;
                    events.push(ColorEvent::Color {
                        fg: Some(ColorSpec::Named(Cow::Borrowed(palette_name(TERM2IRC[(n % 16) as usize])))),
                        bg: None,
                    });
                    i += 2;
                }
            }
            39 => events.push(ColorEvent::Color {
                fg: Some(ColorSpec::Named(Cow::Borrowed(palette_name(15)))),
                bg: None,
            }),
            n @ 40..=47 => {
                let irc = TERM2IRC[(n - 40) as usize];
                events.push(ColorEvent::Color {
                    fg: None,
                    bg: Some(ColorSpec::Named(Cow::Borrowed(palette_name(irc)))),
                });
            }
            48 => {
                if params.get(i + 1) == Some(&2) && params.len() >= i + 5 {
                    let (r, g, b) = (params[i + 2] as u32, params[i + 3] as u32, params[i + 4] as u32);
                    let term = rgb_to_term_index((r << 16) | (g << 8) | b);
                    events.push(ColorEvent::Color {
                        fg: None,
                        bg: Some(ColorSpec::Named(Cow::Borrowed(palette_name(TERM2IRC[(term % 16) as usize])))),
                    });
                    i += 4;
                } else if params.get(i + 1) == Some(&5) && params.len() >= i + 3 {
                    let n = params[i + 2] as u8;
                    events.push(ColorEvent::Color {
                        fg: None,
                        bg: Some(ColorSpec::Named(Cow::Borrowed(palette_name(TERM2IRC[(n % 16) as usize])))),
                    });
                    i += 2;
                }
            }
            49 => events.push(ColorEvent::Color {
                fg: None,
                bg: Some(ColorSpec::Named(Cow::Borrowed(palette_name(1)))),
            }),
            n @ 90..=97 => {
                let irc = TERM2IRC[(n - 90) as usize];
                events.push(ColorEvent::Color {
                    fg: Some(ColorSpec::Named(Cow::Borrowed(palette_name(irc)))),
                    bg: None,
                });
            }
            n @ 100..=107 => {
                let irc = TERM2IRC[(n - 100) as usize];
                events.push(ColorEvent::Color {
                    fg: None,
                    bg: Some(ColorSpec::Named(Cow::Borrowed(palette_name(irc)))),
                });
            }
            _ => {}
        }
        i += 1;
    }
}

/// Ring buffer of the last `N` decoded strings, for callers that want a
/// borrowed result without re-decoding (spec §4.3.4). Returns owned
/// `String`s stored in the ring itself (design note §9 strategy (a)):
/// `decode_const` hands back a borrow into the cache's own storage, never
/// into caller-provided data, so there is no lifetime entanglement with
/// the input.
pub struct ColorCache {
    capacity: usize,
    ring: Vec<String>,
    next: usize,
}

impl ColorCache {
    /// Default ring size from the original implementation.
    pub const DEFAULT_CAPACITY: usize = 32;

    /// Creates a cache with the default 32-entry ring.
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates a cache with a custom ring size.
    pub fn with_capacity(capacity: usize) -> Self {
        ColorCache {
            capacity: capacity.max(1),
            ring: Vec::new(),
            next: 0,
        }
    }

    /// Decodes `input` to plain text (stripping all sentinels) and stores
    /// it in the ring, returning a borrow of the stored copy.
    pub fn decode_const(&mut self, input: &str) -> &str {
        let mut bytes = Vec::new();
        for e in decode(input, false, &HashMap::new(), &HashMap::new()) {
            if let ColorEvent::Text(b) = e {
                bytes.extend_from_slice(&b);
            }
        }
        let plain = String::from_utf8_lossy(&bytes).into_owned();

        if self.ring.len() < self.capacity {
            self.ring.push(plain);
            self.ring.last().unwrap()
        } else {
            let slot = self.next;
            self.ring[slot] = plain;
            self.next = (self.next + 1) % self.capacity;
            &self.ring[slot]
        }
    }
}

impl Default for ColorCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Extension trait for handling formatted IRC strings (kept from the
/// teacher for callers that just want to strip formatting without going
/// through the structured [`decode`]/[`encode`] pair).
pub trait FormattedStringExt<'a> {
    /// Check if the string contains any IRC formatting codes.
    fn is_formatted(&self) -> bool;

    /// Strip all IRC formatting codes from the string.
    fn strip_formatting(self) -> Cow<'a, str>;
}

impl<'a> FormattedStringExt<'a> for &'a str {
    fn is_formatted(&self) -> bool {
        self.contains(FORMAT_CHARS)
    }

    fn strip_formatting(self) -> Cow<'a, str> {
        if !self.is_formatted() {
            return Cow::Borrowed(self);
        }
        let events = decode(self, false, &HashMap::new(), &HashMap::new());
        let mut bytes = Vec::with_capacity(self.len());
        for e in events {
            if let ColorEvent::Text(b) = e {
                bytes.extend_from_slice(&b);
            }
        }
        let out = String::from_utf8(bytes)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned());
        Cow::Owned(out)
    }
}

impl FormattedStringExt<'static> for String {
    fn is_formatted(&self) -> bool {
        self.as_str().is_formatted()
    }

    fn strip_formatting(self) -> Cow<'static, str> {
        match self.as_str().strip_formatting() {
            Cow::Borrowed(_) => Cow::Owned(self),
            Cow::Owned(s) => Cow::Owned(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_basic() {
        assert_eq!("\x02bold\x02".strip_formatting(), "bold");
        assert_eq!("\x1Funderline".strip_formatting(), "underline");
    }

    #[test]
    fn decode_bold_and_color() {
        let remap = HashMap::new();
        let events = decode("test_\x02\x0311,05lightcyan/red\x03_end", true, &remap, &remap);
        assert_eq!(
            events,
            vec![
                ColorEvent::Text(b"test_".to_vec()),
                ColorEvent::Bold,
                ColorEvent::Color {
                    fg: Some(ColorSpec::Named(Cow::Borrowed("lightcyan"))),
                    bg: Some(ColorSpec::Named(Cow::Borrowed("red"))),
                },
                ColorEvent::Text(b"lightcyan/red".to_vec()),
                ColorEvent::Color { fg: None, bg: None },
                ColorEvent::Text(b"_end".to_vec()),
            ]
        );
    }

    #[test]
    fn decode_strips_when_keep_colors_false() {
        let remap = HashMap::new();
        let events = decode("test_\x02\x0311,05lightcyan/red\x03_end", false, &remap, &remap);
        let mut bytes = Vec::new();
        for e in events {
            if let ColorEvent::Text(b) = e {
                bytes.extend_from_slice(&b);
            }
        }
        assert_eq!(String::from_utf8_lossy(&bytes), "test_lightcyan/red_end");
    }

    #[test]
    fn fixed_width_is_always_consumed() {
        let remap = HashMap::new();
        let events = decode("a\x11b", true, &remap, &remap);
        let mut bytes = Vec::new();
        for e in events {
            if let ColorEvent::Text(b) = e {
                bytes.extend_from_slice(&b);
            }
        }
        assert_eq!(String::from_utf8_lossy(&bytes), "ab");
    }

    #[test]
    fn ansi_rgb_downsamples_to_irc_13() {
        let events = decode_ansi("test_\x1B[38;2;255;0;255mcolor13", true);
        assert!(events.iter().any(|e| matches!(
            e,
            ColorEvent::Color { fg: Some(ColorSpec::Named(name)), .. } if name.as_ref() == "lightmagenta"
        )));
        // encode() round-trips through IRC sentinel form; check the fg
        // index resolves to mIRC 13, matching scenario 6's expectation.
        let wire = encode(&events, true);
        let wire_str = String::from_utf8_lossy(&wire);
        assert!(wire_str.contains("\x0313"));
    }

    #[test]
    fn encode_decode_roundtrip_text() {
        let remap = HashMap::new();
        let original = "plain text, no formatting";
        let events = decode(original, true, &remap, &remap);
        assert_eq!(encode(&events, true), original.as_bytes());
    }

    #[test]
    fn color_cache_returns_stable_borrow() {
        let mut cache = ColorCache::with_capacity(2);
        let a = cache.decode_const("\x0304red").to_string();
        assert_eq!(a, "red");
        let _ = cache.decode_const("\x0304green is wrong label but still text"); // exercises wraparound path
    }
}
