//! ISON/MONITOR/WHOIS presence tracking (spec §4.5, §3.4).
//!
//! Grounded on WeeChat's `irc-notify.c`: the same tristate presence
//! model, the same ISON/WHOIS redirect-completion rules, and the same
//! `join`/`quit`/`away`/`back`/`still_away` edge vocabulary. Kept as a
//! pure `tick` function returning actions rather than performing I/O
//! itself, matching §5's "color codec, msg.split, and list filter/sort
//! are pure and non-blocking" scheduling contract.

use thiserror::Error;

use crate::command::Command;
use crate::split::{split, SplitContext};

/// Errors surfaced by the notify engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotifyError {
    /// Watch-list config string failed to parse.
    #[error("invalid notify watch-list entry: {0:?}")]
    InvalidWatchEntry(String),
}

/// Tristate online/offline knowledge for a watched nick (spec §3.4).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Presence {
    /// No ISON/MONITOR reply observed yet.
    #[default]
    Unknown,
    /// Last reply indicated the nick is not connected.
    Offline,
    /// Last reply indicated the nick is connected.
    Online,
}

/// One watched nick (spec §3.4).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotifyWatchEntry {
    /// The watched nickname.
    pub nick: String,
    /// Whether to additionally poll WHOIS for away status.
    pub check_away: bool,
    /// Current online/offline knowledge.
    pub is_on_server: Presence,
    /// Last known away message, if any.
    pub away_message: Option<String>,
}

impl NotifyWatchEntry {
    /// Creates a fresh, unknown-presence watch entry.
    pub fn new(nick: impl Into<String>, check_away: bool) -> Self {
        NotifyWatchEntry {
            nick: nick.into(),
            check_away,
            is_on_server: Presence::Unknown,
            away_message: None,
        }
    }

    /// Parses one entry of the `nick1[ away][/extra], nick2…` config
    /// string format (spec §4.5).
    pub fn parse(entry: &str) -> Result<Self, NotifyError> {
        let entry = entry.trim();
        if entry.is_empty() {
            return Err(NotifyError::InvalidWatchEntry(entry.to_string()));
        }
        let nick_part = entry.split('/').next().unwrap_or(entry);
        let mut parts = nick_part.split_whitespace();
        let Some(nick) = parts.next() else {
            return Err(NotifyError::InvalidWatchEntry(entry.to_string()));
        };
        let check_away = parts.any(|tok| tok.eq_ignore_ascii_case("away"));
        Ok(NotifyWatchEntry::new(nick, check_away))
    }

    /// Serializes back to the config string format.
    pub fn to_config_string(&self) -> String {
        if self.check_away {
            format!("{} away", self.nick)
        } else {
            self.nick.clone()
        }
    }
}

/// A redirect-armed outgoing send, plus the label it should be tagged
/// with so the caller can route the eventual reply back to
/// [`NotifyState::complete_ison`]/[`NotifyState::complete_whois`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NotifyAction {
    /// Send these frames with redirect label `ison/notify`.
    SendIson(Vec<String>),
    /// Send a WHOIS for this nick with redirect label `whois/notify`.
    SendWhois(String),
    /// Send these frames (MONITOR +/-/C) with no redirect.
    SendMonitor(Vec<String>),
}

/// A presence-change signal, emitted for display/logging collaborators
/// (spec §4.5 "Edge detection", §6.4).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NotifySignal {
    /// Nick came online.
    Join { nick: String, host: Option<String> },
    /// Nick went offline.
    Quit { nick: String },
    /// Away message appeared (None -> Some).
    Away { nick: String, message: String },
    /// Away message cleared (Some -> None).
    Back { nick: String },
    /// Away message changed to a different message (Some -> Some, differing).
    StillAway { nick: String, message: String },
}

/// Per-server notify engine state (spec §4.5).
#[derive(Clone, Debug, Default)]
pub struct NotifyState {
    /// Ordered watch list.
    pub watch_list: Vec<NotifyWatchEntry>,
    /// Server-advertised MONITOR capacity; 0 means unsupported.
    pub monitor_limit: usize,
    /// Minutes between ISON polls.
    pub ison_period: u32,
    /// Minutes between WHOIS polls.
    pub whois_period: u32,
    /// Seconds elapsed since the last ISON tick fired.
    since_ison: u64,
    /// Seconds elapsed since the last WHOIS tick fired.
    since_whois: u64,
}

impl NotifyState {
    /// Creates a fresh engine with the given poll periods (minutes).
    pub fn new(ison_period: u32, whois_period: u32) -> Self {
        NotifyState {
            ison_period,
            whois_period,
            ..Default::default()
        }
    }

    /// Whether the MONITOR path is in effect (spec §4.5 "MONITOR path").
    pub fn uses_monitor(&self) -> bool {
        self.monitor_limit > 0
    }

    /// Advances the engine's clock by `elapsed_secs` and returns due
    /// actions. Pure: performs no I/O itself.
    pub fn tick(&mut self, elapsed_secs: u64, ctx: &SplitContext) -> Vec<NotifyAction> {
        let mut actions = Vec::new();
        if self.uses_monitor() || self.watch_list.is_empty() {
            return actions;
        }

        self.since_ison += elapsed_secs;
        self.since_whois += elapsed_secs;

        if self.ison_period > 0 && self.since_ison >= u64::from(self.ison_period) * 60 {
            self.since_ison = 0;
            let nicks: Vec<String> = self.watch_list.iter().map(|e| e.nick.clone()).collect();
            actions.push(NotifyAction::SendIson(split_ison(&nicks, ctx)));
        }

        if self.whois_period > 0 && self.since_whois >= u64::from(self.whois_period) * 60 {
            self.since_whois = 0;
            for entry in self.watch_list.iter().filter(|e| e.check_away) {
                actions.push(NotifyAction::SendWhois(entry.nick.clone()));
            }
        }

        actions
    }

    /// Builds the `MONITOR +` frames to send on connect or watch-list
    /// change, when `monitor_limit > 0`.
    pub fn monitor_add(&self, ctx: &SplitContext) -> Vec<String> {
        let nicks: Vec<String> = self.watch_list.iter().map(|e| e.nick.clone()).collect();
        split_monitor_csv('+', &nicks, ctx)
    }

    /// Builds the `MONITOR -` frame for unwatching a single nick.
    pub fn monitor_remove_one(&self, nick: &str, ctx: &SplitContext) -> Vec<String> {
        split_monitor_csv('-', &[nick.to_string()], ctx)
    }

    /// Builds the `MONITOR C` teardown frame.
    pub fn monitor_clear() -> String {
        "MONITOR C".to_string()
    }

    /// Applies an ISON redirect completion (spec §4.5 "Redirect
    /// completion"): nicks present in `online_nicks` (the reply's
    /// params) are marked online; nicks that were sent but absent are
    /// marked offline. Returns the edge signals produced.
    pub fn complete_ison(&mut self, online_nicks: &[String]) -> Vec<NotifySignal> {
        let online_lower: std::collections::HashSet<String> =
            online_nicks.iter().map(|n| n.to_ascii_lowercase()).collect();
        let mut signals = Vec::new();
        for entry in &mut self.watch_list {
            let now_online = online_lower.contains(&entry.nick.to_ascii_lowercase());
            let was = entry.is_on_server;
            entry.is_on_server = if now_online { Presence::Online } else { Presence::Offline };
            match (was, entry.is_on_server) {
                (Presence::Online, Presence::Offline) => signals.push(NotifySignal::Quit { nick: entry.nick.clone() }),
                (p, Presence::Online) if p != Presence::Online => signals.push(NotifySignal::Join {
                    nick: entry.nick.clone(),
                    host: None,
                }),
                _ => {}
            }
        }
        signals
    }

    /// Applies a WHOIS redirect completion for one nick (spec §4.5).
    /// `away_text` is `Some(message)` if a 301 was seen, `None` if only
    /// a 401 (no such nick) or no reply at all. A 401 with no prior 301
    /// leaves `is_on_server` untouched, since the ISON loop owns that.
    pub fn complete_whois(&mut self, nick: &str, away_text: Option<&str>) -> Vec<NotifySignal> {
        let mut signals = Vec::new();
        if let Some(entry) = self
            .watch_list
            .iter_mut()
            .find(|e| e.nick.eq_ignore_ascii_case(nick))
        {
            let prev = entry.away_message.clone();
            entry.away_message = away_text.map(str::to_string);
            match (prev, &entry.away_message) {
                (None, Some(msg)) => signals.push(NotifySignal::Away {
                    nick: entry.nick.clone(),
                    message: msg.clone(),
                }),
                (Some(_), None) => signals.push(NotifySignal::Back { nick: entry.nick.clone() }),
                (Some(old), Some(new)) if &old != new => signals.push(NotifySignal::StillAway {
                    nick: entry.nick.clone(),
                    message: new.clone(),
                }),
                _ => {}
            }
        }
        signals
    }

    /// Applies a server-side `MONITOR * ONLINE`/`OFFLINE` push, which
    /// drives state directly without a redirect round-trip.
    pub fn apply_monitor_push(&mut self, nick: &str, online: bool) -> Vec<NotifySignal> {
        let mut signals = Vec::new();
        if let Some(entry) = self
            .watch_list
            .iter_mut()
            .find(|e| e.nick.eq_ignore_ascii_case(nick))
        {
            let was = entry.is_on_server;
            entry.is_on_server = if online { Presence::Online } else { Presence::Offline };
            match (was, entry.is_on_server) {
                (Presence::Online, Presence::Offline) => signals.push(NotifySignal::Quit { nick: entry.nick.clone() }),
                (p, Presence::Online) if p != Presence::Online => signals.push(NotifySignal::Join {
                    nick: entry.nick.clone(),
                    host: None,
                }),
                _ => {}
            }
        }
        signals
    }
}

fn split_ison(nicks: &[String], ctx: &SplitContext) -> Vec<String> {
    split(ctx, &Command::ISON(nicks.to_vec())).frames
}

fn split_monitor_csv(sign: char, nicks: &[String], ctx: &SplitContext) -> Vec<String> {
    let args = vec![sign.to_string(), nicks.join(",")];
    split(ctx, &Command::Raw("MONITOR".to_string(), args)).frames
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_watch_entry_with_away_flag() {
        let e = NotifyWatchEntry::parse("bob away").unwrap();
        assert_eq!(e.nick, "bob");
        assert!(e.check_away);
        let e2 = NotifyWatchEntry::parse("alice").unwrap();
        assert!(!e2.check_away);
    }

    #[test]
    fn ison_completion_marks_online_and_offline() {
        let mut state = NotifyState::new(5, 10);
        state.watch_list.push(NotifyWatchEntry::new("alice", false));
        state.watch_list.push(NotifyWatchEntry::new("bob", false));
        let signals = state.complete_ison(&["alice".to_string()]);
        assert_eq!(state.watch_list[0].is_on_server, Presence::Online);
        assert_eq!(state.watch_list[1].is_on_server, Presence::Offline);
        assert_eq!(signals, vec![NotifySignal::Join { nick: "alice".to_string(), host: None }]);
    }

    #[test]
    fn whois_completion_tracks_away_edges() {
        let mut state = NotifyState::new(5, 10);
        state.watch_list.push(NotifyWatchEntry::new("alice", true));

        let s1 = state.complete_whois("alice", Some("gone fishing"));
        assert_eq!(
            s1,
            vec![NotifySignal::Away { nick: "alice".to_string(), message: "gone fishing".to_string() }]
        );

        let s2 = state.complete_whois("alice", Some("still gone"));
        assert_eq!(
            s2,
            vec![NotifySignal::StillAway { nick: "alice".to_string(), message: "still gone".to_string() }]
        );

        let s3 = state.complete_whois("alice", None);
        assert_eq!(s3, vec![NotifySignal::Back { nick: "alice".to_string() }]);
    }

    #[test]
    fn tick_fires_ison_after_period_elapses() {
        let mut state = NotifyState::new(1, 0);
        state.watch_list.push(NotifyWatchEntry::new("alice", false));
        let ctx = SplitContext::default();
        assert!(state.tick(30, &ctx).is_empty());
        let actions = state.tick(31, &ctx);
        assert_eq!(actions.len(), 1);
        assert!(matches!(actions[0], NotifyAction::SendIson(_)));
    }

    #[test]
    fn monitor_mode_suppresses_ison_ticks() {
        let mut state = NotifyState::new(1, 1);
        state.monitor_limit = 100;
        state.watch_list.push(NotifyWatchEntry::new("alice", false));
        let ctx = SplitContext::default();
        assert!(state.tick(1000, &ctx).is_empty());
    }
}
