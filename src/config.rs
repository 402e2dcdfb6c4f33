//! Host-supplied configuration surface (spec §6.6).
//!
//! The distillation describes configuration as "a mapping interface with
//! string keys; the core requests by name." Rather than a stringly-typed
//! lookup, this crate exposes it as a typed trait with one accessor per
//! key family, matching the teacher's existing preference for typed
//! accessors over raw `get()` calls (see `isupport::Isupport::casemapping`
//! and friends). [`StaticConfig`] is a ready-to-use implementation with
//! the documented defaults, `serde`-deserializable when the `serde`
//! feature is enabled.

use std::collections::HashMap;

/// Keys this crate reads from the host's configuration store (spec §6.6).
///
/// Implementors typically back this with whatever the host already uses
/// for persistent option storage; this crate never reads or writes a
/// config file itself (that stays the host's responsibility, per the
/// distillation's Non-goals).
pub trait Config {
    /// Default `list.sort` value for a newly opened list buffer.
    fn list_sort_default(&self) -> &str;

    /// Whether `/LIST` topic text has its IRC formatting bytes stripped
    /// before being stored in a [`crate::list::ChannelListEntry`].
    fn list_strip_topic_colors(&self) -> bool;

    /// `"fg,bg"`-keyed mIRC color index remap table for [`crate::colors::decode`].
    fn color_mirc_remap(&self) -> &HashMap<String, String>;

    /// `"fg,bg"`-keyed terminal color index remap table for [`crate::colors::decode`].
    fn color_term_remap(&self) -> &HashMap<String, String>;

    /// ISON poll period, in minutes (minimum 1).
    fn notify_ison_period(&self) -> u32;

    /// WHOIS poll period, in minutes (minimum 1).
    fn notify_whois_period(&self) -> u32;

    /// Maximum number of entries kept in a [`crate::server::RawMessageRing`].
    fn raw_message_cap(&self) -> usize;

    /// Outgoing message length budget passed to [`crate::split::SplitContext`];
    /// 0 disables splitting.
    fn split_max_length(&self) -> usize;

    /// `printf`-style template used when building a ban mask from a nick's
    /// prefix (e.g. `"*!*@{host}"`).
    fn ban_mask_template(&self) -> &str;
}

/// A plain-data [`Config`] implementation holding the documented defaults.
///
/// Hosts that already have their own configuration store can either wrap
/// it in a newtype implementing [`Config`] directly, or deserialize one
/// of these (behind the `serde` feature) from whatever format they use
/// and override fields as needed.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StaticConfig {
    /// See [`Config::list_sort_default`].
    pub list_sort_default: String,
    /// See [`Config::list_strip_topic_colors`].
    pub list_strip_topic_colors: bool,
    /// See [`Config::color_mirc_remap`].
    pub color_mirc_remap: HashMap<String, String>,
    /// See [`Config::color_term_remap`].
    pub color_term_remap: HashMap<String, String>,
    /// See [`Config::notify_ison_period`].
    pub notify_ison_period: u32,
    /// See [`Config::notify_whois_period`].
    pub notify_whois_period: u32,
    /// See [`Config::raw_message_cap`].
    pub raw_message_cap: usize,
    /// See [`Config::split_max_length`].
    pub split_max_length: usize,
    /// See [`Config::ban_mask_template`].
    pub ban_mask_template: String,
}

impl Default for StaticConfig {
    fn default() -> Self {
        StaticConfig {
            list_sort_default: String::new(),
            list_strip_topic_colors: false,
            color_mirc_remap: HashMap::new(),
            color_term_remap: HashMap::new(),
            notify_ison_period: 1,
            notify_whois_period: 5,
            raw_message_cap: 256,
            split_max_length: 512,
            ban_mask_template: "*!*@{host}".to_string(),
        }
    }
}

impl Config for StaticConfig {
    fn list_sort_default(&self) -> &str {
        &self.list_sort_default
    }

    fn list_strip_topic_colors(&self) -> bool {
        self.list_strip_topic_colors
    }

    fn color_mirc_remap(&self) -> &HashMap<String, String> {
        &self.color_mirc_remap
    }

    fn color_term_remap(&self) -> &HashMap<String, String> {
        &self.color_term_remap
    }

    fn notify_ison_period(&self) -> u32 {
        self.notify_ison_period.max(1)
    }

    fn notify_whois_period(&self) -> u32 {
        self.notify_whois_period.max(1)
    }

    fn raw_message_cap(&self) -> usize {
        self.raw_message_cap
    }

    fn split_max_length(&self) -> usize {
        self.split_max_length
    }

    fn ban_mask_template(&self) -> &str {
        &self.ban_mask_template
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = StaticConfig::default();
        assert_eq!(cfg.notify_ison_period(), 1);
        assert_eq!(cfg.notify_whois_period(), 5);
        assert_eq!(cfg.split_max_length(), 512);
        assert_eq!(cfg.ban_mask_template(), "*!*@{host}");
    }

    #[test]
    fn periods_are_clamped_to_a_minimum_of_one() {
        let cfg = StaticConfig {
            notify_ison_period: 0,
            notify_whois_period: 0,
            ..StaticConfig::default()
        };
        assert_eq!(cfg.notify_ison_period(), 1);
        assert_eq!(cfg.notify_whois_period(), 1);
    }
}
