//! `/LIST` ingest, filter, sort and pagination state (spec §4.4).
//!
//! Grounded on WeeChat's `irc-list.c`: the same filter grammar
//! (`c:`/`n:`/`t:`/`u:` prefixes), the same stackable sort-modifier
//! characters (`-` reverse, `~` casefold), and the same idle/awaiting/
//! displayed state machine driving a redirected `322` ingest.

use thiserror::Error;

use crate::chan;
use crate::colors::FormattedStringExt;

/// Errors surfaced by the list pipeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ListError {
    /// The redirected LIST reply errored out server-side.
    #[error("list redirect failed: {0}")]
    RedirectFailed(String),
    /// A filter expression referenced the external evaluator but none was provided.
    #[error("no expression evaluator configured for filter {0:?}")]
    NoEvaluator(String),
    /// An expression failed to evaluate.
    #[error("filter expression error: {0}")]
    ExprError(String),
}

/// One row of a `/LIST` reply (spec §3.3).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelListEntry {
    /// Raw channel name including sigil.
    pub name: String,
    /// `name` with its leading sigil run stripped.
    pub name2: String,
    /// User count from the `322` reply.
    pub users: u64,
    /// Topic text, optionally IRC-formatting-stripped per config.
    pub topic: Option<String>,
}

impl ChannelListEntry {
    /// Builds an entry from a parsed `322` reply's params:
    /// `[client, channel, visible, topic?]`.
    pub fn from_322_params(params: &[&str], strip_topic_colors: bool) -> Option<Self> {
        if params.len() < 3 {
            return None;
        }
        let name = params[1].to_string();
        let name2 = chan::strip_sigil(&name, chan::DEFAULT_CHANTYPES).to_string();
        let users = params[2].parse().unwrap_or(0);
        let topic = params.get(3).map(|t| {
            if strip_topic_colors {
                (*t).strip_formatting().into_owned()
            } else {
                t.to_string()
            }
        });
        Some(ChannelListEntry {
            name,
            name2,
            users,
            topic,
        })
    }
}

/// Evaluates a `c:<expr>` boolean filter expression against one entry's
/// bound environment (`name`, `name2`, `users`, `topic`). Left as an
/// external seam (spec §4.4 "Filter") since the expression grammar isn't
/// part of this component's contract.
pub trait ExprEvaluator {
    /// Evaluates `expr` against `entry`, returning its boolean result.
    fn eval(&self, expr: &str, entry: &ChannelListEntry) -> Result<bool, ListError>;
}

/// Default evaluator supporting a tiny subset: `field OP value` where
/// `field` is one of `users`/`name`/`name2`/`topic` and `OP` is one of
/// `==`, `!=`, `>`, `<`, `>=`, `<=` for `users`, or `==`/`!=` (string
/// equality) for the others. Good enough for simple filters; callers
/// needing a richer grammar should supply their own [`ExprEvaluator`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SimpleExprEvaluator;

impl ExprEvaluator for SimpleExprEvaluator {
    fn eval(&self, expr: &str, entry: &ChannelListEntry) -> Result<bool, ListError> {
        let ops: &[&str] = &[">=", "<=", "==", "!=", ">", "<"];
        let Some((op, idx)) = ops.iter().find_map(|op| expr.find(op).map(|i| (*op, i))) else {
            return Err(ListError::ExprError(format!("no operator in {expr:?}")));
        };
        let field = expr[..idx].trim();
        let value = expr[idx + op.len()..].trim();

        match field {
            "users" => {
                let want: i64 = value
                    .parse()
                    .map_err(|_| ListError::ExprError(format!("not an integer: {value:?}")))?;
                let have = entry.users as i64;
                Ok(match op {
                    "==" => have == want,
                    "!=" => have != want,
                    ">" => have > want,
                    "<" => have < want,
                    ">=" => have >= want,
                    "<=" => have <= want,
                    _ => unreachable!(),
                })
            }
            "name" | "name2" | "topic" => {
                let have = match field {
                    "name" => entry.name.as_str(),
                    "name2" => entry.name2.as_str(),
                    _ => entry.topic.as_deref().unwrap_or(""),
                };
                let value = value.trim_matches('"');
                match op {
                    "==" => Ok(have == value),
                    "!=" => Ok(have != value),
                    _ => Err(ListError::ExprError(format!("operator {op} not valid for string field {field}"))),
                }
            }
            other => Err(ListError::ExprError(format!("unknown field {other:?}"))),
        }
    }
}

/// State of the `/LIST` pipeline for one server (spec §4.4 state table).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListPhase {
    /// No list in flight, no buffer open.
    Idle,
    /// Redirect armed, waiting for the `322`/`323` stream.
    Awaiting,
    /// A buffer is open and showing the last ingested channel set.
    Displayed,
}

/// Per-server list pipeline state.
#[derive(Clone, Debug)]
pub struct ListState {
    /// Current lifecycle phase.
    pub phase: ListPhase,
    /// All ingested channels, insertion order.
    pub channels: Vec<ChannelListEntry>,
    /// Current filter string (`"*"` by default).
    pub filter: String,
    /// Current sort string, comma-separated field list.
    pub sort: String,
    /// Cached filter-passed, sort-ordered view. Recomputed on filter/sort/ingest.
    filter_channels: Vec<usize>,
    /// Cursor into `filter_channels`; always valid (or 0 when empty).
    pub selected_line: usize,
    /// Maximum display width of `name` across `channels`, for column alignment.
    pub name_column_width: usize,
    /// Whether topic formatting bytes are stripped on ingest.
    pub strip_topic_colors: bool,
}

impl Default for ListState {
    fn default() -> Self {
        ListState {
            phase: ListPhase::Idle,
            channels: Vec::new(),
            filter: "*".to_string(),
            sort: String::new(),
            filter_channels: Vec::new(),
            selected_line: 0,
            name_column_width: 0,
            strip_topic_colors: false,
        }
    }
}

impl ListState {
    /// Creates a fresh idle pipeline.
    pub fn new(strip_topic_colors: bool) -> Self {
        ListState {
            strip_topic_colors,
            ..Default::default()
        }
    }

    /// Arms the pipeline for a `/LIST` send (spec §4.4: idle → awaiting).
    pub fn begin_request(&mut self) {
        self.phase = ListPhase::Awaiting;
    }

    /// Ingests one `322` line's already-split params. Call once per
    /// reply line; call [`ListState::finish_ingest`] on the closing
    /// `323`.
    pub fn ingest_322(&mut self, params: &[&str]) {
        if let Some(entry) = ChannelListEntry::from_322_params(params, self.strip_topic_colors) {
            self.name_column_width = self.name_column_width.max(entry.name.chars().count());
            self.channels.push(entry);
        }
    }

    /// Closes out ingest, transitioning to `displayed` and recomputing the view.
    pub fn finish_ingest(&mut self, evaluator: &dyn ExprEvaluator) -> Result<(), ListError> {
        self.phase = ListPhase::Displayed;
        self.recompute(evaluator)
    }

    /// Records a redirect failure, returning to idle (spec §4.4).
    pub fn fail(&mut self) {
        self.phase = ListPhase::Idle;
    }

    /// Updates the filter string and recomputes the view.
    pub fn set_filter(&mut self, filter: impl Into<String>, evaluator: &dyn ExprEvaluator) -> Result<(), ListError> {
        self.filter = filter.into();
        self.recompute(evaluator)
    }

    /// Updates the sort string and recomputes the view.
    pub fn set_sort(&mut self, sort: impl Into<String>, evaluator: &dyn ExprEvaluator) -> Result<(), ListError> {
        self.sort = sort.into();
        self.recompute(evaluator)
    }

    /// The current filter-passed, sort-ordered view.
    pub fn filter_channels(&self) -> impl Iterator<Item = &ChannelListEntry> {
        self.filter_channels.iter().map(move |&i| &self.channels[i])
    }

    /// Number of rows in the current view.
    pub fn len(&self) -> usize {
        self.filter_channels.len()
    }

    /// Whether the current view is empty.
    pub fn is_empty(&self) -> bool {
        self.filter_channels.is_empty()
    }

    /// Moves the selection cursor by `delta`, clamping to the view bounds.
    pub fn move_selection(&mut self, delta: i64) {
        if self.filter_channels.is_empty() {
            self.selected_line = 0;
            return;
        }
        let len = self.filter_channels.len() as i64;
        let cur = self.selected_line as i64;
        let next = (cur + delta).clamp(0, len - 1);
        self.selected_line = next as usize;
    }

    /// Frees pipeline state on buffer close (spec §4.4 "displayed → freed").
    pub fn close(&mut self) {
        *self = ListState::new(self.strip_topic_colors);
    }

    fn recompute(&mut self, evaluator: &dyn ExprEvaluator) -> Result<(), ListError> {
        let mut indices: Vec<usize> = Vec::new();
        for (i, entry) in self.channels.iter().enumerate() {
            if matches_filter(&self.filter, entry, evaluator)? {
                indices.push(i);
            }
        }
        let fields = parse_sort_fields(&self.sort);
        let channels = &self.channels;
        indices.sort_by(|&a, &b| compare_entries(&channels[a], &channels[b], &fields));
        self.filter_channels = indices;
        self.selected_line = self.selected_line.min(self.filter_channels.len().saturating_sub(1));
        Ok(())
    }
}

fn matches_filter(filter: &str, entry: &ChannelListEntry, evaluator: &dyn ExprEvaluator) -> Result<bool, ListError> {
    if filter.is_empty() || filter == "*" {
        return Ok(true);
    }
    if let Some(expr) = filter.strip_prefix("c:") {
        return evaluator.eval(expr, entry);
    }
    if let Some(pat) = filter.strip_prefix("n:") {
        return Ok(glob_or_substring(pat, &entry.name));
    }
    if let Some(pat) = filter.strip_prefix("t:") {
        return Ok(glob_or_substring(pat, entry.topic.as_deref().unwrap_or("")));
    }
    if let Some(rest) = filter.strip_prefix("u:") {
        return Ok(eval_user_count(rest, entry.users));
    }
    Ok(glob_or_substring(filter, &entry.name) || glob_or_substring(filter, entry.topic.as_deref().unwrap_or("")))
}

fn eval_user_count(rest: &str, users: u64) -> bool {
    if let Some(n) = rest.strip_prefix('>') {
        n.parse::<u64>().map(|n| users > n).unwrap_or(false)
    } else if let Some(n) = rest.strip_prefix('<') {
        n.parse::<u64>().map(|n| users < n).unwrap_or(false)
    } else {
        rest.parse::<u64>().map(|n| users >= n).unwrap_or(false)
    }
}

fn glob_or_substring(pat: &str, haystack: &str) -> bool {
    if pat.contains('*') {
        glob_match(pat, haystack)
    } else {
        haystack.to_ascii_lowercase().contains(&pat.to_ascii_lowercase())
    }
}

/// Minimal `*`-only glob matcher (no `?`), case-insensitive.
fn glob_match(pat: &str, text: &str) -> bool {
    let pat = pat.to_ascii_lowercase();
    let text = text.to_ascii_lowercase();
    let parts: Vec<&str> = pat.split('*').collect();
    if parts.len() == 1 {
        return text == pat;
    }
    let mut pos = 0;
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        if i == 0 {
            if !text[pos..].starts_with(part) {
                return false;
            }
            pos += part.len();
        } else if i == parts.len() - 1 {
            return text[pos..].ends_with(part);
        } else if let Some(found) = text[pos..].find(part) {
            pos += found + part.len();
        } else {
            return false;
        }
    }
    true
}

fn parse_sort_fields(sort: &str) -> Vec<(String, bool, bool)> {
    if sort.is_empty() {
        return Vec::new();
    }
    sort.split(',')
        .filter(|s| !s.is_empty())
        .map(|field| {
            let mut reverse = false;
            let mut casefold = false;
            let mut idx = 0;
            let bytes = field.as_bytes();
            while idx < bytes.len() {
                match bytes[idx] {
                    b'-' => {
                        reverse = !reverse;
                        idx += 1;
                    }
                    b'~' => {
                        casefold = !casefold;
                        idx += 1;
                    }
                    _ => break,
                }
            }
            (field[idx..].to_string(), reverse, casefold)
        })
        .collect()
}

fn compare_entries(a: &ChannelListEntry, b: &ChannelListEntry, fields: &[(String, bool, bool)]) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    for (name, reverse, casefold) in fields {
        let ord = match name.as_str() {
            "users" => a.users.cmp(&b.users),
            "topic" => compare_str(a.topic.as_deref().unwrap_or(""), b.topic.as_deref().unwrap_or(""), *casefold),
            "name2" => compare_str(&a.name2, &b.name2, *casefold),
            _ => compare_str(&a.name, &b.name, *casefold),
        };
        let ord = if *reverse { ord.reverse() } else { ord };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

fn compare_str(a: &str, b: &str, casefold: bool) -> std::cmp::Ordering {
    if casefold {
        a.to_ascii_lowercase().cmp(&b.to_ascii_lowercase())
    } else {
        a.cmp(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, users: u64, topic: &str) -> ChannelListEntry {
        ChannelListEntry {
            name: name.to_string(),
            name2: chan::strip_sigil(name, chan::DEFAULT_CHANTYPES).to_string(),
            users,
            topic: Some(topic.to_string()),
        }
    }

    #[test]
    fn ingest_and_filter_by_user_count() {
        let mut state = ListState::new(false);
        state.begin_request();
        state.ingest_322(&["me", "#rust", "120", "Rust chat"]);
        state.ingest_322(&["me", "#empty", "1", ""]);
        state.finish_ingest(&SimpleExprEvaluator).unwrap();
        state.set_filter("u:10", &SimpleExprEvaluator).unwrap();
        let names: Vec<_> = state.filter_channels().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["#rust"]);
    }

    #[test]
    fn filter_name_glob() {
        let mut state = ListState::new(false);
        state.channels.push(entry("#rustlang", 5, ""));
        state.channels.push(entry("#python", 5, ""));
        state.set_filter("n:rust*", &SimpleExprEvaluator).unwrap();
        let names: Vec<_> = state.filter_channels().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["#rustlang"]);
    }

    #[test]
    fn sort_by_users_descending() {
        let mut state = ListState::new(false);
        state.channels.push(entry("#a", 5, ""));
        state.channels.push(entry("#b", 50, ""));
        state.channels.push(entry("#c", 1, ""));
        state.set_sort("-users", &SimpleExprEvaluator).unwrap();
        let names: Vec<_> = state.filter_channels().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["#b", "#a", "#c"]);
    }

    #[test]
    fn selection_clamps_to_view_bounds() {
        let mut state = ListState::new(false);
        state.channels.push(entry("#a", 1, ""));
        state.set_filter("*", &SimpleExprEvaluator).unwrap();
        state.move_selection(-5);
        assert_eq!(state.selected_line, 0);
        state.move_selection(5);
        assert_eq!(state.selected_line, 0);
    }

    #[test]
    fn c_filter_uses_expression_evaluator() {
        let mut state = ListState::new(false);
        state.channels.push(entry("#a", 100, ""));
        state.channels.push(entry("#b", 2, ""));
        state.set_filter("c:users>10", &SimpleExprEvaluator).unwrap();
        let names: Vec<_> = state.filter_channels().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["#a"]);
    }
}
