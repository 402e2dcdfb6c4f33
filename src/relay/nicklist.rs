//! Nicklist and nicklist-diff encoding over the `hda` object (spec §4.6
//! "nicklist encoding"). Grounded on `relay_weechat_msg_add_nicklist` in
//! `relay-weechat-msg.c`.

use super::object::{FieldKind, Hdata, HdataRow, Object, ObjectKind};

/// One row to encode, either a group or a nick, before diff-context
/// deduplication is applied.
#[derive(Clone, Debug, PartialEq)]
pub struct NicklistItem {
    /// Pointer identity of the containing group (for nick rows) or of
    /// this group itself (for group rows).
    pub group_pointer: u64,
    /// Pointer identity of this row's own record.
    pub item_pointer: u64,
    /// `1` for a group row, `0` for a nick row (wire `group:chr`).
    pub is_group: bool,
    /// `1` if shown in the nicklist, `0` if hidden (wire `visible:chr`).
    pub visible: bool,
    /// Sort/indent level (wire `level:int`).
    pub level: i32,
    /// Group or nick name.
    pub name: String,
    /// Name display color, WeeChat color-name form.
    pub color: String,
    /// Status prefix character(s), e.g. `"@"`.
    pub prefix: String,
    /// Prefix display color.
    pub prefix_color: String,
}

const NICKLIST_HPATH: &str = "buffer/nicklist_item";

fn keys(diff: bool) -> Vec<(String, FieldKind)> {
    let mut keys = Vec::with_capacity(8);
    if diff {
        keys.push(("_diff".to_string(), FieldKind::Scalar(ObjectKind::Char)));
    }
    for (name, kind) in [
        ("group", ObjectKind::Char),
        ("visible", ObjectKind::Char),
        ("level", ObjectKind::Int),
        ("name", ObjectKind::Str),
        ("color", ObjectKind::Str),
        ("prefix", ObjectKind::Str),
        ("prefix_color", ObjectKind::Str),
    ] {
        keys.push((name.to_string(), FieldKind::Scalar(kind)));
    }
    keys
}

fn row_values(item: &NicklistItem) -> Vec<Object> {
    vec![
        Object::Char(item.is_group as u8),
        Object::Char(item.visible as u8),
        Object::Int(item.level),
        Object::Str(Some(item.name.clone())),
        Object::Str(Some(item.color.clone())),
        Object::Str(Some(item.prefix.clone())),
        Object::Str(Some(item.prefix_color.clone())),
    ]
}

/// Kind of change a diff row represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiffKind {
    /// `^`: parent group context, carried along with an addition but not
    /// itself an add/remove/change.
    Context,
    /// `+`: row added.
    Add,
    /// `-`: row removed.
    Remove,
    /// `*`: row changed in place.
    Change,
}

impl DiffKind {
    fn wire_char(self) -> u8 {
        match self {
            DiffKind::Context => b'^',
            DiffKind::Add => b'+',
            DiffKind::Remove => b'-',
            DiffKind::Change => b'*',
        }
    }
}

/// Builds the full (non-diff) nicklist snapshot as one `hda` object.
pub fn encode_nicklist_full(items: &[NicklistItem]) -> Object {
    let rows = items
        .iter()
        .map(|item| HdataRow {
            path_pointers: vec![item.group_pointer, item.item_pointer],
            values: row_values(item),
        })
        .collect();
    Object::Hdata(Hdata { hpath: NICKLIST_HPATH.to_string(), keys: keys(false), rows })
}

/// Builds a nicklist diff batch: `(DiffKind, NicklistItem)` pairs in
/// emission order. Consecutive additions sharing the same parent group
/// omit redundant context rows, and if the batch's row count would meet
/// or exceed `current_full_size`, a full snapshot is returned instead
/// (spec §4.6: "the encoder falls back to a full snapshot").
pub fn encode_nicklist_diff(
    changes: &[(DiffKind, NicklistItem)],
    current_full_size: usize,
) -> Object {
    if changes.len() >= current_full_size {
        let items: Vec<NicklistItem> = changes.iter().map(|(_, item)| item.clone()).collect();
        return encode_nicklist_full(&items);
    }

    let mut rows = Vec::with_capacity(changes.len());
    let mut last_context_group: Option<u64> = None;
    for (kind, item) in changes {
        if *kind == DiffKind::Add {
            if last_context_group != Some(item.group_pointer) {
                rows.push(diff_row(DiffKind::Context, item));
                last_context_group = Some(item.group_pointer);
            }
        } else {
            last_context_group = None;
        }
        rows.push(diff_row(*kind, item));
    }

    Object::Hdata(Hdata { hpath: NICKLIST_HPATH.to_string(), keys: keys(true), rows })
}

fn diff_row(kind: DiffKind, item: &NicklistItem) -> HdataRow {
    let mut values = Vec::with_capacity(8);
    values.push(Object::Char(kind.wire_char()));
    values.extend(row_values(item));
    HdataRow { path_pointers: vec![item.group_pointer, item.item_pointer], values }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nick(group: u64, item: u64, name: &str) -> NicklistItem {
        NicklistItem {
            group_pointer: group,
            item_pointer: item,
            is_group: false,
            visible: true,
            level: 0,
            name: name.to_string(),
            color: "bar_fg".to_string(),
            prefix: String::new(),
            prefix_color: String::new(),
        }
    }

    #[test]
    fn full_snapshot_has_no_diff_key() {
        let items = vec![nick(1, 2, "alice"), nick(1, 3, "bob")];
        let Object::Hdata(hdata) = encode_nicklist_full(&items) else { panic!("expected hdata") };
        assert!(!hdata.keys.iter().any(|(name, _)| name == "_diff"));
        assert_eq!(hdata.rows.len(), 2);
    }

    #[test]
    fn consecutive_additions_share_one_context_row() {
        let changes = vec![
            (DiffKind::Add, nick(1, 2, "alice")),
            (DiffKind::Add, nick(1, 3, "bob")),
        ];
        let Object::Hdata(hdata) = encode_nicklist_diff(&changes, 100) else { panic!("expected hdata") };
        // one context row + two add rows
        assert_eq!(hdata.rows.len(), 3);
        assert_eq!(hdata.rows[0].values[0], Object::Char(b'^'));
        assert_eq!(hdata.rows[1].values[0], Object::Char(b'+'));
        assert_eq!(hdata.rows[2].values[0], Object::Char(b'+'));
    }

    #[test]
    fn additions_under_different_groups_each_get_context() {
        let changes = vec![
            (DiffKind::Add, nick(1, 2, "alice")),
            (DiffKind::Add, nick(9, 3, "bob")),
        ];
        let Object::Hdata(hdata) = encode_nicklist_diff(&changes, 100) else { panic!("expected hdata") };
        assert_eq!(hdata.rows.len(), 4);
    }

    #[test]
    fn large_diff_batch_falls_back_to_full_snapshot() {
        let changes = vec![(DiffKind::Add, nick(1, 2, "alice")), (DiffKind::Remove, nick(1, 3, "bob"))];
        let Object::Hdata(hdata) = encode_nicklist_diff(&changes, 2) else { panic!("expected hdata") };
        assert!(!hdata.keys.iter().any(|(name, _)| name == "_diff"));
    }
}
