//! Typed object encoding for the relay binary protocol (spec §4.6).
//!
//! Grounded on `relay-weechat-msg.c`'s object-tag constants and its
//! `relay_weechat_msg_add_*` family of writers. Per design note §9
//! ("Polymorphism over object types in the relay encoder"), the C side's
//! type-tag string plus a big switch becomes one tagged-variant [`Object`]
//! enum with a single recursive `write_to`/`read_from` pair rather than a
//! parallel family of free functions per type.

use std::collections::HashMap;

use super::RelayError;

/// The 3-byte ASCII type tag identifying an [`Object`]'s wire encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// `chr`
    Char,
    /// `int`
    Int,
    /// `lon`
    Long,
    /// `str`
    Str,
    /// `buf`
    Buf,
    /// `ptr`
    Ptr,
    /// `tim`
    Time,
    /// `htb`
    Hashtable,
    /// `hda`
    Hdata,
    /// `inf`
    Info,
    /// `inl`
    Infolist,
    /// `arr`
    Array,
}

impl ObjectKind {
    /// The 3-byte ASCII tag written on the wire for this kind.
    pub fn tag(self) -> &'static [u8; 3] {
        match self {
            ObjectKind::Char => b"chr",
            ObjectKind::Int => b"int",
            ObjectKind::Long => b"lon",
            ObjectKind::Str => b"str",
            ObjectKind::Buf => b"buf",
            ObjectKind::Ptr => b"ptr",
            ObjectKind::Time => b"tim",
            ObjectKind::Hashtable => b"htb",
            ObjectKind::Hdata => b"hda",
            ObjectKind::Info => b"inf",
            ObjectKind::Infolist => b"inl",
            ObjectKind::Array => b"arr",
        }
    }

    /// Resolves a 3-byte ASCII tag back to its [`ObjectKind`].
    pub fn from_tag(tag: [u8; 3]) -> Result<Self, RelayError> {
        match &tag {
            b"chr" => Ok(ObjectKind::Char),
            b"int" => Ok(ObjectKind::Int),
            b"lon" => Ok(ObjectKind::Long),
            b"str" => Ok(ObjectKind::Str),
            b"buf" => Ok(ObjectKind::Buf),
            b"ptr" => Ok(ObjectKind::Ptr),
            b"tim" => Ok(ObjectKind::Time),
            b"htb" => Ok(ObjectKind::Hashtable),
            b"hda" => Ok(ObjectKind::Hdata),
            b"inf" => Ok(ObjectKind::Info),
            b"inl" => Ok(ObjectKind::Infolist),
            b"arr" => Ok(ObjectKind::Array),
            _ => Err(RelayError::UnknownObjectTag(tag)),
        }
    }
}

/// A declared `hdata` field type (spec §4.6 "hda rows"): either a plain
/// scalar object kind, or `arr`, meaning the row embeds a full
/// self-describing [`Object::Array`] (its own element-type tag and
/// count) for that field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// A plain scalar, written without its own type tag (the tag is
    /// already declared once in the hdata's `keys-with-types` header).
    Scalar(ObjectKind),
    /// A self-describing array value.
    Array,
}

impl FieldKind {
    fn to_type_str(self) -> String {
        match self {
            FieldKind::Scalar(kind) => String::from_utf8_lossy(kind.tag()).into_owned(),
            FieldKind::Array => "arr".to_string(),
        }
    }

    fn parse(s: &str) -> Option<Self> {
        if s == "arr" {
            return Some(FieldKind::Array);
        }
        let mut tag = [0u8; 3];
        let bytes = s.as_bytes();
        if bytes.len() != 3 {
            return None;
        }
        tag.copy_from_slice(bytes);
        ObjectKind::from_tag(tag).ok().map(FieldKind::Scalar)
    }
}

/// One row of an `hda` object: one pointer per hpath segment, plus one
/// value per declared key, in declaration order.
#[derive(Clone, Debug, PartialEq)]
pub struct HdataRow {
    /// One pointer per `/`-separated hpath segment.
    pub path_pointers: Vec<u64>,
    /// Field values, in the same order as the hdata's declared keys.
    pub values: Vec<Object>,
}

/// A `hda` (record set) object (spec §4.6 "hda rows").
#[derive(Clone, Debug, PartialEq)]
pub struct Hdata {
    /// `/`-separated chain of container type names (e.g.
    /// `buffer/nicklist_item`).
    pub hpath: String,
    /// Declared `(name, type)` pairs, in wire order.
    pub keys: Vec<(String, FieldKind)>,
    /// The record rows.
    pub rows: Vec<HdataRow>,
}

/// One item of an `inl` (infolist) object: an ordered set of named,
/// individually-tagged variables.
#[derive(Clone, Debug, PartialEq)]
pub struct InfolistItem {
    /// `(name, value)` pairs, in wire order.
    pub vars: Vec<(String, Object)>,
}

/// A typed value in the relay object stream (spec §4.6 "Object encoding").
#[derive(Clone, Debug, PartialEq)]
pub enum Object {
    /// `chr`
    Char(u8),
    /// `int`
    Int(i32),
    /// `lon`
    Long(i64),
    /// `str`; `None` is the wire NULL (length prefix -1), distinct from `Some(String::new())`.
    Str(Option<String>),
    /// `buf`; `None` is the wire NULL, distinct from `Some(Vec::new())`.
    Buf(Option<Vec<u8>>),
    /// `ptr`; a bare pointer value. `0` is WeeChat's NULL pointer.
    Ptr(u64),
    /// `tim`; seconds since the epoch.
    Time(i64),
    /// `htb`
    Hashtable {
        /// Declared key type.
        key_kind: ObjectKind,
        /// Declared value type.
        value_kind: ObjectKind,
        /// Items, insertion order.
        items: Vec<(Object, Object)>,
    },
    /// `hda`
    Hdata(Hdata),
    /// `inf`
    Info {
        /// Info name.
        name: String,
        /// Info value.
        value: Option<String>,
    },
    /// `inl`
    Infolist {
        /// Infolist name.
        name: String,
        /// Items, in wire order.
        items: Vec<InfolistItem>,
    },
    /// `arr`
    Array {
        /// Element kind.
        element_kind: ObjectKind,
        /// Elements, in wire order.
        values: Vec<Object>,
    },
}

impl Object {
    /// This object's [`ObjectKind`].
    pub fn kind(&self) -> ObjectKind {
        match self {
            Object::Char(_) => ObjectKind::Char,
            Object::Int(_) => ObjectKind::Int,
            Object::Long(_) => ObjectKind::Long,
            Object::Str(_) => ObjectKind::Str,
            Object::Buf(_) => ObjectKind::Buf,
            Object::Ptr(_) => ObjectKind::Ptr,
            Object::Time(_) => ObjectKind::Time,
            Object::Hashtable { .. } => ObjectKind::Hashtable,
            Object::Hdata(_) => ObjectKind::Hdata,
            Object::Info { .. } => ObjectKind::Info,
            Object::Infolist { .. } => ObjectKind::Infolist,
            Object::Array { .. } => ObjectKind::Array,
        }
    }

    /// Encodes this object with its leading 3-byte type tag, appending
    /// to `out`.
    pub fn write_tagged(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.kind().tag());
        self.write_payload(out);
    }

    /// Encodes this object's payload, without the leading type tag (used
    /// for `hda` scalar fields, whose type is declared once in the
    /// header rather than per-value).
    pub fn write_payload(&self, out: &mut Vec<u8>) {
        match self {
            Object::Char(c) => out.push(*c),
            Object::Int(v) => out.extend_from_slice(&v.to_be_bytes()),
            Object::Long(v) => write_decimal(out, *v),
            Object::Str(s) => write_string(out, s.as_deref()),
            Object::Buf(b) => write_buf(out, b.as_deref()),
            Object::Ptr(p) => write_pointer(out, *p),
            Object::Time(t) => write_decimal(out, *t),
            Object::Hashtable { key_kind, value_kind, items } => {
                out.extend_from_slice(key_kind.tag());
                out.extend_from_slice(value_kind.tag());
                out.extend_from_slice(&(items.len() as i32).to_be_bytes());
                for (k, v) in items {
                    k.write_payload(out);
                    v.write_payload(out);
                }
            }
            Object::Hdata(hdata) => write_hdata(out, hdata),
            Object::Info { name, value } => {
                write_string(out, Some(name));
                write_string(out, value.as_deref());
            }
            Object::Infolist { name, items } => {
                write_string(out, Some(name));
                out.extend_from_slice(&(items.len() as i32).to_be_bytes());
                for item in items {
                    out.extend_from_slice(&(item.vars.len() as i32).to_be_bytes());
                    for (name, value) in &item.vars {
                        write_string(out, Some(name));
                        value.write_tagged(out);
                    }
                }
            }
            Object::Array { element_kind, values } => {
                out.extend_from_slice(element_kind.tag());
                out.extend_from_slice(&(values.len() as i32).to_be_bytes());
                for v in values {
                    v.write_payload(out);
                }
            }
        }
    }

    /// Reads one tagged object (3-byte kind tag, then its payload).
    pub fn read_tagged(r: &mut Reader<'_>) -> Result<Self, RelayError> {
        let tag = r.read_tag()?;
        let kind = ObjectKind::from_tag(tag)?;
        Object::read_payload(r, kind)
    }

    /// Reads one object's payload, given an already-known `kind`.
    pub fn read_payload(r: &mut Reader<'_>, kind: ObjectKind) -> Result<Self, RelayError> {
        Ok(match kind {
            ObjectKind::Char => Object::Char(r.read_u8()?),
            ObjectKind::Int => Object::Int(r.read_i32()?),
            ObjectKind::Long => Object::Long(read_decimal(r)?),
            ObjectKind::Str => Object::Str(read_string(r)?),
            ObjectKind::Buf => Object::Buf(read_buf(r)?),
            ObjectKind::Ptr => Object::Ptr(read_pointer(r)?),
            ObjectKind::Time => Object::Time(read_decimal(r)?),
            ObjectKind::Hashtable => {
                let key_kind = ObjectKind::from_tag(r.read_tag()?)?;
                let value_kind = ObjectKind::from_tag(r.read_tag()?)?;
                let count = r.read_i32()?.max(0) as usize;
                let mut items = Vec::with_capacity(count);
                for _ in 0..count {
                    let k = Object::read_payload(r, key_kind)?;
                    let v = Object::read_payload(r, value_kind)?;
                    items.push((k, v));
                }
                Object::Hashtable { key_kind, value_kind, items }
            }
            ObjectKind::Hdata => Object::Hdata(read_hdata(r)?),
            ObjectKind::Info => {
                let name = read_string(r)?.unwrap_or_default();
                let value = read_string(r)?;
                Object::Info { name, value }
            }
            ObjectKind::Infolist => {
                let name = read_string(r)?.unwrap_or_default();
                let item_count = r.read_i32()?.max(0) as usize;
                let mut items = Vec::with_capacity(item_count);
                for _ in 0..item_count {
                    let var_count = r.read_i32()?.max(0) as usize;
                    let mut vars = Vec::with_capacity(var_count);
                    for _ in 0..var_count {
                        let name = read_string(r)?.unwrap_or_default();
                        let value = Object::read_tagged(r)?;
                        vars.push((name, value));
                    }
                    items.push(InfolistItem { vars });
                }
                Object::Infolist { name, items }
            }
            ObjectKind::Array => {
                let element_kind = ObjectKind::from_tag(r.read_tag()?)?;
                let count = r.read_i32()?.max(0) as usize;
                let mut values = Vec::with_capacity(count);
                for _ in 0..count {
                    values.push(Object::read_payload(r, element_kind)?);
                }
                Object::Array { element_kind, values }
            }
        })
    }
}

fn write_hdata(out: &mut Vec<u8>, hdata: &Hdata) {
    write_string(out, Some(&hdata.hpath));
    let keys_types = hdata
        .keys
        .iter()
        .map(|(name, kind)| format!("{name}:{}", kind.to_type_str()))
        .collect::<Vec<_>>()
        .join(",");
    write_string(out, Some(&keys_types));
    out.extend_from_slice(&(hdata.rows.len() as i32).to_be_bytes());
    for row in &hdata.rows {
        for ptr in &row.path_pointers {
            write_pointer(out, *ptr);
        }
        for value in &row.values {
            value.write_payload(out);
        }
    }
}

fn read_hdata(r: &mut Reader<'_>) -> Result<Hdata, RelayError> {
    let hpath = read_string(r)?.unwrap_or_default();
    let keys_types = read_string(r)?.unwrap_or_default();
    let keys: Vec<(String, FieldKind)> = keys_types
        .split(',')
        .filter(|s| !s.is_empty())
        .filter_map(|entry| {
            let (name, kind) = entry.split_once(':')?;
            Some((name.to_string(), FieldKind::parse(kind)?))
        })
        .collect();
    let path_len = hpath.split('/').filter(|s| !s.is_empty()).count().max(1);
    let row_count = r.read_i32()?.max(0) as usize;
    let mut rows = Vec::with_capacity(row_count);
    for _ in 0..row_count {
        let mut path_pointers = Vec::with_capacity(path_len);
        for _ in 0..path_len {
            path_pointers.push(read_pointer(r)?);
        }
        let mut values = Vec::with_capacity(keys.len());
        for (_, kind) in &keys {
            let value = match kind {
                FieldKind::Array => Object::read_payload(r, ObjectKind::Array)?,
                FieldKind::Scalar(k) => Object::read_payload(r, *k)?,
            };
            values.push(value);
        }
        rows.push(HdataRow { path_pointers, values });
    }
    Ok(Hdata { hpath, keys, rows })
}

fn write_string(out: &mut Vec<u8>, s: Option<&str>) {
    match s {
        None => out.extend_from_slice(&(-1i32).to_be_bytes()),
        Some(s) => {
            out.extend_from_slice(&(s.len() as i32).to_be_bytes());
            out.extend_from_slice(s.as_bytes());
        }
    }
}

fn write_buf(out: &mut Vec<u8>, b: Option<&[u8]>) {
    match b {
        None => out.extend_from_slice(&(-1i32).to_be_bytes()),
        Some(b) => {
            out.extend_from_slice(&(b.len() as i32).to_be_bytes());
            out.extend_from_slice(b);
        }
    }
}

fn write_decimal(out: &mut Vec<u8>, value: i64) {
    let digits = value.to_string();
    out.push(digits.len() as u8);
    out.extend_from_slice(digits.as_bytes());
}

fn write_pointer(out: &mut Vec<u8>, value: u64) {
    let hex = format!("{value:x}");
    out.push(hex.len() as u8);
    out.extend_from_slice(hex.as_bytes());
}

fn read_string(r: &mut Reader<'_>) -> Result<Option<String>, RelayError> {
    let len = r.read_i32()?;
    if len < 0 {
        return Ok(None);
    }
    let bytes = r.read_bytes(len as usize)?;
    Ok(Some(String::from_utf8_lossy(bytes).into_owned()))
}

fn read_buf(r: &mut Reader<'_>) -> Result<Option<Vec<u8>>, RelayError> {
    let len = r.read_i32()?;
    if len < 0 {
        return Ok(None);
    }
    Ok(Some(r.read_bytes(len as usize)?.to_vec()))
}

fn read_decimal(r: &mut Reader<'_>) -> Result<i64, RelayError> {
    let len = r.read_u8()? as usize;
    let bytes = r.read_bytes(len)?;
    let s = std::str::from_utf8(bytes).map_err(|_| RelayError::Malformed("non-UTF8 decimal field".to_string()))?;
    s.parse::<i64>().map_err(|_| RelayError::Malformed(format!("invalid decimal field {s:?}")))
}

fn read_pointer(r: &mut Reader<'_>) -> Result<u64, RelayError> {
    let len = r.read_u8()? as usize;
    let bytes = r.read_bytes(len)?;
    let s = std::str::from_utf8(bytes).map_err(|_| RelayError::Malformed("non-UTF8 pointer field".to_string()))?;
    if s.is_empty() {
        return Ok(0);
    }
    u64::from_str_radix(s, 16).map_err(|_| RelayError::Malformed(format!("invalid pointer field {s:?}")))
}

/// A cursor over an in-memory payload, tracking position and surfacing
/// short reads as [`RelayError::Truncated`] (spec §7: malformed/short
/// input is never fatal, it asks the transport for more bytes).
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Wraps `buf` for reading from the start.
    pub fn new(buf: &'a [u8]) -> Self {
        Reader { buf, pos: 0 }
    }

    /// Current byte offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes remaining.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn ensure(&self, n: usize) -> Result<(), RelayError> {
        if self.remaining() < n {
            Err(RelayError::Truncated { need: n - self.remaining() })
        } else {
            Ok(())
        }
    }

    fn read_u8(&mut self) -> Result<u8, RelayError> {
        self.ensure(1)?;
        let b = self.buf[self.pos];
        self.pos += 1;
        Ok(b)
    }

    fn read_i32(&mut self) -> Result<i32, RelayError> {
        self.ensure(4)?;
        let bytes = [self.buf[self.pos], self.buf[self.pos + 1], self.buf[self.pos + 2], self.buf[self.pos + 3]];
        self.pos += 4;
        Ok(i32::from_be_bytes(bytes))
    }

    fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], RelayError> {
        self.ensure(n)?;
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_tag(&mut self) -> Result<[u8; 3], RelayError> {
        let bytes = self.read_bytes(3)?;
        Ok([bytes[0], bytes[1], bytes[2]])
    }
}

/// Convenience constructor for a `htb` object over `HashMap<String,
/// String>`-shaped data, the common case for WHOIS-style redirect error
/// payloads (spec §7 "Redirect failure/timeout").
pub fn string_hashtable(items: &HashMap<String, String>) -> Object {
    Object::Hashtable {
        key_kind: ObjectKind::Str,
        value_kind: ObjectKind::Str,
        items: items
            .iter()
            .map(|(k, v)| (Object::Str(Some(k.clone())), Object::Str(Some(v.clone()))))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(obj: &Object) -> Object {
        let mut buf = Vec::new();
        obj.write_tagged(&mut buf);
        let mut r = Reader::new(&buf);
        Object::read_tagged(&mut r).unwrap()
    }

    #[test]
    fn scalar_round_trips() {
        assert_eq!(round_trip(&Object::Char(b'A')), Object::Char(b'A'));
        assert_eq!(round_trip(&Object::Int(123_456)), Object::Int(123_456));
        assert_eq!(round_trip(&Object::Int(-123_456)), Object::Int(-123_456));
        assert_eq!(round_trip(&Object::Long(1_234_567_890)), Object::Long(1_234_567_890));
        assert_eq!(round_trip(&Object::Time(1_321_993_456)), Object::Time(1_321_993_456));
    }

    #[test]
    fn string_null_distinct_from_empty() {
        assert_eq!(round_trip(&Object::Str(Some("a string".to_string()))), Object::Str(Some("a string".to_string())));
        assert_eq!(round_trip(&Object::Str(Some(String::new()))), Object::Str(Some(String::new())));
        assert_eq!(round_trip(&Object::Str(None)), Object::Str(None));
    }

    #[test]
    fn buffer_null_distinct_from_empty() {
        assert_eq!(round_trip(&Object::Buf(Some(b"buffer".to_vec()))), Object::Buf(Some(b"buffer".to_vec())));
        assert_eq!(round_trip(&Object::Buf(None)), Object::Buf(None));
    }

    #[test]
    fn pointer_null_and_value() {
        assert_eq!(round_trip(&Object::Ptr(0x1234_abcd)), Object::Ptr(0x1234_abcd));
        assert_eq!(round_trip(&Object::Ptr(0)), Object::Ptr(0));
    }

    #[test]
    fn array_of_strings_and_ints() {
        let arr = Object::Array {
            element_kind: ObjectKind::Str,
            values: vec![Object::Str(Some("abc".to_string())), Object::Str(Some("de".to_string()))],
        };
        assert_eq!(round_trip(&arr), arr);

        let arr = Object::Array {
            element_kind: ObjectKind::Int,
            values: vec![Object::Int(123), Object::Int(456), Object::Int(789)],
        };
        assert_eq!(round_trip(&arr), arr);
    }

    #[test]
    fn hashtable_round_trips() {
        let ht = Object::Hashtable {
            key_kind: ObjectKind::Str,
            value_kind: ObjectKind::Int,
            items: vec![(Object::Str(Some("a".to_string())), Object::Int(1))],
        };
        assert_eq!(round_trip(&ht), ht);
    }

    #[test]
    fn hdata_with_scalar_and_array_fields_round_trips() {
        let hdata = Hdata {
            hpath: "buffer/nicklist_item".to_string(),
            keys: vec![
                ("group".to_string(), FieldKind::Scalar(ObjectKind::Char)),
                ("name".to_string(), FieldKind::Scalar(ObjectKind::Str)),
                ("tags".to_string(), FieldKind::Array),
            ],
            rows: vec![HdataRow {
                path_pointers: vec![0x1000, 0x2000],
                values: vec![
                    Object::Char(0),
                    Object::Str(Some("alice".to_string())),
                    Object::Array { element_kind: ObjectKind::Str, values: vec![Object::Str(Some("op".to_string()))] },
                ],
            }],
        };
        let obj = Object::Hdata(hdata);
        assert_eq!(round_trip(&obj), obj);
    }

    #[test]
    fn truncated_input_reports_need_more_bytes() {
        let mut r = Reader::new(&[0x00, 0x00]);
        let err = r.read_i32().unwrap_err();
        assert!(matches!(err, RelayError::Truncated { .. }));
    }
}
