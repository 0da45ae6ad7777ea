//! Primitive field encodings shared by every method body: short
//! strings, long strings, and field tables.
//!
//! A short string is a u8 length prefix plus UTF-8 bytes, so its
//! content is capped at 255 bytes; [`ShortString::new`] enforces that
//! at construction and the encode path never re-checks. A field table
//! is a u32 byte-length prefix over entries of short-string name, type
//! tag, and tagged value.

use bytes::Bytes;

use crate::codec::Cursor;
use crate::error::{CodecError, Result};

/// UTF-8 string with a one-byte length prefix on the wire.
///
/// # Example
///
/// ```
/// use amqwire::framing::ShortString;
///
/// let queue = ShortString::new("orders").unwrap();
/// assert_eq!(queue.as_str(), "orders");
/// assert!(ShortString::new("x".repeat(256)).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShortString(String);

impl ShortString {
    /// Create a short string, failing when the content exceeds 255
    /// bytes.
    pub fn new(s: impl Into<String>) -> Result<Self> {
        let s = s.into();
        if s.len() > 255 {
            return Err(CodecError::framing(format!(
                "short string is {} bytes, limit is 255",
                s.len()
            )));
        }
        Ok(Self(s))
    }

    /// The string content.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Content length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the content is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Encoded size: length prefix plus content.
    pub(crate) fn encoded_size(&self) -> usize {
        1 + self.0.len()
    }

    pub(crate) fn encode(&self, out: &mut Vec<u8>) {
        out.push(self.0.len() as u8);
        out.extend_from_slice(self.0.as_bytes());
    }

    pub(crate) fn decode(cur: &mut Cursor<'_>) -> Result<Self> {
        let n = cur.try_get_u8("short string size")? as usize;
        Ok(Self(cur.try_get_str(n, "short string")?.to_owned()))
    }
}

impl std::fmt::Display for ShortString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub(crate) fn long_string_size(bytes: &[u8]) -> usize {
    4 + bytes.len()
}

pub(crate) fn encode_long_string(bytes: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    out.extend_from_slice(bytes);
}

pub(crate) fn decode_long_string(cur: &mut Cursor<'_>) -> Result<Bytes> {
    let n = cur.try_get_u32("long string size")? as usize;
    cur.try_get_bytes(n, "long string")
}

/// Tagged value inside a [`FieldTable`].
#[derive(Debug, Clone, PartialEq)]
pub enum TableValue {
    Bool(bool),
    Int(i32),
    Long(i64),
    LongString(Bytes),
    Timestamp(i64),
    Table(FieldTable),
    Void,
}

impl TableValue {
    fn tag(&self) -> u8 {
        match self {
            Self::Bool(_) => b't',
            Self::Int(_) => b'I',
            Self::Long(_) => b'l',
            Self::LongString(_) => b'S',
            Self::Timestamp(_) => b'T',
            Self::Table(_) => b'F',
            Self::Void => b'V',
        }
    }

    fn value_size(&self) -> usize {
        match self {
            Self::Bool(_) => 1,
            Self::Int(_) => 4,
            Self::Long(_) | Self::Timestamp(_) => 8,
            Self::LongString(bytes) => long_string_size(bytes),
            Self::Table(table) => table.encoded_size(),
            Self::Void => 0,
        }
    }

    fn encode_value(&self, out: &mut Vec<u8>) {
        match self {
            Self::Bool(v) => out.push(u8::from(*v)),
            Self::Int(v) => out.extend_from_slice(&v.to_be_bytes()),
            Self::Long(v) | Self::Timestamp(v) => out.extend_from_slice(&v.to_be_bytes()),
            Self::LongString(bytes) => encode_long_string(bytes, out),
            Self::Table(table) => table.encode(out),
            Self::Void => {}
        }
    }

    fn decode(tag: u8, cur: &mut Cursor<'_>) -> Result<Self> {
        match tag {
            b't' => Ok(Self::Bool(cur.try_get_u8("table boolean")? != 0)),
            b'I' => Ok(Self::Int(cur.try_get_i32("table int")?)),
            b'l' => Ok(Self::Long(cur.try_get_i64("table long")?)),
            b'S' => Ok(Self::LongString(decode_long_string(cur)?)),
            b'T' => Ok(Self::Timestamp(cur.try_get_i64("table timestamp")?)),
            b'F' => Ok(Self::Table(FieldTable::decode(cur)?)),
            b'V' => Ok(Self::Void),
            other => Err(CodecError::framing(format!(
                "unknown field table type tag 0x{other:02x}"
            ))),
        }
    }
}

/// Name → tagged value table carried by method arguments.
///
/// Entry order is preserved; name uniqueness is the producer's duty,
/// matching the compound map contract in the self-describing codec.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldTable(Vec<(ShortString, TableValue)>);

impl FieldTable {
    /// An empty table.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append an entry.
    pub fn insert(&mut self, name: ShortString, value: TableValue) {
        self.0.push((name, value));
    }

    /// The value for `name`, if present.
    pub fn get(&self, name: &str) -> Option<&TableValue> {
        self.0
            .iter()
            .find(|(n, _)| n.as_str() == name)
            .map(|(_, v)| v)
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the table has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn payload_size(&self) -> usize {
        self.0
            .iter()
            .map(|(name, value)| name.encoded_size() + 1 + value.value_size())
            .sum()
    }

    /// Encoded size: byte-length prefix plus entries.
    pub(crate) fn encoded_size(&self) -> usize {
        4 + self.payload_size()
    }

    pub(crate) fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.payload_size() as u32).to_be_bytes());
        for (name, value) in &self.0 {
            name.encode(out);
            out.push(value.tag());
            value.encode_value(out);
        }
    }

    pub(crate) fn decode(cur: &mut Cursor<'_>) -> Result<Self> {
        let size = cur.try_get_u32("field table size")? as usize;
        let slice = cur.try_get_slice(size, "field table")?;
        let mut sub = Cursor::new(slice);
        let mut entries = Vec::new();
        while !sub.is_empty() {
            let name = ShortString::decode(&mut sub)?;
            let tag = sub.try_get_u8("field table type tag")?;
            let value = TableValue::decode(tag, &mut sub)?;
            entries.push((name, value));
        }
        Ok(Self(entries))
    }
}
