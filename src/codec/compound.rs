//! Compound value writers: lists, maps, and arrays.
//!
//! Each element is emitted through a registry-selected sub-writer, so
//! containers hold heterogeneous field types without any static schema
//! coupling. The container prefix (size and count, width chosen for
//! compactness) is computed once when the value is bound; elements are
//! then streamed one at a time, resuming mid-element across calls.

use crate::codec::codes;
use crate::codec::registry::Registry;
use crate::codec::writer::{encoded_size, ValueWriter};
use crate::error::{CodecError, Result};
use crate::types::{Value, ValueKind};

/// Copy pending prefix bytes into `buf`, advancing `pos`.
pub(crate) fn copy_prefix(prefix: &[u8], pos: &mut u8, buf: &mut [u8]) -> usize {
    let start = *pos as usize;
    let n = (prefix.len() - start).min(buf.len());
    buf[..n].copy_from_slice(&prefix[start..start + n]);
    *pos += n as u8;
    n
}

/// Fill `out` with a list constructor, size, and count; returns the
/// prefix length. Empty lists collapse to the zero-payload form.
pub(crate) fn list_prefix(count: usize, payload: usize, out: &mut [u8; 9]) -> u8 {
    if count == 0 {
        out[0] = codes::LIST0;
        1
    } else if count <= u8::MAX as usize && payload + 1 <= u8::MAX as usize {
        out[0] = codes::LIST8;
        out[1] = (payload + 1) as u8;
        out[2] = count as u8;
        3
    } else {
        out[0] = codes::LIST32;
        out[1..5].copy_from_slice(&((payload + 4) as u32).to_be_bytes());
        out[5..9].copy_from_slice(&(count as u32).to_be_bytes());
        9
    }
}

/// Total encoded length of a list with `count` elements occupying
/// `payload` bytes.
pub(crate) fn list_size(count: usize, payload: usize) -> usize {
    let mut scratch = [0u8; 9];
    list_prefix(count, payload, &mut scratch) as usize + payload
}

/// Fill `out` with a map constructor, size, and count (keys plus
/// values); returns the prefix length.
pub(crate) fn map_prefix(count: usize, payload: usize, out: &mut [u8; 9]) -> u8 {
    if count <= u8::MAX as usize && payload + 1 <= u8::MAX as usize {
        out[0] = codes::MAP8;
        out[1] = (payload + 1) as u8;
        out[2] = count as u8;
        3
    } else {
        out[0] = codes::MAP32;
        out[1..5].copy_from_slice(&((payload + 4) as u32).to_be_bytes());
        out[5..9].copy_from_slice(&(count as u32).to_be_bytes());
        9
    }
}

/// Total encoded length of a map with `count` keys-plus-values
/// occupying `payload` bytes.
pub(crate) fn map_size(count: usize, payload: usize) -> usize {
    let mut scratch = [0u8; 9];
    map_prefix(count, payload, &mut scratch) as usize + payload
}

/// Writer for ordered, heterogeneous lists.
pub struct ListWriter<'r> {
    registry: &'r Registry,
    prefix: [u8; 9],
    prefix_len: u8,
    prefix_pos: u8,
    fields: Vec<Box<dyn ValueWriter + 'r>>,
    index: usize,
    set: bool,
}

impl<'r> ListWriter<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            prefix: [0; 9],
            prefix_len: 0,
            prefix_pos: 0,
            fields: Vec::new(),
            index: 0,
            set: false,
        }
    }
}

impl<'r> ValueWriter for ListWriter<'r> {
    fn set_value(&mut self, value: Value) -> Result<()> {
        debug_assert!(!self.set, "set_value called twice");
        let items = match value {
            Value::List(items) => items,
            other => {
                return Err(CodecError::internal(format!(
                    "list writer bound to {:?}",
                    other.kind()
                )))
            }
        };
        let payload: usize = items.iter().map(encoded_size).sum();
        self.prefix_len = list_prefix(items.len(), payload, &mut self.prefix);
        self.fields = items
            .into_iter()
            .map(|v| self.registry.get_value_writer(v))
            .collect::<Result<Vec<_>>>()?;
        self.set = true;
        Ok(())
    }

    fn write_to_buffer(&mut self, buf: &mut [u8]) -> usize {
        let mut written = copy_prefix(
            &self.prefix[..self.prefix_len as usize],
            &mut self.prefix_pos,
            buf,
        );
        while self.index < self.fields.len() && written < buf.len() {
            let field = &mut self.fields[self.index];
            written += field.write_to_buffer(&mut buf[written..]);
            if field.is_complete() {
                self.index += 1;
            } else {
                break;
            }
        }
        written
    }

    fn is_complete(&self) -> bool {
        self.set && self.prefix_pos == self.prefix_len && self.index == self.fields.len()
    }
}

/// Writer for key-unique maps. Keys and values interleave on the wire;
/// the count field covers both.
pub struct MapWriter<'r> {
    registry: &'r Registry,
    prefix: [u8; 9],
    prefix_len: u8,
    prefix_pos: u8,
    entries: Vec<Box<dyn ValueWriter + 'r>>,
    index: usize,
    set: bool,
}

impl<'r> MapWriter<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            prefix: [0; 9],
            prefix_len: 0,
            prefix_pos: 0,
            entries: Vec::new(),
            index: 0,
            set: false,
        }
    }
}

impl<'r> ValueWriter for MapWriter<'r> {
    fn set_value(&mut self, value: Value) -> Result<()> {
        debug_assert!(!self.set, "set_value called twice");
        let pairs = match value {
            Value::Map(pairs) => pairs,
            other => {
                return Err(CodecError::internal(format!(
                    "map writer bound to {:?}",
                    other.kind()
                )))
            }
        };
        let payload: usize = pairs
            .iter()
            .map(|(k, v)| encoded_size(k) + encoded_size(v))
            .sum();
        self.prefix_len = map_prefix(pairs.len() * 2, payload, &mut self.prefix);
        let mut entries = Vec::with_capacity(pairs.len() * 2);
        for (key, val) in pairs {
            entries.push(self.registry.get_value_writer(key)?);
            entries.push(self.registry.get_value_writer(val)?);
        }
        self.entries = entries;
        self.set = true;
        Ok(())
    }

    fn write_to_buffer(&mut self, buf: &mut [u8]) -> usize {
        let mut written = copy_prefix(
            &self.prefix[..self.prefix_len as usize],
            &mut self.prefix_pos,
            buf,
        );
        while self.index < self.entries.len() && written < buf.len() {
            let entry = &mut self.entries[self.index];
            written += entry.write_to_buffer(&mut buf[written..]);
            if entry.is_complete() {
                self.index += 1;
            } else {
                break;
            }
        }
        written
    }

    fn is_complete(&self) -> bool {
        self.set && self.prefix_pos == self.prefix_len && self.index == self.entries.len()
    }
}

/// Writer for homogeneous arrays.
///
/// Arrays carry a single element constructor followed by bare element
/// payloads, so elements use the wide (fixed-width) encodings rather
/// than the per-value compact forms. Only scalar and variable-width
/// element kinds are supported; the broker never produces nested or
/// described arrays.
pub struct ArrayWriter {
    prefix: [u8; 10],
    prefix_len: u8,
    prefix_pos: u8,
    items: Vec<Value>,
    index: usize,
    scratch: Vec<u8>,
    scratch_pos: usize,
    set: bool,
}

impl ArrayWriter {
    pub fn new() -> Self {
        Self {
            prefix: [0; 10],
            prefix_len: 0,
            prefix_pos: 0,
            items: Vec::new(),
            index: 0,
            scratch: Vec::new(),
            scratch_pos: 0,
            set: false,
        }
    }
}

impl Default for ArrayWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueWriter for ArrayWriter {
    fn set_value(&mut self, value: Value) -> Result<()> {
        debug_assert!(!self.set, "set_value called twice");
        let items = match value {
            Value::Array(items) => items,
            other => {
                return Err(CodecError::internal(format!(
                    "array writer bound to {:?}",
                    other.kind()
                )))
            }
        };
        let elem_code = array_element_code(&items)?;
        let payload: usize = items.iter().map(wide_payload_size).sum();
        self.prefix_len = array_prefix(items.len(), elem_code, payload, &mut self.prefix);
        self.items = items;
        self.set = true;
        Ok(())
    }

    fn write_to_buffer(&mut self, buf: &mut [u8]) -> usize {
        let mut written = copy_prefix(
            &self.prefix[..self.prefix_len as usize],
            &mut self.prefix_pos,
            buf,
        );
        while self.index < self.items.len() || self.scratch_pos < self.scratch.len() {
            if self.scratch_pos == self.scratch.len() {
                // Refill before the capacity check so zero-payload
                // elements drain even when the buffer is already full.
                self.scratch.clear();
                write_wide_payload(&self.items[self.index], &mut self.scratch);
                self.scratch_pos = 0;
                self.index += 1;
                continue;
            }
            if written == buf.len() {
                break;
            }
            let n = (self.scratch.len() - self.scratch_pos).min(buf.len() - written);
            buf[written..written + n]
                .copy_from_slice(&self.scratch[self.scratch_pos..self.scratch_pos + n]);
            written += n;
            self.scratch_pos += n;
        }
        written
    }

    fn is_complete(&self) -> bool {
        self.set
            && self.prefix_pos == self.prefix_len
            && self.index == self.items.len()
            && self.scratch_pos == self.scratch.len()
    }
}

/// Fill `out` with an array constructor, size, count, and element
/// constructor; returns the prefix length.
fn array_prefix(count: usize, elem_code: u8, payload: usize, out: &mut [u8; 10]) -> u8 {
    // Size counts everything after the size field: count, element
    // constructor, element payloads.
    let body = 1 + payload;
    if count <= u8::MAX as usize && body + 1 <= u8::MAX as usize {
        out[0] = codes::ARRAY8;
        out[1] = (body + 1) as u8;
        out[2] = count as u8;
        out[3] = elem_code;
        4
    } else {
        out[0] = codes::ARRAY32;
        out[1..5].copy_from_slice(&((body + 4) as u32).to_be_bytes());
        out[5..9].copy_from_slice(&(count as u32).to_be_bytes());
        out[9] = elem_code;
        10
    }
}

/// Total encoded length of an array.
pub(crate) fn array_size(items: &[Value]) -> usize {
    let payload: usize = items.iter().map(wide_payload_size).sum();
    let mut scratch = [0u8; 10];
    let code = array_element_code(items).unwrap_or(codes::NULL);
    array_prefix(items.len(), code, payload, &mut scratch) as usize + payload
}

/// The single wide element constructor shared by every array element.
/// An empty array carries the null constructor.
fn array_element_code(items: &[Value]) -> Result<u8> {
    let Some(first) = items.first() else {
        return Ok(codes::NULL);
    };
    let code = match first.kind() {
        ValueKind::Null => codes::NULL,
        ValueKind::Bool => codes::BOOL,
        ValueKind::Ubyte => codes::UBYTE,
        ValueKind::Ushort => codes::USHORT,
        ValueKind::Uint => codes::UINT,
        ValueKind::Ulong => codes::ULONG,
        ValueKind::Byte => codes::BYTE,
        ValueKind::Short => codes::SHORT,
        ValueKind::Int => codes::INT,
        ValueKind::Long => codes::LONG,
        ValueKind::Float => codes::FLOAT,
        ValueKind::Double => codes::DOUBLE,
        ValueKind::Timestamp => codes::TIMESTAMP,
        ValueKind::Uuid => codes::UUID,
        ValueKind::Binary => codes::VBIN32,
        ValueKind::String => codes::STR32,
        ValueKind::Symbol => codes::SYM32,
        kind @ (ValueKind::List | ValueKind::Map | ValueKind::Array | ValueKind::Described) => {
            return Err(CodecError::internal(format!(
                "array of {kind:?} elements is not supported"
            )))
        }
    };
    Ok(code)
}

/// Payload length of one array element under its wide encoding.
fn wide_payload_size(value: &Value) -> usize {
    match value {
        Value::Null => 0,
        Value::Bool(_) | Value::Ubyte(_) | Value::Byte(_) => 1,
        Value::Ushort(_) | Value::Short(_) => 2,
        Value::Uint(_) | Value::Int(_) | Value::Float(_) => 4,
        Value::Ulong(_) | Value::Long(_) | Value::Double(_) | Value::Timestamp(_) => 8,
        Value::Uuid(_) => 16,
        Value::Binary(b) => 4 + b.len(),
        Value::String(s) => 4 + s.len(),
        Value::Symbol(s) => 4 + s.len(),
        other => {
            debug_assert!(false, "unsupported array element {:?}", other.kind());
            0
        }
    }
}

/// Emit one array element's payload bytes (no constructor).
fn write_wide_payload(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Null => {}
        Value::Bool(v) => out.push(*v as u8),
        Value::Ubyte(v) => out.push(*v),
        Value::Byte(v) => out.push(*v as u8),
        Value::Ushort(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::Short(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::Uint(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::Int(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::Float(v) => out.extend_from_slice(&v.to_bits().to_be_bytes()),
        Value::Ulong(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::Long(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::Double(v) => out.extend_from_slice(&v.to_bits().to_be_bytes()),
        Value::Timestamp(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::Uuid(v) => out.extend_from_slice(v.as_bytes()),
        Value::Binary(b) => {
            out.extend_from_slice(&(b.len() as u32).to_be_bytes());
            out.extend_from_slice(b);
        }
        Value::String(s) => {
            out.extend_from_slice(&(s.len() as u32).to_be_bytes());
            out.extend_from_slice(s.as_bytes());
        }
        Value::Symbol(s) => {
            out.extend_from_slice(&(s.len() as u32).to_be_bytes());
            out.extend_from_slice(s.as_str().as_bytes());
        }
        other => debug_assert!(false, "unsupported array element {:?}", other.kind()),
    }
}
