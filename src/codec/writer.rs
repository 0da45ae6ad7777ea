//! Scalar and variable-width value writers.
//!
//! A [`ValueWriter`] is a stateful, single-use object bound to exactly
//! one value. `write_to_buffer` is re-entrant: it may be called with a
//! destination whose remaining capacity is smaller than the value's
//! total encoded length, partially emitting bytes and resuming exactly
//! where it left off on the next call; no byte is duplicated or
//! skipped across calls. This is how a full socket send buffer is
//! handled without blocking inside the codec.
//!
//! Writers surface no recoverable errors while emitting: the value
//! handed to them is assumed valid per the domain model. Validation is
//! the producing component's responsibility.

use bytes::Bytes;

use crate::codec::codes;
use crate::codec::{compound, described};
use crate::error::Result;
use crate::types::Value;

/// Incremental, resumable encoder bound to a single value.
///
/// Callers must call [`set_value`](Self::set_value) exactly once before
/// the first [`write_to_buffer`](Self::write_to_buffer), and must stop
/// writing once [`is_complete`](Self::is_complete) reports true. A
/// writer is not reusable after completion and must not be shared
/// across concurrent callers.
pub trait ValueWriter {
    /// Bind the writer to its value. Called exactly once, by the
    /// registry, before the first write.
    fn set_value(&mut self, value: Value) -> Result<()>;

    /// Emit as many bytes as fit into `buf`, returning the count
    /// written. Forward progress is guaranteed whenever `buf` is
    /// non-empty and the writer is incomplete.
    fn write_to_buffer(&mut self, buf: &mut [u8]) -> usize;

    /// Whether every byte of the bound value has been emitted.
    fn is_complete(&self) -> bool;
}

/// Largest fixed scalar encoding: one code byte plus a 16-byte uuid.
const MAX_SCALAR: usize = 17;

/// Writer for null and the fixed-width scalar kinds.
///
/// The encoding is chosen for compactness per value: zero-valued and
/// byte-ranged integers use their one-byte forms.
pub struct ScalarWriter {
    encoded: [u8; MAX_SCALAR],
    len: u8,
    pos: u8,
    set: bool,
}

impl ScalarWriter {
    pub fn new() -> Self {
        Self {
            encoded: [0; MAX_SCALAR],
            len: 0,
            pos: 0,
            set: false,
        }
    }
}

impl Default for ScalarWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueWriter for ScalarWriter {
    fn set_value(&mut self, value: Value) -> Result<()> {
        debug_assert!(!self.set, "set_value called twice");
        self.len = encode_scalar(&value, &mut self.encoded);
        self.set = true;
        Ok(())
    }

    fn write_to_buffer(&mut self, buf: &mut [u8]) -> usize {
        let pending = (self.len - self.pos) as usize;
        let n = pending.min(buf.len());
        let start = self.pos as usize;
        buf[..n].copy_from_slice(&self.encoded[start..start + n]);
        self.pos += n as u8;
        n
    }

    fn is_complete(&self) -> bool {
        self.set && self.pos == self.len
    }
}

/// Encode a scalar into `out`, returning the encoded length.
pub(crate) fn encode_scalar(value: &Value, out: &mut [u8; MAX_SCALAR]) -> u8 {
    match value {
        Value::Null => {
            out[0] = codes::NULL;
            1
        }
        Value::Bool(true) => {
            out[0] = codes::BOOL_TRUE;
            1
        }
        Value::Bool(false) => {
            out[0] = codes::BOOL_FALSE;
            1
        }
        Value::Ubyte(v) => {
            out[0] = codes::UBYTE;
            out[1] = *v;
            2
        }
        Value::Ushort(v) => {
            out[0] = codes::USHORT;
            out[1..3].copy_from_slice(&v.to_be_bytes());
            3
        }
        Value::Uint(0) => {
            out[0] = codes::UINT0;
            1
        }
        Value::Uint(v) if *v <= u8::MAX as u32 => {
            out[0] = codes::SMALL_UINT;
            out[1] = *v as u8;
            2
        }
        Value::Uint(v) => {
            out[0] = codes::UINT;
            out[1..5].copy_from_slice(&v.to_be_bytes());
            5
        }
        Value::Ulong(0) => {
            out[0] = codes::ULONG0;
            1
        }
        Value::Ulong(v) if *v <= u8::MAX as u64 => {
            out[0] = codes::SMALL_ULONG;
            out[1] = *v as u8;
            2
        }
        Value::Ulong(v) => {
            out[0] = codes::ULONG;
            out[1..9].copy_from_slice(&v.to_be_bytes());
            9
        }
        Value::Byte(v) => {
            out[0] = codes::BYTE;
            out[1] = *v as u8;
            2
        }
        Value::Short(v) => {
            out[0] = codes::SHORT;
            out[1..3].copy_from_slice(&v.to_be_bytes());
            3
        }
        Value::Int(v) if i8::try_from(*v).is_ok() => {
            out[0] = codes::SMALL_INT;
            out[1] = *v as u8;
            2
        }
        Value::Int(v) => {
            out[0] = codes::INT;
            out[1..5].copy_from_slice(&v.to_be_bytes());
            5
        }
        Value::Long(v) if i8::try_from(*v).is_ok() => {
            out[0] = codes::SMALL_LONG;
            out[1] = *v as u8;
            2
        }
        Value::Long(v) => {
            out[0] = codes::LONG;
            out[1..9].copy_from_slice(&v.to_be_bytes());
            9
        }
        Value::Float(v) => {
            out[0] = codes::FLOAT;
            out[1..5].copy_from_slice(&v.to_bits().to_be_bytes());
            5
        }
        Value::Double(v) => {
            out[0] = codes::DOUBLE;
            out[1..9].copy_from_slice(&v.to_bits().to_be_bytes());
            9
        }
        Value::Timestamp(v) => {
            out[0] = codes::TIMESTAMP;
            out[1..9].copy_from_slice(&v.to_be_bytes());
            9
        }
        Value::Uuid(v) => {
            out[0] = codes::UUID;
            out[1..17].copy_from_slice(v.as_bytes());
            17
        }
        other => {
            debug_assert!(false, "scalar writer bound to {:?}", other.kind());
            out[0] = codes::NULL;
            1
        }
    }
}

/// Writer for binary, string, and symbol values: a length-prefixed
/// constructor followed by the raw payload bytes.
pub struct VariableWriter {
    prefix: [u8; 5],
    prefix_len: u8,
    data: Bytes,
    pos: usize,
    set: bool,
}

impl VariableWriter {
    pub fn new() -> Self {
        Self {
            prefix: [0; 5],
            prefix_len: 0,
            data: Bytes::new(),
            pos: 0,
            set: false,
        }
    }

    fn total(&self) -> usize {
        self.prefix_len as usize + self.data.len()
    }
}

impl Default for VariableWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueWriter for VariableWriter {
    fn set_value(&mut self, value: Value) -> Result<()> {
        debug_assert!(!self.set, "set_value called twice");
        let (code8, code32, data) = match value {
            Value::Binary(b) => (codes::VBIN8, codes::VBIN32, b),
            Value::String(s) => (codes::STR8, codes::STR32, Bytes::from(s)),
            Value::Symbol(sym) => (codes::SYM8, codes::SYM32, sym.into_bytes()),
            other => {
                debug_assert!(false, "variable writer bound to {:?}", other.kind());
                (codes::VBIN8, codes::VBIN32, Bytes::new())
            }
        };
        self.prefix_len = variable_prefix(code8, code32, data.len(), &mut self.prefix);
        self.data = data;
        self.set = true;
        Ok(())
    }

    fn write_to_buffer(&mut self, buf: &mut [u8]) -> usize {
        let mut written = 0;
        let prefix_len = self.prefix_len as usize;
        while written < buf.len() && self.pos < self.total() {
            if self.pos < prefix_len {
                let n = (prefix_len - self.pos).min(buf.len() - written);
                buf[written..written + n].copy_from_slice(&self.prefix[self.pos..self.pos + n]);
                written += n;
                self.pos += n;
            } else {
                let off = self.pos - prefix_len;
                let n = (self.data.len() - off).min(buf.len() - written);
                buf[written..written + n].copy_from_slice(&self.data[off..off + n]);
                written += n;
                self.pos += n;
            }
        }
        written
    }

    fn is_complete(&self) -> bool {
        self.set && self.pos == self.total()
    }
}

/// Fill `out` with the constructor and length prefix for a
/// variable-width value, returning the prefix length.
pub(crate) fn variable_prefix(code8: u8, code32: u8, len: usize, out: &mut [u8; 5]) -> u8 {
    if len <= u8::MAX as usize {
        out[0] = code8;
        out[1] = len as u8;
        2
    } else {
        out[0] = code32;
        out[1..5].copy_from_slice(&(len as u32).to_be_bytes());
        5
    }
}

/// Exact encoded length of `value`, including its constructor byte(s).
///
/// Shares the width-choice helpers with the writers, so sizing and
/// emission cannot drift apart. Container writers use it to compute
/// size prefixes before any field byte is emitted.
pub fn encoded_size(value: &Value) -> usize {
    match value {
        Value::Null
        | Value::Bool(_)
        | Value::Ubyte(_)
        | Value::Ushort(_)
        | Value::Uint(_)
        | Value::Ulong(_)
        | Value::Byte(_)
        | Value::Short(_)
        | Value::Int(_)
        | Value::Long(_)
        | Value::Float(_)
        | Value::Double(_)
        | Value::Timestamp(_)
        | Value::Uuid(_) => {
            let mut scratch = [0u8; MAX_SCALAR];
            encode_scalar(value, &mut scratch) as usize
        }
        Value::Binary(b) => variable_size(b.len()),
        Value::String(s) => variable_size(s.len()),
        Value::Symbol(s) => variable_size(s.len()),
        Value::List(items) => {
            let payload: usize = items.iter().map(encoded_size).sum();
            compound::list_size(items.len(), payload)
        }
        Value::Map(pairs) => {
            let payload: usize = pairs
                .iter()
                .map(|(k, v)| encoded_size(k) + encoded_size(v))
                .sum();
            compound::map_size(pairs.len() * 2, payload)
        }
        Value::Array(items) => compound::array_size(items),
        Value::Described(d) => {
            1 + encoded_size(&d.descriptor.to_value())
                + match &d.value {
                    Value::List(fields) => {
                        let count = described::significant_count(fields);
                        let payload: usize =
                            fields[..count].iter().map(encoded_size).sum();
                        compound::list_size(count, payload)
                    }
                    other => encoded_size(other),
                }
        }
    }
}

fn variable_size(len: usize) -> usize {
    if len <= u8::MAX as usize {
        2 + len
    } else {
        5 + len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn drain(writer: &mut dyn ValueWriter, chunk: usize) -> Vec<u8> {
        let mut out = Vec::new();
        let mut buf = vec![0u8; chunk];
        while !writer.is_complete() {
            let n = writer.write_to_buffer(&mut buf);
            assert!(n > 0, "writer must make forward progress");
            out.extend_from_slice(&buf[..n]);
        }
        out
    }

    #[test]
    fn test_scalar_compact_width_choices() {
        let mut scratch = [0u8; MAX_SCALAR];
        assert_eq!(encode_scalar(&Value::Uint(0), &mut scratch), 1);
        assert_eq!(scratch[0], codes::UINT0);

        assert_eq!(encode_scalar(&Value::Uint(200), &mut scratch), 2);
        assert_eq!(scratch[0], codes::SMALL_UINT);
        assert_eq!(scratch[1], 200);

        assert_eq!(encode_scalar(&Value::Uint(70000), &mut scratch), 5);
        assert_eq!(scratch[0], codes::UINT);

        assert_eq!(encode_scalar(&Value::Int(-1), &mut scratch), 2);
        assert_eq!(scratch[0], codes::SMALL_INT);
        assert_eq!(scratch[1], 0xFF);

        assert_eq!(encode_scalar(&Value::Ulong(0), &mut scratch), 1);
        assert_eq!(scratch[0], codes::ULONG0);
    }

    #[test]
    fn test_scalar_writer_one_byte_at_a_time() {
        let mut writer = ScalarWriter::new();
        writer
            .set_value(Value::Uuid(Uuid::from_bytes([7; 16])))
            .unwrap();
        let chunked = drain(&mut writer, 1);

        let mut one_shot = ScalarWriter::new();
        one_shot
            .set_value(Value::Uuid(Uuid::from_bytes([7; 16])))
            .unwrap();
        let mut buf = vec![0u8; 32];
        let n = one_shot.write_to_buffer(&mut buf);
        assert!(one_shot.is_complete());

        assert_eq!(chunked, buf[..n].to_vec());
        assert_eq!(chunked.len(), 17);
        assert_eq!(chunked[0], codes::UUID);
    }

    #[test]
    fn test_variable_writer_small_string() {
        let mut writer = VariableWriter::new();
        writer.set_value(Value::String("hi".to_string())).unwrap();
        let out = drain(&mut writer, 3);
        assert_eq!(out, vec![codes::STR8, 2, b'h', b'i']);
    }

    #[test]
    fn test_variable_writer_wide_prefix_past_255() {
        let long = "x".repeat(300);
        let mut writer = VariableWriter::new();
        writer.set_value(Value::String(long.clone())).unwrap();
        let out = drain(&mut writer, 7);
        assert_eq!(out[0], codes::STR32);
        assert_eq!(&out[1..5], &300u32.to_be_bytes());
        assert_eq!(&out[5..], long.as_bytes());
    }

    #[test]
    fn test_write_into_zero_capacity_buffer() {
        let mut writer = VariableWriter::new();
        writer
            .set_value(Value::Binary(Bytes::from_static(b"abc")))
            .unwrap();
        assert_eq!(writer.write_to_buffer(&mut []), 0);
        assert!(!writer.is_complete());
        let out = drain(&mut writer, 2);
        assert_eq!(out, vec![codes::VBIN8, 3, b'a', b'b', b'c']);
    }

    #[test]
    fn test_encoded_size_matches_scalar_emission() {
        for value in [
            Value::Null,
            Value::Bool(true),
            Value::Ushort(9),
            Value::Uint(0),
            Value::Uint(300),
            Value::Long(-200),
            Value::Double(1.5),
            Value::Uuid(Uuid::from_bytes([1; 16])),
        ] {
            let mut writer = ScalarWriter::new();
            let size = encoded_size(&value);
            writer.set_value(value).unwrap();
            assert_eq!(drain(&mut writer, 4).len(), size);
        }
    }
}
