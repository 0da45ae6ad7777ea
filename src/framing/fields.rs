//! Shared field-iteration routine for method bodies.
//!
//! Every body describes its fields once, in declaration order, through
//! [`FieldVisitor`]. [`SizeVisitor`] and [`EncodeVisitor`] walk the
//! same description, so a body's reported size and its emitted payload
//! agree for every legal field combination by construction rather than
//! by parallel bookkeeping.
//!
//! Consecutive boolean fields pack into shared bitfield bytes,
//! LSB-first in declaration order, up to eight bits per byte. A group
//! ends at the first non-bit field.

use bytes::Bytes;

use crate::framing::table::{self, FieldTable, ShortString};

/// One callback per wire field type. Bodies drive a visitor over their
/// fields; visitors interpret the walk.
pub trait FieldVisitor {
    fn uint16(&mut self, v: u16);
    fn uint32(&mut self, v: u32);
    fn uint64(&mut self, v: u64);
    fn octet(&mut self, v: u8);
    fn short_string(&mut self, v: &ShortString);
    fn long_string(&mut self, v: &Bytes);
    fn bit(&mut self, v: bool);
    fn field_table(&mut self, v: &FieldTable);
}

/// Accumulates the exact encoded payload size of a field walk.
#[derive(Debug, Default)]
pub struct SizeVisitor {
    size: usize,
    group_bits: u8,
}

impl SizeVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total size after the walk.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    fn fixed(&mut self, n: usize) {
        self.group_bits = 0;
        self.size += n;
    }
}

impl FieldVisitor for SizeVisitor {
    fn uint16(&mut self, _v: u16) {
        self.fixed(2);
    }

    fn uint32(&mut self, _v: u32) {
        self.fixed(4);
    }

    fn uint64(&mut self, _v: u64) {
        self.fixed(8);
    }

    fn octet(&mut self, _v: u8) {
        self.fixed(1);
    }

    fn short_string(&mut self, v: &ShortString) {
        self.fixed(v.encoded_size());
    }

    fn long_string(&mut self, v: &Bytes) {
        self.fixed(table::long_string_size(v));
    }

    fn bit(&mut self, _v: bool) {
        if self.group_bits == 0 || self.group_bits == 8 {
            self.size += 1;
            self.group_bits = 1;
        } else {
            self.group_bits += 1;
        }
    }

    fn field_table(&mut self, v: &FieldTable) {
        self.fixed(v.encoded_size());
    }
}

/// Appends the encoded payload of a field walk to a byte buffer.
///
/// The bitfield byte for a group is pushed when the group's first bit
/// arrives and OR-ed in place as further bits follow, so the buffer is
/// always a valid prefix of the final payload.
#[derive(Debug)]
pub struct EncodeVisitor<'a> {
    out: &'a mut Vec<u8>,
    // (index of the open bitfield byte, bits used)
    group: Option<(usize, u8)>,
}

impl<'a> EncodeVisitor<'a> {
    pub fn new(out: &'a mut Vec<u8>) -> Self {
        Self { out, group: None }
    }

    fn fixed(&mut self, bytes: &[u8]) {
        self.group = None;
        self.out.extend_from_slice(bytes);
    }
}

impl FieldVisitor for EncodeVisitor<'_> {
    fn uint16(&mut self, v: u16) {
        self.fixed(&v.to_be_bytes());
    }

    fn uint32(&mut self, v: u32) {
        self.fixed(&v.to_be_bytes());
    }

    fn uint64(&mut self, v: u64) {
        self.fixed(&v.to_be_bytes());
    }

    fn octet(&mut self, v: u8) {
        self.fixed(&[v]);
    }

    fn short_string(&mut self, v: &ShortString) {
        self.group = None;
        v.encode(self.out);
    }

    fn long_string(&mut self, v: &Bytes) {
        self.group = None;
        table::encode_long_string(v, self.out);
    }

    fn bit(&mut self, v: bool) {
        match self.group {
            Some((index, used)) if used < 8 => {
                if v {
                    self.out[index] |= 1 << used;
                }
                self.group = Some((index, used + 1));
            }
            _ => {
                self.out.push(u8::from(v));
                self.group = Some((self.out.len() - 1, 1));
            }
        }
    }

    fn field_table(&mut self, v: &FieldTable) {
        self.group = None;
        v.encode(self.out);
    }
}

/// Extract bit `index` (LSB-first) from a decoded bitfield byte.
#[inline]
pub(crate) fn bit(bits: u8, index: u8) -> bool {
    bits & (1 << index) != 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;

    // Drives every callback once so size and payload can be compared
    // across the full field vocabulary.
    fn walk(visitor: &mut dyn FieldVisitor) -> Result<()> {
        let mut table = FieldTable::new();
        table.insert(
            ShortString::new("k")?,
            crate::framing::table::TableValue::Bool(true),
        );
        visitor.uint16(0x0102);
        visitor.bit(true);
        visitor.bit(false);
        visitor.bit(true);
        visitor.octet(0xAB);
        visitor.bit(true);
        visitor.uint32(7);
        visitor.uint64(9);
        visitor.short_string(&ShortString::new("q")?);
        visitor.long_string(&Bytes::from_static(b"payload"));
        visitor.field_table(&table);
        Ok(())
    }

    #[test]
    fn test_size_matches_encoded_length() {
        let mut size = SizeVisitor::new();
        walk(&mut size).unwrap();
        let mut out = Vec::new();
        let mut encode = EncodeVisitor::new(&mut out);
        walk(&mut encode).unwrap();
        assert_eq!(size.size(), out.len());
    }

    #[test]
    fn test_bits_pack_lsb_first() {
        let mut out = Vec::new();
        let mut encode = EncodeVisitor::new(&mut out);
        encode.bit(true);
        encode.bit(false);
        encode.bit(true);
        encode.bit(false);
        assert_eq!(out, vec![0b0101]);
    }

    #[test]
    fn test_non_bit_field_closes_group() {
        let mut out = Vec::new();
        let mut encode = EncodeVisitor::new(&mut out);
        encode.bit(true);
        encode.octet(0xFF);
        encode.bit(true);
        // two separate bitfield bytes around the octet
        assert_eq!(out, vec![0x01, 0xFF, 0x01]);
    }

    #[test]
    fn test_ninth_bit_starts_new_byte() {
        let mut out = Vec::new();
        let mut encode = EncodeVisitor::new(&mut out);
        for _ in 0..9 {
            encode.bit(true);
        }
        assert_eq!(out, vec![0xFF, 0x01]);

        let mut size = SizeVisitor::new();
        for _ in 0..9 {
            size.bit(true);
        }
        assert_eq!(size.size(), 2);
    }

    #[test]
    fn test_bit_extraction() {
        let bits = 0b0101u8;
        assert!(bit(bits, 0));
        assert!(!bit(bits, 1));
        assert!(bit(bits, 2));
        assert!(!bit(bits, 3));
    }
}
