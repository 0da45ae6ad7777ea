//! Described-value and delegating writers.
//!
//! A described value encodes as its descriptor followed by the
//! underlying value. When the underlying value is a positional field
//! list, the writer computes the significant field count once at bind
//! time (trailing nulls are elided, interior nulls are emitted as
//! explicit placeholders) and never recomputes it mid-write.
//!
//! The delegating writer holds no format logic itself: it extracts an
//! underlying value through a kind-specific accessor and forwards every
//! call to the registry-selected writer for that value's runtime kind.
//! This isolates "which concrete encoding applies" from "how a value is
//! laid out".

use crate::codec::codes;
use crate::codec::registry::Registry;
use crate::codec::writer::ValueWriter;
use crate::error::{CodecError, Result};
use crate::types::Value;

/// Accessor pulling the value to encode out of the value handed to
/// [`DelegatingWriter::set_value`].
pub type ExtractFn = fn(Value) -> Value;

/// Writer that defers entirely to the registry-selected writer for the
/// runtime kind of an extracted inner value.
pub struct DelegatingWriter<'r> {
    registry: &'r Registry,
    extract: ExtractFn,
    inner: Option<Box<dyn ValueWriter + 'r>>,
}

impl<'r> DelegatingWriter<'r> {
    /// Delegate through a kind-specific accessor.
    pub fn new(registry: &'r Registry, extract: ExtractFn) -> Self {
        Self {
            registry,
            extract,
            inner: None,
        }
    }

    /// Delegate on the bound value itself, for fields whose declared
    /// type is "any value".
    pub fn identity(registry: &'r Registry) -> Self {
        Self::new(registry, |v| v)
    }
}

impl<'r> ValueWriter for DelegatingWriter<'r> {
    fn set_value(&mut self, value: Value) -> Result<()> {
        debug_assert!(self.inner.is_none(), "set_value called twice");
        self.inner = Some(self.registry.get_value_writer((self.extract)(value))?);
        Ok(())
    }

    fn write_to_buffer(&mut self, buf: &mut [u8]) -> usize {
        match &mut self.inner {
            Some(inner) => inner.write_to_buffer(buf),
            None => 0,
        }
    }

    fn is_complete(&self) -> bool {
        self.inner.as_ref().is_some_and(|inner| inner.is_complete())
    }
}

/// Index one past the last non-null field; a fully-null field set
/// yields zero.
pub(crate) fn significant_count(fields: &[Value]) -> usize {
    fields
        .iter()
        .rposition(|f| !f.is_null())
        .map_or(0, |i| i + 1)
}

/// Writer for described values: marker, descriptor, then body.
pub struct DescribedWriter<'r> {
    marker_written: bool,
    descriptor: DelegatingWriter<'r>,
    body: DelegatingWriter<'r>,
    set: bool,
}

impl<'r> DescribedWriter<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            marker_written: false,
            // The descriptor's declared type is "ulong or symbol"; the
            // body is any value. Both resolve by runtime kind.
            descriptor: DelegatingWriter::identity(registry),
            body: DelegatingWriter::identity(registry),
            set: false,
        }
    }
}

impl<'r> ValueWriter for DescribedWriter<'r> {
    fn set_value(&mut self, value: Value) -> Result<()> {
        debug_assert!(!self.set, "set_value called twice");
        let described = match value {
            Value::Described(d) => *d,
            other => {
                return Err(CodecError::internal(format!(
                    "described writer bound to {:?}",
                    other.kind()
                )))
            }
        };
        self.descriptor.set_value(described.descriptor.to_value())?;
        let body = match described.value {
            Value::List(mut fields) => {
                // Cached once; emission never revisits this decision.
                let count = significant_count(&fields);
                fields.truncate(count);
                Value::List(fields)
            }
            other => other,
        };
        self.body.set_value(body)?;
        self.set = true;
        Ok(())
    }

    fn write_to_buffer(&mut self, buf: &mut [u8]) -> usize {
        let mut written = 0;
        if !self.marker_written {
            if buf.is_empty() {
                return 0;
            }
            buf[0] = codes::DESCRIBED;
            written = 1;
            self.marker_written = true;
        }
        if !self.descriptor.is_complete() {
            written += self.descriptor.write_to_buffer(&mut buf[written..]);
            if !self.descriptor.is_complete() {
                return written;
            }
        }
        written + self.body.write_to_buffer(&mut buf[written..])
    }

    fn is_complete(&self) -> bool {
        self.set && self.marker_written && self.descriptor.is_complete() && self.body.is_complete()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::writer::encoded_size;
    use crate::types::Descriptor;

    fn drain(writer: &mut dyn ValueWriter, chunk: usize) -> Vec<u8> {
        let mut out = Vec::new();
        let mut buf = vec![0u8; chunk];
        while !writer.is_complete() {
            let n = writer.write_to_buffer(&mut buf);
            out.extend_from_slice(&buf[..n]);
        }
        out
    }

    #[test]
    fn test_significant_count() {
        assert_eq!(significant_count(&[]), 0);
        assert_eq!(significant_count(&[Value::Null, Value::Null]), 0);
        assert_eq!(significant_count(&[Value::Null, Value::Uint(1)]), 2);
        assert_eq!(
            significant_count(&[Value::Uint(1), Value::Null, Value::Null]),
            1
        );
    }

    #[test]
    fn test_all_null_fields_encode_as_empty_list() {
        let registry = Registry::core();
        let value = Value::described(
            Descriptor::Code(0x42),
            Value::List(vec![Value::Null, Value::Null]),
        );
        let mut writer = DescribedWriter::new(&registry);
        writer.set_value(value).unwrap();
        let out = drain(&mut writer, 16);
        // marker, smallulong 0x42, empty list
        assert_eq!(
            out,
            vec![codes::DESCRIBED, codes::SMALL_ULONG, 0x42, codes::LIST0]
        );
    }

    #[test]
    fn test_interior_null_is_kept_trailing_null_dropped() {
        let registry = Registry::core();
        let value = Value::described(
            Descriptor::Code(0x41),
            Value::List(vec![Value::Null, Value::Bool(true), Value::Null]),
        );
        let size = encoded_size(&value);
        let mut writer = DescribedWriter::new(&registry);
        writer.set_value(value).unwrap();
        let out = drain(&mut writer, 16);
        assert_eq!(out.len(), size);
        // Field count 2: explicit null, then true; the trailing null is gone.
        assert_eq!(
            out,
            vec![
                codes::DESCRIBED,
                codes::SMALL_ULONG,
                0x41,
                codes::LIST8,
                3,
                2,
                codes::NULL,
                codes::BOOL_TRUE,
            ]
        );
    }

    #[test]
    fn test_symbolic_descriptor_delegates_to_symbol_writer() {
        let registry = Registry::core();
        let value = Value::described(
            Descriptor::Symbol("example:record".into()),
            Value::Ubyte(1),
        );
        let mut writer = DescribedWriter::new(&registry);
        writer.set_value(value).unwrap();
        let out = drain(&mut writer, 4);
        assert_eq!(out[0], codes::DESCRIBED);
        assert_eq!(out[1], codes::SYM8);
        assert_eq!(out[2], 14);
        assert_eq!(&out[3..17], b"example:record");
        assert_eq!(&out[17..], &[codes::UBYTE, 1]);
    }

    #[test]
    fn test_chunked_emission_matches_one_shot() {
        let registry = Registry::core();
        let value = Value::described(
            Descriptor::Code(0x44),
            Value::List(vec![Value::Ubyte(0), Value::Binary("ok".as_bytes().to_vec().into())]),
        );
        let mut a = DescribedWriter::new(&registry);
        a.set_value(value.clone()).unwrap();
        let one_shot = drain(&mut a, 256);

        let mut b = DescribedWriter::new(&registry);
        b.set_value(value).unwrap();
        assert_eq!(drain(&mut b, 1), one_shot);
    }

    #[test]
    fn test_delegating_writer_picks_by_runtime_kind() {
        let registry = Registry::core();
        let mut writer = DelegatingWriter::identity(&registry);
        writer.set_value(Value::Ushort(0x0102)).unwrap();
        assert_eq!(drain(&mut writer, 8), vec![codes::USHORT, 0x01, 0x02]);
    }
}
