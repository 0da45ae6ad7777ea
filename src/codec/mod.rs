//! Self-describing compound type codec.
//!
//! Outbound values are handed to the [`Registry`], which produces a
//! bound [`ValueWriter`]; the caller repeatedly drives the writer
//! against a bounded buffer until it reports completion. Inbound byte
//! ranges (already framed by the transport layer) are decoded by
//! stateless type constructors selected by wire code.
//!
//! The codec introduces no concurrency of its own: writers are
//! single-use with exclusive sequential access, the registry is built
//! once and then read without synchronization, and decoders are pure
//! functions.
//!
//! # Example
//!
//! ```
//! use amqwire::codec::{decode_value, encode_value, Registry};
//! use amqwire::types::Value;
//!
//! let registry = Registry::core();
//! let bytes = encode_value(&registry, Value::Uint(7)).unwrap();
//! assert_eq!(decode_value(&registry, &bytes).unwrap(), Value::Uint(7));
//! ```

pub mod compound;
pub mod cursor;
pub mod decode;
pub mod described;
pub mod registry;
pub mod writer;

pub use cursor::Cursor;
pub use decode::{decode_value, ValueHandler};
pub use described::{DelegatingWriter, DescribedWriter};
pub use registry::{Registry, TypeConstructorFn, WriterFactory};
pub use writer::{encoded_size, ValueWriter};

use crate::error::{CodecError, Result};
use crate::types::Value;

/// Wire type codes identifying how the following bytes are encoded.
pub mod codes {
    /// Described value marker; a descriptor and the described value follow.
    pub const DESCRIBED: u8 = 0x00;

    /// Null, zero payload.
    pub const NULL: u8 = 0x40;
    /// Boolean true, zero payload.
    pub const BOOL_TRUE: u8 = 0x41;
    /// Boolean false, zero payload.
    pub const BOOL_FALSE: u8 = 0x42;
    /// Unsigned 32-bit zero, zero payload.
    pub const UINT0: u8 = 0x43;
    /// Unsigned 64-bit zero, zero payload.
    pub const ULONG0: u8 = 0x44;
    /// Empty list, zero payload.
    pub const LIST0: u8 = 0x45;

    /// Unsigned 8-bit integer.
    pub const UBYTE: u8 = 0x50;
    /// Signed 8-bit integer.
    pub const BYTE: u8 = 0x51;
    /// Unsigned 32-bit integer in one byte.
    pub const SMALL_UINT: u8 = 0x52;
    /// Unsigned 64-bit integer in one byte.
    pub const SMALL_ULONG: u8 = 0x53;
    /// Signed 32-bit integer in one byte.
    pub const SMALL_INT: u8 = 0x54;
    /// Signed 64-bit integer in one byte.
    pub const SMALL_LONG: u8 = 0x55;
    /// Boolean as one payload byte (array element form).
    pub const BOOL: u8 = 0x56;

    /// Unsigned 16-bit integer.
    pub const USHORT: u8 = 0x60;
    /// Signed 16-bit integer.
    pub const SHORT: u8 = 0x61;

    /// Unsigned 32-bit integer, four bytes.
    pub const UINT: u8 = 0x70;
    /// Signed 32-bit integer, four bytes.
    pub const INT: u8 = 0x71;
    /// IEEE-754 binary32.
    pub const FLOAT: u8 = 0x72;

    /// Unsigned 64-bit integer, eight bytes.
    pub const ULONG: u8 = 0x80;
    /// Signed 64-bit integer, eight bytes.
    pub const LONG: u8 = 0x81;
    /// IEEE-754 binary64.
    pub const DOUBLE: u8 = 0x82;
    /// Milliseconds since the Unix epoch, signed 64-bit.
    pub const TIMESTAMP: u8 = 0x83;

    /// 128-bit unique identifier, sixteen bytes.
    pub const UUID: u8 = 0x98;

    /// Binary with one-byte length prefix.
    pub const VBIN8: u8 = 0xA0;
    /// UTF-8 string with one-byte length prefix.
    pub const STR8: u8 = 0xA1;
    /// Symbol with one-byte length prefix.
    pub const SYM8: u8 = 0xA3;
    /// Binary with four-byte length prefix.
    pub const VBIN32: u8 = 0xB0;
    /// UTF-8 string with four-byte length prefix.
    pub const STR32: u8 = 0xB1;
    /// Symbol with four-byte length prefix.
    pub const SYM32: u8 = 0xB3;

    /// List with one-byte size and count.
    pub const LIST8: u8 = 0xC0;
    /// Map with one-byte size and count.
    pub const MAP8: u8 = 0xC1;
    /// List with four-byte size and count.
    pub const LIST32: u8 = 0xD0;
    /// Map with four-byte size and count.
    pub const MAP32: u8 = 0xD1;
    /// Array with one-byte size and count.
    pub const ARRAY8: u8 = 0xE0;
    /// Array with four-byte size and count.
    pub const ARRAY32: u8 = 0xF0;
}

/// Encode one value into a fresh buffer sized exactly for it.
///
/// Convenience for paths without backpressure; the streaming interface
/// is [`Registry::get_value_writer`] plus repeated
/// [`ValueWriter::write_to_buffer`] calls.
pub fn encode_value(registry: &Registry, value: Value) -> Result<Vec<u8>> {
    let size = encoded_size(&value);
    let mut writer = registry.get_value_writer(value)?;
    let mut out = vec![0u8; size];
    let mut filled = 0;
    while !writer.is_complete() {
        let n = writer.write_to_buffer(&mut out[filled..]);
        if n == 0 {
            // Sizing and emission disagree; a defect, not a protocol error.
            return Err(CodecError::internal(
                "value writer stalled before completion",
            ));
        }
        filled += n;
    }
    debug_assert_eq!(filled, size);
    out.truncate(filled);
    Ok(out)
}
