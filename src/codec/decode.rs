//! Self-describing value decoding.
//!
//! Each wire type code maps to a pure constructor function that reads
//! the code's fixed or length-prefixed payload from a [`Cursor`] and
//! returns a [`Value`]. Compound constructors recurse through a
//! [`ValueHandler`], which performs the code → constructor dispatch so
//! nested elements go through the same registry lookup as top-level
//! values.
//!
//! Decoding never recovers: a truncated payload, an out-of-range
//! payload byte, or a size/count mismatch fails with a fatal framing
//! error and the caller tears down the connection.

use uuid::Uuid;

use crate::codec::codes;
use crate::codec::cursor::Cursor;
use crate::codec::registry::Registry;
use crate::error::{CodecError, Result};
use crate::types::{Described, Descriptor, Symbol, Value};

/// Dispatcher for recursive decoding: reads a type code, looks up its
/// constructor in the registry, and invokes it on the remaining bytes.
pub struct ValueHandler<'r> {
    registry: &'r Registry,
}

impl<'r> ValueHandler<'r> {
    /// Create a handler over `registry`.
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// The registry backing this handler.
    #[inline]
    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Decode one complete value (constructor byte plus payload) from
    /// the cursor.
    pub fn parse(&self, cur: &mut Cursor<'_>) -> Result<Value> {
        let code = cur.try_get_u8("type constructor")?;
        let constructor = self.registry.get_constructor(code)?;
        constructor(cur, self)
    }
}

/// Decode exactly one value from `bytes`.
///
/// Trailing bytes after the value are a framing error: the transport
/// layer hands the codec one value's byte range, so leftovers mean the
/// framing is corrupt.
pub fn decode_value(registry: &Registry, bytes: &[u8]) -> Result<Value> {
    let mut cur = Cursor::new(bytes);
    let handler = ValueHandler::new(registry);
    let value = handler.parse(&mut cur)?;
    if !cur.is_empty() {
        return Err(CodecError::framing(format!(
            "{} trailing bytes after value",
            cur.remaining()
        )));
    }
    Ok(value)
}

/// Register the constructor for every wire type code.
pub(crate) fn register_core(registry: &mut Registry) {
    registry.register_decoder(codes::DESCRIBED, construct_described);
    registry.register_decoder(codes::NULL, construct_null);
    registry.register_decoder(codes::BOOL_TRUE, construct_true);
    registry.register_decoder(codes::BOOL_FALSE, construct_false);
    registry.register_decoder(codes::UINT0, construct_uint0);
    registry.register_decoder(codes::ULONG0, construct_ulong0);
    registry.register_decoder(codes::LIST0, construct_list0);
    registry.register_decoder(codes::UBYTE, construct_ubyte);
    registry.register_decoder(codes::BYTE, construct_byte);
    registry.register_decoder(codes::SMALL_UINT, construct_small_uint);
    registry.register_decoder(codes::SMALL_ULONG, construct_small_ulong);
    registry.register_decoder(codes::SMALL_INT, construct_small_int);
    registry.register_decoder(codes::SMALL_LONG, construct_small_long);
    registry.register_decoder(codes::BOOL, construct_bool);
    registry.register_decoder(codes::USHORT, construct_ushort);
    registry.register_decoder(codes::SHORT, construct_short);
    registry.register_decoder(codes::UINT, construct_uint);
    registry.register_decoder(codes::INT, construct_int);
    registry.register_decoder(codes::FLOAT, construct_float);
    registry.register_decoder(codes::ULONG, construct_ulong);
    registry.register_decoder(codes::LONG, construct_long);
    registry.register_decoder(codes::DOUBLE, construct_double);
    registry.register_decoder(codes::TIMESTAMP, construct_timestamp);
    registry.register_decoder(codes::UUID, construct_uuid);
    registry.register_decoder(codes::VBIN8, construct_vbin8);
    registry.register_decoder(codes::VBIN32, construct_vbin32);
    registry.register_decoder(codes::STR8, construct_str8);
    registry.register_decoder(codes::STR32, construct_str32);
    registry.register_decoder(codes::SYM8, construct_sym8);
    registry.register_decoder(codes::SYM32, construct_sym32);
    registry.register_decoder(codes::LIST8, construct_list8);
    registry.register_decoder(codes::LIST32, construct_list32);
    registry.register_decoder(codes::MAP8, construct_map8);
    registry.register_decoder(codes::MAP32, construct_map32);
    registry.register_decoder(codes::ARRAY8, construct_array8);
    registry.register_decoder(codes::ARRAY32, construct_array32);
}

/// Interpreter for descriptors whose body is a positional field list.
///
/// Keeps the decoded list as-is inside a [`Described`] value; typed
/// record extraction happens in the record types, which tolerate the
/// trailing-null elision producers apply.
pub(crate) fn list_record_constructor(descriptor: Descriptor, value: Value) -> Result<Value> {
    match value {
        list @ Value::List(_) => Ok(Value::Described(Box::new(Described {
            descriptor,
            value: list,
        }))),
        other => Err(CodecError::framing(format!(
            "described record {descriptor:?} body is {:?}, expected a list",
            other.kind()
        ))),
    }
}

fn construct_null(_cur: &mut Cursor<'_>, _handler: &ValueHandler<'_>) -> Result<Value> {
    Ok(Value::Null)
}

fn construct_true(_cur: &mut Cursor<'_>, _handler: &ValueHandler<'_>) -> Result<Value> {
    Ok(Value::Bool(true))
}

fn construct_false(_cur: &mut Cursor<'_>, _handler: &ValueHandler<'_>) -> Result<Value> {
    Ok(Value::Bool(false))
}

fn construct_bool(cur: &mut Cursor<'_>, _handler: &ValueHandler<'_>) -> Result<Value> {
    match cur.try_get_u8("boolean")? {
        0 => Ok(Value::Bool(false)),
        1 => Ok(Value::Bool(true)),
        other => Err(CodecError::framing(format!(
            "boolean payload byte 0x{other:02x} out of range"
        ))),
    }
}

fn construct_ubyte(cur: &mut Cursor<'_>, _handler: &ValueHandler<'_>) -> Result<Value> {
    Ok(Value::Ubyte(cur.try_get_u8("ubyte")?))
}

fn construct_ushort(cur: &mut Cursor<'_>, _handler: &ValueHandler<'_>) -> Result<Value> {
    Ok(Value::Ushort(cur.try_get_u16("ushort")?))
}

fn construct_uint(cur: &mut Cursor<'_>, _handler: &ValueHandler<'_>) -> Result<Value> {
    Ok(Value::Uint(cur.try_get_u32("uint")?))
}

fn construct_small_uint(cur: &mut Cursor<'_>, _handler: &ValueHandler<'_>) -> Result<Value> {
    Ok(Value::Uint(u32::from(cur.try_get_u8("uint")?)))
}

fn construct_uint0(_cur: &mut Cursor<'_>, _handler: &ValueHandler<'_>) -> Result<Value> {
    Ok(Value::Uint(0))
}

fn construct_ulong(cur: &mut Cursor<'_>, _handler: &ValueHandler<'_>) -> Result<Value> {
    Ok(Value::Ulong(cur.try_get_u64("ulong")?))
}

fn construct_small_ulong(cur: &mut Cursor<'_>, _handler: &ValueHandler<'_>) -> Result<Value> {
    Ok(Value::Ulong(u64::from(cur.try_get_u8("ulong")?)))
}

fn construct_ulong0(_cur: &mut Cursor<'_>, _handler: &ValueHandler<'_>) -> Result<Value> {
    Ok(Value::Ulong(0))
}

fn construct_byte(cur: &mut Cursor<'_>, _handler: &ValueHandler<'_>) -> Result<Value> {
    Ok(Value::Byte(cur.try_get_i8("byte")?))
}

fn construct_short(cur: &mut Cursor<'_>, _handler: &ValueHandler<'_>) -> Result<Value> {
    Ok(Value::Short(cur.try_get_i16("short")?))
}

fn construct_int(cur: &mut Cursor<'_>, _handler: &ValueHandler<'_>) -> Result<Value> {
    Ok(Value::Int(cur.try_get_i32("int")?))
}

fn construct_small_int(cur: &mut Cursor<'_>, _handler: &ValueHandler<'_>) -> Result<Value> {
    Ok(Value::Int(i32::from(cur.try_get_i8("int")?)))
}

fn construct_long(cur: &mut Cursor<'_>, _handler: &ValueHandler<'_>) -> Result<Value> {
    Ok(Value::Long(cur.try_get_i64("long")?))
}

fn construct_small_long(cur: &mut Cursor<'_>, _handler: &ValueHandler<'_>) -> Result<Value> {
    Ok(Value::Long(i64::from(cur.try_get_i8("long")?)))
}

fn construct_float(cur: &mut Cursor<'_>, _handler: &ValueHandler<'_>) -> Result<Value> {
    Ok(Value::Float(cur.try_get_f32("float")?))
}

fn construct_double(cur: &mut Cursor<'_>, _handler: &ValueHandler<'_>) -> Result<Value> {
    Ok(Value::Double(cur.try_get_f64("double")?))
}

fn construct_timestamp(cur: &mut Cursor<'_>, _handler: &ValueHandler<'_>) -> Result<Value> {
    Ok(Value::Timestamp(cur.try_get_i64("timestamp")?))
}

fn construct_uuid(cur: &mut Cursor<'_>, _handler: &ValueHandler<'_>) -> Result<Value> {
    let slice = cur.try_get_slice(16, "uuid")?;
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(slice);
    Ok(Value::Uuid(Uuid::from_bytes(bytes)))
}

fn construct_vbin8(cur: &mut Cursor<'_>, _handler: &ValueHandler<'_>) -> Result<Value> {
    let n = cur.try_get_u8("binary size")? as usize;
    Ok(Value::Binary(cur.try_get_bytes(n, "binary")?))
}

fn construct_vbin32(cur: &mut Cursor<'_>, _handler: &ValueHandler<'_>) -> Result<Value> {
    let n = cur.try_get_u32("binary size")? as usize;
    Ok(Value::Binary(cur.try_get_bytes(n, "binary")?))
}

fn construct_str8(cur: &mut Cursor<'_>, _handler: &ValueHandler<'_>) -> Result<Value> {
    let n = cur.try_get_u8("string size")? as usize;
    Ok(Value::String(cur.try_get_str(n, "string")?.to_owned()))
}

fn construct_str32(cur: &mut Cursor<'_>, _handler: &ValueHandler<'_>) -> Result<Value> {
    let n = cur.try_get_u32("string size")? as usize;
    Ok(Value::String(cur.try_get_str(n, "string")?.to_owned()))
}

fn construct_sym8(cur: &mut Cursor<'_>, _handler: &ValueHandler<'_>) -> Result<Value> {
    let n = cur.try_get_u8("symbol size")? as usize;
    Ok(Value::Symbol(Symbol::new(cur.try_get_str(n, "symbol")?)))
}

fn construct_sym32(cur: &mut Cursor<'_>, _handler: &ValueHandler<'_>) -> Result<Value> {
    let n = cur.try_get_u32("symbol size")? as usize;
    Ok(Value::Symbol(Symbol::new(cur.try_get_str(n, "symbol")?)))
}

fn construct_list0(_cur: &mut Cursor<'_>, _handler: &ValueHandler<'_>) -> Result<Value> {
    Ok(Value::List(Vec::new()))
}

fn construct_list8(cur: &mut Cursor<'_>, handler: &ValueHandler<'_>) -> Result<Value> {
    let size = cur.try_get_u8("list size")? as usize;
    let slice = cur.try_get_slice(size, "list")?;
    let mut sub = Cursor::new(slice);
    let count = sub.try_get_u8("list count")? as usize;
    decode_list_elements(&mut sub, count, handler)
}

fn construct_list32(cur: &mut Cursor<'_>, handler: &ValueHandler<'_>) -> Result<Value> {
    let size = cur.try_get_u32("list size")? as usize;
    let slice = cur.try_get_slice(size, "list")?;
    let mut sub = Cursor::new(slice);
    let count = sub.try_get_u32("list count")? as usize;
    decode_list_elements(&mut sub, count, handler)
}

fn decode_list_elements(
    sub: &mut Cursor<'_>,
    count: usize,
    handler: &ValueHandler<'_>,
) -> Result<Value> {
    let mut elements = Vec::with_capacity(count.min(sub.remaining()));
    for _ in 0..count {
        elements.push(handler.parse(sub)?);
    }
    if !sub.is_empty() {
        return Err(CodecError::framing(format!(
            "list size/count mismatch: {} bytes left after {count} elements",
            sub.remaining()
        )));
    }
    Ok(Value::List(elements))
}

fn construct_map8(cur: &mut Cursor<'_>, handler: &ValueHandler<'_>) -> Result<Value> {
    let size = cur.try_get_u8("map size")? as usize;
    let slice = cur.try_get_slice(size, "map")?;
    let mut sub = Cursor::new(slice);
    let count = sub.try_get_u8("map count")? as usize;
    decode_map_entries(&mut sub, count, handler)
}

fn construct_map32(cur: &mut Cursor<'_>, handler: &ValueHandler<'_>) -> Result<Value> {
    let size = cur.try_get_u32("map size")? as usize;
    let slice = cur.try_get_slice(size, "map")?;
    let mut sub = Cursor::new(slice);
    let count = sub.try_get_u32("map count")? as usize;
    decode_map_entries(&mut sub, count, handler)
}

fn decode_map_entries(
    sub: &mut Cursor<'_>,
    count: usize,
    handler: &ValueHandler<'_>,
) -> Result<Value> {
    if count % 2 != 0 {
        return Err(CodecError::framing(format!(
            "map count {count} is odd, entries must be key/value pairs"
        )));
    }
    let mut entries = Vec::with_capacity(count / 2);
    for _ in 0..count / 2 {
        let key = handler.parse(sub)?;
        let value = handler.parse(sub)?;
        entries.push((key, value));
    }
    if !sub.is_empty() {
        return Err(CodecError::framing(format!(
            "map size/count mismatch: {} bytes left after {count} entries",
            sub.remaining()
        )));
    }
    Ok(Value::Map(entries))
}

fn construct_array8(cur: &mut Cursor<'_>, handler: &ValueHandler<'_>) -> Result<Value> {
    let size = cur.try_get_u8("array size")? as usize;
    let slice = cur.try_get_slice(size, "array")?;
    let mut sub = Cursor::new(slice);
    let count = sub.try_get_u8("array count")? as usize;
    decode_array_elements(&mut sub, count, handler)
}

fn construct_array32(cur: &mut Cursor<'_>, handler: &ValueHandler<'_>) -> Result<Value> {
    let size = cur.try_get_u32("array size")? as usize;
    let slice = cur.try_get_slice(size, "array")?;
    let mut sub = Cursor::new(slice);
    let count = sub.try_get_u32("array count")? as usize;
    decode_array_elements(&mut sub, count, handler)
}

fn decode_array_elements(
    sub: &mut Cursor<'_>,
    count: usize,
    handler: &ValueHandler<'_>,
) -> Result<Value> {
    // One constructor byte covers every element; payloads follow bare.
    let code = sub.try_get_u8("array element constructor")?;
    let constructor = handler.registry().get_constructor(code)?;
    let mut elements = Vec::with_capacity(count.min(sub.remaining() + 1));
    for _ in 0..count {
        elements.push(constructor(sub, handler)?);
    }
    if !sub.is_empty() {
        return Err(CodecError::framing(format!(
            "array size/count mismatch: {} bytes left after {count} elements",
            sub.remaining()
        )));
    }
    Ok(Value::Array(elements))
}

fn construct_described(cur: &mut Cursor<'_>, handler: &ValueHandler<'_>) -> Result<Value> {
    let descriptor = match handler.parse(cur)? {
        Value::Ulong(code) => Descriptor::Code(code),
        Value::Symbol(symbol) => Descriptor::Symbol(symbol),
        other => {
            return Err(CodecError::framing(format!(
                "descriptor is {:?}, expected ulong or symbol",
                other.kind()
            )))
        }
    };
    let constructor = handler.registry().get_described(&descriptor)?;
    let body = handler.parse(cur)?;
    constructor(descriptor, body)
}
