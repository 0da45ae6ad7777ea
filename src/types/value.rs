//! The in-memory value model the codec serializes.
//!
//! A [`Value`] is either null, a primitive scalar, a composite
//! (list/map/array), or a described value: a descriptor paired with an
//! underlying value that gives it protocol-level meaning (e.g. a SASL
//! challenge or an error record).
//!
//! Writer and decoder selection is keyed by [`ValueKind`], a closed
//! enumeration over the runtime kinds, never by structural inspection
//! of fields.
//!
//! # Example
//!
//! ```
//! use amqwire::types::{Value, ValueKind};
//!
//! let v = Value::List(vec![Value::Uint(7), Value::Null]);
//! assert_eq!(v.kind(), ValueKind::List);
//! ```

use bytes::Bytes;
use uuid::Uuid;

/// Symbolic constant from a protocol-defined namespace.
///
/// Symbols name protocol-level tokens (mechanism names, error
/// conditions) and are encoded distinctly from ordinary strings. The
/// protocol draws them from the ASCII range, but the codec does not
/// police that: any UTF-8 token round-trips.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol(String);

impl Symbol {
    /// Create a symbol from a token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The token as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length of the token in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the token is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume the symbol, yielding its token bytes.
    #[inline]
    pub fn into_bytes(self) -> Bytes {
        Bytes::from(self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Descriptor identifying the protocol meaning of a described value.
///
/// Numeric descriptors are 64-bit codes within a protocol-reserved
/// namespace (e.g. `0x42` identifies a SASL challenge structure).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Descriptor {
    /// 64-bit numeric descriptor code.
    Code(u64),
    /// Symbolic descriptor name.
    Symbol(Symbol),
}

impl Descriptor {
    /// The descriptor as a plain value (ulong or symbol), for emission
    /// ahead of the described body.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Code(code) => Value::Ulong(*code),
            Self::Symbol(sym) => Value::Symbol(sym.clone()),
        }
    }
}

/// A descriptor paired with the underlying value it describes.
#[derive(Debug, Clone, PartialEq)]
pub struct Described {
    /// Protocol meaning of the value.
    pub descriptor: Descriptor,
    /// Underlying composite or scalar payload.
    pub value: Value,
}

/// A protocol value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absence of a value.
    Null,
    /// Boolean.
    Bool(bool),
    /// Unsigned 8-bit integer.
    Ubyte(u8),
    /// Unsigned 16-bit integer.
    Ushort(u16),
    /// Unsigned 32-bit integer.
    Uint(u32),
    /// Unsigned 64-bit integer.
    Ulong(u64),
    /// Signed 8-bit integer.
    Byte(i8),
    /// Signed 16-bit integer.
    Short(i16),
    /// Signed 32-bit integer.
    Int(i32),
    /// Signed 64-bit integer.
    Long(i64),
    /// 32-bit IEEE-754 float.
    Float(f32),
    /// 64-bit IEEE-754 float.
    Double(f64),
    /// Milliseconds since the Unix epoch, signed.
    Timestamp(i64),
    /// 128-bit unique identifier.
    Uuid(Uuid),
    /// Opaque byte sequence.
    Binary(Bytes),
    /// UTF-8 string.
    String(String),
    /// Symbolic constant.
    Symbol(Symbol),
    /// Ordered, heterogeneous sequence.
    List(Vec<Value>),
    /// Key-unique map. Uniqueness is the producer's responsibility.
    Map(Vec<(Value, Value)>),
    /// Homogeneous sequence sharing one element kind.
    Array(Vec<Value>),
    /// Descriptor plus underlying value.
    Described(Box<Described>),
}

/// Closed enumeration of the runtime kinds a [`Value`] can take.
///
/// Registry lookup tables are keyed by this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Ubyte,
    Ushort,
    Uint,
    Ulong,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Timestamp,
    Uuid,
    Binary,
    String,
    Symbol,
    List,
    Map,
    Array,
    Described,
}

impl ValueKind {
    /// Every kind, in declaration order. Used to assert registry
    /// exhaustiveness.
    pub const ALL: [ValueKind; 21] = [
        ValueKind::Null,
        ValueKind::Bool,
        ValueKind::Ubyte,
        ValueKind::Ushort,
        ValueKind::Uint,
        ValueKind::Ulong,
        ValueKind::Byte,
        ValueKind::Short,
        ValueKind::Int,
        ValueKind::Long,
        ValueKind::Float,
        ValueKind::Double,
        ValueKind::Timestamp,
        ValueKind::Uuid,
        ValueKind::Binary,
        ValueKind::String,
        ValueKind::Symbol,
        ValueKind::List,
        ValueKind::Map,
        ValueKind::Array,
        ValueKind::Described,
    ];
}

impl Value {
    /// The runtime kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Ubyte(_) => ValueKind::Ubyte,
            Value::Ushort(_) => ValueKind::Ushort,
            Value::Uint(_) => ValueKind::Uint,
            Value::Ulong(_) => ValueKind::Ulong,
            Value::Byte(_) => ValueKind::Byte,
            Value::Short(_) => ValueKind::Short,
            Value::Int(_) => ValueKind::Int,
            Value::Long(_) => ValueKind::Long,
            Value::Float(_) => ValueKind::Float,
            Value::Double(_) => ValueKind::Double,
            Value::Timestamp(_) => ValueKind::Timestamp,
            Value::Uuid(_) => ValueKind::Uuid,
            Value::Binary(_) => ValueKind::Binary,
            Value::String(_) => ValueKind::String,
            Value::Symbol(_) => ValueKind::Symbol,
            Value::List(_) => ValueKind::List,
            Value::Map(_) => ValueKind::Map,
            Value::Array(_) => ValueKind::Array,
            Value::Described(_) => ValueKind::Described,
        }
    }

    /// Construct a described value.
    pub fn described(descriptor: Descriptor, value: Value) -> Self {
        Value::Described(Box::new(Described { descriptor, value }))
    }

    /// Whether this value is null.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Uint(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Ulong(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Bytes> for Value {
    fn from(v: Bytes) -> Self {
        Value::Binary(v)
    }
}

impl From<Symbol> for Value {
    fn from(v: Symbol) -> Self {
        Value::Symbol(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_covers_every_variant() {
        let samples: Vec<Value> = vec![
            Value::Null,
            Value::Bool(true),
            Value::Ubyte(1),
            Value::Ushort(1),
            Value::Uint(1),
            Value::Ulong(1),
            Value::Byte(-1),
            Value::Short(-1),
            Value::Int(-1),
            Value::Long(-1),
            Value::Float(1.0),
            Value::Double(1.0),
            Value::Timestamp(0),
            Value::Uuid(Uuid::nil()),
            Value::Binary(Bytes::new()),
            Value::String(String::new()),
            Value::Symbol(Symbol::from("sym")),
            Value::List(vec![]),
            Value::Map(vec![]),
            Value::Array(vec![]),
            Value::described(Descriptor::Code(0x42), Value::Null),
        ];
        let kinds: Vec<ValueKind> = samples.iter().map(Value::kind).collect();
        assert_eq!(kinds, ValueKind::ALL.to_vec());
    }

    #[test]
    fn test_descriptor_to_value() {
        assert_eq!(Descriptor::Code(0x42).to_value(), Value::Ulong(0x42));
        assert_eq!(
            Descriptor::Symbol(Symbol::from("amqp:sasl-challenge")).to_value(),
            Value::Symbol(Symbol::from("amqp:sasl-challenge"))
        );
    }

    #[test]
    fn test_described_constructor() {
        let v = Value::described(Descriptor::Code(0x42), Value::List(vec![Value::Null]));
        match v {
            Value::Described(d) => {
                assert_eq!(d.descriptor, Descriptor::Code(0x42));
                assert_eq!(d.value, Value::List(vec![Value::Null]));
            }
            other => panic!("expected described value, got {other:?}"),
        }
    }
}
