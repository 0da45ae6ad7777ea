//! Lookup tables binding value kinds to writer factories and wire
//! codes/descriptors to decoders.
//!
//! A registry is populated by explicit registration calls at engine
//! startup and is immutable afterwards: registration takes `&mut self`,
//! every lookup takes `&self`, so the write-then-freeze discipline is
//! enforced by ownership and lookups need no locking across connection
//! threads.

use std::collections::HashMap;

use crate::codec::compound::{ArrayWriter, ListWriter, MapWriter};
use crate::codec::cursor::Cursor;
use crate::codec::decode::{self, ValueHandler};
use crate::codec::described::DescribedWriter;
use crate::codec::writer::{ScalarWriter, ValueWriter, VariableWriter};
use crate::error::{CodecError, Result};
use crate::types::condition::ERROR_RECORD_DESCRIPTOR;
use crate::types::security;
use crate::types::{Descriptor, Value, ValueKind};

/// Factory producing a fresh, unbound writer.
pub type WriterFactory = for<'r> fn(&'r Registry) -> Box<dyn ValueWriter + 'r>;

/// Stateless decoder for one wire type code. Pure function from a byte
/// range (and a handler for recursive decoding) to a value.
pub type TypeConstructorFn = fn(&mut Cursor<'_>, &ValueHandler<'_>) -> Result<Value>;

/// Interpreter applied to a decoded described value, selected by
/// descriptor.
pub type DescribedConstructorFn = fn(Descriptor, Value) -> Result<Value>;

/// Type ↔ writer-factory and wire-code ↔ decoder lookup tables.
pub struct Registry {
    writers: HashMap<ValueKind, WriterFactory>,
    decoders: HashMap<u8, TypeConstructorFn>,
    described: HashMap<Descriptor, DescribedConstructorFn>,
}

impl Registry {
    /// An empty registry. Use [`Registry::core`] for the full protocol
    /// type system.
    pub fn new() -> Self {
        Self {
            writers: HashMap::new(),
            decoders: HashMap::new(),
            described: HashMap::new(),
        }
    }

    /// Registry covering every value kind, wire code, and descriptor
    /// the broker produces.
    pub fn core() -> Self {
        let mut registry = Self::new();

        for kind in [
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
        ] {
            registry.register_writer(kind, scalar_factory);
        }
        for kind in [ValueKind::Binary, ValueKind::String, ValueKind::Symbol] {
            registry.register_writer(kind, variable_factory);
        }
        registry.register_writer(ValueKind::List, list_factory);
        registry.register_writer(ValueKind::Map, map_factory);
        registry.register_writer(ValueKind::Array, array_factory);
        registry.register_writer(ValueKind::Described, described_factory);

        decode::register_core(&mut registry);

        for code in [
            security::SASL_MECHANISMS_DESCRIPTOR,
            security::SASL_INIT_DESCRIPTOR,
            security::SASL_CHALLENGE_DESCRIPTOR,
            security::SASL_RESPONSE_DESCRIPTOR,
            security::SASL_OUTCOME_DESCRIPTOR,
            ERROR_RECORD_DESCRIPTOR,
        ] {
            registry.register_described(Descriptor::Code(code), decode::list_record_constructor);
        }

        registry
    }

    /// Register the writer factory for a value kind.
    pub fn register_writer(&mut self, kind: ValueKind, factory: WriterFactory) {
        self.writers.insert(kind, factory);
    }

    /// Register the decoder for a wire type code.
    pub fn register_decoder(&mut self, code: u8, constructor: TypeConstructorFn) {
        self.decoders.insert(code, constructor);
    }

    /// Register the interpreter for a descriptor.
    pub fn register_described(&mut self, descriptor: Descriptor, constructor: DescribedConstructorFn) {
        self.described.insert(descriptor, constructor);
    }

    /// A freshly constructed writer bound to `value`, selected by the
    /// value's runtime kind.
    ///
    /// An unregistered kind is a defect in the calling broker code, not
    /// a protocol error, and fails immediately with an internal-error
    /// condition.
    pub fn get_value_writer(&self, value: Value) -> Result<Box<dyn ValueWriter + '_>> {
        let kind = value.kind();
        let factory = self.writers.get(&kind).ok_or_else(|| {
            CodecError::internal(format!("no writer factory registered for value kind {kind:?}"))
        })?;
        let mut writer = factory(self);
        writer.set_value(value)?;
        Ok(writer)
    }

    /// The decoder for a wire type code.
    pub fn get_constructor(&self, code: u8) -> Result<TypeConstructorFn> {
        self.decoders.get(&code).copied().ok_or_else(|| {
            CodecError::unknown_type(format!("unknown wire type code 0x{code:02x}"))
        })
    }

    /// The interpreter for a descriptor.
    pub fn get_described(&self, descriptor: &Descriptor) -> Result<DescribedConstructorFn> {
        self.described.get(descriptor).copied().ok_or_else(|| {
            CodecError::unknown_type(format!("unknown descriptor {descriptor:?}"))
        })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn scalar_factory<'r>(_registry: &'r Registry) -> Box<dyn ValueWriter + 'r> {
    Box::new(ScalarWriter::new())
}

fn variable_factory<'r>(_registry: &'r Registry) -> Box<dyn ValueWriter + 'r> {
    Box::new(VariableWriter::new())
}

fn list_factory<'r>(registry: &'r Registry) -> Box<dyn ValueWriter + 'r> {
    Box::new(ListWriter::new(registry))
}

fn map_factory<'r>(registry: &'r Registry) -> Box<dyn ValueWriter + 'r> {
    Box::new(MapWriter::new(registry))
}

fn array_factory<'r>(_registry: &'r Registry) -> Box<dyn ValueWriter + 'r> {
    Box::new(ArrayWriter::new())
}

fn described_factory<'r>(registry: &'r Registry) -> Box<dyn ValueWriter + 'r> {
    Box::new(DescribedWriter::new(registry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCondition;

    #[test]
    fn test_core_registry_is_exhaustive_over_kinds() {
        let registry = Registry::core();
        for kind in ValueKind::ALL {
            assert!(
                registry.writers.contains_key(&kind),
                "no writer factory for {kind:?}"
            );
        }
    }

    #[test]
    fn test_unregistered_kind_fails_deterministically() {
        let registry = Registry::new();
        let Err(err) = registry.get_value_writer(Value::Uint(1)) else {
            panic!("empty registry produced a writer");
        };
        assert_eq!(err.condition, ErrorCondition::InternalError);
        assert!(err.description.contains("Uint"));
    }

    #[test]
    fn test_unknown_wire_code_fails_with_unknown_type() {
        let registry = Registry::core();
        let err = registry.get_constructor(0x9F).unwrap_err();
        assert_eq!(err.condition, ErrorCondition::UnknownType);
        assert!(err.description.contains("0x9f"));
    }

    #[test]
    fn test_unknown_descriptor_fails_with_unknown_type() {
        let registry = Registry::core();
        let err = registry
            .get_described(&Descriptor::Code(0xDEAD))
            .unwrap_err();
        assert_eq!(err.condition, ErrorCondition::UnknownType);
    }

    #[test]
    fn test_registration_overrides_are_explicit() {
        let mut registry = Registry::new();
        registry.register_writer(ValueKind::Uint, scalar_factory);
        let writer = registry.get_value_writer(Value::Uint(7)).unwrap();
        assert!(!writer.is_complete());
    }
}
