//! Protocol value model and typed described records.
//!
//! [`value`] holds the generic [`Value`] model the codec serializes.
//! [`security`] and [`condition`] hold the typed described records the
//! broker exchanges (SASL frames, error records); each supplies only its
//! descriptor and positional field accessors, and the generic described
//! writer does the rest.

pub mod condition;
pub mod security;
pub mod value;

pub use condition::{ErrorRecord, ERROR_RECORD_DESCRIPTOR};
pub use value::{Described, Descriptor, Symbol, Value, ValueKind};

/// A described record whose underlying value is a positional field list.
///
/// Concrete record types supply a descriptor and a field accessor; the
/// encode path builds the full positional list (trailing nulls
/// included) and leaves trailing-null elision to the described writer.
pub trait DescribedRecord {
    /// Descriptor identifying this record on the wire.
    fn descriptor(&self) -> Descriptor;

    /// Number of fields declared by the protocol for this record.
    fn field_count(&self) -> usize;

    /// The field at `index` in protocol-declared positional order.
    /// Absent optional fields are [`Value::Null`].
    fn field(&self, index: usize) -> Value;

    /// The record as a generic described value, fields in positional
    /// order including any trailing nulls.
    fn to_value(&self) -> Value {
        let fields = (0..self.field_count()).map(|i| self.field(i)).collect();
        Value::described(self.descriptor(), Value::List(fields))
    }
}
