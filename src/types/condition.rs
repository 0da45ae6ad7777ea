//! The structured protocol-error record shared by both protocol halves.
//!
//! An [`ErrorRecord`] is the on-the-wire shape of a connection-level
//! failure: a condition symbol, an optional description, and an info
//! map. Codec errors convert into it for transmission ahead of a
//! connection close.

use crate::error::{CodecError, Result};
use crate::types::security::{field_error, record_fields, take};
use crate::types::{DescribedRecord, Descriptor, Symbol, Value};

/// Descriptor code for [`ErrorRecord`].
pub const ERROR_RECORD_DESCRIPTOR: u64 = 0x0000_0000_0000_001d;

/// Protocol error value: condition, description, info.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorRecord {
    /// Condition symbol, e.g. `amqp:connection:framing-error`.
    pub condition: Symbol,
    /// Human-readable description.
    pub description: Option<String>,
    /// Implementation-specific diagnostic entries.
    pub info: Vec<(Symbol, Value)>,
}

impl DescribedRecord for ErrorRecord {
    fn descriptor(&self) -> Descriptor {
        Descriptor::Code(ERROR_RECORD_DESCRIPTOR)
    }

    fn field_count(&self) -> usize {
        3
    }

    fn field(&self, index: usize) -> Value {
        match index {
            0 => Value::Symbol(self.condition.clone()),
            1 => self
                .description
                .as_ref()
                .map_or(Value::Null, |d| Value::String(d.clone())),
            2 if self.info.is_empty() => Value::Null,
            2 => Value::Map(
                self.info
                    .iter()
                    .map(|(k, v)| (Value::Symbol(k.clone()), v.clone()))
                    .collect(),
            ),
            _ => Value::Null,
        }
    }
}

impl ErrorRecord {
    /// Interpret a decoded described value as an error record.
    pub fn from_value(value: Value) -> Result<Self> {
        let mut fields = record_fields(value, ERROR_RECORD_DESCRIPTOR, "error")?;
        let condition = match take(&mut fields, 0) {
            Value::Symbol(sym) => sym,
            other => return Err(field_error("error", 0, "symbol", &other)),
        };
        let description = match take(&mut fields, 1) {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => return Err(field_error("error", 1, "string", &other)),
        };
        let info = match take(&mut fields, 2) {
            Value::Null => Vec::new(),
            Value::Map(pairs) => pairs
                .into_iter()
                .map(|(k, v)| match k {
                    Value::Symbol(sym) => Ok((sym, v)),
                    other => Err(field_error("error", 2, "symbol keys", &other)),
                })
                .collect::<Result<Vec<_>>>()?,
            other => return Err(field_error("error", 2, "map", &other)),
        };
        Ok(Self {
            condition,
            description,
            info,
        })
    }
}

impl From<&CodecError> for ErrorRecord {
    fn from(err: &CodecError) -> Self {
        Self {
            condition: Symbol::from(err.condition.symbol()),
            description: Some(err.description.clone()),
            info: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_value() {
        let record = ErrorRecord {
            condition: Symbol::from("amqp:connection:framing-error"),
            description: Some("short read".to_string()),
            info: vec![(Symbol::from("offset"), Value::Uint(12))],
        };
        let back = ErrorRecord::from_value(record.to_value()).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_from_codec_error_carries_symbol() {
        let err = CodecError::framing("truncated uuid");
        let record = ErrorRecord::from(&err);
        assert_eq!(
            record.condition,
            Symbol::from("amqp:connection:framing-error")
        );
        assert_eq!(record.description.as_deref(), Some("truncated uuid"));
    }

    #[test]
    fn test_condition_only_record_elides_trailing_fields() {
        let record = ErrorRecord {
            condition: Symbol::from("amqp:internal-error"),
            description: None,
            info: Vec::new(),
        };
        assert_eq!(record.field(1), Value::Null);
        assert_eq!(record.field(2), Value::Null);
        let back = ErrorRecord::from_value(record.to_value()).unwrap();
        assert_eq!(back, record);
    }
}
