//! Typed SASL frame records.
//!
//! Each record is an immutable positional-field structure identified by
//! a numeric descriptor in the protocol-reserved namespace. Encoding
//! goes through [`DescribedRecord::to_value`] and the generic described
//! writer; decoding interprets a generic described value back into the
//! typed record.

use bytes::Bytes;

use crate::error::{CodecError, Result};
use crate::types::{Described, DescribedRecord, Descriptor, Symbol, Value};

/// Descriptor code for [`SaslMechanisms`].
pub const SASL_MECHANISMS_DESCRIPTOR: u64 = 0x0000_0000_0000_0040;
/// Descriptor code for [`SaslInit`].
pub const SASL_INIT_DESCRIPTOR: u64 = 0x0000_0000_0000_0041;
/// Descriptor code for [`SaslChallenge`].
pub const SASL_CHALLENGE_DESCRIPTOR: u64 = 0x0000_0000_0000_0042;
/// Descriptor code for [`SaslResponse`].
pub const SASL_RESPONSE_DESCRIPTOR: u64 = 0x0000_0000_0000_0043;
/// Descriptor code for [`SaslOutcome`].
pub const SASL_OUTCOME_DESCRIPTOR: u64 = 0x0000_0000_0000_0044;

/// Server advertisement of the SASL mechanisms it supports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaslMechanisms {
    /// Mechanism names, at least one.
    pub sasl_server_mechanisms: Vec<Symbol>,
}

impl DescribedRecord for SaslMechanisms {
    fn descriptor(&self) -> Descriptor {
        Descriptor::Code(SASL_MECHANISMS_DESCRIPTOR)
    }

    fn field_count(&self) -> usize {
        1
    }

    fn field(&self, index: usize) -> Value {
        match index {
            // A single mechanism is sent as a plain symbol, several as
            // an array of symbols.
            0 if self.sasl_server_mechanisms.len() == 1 => {
                Value::Symbol(self.sasl_server_mechanisms[0].clone())
            }
            0 => Value::Array(
                self.sasl_server_mechanisms
                    .iter()
                    .cloned()
                    .map(Value::Symbol)
                    .collect(),
            ),
            _ => Value::Null,
        }
    }
}

impl SaslMechanisms {
    /// Interpret a decoded described value as a SASL mechanisms frame.
    pub fn from_value(value: Value) -> Result<Self> {
        let mut fields = record_fields(value, SASL_MECHANISMS_DESCRIPTOR, "sasl-mechanisms")?;
        let mechanisms = match take(&mut fields, 0) {
            Value::Symbol(sym) => vec![sym],
            Value::Array(items) => items
                .into_iter()
                .map(|v| match v {
                    Value::Symbol(sym) => Ok(sym),
                    other => Err(field_error("sasl-mechanisms", 0, "symbol", &other)),
                })
                .collect::<Result<Vec<_>>>()?,
            other => return Err(field_error("sasl-mechanisms", 0, "symbol or array", &other)),
        };
        Ok(Self {
            sasl_server_mechanisms: mechanisms,
        })
    }
}

/// Client selection of a mechanism, with an optional initial response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaslInit {
    /// Chosen mechanism.
    pub mechanism: Symbol,
    /// Mechanism-specific initial response.
    pub initial_response: Option<Bytes>,
    /// Name of the target host.
    pub hostname: Option<String>,
}

impl DescribedRecord for SaslInit {
    fn descriptor(&self) -> Descriptor {
        Descriptor::Code(SASL_INIT_DESCRIPTOR)
    }

    fn field_count(&self) -> usize {
        3
    }

    fn field(&self, index: usize) -> Value {
        match index {
            0 => Value::Symbol(self.mechanism.clone()),
            1 => opt_binary_value(&self.initial_response),
            2 => self
                .hostname
                .as_ref()
                .map_or(Value::Null, |h| Value::String(h.clone())),
            _ => Value::Null,
        }
    }
}

impl SaslInit {
    /// Interpret a decoded described value as a SASL init frame.
    pub fn from_value(value: Value) -> Result<Self> {
        let mut fields = record_fields(value, SASL_INIT_DESCRIPTOR, "sasl-init")?;
        let mechanism = match take(&mut fields, 0) {
            Value::Symbol(sym) => sym,
            other => return Err(field_error("sasl-init", 0, "symbol", &other)),
        };
        Ok(Self {
            mechanism,
            initial_response: opt_binary(take(&mut fields, 1), "sasl-init", 1)?,
            hostname: opt_string(take(&mut fields, 2), "sasl-init", 2)?,
        })
    }
}

/// Server challenge sent during mechanism negotiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaslChallenge {
    /// Challenge data, mechanism-specific.
    pub challenge: Option<Bytes>,
}

impl DescribedRecord for SaslChallenge {
    fn descriptor(&self) -> Descriptor {
        Descriptor::Code(SASL_CHALLENGE_DESCRIPTOR)
    }

    fn field_count(&self) -> usize {
        1
    }

    fn field(&self, index: usize) -> Value {
        match index {
            0 => opt_binary_value(&self.challenge),
            _ => Value::Null,
        }
    }
}

impl SaslChallenge {
    /// Interpret a decoded described value as a SASL challenge frame.
    pub fn from_value(value: Value) -> Result<Self> {
        let mut fields = record_fields(value, SASL_CHALLENGE_DESCRIPTOR, "sasl-challenge")?;
        Ok(Self {
            challenge: opt_binary(take(&mut fields, 0), "sasl-challenge", 0)?,
        })
    }
}

/// Client response to a server challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaslResponse {
    /// Response data, mechanism-specific.
    pub response: Option<Bytes>,
}

impl DescribedRecord for SaslResponse {
    fn descriptor(&self) -> Descriptor {
        Descriptor::Code(SASL_RESPONSE_DESCRIPTOR)
    }

    fn field_count(&self) -> usize {
        1
    }

    fn field(&self, index: usize) -> Value {
        match index {
            0 => opt_binary_value(&self.response),
            _ => Value::Null,
        }
    }
}

impl SaslResponse {
    /// Interpret a decoded described value as a SASL response frame.
    pub fn from_value(value: Value) -> Result<Self> {
        let mut fields = record_fields(value, SASL_RESPONSE_DESCRIPTOR, "sasl-response")?;
        Ok(Self {
            response: opt_binary(take(&mut fields, 0), "sasl-response", 0)?,
        })
    }
}

/// Final outcome of SASL negotiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaslOutcome {
    /// Outcome code: 0 = ok, 1 = auth failure, 2+ = system errors.
    pub code: u8,
    /// Additional data carried with the outcome.
    pub additional_data: Option<Bytes>,
}

impl DescribedRecord for SaslOutcome {
    fn descriptor(&self) -> Descriptor {
        Descriptor::Code(SASL_OUTCOME_DESCRIPTOR)
    }

    fn field_count(&self) -> usize {
        2
    }

    fn field(&self, index: usize) -> Value {
        match index {
            0 => Value::Ubyte(self.code),
            1 => opt_binary_value(&self.additional_data),
            _ => Value::Null,
        }
    }
}

impl SaslOutcome {
    /// Interpret a decoded described value as a SASL outcome frame.
    pub fn from_value(value: Value) -> Result<Self> {
        let mut fields = record_fields(value, SASL_OUTCOME_DESCRIPTOR, "sasl-outcome")?;
        let code = match take(&mut fields, 0) {
            Value::Ubyte(code) => code,
            other => return Err(field_error("sasl-outcome", 0, "ubyte", &other)),
        };
        Ok(Self {
            code,
            additional_data: opt_binary(take(&mut fields, 1), "sasl-outcome", 1)?,
        })
    }
}

fn opt_binary_value(data: &Option<Bytes>) -> Value {
    data.as_ref()
        .map_or(Value::Null, |b| Value::Binary(b.clone()))
}

/// Unwrap a described value with the expected numeric descriptor into
/// its positional field list.
pub(crate) fn record_fields(value: Value, code: u64, name: &str) -> Result<Vec<Value>> {
    let Value::Described(described) = value else {
        return Err(CodecError::framing(format!(
            "cannot decode {name}: not a described value"
        )));
    };
    let Described { descriptor, value } = *described;
    if descriptor != Descriptor::Code(code) {
        return Err(CodecError::framing(format!(
            "cannot decode {name}: wrong descriptor {descriptor:?}"
        )));
    }
    match value {
        Value::List(fields) => Ok(fields),
        other => Err(CodecError::framing(format!(
            "cannot decode {name}: body is {:?}, expected a list",
            other.kind()
        ))),
    }
}

/// Take the field at `index`, or null when the field was elided.
pub(crate) fn take(fields: &mut Vec<Value>, index: usize) -> Value {
    if index < fields.len() {
        std::mem::replace(&mut fields[index], Value::Null)
    } else {
        Value::Null
    }
}

pub(crate) fn field_error(name: &str, index: usize, expected: &str, got: &Value) -> CodecError {
    CodecError::framing(format!(
        "cannot decode {name}: field {index} is {:?}, expected {expected}",
        got.kind()
    ))
}

fn opt_binary(value: Value, name: &str, index: usize) -> Result<Option<Bytes>> {
    match value {
        Value::Null => Ok(None),
        Value::Binary(bytes) => Ok(Some(bytes)),
        other => Err(field_error(name, index, "binary", &other)),
    }
}

fn opt_string(value: Value, name: &str, index: usize) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        other => Err(field_error(name, index, "string", &other)),
    }
}
