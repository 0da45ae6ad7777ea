//! Error types for the codec.
//!
//! Every failure carries a protocol condition plus a human-readable
//! description, mirroring the error records exchanged on the wire.
//! Decode failures are fatal to the connection: there is no defined way
//! to recover mid-stream alignment, so callers surface them as
//! connection-level protocol violations and never retry.

use std::fmt;

use thiserror::Error;

/// Protocol condition attached to every codec error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCondition {
    /// Insufficient bytes for a fixed-size type, or a malformed
    /// count/length prefix. Fatal to the connection.
    FramingError,
    /// Wire type code, descriptor, or (class, method) pair not present
    /// in the registry. Treated the same as a framing error at the
    /// connection boundary.
    UnknownType,
    /// Defect in the calling broker code (e.g. asking for a writer for
    /// an unregistered value kind). Never protocol-facing.
    InternalError,
}

impl ErrorCondition {
    /// The protocol symbol carried in an outbound error record.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::FramingError => "amqp:connection:framing-error",
            Self::UnknownType => "amqp:decode-error",
            Self::InternalError => "amqp:internal-error",
        }
    }
}

impl fmt::Display for ErrorCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FramingError => "framing-error",
            Self::UnknownType => "unknown-type",
            Self::InternalError => "internal-error",
        };
        f.write_str(name)
    }
}

/// Structured codec error: a condition plus a description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{condition}: {description}")]
pub struct CodecError {
    /// Condition class of the failure.
    pub condition: ErrorCondition,
    /// Human-readable description of what could not be encoded/decoded.
    pub description: String,
}

impl CodecError {
    /// Create a framing error (insufficient or malformed bytes).
    pub fn framing(description: impl Into<String>) -> Self {
        Self {
            condition: ErrorCondition::FramingError,
            description: description.into(),
        }
    }

    /// Create an unknown-type error (unrecognized wire code or descriptor).
    pub fn unknown_type(description: impl Into<String>) -> Self {
        Self {
            condition: ErrorCondition::UnknownType,
            description: description.into(),
        }
    }

    /// Create an internal error (programming error on the encode path).
    pub fn internal(description: impl Into<String>) -> Self {
        Self {
            condition: ErrorCondition::InternalError,
            description: description.into(),
        }
    }
}

/// Result type alias using [`CodecError`].
pub type Result<T> = std::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_condition_and_description() {
        let err = CodecError::framing("cannot decode uuid: insufficient input data");
        assert_eq!(
            err.to_string(),
            "framing-error: cannot decode uuid: insufficient input data"
        );
    }

    #[test]
    fn test_condition_symbols() {
        assert_eq!(
            ErrorCondition::FramingError.symbol(),
            "amqp:connection:framing-error"
        );
        assert_eq!(ErrorCondition::UnknownType.symbol(), "amqp:decode-error");
        assert_eq!(ErrorCondition::InternalError.symbol(), "amqp:internal-error");
    }

    #[test]
    fn test_constructors_set_condition() {
        assert_eq!(
            CodecError::unknown_type("x").condition,
            ErrorCondition::UnknownType
        );
        assert_eq!(
            CodecError::internal("x").condition,
            ErrorCondition::InternalError
        );
    }
}
