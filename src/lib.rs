//! # amqwire
//!
//! Wire-protocol codec for an AMQP message broker.
//!
//! Two codecs live side by side, covering the two framing styles the
//! broker speaks:
//!
//! - **Self-describing codec** ([`codec`]): every value carries a type
//!   constructor byte. Encoding is incremental and resumable so large
//!   messages never have to be materialized into one buffer; decoding
//!   is strict and non-recovering.
//! - **Fixed-schema codec** ([`framing`]): method bodies whose field
//!   layout is fixed by the (class, method) pair, including packed
//!   bitfield bytes for consecutive flags.
//!
//! ## Example
//!
//! ```
//! use amqwire::codec::{decode_value, encode_value, Registry};
//! use amqwire::types::Value;
//!
//! let registry = Registry::core();
//! let value = Value::List(vec![Value::Uint(7), Value::String("hello".into())]);
//! let bytes = encode_value(&registry, value.clone()).unwrap();
//! assert_eq!(decode_value(&registry, &bytes).unwrap(), value);
//! ```

pub mod codec;
pub mod error;
pub mod framing;
pub mod types;

pub use codec::{decode_value, encode_value, Registry, ValueWriter};
pub use error::{CodecError, ErrorCondition, Result};
pub use types::{Described, Descriptor, Symbol, Value, ValueKind};
