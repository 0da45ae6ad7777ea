//! Fixed-schema method body codec.
//!
//! Unlike the self-describing codec in [`crate::codec`], method bodies
//! carry no per-field type information: both sides know every field's
//! type and order from the (class, method) pair. Each body describes
//! its fields once through [`FieldVisitor`]; sizing and encoding are
//! two interpretations of the same walk, and decoding reads the fixed
//! layout directly.
//!
//! # Example
//!
//! ```
//! use amqwire::framing::{decode_method, encode_method, AmqMethod};
//! use amqwire::framing::basic::BasicAckBody;
//!
//! let body = BasicAckBody { delivery_tag: 7, multiple: false };
//! let bytes = encode_method(&body);
//! assert_eq!(decode_method(&bytes).unwrap(), AmqMethod::BasicAck(body));
//! ```

pub mod basic;
pub mod connection;
pub mod fields;
pub mod method;
pub mod queue;
pub mod table;

pub use fields::{EncodeVisitor, FieldVisitor, SizeVisitor};
pub use method::{
    decode_method, encode_method, process_method, AmqMethod, MethodBody, MethodProcessor,
};
pub use table::{FieldTable, ShortString, TableValue};
