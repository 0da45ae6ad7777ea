//! Integration tests for amqwire.
//!
//! These tests exercise the public surface end to end: value round
//! trips through the self-describing codec, chunked (capacity-1)
//! encoding, trailing-null elision on described records, and the
//! fixed-schema method codec.

use bytes::Bytes;
use uuid::Uuid;

use amqwire::codec::{decode_value, encode_value, encoded_size, Registry};
use amqwire::framing::basic::BasicConsumeBody;
use amqwire::framing::{
    decode_method, encode_method, AmqMethod, FieldTable, MethodBody, ShortString,
};
use amqwire::error::ErrorCondition;
use amqwire::types::security::{SaslChallenge, SaslInit, SaslOutcome};
use amqwire::types::{Described, DescribedRecord, Descriptor, Value, ValueKind};

fn sample_values() -> Vec<Value> {
    vec![
        Value::Null,
        Value::Bool(true),
        Value::Bool(false),
        Value::Ubyte(0xAB),
        Value::Ushort(0xABCD),
        Value::Uint(0),
        Value::Uint(200),
        Value::Uint(70_000),
        Value::Ulong(0),
        Value::Ulong(66),
        Value::Ulong(u64::MAX),
        Value::Byte(-3),
        Value::Short(-300),
        Value::Int(-120),
        Value::Int(1 << 20),
        Value::Long(-5),
        Value::Long(1 << 40),
        Value::Float(1.5),
        Value::Double(-2.25),
        Value::Timestamp(1_700_000_000_000),
        Value::Uuid(Uuid::from_bytes([0x11; 16])),
        Value::Binary(Bytes::from_static(b"payload")),
        Value::Binary(Bytes::from(vec![0x42; 300])),
        Value::String("hello".into()),
        Value::String("x".repeat(300)),
        Value::Symbol("amqp:link:redirect".into()),
        Value::List(vec![]),
        Value::List(vec![Value::Uint(1), Value::Null, Value::String("s".into())]),
        Value::Map(vec![
            (Value::Symbol("ttl".into()), Value::Uint(30_000)),
            (Value::Symbol("priority".into()), Value::Ubyte(4)),
        ]),
        Value::Array(vec![Value::Uint(1), Value::Uint(2), Value::Uint(300)]),
        Value::Array(vec![Value::Null, Value::Null]),
        Value::Described(Box::new(Described {
            descriptor: Descriptor::Code(0x42),
            value: Value::List(vec![Value::Binary(Bytes::from_static(b"ch"))]),
        })),
    ]
}

/// Every sample value survives encode → decode unchanged, and the
/// sizing pass predicts the emitted length exactly.
#[test]
fn test_value_round_trips() {
    let registry = Registry::core();
    for value in sample_values() {
        let bytes = encode_value(&registry, value.clone()).unwrap();
        assert_eq!(bytes.len(), encoded_size(&value), "size mismatch for {value:?}");
        assert_eq!(decode_value(&registry, &bytes).unwrap(), value);
    }
}

/// Writing through a one-byte window produces the same bytes as a
/// single full-buffer write, for every sample value.
#[test]
fn test_chunked_write_equivalence() {
    let registry = Registry::core();
    for value in sample_values() {
        let whole = encode_value(&registry, value.clone()).unwrap();

        let mut writer = registry.get_value_writer(value.clone()).unwrap();
        let mut chunked = Vec::new();
        while !writer.is_complete() {
            let mut window = [0u8; 1];
            let n = writer.write_to_buffer(&mut window);
            assert_eq!(n, 1, "writer stalled for {value:?}");
            chunked.push(window[0]);
        }
        assert_eq!(chunked, whole, "chunked bytes differ for {value:?}");
        // a completed writer emits nothing further
        assert_eq!(writer.write_to_buffer(&mut [0u8; 8]), 0);
    }
}

/// One byte short of a fixed-width payload is a fatal framing error.
#[test]
fn test_truncation_rejected() {
    let registry = Registry::core();
    for value in sample_values() {
        let bytes = encode_value(&registry, value).unwrap();
        if bytes.len() < 2 {
            continue;
        }
        let err = decode_value(&registry, &bytes[..bytes.len() - 1]).unwrap_err();
        assert_eq!(err.condition, ErrorCondition::FramingError);
    }
}

/// A null challenge is elided from the wire entirely; a present
/// challenge keeps its field slot.
#[test]
fn test_sasl_challenge_elision() {
    let registry = Registry::core();

    let empty = SaslChallenge { challenge: None };
    let bytes = encode_value(&registry, empty.to_value()).unwrap();
    // descriptor marker, small ulong descriptor, empty list
    assert_eq!(bytes, vec![0x00, 0x53, 0x42, 0x45]);
    let decoded = SaslChallenge::from_value(decode_value(&registry, &bytes).unwrap()).unwrap();
    assert_eq!(decoded, empty);

    let full = SaslChallenge {
        challenge: Some(Bytes::from(vec![0x5A; 17])),
    };
    let bytes = encode_value(&registry, full.to_value()).unwrap();
    // marker(1) + descriptor(2) + list8 header(3) + vbin8(2 + 17)
    assert_eq!(bytes.len(), 25);
    assert_eq!(bytes[5], 0x01, "field count must include the challenge");
    let decoded = SaslChallenge::from_value(decode_value(&registry, &bytes).unwrap()).unwrap();
    assert_eq!(decoded, full);
}

/// Interior nulls keep their slot: eliding only trims the tail.
#[test]
fn test_interior_null_preserved() {
    let registry = Registry::core();
    let init = SaslInit {
        mechanism: "PLAIN".into(),
        initial_response: None,
        hostname: Some("broker.example".into()),
    };
    let bytes = encode_value(&registry, init.to_value()).unwrap();
    let decoded = SaslInit::from_value(decode_value(&registry, &bytes).unwrap()).unwrap();
    assert_eq!(decoded, init);

    // a trailing null is dropped, shortening the wire form
    let outcome = SaslOutcome {
        code: 0,
        additional_data: None,
    };
    let bytes = encode_value(&registry, outcome.to_value()).unwrap();
    let decoded = SaslOutcome::from_value(decode_value(&registry, &bytes).unwrap()).unwrap();
    assert_eq!(decoded, outcome);
}

/// Four consecutive flags (true, false, true, false) pack as 0b0101 and
/// unpack to the same booleans.
#[test]
fn test_bitfield_round_trip() {
    let body = BasicConsumeBody {
        ticket: 0,
        queue: ShortString::new("q").unwrap(),
        consumer_tag: ShortString::new("c").unwrap(),
        no_local: true,
        no_ack: false,
        exclusive: true,
        nowait: false,
        arguments: FieldTable::new(),
    };
    let bytes = encode_method(&body);
    assert_eq!(bytes.len(), 4 + body.body_size());
    match decode_method(&bytes).unwrap() {
        AmqMethod::BasicConsume(decoded) => {
            assert!(decoded.no_local);
            assert!(!decoded.no_ack);
            assert!(decoded.exclusive);
            assert!(!decoded.nowait);
            assert_eq!(decoded, body);
        }
        other => panic!("decoded wrong method: {other:?}"),
    }
}

/// The core registry can produce a writer for every value kind.
#[test]
fn test_registry_covers_every_kind() {
    let registry = Registry::core();
    for kind in ValueKind::ALL {
        let value = match kind {
            ValueKind::Null => Value::Null,
            ValueKind::Bool => Value::Bool(true),
            ValueKind::Ubyte => Value::Ubyte(1),
            ValueKind::Ushort => Value::Ushort(1),
            ValueKind::Uint => Value::Uint(1),
            ValueKind::Ulong => Value::Ulong(1),
            ValueKind::Byte => Value::Byte(1),
            ValueKind::Short => Value::Short(1),
            ValueKind::Int => Value::Int(1),
            ValueKind::Long => Value::Long(1),
            ValueKind::Float => Value::Float(1.0),
            ValueKind::Double => Value::Double(1.0),
            ValueKind::Timestamp => Value::Timestamp(1),
            ValueKind::Uuid => Value::Uuid(Uuid::nil()),
            ValueKind::Binary => Value::Binary(Bytes::new()),
            ValueKind::String => Value::String(String::new()),
            ValueKind::Symbol => Value::Symbol("s".into()),
            ValueKind::List => Value::List(vec![]),
            ValueKind::Map => Value::Map(vec![]),
            ValueKind::Array => Value::Array(vec![]),
            ValueKind::Described => Value::Described(Box::new(Described {
                descriptor: Descriptor::Code(0x42),
                value: Value::List(vec![]),
            })),
        };
        assert!(
            registry.get_value_writer(value).is_ok(),
            "no writer for {kind:?}"
        );
    }
}
