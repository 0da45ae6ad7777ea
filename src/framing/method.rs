//! Method body encoding, dispatch, and the close-handshake veto hook.
//!
//! Encoded form: class id (u16 BE), method id (u16 BE), then the
//! body's field payload. Both the size report and the payload emission
//! are driven by the body's single field walk ([`MethodBody`] provided
//! methods), keeping the two in agreement for every body.

use crate::codec::Cursor;
use crate::error::{CodecError, Result};
use crate::framing::basic::{
    BasicAckBody, BasicConsumeBody, BasicGetBody, BasicPublishBody, BasicRecoverBody,
};
use crate::framing::connection::{ConnectionCloseBody, ConnectionCloseOkBody};
use crate::framing::fields::{EncodeVisitor, FieldVisitor, SizeVisitor};
use crate::framing::queue::QueueDeclareBody;

/// A fixed-schema method body.
///
/// Implementations supply identity and a single field walk; sizing and
/// payload emission are derived from the walk.
pub trait MethodBody {
    /// Protocol class this method belongs to.
    fn class_id(&self) -> u16;

    /// Method id within the class.
    fn method_id(&self) -> u16;

    /// Visit every field in declaration order.
    fn visit_fields(&self, visitor: &mut dyn FieldVisitor);

    /// Exact payload size in bytes, excluding the class/method header.
    fn body_size(&self) -> usize {
        let mut size = SizeVisitor::new();
        self.visit_fields(&mut size);
        size.size()
    }

    /// Append the field payload to `out`.
    fn write_payload(&self, out: &mut Vec<u8>) {
        let mut encode = EncodeVisitor::new(out);
        self.visit_fields(&mut encode);
    }
}

/// Encode a method body with its class/method header.
pub fn encode_method(body: &dyn MethodBody) -> Vec<u8> {
    let size = 4 + body.body_size();
    let mut out = Vec::with_capacity(size);
    out.extend_from_slice(&body.class_id().to_be_bytes());
    out.extend_from_slice(&body.method_id().to_be_bytes());
    body.write_payload(&mut out);
    debug_assert_eq!(out.len(), size);
    out
}

/// Every method body this codec can decode.
#[derive(Debug, Clone, PartialEq)]
pub enum AmqMethod {
    BasicConsume(BasicConsumeBody),
    BasicGet(BasicGetBody),
    BasicPublish(BasicPublishBody),
    BasicAck(BasicAckBody),
    BasicRecover(BasicRecoverBody),
    QueueDeclare(QueueDeclareBody),
    ConnectionClose(ConnectionCloseBody),
    ConnectionCloseOk(ConnectionCloseOkBody),
}

impl AmqMethod {
    /// The contained body.
    pub fn body(&self) -> &dyn MethodBody {
        match self {
            Self::BasicConsume(body) => body,
            Self::BasicGet(body) => body,
            Self::BasicPublish(body) => body,
            Self::BasicAck(body) => body,
            Self::BasicRecover(body) => body,
            Self::QueueDeclare(body) => body,
            Self::ConnectionClose(body) => body,
            Self::ConnectionCloseOk(body) => body,
        }
    }
}

/// Decode one method (header plus body) from a frame payload.
///
/// An unrecognized (class, method) pair is an unknown-type error;
/// leftover bytes after the body are a framing error.
pub fn decode_method(payload: &[u8]) -> Result<AmqMethod> {
    let mut cur = Cursor::new(payload);
    let class = cur.try_get_u16("class id")?;
    let method = cur.try_get_u16("method id")?;
    let decoded = match (class, method) {
        (BasicConsumeBody::CLASS_ID, BasicConsumeBody::METHOD_ID) => {
            AmqMethod::BasicConsume(BasicConsumeBody::decode(&mut cur)?)
        }
        (BasicGetBody::CLASS_ID, BasicGetBody::METHOD_ID) => {
            AmqMethod::BasicGet(BasicGetBody::decode(&mut cur)?)
        }
        (BasicPublishBody::CLASS_ID, BasicPublishBody::METHOD_ID) => {
            AmqMethod::BasicPublish(BasicPublishBody::decode(&mut cur)?)
        }
        (BasicAckBody::CLASS_ID, BasicAckBody::METHOD_ID) => {
            AmqMethod::BasicAck(BasicAckBody::decode(&mut cur)?)
        }
        (BasicRecoverBody::CLASS_ID, BasicRecoverBody::METHOD_ID) => {
            AmqMethod::BasicRecover(BasicRecoverBody::decode(&mut cur)?)
        }
        (QueueDeclareBody::CLASS_ID, QueueDeclareBody::METHOD_ID) => {
            AmqMethod::QueueDeclare(QueueDeclareBody::decode(&mut cur)?)
        }
        (ConnectionCloseBody::CLASS_ID, ConnectionCloseBody::METHOD_ID) => {
            AmqMethod::ConnectionClose(ConnectionCloseBody::decode(&mut cur)?)
        }
        (ConnectionCloseOkBody::CLASS_ID, ConnectionCloseOkBody::METHOD_ID) => {
            AmqMethod::ConnectionCloseOk(ConnectionCloseOkBody::decode(&mut cur)?)
        }
        _ => {
            return Err(CodecError::unknown_type(format!(
                "unknown method (class {class}, method {method})"
            )))
        }
    };
    if !cur.is_empty() {
        return Err(CodecError::framing(format!(
            "{} trailing bytes after method body",
            cur.remaining()
        )));
    }
    Ok(decoded)
}

/// Receiver of decoded methods with a dispatch-boundary veto.
pub trait MethodProcessor {
    /// While true, every inbound method except Connection.Close-Ok is
    /// decoded and then dropped. Used while a close handshake is in
    /// flight.
    fn ignore_all_but_close_ok(&self) -> bool {
        false
    }

    /// Deliver a decoded method.
    fn receive(&mut self, method: AmqMethod);
}

/// Decode a method payload and deliver it to `processor`.
///
/// The veto is consulted after decoding completes, so stream alignment
/// is preserved even for methods the processor refuses; only the
/// delivery is suppressed.
pub fn process_method(processor: &mut dyn MethodProcessor, payload: &[u8]) -> Result<()> {
    let method = decode_method(payload)?;
    if processor.ignore_all_but_close_ok()
        && !matches!(method, AmqMethod::ConnectionCloseOk(_))
    {
        tracing::debug!(
            class = method.body().class_id(),
            method = method.body().method_id(),
            "dropping method while awaiting close-ok"
        );
        return Ok(());
    }
    processor.receive(method);
    Ok(())
}
