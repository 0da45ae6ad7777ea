//! Method bodies of the basic class (consume, get, publish, ack,
//! recover).

use crate::codec::Cursor;
use crate::error::Result;
use crate::framing::fields::{bit, FieldVisitor};
use crate::framing::method::MethodBody;
use crate::framing::table::{FieldTable, ShortString};

const CLASS_ID: u16 = 60;

/// Basic.Consume: start a consumer on a queue.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BasicConsumeBody {
    pub ticket: u16,
    pub queue: ShortString,
    pub consumer_tag: ShortString,
    pub no_local: bool,
    pub no_ack: bool,
    pub exclusive: bool,
    pub nowait: bool,
    pub arguments: FieldTable,
}

impl BasicConsumeBody {
    pub const CLASS_ID: u16 = CLASS_ID;
    pub const METHOD_ID: u16 = 20;

    pub fn decode(cur: &mut Cursor<'_>) -> Result<Self> {
        let ticket = cur.try_get_u16("ticket")?;
        let queue = ShortString::decode(cur)?;
        let consumer_tag = ShortString::decode(cur)?;
        let bits = cur.try_get_u8("consume flags")?;
        let arguments = FieldTable::decode(cur)?;
        Ok(Self {
            ticket,
            queue,
            consumer_tag,
            no_local: bit(bits, 0),
            no_ack: bit(bits, 1),
            exclusive: bit(bits, 2),
            nowait: bit(bits, 3),
            arguments,
        })
    }
}

impl MethodBody for BasicConsumeBody {
    fn class_id(&self) -> u16 {
        Self::CLASS_ID
    }

    fn method_id(&self) -> u16 {
        Self::METHOD_ID
    }

    fn visit_fields(&self, visitor: &mut dyn FieldVisitor) {
        visitor.uint16(self.ticket);
        visitor.short_string(&self.queue);
        visitor.short_string(&self.consumer_tag);
        visitor.bit(self.no_local);
        visitor.bit(self.no_ack);
        visitor.bit(self.exclusive);
        visitor.bit(self.nowait);
        visitor.field_table(&self.arguments);
    }
}

/// Basic.Get: synchronously fetch one message.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BasicGetBody {
    pub ticket: u16,
    pub queue: ShortString,
    pub no_ack: bool,
}

impl BasicGetBody {
    pub const CLASS_ID: u16 = CLASS_ID;
    pub const METHOD_ID: u16 = 70;

    pub fn decode(cur: &mut Cursor<'_>) -> Result<Self> {
        let ticket = cur.try_get_u16("ticket")?;
        let queue = ShortString::decode(cur)?;
        let bits = cur.try_get_u8("get flags")?;
        Ok(Self {
            ticket,
            queue,
            no_ack: bit(bits, 0),
        })
    }
}

impl MethodBody for BasicGetBody {
    fn class_id(&self) -> u16 {
        Self::CLASS_ID
    }

    fn method_id(&self) -> u16 {
        Self::METHOD_ID
    }

    fn visit_fields(&self, visitor: &mut dyn FieldVisitor) {
        visitor.uint16(self.ticket);
        visitor.short_string(&self.queue);
        visitor.bit(self.no_ack);
    }
}

/// Basic.Publish: publish a message to an exchange.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BasicPublishBody {
    pub ticket: u16,
    pub exchange: ShortString,
    pub routing_key: ShortString,
    pub mandatory: bool,
    pub immediate: bool,
}

impl BasicPublishBody {
    pub const CLASS_ID: u16 = CLASS_ID;
    pub const METHOD_ID: u16 = 40;

    pub fn decode(cur: &mut Cursor<'_>) -> Result<Self> {
        let ticket = cur.try_get_u16("ticket")?;
        let exchange = ShortString::decode(cur)?;
        let routing_key = ShortString::decode(cur)?;
        let bits = cur.try_get_u8("publish flags")?;
        Ok(Self {
            ticket,
            exchange,
            routing_key,
            mandatory: bit(bits, 0),
            immediate: bit(bits, 1),
        })
    }
}

impl MethodBody for BasicPublishBody {
    fn class_id(&self) -> u16 {
        Self::CLASS_ID
    }

    fn method_id(&self) -> u16 {
        Self::METHOD_ID
    }

    fn visit_fields(&self, visitor: &mut dyn FieldVisitor) {
        visitor.uint16(self.ticket);
        visitor.short_string(&self.exchange);
        visitor.short_string(&self.routing_key);
        visitor.bit(self.mandatory);
        visitor.bit(self.immediate);
    }
}

/// Basic.Ack: acknowledge one or more deliveries.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BasicAckBody {
    pub delivery_tag: u64,
    pub multiple: bool,
}

impl BasicAckBody {
    pub const CLASS_ID: u16 = CLASS_ID;
    pub const METHOD_ID: u16 = 80;

    pub fn decode(cur: &mut Cursor<'_>) -> Result<Self> {
        let delivery_tag = cur.try_get_u64("delivery tag")?;
        let bits = cur.try_get_u8("ack flags")?;
        Ok(Self {
            delivery_tag,
            multiple: bit(bits, 0),
        })
    }
}

impl MethodBody for BasicAckBody {
    fn class_id(&self) -> u16 {
        Self::CLASS_ID
    }

    fn method_id(&self) -> u16 {
        Self::METHOD_ID
    }

    fn visit_fields(&self, visitor: &mut dyn FieldVisitor) {
        visitor.uint64(self.delivery_tag);
        visitor.bit(self.multiple);
    }
}

/// Basic.Recover: redeliver unacknowledged messages.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BasicRecoverBody {
    pub requeue: bool,
}

impl BasicRecoverBody {
    pub const CLASS_ID: u16 = CLASS_ID;
    pub const METHOD_ID: u16 = 100;

    pub fn decode(cur: &mut Cursor<'_>) -> Result<Self> {
        let bits = cur.try_get_u8("recover flags")?;
        Ok(Self {
            requeue: bit(bits, 0),
        })
    }
}

impl MethodBody for BasicRecoverBody {
    fn class_id(&self) -> u16 {
        Self::CLASS_ID
    }

    fn method_id(&self) -> u16 {
        Self::METHOD_ID
    }

    fn visit_fields(&self, visitor: &mut dyn FieldVisitor) {
        visitor.bit(self.requeue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framing::method::{decode_method, encode_method, AmqMethod};
    use crate::framing::table::TableValue;

    #[test]
    fn test_consume_round_trip() {
        let mut arguments = FieldTable::new();
        arguments.insert(
            ShortString::new("priority").unwrap(),
            TableValue::Int(5),
        );
        let body = BasicConsumeBody {
            ticket: 1,
            queue: ShortString::new("orders").unwrap(),
            consumer_tag: ShortString::new("tag-1").unwrap(),
            no_local: true,
            no_ack: false,
            exclusive: true,
            nowait: false,
            arguments,
        };
        let bytes = encode_method(&body);
        assert_eq!(bytes.len(), 4 + body.body_size());
        assert_eq!(decode_method(&bytes).unwrap(), AmqMethod::BasicConsume(body));
    }

    #[test]
    fn test_consume_flag_byte_layout() {
        let body = BasicConsumeBody {
            no_local: true,
            exclusive: true,
            ..Default::default()
        };
        let bytes = encode_method(&body);
        // header(4) + ticket(2) + two empty short strings(2) = 8
        assert_eq!(bytes[8], 0b0101);
    }

    #[test]
    fn test_get_round_trip() {
        let body = BasicGetBody {
            ticket: 9,
            queue: ShortString::new("inbox").unwrap(),
            no_ack: true,
        };
        let bytes = encode_method(&body);
        assert_eq!(decode_method(&bytes).unwrap(), AmqMethod::BasicGet(body));
    }

    #[test]
    fn test_publish_round_trip() {
        let body = BasicPublishBody {
            ticket: 0,
            exchange: ShortString::new("amq.topic").unwrap(),
            routing_key: ShortString::new("metrics.cpu").unwrap(),
            mandatory: true,
            immediate: false,
        };
        let bytes = encode_method(&body);
        assert_eq!(decode_method(&bytes).unwrap(), AmqMethod::BasicPublish(body));
    }

    #[test]
    fn test_ack_multiple_bit() {
        let body = BasicAckBody {
            delivery_tag: u64::MAX,
            multiple: true,
        };
        let bytes = encode_method(&body);
        assert_eq!(bytes.len(), 4 + 8 + 1);
        assert_eq!(bytes[12], 0x01);
        assert_eq!(decode_method(&bytes).unwrap(), AmqMethod::BasicAck(body));
    }

    #[test]
    fn test_recover_round_trip() {
        let body = BasicRecoverBody { requeue: true };
        let bytes = encode_method(&body);
        assert_eq!(bytes.len(), 5);
        assert_eq!(decode_method(&bytes).unwrap(), AmqMethod::BasicRecover(body));
    }
}
