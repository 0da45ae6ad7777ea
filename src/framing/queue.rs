//! Method bodies of the queue class.

use crate::codec::Cursor;
use crate::error::Result;
use crate::framing::fields::{bit, FieldVisitor};
use crate::framing::method::MethodBody;
use crate::framing::table::{FieldTable, ShortString};

/// Queue.Declare: create or assert a queue. Five flags share one
/// bitfield byte.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueueDeclareBody {
    pub ticket: u16,
    pub queue: ShortString,
    pub passive: bool,
    pub durable: bool,
    pub exclusive: bool,
    pub auto_delete: bool,
    pub nowait: bool,
    pub arguments: FieldTable,
}

impl QueueDeclareBody {
    pub const CLASS_ID: u16 = 50;
    pub const METHOD_ID: u16 = 10;

    pub fn decode(cur: &mut Cursor<'_>) -> Result<Self> {
        let ticket = cur.try_get_u16("ticket")?;
        let queue = ShortString::decode(cur)?;
        let bits = cur.try_get_u8("declare flags")?;
        let arguments = FieldTable::decode(cur)?;
        Ok(Self {
            ticket,
            queue,
            passive: bit(bits, 0),
            durable: bit(bits, 1),
            exclusive: bit(bits, 2),
            auto_delete: bit(bits, 3),
            nowait: bit(bits, 4),
            arguments,
        })
    }
}

impl MethodBody for QueueDeclareBody {
    fn class_id(&self) -> u16 {
        Self::CLASS_ID
    }

    fn method_id(&self) -> u16 {
        Self::METHOD_ID
    }

    fn visit_fields(&self, visitor: &mut dyn FieldVisitor) {
        visitor.uint16(self.ticket);
        visitor.short_string(&self.queue);
        visitor.bit(self.passive);
        visitor.bit(self.durable);
        visitor.bit(self.exclusive);
        visitor.bit(self.auto_delete);
        visitor.bit(self.nowait);
        visitor.field_table(&self.arguments);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framing::method::{decode_method, encode_method, AmqMethod};

    #[test]
    fn test_declare_round_trip() {
        let body = QueueDeclareBody {
            ticket: 2,
            queue: ShortString::new("jobs").unwrap(),
            passive: false,
            durable: true,
            exclusive: false,
            auto_delete: true,
            nowait: true,
            arguments: FieldTable::new(),
        };
        let bytes = encode_method(&body);
        assert_eq!(bytes.len(), 4 + body.body_size());
        assert_eq!(decode_method(&bytes).unwrap(), AmqMethod::QueueDeclare(body));
    }

    #[test]
    fn test_five_flags_share_one_byte() {
        let body = QueueDeclareBody {
            queue: ShortString::new("q").unwrap(),
            passive: true,
            durable: false,
            exclusive: true,
            auto_delete: false,
            nowait: true,
            ..Default::default()
        };
        let bytes = encode_method(&body);
        // header(4) + ticket(2) + queue(2) = 8
        assert_eq!(bytes[8], 0b10101);
    }
}
