//! Method bodies of the connection class: the close handshake.

use crate::codec::Cursor;
use crate::error::Result;
use crate::framing::fields::FieldVisitor;
use crate::framing::method::MethodBody;
use crate::framing::table::ShortString;

const CLASS_ID: u16 = 10;

/// Connection.Close: initiate connection teardown. `class_id` and
/// `method_id` fields identify the method that caused the close, or
/// zero when the close was not caused by a method.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConnectionCloseBody {
    pub reply_code: u16,
    pub reply_text: ShortString,
    pub class_id: u16,
    pub method_id: u16,
}

impl ConnectionCloseBody {
    pub const CLASS_ID: u16 = CLASS_ID;
    pub const METHOD_ID: u16 = 50;

    pub fn decode(cur: &mut Cursor<'_>) -> Result<Self> {
        Ok(Self {
            reply_code: cur.try_get_u16("reply code")?,
            reply_text: ShortString::decode(cur)?,
            class_id: cur.try_get_u16("failing class id")?,
            method_id: cur.try_get_u16("failing method id")?,
        })
    }
}

impl MethodBody for ConnectionCloseBody {
    fn class_id(&self) -> u16 {
        Self::CLASS_ID
    }

    fn method_id(&self) -> u16 {
        Self::METHOD_ID
    }

    fn visit_fields(&self, visitor: &mut dyn FieldVisitor) {
        visitor.uint16(self.reply_code);
        visitor.short_string(&self.reply_text);
        visitor.uint16(self.class_id);
        visitor.uint16(self.method_id);
    }
}

/// Connection.Close-Ok: the only method delivered through the dispatch
/// veto while a close handshake is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectionCloseOkBody;

impl ConnectionCloseOkBody {
    pub const CLASS_ID: u16 = CLASS_ID;
    pub const METHOD_ID: u16 = 51;

    pub fn decode(_cur: &mut Cursor<'_>) -> Result<Self> {
        Ok(Self)
    }
}

impl MethodBody for ConnectionCloseOkBody {
    fn class_id(&self) -> u16 {
        Self::CLASS_ID
    }

    fn method_id(&self) -> u16 {
        Self::METHOD_ID
    }

    fn visit_fields(&self, _visitor: &mut dyn FieldVisitor) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framing::method::{decode_method, encode_method, AmqMethod};

    #[test]
    fn test_close_round_trip() {
        let body = ConnectionCloseBody {
            reply_code: 501,
            reply_text: ShortString::new("frame error").unwrap(),
            class_id: 60,
            method_id: 20,
        };
        let bytes = encode_method(&body);
        assert_eq!(bytes.len(), 4 + body.body_size());
        assert_eq!(
            decode_method(&bytes).unwrap(),
            AmqMethod::ConnectionClose(body)
        );
    }

    #[test]
    fn test_close_ok_has_empty_payload() {
        let bytes = encode_method(&ConnectionCloseOkBody);
        assert_eq!(bytes, vec![0x00, 10, 0x00, 51]);
        assert_eq!(
            decode_method(&bytes).unwrap(),
            AmqMethod::ConnectionCloseOk(ConnectionCloseOkBody)
        );
    }
}
