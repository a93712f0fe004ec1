use super::{
    super::error::{Error, Result},
    types::MessageType,
};
use bytes::BufMut;

/// S7 protocol identifier, first byte of every frame.
pub const PROTOCOL_ID: u8 = 0x32;

/// Error class/code pair reported in response headers. Carried through as
/// data; interpreting it is the caller's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResponseError {
    pub class: u8,
    pub code: u8,
}

/// S7 frame header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S7Header {
    pub message_type: MessageType,
    pub reserved: u16,
    pub pdu_ref: u16,
    pub param_len: u16,
    pub payload_len: u16,
    /// Present exactly when `message_type.is_response()`
    pub error: Option<ResponseError>,
}

impl S7Header {
    /// Parse a header from bytes. Expects at least 10 bytes, plus the 2-byte
    /// error pair on responses.
    pub fn parse(input: &[u8]) -> Result<(S7Header, &[u8])> {
        if input.len() < 10 {
            return Err(Error::InsufficientData {
                needed: 10,
                available: input.len(),
            });
        }
        if input[0] != PROTOCOL_ID {
            return Err(Error::InvalidMagic { found: input[0] });
        }
        let message_type = MessageType::try_from(input[1]).map_err(|_| Error::Decode {
            context: "message type",
        })?;
        let reserved = u16::from_be_bytes([input[2], input[3]]);
        let pdu_ref = u16::from_be_bytes([input[4], input[5]]);
        let param_len = u16::from_be_bytes([input[6], input[7]]);
        let payload_len = u16::from_be_bytes([input[8], input[9]]);

        let mut rest = &input[10..];
        let error = if message_type.is_response() {
            if rest.len() < 2 {
                return Err(Error::InsufficientData {
                    needed: 2,
                    available: rest.len(),
                });
            }
            let error = ResponseError {
                class: rest[0],
                code: rest[1],
            };
            rest = &rest[2..];
            Some(error)
        } else {
            None
        };
        Ok((
            S7Header {
                message_type,
                reserved,
                pdu_ref,
                param_len,
                payload_len,
                error,
            },
            rest,
        ))
    }

    pub fn encode_to<B: BufMut>(&self, dst: &mut B) {
        dst.put_u8(PROTOCOL_ID);
        dst.put_u8(self.message_type as u8);
        dst.put_u16(self.reserved);
        dst.put_u16(self.pdu_ref);
        dst.put_u16(self.param_len);
        dst.put_u16(self.payload_len);
        if self.message_type.is_response() {
            let error = self.error.unwrap_or_default();
            dst.put_u8(error.class);
            dst.put_u8(error.code);
        }
    }

    pub fn encoded_len(&self) -> usize {
        if self.message_type.is_response() {
            12
        } else {
            10
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn request_header_round_trip() {
        let header = S7Header {
            message_type: MessageType::Job,
            reserved: 0,
            pdu_ref: 0x0102,
            param_len: 8,
            payload_len: 0,
            error: None,
        };
        let mut buf = BytesMut::new();
        header.encode_to(&mut buf);
        assert_eq!(buf.len(), 10);
        let (parsed, rest) = S7Header::parse(&buf).unwrap();
        assert!(rest.is_empty());
        assert_eq!(parsed, header);
    }

    #[test]
    fn response_header_carries_error_pair() {
        let header = S7Header {
            message_type: MessageType::AckData,
            reserved: 0,
            pdu_ref: 1,
            param_len: 2,
            payload_len: 5,
            error: Some(ResponseError { class: 0x81, code: 0x04 }),
        };
        let mut buf = BytesMut::new();
        header.encode_to(&mut buf);
        assert_eq!(buf.len(), 12);
        let (parsed, _) = S7Header::parse(&buf).unwrap();
        assert_eq!(parsed.error, Some(ResponseError { class: 0x81, code: 0x04 }));
    }

    #[test]
    fn wrong_protocol_id_is_rejected() {
        let bytes = [0x33u8, 0x01, 0, 0, 0, 1, 0, 0, 0, 0];
        match S7Header::parse(&bytes) {
            Err(Error::InvalidMagic { found: 0x33 }) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }
}
